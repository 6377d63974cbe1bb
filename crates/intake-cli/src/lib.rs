//! CLI library components for the intake importer.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
