use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid actor id '{0}'")]
    InvalidActorId(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
