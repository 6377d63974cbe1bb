use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::commands::{DatabaseReport, ImportReport};

pub fn print_import_summary(report: &ImportReport) {
    println!("File: {}", report.file.display());
    if report.dry_run {
        println!("Dry run: nothing was written");
    }
    println!("{}", import_table(report));
    if let Err(error) = &report.outcome {
        eprintln!("error: {}", error.user_message());
        if let Some(suggestion) = error.suggestion() {
            eprintln!("hint: {suggestion}");
        }
    }
}

pub fn print_database_summary(report: &DatabaseReport) {
    println!("Database: {}", report.path.display());
    println!("{}", database_table(report));
}

pub fn import_table(report: &ImportReport) -> Table {
    let schema = report.entity.schema();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Inserted"),
        header_cell("Skipped"),
        header_cell("Total"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    match &report.outcome {
        Ok(result) => {
            let status = if report.dry_run { "validated" } else { "imported" };
            table.add_row(vec![
                Cell::new(schema.table),
                count_cell(result.inserted, Color::Green),
                count_cell(result.skipped, Color::Yellow),
                Cell::new(result.total()),
                Cell::new(status).fg(Color::Green),
            ]);
        }
        Err(error) => {
            table.add_row(vec![
                Cell::new(schema.table),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
                Cell::new(format!("failed ({})", error.status_code()))
                    .fg(Color::Red)
                    .add_attribute(Attribute::Bold),
            ]);
        }
    }
    table
}

pub fn database_table(report: &DatabaseReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (name, rows) in &report.counts {
        table.add_row(vec![Cell::new(name), Cell::new(rows)]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
