//! Terminal rendering for command results.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned table for humans
    #[default]
    Table,
    /// Pretty-printed JSON for scripts
    Json,
}

/// Render rows as a table or a JSON array.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table if rows.is_empty() => println!("(none)"),
        OutputFormat::Table => {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
        OutputFormat::Json => match serde_json::to_string_pretty(rows) {
            Ok(json) => println!("{json}"),
            Err(e) => print_error(&format!("could not encode output: {e}")),
        },
    }
}

pub fn print_success(msg: &str) {
    println!("ok: {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("error: {msg}");
}

/// One `label: value` line, labels aligned.
pub fn print_kv(label: &str, value: &str) {
    println!("  {:<14}{value}", format!("{label}:"));
}
