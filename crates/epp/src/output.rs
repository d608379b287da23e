use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One JSON document per line.
pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Two-column FIELD/VALUE table, skipping empty values.
pub fn print_fields(fields: &[(&str, String)]) {
    let mut table = table(["FIELD", "VALUE"]);
    for (name, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
        table.add_row(vec![name.to_string(), value.clone()]);
    }
    println!("{table}");
}

/// Aligned `name: value` lines, skipping empty values.
pub fn print_pretty(title: &str, fields: &[(&str, String)]) {
    println!("{title}:");
    let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
        println!("  {:width$}  {value}", format!("{name}:"), width = width + 1);
    }
}

/// `print_fields` or `print_pretty` depending on the format; JSON callers
/// print their own typed output.
pub fn print_record(title: &str, fields: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Table => print_fields(fields),
        OutputFormat::Pretty | OutputFormat::Json => print_pretty(title, fields),
    }
}

pub fn join(values: &[String]) -> String {
    values.join(", ")
}
