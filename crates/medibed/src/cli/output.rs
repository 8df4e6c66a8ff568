//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use medibed_diagnostics::MedibedError;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::str::FromStr;
use tabled::{Table, Tabled, builder::Builder, settings::Style};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonPretty,
    #[default]
    Table,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "json-pretty" => Ok(Self::JsonPretty),
            "table" => Ok(Self::Table),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(io::stdout().is_terminal()),
    }
}

/// Format an error for display, as a diagnostic when it carries an error code
pub fn format_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<MedibedError>() {
        Some(err) => err.to_diagnostic().render_colored(),
        None => format!("{} {:#}", "Error:".red().bold(), error),
    }
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Format JSON value for output
pub fn format_json(value: &Value, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

/// Format value as table (if possible)
///
/// Arrays of objects become one row per record with the first record's keys
/// as columns; a single object becomes a key/value table.
pub fn format_as_table(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Some("(no records)".to_string());
            }

            let Some(Value::Object(first)) = items.first() else {
                let lines: Vec<String> = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| format!("  {}. {}", i + 1, format_value(v)))
                    .collect();
                return Some(lines.join("\n"));
            };

            let columns: Vec<String> = first.keys().cloned().collect();
            let mut builder = Builder::default();
            builder.push_record(columns.iter().cloned());
            for item in items {
                let row: Vec<String> = columns
                    .iter()
                    .map(|c| item.get(c).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
            Some(builder.build().with(Style::modern()).to_string())
        }
        Value::Object(obj) => {
            #[derive(Tabled)]
            struct KeyValue {
                #[tabled(rename = "Field")]
                key: String,
                #[tabled(rename = "Value")]
                value: String,
            }

            let rows: Vec<KeyValue> = obj
                .iter()
                .map(|(k, v)| KeyValue {
                    key: k.clone(),
                    value: format_value(v),
                })
                .collect();

            Some(Table::new(rows).with(Style::modern()).to_string())
        }
        _ => None,
    }
}

/// Format a simple value for display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

/// Render `value` in `format`
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(value, false),
        OutputFormat::JsonPretty => format_json(value, true),
        OutputFormat::Table => match format_as_table(value) {
            Some(table) => Ok(table),
            None => format_json(value, true),
        },
    }
}

/// Print output in the specified format
pub fn print_output<T: Serialize>(
    value: &T,
    format: OutputFormat,
    output_file: Option<&Path>,
) -> Result<()> {
    let value = serde_json::to_value(value).context("Failed to serialize output")?;
    let content = render(&value, format)?;
    write_output(&content, output_file)
}
