// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render a response DTO per `format`. JSON mode is a plain pretty dump;
/// text mode prints every top-level field as `key: value`, skipping `null`s
/// so the absent-optional-field convention in `boltzq_server::protocol`
/// reads cleanly instead of as noise.
pub fn print_response<T: Serialize>(format: OutputFormat, response: &T) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Text => {
            let value = serde_json::to_value(response)?;
            print_value_as_text(&value, 0);
        }
    }
    Ok(())
}

fn print_value_as_text(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(map) => {
            for (key, entry) in map {
                if entry.is_null() {
                    continue;
                }
                match entry {
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        println!("{pad}{key}:");
                        print_value_as_text(entry, indent + 1);
                    }
                    _ => println!("{pad}{key}: {}", scalar(entry)),
                }
            }
        }
        serde_json::Value::Array(items) => {
            if items.is_empty() {
                println!("{pad}(none)");
            }
            for item in items {
                match item {
                    serde_json::Value::Object(_) => print_value_as_text(item, indent),
                    _ => println!("{pad}- {}", scalar(item)),
                }
            }
        }
        other => println!("{pad}{}", scalar(other)),
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
