//! Output formatting module

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

use cfapi::resources::lists::{List, ListItem, ListItemValue};
use cfapi::OutputFormat;

/// Print output in the configured format
pub fn print_output<T: Serialize>(data: &T, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(data),
        OutputFormat::Compact => print_compact(data),
        OutputFormat::Table => print_json_pretty(data),
    }
}

/// Print as formatted JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string(data)?);
    Ok(())
}

/// Print as pretty JSON
pub fn print_json_pretty<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print compact output
pub fn print_compact<T: Serialize>(data: &T) -> Result<()> {
    let value = serde_json::to_value(data)?;
    print_value_compact(&value, 0);
    Ok(())
}

fn print_value_compact(value: &Value, indent: usize) {
    let prefix = "  ".repeat(indent);

    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{}{}: ", prefix, key.cyan());
                        print_value_compact(val, indent + 1);
                    }
                    _ => {
                        println!("{}{}: {}", prefix, key.cyan(), format_value(val));
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, val) in arr.iter().enumerate() {
                println!("{}[{}]", prefix, i.to_string().dimmed());
                print_value_compact(val, indent + 1);
            }
        }
        _ => {
            println!("{}{}", prefix, format_value(value));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".dimmed().to_string(),
        Value::Bool(b) => {
            if *b {
                "true".green().to_string()
            } else {
                "false".red().to_string()
            }
        }
        Value::Number(n) => n.to_string().yellow().to_string(),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

/// Print success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Print a table header
pub fn table_header(columns: &[&str]) {
    let header: Vec<String> = columns
        .iter()
        .map(|c| c.bold().underline().to_string())
        .collect();
    println!("{}", header.join("\t"));
}

/// Print list in table format
pub fn print_list(list: &List) {
    println!(
        "{}\t{}\t{}\t{}",
        list.name.bold(),
        list.kind.cyan(),
        list.num_items.to_string().yellow(),
        list.id.dimmed()
    );
}

/// Print list item in table format
pub fn print_list_item(item: &ListItem) {
    let value = match &item.value {
        ListItemValue::Ip(ip) => ip.clone(),
        ListItemValue::Asn(asn) => format!("AS{}", asn),
        ListItemValue::Hostname(hostname) => hostname.url_hostname.clone(),
        ListItemValue::Redirect(redirect) => {
            format!("{} → {}", redirect.source_url, redirect.target_url)
        }
    };

    println!(
        "{}\t{}\t{}\t{}",
        item.value.kind().cyan(),
        value.bold(),
        item.comment.dimmed(),
        item.id.dimmed()
    );
}
