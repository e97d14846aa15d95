//! Flattening records for output files and terminal printing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{Detail, OutputFormat};
use crate::models::DomainRecord;

/// Fields printed for a record at the short detail level.
pub const IMPORTANT_FIELDS: &[&str] = &[
    "probe_status",
    "probe_home_page",
    "probe_reason",
    "cert_subject_name",
    "cert_issuer_name",
    "cert_not_before",
    "cert_not_after",
    "cert_policy_type",
    "ocsp_status",
];

const PRETTY_NAMES: &[(&str, &str)] = &[
    ("probe_status", "Certificate Status"),
    ("probe_reason", "Reason"),
    ("probe_home_page", "Site"),
    ("cert_key_alg", "Key Algorithm"),
    ("cert_policy_type", "Certificate Type"),
    ("ocsp_status", "OCSP Status"),
];

fn insert_prefixed<T: Serialize>(map: &mut Map<String, Value>, prefix: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => {
            for (key, value) in fields {
                map.insert(format!("{prefix}_{key}"), value);
            }
        }
        Ok(other) => {
            map.insert(prefix.to_string(), other);
        }
        Err(e) => log::warn!("Failed to serialize {prefix} result: {e}"),
    }
}

/// Flattens a record into one level of keys.
///
/// Identity comes first, then user info columns, then every stage result with its
/// stage name as prefix (`probe_status`, `cert_not_after`, `ocsp_status`, ...).
pub fn flatten_record(record: &DomainRecord) -> Map<String, Value> {
    flatten(record, false)
}

/// Output files also carry the certificate itself as `cert_pem`.
fn flatten_for_file(record: &DomainRecord) -> Map<String, Value> {
    flatten(record, true)
}

fn flatten(record: &DomainRecord, with_pem: bool) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("index".into(), Value::from(record.index));
    map.insert("domain".into(), Value::from(record.domain.clone()));
    for (key, value) in &record.user_info {
        map.insert(key.clone(), Value::from(value.clone()));
    }
    if let Some(probe) = &record.probe {
        insert_prefixed(&mut map, "probe", probe);
    }
    if let Some(cert) = &record.cert {
        insert_prefixed(&mut map, "cert", cert);
        if with_pem {
            map.insert("cert_pem".into(), Value::from(cert.to_pem()));
        }
    }
    if let Some(ocsp) = &record.ocsp {
        insert_prefixed(&mut map, "ocsp", ocsp);
    }
    map
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn write_csv<W: Write>(records: &[DomainRecord], out: W) -> Result<()> {
    let rows: Vec<Map<String, Value>> = records.iter().map(flatten_for_file).collect();

    // Column order is first appearance; records lacking a stage leave its cells empty.
    let mut columns: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(out);
    if !columns.is_empty() {
        writer.write_record(&columns)?;
    }
    for row in &rows {
        writer.write_record(
            columns
                .iter()
                .map(|col| row.get(*col).map(csv_cell).unwrap_or_default()),
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<W: Write>(records: &[DomainRecord], mut out: W) -> Result<()> {
    let rows: Vec<Value> = records
        .iter()
        .map(|r| Value::Object(flatten_for_file(r)))
        .collect();
    serde_json::to_writer_pretty(&mut out, &rows)?;
    writeln!(out)?;
    Ok(())
}

fn write_plain<W: Write>(records: &[DomainRecord], mut out: W) -> Result<()> {
    let blocks: Vec<String> = records
        .iter()
        .map(|r| format_record(r, Detail::Detailed))
        .collect();
    writeln!(out, "{}", blocks.join("\n\n"))?;
    Ok(())
}

/// Writes all records to `path` in the requested format.
pub fn write_output(records: &[DomainRecord], path: &Path, format: OutputFormat) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    match format {
        OutputFormat::Csv => write_csv(records, &mut out),
        OutputFormat::Json => write_json(records, &mut out),
        OutputFormat::Plain => write_plain(records, &mut out),
    }
    .with_context(|| format!("Failed to write output file {}", path.display()))?;
    out.flush()?;
    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn pretty_name(field: &str) -> String {
    if let Some((_, pretty)) = PRETTY_NAMES.iter().find(|(name, _)| *name == field) {
        return pretty.to_string();
    }
    let field = field.strip_prefix("cert_").unwrap_or(field);
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_value(lines: &mut Vec<String>, key: &str, value: &Value, indent: usize) {
    let tabs = "\t".repeat(indent);
    match value {
        Value::String(s) => lines.push(format!("{tabs}{key}: {s}")),
        Value::Array(items) => {
            lines.push(format!("{tabs}{key}:"));
            for (i, item) in items.iter().enumerate() {
                push_value(lines, &i.to_string(), item, indent + 1);
            }
        }
        Value::Object(fields) => {
            lines.push(format!("{tabs}{key}:"));
            for (k, v) in fields {
                push_value(lines, k, v, indent + 1);
            }
        }
        other => lines.push(format!("{tabs}{key}: {other}")),
    }
}

/// Human-readable block for one record.
///
/// `Short` keeps [`IMPORTANT_FIELDS`], `Detailed` keeps everything. Null fields are
/// left out.
pub fn format_record(record: &DomainRecord, detail: Detail) -> String {
    let title = format!("#{} {}", record.index, record.domain);
    let mut lines = vec![title.clone(), "-".repeat(title.chars().count())];

    for (key, value) in flatten_record(record) {
        if value.is_null() || key == "index" || key == "domain" {
            continue;
        }
        if detail < Detail::Detailed && !IMPORTANT_FIELDS.contains(&key.as_str()) {
            continue;
        }
        push_value(&mut lines, &pretty_name(&key), &value, 0);
    }
    lines.join("\n")
}
