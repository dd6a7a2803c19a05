//! Event source and ranked-output sink
//!
//! Reads raw event records from JSON (a top-level array, or one object per
//! line) and writes ranked customers as CSV.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

use crate::model::CustomerLtv;

/// Load raw event records from a JSON file
///
/// # Arguments
/// * `file_path` - File holding either a JSON array of objects or JSON lines
///
/// # Returns
/// * One `Value` per record, in file order
pub fn read_records(file_path: &Path) -> crate::Result<Vec<Value>> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    parse_records(&content).with_context(|| format!("failed to parse {}", file_path.display()))
}

/// Parse records from a JSON array or from JSON lines
pub fn parse_records(content: &str) -> crate::Result<Vec<Value>> {
    if content.trim_start().starts_with('[') {
        let records: Vec<Value> = serde_json::from_str(content)?;
        return Ok(records);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid JSON on line {}", idx + 1))
        })
        .collect()
}

/// Write ranked customers as CSV, highest LTV first
///
/// # Arguments
/// * `file_path` - Destination; missing parent directories are created
/// * `ranked` - Output of top-N selection
/// * `with_metrics` - Also write every running total, not just the LTV
pub fn write_csv(
    file_path: &Path,
    ranked: &[(&str, &CustomerLtv)],
    with_metrics: bool,
) -> crate::Result<()> {
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("failed to create {}", file_path.display()))?;
    write_rows(&mut writer, ranked, with_metrics)?;
    writer.flush()?;
    Ok(())
}

fn write_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    ranked: &[(&str, &CustomerLtv)],
    with_metrics: bool,
) -> crate::Result<()> {
    if with_metrics {
        writer.write_record([
            "customer",
            "ltv",
            "total_site_visits",
            "total_orders",
            "total_order_amount",
            "total_weeks",
            "avg_spend_per_visit",
        ])?;
    } else {
        writer.write_record(["customer", "ltv"])?;
    }

    for (customer_id, totals) in ranked {
        let ltv = format!("{:.2}", totals.ltv);
        if with_metrics {
            writer.write_record([
                customer_id.to_string(),
                ltv,
                totals.total_site_visits.to_string(),
                totals.total_orders.to_string(),
                format!("{:.2}", totals.total_order_amount),
                totals.total_weeks.to_string(),
                format!("{:.2}", totals.avg_spend_per_visit),
            ])?;
        } else {
            writer.write_record([customer_id.to_string(), ltv])?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RankedCustomer<'a> {
    customer_id: &'a str,
    #[serde(flatten)]
    metrics: &'a CustomerLtv,
}

/// Render ranked customers as a pretty-printed JSON array
pub fn to_json(ranked: &[(&str, &CustomerLtv)]) -> crate::Result<String> {
    let rows: Vec<RankedCustomer<'_>> = ranked
        .iter()
        .map(|&(customer_id, metrics)| RankedCustomer {
            customer_id,
            metrics,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}
