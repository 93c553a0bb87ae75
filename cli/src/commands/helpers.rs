use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use foodlist_core::entry::ListEntry;
use foodlist_core::models::FoodRecord;

/// Print `records` numbered from `first_index + 1`, paired with their entries.
pub(crate) fn print_food_table(first_index: usize, records: &[FoodRecord], entries: &[ListEntry]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Brand")]
        brand: String,
        #[tabled(rename = "Energy")]
        energy: String,
        #[tabled(rename = "Portion")]
        portion: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let rows: Vec<FoodRow> = records
        .iter()
        .zip(entries)
        .enumerate()
        .map(|(i, (record, entry))| FoodRow {
            idx: first_index + i + 1,
            id: entry.id.map_or("-".into(), |id| id.to_string()),
            name: entry.title.clone(),
            brand: entry.brand.clone().unwrap_or_default(),
            energy: entry.energy.clone(),
            portion: entry.portion.clone(),
            source: record.source.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

#[derive(Serialize)]
pub(crate) struct PagedOutput<'a> {
    pub page: usize,
    pub total: usize,
    pub foods: &'a [FoodRecord],
}

/// Parse a 1-based pick list like "1,3" or "2 4" into 0-based indices.
/// Duplicates are dropped, order is kept.
pub(crate) fn parse_picks(s: &str, count: usize) -> Result<Vec<usize>> {
    let mut picks = Vec::new();
    for part in s.split([',', ' ']).filter(|p| !p.trim().is_empty()) {
        let n: usize = part
            .trim()
            .parse()
            .with_context(|| format!("Invalid selection '{part}'"))?;
        if n < 1 || n > count {
            bail!("Selection {n} out of range (1-{count})");
        }
        if !picks.contains(&(n - 1)) {
            picks.push(n - 1);
        }
    }
    if picks.is_empty() {
        bail!("Nothing selected");
    }
    Ok(picks)
}

pub(crate) fn prompt_picks(count: usize) -> Result<Vec<usize>> {
    eprint!("\nSelect foods (e.g. 1,3; 1-{count}): ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    parse_picks(&line, count)
}

/// Convert a 1-based page number to the number of rows before it.
pub(crate) fn rows_before(page: usize, page_size: usize) -> Result<usize> {
    if page == 0 {
        bail!("Page numbers start at 1");
    }
    Ok((page - 1) * page_size)
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}
