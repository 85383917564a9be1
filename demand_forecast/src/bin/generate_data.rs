//! Writes a synthetic historical dataset to CSV.
//!
//! Usage: generate_data [OUTPUT_PATH]
//! Defaults to data/historical_data.csv with two years of history for the
//! five stock items, seeded for reproducibility.

use chrono::{Duration, Utc};
use demand_forecast::error::Result;
use demand_forecast::sample::{generate, SAMPLE_DAYS, SAMPLE_ITEMS};
use std::env;
use std::path::Path;

const DEFAULT_OUTPUT: &str = "data/historical_data.csv";
const SEED: u64 = 42;

fn main() -> Result<()> {
    let output = env::args().nth(1).unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    if let Some(parent) = Path::new(&output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let start = Utc::now().date_naive() - Duration::days(SAMPLE_DAYS as i64);
    let records = generate(&SAMPLE_ITEMS, start, SAMPLE_DAYS, SEED)?;

    let mut writer = csv::Writer::from_path(&output)?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} records for {} items to {}",
        records.len(),
        SAMPLE_ITEMS.len(),
        output
    );
    Ok(())
}
