//! Historical dataset loading and per-item series access

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Columns the historical dataset must carry, in file order
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "item_id",
    "demand",
    "price",
    "cost",
    "waste_quantity",
    "waste_rate",
];

/// One observed day for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    pub item_id: String,
    pub demand: f64,
    pub price: f64,
    pub cost: f64,
    pub waste_quantity: f64,
    pub waste_rate: f64,
}

/// Variable a forecast is produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Demand,
    Price,
}

impl Target {
    /// Both forecastable targets, in response order
    pub const ALL: [Target; 2] = [Target::Demand, Target::Price];

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Demand => "demand",
            Target::Price => "price",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered (date, value) projection of one item's series for one target.
///
/// Dates ascend; rows with non-finite values are dropped at construction.
#[derive(Debug, Clone)]
pub struct SeriesView {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl SeriesView {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Series dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        // Drop rows with non-finite values, keeping date alignment
        let (dates, values): (Vec<_>, Vec<_>) = dates
            .into_iter()
            .zip(values)
            .filter(|(_, v)| v.is_finite())
            .unzip();

        Ok(Self { dates, values })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last observed date, if the series is non-empty
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// First `len - holdout` points
    pub fn head(&self, holdout: usize) -> Result<Self> {
        if holdout >= self.len() {
            return Err(ForecastError::ValidationError(format!(
                "Holdout ({}) must be smaller than series length ({})",
                holdout,
                self.len()
            )));
        }
        let keep = self.len() - holdout;
        Ok(Self {
            dates: self.dates[..keep].to_vec(),
            values: self.values[..keep].to_vec(),
        })
    }

    /// Last `holdout` values
    pub fn tail_values(&self, holdout: usize) -> &[f64] {
        &self.values[self.len().saturating_sub(holdout)..]
    }
}

/// Immutable snapshot of the historical dataset.
///
/// Loaded once at startup, indexed by item with each item's records sorted
/// ascending by date, and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct HistoricalData {
    records: Vec<HistoricalRecord>,
    by_item: HashMap<String, Vec<usize>>,
}

impl HistoricalData {
    /// Build a snapshot from loose records, sorting each item's series by date
    pub fn from_records(mut records: Vec<HistoricalRecord>) -> Self {
        records.sort_by(|a, b| a.item_id.cmp(&b.item_id).then(a.date.cmp(&b.date)));

        let mut by_item: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_item.entry(record.item_id.clone()).or_default().push(idx);
        }

        Self { records, by_item }
    }

    /// Total number of records in the snapshot
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted list of item identifiers present in the dataset
    pub fn items(&self) -> Vec<String> {
        let mut items: Vec<String> = self.by_item.keys().cloned().collect();
        items.sort();
        items
    }

    pub fn contains_item(&self, item_id: &str) -> bool {
        self.by_item.contains_key(item_id)
    }

    /// One item's records, ascending by date
    pub fn item_records(&self, item_id: &str) -> Result<Vec<&HistoricalRecord>> {
        let indices = self
            .by_item
            .get(item_id)
            .ok_or_else(|| ForecastError::UnknownItem(item_id.to_string()))?;
        Ok(indices.iter().map(|&i| &self.records[i]).collect())
    }

    /// Project one item's series onto a single target variable
    pub fn series(&self, item_id: &str, target: Target) -> Result<SeriesView> {
        let records = self.item_records(item_id)?;
        let dates = records.iter().map(|r| r.date).collect();
        let values = records
            .iter()
            .map(|r| match target {
                Target::Demand => r.demand,
                Target::Price => r.price,
            })
            .collect();
        SeriesView::new(dates, values)
    }
}

/// Loader for the flat historical dataset
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load the historical dataset from a CSV file.
    ///
    /// A missing file, missing required column, or unparseable date fails
    /// with `DataUnavailable`. Rows with nulls in required columns are
    /// dropped.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<HistoricalData> {
        let file = File::open(&path).map_err(|e| {
            ForecastError::DataUnavailable(format!(
                "Cannot open {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Build the snapshot from an already-parsed DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<HistoricalData> {
        for column in REQUIRED_COLUMNS {
            if df.column(column).is_err() {
                return Err(ForecastError::DataUnavailable(format!(
                    "Missing required column '{}'",
                    column
                )));
            }
        }

        let dates = Self::column_as_dates(&df, "date")?;
        let item_ids = Self::column_as_strings(&df, "item_id")?;
        let demand = Self::column_as_f64(&df, "demand")?;
        let price = Self::column_as_f64(&df, "price")?;
        let cost = Self::column_as_f64(&df, "cost")?;
        let waste_quantity = Self::column_as_f64(&df, "waste_quantity")?;
        let waste_rate = Self::column_as_f64(&df, "waste_rate")?;

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            // Null in any required column drops the row
            let (date, item_id) = match (dates[i], item_ids[i].as_deref()) {
                (Some(date), Some(item_id)) => (date, item_id),
                _ => continue,
            };
            let numeric = [demand[i], price[i], cost[i], waste_quantity[i], waste_rate[i]];
            if numeric.iter().any(|v| v.map_or(true, |v| !v.is_finite())) {
                continue;
            }

            records.push(HistoricalRecord {
                date,
                item_id: item_id.to_string(),
                demand: demand[i].unwrap(),
                price: price[i].unwrap(),
                cost: cost[i].unwrap(),
                waste_quantity: waste_quantity[i].unwrap(),
                waste_rate: waste_rate[i].unwrap(),
            });
        }

        Ok(HistoricalData::from_records(records))
    }

    /// Parse the date column into calendar dates
    fn column_as_dates(df: &DataFrame, column_name: &str) -> Result<Vec<Option<NaiveDate>>> {
        let strings = Self::column_as_strings(df, column_name)?;
        strings
            .into_iter()
            .map(|opt| match opt {
                None => Ok(None),
                Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|e| {
                        ForecastError::DataUnavailable(format!(
                            "Unparseable date '{}' in column '{}': {}",
                            s, column_name, e
                        ))
                    }),
            })
            .collect()
    }

    /// Helper method to get a column as string values
    fn column_as_strings(df: &DataFrame, column_name: &str) -> Result<Vec<Option<String>>> {
        let col = df.column(column_name)?;
        match col.dtype() {
            DataType::Utf8 => Ok(col
                .utf8()
                .unwrap()
                .into_iter()
                .map(|opt| opt.map(|s| s.to_string()))
                .collect()),
            other => Err(ForecastError::DataUnavailable(format!(
                "Column '{}' has type {:?}, expected text",
                column_name, other
            ))),
        }
    }

    /// Helper method to get a column as f64 values
    fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(column_name)?;
        match col.dtype() {
            DataType::Float64 => Ok(col.f64().unwrap().into_iter().collect()),
            DataType::Float32 => Ok(col
                .f32()
                .unwrap()
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            DataType::Int64 => Ok(col
                .i64()
                .unwrap()
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            DataType::Int32 => Ok(col
                .i32()
                .unwrap()
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            other => Err(ForecastError::DataUnavailable(format!(
                "Column '{}' has type {:?}, expected numeric",
                column_name, other
            ))),
        }
    }
}
