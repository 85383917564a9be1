//! Cost and waste analytics over trailing windows

use crate::data::HistoricalData;
use crate::error::{ForecastError, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::str::FromStr;

/// Supported trailing analysis windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisPeriod {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl AnalysisPeriod {
    pub fn days(&self) -> i64 {
        match self {
            AnalysisPeriod::Week => 7,
            AnalysisPeriod::Month => 30,
            AnalysisPeriod::Quarter => 90,
            AnalysisPeriod::Year => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisPeriod::Week => "7d",
            AnalysisPeriod::Month => "30d",
            AnalysisPeriod::Quarter => "90d",
            AnalysisPeriod::Year => "1y",
        }
    }
}

impl std::fmt::Display for AnalysisPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisPeriod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "7d" => Ok(AnalysisPeriod::Week),
            "30d" => Ok(AnalysisPeriod::Month),
            "90d" => Ok(AnalysisPeriod::Quarter),
            "1y" => Ok(AnalysisPeriod::Year),
            other => Err(ForecastError::ValidationError(format!(
                "Unknown period '{}', expected one of 7d, 30d, 90d, 1y",
                other
            ))),
        }
    }
}

/// Windowed cost/waste aggregates for one item.
///
/// Aggregates are None when the window holds no records (and the variance
/// additionally needs at least two); an empty window is a valid outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub item_id: String,
    pub period: AnalysisPeriod,
    pub records: usize,
    pub avg_cost: Option<f64>,
    pub cost_variance: Option<f64>,
    pub avg_waste_rate: Option<f64>,
    pub total_waste_cost: Option<f64>,
}

/// Aggregate cost and waste over the trailing window ending at the item's
/// latest observed date.
pub fn cost_analysis(
    data: &HistoricalData,
    item_id: &str,
    period: AnalysisPeriod,
) -> Result<CostAnalysis> {
    let records = data.item_records(item_id)?;

    let empty = CostAnalysis {
        item_id: item_id.to_string(),
        period,
        records: 0,
        avg_cost: None,
        cost_variance: None,
        avg_waste_rate: None,
        total_waste_cost: None,
    };

    let latest = match records.last() {
        Some(record) => record.date,
        None => return Ok(empty),
    };
    let window_start = latest - Duration::days(period.days() - 1);
    let window: Vec<_> = records
        .iter()
        .filter(|r| r.date >= window_start)
        .collect();

    if window.is_empty() {
        return Ok(empty);
    }

    let costs: Vec<f64> = window.iter().map(|r| r.cost).collect();
    let waste_rates: Vec<f64> = window.iter().map(|r| r.waste_rate).collect();
    let total_waste_cost = window
        .iter()
        .map(|r| r.waste_quantity * r.price)
        .sum::<f64>();

    // Sample variance needs at least two observations
    let cost_variance = if costs.len() >= 2 {
        Some((&costs[..]).variance())
    } else {
        None
    };

    Ok(CostAnalysis {
        item_id: item_id.to_string(),
        period,
        records: window.len(),
        avg_cost: Some((&costs[..]).mean()),
        cost_variance,
        avg_waste_rate: Some((&waste_rates[..]).mean()),
        total_waste_cost: Some(total_waste_cost),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoricalRecord;
    use assert_approx_eq::assert_approx_eq;
    use chrono::NaiveDate;

    fn record(day: u32, cost: f64, waste_quantity: f64, price: f64) -> HistoricalRecord {
        HistoricalRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            item_id: "ITEM001".to_string(),
            demand: 100.0,
            price,
            cost,
            waste_quantity,
            waste_rate: 0.05,
        }
    }

    #[test]
    fn aggregates_trailing_window() {
        let data = HistoricalData::from_records(vec![
            record(1, 10.0, 1.0, 50.0),
            record(28, 20.0, 2.0, 60.0),
            record(29, 30.0, 3.0, 70.0),
            record(30, 40.0, 4.0, 80.0),
        ]);

        // 7-day window ending on the 30th excludes the 1st
        let analysis = cost_analysis(&data, "ITEM001", AnalysisPeriod::Week).unwrap();
        assert_eq!(analysis.records, 3);
        assert_approx_eq!(analysis.avg_cost.unwrap(), 30.0);
        assert_approx_eq!(analysis.cost_variance.unwrap(), 100.0);
        assert_approx_eq!(
            analysis.total_waste_cost.unwrap(),
            2.0 * 60.0 + 3.0 * 70.0 + 4.0 * 80.0
        );
    }

    #[test]
    fn month_window_covers_all_records() {
        let data = HistoricalData::from_records(vec![
            record(1, 10.0, 1.0, 50.0),
            record(30, 20.0, 2.0, 60.0),
        ]);

        let analysis = cost_analysis(&data, "ITEM001", AnalysisPeriod::Month).unwrap();
        assert_eq!(analysis.records, 2);
        assert_approx_eq!(analysis.avg_cost.unwrap(), 15.0);
    }

    #[test]
    fn unknown_item_is_an_error() {
        let data = HistoricalData::from_records(vec![record(1, 10.0, 1.0, 50.0)]);
        assert!(matches!(
            cost_analysis(&data, "NOPE", AnalysisPeriod::Week),
            Err(ForecastError::UnknownItem(_))
        ));
    }

    #[test]
    fn single_record_window_has_no_variance() {
        let data = HistoricalData::from_records(vec![record(1, 10.0, 1.0, 50.0)]);
        let analysis = cost_analysis(&data, "ITEM001", AnalysisPeriod::Week).unwrap();
        assert_eq!(analysis.records, 1);
        assert!(analysis.cost_variance.is_none());
        assert_approx_eq!(analysis.avg_cost.unwrap(), 10.0);
    }

    #[test]
    fn period_parsing_round_trips() {
        for s in ["7d", "30d", "90d", "1y"] {
            let period: AnalysisPeriod = s.parse().unwrap();
            assert_eq!(period.as_str(), s);
        }
        assert!("14d".parse::<AnalysisPeriod>().is_err());
    }
}
