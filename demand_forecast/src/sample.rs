//! Synthetic historical data generation
//!
//! Produces a seeded dataset with yearly and weekly seasonality, a mild
//! upward trend, demand-correlated pricing and Beta-distributed waste
//! rates, matching the shape the loader expects.

use crate::data::HistoricalRecord;
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Beta, Distribution, Normal};
use statrs::statistics::Statistics;
use std::f64::consts::TAU;

/// Item identifiers used by the stock generator
pub const SAMPLE_ITEMS: [&str; 5] = ["ITEM001", "ITEM002", "ITEM003", "ITEM004", "ITEM005"];

/// Days of history generated by default (two years)
pub const SAMPLE_DAYS: usize = 730;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Generate `days` of daily history for each item, starting at `start`.
///
/// The generator is fully determined by `seed`.
pub fn generate(
    items: &[&str],
    start: NaiveDate,
    days: usize,
    seed: u64,
) -> Result<Vec<HistoricalRecord>> {
    let mut rng = StdRng::seed_from_u64(seed);

    let demand_noise = Normal::new(100.0, 10.0)
        .map_err(|e| ForecastError::ValidationError(format!("Bad demand distribution: {e}")))?;
    let price_noise = Normal::new(50.0, 5.0)
        .map_err(|e| ForecastError::ValidationError(format!("Bad price distribution: {e}")))?;
    let waste_beta = Beta::new(2.0, 8.0)
        .map_err(|e| ForecastError::ValidationError(format!("Bad waste distribution: {e}")))?;

    let mut records = Vec::with_capacity(items.len() * days);
    for &item_id in items {
        // Demand first; pricing correlates with its standardized level
        let demand: Vec<f64> = (0..days)
            .map(|i| {
                let t = i as f64;
                let base = demand_noise.sample(&mut rng);
                let seasonal = 1.0 + 0.3 * (TAU * t / 365.25).sin();
                let weekly = 1.0 + 0.1 * (TAU * t / 7.0).sin();
                let trend = 0.001 * t;
                (base * seasonal * weekly + trend).max(0.0)
            })
            .collect();

        let demand_mean = (&demand[..]).mean();
        let demand_std = (&demand[..]).std_dev().max(f64::EPSILON);

        for (i, &demand) in demand.iter().enumerate() {
            let t = i as f64;
            let correlation = 0.1 * (demand - demand_mean) / demand_std;
            let price = (price_noise.sample(&mut rng) + 0.01 * t + correlation).max(10.0);

            let cost_noise = Normal::new(0.0, price * 0.05).map_err(|e| {
                ForecastError::ValidationError(format!("Bad cost distribution: {e}"))
            })?;
            let cost = (price * 0.7 + cost_noise.sample(&mut rng)).max(5.0);

            let waste_rate = waste_beta.sample(&mut rng) * 0.15;
            let waste_quantity = demand * waste_rate;

            records.push(HistoricalRecord {
                date: start + Duration::days(i as i64),
                item_id: item_id.to_string(),
                demand: round2(demand),
                price: round2(price),
                cost: round2(cost),
                waste_quantity: round2(waste_quantity),
                waste_rate: round4(waste_rate),
            });
        }
    }

    Ok(records)
}
