use chrono::NaiveDate;
use demand_forecast::data::{DataLoader, Target};
use demand_forecast::error::ForecastError;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_dataset(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "date,item_id,demand,price,cost,waste_quantity,waste_rate"
    )
    .unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

#[test]
fn loads_csv_into_snapshot() {
    let file = write_dataset(&[
        "2024-01-01,ITEM001,100.0,50.0,35.0,2.0,0.02",
        "2024-01-02,ITEM001,110.0,51.0,36.0,2.5,0.023",
        "2024-01-01,ITEM002,40.0,20.0,14.0,1.0,0.025",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data.items(), vec!["ITEM001".to_string(), "ITEM002".to_string()]);

    let series = data.series("ITEM001", Target::Demand).unwrap();
    assert_eq!(series.values(), &[100.0, 110.0]);
    assert_eq!(
        series.dates()[0],
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    );

    let prices = data.series("ITEM002", Target::Price).unwrap();
    assert_eq!(prices.values(), &[20.0]);
}

#[test]
fn out_of_order_rows_are_sorted_per_item() {
    let file = write_dataset(&[
        "2024-01-03,ITEM001,3.0,50.0,35.0,0.0,0.0",
        "2024-01-01,ITEM001,1.0,50.0,35.0,0.0,0.0",
        "2024-01-02,ITEM001,2.0,50.0,35.0,0.0,0.0",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();
    let series = data.series("ITEM001", Target::Demand).unwrap();
    assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
}

#[test]
fn rows_with_nulls_are_dropped() {
    let file = write_dataset(&[
        "2024-01-01,ITEM001,100.0,50.0,35.0,2.0,0.02",
        "2024-01-02,ITEM001,,50.0,35.0,2.0,0.02",
        "2024-01-03,ITEM001,120.0,52.0,36.0,2.0,0.02",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(data.len(), 2);
    let series = data.series("ITEM001", Target::Demand).unwrap();
    assert_eq!(series.values(), &[100.0, 120.0]);
}

#[test]
fn missing_file_is_data_unavailable() {
    let result = DataLoader::from_csv("definitely/not/a/real/path.csv");
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}

#[test]
fn missing_column_is_data_unavailable() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,item_id,demand").unwrap();
    writeln!(file, "2024-01-01,ITEM001,100.0").unwrap();

    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}

#[test]
fn malformed_dates_are_data_unavailable() {
    let file = write_dataset(&["01/02/2024,ITEM001,100.0,50.0,35.0,2.0,0.02"]);
    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}

#[test]
fn non_numeric_measure_column_is_data_unavailable() {
    let file = write_dataset(&["2024-01-01,ITEM001,lots,50.0,35.0,2.0,0.02"]);
    let result = DataLoader::from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}
