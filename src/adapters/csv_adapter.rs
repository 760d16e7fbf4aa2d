//! CSV file data adapter.
//!
//! Reads `<base>/<TICKER>_<interval>.csv` with the header
//! `timestamp,open,high,low,close,volume`. Rows with an empty price field are
//! dropped; an empty volume reads as zero.

use crate::domain::error::DashboardError;
use crate::domain::interval::Interval;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str, interval: Interval) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", ticker, interval))
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `Ok(None)` for an empty field.
fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    ticker: &str,
) -> Result<Option<f64>, DashboardError> {
    let raw = record.get(index).ok_or_else(|| DashboardError::DataFetch {
        ticker: ticker.to_string(),
        reason: format!("missing {} column", name),
    })?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|e| DashboardError::DataFetch {
        ticker: ticker.to_string(),
        reason: format!("invalid {} value '{}': {}", name, raw, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interval: Interval,
    ) -> Result<PriceSeries, DashboardError> {
        let path = self.csv_path(ticker, interval);
        let content = fs::read_to_string(&path).map_err(|e| DashboardError::DataFetch {
            ticker: ticker.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| DashboardError::DataFetch {
                ticker: ticker.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let raw_ts = record.get(0).ok_or_else(|| DashboardError::DataFetch {
                ticker: ticker.to_string(),
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| DashboardError::DataFetch {
                ticker: ticker.to_string(),
                reason: format!("invalid timestamp '{}'", raw_ts),
            })?;

            let date = timestamp.date();
            if date < start_date || date >= end_date {
                continue;
            }

            let open = parse_field(&record, 1, "open", ticker)?;
            let high = parse_field(&record, 2, "high", ticker)?;
            let low = parse_field(&record, 3, "low", ticker)?;
            let close = parse_field(&record, 4, "close", ticker)?;
            let volume = parse_field(&record, 5, "volume", ticker)?.unwrap_or(0.0);

            let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
                tracing::debug!(ticker, %timestamp, "dropping row with missing prices");
                continue;
            };

            bars.push(PriceBar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        Ok(PriceSeries::from_unsorted(bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,\n";
        fs::write(path.join("BHP_1d.csv"), csv_content).unwrap();

        let hourly = "timestamp,open,high,low,close,volume\n\
            2024-01-15 09:00:00,1.0,1.2,0.9,1.1,10\n\
            2024-01-15 10:00:00,,1.3,1.0,1.2,10\n\
            2024-01-15 11:00:00,1.2,1.4,1.1,1.3,10\n";
        fs::write(path.join("EURUSD=X_1h.csv"), hourly).unwrap();

        fs::write(path.join("BAD_1d.csv"), "timestamp,open,high,low,close,volume\n2024-01-15,x,1,1,1,1\n")
            .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_ohlcv_returns_sorted_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_ohlcv("BHP", date(2024, 1, 1), date(2024, 2, 1), Interval::Day)
            .unwrap();

        assert_eq!(series.len(), 3);
        let first = &series.bars()[0];
        assert_eq!(first.timestamp.date(), date(2024, 1, 15));
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 90.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.volume, 50000.0);
        assert_eq!(series.bars()[1].volume, 0.0);
    }

    #[test]
    fn end_date_is_exclusive() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_ohlcv("BHP", date(2024, 1, 16), date(2024, 1, 17), Interval::Day)
            .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars()[0].timestamp.date(), date(2024, 1, 16));
    }

    #[test]
    fn hourly_rows_with_missing_prices_are_dropped() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_ohlcv("EURUSD=X", date(2024, 1, 15), date(2024, 1, 16), Interval::Hour)
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![1.1, 1.3]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_ohlcv("XYZ", date(2024, 1, 1), date(2024, 1, 31), Interval::Day);
        assert!(matches!(result, Err(DashboardError::DataFetch { ticker, .. }) if ticker == "XYZ"));
    }

    #[test]
    fn invalid_number_is_an_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_ohlcv("BAD", date(2024, 1, 1), date(2024, 1, 31), Interval::Day);
        assert!(result.is_err());
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(
            parse_timestamp("2024-03-01"),
            date(2024, 3, 1).and_hms_opt(0, 0, 0)
        );
        assert_eq!(
            parse_timestamp("2024-03-01 14:30:00"),
            date(2024, 3, 1).and_hms_opt(14, 30, 0)
        );
        assert_eq!(
            parse_timestamp("2024-03-01T14:30:00"),
            date(2024, 3, 1).and_hms_opt(14, 30, 0)
        );
        assert_eq!(parse_timestamp("01/03/2024"), None);
    }
}
