//! Market data port trait.

use crate::domain::error::DashboardError;
use crate::domain::interval::Interval;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `ticker` with timestamps in `[start_date, end_date)`.
    ///
    /// An empty series means the source has no data for the range.
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interval: Interval,
    ) -> Result<PriceSeries, DashboardError>;
}
