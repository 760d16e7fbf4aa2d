//! Bar interval and timestamp stepping.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interval {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl Interval {
    pub const ALL: [Interval; 4] = [Interval::Hour, Interval::Day, Interval::Week, Interval::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hour => "1h",
            Interval::Day => "1d",
            Interval::Week => "1wk",
            Interval::Month => "1mo",
        }
    }

    /// Next timestamp on this interval's grid after `from`.
    ///
    /// Monthly steps land on calendar month ends.
    pub fn step(&self, from: NaiveDateTime) -> NaiveDateTime {
        match self {
            Interval::Hour => from + Duration::hours(1),
            Interval::Day => from + Duration::days(1),
            Interval::Week => from + Duration::days(7),
            Interval::Month => {
                let date = from.date();
                let target = if date == month_end(date) {
                    month_end(first_of_month(date) + Months::new(1))
                } else {
                    month_end(date)
                };
                target.and_time(from.time())
            }
        }
    }

    /// `steps` successive timestamps after `from`.
    pub fn successors(&self, from: NaiveDateTime, steps: usize) -> Vec<NaiveDateTime> {
        let mut out = Vec::with_capacity(steps);
        let mut current = from;
        for _ in 0..steps {
            current = self.step(current);
            out.push(current);
        }
        out
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let next = first_of_month(date) + Months::new(1);
    next.pred_opt().unwrap_or(date)
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1h" => Ok(Interval::Hour),
            "1d" => Ok(Interval::Day),
            "1wk" => Ok(Interval::Week),
            "1mo" => Ok(Interval::Month),
            other => Err(format!(
                "unknown interval '{}' (expected 1h, 1d, 1wk or 1mo)",
                other
            )),
        }
    }
}
