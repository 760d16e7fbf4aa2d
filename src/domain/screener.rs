//! Multi-instrument screening pipeline.
//!
//! Each ticker is fetched and scored independently; tickers that fail data
//! sufficiency are skipped with a warning. The surviving candidates are then
//! handed to the selector as one batch.

use crate::domain::alignment::aligned_closes;
use crate::domain::error::DashboardError;
use crate::domain::indicator::{calculate_chop_zone, ChopZoneParams, IndicatorValue};
use crate::domain::interval::Interval;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::selector::{select, Candidate, ScoreRow, Selection, SelectorConfig};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

pub const MIN_BARS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenRequest {
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub interval: Interval,
    pub chop_zone: ChopZoneParams,
    pub min_bars: usize,
    pub selector: SelectorConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed { reason: String },
    NoData,
    InsufficientBars { bars: usize, minimum: usize },
    NoIndicatorOutput,
    InsufficientAlignedBars { aligned: usize, minimum: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchFailed { reason } => write!(f, "fetch failed: {}", reason),
            SkipReason::NoData => f.write_str("no data"),
            SkipReason::InsufficientBars { bars, minimum } => {
                write!(f, "only {} bars, minimum {} required", bars, minimum)
            }
            SkipReason::NoIndicatorOutput => f.write_str("chop zone output empty"),
            SkipReason::InsufficientAlignedBars { aligned, minimum } => write!(
                f,
                "only {} bars with a defined chop zone, minimum {} required",
                aligned, minimum
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

/// Scored instrument with the data behind its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredInstrument {
    pub candidate: Candidate,
    pub bars: usize,
    pub scored_at: NaiveDateTime,
    /// Defined zones only, oldest first.
    pub zones: Vec<(NaiveDateTime, u8)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenOutcome {
    pub scored: Vec<ScoredInstrument>,
    pub skipped: Vec<SkippedTicker>,
    pub selection: Selection,
}

/// Score one instrument's series, or say why it cannot be scored.
///
/// `min_bars` applies to the raw series and again to the bars where the
/// chop zone is defined, since only those reach the selector.
pub fn score_series(
    ticker: &str,
    series: &PriceSeries,
    params: &ChopZoneParams,
    min_bars: usize,
) -> Result<ScoredInstrument, SkipReason> {
    if series.is_empty() {
        return Err(SkipReason::NoData);
    }
    if series.len() < min_bars {
        return Err(SkipReason::InsufficientBars {
            bars: series.len(),
            minimum: min_bars,
        });
    }

    let cz = calculate_chop_zone(series, params);
    let zones: Vec<(NaiveDateTime, u8)> = cz
        .values
        .iter()
        .filter_map(|p| match (p.valid, &p.value) {
            (true, IndicatorValue::Zone(z)) => Some((p.timestamp, *z)),
            _ => None,
        })
        .collect();
    let Some(&(scored_at, score)) = zones.last() else {
        return Err(SkipReason::NoIndicatorOutput);
    };
    let prices = aligned_closes(series, &cz);
    if prices.len() < min_bars {
        return Err(SkipReason::InsufficientAlignedBars {
            aligned: prices.len(),
            minimum: min_bars,
        });
    }

    Ok(ScoredInstrument {
        candidate: Candidate {
            row: ScoreRow {
                ticker: ticker.to_string(),
                score,
            },
            prices,
        },
        bars: series.len(),
        scored_at,
        zones,
    })
}

pub fn screen(data_port: &dyn DataPort, request: &ScreenRequest) -> Result<ScreenOutcome, DashboardError> {
    let mut scored = Vec::new();
    let mut skipped = Vec::new();

    for ticker in &request.tickers {
        let result = data_port
            .fetch_ohlcv(ticker, request.start_date, request.end_date, request.interval)
            .map_err(|e| SkipReason::FetchFailed {
                reason: e.to_string(),
            })
            .and_then(|series| {
                score_series(ticker, &series, &request.chop_zone, request.min_bars)
            });

        match result {
            Ok(instrument) => {
                tracing::info!(
                    ticker = %ticker,
                    bars = instrument.bars,
                    score = instrument.candidate.row.score,
                    "scored"
                );
                scored.push(instrument);
            }
            Err(reason) => {
                tracing::warn!(ticker = %ticker, %reason, "skipping");
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason,
                });
            }
        }
    }

    let candidates: Vec<Candidate> = scored.iter().map(|s| s.candidate.clone()).collect();
    let selection = select(&candidates, &request.selector)?;

    if !selection.unusable.is_empty() {
        tracing::warn!(
            tickers = ?selection.unusable,
            rows = selection.aligned_rows,
            "no usable return series over the shared timestamps"
        );
    }
    tracing::info!(
        candidates = candidates.len(),
        selected = ?selection.tickers(),
        "selection complete"
    );

    Ok(ScreenOutcome {
        scored,
        skipped,
        selection,
    })
}
