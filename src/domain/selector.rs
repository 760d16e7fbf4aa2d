//! Greedy low-correlation instrument selection.
//!
//! Candidates are ranked by terminal chop zone (lowest first, stable), then
//! scanned once: an instrument joins the selection only if its absolute return
//! correlation with every instrument already selected is strictly below the
//! threshold. The scan stops at `max_selected`. There is no backtracking, so
//! the result is deterministic for a given ranking but not necessarily the
//! largest compatible set.

use crate::domain::alignment::{build_return_table, PricePoint};
use crate::domain::correlation::CorrelationMatrix;

pub const MAX_SELECTED: usize = 5;
pub const CORRELATION_THRESHOLD: f64 = 0.5;

/// Terminal chop zone of one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub ticker: String,
    pub score: u8,
}

/// An instrument that passed data sufficiency, with its aligned closes.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub row: ScoreRow,
    pub prices: Vec<PricePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorConfig {
    pub max_selected: usize,
    pub threshold: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_selected: MAX_SELECTED,
            threshold: CORRELATION_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Chosen instruments in pick order.
    pub selected: Vec<ScoreRow>,
    /// All candidates in ranked order.
    pub ranking: Vec<ScoreRow>,
    /// Correlations restricted to the selection, in pick order.
    pub correlations: CorrelationMatrix,
    /// Correlations across every candidate, in input order.
    pub full: CorrelationMatrix,
    /// Return rows shared by all candidates.
    pub aligned_rows: usize,
    /// Candidates without a usable return series over the shared rows.
    pub unusable: Vec<String>,
}

impl Selection {
    pub fn tickers(&self) -> Vec<&str> {
        self.selected.iter().map(|r| r.ticker.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no valid instruments")]
    NoValidInstruments,
}

pub fn select(
    candidates: &[Candidate],
    config: &SelectorConfig,
) -> Result<Selection, SelectionError> {
    if candidates.is_empty() {
        return Err(SelectionError::NoValidInstruments);
    }

    let columns: Vec<&[PricePoint]> = candidates.iter().map(|c| c.prices.as_slice()).collect();
    let table = build_return_table(&columns);
    let full = CorrelationMatrix::from_columns(
        candidates.iter().map(|c| c.row.ticker.clone()).collect(),
        &table.columns,
    );

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| candidates[i].row.score);

    let mut picked: Vec<usize> = Vec::new();
    for &i in &order {
        if picked.len() >= config.max_selected {
            break;
        }
        if !full.is_usable(i) {
            continue;
        }
        let compatible = picked.iter().all(|&p| {
            full.get(i, p)
                .is_some_and(|corr| corr.abs() < config.threshold)
        });
        if compatible {
            picked.push(i);
        }
    }

    let unusable = (0..candidates.len())
        .filter(|&i| !full.is_usable(i))
        .map(|i| candidates[i].row.ticker.clone())
        .collect();

    Ok(Selection {
        selected: picked.iter().map(|&i| candidates[i].row.clone()).collect(),
        ranking: order.iter().map(|&i| candidates[i].row.clone()).collect(),
        correlations: full.sub_matrix(&picked),
        full,
        aligned_rows: table.rows(),
        unusable,
    })
}
