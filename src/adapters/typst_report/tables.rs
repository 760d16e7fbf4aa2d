//! Typst table markup for screen and analysis reports.

use crate::domain::analysis::Analysis;
use crate::domain::config_validation::ScreenSettings;
use crate::domain::correlation::CorrelationMatrix;
use crate::domain::forecast::{ForecastError, ForecastPoint};
use crate::domain::indicator::chop_zone::zone_colour;
use crate::domain::screener::{ScoredInstrument, ScreenOutcome, SkippedTicker};

const RECENT_BARS: usize = 10;

/// Escape characters with markup meaning inside a Typst content block.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '#' | '$' | '*' | '_' | '[' | ']' | '@' | '<' | '>' | '`' | '~'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn zone_label(zone: u8) -> &'static str {
    match zone {
        0 => "strong uptrend",
        1 => "uptrend",
        2 => "mild uptrend",
        3 => "weak uptrend",
        4 => "strong downtrend",
        5 => "downtrend",
        6 => "mild downtrend",
        7 => "weak downtrend",
        _ => "choppy",
    }
}

/// Zone number on its display colour. Dark fills get white text.
fn zone_cell(zone: u8) -> String {
    let white_text = matches!(zone, 0 | 1 | 3 | 4 | 5);
    let fill = format!("rgb(\"{}\")", zone_colour(zone));
    if white_text {
        format!("table.cell(fill: {}, text(fill: white, [{}]))", fill, zone)
    } else {
        format!("table.cell(fill: {}, [{}])", fill, zone)
    }
}

/// Heat colour for an absolute correlation.
fn correlation_colour(corr: f64) -> &'static str {
    let abs = corr.abs();
    if abs >= 0.9 {
        "rgb(\"#8B0000\")"
    } else if abs >= 0.7 {
        "rgb(\"#FF4444\")"
    } else if abs >= 0.5 {
        "rgb(\"#FF9090\")"
    } else if abs >= 0.3 {
        "rgb(\"#FFE0E0\")"
    } else {
        "rgb(\"#E0FFE0\")"
    }
}

fn correlation_cell(value: Option<f64>) -> String {
    match value {
        Some(corr) if corr.abs() >= 0.7 => format!(
            "table.cell(fill: {}, text(fill: white, [{:.2}]))",
            correlation_colour(corr),
            corr
        ),
        Some(corr) => format!(
            "table.cell(fill: {}, [{:.2}])",
            correlation_colour(corr),
            corr
        ),
        None => "[-]".to_string(),
    }
}

pub fn render_screen_summary(settings: &ScreenSettings, outcome: &ScreenOutcome) -> String {
    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, left),\n");
    out.push_str("  [*Property*], [*Value*],\n");
    out.push_str(&format!(
        "  [Period], [{} to {}],\n",
        settings.start_date, settings.end_date
    ));
    out.push_str(&format!("  [Interval], [{}],\n", settings.interval));
    out.push_str(&format!(
        "  [Chop zone], [length {}, EMA {}, source {}],\n",
        settings.chop_zone.length, settings.chop_zone.ema_length, settings.chop_zone.source
    ));
    out.push_str(&format!(
        "  [Requested], [{}],\n  [Scored], [{}],\n  [Skipped], [{}],\n",
        settings.tickers.len(),
        outcome.scored.len(),
        outcome.skipped.len()
    ));
    out.push_str(&format!(
        "  [Correlation threshold], [{:.2}],\n  [Aligned return rows], [{}],\n",
        settings.selector.threshold, outcome.selection.aligned_rows
    ));
    out.push_str(")\n");
    out
}

fn find_scored<'a>(outcome: &'a ScreenOutcome, ticker: &str) -> Option<&'a ScoredInstrument> {
    outcome
        .scored
        .iter()
        .find(|s| s.candidate.row.ticker == ticker)
}

pub fn render_selection_table(outcome: &ScreenOutcome) -> String {
    let selected = &outcome.selection.selected;
    if selected.is_empty() {
        return "_No instrument could be selected._\n".to_string();
    }

    let mut out = String::from("#table(\n  columns: 5,\n  align: (right, left, center, left, left),\n");
    out.push_str("  [*\\#*], [*Ticker*], [*Zone*], [*Trend*], [*Scored At*],\n");
    for (i, row) in selected.iter().enumerate() {
        let scored_at = find_scored(outcome, &row.ticker)
            .map(|s| s.scored_at.to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "  [{}], [{}], {}, [{}], [{}],\n",
            i + 1,
            escape(&row.ticker),
            zone_cell(row.score),
            zone_label(row.score),
            scored_at
        ));
    }
    out.push_str(")\n");
    out
}

pub fn render_ranking_table(outcome: &ScreenOutcome) -> String {
    let ranking = &outcome.selection.ranking;
    if ranking.is_empty() {
        return "_No instruments were scored._\n".to_string();
    }
    let selected = outcome.selection.tickers();
    let unusable = &outcome.selection.unusable;

    let mut out = String::from("#table(\n  columns: 5,\n  align: (right, left, center, right, left),\n");
    out.push_str("  [*Rank*], [*Ticker*], [*Zone*], [*Bars*], [*Status*],\n");
    for (i, row) in ranking.iter().enumerate() {
        let bars = find_scored(outcome, &row.ticker)
            .map(|s| s.bars.to_string())
            .unwrap_or_default();
        let status = if selected.contains(&row.ticker.as_str()) {
            "selected"
        } else if unusable.contains(&row.ticker) {
            "no return variance"
        } else {
            "correlated"
        };
        out.push_str(&format!(
            "  [{}], [{}], {}, [{}], [{}],\n",
            i + 1,
            escape(&row.ticker),
            zone_cell(row.score),
            bars,
            status
        ));
    }
    out.push_str(")\n");
    out
}

pub fn render_correlation_table(matrix: &CorrelationMatrix) -> String {
    if matrix.is_empty() {
        return "_No correlations to show._\n".to_string();
    }

    let mut out = format!("#table(\n  columns: {},\n  [],", matrix.len() + 1);
    for ticker in matrix.tickers() {
        out.push_str(&format!(" [*{}*],", escape(ticker)));
    }
    out.push('\n');
    for (ticker, row) in matrix.tickers().iter().zip(matrix.rows()) {
        out.push_str(&format!("  [*{}*],", escape(ticker)));
        for value in row {
            out.push_str(&format!(" {},", correlation_cell(value)));
        }
        out.push('\n');
    }
    out.push_str(")\n");
    out
}

pub fn render_skipped_table(skipped: &[SkippedTicker]) -> String {
    if skipped.is_empty() {
        return "_All requested instruments were scored._\n".to_string();
    }

    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, left),\n");
    out.push_str("  [*Ticker*], [*Reason*],\n");
    for skip in skipped {
        out.push_str(&format!(
            "  [{}], [{}],\n",
            escape(&skip.ticker),
            escape(&skip.reason.to_string())
        ));
    }
    out.push_str(")\n");
    out
}

pub fn render_analysis_summary(analysis: &Analysis) -> String {
    let settings = &analysis.settings;
    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, left),\n");
    out.push_str("  [*Property*], [*Value*],\n");
    out.push_str(&format!(
        "  [Period], [{} to {}],\n  [Interval], [{}],\n  [Bars], [{}],\n",
        settings.start_date,
        settings.end_date,
        settings.interval,
        analysis.series.len()
    ));
    if let Some(last) = analysis.series.bars().last() {
        out.push_str(&format!(
            "  [Last close], [{:.2} ({})],\n",
            last.close, last.timestamp
        ));
    }

    let last_simple = |values: Vec<Option<f64>>| {
        values
            .into_iter()
            .rev()
            .flatten()
            .next()
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string())
    };
    out.push_str(&format!(
        "  [SMA({})], [{}],\n  [SMA({})], [{}],\n",
        settings.sma_fast,
        last_simple(analysis.sma_fast.simple_values()),
        settings.sma_slow,
        last_simple(analysis.sma_slow.simple_values())
    ));

    if let Some(cz) = &analysis.chop_zone {
        let terminal = cz.zones().into_iter().rev().flatten().next();
        let value = match terminal {
            Some(zone) => format!("{} ({})", zone, zone_label(zone)),
            None => "undefined".to_string(),
        };
        out.push_str(&format!("  [Chop zone], [{}],\n", value));
    }
    out.push_str(")\n");
    out
}

pub fn render_legend(analysis: &Analysis) -> String {
    let mut items = vec![
        "#text(fill: rgb(\"#1F77B4\"))[Close]".to_string(),
        format!(
            "#text(fill: rgb(\"#FF7F0E\"))[SMA({})]",
            analysis.settings.sma_fast
        ),
        format!(
            "#text(fill: rgb(\"#2CA02C\"))[SMA({})]",
            analysis.settings.sma_slow
        ),
    ];
    if analysis.bollinger.is_some() {
        items.push("#text(fill: rgb(\"#9467BD\"))[Bollinger bands]".to_string());
    }
    if analysis.ichimoku.is_some() {
        items.push("#text(fill: rgb(\"#26A69A\"))[Span A]".to_string());
        items.push("#text(fill: rgb(\"#EF5350\"))[Span B]".to_string());
    }
    if analysis.forecast.as_ref().is_ok_and(|f| !f.is_empty()) {
        items.push("#text(fill: rgb(\"#D62728\"))[Forecast]".to_string());
    }
    format!("{}\n", items.join(" · "))
}

pub fn render_forecast_table(forecast: &Result<Vec<ForecastPoint>, ForecastError>) -> String {
    let points = match forecast {
        Ok(points) if points.is_empty() => return "_No forecast requested._\n".to_string(),
        Ok(points) => points,
        Err(e) => return format!("_Forecast unavailable: {}._\n", escape(&e.to_string())),
    };

    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, right),\n");
    out.push_str("  [*Timestamp*], [*Forecast Close*],\n");
    for point in points {
        out.push_str(&format!("  [{}], [{:.2}],\n", point.timestamp, point.value));
    }
    out.push_str(")\n");
    out
}

pub fn render_recent_bars(analysis: &Analysis) -> String {
    let bars = analysis.series.bars();
    if bars.is_empty() {
        return "_No bars._\n".to_string();
    }
    let fast = analysis.sma_fast.simple_values();
    let slow = analysis.sma_slow.simple_values();
    let fmt = |v: Option<&Option<f64>>| match v {
        Some(Some(x)) => format!("{:.2}", x),
        _ => "-".to_string(),
    };

    let mut out = String::from(
        "#table(\n  columns: 7,\n  align: (left, right, right, right, right, right, right),\n",
    );
    out.push_str(&format!(
        "  [*Timestamp*], [*Open*], [*High*], [*Low*], [*Close*], [*SMA({})*], [*SMA({})*],\n",
        analysis.settings.sma_fast, analysis.settings.sma_slow
    ));
    let start = bars.len().saturating_sub(RECENT_BARS);
    for (i, bar) in bars.iter().enumerate().skip(start) {
        out.push_str(&format!(
            "  [{}], [{:.2}], [{:.2}], [{:.2}], [{:.2}], [{}], [{}],\n",
            bar.timestamp,
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            fmt(fast.get(i)),
            fmt(slow.get(i))
        ));
    }
    out.push_str(")\n");
    out
}
