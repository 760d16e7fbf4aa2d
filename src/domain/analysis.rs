//! Single-instrument analysis: moving averages, optional overlays, forecast.

use crate::domain::config_validation::AnalysisSettings;
use crate::domain::error::DashboardError;
use crate::domain::forecast::{forecast, ForecastError, ForecastPoint};
use crate::domain::indicator::bollinger::calculate_bollinger_default;
use crate::domain::indicator::{
    calculate_chop_zone, calculate_ichimoku, calculate_sma, IchimokuParams, IndicatorSeries,
};
use crate::domain::ohlcv::{PriceField, PriceSeries};
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Overlays {
    pub chop_zone: bool,
    pub ichimoku: bool,
    pub bollinger: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub settings: AnalysisSettings,
    pub overlays: Overlays,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub ticker: String,
    pub settings: AnalysisSettings,
    pub series: PriceSeries,
    pub sma_fast: IndicatorSeries,
    pub sma_slow: IndicatorSeries,
    pub chop_zone: Option<IndicatorSeries>,
    pub ichimoku: Option<IndicatorSeries>,
    pub bollinger: Option<IndicatorSeries>,
    pub forecast: Result<Vec<ForecastPoint>, ForecastError>,
}

/// Compute every requested study over an already fetched series.
pub fn analyze_series(
    ticker: &str,
    series: PriceSeries,
    settings: &AnalysisSettings,
    overlays: Overlays,
) -> Analysis {
    let sma_fast = calculate_sma(&series, settings.sma_fast, PriceField::Close);
    let sma_slow = calculate_sma(&series, settings.sma_slow, PriceField::Close);
    let chop_zone = overlays
        .chop_zone
        .then(|| calculate_chop_zone(&series, &settings.chop_zone));
    let ichimoku = overlays
        .ichimoku
        .then(|| calculate_ichimoku(&series, &IchimokuParams::default()));
    let bollinger = overlays
        .bollinger
        .then(|| calculate_bollinger_default(&series));

    let forecast = forecast(
        &series,
        settings.forecast_steps,
        settings.interval,
        PriceField::Close,
    );
    if let Err(e) = &forecast {
        tracing::warn!(ticker, error = %e, "forecast unavailable");
    }

    Analysis {
        ticker: ticker.to_string(),
        settings: settings.clone(),
        series,
        sma_fast,
        sma_slow,
        chop_zone,
        ichimoku,
        bollinger,
        forecast,
    }
}

pub fn analyze(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
) -> Result<Analysis, DashboardError> {
    let settings = &request.settings;
    let series = data_port.fetch_ohlcv(
        &request.ticker,
        settings.start_date,
        settings.end_date,
        settings.interval,
    )?;
    if series.is_empty() {
        return Err(DashboardError::NoData {
            ticker: request.ticker.clone(),
        });
    }
    tracing::info!(ticker = %request.ticker, bars = series.len(), "analysing");

    Ok(analyze_series(
        &request.ticker,
        series,
        settings,
        request.overlays,
    ))
}
