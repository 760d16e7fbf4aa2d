//! Typed settings built from configuration, with validation.
//!
//! Each builder reads one INI section through [`ConfigPort`], applies
//! defaults, and validates ranges. The CLI may override fields afterwards
//! and re-run `validate` on the result.

use crate::domain::error::DashboardError;
use crate::domain::indicator::chop_zone::{DEFAULT_EMA_LENGTH, DEFAULT_LENGTH};
use crate::domain::indicator::ChopZoneParams;
use crate::domain::interval::Interval;
use crate::domain::ohlcv::PriceField;
use crate::domain::screener::MIN_BARS;
use crate::domain::selector::{SelectorConfig, CORRELATION_THRESHOLD, MAX_SELECTED};
use crate::domain::universe::{parse_tickers, DEFAULT_TICKERS};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_START_DATE: &str = "2025-01-01";
pub const DEFAULT_END_DATE: &str = "2025-07-03";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SMA_FAST: usize = 9;
pub const DEFAULT_SMA_SLOW: usize = 21;
pub const DEFAULT_FORECAST_STEPS: usize = 5;
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "deepseek-chat";
pub const DEFAULT_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    Yahoo,
    Csv,
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(DataSource::Yahoo),
            "csv" => Ok(DataSource::Csv),
            other => Err(format!("unknown data source '{}' (expected yahoo or csv)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub source: DataSource,
    pub csv_dir: PathBuf,
    pub timeout_secs: u64,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSettings {
    pub tickers: Vec<String>,
    pub interval: Interval,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_bars: usize,
    pub selector: SelectorConfig,
    pub chop_zone: ChopZoneParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub interval: Interval,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub forecast_steps: usize,
    pub chop_zone: ChopZoneParams,
}

/// Custom Typst templates; `None` selects the built-in one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportSettings {
    pub screen_template: Option<PathBuf>,
    pub analysis_template: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
}

fn parse_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, DashboardError>
where
    T::Err: std::fmt::Display,
{
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| DashboardError::invalid(section, key, e.to_string())),
        _ => Ok(default),
    }
}

fn get_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, DashboardError> {
    let value = config.get_int(section, key, default as i64);
    usize::try_from(value)
        .map_err(|_| DashboardError::invalid(section, key, format!("{key} must be non-negative")))
}

pub fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        DashboardError::invalid(
            section,
            key,
            format!("invalid {} format, expected YYYY-MM-DD", key),
        )
    })
}

fn date_or_default(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &str,
) -> Result<NaiveDate, DashboardError> {
    let raw = config
        .get_string(section, key)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    parse_date(&raw, section, key)
}

fn chop_zone_params(config: &dyn ConfigPort) -> Result<ChopZoneParams, DashboardError> {
    Ok(ChopZoneParams {
        length: get_usize(config, "indicator", "chop_length", DEFAULT_LENGTH)?,
        ema_length: get_usize(config, "indicator", "chop_ema_length", DEFAULT_EMA_LENGTH)?,
        source: parse_value(config, "indicator", "source", PriceField::Close)?,
    })
}

fn validate_chop_zone(params: &ChopZoneParams) -> Result<(), DashboardError> {
    if params.length == 0 {
        return Err(DashboardError::invalid(
            "indicator",
            "chop_length",
            "chop_length must be at least 1",
        ));
    }
    if params.ema_length == 0 {
        return Err(DashboardError::invalid(
            "indicator",
            "chop_ema_length",
            "chop_ema_length must be at least 1",
        ));
    }
    Ok(())
}

fn validate_dates(start: NaiveDate, end: NaiveDate, section: &str) -> Result<(), DashboardError> {
    if start >= end {
        return Err(DashboardError::invalid(
            section,
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn check_range(
    value: usize,
    min: usize,
    max: usize,
    section: &str,
    key: &str,
) -> Result<(), DashboardError> {
    if value < min || value > max {
        return Err(DashboardError::invalid(
            section,
            key,
            format!("{key} must be between {min} and {max}"),
        ));
    }
    Ok(())
}

pub fn data_settings(config: &dyn ConfigPort) -> Result<DataSettings, DashboardError> {
    let source = parse_value(config, "data", "source", DataSource::Yahoo)?;
    let csv_dir = config.get_string("data", "csv_dir").map(PathBuf::from);
    if source == DataSource::Csv && csv_dir.is_none() {
        return Err(DashboardError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        });
    }
    let timeout = config.get_int("data", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64);
    if timeout <= 0 {
        return Err(DashboardError::invalid(
            "data",
            "timeout_secs",
            "timeout_secs must be positive",
        ));
    }

    Ok(DataSettings {
        source,
        csv_dir: csv_dir.unwrap_or_else(|| PathBuf::from(".")),
        timeout_secs: timeout as u64,
        base_url: config
            .get_string("data", "base_url")
            .filter(|s| !s.trim().is_empty()),
    })
}

impl ScreenSettings {
    pub fn validate(&self) -> Result<(), DashboardError> {
        validate_dates(self.start_date, self.end_date, "screen")?;
        validate_chop_zone(&self.chop_zone)?;
        if self.selector.max_selected == 0 {
            return Err(DashboardError::invalid(
                "screen",
                "max_selected",
                "max_selected must be at least 1",
            ));
        }
        let t = self.selector.threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(DashboardError::invalid(
                "screen",
                "correlation_threshold",
                "correlation_threshold must be in (0, 1]",
            ));
        }
        if self.min_bars == 0 {
            return Err(DashboardError::invalid(
                "screen",
                "min_bars",
                "min_bars must be at least 1",
            ));
        }
        Ok(())
    }
}

pub fn screen_settings(config: &dyn ConfigPort) -> Result<ScreenSettings, DashboardError> {
    let raw_tickers = config
        .get_string("screen", "tickers")
        .unwrap_or_else(|| DEFAULT_TICKERS.to_string());
    let tickers = parse_tickers(&raw_tickers)
        .map_err(|e| DashboardError::invalid("screen", "tickers", e.to_string()))?;

    let settings = ScreenSettings {
        tickers,
        interval: parse_value(config, "screen", "interval", Interval::Day)?,
        start_date: date_or_default(config, "screen", "start_date", DEFAULT_START_DATE)?,
        end_date: date_or_default(config, "screen", "end_date", DEFAULT_END_DATE)?,
        min_bars: get_usize(config, "screen", "min_bars", MIN_BARS)?,
        selector: SelectorConfig {
            max_selected: get_usize(config, "screen", "max_selected", MAX_SELECTED)?,
            threshold: config.get_double("screen", "correlation_threshold", CORRELATION_THRESHOLD),
        },
        chop_zone: chop_zone_params(config)?,
    };
    settings.validate()?;
    Ok(settings)
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), DashboardError> {
        validate_dates(self.start_date, self.end_date, "analysis")?;
        validate_chop_zone(&self.chop_zone)?;
        check_range(self.sma_fast, 1, 50, "analysis", "sma_fast")?;
        check_range(self.sma_slow, 5, 200, "analysis", "sma_slow")?;
        check_range(self.forecast_steps, 1, 30, "analysis", "forecast_steps")?;
        Ok(())
    }
}

pub fn analysis_settings(config: &dyn ConfigPort) -> Result<AnalysisSettings, DashboardError> {
    let settings = AnalysisSettings {
        interval: parse_value(config, "analysis", "interval", Interval::Day)?,
        start_date: date_or_default(config, "analysis", "start_date", DEFAULT_START_DATE)?,
        end_date: date_or_default(config, "analysis", "end_date", DEFAULT_END_DATE)?,
        sma_fast: get_usize(config, "analysis", "sma_fast", DEFAULT_SMA_FAST)?,
        sma_slow: get_usize(config, "analysis", "sma_slow", DEFAULT_SMA_SLOW)?,
        forecast_steps: get_usize(config, "analysis", "forecast_steps", DEFAULT_FORECAST_STEPS)?,
        chop_zone: chop_zone_params(config)?,
    };
    settings.validate()?;
    Ok(settings)
}

pub fn llm_settings(config: &dyn ConfigPort) -> Result<LlmSettings, DashboardError> {
    let non_empty = |key: &str, default: &str| {
        config
            .get_string("llm", key)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };
    let base_url = non_empty("base_url", DEFAULT_LLM_BASE_URL);
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(DashboardError::invalid(
            "llm",
            "base_url",
            "base_url must be an http(s) URL",
        ));
    }
    Ok(LlmSettings {
        base_url,
        model: non_empty("model", DEFAULT_LLM_MODEL),
        api_key_env: non_empty("api_key_env", DEFAULT_API_KEY_ENV),
    })
}

pub fn report_settings(config: &dyn ConfigPort) -> ReportSettings {
    let path = |key: &str| {
        config
            .get_string("report", key)
            .filter(|s| !s.trim().is_empty())
            .map(|s| PathBuf::from(s.trim()))
    };
    ReportSettings {
        screen_template: path("screen_template"),
        analysis_template: path("analysis_template"),
    }
}

impl LlmSettings {
    /// Resolve the API key through `lookup`, normally `std::env::var`.
    pub fn api_key<F>(&self, lookup: F) -> Result<String, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&self.api_key_env)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DashboardError::ConfigMissing {
                section: "llm".into(),
                key: format!("api key (environment variable {})", self.api_key_env),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(err: DashboardError) -> String {
        match err {
            DashboardError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = make_config("");
        let screen = screen_settings(&config).unwrap();
        assert_eq!(screen.tickers.len(), 20);
        assert_eq!(screen.interval, Interval::Day);
        assert_eq!(screen.start_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(screen.end_date, NaiveDate::from_ymd_opt(2025, 7, 3).unwrap());
        assert_eq!(screen.min_bars, 50);
        assert_eq!(screen.selector, SelectorConfig::default());
        assert_eq!(screen.chop_zone, ChopZoneParams::default());

        let analysis = analysis_settings(&config).unwrap();
        assert_eq!(analysis.sma_fast, 9);
        assert_eq!(analysis.sma_slow, 21);
        assert_eq!(analysis.forecast_steps, 5);

        let data = data_settings(&config).unwrap();
        assert_eq!(data.source, DataSource::Yahoo);
        assert_eq!(data.timeout_secs, 30);
        assert_eq!(data.base_url, None);

        let llm = llm_settings(&config).unwrap();
        assert_eq!(llm.base_url, "https://api.deepseek.com/v1");
        assert_eq!(llm.model, "deepseek-chat");
        assert_eq!(llm.api_key_env, "DEEPSEEK_API_KEY");
    }

    #[test]
    fn screen_section_is_read() {
        let config = make_config(
            r#"
[screen]
tickers = aapl, msft
interval = 1wk
start_date = 2024-01-01
end_date = 2024-06-30
max_selected = 3
correlation_threshold = 0.3
min_bars = 60

[indicator]
chop_length = 20
chop_ema_length = 25
source = high
"#,
        );
        let screen = screen_settings(&config).unwrap();
        assert_eq!(screen.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(screen.interval, Interval::Week);
        assert_eq!(screen.selector.max_selected, 3);
        assert_eq!(screen.selector.threshold, 0.3);
        assert_eq!(screen.min_bars, 60);
        assert_eq!(screen.chop_zone.length, 20);
        assert_eq!(screen.chop_zone.ema_length, 25);
        assert_eq!(screen.chop_zone.source, PriceField::High);
    }

    #[test]
    fn duplicate_tickers_rejected() {
        let config = make_config("[screen]\ntickers = AAPL, AAPL\n");
        assert_eq!(invalid_key(screen_settings(&config).unwrap_err()), "tickers");
    }

    #[test]
    fn start_must_precede_end() {
        let config = make_config("[screen]\nstart_date = 2025-01-01\nend_date = 2025-01-01\n");
        assert_eq!(invalid_key(screen_settings(&config).unwrap_err()), "start_date");
    }

    #[test]
    fn malformed_date_rejected() {
        let config = make_config("[analysis]\nend_date = 03/07/2025\n");
        assert_eq!(invalid_key(analysis_settings(&config).unwrap_err()), "end_date");
    }

    #[test]
    fn unknown_interval_rejected() {
        let config = make_config("[screen]\ninterval = 5m\n");
        assert_eq!(invalid_key(screen_settings(&config).unwrap_err()), "interval");
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let config = make_config("[screen]\ncorrelation_threshold = 1.5\n");
        assert_eq!(
            invalid_key(screen_settings(&config).unwrap_err()),
            "correlation_threshold"
        );
    }

    #[test]
    fn zero_chop_length_rejected() {
        let config = make_config("[indicator]\nchop_length = 0\n");
        assert_eq!(invalid_key(screen_settings(&config).unwrap_err()), "chop_length");
    }

    #[test]
    fn analysis_bounds() {
        for (key, value) in [
            ("sma_fast", "0"),
            ("sma_fast", "51"),
            ("sma_slow", "4"),
            ("sma_slow", "201"),
            ("forecast_steps", "0"),
            ("forecast_steps", "31"),
        ] {
            let config = make_config(&format!("[analysis]\n{key} = {value}\n"));
            assert_eq!(invalid_key(analysis_settings(&config).unwrap_err()), key);
        }
        let config = make_config("[analysis]\nsma_fast = 50\nsma_slow = 200\nforecast_steps = 30\n");
        assert!(analysis_settings(&config).is_ok());
    }

    #[test]
    fn negative_value_rejected() {
        let config = make_config("[screen]\nmax_selected = -1\n");
        assert_eq!(invalid_key(screen_settings(&config).unwrap_err()), "max_selected");
    }

    #[test]
    fn csv_source_requires_directory() {
        let config = make_config("[data]\nsource = csv\n");
        assert!(matches!(
            data_settings(&config).unwrap_err(),
            DashboardError::ConfigMissing { key, .. } if key == "csv_dir"
        ));

        let config = make_config("[data]\nsource = csv\ncsv_dir = /tmp/bars\ntimeout_secs = 5\n");
        let data = data_settings(&config).unwrap();
        assert_eq!(data.source, DataSource::Csv);
        assert_eq!(data.csv_dir, PathBuf::from("/tmp/bars"));
        assert_eq!(data.timeout_secs, 5);
    }

    #[test]
    fn unknown_source_rejected() {
        let config = make_config("[data]\nsource = bloomberg\n");
        assert_eq!(invalid_key(data_settings(&config).unwrap_err()), "source");
    }

    #[test]
    fn llm_base_url_must_be_http() {
        let config = make_config("[llm]\nbase_url = ftp://example.com\n");
        assert_eq!(invalid_key(llm_settings(&config).unwrap_err()), "base_url");
    }

    #[test]
    fn report_templates_are_optional() {
        assert_eq!(report_settings(&make_config("")), ReportSettings::default());

        let cfg = make_config("[report]\nscreen_template = /tmp/screen.typ\nanalysis_template =\n");
        let settings = report_settings(&cfg);
        assert_eq!(settings.screen_template, Some(PathBuf::from("/tmp/screen.typ")));
        assert_eq!(settings.analysis_template, None);
    }

    #[test]
    fn api_key_is_resolved_through_lookup() {
        let config = make_config("[llm]\napi_key_env = MY_KEY\n");
        let llm = llm_settings(&config).unwrap();

        let key = llm
            .api_key(|name| (name == "MY_KEY").then(|| "sk-test".to_string()))
            .unwrap();
        assert_eq!(key, "sk-test");

        let err = llm.api_key(|_| None).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigMissing { section, .. } if section == "llm"));
        assert!(llm.api_key(|_| Some("  ".into())).is_err());
    }
}
