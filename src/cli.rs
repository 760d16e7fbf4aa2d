//! CLI definition and dispatch.
//!
//! Each subcommand runs as a short staged pipeline: load config, build typed
//! settings with CLI overrides applied, wire adapters, run the domain
//! workflow, then print results and write the report. Every failure maps to
//! an exit code through [`DashboardError`].

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::analysis::{analyze, AnalysisRequest, Overlays};
use crate::domain::config_validation::{
    analysis_settings, data_settings, parse_date, report_settings, screen_settings,
    AnalysisSettings, DataSettings, DataSource, ScreenSettings,
};
use crate::domain::error::DashboardError;
use crate::domain::interval::Interval;
use crate::domain::screener::{screen, ScreenRequest};
use crate::domain::sentiment::{analyze_sentiment, SentimentOutcome};
use crate::domain::ticker_finder::find_tickers;
use crate::domain::universe::parse_tickers;
use crate::ports::chat_port::ChatPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::news_port::NewsPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "chopscreen",
    about = "Chop zone screener and single-instrument market analysis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Period overrides shared by `screen` and `analyze`.
#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// Bar interval: 1d, 1wk, 1mo or 1h
    #[arg(long)]
    pub interval: Option<String>,
    /// Start date, YYYY-MM-DD (inclusive)
    #[arg(long)]
    pub start: Option<String>,
    /// End date, YYYY-MM-DD (exclusive)
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(long)]
    pub ticker: String,
    #[command(flatten)]
    pub period: PeriodArgs,
    #[arg(long)]
    pub sma_fast: Option<usize>,
    #[arg(long)]
    pub sma_slow: Option<usize>,
    #[arg(long)]
    pub forecast_steps: Option<usize>,
    /// Add the chop zone strip
    #[arg(long)]
    pub chop_zone: bool,
    /// Add Ichimoku spans
    #[arg(long)]
    pub ichimoku: bool,
    /// Add Bollinger bands
    #[arg(long)]
    pub bollinger: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a basket by chop zone and pick weakly correlated instruments
    Screen {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated tickers (at most 30)
        #[arg(long)]
        tickers: Option<String>,
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(short, long, default_value = "screen.typ")]
        output: PathBuf,
    },
    /// Moving averages, overlays and forecast for one instrument
    Analyze {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        args: AnalyzeArgs,
        #[arg(short, long, default_value = "analysis.typ")]
        output: PathBuf,
    },
    /// Summarise news sentiment for a company
    Sentiment {
        #[arg(long)]
        company: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Ask the chat model for tickers matching a description
    FindTickers {
        #[arg(long)]
        query: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Screen {
            config,
            tickers,
            period,
            output,
        } => run_screen(config.as_ref(), tickers.as_deref(), &period, &output),
        Command::Analyze {
            config,
            args,
            output,
        } => run_analyze(config.as_ref(), &args, &output),
        Command::Sentiment { company, config } => run_sentiment(config.as_ref(), &company),
        Command::FindTickers { query, config } => run_find_tickers(config.as_ref(), &query),
    }
}

fn fail(err: &DashboardError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Load the INI file, or fall back to built-in defaults when none is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn apply_period(
    period: &PeriodArgs,
    section: &str,
    interval: &mut Interval,
    start_date: &mut chrono::NaiveDate,
    end_date: &mut chrono::NaiveDate,
) -> Result<(), DashboardError> {
    if let Some(raw) = &period.interval {
        *interval = raw
            .parse()
            .map_err(|e: String| DashboardError::invalid(section, "interval", e))?;
    }
    if let Some(raw) = &period.start {
        *start_date = parse_date(raw, section, "start_date")?;
    }
    if let Some(raw) = &period.end {
        *end_date = parse_date(raw, section, "end_date")?;
    }
    Ok(())
}

/// Screen settings from config with CLI overrides applied and re-validated.
pub fn build_screen_settings(
    config: &dyn ConfigPort,
    tickers: Option<&str>,
    period: &PeriodArgs,
) -> Result<ScreenSettings, DashboardError> {
    let mut settings = screen_settings(config)?;
    if let Some(raw) = tickers {
        settings.tickers = parse_tickers(raw)
            .map_err(|e| DashboardError::invalid("screen", "tickers", e.to_string()))?;
    }
    apply_period(
        period,
        "screen",
        &mut settings.interval,
        &mut settings.start_date,
        &mut settings.end_date,
    )?;
    settings.validate()?;
    Ok(settings)
}

/// Analysis request from config with CLI overrides applied and re-validated.
pub fn build_analysis_request(
    config: &dyn ConfigPort,
    args: &AnalyzeArgs,
) -> Result<AnalysisRequest, DashboardError> {
    let ticker = args.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(DashboardError::invalid("analysis", "ticker", "ticker is empty"));
    }

    let mut settings: AnalysisSettings = analysis_settings(config)?;
    apply_period(
        &args.period,
        "analysis",
        &mut settings.interval,
        &mut settings.start_date,
        &mut settings.end_date,
    )?;
    if let Some(n) = args.sma_fast {
        settings.sma_fast = n;
    }
    if let Some(n) = args.sma_slow {
        settings.sma_slow = n;
    }
    if let Some(n) = args.forecast_steps {
        settings.forecast_steps = n;
    }
    settings.validate()?;

    Ok(AnalysisRequest {
        ticker,
        settings,
        overlays: Overlays {
            chop_zone: args.chop_zone,
            ichimoku: args.ichimoku,
            bollinger: args.bollinger,
        },
    })
}

/// Market data source named by `[data] source`.
pub fn build_data_port(settings: &DataSettings) -> Result<Box<dyn DataPort>, DashboardError> {
    match settings.source {
        DataSource::Csv => Ok(Box::new(CsvAdapter::new(settings.csv_dir.clone()))),
        #[cfg(feature = "http")]
        DataSource::Yahoo => Ok(Box::new(crate::adapters::yahoo_adapter::YahooAdapter::new(
            settings.base_url.as_deref(),
            settings.timeout_secs,
        )?)),
        #[cfg(not(feature = "http"))]
        DataSource::Yahoo => Err(DashboardError::Http {
            reason: "built without the http feature".into(),
        }),
    }
}

fn run_screen(
    config_path: Option<&PathBuf>,
    tickers: Option<&str>,
    period: &PeriodArgs,
    output: &Path,
) -> ExitCode {
    // Stage 1: Load config
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    // Stage 2: Typed settings
    let settings = match build_screen_settings(&config, tickers, period) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let data = match data_settings(&config) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    // Stage 3: Adapters
    let data_port = match build_data_port(&data) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let report = TypstReportAdapter::new(&report_settings(&config));

    run_screen_pipeline(data_port.as_ref(), &settings, &report, output)
}

pub fn run_screen_pipeline(
    data_port: &dyn DataPort,
    settings: &ScreenSettings,
    report: &dyn ReportPort,
    output: &Path,
) -> ExitCode {
    eprintln!(
        "Screening {} tickers, {} to {} ({})",
        settings.tickers.len(),
        settings.start_date,
        settings.end_date,
        settings.interval
    );

    let request = ScreenRequest {
        tickers: settings.tickers.clone(),
        start_date: settings.start_date,
        end_date: settings.end_date,
        interval: settings.interval,
        chop_zone: settings.chop_zone,
        min_bars: settings.min_bars,
        selector: settings.selector,
    };
    let outcome = match screen(data_port, &request) {
        Ok(o) => o,
        Err(e) => return fail(&e),
    };

    println!("=== Ranking ===");
    for (i, row) in outcome.selection.ranking.iter().enumerate() {
        println!("  {:>2}. {:<10} zone {}", i + 1, row.ticker, row.score);
    }
    println!("\n=== Selected ===");
    if outcome.selection.selected.is_empty() {
        println!("  (none)");
    }
    for row in &outcome.selection.selected {
        println!("  {:<10} zone {}", row.ticker, row.score);
    }
    if !outcome.skipped.is_empty() {
        println!("\n=== Skipped ===");
        for skip in &outcome.skipped {
            println!("  {:<10} {}", skip.ticker, skip.reason);
        }
    }

    match report.write_screen(&outcome, settings, output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_analyze(config_path: Option<&PathBuf>, args: &AnalyzeArgs, output: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let request = match build_analysis_request(&config, args) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let data_port = match data_settings(&config).and_then(|d| build_data_port(&d)) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let report = TypstReportAdapter::new(&report_settings(&config));

    run_analysis_pipeline(data_port.as_ref(), &request, &report, output)
}

pub fn run_analysis_pipeline(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
    report: &dyn ReportPort,
    output: &Path,
) -> ExitCode {
    let analysis = match analyze(data_port, request) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    println!("=== {} ===", analysis.ticker);
    println!("Bars:          {}", analysis.series.len());
    if let Some(last) = analysis.series.bars().last() {
        println!("Last close:    {:.2} ({})", last.close, last.timestamp);
    }
    match &analysis.forecast {
        Ok(points) => {
            println!("Forecast:");
            for p in points {
                println!("  {}  {:.2}", p.timestamp, p.value);
            }
        }
        Err(e) => println!("Forecast:      unavailable ({e})"),
    }

    match report.write_analysis(&analysis, output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// Print the outcome; only a chat failure is a non-zero exit.
pub fn run_sentiment_with(news: &dyn NewsPort, chat: &dyn ChatPort, company: &str) -> ExitCode {
    let outcome = analyze_sentiment(news, chat, company);
    println!("{outcome}");
    match outcome {
        SentimentOutcome::Failed(reason) => ExitCode::from(&DashboardError::Chat { reason }),
        _ => ExitCode::SUCCESS,
    }
}

pub fn run_find_tickers_with(chat: &dyn ChatPort, query: &str) -> ExitCode {
    match find_tickers(chat, query) {
        Ok(found) => {
            println!("{}\n", found.raw);
            println!("Tickers: {}", found.ticker_list());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[cfg(feature = "http")]
fn build_chat_port(
    config: &dyn ConfigPort,
) -> Result<crate::adapters::openai_chat_adapter::OpenAiChatAdapter, DashboardError> {
    let llm = crate::domain::config_validation::llm_settings(config)?;
    let data = data_settings(config)?;
    let api_key = llm.api_key(|name| std::env::var(name).ok())?;
    crate::adapters::openai_chat_adapter::OpenAiChatAdapter::new(&llm, api_key, data.timeout_secs)
}

#[cfg(feature = "http")]
fn run_sentiment(config_path: Option<&PathBuf>, company: &str) -> ExitCode {
    use crate::adapters::yahoo_news_adapter::YahooNewsAdapter;

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let chat = match build_chat_port(&config) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let news = match data_settings(&config)
        .and_then(|d| YahooNewsAdapter::new(d.base_url.as_deref(), d.timeout_secs))
    {
        Ok(n) => n,
        Err(e) => return fail(&e),
    };
    run_sentiment_with(&news, &chat, company)
}

#[cfg(feature = "http")]
fn run_find_tickers(config_path: Option<&PathBuf>, query: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    match build_chat_port(&config) {
        Ok(chat) => run_find_tickers_with(&chat, query),
        Err(e) => fail(&e),
    }
}

#[cfg(not(feature = "http"))]
fn run_sentiment(_config_path: Option<&PathBuf>, _company: &str) -> ExitCode {
    fail(&DashboardError::Http {
        reason: "built without the http feature".into(),
    })
}

#[cfg(not(feature = "http"))]
fn run_find_tickers(_config_path: Option<&PathBuf>, _query: &str) -> ExitCode {
    fail(&DashboardError::Http {
        reason: "built without the http feature".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn analyze_args(ticker: &str) -> AnalyzeArgs {
        AnalyzeArgs {
            ticker: ticker.into(),
            period: PeriodArgs::default(),
            sma_fast: None,
            sma_slow: None,
            forecast_steps: None,
            chop_zone: false,
            ichimoku: false,
            bollinger: false,
        }
    }

    #[test]
    fn cli_parses_screen() {
        let cli = Cli::try_parse_from([
            "chopscreen",
            "screen",
            "--tickers",
            "AAPL,MSFT",
            "--interval",
            "1wk",
            "-o",
            "out.typ",
        ])
        .unwrap();
        match cli.command {
            Command::Screen {
                tickers,
                period,
                output,
                config,
            } => {
                assert_eq!(tickers.as_deref(), Some("AAPL,MSFT"));
                assert_eq!(period.interval.as_deref(), Some("1wk"));
                assert_eq!(output, PathBuf::from("out.typ"));
                assert!(config.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cli_parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "chopscreen",
            "analyze",
            "--ticker",
            "nvda",
            "--sma-fast",
            "5",
            "--bollinger",
            "--chop-zone",
        ])
        .unwrap();
        match cli.command {
            Command::Analyze { args, output, .. } => {
                assert_eq!(args.ticker, "nvda");
                assert_eq!(args.sma_fast, Some(5));
                assert!(args.bollinger && args.chop_zone && !args.ichimoku);
                assert_eq!(output, PathBuf::from("analysis.typ"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cli_requires_query_for_find_tickers() {
        assert!(Cli::try_parse_from(["chopscreen", "find-tickers"]).is_err());
        assert!(Cli::try_parse_from(["chopscreen", "find-tickers", "--query", "banks"]).is_ok());
    }

    #[test]
    fn screen_overrides_replace_config() {
        let cfg = config("[screen]\ntickers = AAPL\ninterval = 1d\n");
        let period = PeriodArgs {
            interval: Some("1h".into()),
            start: Some("2025-02-01".into()),
            end: None,
        };
        let settings = build_screen_settings(&cfg, Some("tsla, nvda"), &period).unwrap();
        assert_eq!(settings.tickers, vec!["TSLA", "NVDA"]);
        assert_eq!(settings.interval, Interval::Hour);
        assert_eq!(settings.start_date.to_string(), "2025-02-01");
        assert_eq!(settings.end_date.to_string(), "2025-07-03");
    }

    #[test]
    fn screen_override_is_validated() {
        let cfg = config("");
        let period = PeriodArgs {
            start: Some("2025-08-01".into()),
            ..PeriodArgs::default()
        };
        let err = build_screen_settings(&cfg, None, &period).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { .. }));

        let err = build_screen_settings(&cfg, Some("A,B,a"), &PeriodArgs::default()).unwrap_err();
        assert!(err.to_string().contains("[screen] tickers"));
    }

    #[test]
    fn analysis_request_applies_overrides() {
        let cfg = config("[analysis]\nsma_fast = 12\n");
        let mut args = analyze_args(" msft ");
        args.sma_slow = Some(50);
        args.ichimoku = true;
        let request = build_analysis_request(&cfg, &args).unwrap();
        assert_eq!(request.ticker, "MSFT");
        assert_eq!(request.settings.sma_fast, 12);
        assert_eq!(request.settings.sma_slow, 50);
        assert!(request.overlays.ichimoku);
    }

    #[test]
    fn analysis_bounds_checked_after_override() {
        let cfg = config("");
        let mut args = analyze_args("MSFT");
        args.forecast_steps = Some(31);
        let err = build_analysis_request(&cfg, &args).unwrap_err();
        assert!(err.to_string().contains("forecast_steps"));

        let err = build_analysis_request(&cfg, &analyze_args("  ")).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { .. }));
    }

    #[test]
    fn csv_source_builds_csv_port() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&format!(
            "[data]\nsource = csv\ncsv_dir = {}\n",
            dir.path().display()
        ));
        let data = data_settings(&cfg).unwrap();
        let port = build_data_port(&data).unwrap();
        let start = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        // Missing file surfaces as an error from the CSV adapter.
        assert!(port.fetch_ohlcv("AAPL", start, end, Interval::Day).is_err());
    }

    #[test]
    fn missing_config_file_exits_with_config_code() {
        let Err(code) = load_config(Some(&PathBuf::from("/nonexistent/chopscreen.ini"))) else {
            panic!("missing config file should not load");
        };
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::from(2)));
    }
}
