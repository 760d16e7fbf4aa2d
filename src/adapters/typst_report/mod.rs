//! Typst report generation.
//!
//! Reads a Typst template (the built-in default or a custom file), resolves
//! its `{{PLACEHOLDER}}` markers from `chart_svg` and `tables` helpers, and
//! writes the final `.typ` file. Compiling it to PDF is left to `typst`.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::analysis::Analysis;
use crate::domain::config_validation::{ReportSettings, ScreenSettings};
use crate::domain::error::DashboardError;
use crate::domain::screener::ScreenOutcome;
use crate::ports::report_port::ReportPort;

/// Zone strips for the selected instruments, in pick order.
fn render_zone_strips(outcome: &ScreenOutcome) -> String {
    let mut out = String::new();
    for row in &outcome.selection.selected {
        let Some(scored) = outcome
            .scored
            .iter()
            .find(|s| s.candidate.row.ticker == row.ticker)
        else {
            continue;
        };
        let zones: Vec<Option<u8>> = scored.zones.iter().map(|&(_, z)| Some(z)).collect();
        let svg = chart_svg::generate_chop_zone_svg(&zones);
        out.push_str(&format!(
            "*{}* ({} to {})\n\n{}\n\n",
            tables::escape(&row.ticker),
            scored.zones.first().map(|z| z.0.to_string()).unwrap_or_default(),
            scored.scored_at,
            chart_svg::embed(&svg, "_No zones._")
        ));
    }
    if out.is_empty() {
        out.push_str("_No instruments selected._\n");
    }
    out
}

/// Resolve every screen placeholder in `template`.
pub fn resolve_screen(template: &str, outcome: &ScreenOutcome, settings: &ScreenSettings) -> String {
    let selection = &outcome.selection;
    template
        .replace(
            "{{SCREEN_SUMMARY}}",
            &tables::render_screen_summary(settings, outcome),
        )
        .replace("{{SELECTION_TABLE}}", &tables::render_selection_table(outcome))
        .replace("{{RANKING_TABLE}}", &tables::render_ranking_table(outcome))
        .replace(
            "{{CORRELATION_TABLE}}",
            &tables::render_correlation_table(&selection.correlations),
        )
        .replace(
            "{{FULL_CORRELATION_TABLE}}",
            &tables::render_correlation_table(&selection.full),
        )
        .replace("{{ZONE_STRIPS}}", &render_zone_strips(outcome))
        .replace("{{SKIPPED_TABLE}}", &tables::render_skipped_table(&outcome.skipped))
}

/// Resolve every analysis placeholder in `template`.
pub fn resolve_analysis(template: &str, analysis: &Analysis) -> String {
    let price_svg = chart_svg::generate_price_svg(analysis);
    let chop_zone = match &analysis.chop_zone {
        Some(cz) => chart_svg::embed(
            &chart_svg::generate_chop_zone_svg(&cz.zones()),
            "_No chop zone data._",
        ),
        None => "_Chop zone not requested._".to_string(),
    };

    template
        .replace("{{TICKER}}", &tables::escape(&analysis.ticker))
        .replace(
            "{{ANALYSIS_SUMMARY}}",
            &tables::render_analysis_summary(analysis),
        )
        .replace(
            "{{PRICE_CHART_SVG}}",
            &chart_svg::embed(&price_svg, "_No price data._"),
        )
        .replace("{{LEGEND}}", &tables::render_legend(analysis))
        .replace("{{CHOP_ZONE_SVG}}", &chop_zone)
        .replace(
            "{{FORECAST_TABLE}}",
            &tables::render_forecast_table(&analysis.forecast),
        )
        .replace("{{RECENT_BARS_TABLE}}", &tables::render_recent_bars(analysis))
}

/// Writes resolved Typst markup to disk.
#[derive(Debug, Clone, Default)]
pub struct TypstReportAdapter {
    screen_template: Option<PathBuf>,
    analysis_template: Option<PathBuf>,
}

impl TypstReportAdapter {
    pub fn new(settings: &ReportSettings) -> Self {
        Self {
            screen_template: settings.screen_template.clone(),
            analysis_template: settings.analysis_template.clone(),
        }
    }

    fn load_template(custom: Option<&Path>, builtin: &'static str) -> Result<String, DashboardError> {
        match custom {
            Some(path) => fs::read_to_string(path).map_err(|e| DashboardError::Report {
                reason: format!("cannot read template {}: {}", path.display(), e),
            }),
            None => Ok(builtin.to_string()),
        }
    }

    fn write(markup: &str, output_path: &Path) -> Result<(), DashboardError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, markup)?;
        tracing::info!(path = %output_path.display(), "report written");
        Ok(())
    }
}

impl ReportPort for TypstReportAdapter {
    fn write_screen(
        &self,
        outcome: &ScreenOutcome,
        settings: &ScreenSettings,
        output_path: &Path,
    ) -> Result<(), DashboardError> {
        let template = Self::load_template(
            self.screen_template.as_deref(),
            default_template::screen_template(),
        )?;
        Self::write(&resolve_screen(&template, outcome, settings), output_path)
    }

    fn write_analysis(
        &self,
        analysis: &Analysis,
        output_path: &Path,
    ) -> Result<(), DashboardError> {
        let template = Self::load_template(
            self.analysis_template.as_deref(),
            default_template::analysis_template(),
        )?;
        Self::write(&resolve_analysis(&template, analysis), output_path)
    }
}
