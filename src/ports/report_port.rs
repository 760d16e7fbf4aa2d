//! Report generation port trait.

use crate::domain::analysis::Analysis;
use crate::domain::config_validation::ScreenSettings;
use crate::domain::error::DashboardError;
use crate::domain::screener::ScreenOutcome;
use std::path::Path;

/// Port for writing screen and analysis reports.
pub trait ReportPort {
    fn write_screen(
        &self,
        outcome: &ScreenOutcome,
        settings: &ScreenSettings,
        output_path: &Path,
    ) -> Result<(), DashboardError>;

    fn write_analysis(&self, analysis: &Analysis, output_path: &Path)
    -> Result<(), DashboardError>;
}
