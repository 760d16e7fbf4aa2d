//! INI file configuration adapter.

use crate::domain::error::DashboardError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| DashboardError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        tracing::debug!(file = %path.display(), "loaded config");
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, DashboardError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| DashboardError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { ini })
    }

    /// Config with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { ini: Ini::new() }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.ini
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
source = csv
csv_dir = /var/bars
timeout_secs = 15

[screen]
tickers = AAPL, MSFT, KO
correlation_threshold = 0.45
max_selected = 4

[analysis]
chop_zone = yes

[llm]
model = deepseek-chat
"#;

    #[test]
    fn reads_strings() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("screen", "tickers"),
            Some("AAPL, MSFT, KO".to_string())
        );
        assert_eq!(adapter.get_string("data", "csv_dir"), Some("/var/bars".to_string()));
        assert_eq!(adapter.get_string("data", "missing"), None);
        assert_eq!(adapter.get_string("nosection", "key"), None);
    }

    #[test]
    fn reads_numbers_with_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("data", "timeout_secs", 30), 15);
        assert_eq!(adapter.get_int("screen", "max_selected", 5), 4);
        assert_eq!(adapter.get_int("screen", "min_bars", 50), 50);
        assert_eq!(adapter.get_double("screen", "correlation_threshold", 0.5), 0.45);
        assert_eq!(adapter.get_double("screen", "missing", 0.5), 0.5);
    }

    #[test]
    fn non_numeric_falls_back_to_default() {
        let adapter = FileConfigAdapter::from_string("[screen]\nmax_selected = five\n").unwrap();
        assert_eq!(adapter.get_int("screen", "max_selected", 5), 5);
        assert_eq!(adapter.get_double("screen", "max_selected", 0.5), 0.5);
    }

    #[test]
    fn bool_values() {
        let adapter =
            FileConfigAdapter::from_string("[x]\na = true\nb = yes\nc = On\nd = 0\ne = no\nf = maybe\n")
                .unwrap();
        assert!(adapter.get_bool("x", "a", false));
        assert!(adapter.get_bool("x", "b", false));
        assert!(adapter.get_bool("x", "c", false));
        assert!(!adapter.get_bool("x", "d", true));
        assert!(!adapter.get_bool("x", "e", true));
        assert!(adapter.get_bool("x", "f", true));
        assert!(!adapter.get_bool("x", "missing", false));
    }

    #[test]
    fn empty_adapter_returns_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("screen", "tickers"), None);
        assert_eq!(adapter.get_int("screen", "min_bars", 50), 50);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[report]\ntemplate_path = /path/to/template.typ\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "template_path"),
            Some("/path/to/template.typ".to_string())
        );
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").err().unwrap();
        assert!(
            matches!(err, DashboardError::ConfigParse { file, .. } if file == "/nonexistent/path/config.ini")
        );
    }
}
