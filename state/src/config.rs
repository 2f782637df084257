use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ErrorKind;
use crate::tracker::resync::DEFAULT_RESYNC_WINDOW;

/// State tracker configuration, loadable from a TOML file.
///
/// All fields default to their standard values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum milliseconds between two full state requests
    pub resync_window_ms: u64,
    /// Log packets no hook is bound to at debug instead of trace level
    pub log_unhandled_packets: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            resync_window_ms: DEFAULT_RESYNC_WINDOW.as_millis() as u64,
            log_unhandled_packets: false,
        }
    }
}

impl TrackerConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ErrorKind> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ErrorKind> {
        Ok(toml::from_str(contents)?)
    }

    pub fn resync_window(&self) -> Duration {
        Duration::from_millis(self.resync_window_ms)
    }

    /// Generate a commented default TOML config string.
    pub fn generate_default_toml() -> String {
        r#"# State tracker configuration

# Minimum time in milliseconds between two full state requests.
# Desyncs detected inside this window do not trigger another request.
resync_window_ms = 10000

# Log packets that no hook handles at debug level (otherwise trace)
log_unhandled_packets = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_toml_matches_defaults() {
        let parsed = TrackerConfig::from_toml_str(&TrackerConfig::generate_default_toml()).unwrap();
        assert_eq!(parsed, TrackerConfig::default());
        assert_eq!(parsed.resync_window(), Duration::from_secs(10));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let parsed = TrackerConfig::from_toml_str("log_unhandled_packets = true").unwrap();
        assert_eq!(parsed.resync_window_ms, 10_000);
        assert!(parsed.log_unhandled_packets);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(matches!(
            TrackerConfig::from_toml_str("resync_window_ms = \"soon\""),
            Err(ErrorKind::Config(_))
        ));
    }
}
