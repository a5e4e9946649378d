// ⚙️ Settings - Configuration as Data
// Zones offered by the converter and its defaults, loaded from a JSON file

use crate::timezone::{LocalTimePolicy, OffsetLookup, ZoneId};
use crate::error::ToolResult;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Suggestions shown by the converter; any IANA name is still accepted
pub const COMMON_ZONES: [&str; 12] = [
    "UTC",
    "Europe/London",
    "Europe/Berlin",
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "Asia/Karachi",
    "Asia/Dubai",
    "Asia/Tokyo",
    "Asia/Kolkata",
    "Australia/Sydney",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Zones listed by `zones` and cycled through in the UI
    pub common_zones: Vec<String>,

    pub default_from_zone: String,

    pub default_to_zone: String,

    /// Handling of wall-clock readings in DST gaps/overlaps
    pub local_time_policy: LocalTimePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            common_zones: COMMON_ZONES.iter().map(|z| z.to_string()).collect(),
            default_from_zone: "UTC".to_string(),
            default_to_zone: "Asia/Karachi".to_string(),
            local_time_policy: LocalTimePolicy::Reject,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse settings JSON")
    }

    /// File when given, built-in defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Settings::default()),
        }
    }

    /// Every configured zone must resolve in `lookup`
    pub fn validate(&self, lookup: &impl OffsetLookup) -> ToolResult<()> {
        let configured = self
            .common_zones
            .iter()
            .chain([&self.default_from_zone, &self.default_to_zone]);
        for zone in configured {
            lookup.resolve(&ZoneId::from(zone.as_str()))?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::timezone::{OffsetTable, TzDatabase};

    #[test]
    fn test_defaults_validate_against_database() {
        let settings = Settings::default();
        assert_eq!(settings.common_zones.len(), 12);
        assert!(settings.validate(&TzDatabase).is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(
            r#"{ "default_to_zone": "Asia/Tokyo", "local_time_policy": "prefer_standard" }"#,
        )
        .unwrap();

        assert_eq!(settings.default_from_zone, "UTC");
        assert_eq!(settings.default_to_zone, "Asia/Tokyo");
        assert_eq!(settings.local_time_policy, LocalTimePolicy::PreferStandard);
        assert_eq!(settings.common_zones.len(), 12);
    }

    #[test]
    fn test_bad_json_is_reported() {
        let err = Settings::from_json(r#"{ "local_time_policy": "sometimes" }"#).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings JSON"));
    }

    #[test]
    fn test_unknown_configured_zone_fails_validation() {
        let settings = Settings {
            default_to_zone: "Atlantis/Capital".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            settings.validate(&TzDatabase),
            Err(ToolError::UnknownZone("Atlantis/Capital".to_string()))
        );

        let only_utc = OffsetTable::new().with_fixed("UTC", 0);
        let minimal = Settings {
            common_zones: vec!["UTC".to_string()],
            default_from_zone: "UTC".to_string(),
            default_to_zone: "UTC".to_string(),
            local_time_policy: LocalTimePolicy::Reject,
        };
        assert!(minimal.validate(&only_utc).is_ok());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = Settings::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read settings file"));
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }
}
