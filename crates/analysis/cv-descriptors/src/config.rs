//! Session configuration

use serde::{Deserialize, Serialize};

/// Knobs of a [`crate::ModuleSession`]
///
/// ```toml
/// builtins_package = "jet"
/// report_override_conflicts = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Package holding `Array` and `String`, used by synthesized enum members
    #[serde(default = "default_builtins_package")]
    pub builtins_package: String,

    /// Whether override conflicts are logged when they are dropped
    #[serde(default = "default_report_override_conflicts")]
    pub report_override_conflicts: bool,
}

fn default_builtins_package() -> String {
    "jet".to_owned()
}

const fn default_report_override_conflicts() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            builtins_package: default_builtins_package(),
            report_override_conflicts: default_report_override_conflicts(),
        }
    }
}

/// Error reading a [`SessionConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The text is not valid TOML for a session configuration
    #[error("invalid session configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The builtins package is not a dotted package path
    #[error("invalid builtins package `{0}`")]
    BuiltinsPackage(String),
}

impl SessionConfig {
    /// Parses a configuration; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys, and
    /// [`ConfigError::BuiltinsPackage`] if the builtins package has empty segments.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if config.builtins_package.split('.').any(str::is_empty) {
            return Err(ConfigError::BuiltinsPackage(config.builtins_package));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = SessionConfig::from_toml_str("report_override_conflicts = false").unwrap();
        assert_eq!(config.builtins_package, "jet");
        assert!(!config.report_override_conflicts);
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            SessionConfig::from_toml_str("colour = 1"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SessionConfig::from_toml_str("builtins_package = \"kotlin..x\""),
            Err(ConfigError::BuiltinsPackage(_))
        ));
    }
}
