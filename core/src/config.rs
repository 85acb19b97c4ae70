//! Formatter configuration.
//!
//! ```toml
//! dialect = "postgres"
//! beautify = true
//! indent = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

/// Formatter settings, usually loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Target dialect; accepts every alias `Dialect::parse` knows.
    #[serde(default)]
    pub dialect: Dialect,

    /// Start each clause on its own line
    #[serde(default)]
    pub beautify: bool,

    /// Spaces per nesting level when beautifying
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_indent() -> usize {
    FormatConfig::DEFAULT_INDENT
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            beautify: false,
            indent: Self::DEFAULT_INDENT,
        }
    }
}

impl FormatConfig {
    pub const DEFAULT_INDENT: usize = 2;

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = FormatConfig::parse(
            r#"
            dialect = "postgres"
            beautify = true
            indent = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.dialect, Dialect::PostgreSQL);
        assert!(config.beautify);
        assert_eq!(config.indent, 4);
    }

    #[test]
    fn test_defaults() {
        let config = FormatConfig::parse(r#"dialect = "mssql""#).unwrap();
        assert_eq!(config.dialect, Dialect::SqlServer);
        assert!(!config.beautify);
        assert_eq!(config.indent, FormatConfig::DEFAULT_INDENT);

        assert_eq!(FormatConfig::parse("").unwrap(), FormatConfig::default());
    }

    #[test]
    fn test_unknown_dialect_is_a_parse_error() {
        let err = FormatConfig::parse(r#"dialect = "oracle""#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry.toml");
        std::fs::write(&path, "dialect = \"mysql\"\nbeautify = true\n").unwrap();

        let config = FormatConfig::from_file(&path).unwrap();
        assert_eq!(config.dialect, Dialect::MySQL);
        assert!(config.beautify);

        let missing = FormatConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::IoError(_)));
    }
}
