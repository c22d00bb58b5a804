//! Configuration file loading for the command-line front end.
//!
//! Settings live in an optional TOML file; flags given on the command line
//! override whatever the file says.
//!
//! ```toml
//! move_time_ms = 2000
//!
//! [search]
//! max_depth = 9
//! tt_bits = 22
//! ```

use std::path::{Path, PathBuf};

use chess_engine::search::tt::MAX_TT_BITS;
use chess_engine::SearchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The transposition table size is beyond what the engine accepts.
    #[error("search.tt_bits = {bits} is too large (at most {max})")]
    TtBitsTooLarge { bits: u8, max: u8 },
}

/// Everything the `search` command can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Wall-clock budget per search. `None` searches to full depth.
    #[serde(default)]
    pub move_time_ms: Option<u64>,

    /// Depth and table size. Missing keys keep their defaults.
    #[serde(default)]
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read,
    /// [`ConfigError::ParseError`] if it contains invalid TOML, or
    /// [`ConfigError::TtBitsTooLarge`] if the table size is out of range.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but that the engine cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bits = self.search.tt_bits;
        if bits > MAX_TT_BITS {
            return Err(ConfigError::TtBitsTooLarge {
                bits,
                max: MAX_TT_BITS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = EngineConfig::parse("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.search.max_depth, 7);
        assert_eq!(config.search.tt_bits, 20);
        assert_eq!(config.move_time_ms, None);
    }

    #[test]
    fn partial_search_table_keeps_other_defaults() {
        let config = EngineConfig::parse("move_time_ms = 1500\n[search]\nmax_depth = 9\n").unwrap();
        assert_eq!(config.search.max_depth, 9);
        assert_eq!(config.search.tt_bits, 20);
        assert_eq!(config.move_time_ms, Some(1500));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = EngineConfig::parse("[search\nmax_depth = 3").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));

        let err = EngineConfig::parse("[search]\nmax_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn oversized_table_is_rejected() {
        let err = EngineConfig::parse("[search]\ntt_bits = 48\n").unwrap_err();
        assert!(matches!(err, ConfigError::TtBitsTooLarge { bits: 48, .. }));
        assert!(err.to_string().contains("48"));

        let at_limit = format!("[search]\ntt_bits = {MAX_TT_BITS}\n");
        assert_eq!(EngineConfig::parse(&at_limit).unwrap().search.tt_bits, MAX_TT_BITS);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = EngineConfig::load(Path::new("/nonexistent/engine.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("engine.toml"));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = EngineConfig {
            move_time_ms: Some(250),
            search: SearchConfig {
                max_depth: 5,
                tt_bits: 16,
            },
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::parse(&text).unwrap(), config);
    }
}
