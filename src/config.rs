//! `config.toml` loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::eval::EvalOptions;
use crate::lexer::UnknownChars;
use crate::round::{DEFAULT_PRECISION, MAX_PRECISION};

pub const APP_DIR: &str = "pocket_calc";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Diagnostic, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    #[diagnostic(code(pocket_calc::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}", .path.display())]
    #[diagnostic(code(pocket_calc::config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("precision {precision} is out of range")]
    #[diagnostic(
        code(pocket_calc::config::precision),
        help("use a value between 0 and 10")
    )]
    Precision { precision: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub evaluator: EvaluatorConfig,
    pub history: HistoryConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    pub unknown_chars: UnknownChars,
    pub precision: u32,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            unknown_chars: UnknownChars::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub capacity: Option<usize>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/pocket_calc/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads an explicitly named file; it must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Loads the default file, falling back to defaults when it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents, &path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.evaluator.precision > MAX_PRECISION {
            return Err(ConfigError::Precision {
                precision: self.evaluator.precision,
            });
        }
        Ok(())
    }

    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            unknown_chars: self.evaluator.unknown_chars,
            precision: self.evaluator.precision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> Result<Config, ConfigError> {
        Config::parse(contents, Path::new("config.toml"))
    }

    #[test]
    fn empty_file_is_default() {
        let config = parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.eval_options(), EvalOptions::default());
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn full_file() {
        let config = parse(
            r#"
            [evaluator]
            unknown_chars = "reject"
            precision = 2

            [history]
            capacity = 50
            file = "/tmp/history.txt"

            [log]
            filter = "pocket_calc=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.evaluator.unknown_chars, UnknownChars::Reject);
        assert_eq!(config.evaluator.precision, 2);
        assert_eq!(config.history.capacity, Some(50));
        assert_eq!(config.history.file, Some(PathBuf::from("/tmp/history.txt")));
        assert_eq!(config.log.filter, "pocket_calc=debug");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = parse("[history]\ncapacity = 3\n").unwrap();
        assert_eq!(config.history.capacity, Some(3));
        assert_eq!(config.evaluator.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            parse("[evaluator]\nfoo = 1\n"),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            parse("[evaluator]\nunknown_chars = \"maybe\"\n"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_huge_precision() {
        assert!(matches!(
            parse("[evaluator]\nprecision = 40\n"),
            Err(ConfigError::Precision { precision: 40 })
        ));
    }

    #[test]
    fn missing_explicit_file() {
        let path = std::env::temp_dir().join("pocket_calc-missing/config.toml");
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Read { .. })
        ));
    }
}
