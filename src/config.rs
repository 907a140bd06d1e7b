use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;

fn default_games_dir() -> PathBuf {
    PathBuf::from("games")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings read from an optional TOML file. Command-line flags win over
/// anything set here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where saved games are written and listed from.
    #[serde(default = "default_games_dir")]
    pub games_dir: PathBuf,
    /// Maximum level of log events written to stderr.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { games_dir: default_games_dir(), log_level: default_log_level() }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text).context("malformed configuration")?;
        config.level_filter()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in config file {}", path.display()))
    }

    /// Loads `path` if given, otherwise the defaults, then applies overrides.
    pub fn resolve(
        path: Option<&Path>,
        games_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(dir) = games_dir {
            config.games_dir = dir;
        }
        if let Some(level) = log_level {
            config.log_level = level;
        }
        config.level_filter()?;
        Ok(config)
    }

    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        self.log_level
            .parse::<LevelFilter>()
            .with_context(|| format!("unknown log level {:?}", self.log_level))
    }
}
