//! Machine limits from `kleene.toml`.
//!
//! Search order:
//! 1. `--config <path>` when given (must exist)
//! 2. The working directory and its ancestors
//! 3. Defaults

use anyhow::{Context, Result};
use kleene::Limits;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "kleene.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub limits: Limits,
}

pub enum ConfigSource {
    /// Read from a config file
    File(PathBuf),
    /// Default values (no config found)
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Default => f.write_str("defaults"),
        }
    }
}

/// Searches upward from `start` for `kleene.toml`.
fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn load(explicit: Option<&Path>) -> Result<(Config, ConfigSource)> {
    if let Some(path) = explicit {
        return Ok((read_config(path)?, ConfigSource::File(path.to_path_buf())));
    }
    let found = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config(&cwd));
    match found {
        Some(path) => Ok((read_config(&path)?, ConfigSource::File(path))),
        None => Ok((Config::default(), ConfigSource::Default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_limits_keep_defaults() {
        let config: Config = toml::from_str("[limits]\nmax_depth = 8\n").unwrap();
        assert_eq!(config.limits.max_depth, 8);
        assert_eq!(config.limits.max_steps, Limits::default().max_steps);
    }

    #[test]
    fn empty_file_is_the_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(toml::from_str::<Config>("[limit]\nmax_depth = 8\n").is_err());
    }

    #[test]
    fn search_walks_up_to_the_config() {
        let root = std::env::temp_dir().join(format!("kleene-config-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(CONFIG_FILE_NAME), "[limits]\nmax_steps = 5\n").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, root.join(CONFIG_FILE_NAME));
        assert_eq!(read_config(&found).unwrap().limits.max_steps, 5);

        std::fs::remove_dir_all(&root).unwrap();
    }
}
