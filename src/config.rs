//! Configuration file for regscope
//!
//! Read from `~/.config/regscope/config.toml` unless `--config` points
//! elsewhere. Every field is optional and command line flags win.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Registry address prefix, skips discovery when set
    pub registry: Option<String>,
    /// Directory for cached `oc` output
    pub cache_dir: Option<PathBuf>,
    /// Inventory command to run instead of `oc`
    pub oc_binary: Option<PathBuf>,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("regscope").join("config.toml"))
    }

    /// Load an explicit file (which must exist), or the default file if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Replace file values with any flags given on the command line
    pub fn apply_overrides(
        &mut self,
        registry: Option<String>,
        cache_dir: Option<PathBuf>,
        oc_binary: Option<PathBuf>,
    ) {
        if registry.is_some() {
            self.registry = registry;
        }
        if cache_dir.is_some() {
            self.cache_dir = cache_dir;
        }
        if oc_binary.is_some() {
            self.oc_binary = oc_binary;
        }
    }

    /// Cache directory, the system temp dir by default
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn oc_binary(&self) -> PathBuf {
        self.oc_binary
            .clone()
            .unwrap_or_else(|| PathBuf::from("oc"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"
            registry = "172.30.1.1:5000"
            cache_dir = "/var/cache/regscope"
            oc_binary = "/usr/local/bin/oc"
            "#,
        )
        .unwrap();
        assert_eq!(config.registry.as_deref(), Some("172.30.1.1:5000"));
        assert_eq!(config.cache_dir(), PathBuf::from("/var/cache/regscope"));
        assert_eq!(config.oc_binary(), PathBuf::from("/usr/local/bin/oc"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_dir(), std::env::temp_dir());
        assert_eq!(config.oc_binary(), PathBuf::from("oc"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::parse("registy = \"typo\"").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = Config::parse(r#"registry = "from-file""#).unwrap();
        config.apply_overrides(Some("from-flag".to_string()), None, None);
        assert_eq!(config.registry.as_deref(), Some("from-flag"));

        config.apply_overrides(None, None, None);
        assert_eq!(config.registry.as_deref(), Some("from-flag"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regscope.toml");
        fs::write(&path, "cache_dir = \"/srv/cache\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.cache_dir(), PathBuf::from("/srv/cache"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
