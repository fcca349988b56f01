//! Server configuration: an optional TOML file with defaults for every
//! field, overridable by command-line flags at startup.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, host:port.
    pub bind: String,
    /// Path to the stroke dataset CSV.
    pub data_path: PathBuf,
    /// Allow any origin/headers on responses (the dashboard is served from
    /// a different origin).
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            data_path: PathBuf::from("data/stroke_data.csv"),
            cors_allow_any: true,
        }
    }
}

impl ServerConfig {
    /// Reads configuration from a TOML file. Missing fields take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("could not read config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .wrap_err_with(|| format!("could not parse config file {}", path.display()))?;
        Ok(config)
    }

    /// File config when a path is given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_fields_missing() {
        let config: ServerConfig = toml::from_str("bind = \"0.0.0.0:9100\"").unwrap();
        assert_eq!(config.bind, "0.0.0.0:9100");
        assert_eq!(config.data_path, PathBuf::from("data/stroke_data.csv"));
        assert!(config.cors_allow_any);
    }

    #[test]
    fn full_file_round_trips() {
        let config = ServerConfig {
            bind: "10.0.0.1:8080".to_string(),
            data_path: PathBuf::from("/srv/stroke.csv"),
            cors_allow_any: false,
        };
        let raw = toml::to_string(&config).unwrap();
        let parsed: ServerConfig = toml::from_str(&raw).unwrap();
        assert_eq!(parsed, config);
    }
}
