pub mod schema;

pub use schema::{NodeConfig, RatesConfig, ServerConfig, SystemConfig};

use nodestat_core::{NodeError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `NodeConfig::default()` if
/// the file doesn't exist so the service always starts with sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<NodeConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(NodeConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| NodeError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse a TOML document; missing tables and fields take their defaults.
pub fn parse(raw: &str) -> Result<NodeConfig> {
    toml::from_str(raw).map_err(|e| NodeError::Config(format!("TOML parse error: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("nodestat").join("nodestat.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("nodestat-does-not-exist.toml");
        let config = load(&path).unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.rates.history_capacity, 5);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = parse(
            r#"
            [rates]
            min_rate = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.rates.min_rate, 0.5);
        assert_eq!(config.rates.history_capacity, 5);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.system.disk_path, PathBuf::from("/"));
    }

    #[test]
    fn reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("nodestat-{}.toml", std::process::id()));
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:9100\"\n").unwrap();
        let config = load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.server.bind, "0.0.0.0:9100");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = parse("[rates\nmin_rate = ").unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn default_path_ends_with_crate_dir() {
        assert!(default_path().ends_with("nodestat/nodestat.toml"));
    }
}
