use serde::Deserialize;
use std::{net::SocketAddr, path::PathBuf, time::Duration};

pub const ENV_PREFIX: &str = "NEWS_VERDICT";
pub const CONFIG_FILE: &str = "news-verdict";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub artifact_dir: PathBuf,
    #[serde(default)]
    pub stopwords_path: Option<PathBuf>,
    pub fetch_timeout_seconds: u64,
    pub user_agent: String,
}

impl Config {
    /// Defaults, then `news-verdict.toml` if present, then `NEWS_VERDICT_*`
    /// environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000_i64)?
            .set_default("artifact_dir", "models/demo")?
            .set_default("fetch_timeout_seconds", 10_i64)?
            .set_default("user_agent", "Mozilla/5.0")
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = Config::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.artifact_dir, PathBuf::from("models/demo"));
        assert!(config.stopwords_path.is_none());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_overrides() {
        let config: Config = Config::builder()
            .unwrap()
            .set_override("port", 8080_i64)
            .unwrap()
            .set_override("artifact_dir", "models/vns")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.artifact_dir, PathBuf::from("models/vns"));
    }
}
