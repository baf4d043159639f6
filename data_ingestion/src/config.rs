use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "rf_model.bin";
pub const DEFAULT_MARKET_DATA_URL: &str = "https://api.binance.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub model_path: PathBuf,
    pub market_data_url: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            market_data_url: DEFAULT_MARKET_DATA_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Defaults, then an optional `predictor.toml`, then environment variables
    /// (`PORT`, `MODEL_PATH`, `MARKET_DATA_URL`, `REQUEST_TIMEOUT_SECS`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .set_default("port", DEFAULT_PORT)?
            .set_default("model_path", DEFAULT_MODEL_PATH)?
            .set_default("market_data_url", DEFAULT_MARKET_DATA_URL)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .add_source(File::with_name("predictor").required(false))
            .add_source(env.try_parsing(true))
            .build()?;

        cfg.try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(map))
    }

    #[test]
    fn default_matches_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.model_path, PathBuf::from("rf_model.bin"));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert!(cfg.market_data_url.starts_with("https://"));
    }

    #[test]
    fn port_comes_from_environment() {
        let cfg = AppConfig::from_environment(env(&[("PORT", "9001")])).unwrap();
        assert_eq!(cfg.port, 9001);
        assert_eq!(cfg.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    }

    #[test]
    fn environment_overrides_model_path_and_timeout() {
        let cfg = AppConfig::from_environment(env(&[
            ("MODEL_PATH", "/var/lib/predictor/model.bin"),
            ("REQUEST_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(cfg.model_path, PathBuf::from("/var/lib/predictor/model.bin"));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = AppConfig::from_environment(env(&[])).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.market_data_url, DEFAULT_MARKET_DATA_URL);
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        assert!(AppConfig::from_environment(env(&[("PORT", "eighty")])).is_err());
    }
}
