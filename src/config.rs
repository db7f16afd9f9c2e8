use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Configuration file read unless `UNIVOTE_CONFIG` names another.
pub const CONFIG_FILE: &str = "Univote.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "UNIVOTE_";

/// Client configuration, derived from `Univote.toml` and `UNIVOTE_*`
/// environment variables on top of built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    api_base_url: String,
    wallet_rpc_url: Option<String>,
    request_timeout: u64,
    http_trace: bool,
    log_config: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            wallet_rpc_url: None,
            request_timeout: 30,
            http_trace: false,
            log_config: "log4rs.yaml".to_string(),
        }
    }
}

impl Config {
    /// The layered configuration sources, lowest priority first. Callers may
    /// merge further overrides before extracting.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(Env::var_or("UNIVOTE_CONFIG", CONFIG_FILE)))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// Root of the backend, without the `/api/...` suffix.
    /// Configured via `API_BASE_URL`.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Endpoint of the election routes.
    pub fn election_api(&self) -> String {
        format!("{}/api/election", self.api_base_url())
    }

    /// Endpoint of the user routes.
    pub fn user_api(&self) -> String {
        format!("{}/api/user", self.api_base_url())
    }

    /// JSON-RPC endpoint of the wallet, if one is available.
    /// Configured via `WALLET_RPC_URL`.
    pub fn wallet_rpc_url(&self) -> Option<&str> {
        self.wallet_rpc_url.as_deref()
    }

    /// Timeout applied to every HTTP request.
    /// Configured via `REQUEST_TIMEOUT` (seconds).
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Whether individual HTTP requests are logged.
    /// Configured via `HTTP_TRACE`.
    pub fn http_trace(&self) -> bool {
        self.http_trace
    }

    /// Path of the log4rs configuration.
    pub fn log_config(&self) -> &str {
        &self.log_config
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl Config {
        /// The defaults, pointed at test servers.
        pub fn example_for(api_base_url: &str, wallet_rpc_url: Option<&str>) -> Self {
            Self {
                api_base_url: api_base_url.to_string(),
                wallet_rpc_url: wallet_rpc_url.map(str::to_string),
                ..Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults() {
        Jail::expect_with(|_| {
            let config = Config::load()?;
            assert_eq!(config.api_base_url(), "http://localhost:5000");
            assert_eq!(config.election_api(), "http://localhost:5000/api/election");
            assert_eq!(config.user_api(), "http://localhost:5000/api/user");
            assert_eq!(config.wallet_rpc_url(), None);
            assert_eq!(config.request_timeout(), Duration::from_secs(30));
            assert!(!config.http_trace());
            Ok(())
        });
    }

    #[test]
    fn file_then_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                api_base_url = "https://vote.example.edu/"
                wallet_rpc_url = "http://127.0.0.1:1248"
                request_timeout = 5
                "#,
            )?;
            jail.set_env("UNIVOTE_REQUEST_TIMEOUT", "12");
            jail.set_env("UNIVOTE_HTTP_TRACE", "true");

            let config = Config::load()?;
            assert_eq!(config.api_base_url(), "https://vote.example.edu");
            assert_eq!(config.election_api(), "https://vote.example.edu/api/election");
            assert_eq!(config.wallet_rpc_url(), Some("http://127.0.0.1:1248"));
            assert_eq!(config.request_timeout(), Duration::from_secs(12));
            assert!(config.http_trace());
            Ok(())
        });
    }

    #[test]
    fn alternative_config_file() {
        Jail::expect_with(|jail| {
            jail.create_file("staging.toml", r#"api_base_url = "http://staging:5000""#)?;
            jail.set_env("UNIVOTE_CONFIG", "staging.toml");
            assert_eq!(Config::load()?.api_base_url(), "http://staging:5000");
            Ok(())
        });
    }

    #[test]
    fn bad_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.set_env("UNIVOTE_REQUEST_TIMEOUT", "soon");
            assert!(Config::load().is_err());
            Ok(())
        });
    }
}
