use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
pub const DEFAULT_DEPIX_URL: &str = "https://depix.eulen.app";
pub const DEFAULT_TOKEN_ENV: &str = "DEPIX_BEARER_TOKEN";

#[derive(Debug, Deserialize)]
pub struct Server {
    pub listen: String,
}

#[derive(Debug, Deserialize)]
pub struct Depix {
    pub url: String,
    /// Name of the environment variable holding the bearer token. The token
    /// itself never goes through the config file.
    pub token_env: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub depix: Depix,
}

impl Settings {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.listen", DEFAULT_LISTEN)?
            .set_default("depix.url", DEFAULT_DEPIX_URL)?
            .set_default("depix.token_env", DEFAULT_TOKEN_ENV)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("MOOZE_DEPIX").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn depix_base_url(&self) -> &str {
        self.depix.url.trim_end_matches('/')
    }
}
