use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub sso_url: String,
    pub site_url: String,
    pub popup_timeout_ms: u64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            sso_url: try_load("PAGEKIT_SSO_URL", "https://auth.skystuff.cc"),
            site_url: try_load("PAGEKIT_SITE_URL", "http://localhost:8080"),
            popup_timeout_ms: try_load("PAGEKIT_POPUP_TIMEOUT_MS", "10000"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
