use std::time::Duration;

use log::{info, warn};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;

const HOST_VAR: &str = "DBDESK_HOST";
const PORT_VAR: &str = "DBDESK_PORT";

/// Server coordinates used for every connection the app opens.
///
/// Credentials are deliberately absent: they are typed in on the login
/// surface for each session and never read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Defaults, optionally overridden by `DBDESK_HOST` / `DBDESK_PORT`
    /// (a `.env` file in the working directory is honoured).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_VAR).map(|h| h.trim().to_string())
            && !host.is_empty()
        {
            config.host = host;
        }

        if let Some(raw) = lookup(PORT_VAR) {
            match raw.trim().parse::<u16>() {
                Ok(port) if port != 0 => config.port = port,
                _ => warn!("Ignoring invalid {}={:?}, using {}", PORT_VAR, raw, config.port),
            }
        }

        config
    }
}

/// Same setup the desktop entrypoint has always used: env_logger with our
/// crate at debug level, overridable through `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_module("dbdesk", log::LevelFilter::Debug)
        .is_test(false)
        .try_init();
    info!("dbdesk {} starting", env!("CARGO_PKG_VERSION"));
}
