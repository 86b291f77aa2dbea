use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section may be omitted from `config.toml`; missing sections and
/// fields fall back to their `Default` implementations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub subscription: SubscriptionSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            ConfigError::ValidationError(format!("server.host '{}' is not an IP address", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Connection pool tuning. The URL itself comes from `DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// The plan catalogue and trial length.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscriptionSettings {
    /// Length of the free trial a new user starts with.
    pub trial_days: i64,
    /// ISO 4217 code charged at checkout, e.g. "USD".
    pub currency: String,
    pub monthly_price: Decimal,
    pub yearly_price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            trial_days: 7,
            currency: "USD".to_string(),
            monthly_price: dec!(3.99),
            yearly_price: dec!(30.00),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,tower_http=debug".to_string(),
            directory: None,
            file_prefix: "dugout.log".to_string(),
        }
    }
}

impl Config {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }

        let sub = &self.subscription;
        if sub.trial_days < 0 {
            return Err(ConfigError::ValidationError(
                "subscription.trial_days cannot be negative".to_string(),
            ));
        }
        if sub.monthly_price <= Decimal::ZERO || sub.yearly_price <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "subscription prices must be greater than 0".to_string(),
            ));
        }
        if sub.currency.len() != 3 || !sub.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::ValidationError(format!(
                "subscription.currency '{}' is not a three-letter currency code",
                sub.currency
            )));
        }

        Ok(())
    }
}
