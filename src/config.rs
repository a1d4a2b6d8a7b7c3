//! Configuration module
//!
//! Loads configuration from environment variables, with defaults suitable
//! for embedding the ledger directly (tests, demos).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

/// Ledger configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Balance granted to every new account on creation.
    pub opening_balance: Decimal,

    /// Maximum wait for an aggregate lock before giving up.
    pub lock_timeout: Duration,

    /// Age after which a non-terminal transaction is considered stalled.
    pub transaction_timeout: Duration,

    /// How often the rollback sweep runs.
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            opening_balance: Decimal::new(100000, 2),
            lock_timeout: Duration::from_secs(5),
            transaction_timeout: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let opening_balance = match env::var("OPENING_BALANCE") {
            Ok(raw) => {
                Decimal::from_str(&raw).map_err(|_| ConfigError::InvalidValue("OPENING_BALANCE"))?
            }
            Err(_) => defaults.opening_balance,
        };

        let lock_timeout = duration_from_env("LOCK_TIMEOUT_SECS", 1, defaults.lock_timeout)?;
        let transaction_timeout =
            duration_from_env("TRANSACTION_TIMEOUT_MINUTES", 60, defaults.transaction_timeout)?;
        let sweep_interval = duration_from_env("SWEEP_INTERVAL_SECS", 1, defaults.sweep_interval)?;

        Ok(Self {
            opening_balance,
            lock_timeout,
            transaction_timeout,
            sweep_interval,
        })
    }
}

fn duration_from_env(
    var: &'static str,
    unit_secs: u64,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(raw) => {
            let value: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue(var))?;
            Ok(Duration::from_secs(value * unit_secs))
        }
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.opening_balance, dec!(1000.00));
        assert_eq!(config.lock_timeout, Duration::from_secs(5));
        assert_eq!(config.transaction_timeout, Duration::from_secs(1800));
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
    }
}
