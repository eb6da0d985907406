//! API configuration

use core_kernel::{CampusClock, ClockError, Currency, MoneyError};
use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// ISO 4217 code all amounts are booked in
    pub currency: String,
    /// IANA timezone of the campus, e.g. "Asia/Dhaka"
    pub timezone: String,
    /// How many times a collection replans after a write conflict
    pub allocation_retries: u32,
    /// Ledger entries per page
    pub ledger_page_size: u32,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            currency: "BDT".to_string(),
            timezone: "Asia/Dhaka".to_string(),
            allocation_retries: 3,
            ledger_page_size: 10,
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("TUITION"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured currency code
    pub fn currency(&self) -> Result<Currency, MoneyError> {
        self.currency.parse()
    }

    /// Builds the campus clock for the configured timezone
    pub fn clock(&self) -> Result<CampusClock, ClockError> {
        CampusClock::from_name(&self.timezone)
    }
}
