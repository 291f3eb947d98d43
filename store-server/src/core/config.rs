use std::path::PathBuf;
use std::str::FromStr;

use crate::orders::OrderPolicy;
use crate::pricing::PricingConfig;
use crate::services::cart_service::DEFAULT_MAX_CART_QUANTITY;

const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | |
/// |----------|---------|---|
/// | WORK_DIR | ./data | database and log root |
/// | HTTP_PORT | 3000 | |
/// | ENVIRONMENT | development | development, staging or production |
/// | LOG_LEVEL | info | overridden by RUST_LOG |
/// | LOG_DIR | (stdout) | daily rolling log files when set |
/// | LOG_JSON | false | JSON log lines |
/// | PAYMENT_KEY_SECRET | (empty) | gateway HMAC secret |
/// | FREE_SHIPPING_THRESHOLD | 500 | |
/// | SHIPPING_CHARGE | 40 | |
/// | RETURN_WINDOW_DAYS | 7 | |
/// | MAX_CART_QUANTITY | 5 | per product |
/// | MAX_CONCURRENT_REQUESTS | 100 | in-flight HTTP requests |
///
/// A `.env` file in the working directory is loaded first.
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub payment_key_secret: String,
    pub free_shipping_threshold: f64,
    pub shipping_charge: f64,
    pub return_window_days: u32,
    pub max_cart_quantity: u32,
    pub max_concurrent_requests: usize,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = OrderPolicy::default();

        Self {
            work_dir: var("WORK_DIR").unwrap_or_else(|| "./data".into()),
            http_port: parse_var(&var, "HTTP_PORT").unwrap_or(3000),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: var("LOG_DIR").filter(|d| !d.is_empty()),
            log_json: parse_var(&var, "LOG_JSON").unwrap_or(false),
            payment_key_secret: var("PAYMENT_KEY_SECRET").unwrap_or_default(),
            free_shipping_threshold: parse_var(&var, "FREE_SHIPPING_THRESHOLD")
                .unwrap_or(defaults.pricing.free_shipping_threshold),
            shipping_charge: parse_var(&var, "SHIPPING_CHARGE").unwrap_or(defaults.pricing.shipping_charge),
            return_window_days: parse_var(&var, "RETURN_WINDOW_DAYS").unwrap_or(defaults.return_window_days),
            max_cart_quantity: parse_var(&var, "MAX_CART_QUANTITY").unwrap_or(DEFAULT_MAX_CART_QUANTITY),
            max_concurrent_requests: parse_var(&var, "MAX_CONCURRENT_REQUESTS")
                .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS),
        }
    }

    /// Defaults only, ignoring the process environment
    #[cfg(test)]
    pub(crate) fn defaults() -> Self {
        Self::from_lookup(|_| None)
    }

    /// Override the work directory and port (tests)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn pricing(&self) -> PricingConfig {
        PricingConfig {
            free_shipping_threshold: self.free_shipping_threshold,
            shipping_charge: self.shipping_charge,
        }
    }

    pub fn order_policy(&self) -> OrderPolicy {
        OrderPolicy {
            pricing: self.pricing(),
            return_window_days: self.return_window_days,
        }
    }

    /// work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("store.redb")
    }

    /// Create the work directory layout
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        if let Some(dir) = &self.log_dir {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
