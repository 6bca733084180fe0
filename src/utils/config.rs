use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

use crate::services::DEFAULT_SHIPPING_RATE;

pub const DEFAULT_STARTING_BALANCE: u32 = 500;

#[derive(Debug, Clone)]
pub struct Config {
    pub starting_balance: Decimal,
    pub shipping_rate: Decimal,
    pub log_level: String,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_balance: Decimal::from(DEFAULT_STARTING_BALANCE),
            shipping_rate: Decimal::from(DEFAULT_SHIPPING_RATE),
            log_level: "warn".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Config::default();
        let config = Config {
            starting_balance: decimal_var("SHOP_STARTING_BALANCE")?
                .unwrap_or(defaults.starting_balance),
            shipping_rate: decimal_var("SHOP_SHIPPING_RATE")?.unwrap_or(defaults.shipping_rate),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.starting_balance.is_sign_negative() && !self.starting_balance.is_zero() {
            return Err(anyhow::anyhow!("SHOP_STARTING_BALANCE must not be negative"));
        }

        if self.shipping_rate.is_sign_negative() && !self.shipping_rate.is_zero() {
            return Err(anyhow::anyhow!("SHOP_SHIPPING_RATE must not be negative"));
        }

        if self.log_level.trim().is_empty() {
            return Err(anyhow::anyhow!("LOG_LEVEL is empty"));
        }

        Ok(())
    }
}

fn decimal_var(key: &str) -> anyhow::Result<Option<Decimal>> {
    match env::var(key) {
        Ok(raw) => Decimal::from_str(raw.trim())
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} is not a valid amount ({}): {}", key, raw, e)),
        Err(_) => Ok(None),
    }
}
