//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded first when
//! present) and fall back to the defaults below. CLI flags override them.
//!
//! | Variable | Default |
//! |---|---|
//! | `INVENTORY_CSV_URL` | published inventory sheet |
//! | `INVENTORY_NUMERIC_KEYS` | `order_quantity,default_quantity` |
//! | `INVENTORY_REQUIRED_KEY` | `item_name` |
//! | `INVENTORY_FETCH_TIMEOUT_SECS` | `30` |
//! | `INVENTORY_PORT` | `3000` |

use std::collections::HashSet;
use std::env;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::fetch::DEFAULT_TIMEOUT_SECS;
use crate::parser::ParseOptions;

/// Published CSV export of the inventory sheet.
pub const DEFAULT_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQxaY0FXgYSKVrYoo-1k9bkSQDjZPKwpOnvQbYWB1QW4XT9rwU0GJUq4lN0YLRMXKXS4XHi2MsTfZLM/pub?gid=917352588&single=true&output=csv";

/// Columns stored as numbers.
pub const DEFAULT_NUMERIC_KEYS: &[&str] = &["order_quantity", "default_quantity"];

/// Column that must be filled for a row to count.
pub const DEFAULT_REQUIRED_KEY: &str = "item_name";

/// HTTP API port.
pub const DEFAULT_PORT: u16 = 3000;

pub const ENV_CSV_URL: &str = "INVENTORY_CSV_URL";
pub const ENV_NUMERIC_KEYS: &str = "INVENTORY_NUMERIC_KEYS";
pub const ENV_REQUIRED_KEY: &str = "INVENTORY_REQUIRED_KEY";
pub const ENV_FETCH_TIMEOUT: &str = "INVENTORY_FETCH_TIMEOUT_SECS";
pub const ENV_PORT: &str = "INVENTORY_PORT";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub csv_url: String,
    pub numeric_keys: HashSet<String>,
    pub required_key: String,
    pub fetch_timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_url: DEFAULT_CSV_URL.to_string(),
            numeric_keys: DEFAULT_NUMERIC_KEYS.iter().map(|k| k.to_string()).collect(),
            required_key: DEFAULT_REQUIRED_KEY.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_CSV_URL) {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::Empty(ENV_CSV_URL.to_string()));
            }
            config.csv_url = url.to_string();
        }

        if let Some(keys) = lookup(ENV_NUMERIC_KEYS) {
            config.numeric_keys = parse_key_list(&keys);
        }

        if let Some(key) = lookup(ENV_REQUIRED_KEY) {
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Empty(ENV_REQUIRED_KEY.to_string()));
            }
            config.required_key = key.to_string();
        }

        if let Some(secs) = lookup(ENV_FETCH_TIMEOUT) {
            config.fetch_timeout = Duration::from_secs(parse_number_var(ENV_FETCH_TIMEOUT, &secs)?);
        }

        if let Some(port) = lookup(ENV_PORT) {
            config.port = parse_number_var(ENV_PORT, &port)?;
        }

        Ok(config)
    }

    /// Parser options matching this configuration.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            numeric_keys: self.numeric_keys.clone(),
            required_key: Some(self.required_key.clone()),
        }
    }
}

/// Split a comma list into trimmed, non-empty keys.
fn parse_key_list(value: &str) -> HashSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number_var<T: std::str::FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.numeric_keys.contains("order_quantity"));
        assert!(config.numeric_keys.contains("default_quantity"));
        assert_eq!(config.required_key, "item_name");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_CSV_URL, "http://localhost:9000/sheet.csv"),
            (ENV_NUMERIC_KEYS, " price , stock ,,"),
            (ENV_REQUIRED_KEY, "sku"),
            (ENV_FETCH_TIMEOUT, "5"),
            (ENV_PORT, "8080"),
        ]))
        .unwrap();

        assert_eq!(config.csv_url, "http://localhost:9000/sheet.csv");
        assert_eq!(config.numeric_keys.len(), 2);
        assert!(config.numeric_keys.contains("price"));
        assert!(config.numeric_keys.contains("stock"));
        assert_eq!(config.required_key, "sku");
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_blank_url_rejected() {
        let err = Config::from_lookup(lookup_from(&[(ENV_CSV_URL, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Empty(_)));
    }

    #[test]
    fn test_parse_options_carry_keys() {
        let options = Config::default().parse_options();
        assert_eq!(options.required_key.as_deref(), Some("item_name"));
        assert!(options.numeric_keys.contains("default_quantity"));
    }
}
