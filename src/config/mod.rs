//! Configuration management for the shared HTTP session.
//!
//! Configuration is loaded from a JSON settings value under the
//! `"networkable"` key, merged with defaults and held in a process-wide
//! instance.

pub mod schema;

pub use schema::{ClientConfig, ConfigError};

use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::RwLock;

/// Key under which settings are read.
pub const SETTINGS_KEY: &str = "networkable";

/// Global configuration instance.
static CONFIG: Lazy<RwLock<ClientConfig>> = Lazy::new(|| RwLock::new(ClientConfig::default()));

/// Loads configuration from a settings JSON value.
///
/// Unparseable settings are logged and replaced by defaults. Settings that
/// parse but fail validation are rejected and the global configuration is
/// left untouched.
///
/// # Example
///
/// ```no_run
/// use networkable::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "networkable": {
///         "timeout": 10000,
///         "validateSsl": false
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.timeout, 10000);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();

    if let Some(settings) = settings_json.as_ref().and_then(|s| s.get(SETTINGS_KEY)) {
        match serde_json::from_value::<ClientConfig>(settings.clone()) {
            Ok(user_config) => config = user_config,
            Err(e) => {
                log::warn!("Failed to parse {} settings: {}. Using defaults.", SETTINGS_KEY, e);
            }
        }
    }

    config.validate()?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Gets a copy of the current global configuration.
pub fn get_config() -> ClientConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| ClientConfig::default())
}

/// Updates the configuration in place.
///
/// Reverts to defaults if the update leaves the configuration invalid.
///
/// ```no_run
/// use networkable::config::update_config;
///
/// update_config(|config| {
///     config.timeout = 5000;
/// });
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut ClientConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            log::warn!("Configuration validation failed after update: {}", e);
            *config = ClientConfig::default();
        }
    }
}

/// Resets the configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = ClientConfig::default();
    }
}
