/*
    Library settings.

    `Settings::default()` never reads the environment. `Settings::from_env()`
    layers BSVLIB_* variables over the defaults:

        BSVLIB_FEE_RATE                 satoshi per byte
        BSVLIB_DUST_LIMIT               smallest change output worth adding
        BSVLIB_TRANSACTION_VERSION
        BSVLIB_TRANSACTION_LOCKTIME
        BSVLIB_TRANSACTION_SEQUENCE
        BSVLIB_BIP44_PATH
*/

use ::config::{Config, ConfigError, Environment, Map};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FEE_RATE: f64 = 0.5;
pub const DEFAULT_DUST_LIMIT: u64 = 135;
pub const DEFAULT_TRANSACTION_VERSION: u32 = 1;
pub const DEFAULT_TRANSACTION_LOCKTIME: u32 = 0;
pub const DEFAULT_TRANSACTION_SEQUENCE: u32 = 0xffff_ffff;
pub const DEFAULT_BIP44_PATH: &str = "m/44'/236'/0'";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub fee_rate: f64,
    pub dust_limit: u64,
    pub transaction_version: u32,
    pub transaction_locktime: u32,
    pub transaction_sequence: u32,
    pub bip44_path: String
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
            dust_limit: DEFAULT_DUST_LIMIT,
            transaction_version: DEFAULT_TRANSACTION_VERSION,
            transaction_locktime: DEFAULT_TRANSACTION_LOCKTIME,
            transaction_sequence: DEFAULT_TRANSACTION_SEQUENCE,
            bip44_path: DEFAULT_BIP44_PATH.to_string()
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// `vars` stands in for the process environment when given.
    fn load(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("fee_rate", DEFAULT_FEE_RATE)?
            .set_default("dust_limit", DEFAULT_DUST_LIMIT as i64)?
            .set_default("transaction_version", DEFAULT_TRANSACTION_VERSION as i64)?
            .set_default("transaction_locktime", DEFAULT_TRANSACTION_LOCKTIME as i64)?
            .set_default("transaction_sequence", DEFAULT_TRANSACTION_SEQUENCE as i64)?
            .set_default("bip44_path", DEFAULT_BIP44_PATH)?
            .add_source(
                Environment::with_prefix("BSVLIB")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .source(vars)
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        if !(settings.fee_rate.is_finite() && settings.fee_rate >= 0.0) {
            return Err(ConfigError::Message(format!("fee rate must be a non-negative number, got {}", settings.fee_rate)))
        }
        log::debug!("loaded settings {:?}", settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.fee_rate, 0.5);
        assert_eq!(settings.dust_limit, 135);
        assert_eq!(settings.transaction_version, 1);
        assert_eq!(settings.transaction_locktime, 0);
        assert_eq!(settings.transaction_sequence, 0xffffffff);
        assert_eq!(settings.bip44_path, "m/44'/236'/0'");

        assert_eq!(Settings::load(vars(&[])).unwrap(), settings);
    }

    #[test]
    fn environment_overrides() {
        let settings = Settings::load(vars(&[
            ("BSVLIB_FEE_RATE", "0.05"),
            ("BSVLIB_DUST_LIMIT", "1"),
            ("BSVLIB_TRANSACTION_VERSION", "2"),
            ("BSVLIB_BIP44_PATH", "m/44'/0'/0'")
        ])).unwrap();

        assert_eq!(settings.fee_rate, 0.05);
        assert_eq!(settings.dust_limit, 1);
        assert_eq!(settings.transaction_version, 2);
        assert_eq!(settings.transaction_locktime, 0);
        assert_eq!(settings.bip44_path, "m/44'/0'/0'");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Settings::load(vars(&[("BSVLIB_DUST_LIMIT", "lots")])).is_err());
        assert!(Settings::load(vars(&[("BSVLIB_FEE_RATE", "-1")])).is_err());
    }
}
