//! TOML configuration for registry deployments.
//!
//! Deployment parameters (authority identity, deposit floor, starting
//! difficulty) load from a TOML file; every field has a default so a
//! minimal file, or none at all, still yields a working registry. The
//! protocol constants themselves are not configurable: retargeting must
//! be bit-exact across deployments.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::difficulty::MIN_BASE_BITS;
use crate::types::Identity;

/// TOML-serializable registry configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Administrative authority identity (hex-encoded, 0x-prefixed)
    #[serde(default = "default_authority")]
    pub authority: String,
    /// Minimum deposit per registration year, in base units
    #[serde(default = "default_min_deposit")]
    pub min_deposit_per_year: u128,
    /// Starting base difficulty bits (clamped to the protocol range)
    #[serde(default = "default_base_bits")]
    pub initial_base_bits: u32,
}

fn default_authority() -> String {
    Identity::ZERO.to_hex()
}

fn default_min_deposit() -> u128 {
    1_000
}

fn default_base_bits() -> u32 {
    MIN_BASE_BITS
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            authority: default_authority(),
            min_deposit_per_year: default_min_deposit(),
            initial_base_bits: default_base_bits(),
        }
    }
}

impl RegistryConfig {
    /// Load a configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Self::from_toml(&raw)
    }

    /// Parse a configuration from a TOML string
    ///
    /// # Errors
    /// Returns error if the TOML is invalid or the authority malformed
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        // Fail fast on a malformed authority instead of at first use
        Identity::from_hex(&config.authority)
            .map_err(|e| ConfigError::InvalidAuthority(e.to_string()))?;
        Ok(config)
    }

    /// Serialize back to TOML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The parsed authority identity.
    ///
    /// Falls back to the zero identity if the stored hex is malformed,
    /// which `from_toml` prevents for loaded configs.
    #[must_use]
    pub fn authority(&self) -> Identity {
        Identity::from_hex(&self.authority).unwrap_or(Identity::ZERO)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {0}: {1}")]
    Io(String, #[source] std::io::Error),
    /// TOML parse failure
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML serialize failure
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Authority identity is not valid hex
    #[error("invalid authority identity: {0}")]
    InvalidAuthority(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_to_missing_fields() {
        let config = RegistryConfig::from_toml("").unwrap();
        assert_eq!(config.min_deposit_per_year, 1_000);
        assert_eq!(config.initial_base_bits, MIN_BASE_BITS);
        assert!(config.authority().is_zero());
    }

    #[test]
    fn test_explicit_fields_override() {
        let authority = Identity::derive(b"ops");
        let raw = format!(
            "authority = \"{}\"\nmin_deposit_per_year = 250\ninitial_base_bits = 32\n",
            authority.to_hex()
        );
        let config = RegistryConfig::from_toml(&raw).unwrap();
        assert_eq!(config.authority(), authority);
        assert_eq!(config.min_deposit_per_year, 250);
        assert_eq!(config.initial_base_bits, 32);
    }

    #[test]
    fn test_bad_authority_rejected_at_load() {
        let err = RegistryConfig::from_toml("authority = \"0xnothex\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAuthority(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = RegistryConfig::default();
        let raw = config.to_toml().unwrap();
        let back = RegistryConfig::from_toml(&raw).unwrap();
        assert_eq!(back.min_deposit_per_year, config.min_deposit_per_year);
        assert_eq!(back.initial_base_bits, config.initial_base_bits);
    }
}
