use sealbid_types::{Amount, MAX_SECRET_LENGTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("max_secret_len {value} exceeds wire limit {max}")]
    SecretLimitTooLarge { value: usize, max: usize },
}

/// Tunables for a single auction instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuctionConfig {
    /// Smallest deposit accepted by `bid`.
    #[serde(default = "default_min_deposit")]
    pub min_deposit: Amount,
    #[serde(default = "default_max_secret_len")]
    pub max_secret_len: usize,
    /// Keep the deposits of bidders who never reveal instead of refunding them.
    #[serde(default)]
    pub forfeit_unrevealed: bool,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            min_deposit: default_min_deposit(),
            max_secret_len: default_max_secret_len(),
            forfeit_unrevealed: false,
        }
    }
}

impl AuctionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_nonzero_u64("min_deposit", self.min_deposit)?;
        ensure_nonzero_u64("max_secret_len", self.max_secret_len as u64)?;
        if self.max_secret_len > MAX_SECRET_LENGTH {
            return Err(ConfigError::SecretLimitTooLarge {
                value: self.max_secret_len,
                max: MAX_SECRET_LENGTH,
            });
        }
        Ok(())
    }
}

fn default_min_deposit() -> Amount {
    1
}

fn default_max_secret_len() -> usize {
    MAX_SECRET_LENGTH
}

fn ensure_nonzero_u64(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(())
}
