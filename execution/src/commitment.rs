//! Sealed-bid commitments.
//!
//! A bidder publishes `commit(amount, secret)` while bidding is open and later discloses
//! `(amount, secret)` so anyone can check the opening:
//! ```text
//! digest = sha256(COMMITMENT_NAMESPACE || amount (u64 BE) || secret)
//! ```
//! The amount is fixed-width, so no two distinct openings share a pre-image. The secret
//! keeps small amounts from being brute-forced out of the digest.

use commonware_codec::DecodeExt;
use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Hasher,
};
use commonware_utils::from_hex;
use rand::{CryptoRng, RngCore};
use sealbid_types::{Amount, COMMITMENT_NAMESPACE};
use thiserror::Error;

/// Length of secrets produced by [`SealedBid::generate`].
pub const GENERATED_SECRET_LEN: usize = 32;

/// Hex characters in a rendered digest.
pub const DIGEST_HEX_LEN: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("secret must not be empty")]
    EmptySecret,
    #[error("secret is {len} bytes (max {max})")]
    SecretTooLong { len: usize, max: usize },
    #[error("digest must be 64 hex characters: {value}")]
    InvalidDigestHex { value: String },
}

/// Derive the commitment digest for `(amount, secret)`.
pub fn commit(amount: Amount, secret: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(COMMITMENT_NAMESPACE);
    hasher.update(&amount.to_be_bytes());
    hasher.update(secret);
    hasher.finalize()
}

/// Returns `true` if `(amount, secret)` opens `digest`.
pub fn verify(digest: &Digest, amount: Amount, secret: &[u8]) -> bool {
    &commit(amount, secret) == digest
}

/// Reject secrets that are empty or longer than `max_len`.
pub fn validate_secret(secret: &[u8], max_len: usize) -> Result<(), CommitmentError> {
    if secret.is_empty() {
        return Err(CommitmentError::EmptySecret);
    }
    if secret.len() > max_len {
        return Err(CommitmentError::SecretTooLong {
            len: secret.len(),
            max: max_len,
        });
    }
    Ok(())
}

/// Parse a 64-character hex digest (an optional `0x` prefix is allowed).
pub fn parse_digest_hex(value: &str) -> Result<Digest, CommitmentError> {
    let invalid = || CommitmentError::InvalidDigestHex {
        value: value.to_string(),
    };
    let trimmed = value.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if stripped.len() != DIGEST_HEX_LEN {
        return Err(invalid());
    }
    let bytes = from_hex(stripped).ok_or_else(invalid)?;
    Digest::decode(bytes.as_slice()).map_err(|_| invalid())
}

/// An opening a bidder keeps private until the reveal phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedBid {
    pub amount: Amount,
    pub secret: Vec<u8>,
}

impl SealedBid {
    /// Seal `amount` behind a caller-chosen secret, rejecting secrets no reveal could open.
    pub fn new(
        amount: Amount,
        secret: impl Into<Vec<u8>>,
        max_secret_len: usize,
    ) -> Result<Self, CommitmentError> {
        let secret = secret.into();
        validate_secret(&secret, max_secret_len)?;
        Ok(Self { amount, secret })
    }

    /// Seal `amount` behind a fresh random secret.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R, amount: Amount) -> Self {
        let mut secret = vec![0u8; GENERATED_SECRET_LEN];
        rng.fill_bytes(&mut secret);
        Self { amount, secret }
    }

    pub fn digest(&self) -> Digest {
        commit(self.amount, &self.secret)
    }
}
