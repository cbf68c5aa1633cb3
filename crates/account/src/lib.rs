//! Starfork account generator adapter.
//!
//! Implements the [`verification::AccountGenerator`] trait with secp256k1
//! keys and Ethereum-style addresses: the address is the last 20 bytes of the
//! Keccak-256 digest of the uncompressed public key (without its `0x04` tag).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Key generation, randomness, and encoding all live here.
//! The engine only sees hex strings through [`verification::GeneratedAccount`].

use k256::ecdsa::SigningKey;
use rand_core::{OsRng, RngCore};
use sha3::{Digest, Keccak256};
use verification::{AccountGenerator, GeneratedAccount, VerificationError};

/// Length of a secp256k1 private key in bytes.
const PRIVATE_KEY_LEN: usize = 32;

/// Generates fresh secp256k1 accounts from the operating system's RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1AccountGenerator;

impl Secp256k1AccountGenerator {
    pub fn new() -> Self {
        Self
    }
}

/// Derives the account for a raw 32-byte private key.
///
/// # Errors
///
/// Returns [`VerificationError::AccountGeneration`] if `private_key` is not a
/// valid secp256k1 scalar (zero, or not below the curve order).
pub fn account_from_private_key(
    private_key: &[u8],
) -> Result<GeneratedAccount, VerificationError> {
    let signing_key =
        SigningKey::from_slice(private_key).map_err(|e| VerificationError::AccountGeneration {
            message: format!("invalid private key: {e}"),
        })?;

    let public_key = signing_key.verifying_key().to_encoded_point(false);
    let digest = Keccak256::digest(&public_key.as_bytes()[1..]);

    Ok(GeneratedAccount {
        private_key_hex: hex::encode(signing_key.to_bytes()),
        address_hex: hex::encode(&digest[12..]),
    })
}

impl AccountGenerator for Secp256k1AccountGenerator {
    fn generate(&self) -> Result<GeneratedAccount, VerificationError> {
        let mut seed = [0u8; PRIVATE_KEY_LEN];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| VerificationError::AccountGeneration {
                message: format!("random source unavailable: {e}"),
            })?;
        let account = account_from_private_key(&seed)?;
        tracing::debug!(address = %account.address_hex, "Generated account");
        Ok(account)
    }
}
