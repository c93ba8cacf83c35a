//! Sealed-box public-key encryption
//!
//! This module implements anonymous public-key encryption using NaCl
//! sealed boxes (X25519 + XSalsa20-Poly1305 via the `crypto_box` crate):
//!
//! - A fresh ephemeral keypair is generated for every `seal` call
//! - X25519 key exchange against the recipient public key derives the
//!   encryption key
//! - The ephemeral public key is prepended to the authenticated ciphertext,
//!   so sealed output is always `SEAL_OVERHEAD` bytes longer than the
//!   plaintext
//!
//! Sealed boxes are anonymous: the recipient learns nothing about who
//! produced a sealed message, and nothing in this module authenticates the
//! sender. Only confidentiality and ciphertext integrity toward the
//! recipient are guaranteed. If sender identity matters, use an
//! authenticated box primitive instead of this module.
//!
//! # Example
//!
//! ```
//! use sealbox::sealedbox::{generate_keypair, open, seal};
//!
//! let keypair = generate_keypair().unwrap();
//! let sealed = seal(b"my-super-secret-token-12345", &keypair.public_key).unwrap();
//! let plaintext = open(&sealed, &keypair.public_key, &keypair.secret_key).unwrap();
//! assert_eq!(plaintext, b"my-super-secret-token-12345");
//! ```

use crate::error::{ErrorCategory, ErrorKind, Result, SealboxError};
use crypto_box::{PublicKey as BoxPublicKey, SecretKey as BoxSecretKey};
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

/// Length of a Curve25519 public key in bytes
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of a Curve25519 secret key in bytes
pub const SECRET_KEY_LEN: usize = 32;

/// Fixed number of bytes a sealed box adds on top of the plaintext:
/// the ephemeral public key (32) plus the Poly1305 tag (16)
pub const SEAL_OVERHEAD: usize = 48;

/// A recipient public key. Public keys are not secret and may be shared
/// freely; anyone holding one can seal messages to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Constructs a public key from raw bytes, rejecting any length other
    /// than [`PUBLIC_KEY_LEN`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; PUBLIC_KEY_LEN] = bytes.try_into().map_err(|_| {
            SealboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidKeyLength,
                format!(
                    "public key must be {} bytes, got {}",
                    PUBLIC_KEY_LEN,
                    bytes.len()
                ),
            )
        })?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }
}

/// A recipient secret key. Key material is wiped from memory on drop.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<[u8; SECRET_KEY_LEN]>);

impl SecretKey {
    /// Constructs a secret key from raw bytes, rejecting any length other
    /// than [`SECRET_KEY_LEN`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; SECRET_KEY_LEN] = bytes.try_into().map_err(|_| {
            SealboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidKeyLength,
                format!(
                    "secret key must be {} bytes, got {}",
                    SECRET_KEY_LEN,
                    bytes.len()
                ),
            )
        })?;
        Ok(Self(Zeroizing::new(key)))
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }
}

// Never print key material, even in debug output.
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// A public/secret key pair. The two keys are generated together: the
/// secret key determines the public key.
#[derive(Debug, Clone)]
pub struct Keypair {
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

/// Generate a fresh keypair from the operating system's random source
///
/// Each call consumes fresh entropy and returns an independent keypair.
/// Fails with [`ErrorKind::EntropyUnavailable`] if the random source fails.
pub fn generate_keypair() -> Result<Keypair> {
    let mut seed = Zeroizing::new([0u8; SECRET_KEY_LEN]);
    OsRng.try_fill_bytes(&mut *seed).map_err(|e| {
        SealboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::EntropyUnavailable,
            "random source failed during key generation",
            e,
        )
    })?;

    let secret = BoxSecretKey::from(*seed);
    let public_key = PublicKey(*secret.public_key().as_bytes());
    let secret_key = SecretKey(Zeroizing::new(secret.to_bytes()));
    Ok(Keypair {
        public_key,
        secret_key,
    })
}

/// Seal plaintext for a recipient public key
///
/// Only the holder of the matching secret key can open the result, and the
/// recipient cannot tell who sealed it. The output is exactly
/// `plaintext.len() + SEAL_OVERHEAD` bytes.
pub fn seal(plaintext: &[u8], recipient: &PublicKey) -> Result<Vec<u8>> {
    let public = BoxPublicKey::from(*recipient.as_bytes());
    // The only fallible step inside seal is drawing randomness for the
    // ephemeral keypair.
    public.seal(&mut OsRng, plaintext).map_err(|_| {
        SealboxError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::EntropyUnavailable,
            "random source failed while sealing",
        )
    })
}

/// Open a sealed box and return the original plaintext
///
/// Fails with [`ErrorKind::DecryptionFailed`] if the input is shorter than
/// [`SEAL_OVERHEAD`], if the public key does not correspond to the secret
/// key, or if authentication fails (tampered ciphertext or keys that do not
/// match the sealing). The authentication comparison is constant-time,
/// delegated to the underlying primitive. Wrong plaintext is never
/// returned silently.
pub fn open(
    sealed: &[u8],
    recipient_public: &PublicKey,
    recipient_secret: &SecretKey,
) -> Result<Vec<u8>> {
    if sealed.len() < SEAL_OVERHEAD {
        return Err(SealboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "sealed input shorter than the sealing overhead; truncated or not a sealed box",
        ));
    }

    let secret = BoxSecretKey::from(*recipient_secret.as_bytes());

    // The primitive derives the public key from the secret key on its own.
    // Reject a mismatched pair explicitly, as libsodium does via its nonce
    // derivation.
    if secret.public_key().as_bytes() != recipient_public.as_bytes() {
        return Err(SealboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "public key does not correspond to the secret key",
        ));
    }

    secret.unseal(sealed).map_err(|_| {
        SealboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "corrupt input, tampered-with data, or mismatched keys",
        )
    })
}
