//! Digest backends for activation code derivation.
//!
//! Two backends exist:
//!
//! - [`Sha256Digester`]: SHA-256 rendered as uppercase hex. The default.
//! - [`FallbackDigester`]: a non-cryptographic base64 fold, kept bit-for-bit
//!   compatible with hosts that had no digest primitive. Only used when the
//!   configuration selects it explicitly.

use crate::error::KeygenResult;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of characters a fallback digest yields.
pub const FALLBACK_DIGEST_LEN: usize = 16;

/// Turns the derivation source bytes into an uppercase alphanumeric string.
pub trait Digester: Send + Sync {
    /// Short backend name for logging.
    fn name(&self) -> &'static str;

    /// Digests `source` into an uppercase string of at least 16 characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce a value.
    fn digest(&self, source: &[u8]) -> KeygenResult<String>;
}

/// SHA-256, rendered as 64 uppercase hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn digest(&self, source: &[u8]) -> KeygenResult<String> {
        Ok(hex::encode_upper(Sha256::digest(source)))
    }
}

/// Base64 of the raw bytes, stripped to alphanumerics, uppercased, doubled,
/// and cut to 16 characters.
///
/// Each source byte is encoded as one base64 input octet, so multi-byte
/// UTF-8 sequences contribute their individual bytes. Only the first 12
/// source bytes influence the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDigester;

impl Digester for FallbackDigester {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn digest(&self, source: &[u8]) -> KeygenResult<String> {
        let base: String = BASE64
            .encode(source)
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();

        Ok(base.repeat(2).chars().take(FALLBACK_DIGEST_LEN).collect())
    }
}

/// Selects a digest backend in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    /// [`Sha256Digester`].
    #[default]
    Sha256,
    /// [`FallbackDigester`].
    Fallback,
}

impl DigestKind {
    /// Instantiates the selected backend.
    #[must_use]
    pub fn digester(&self) -> Box<dyn Digester> {
        match self {
            Self::Sha256 => Box::new(Sha256Digester),
            Self::Fallback => Box::new(FallbackDigester),
        }
    }
}
