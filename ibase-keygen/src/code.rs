//! Activation code derivation.
//!
//! The source string is `"{grouped_device_id}::{secret_key}::{expiry_token}"`.
//! The `::` delimiter is part of the code contract: changing it changes every
//! code ever issued. The digest of its UTF-8 bytes is cut to 16 characters
//! and grouped as `XXXX-XXXX-XXXX-XXXX`.

use crate::canonical::{format_grouped, DeviceIdentifier};
use crate::digest::{Digester, Sha256Digester};
use crate::error::{KeygenError, KeygenResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Separator between the three source components.
pub const SOURCE_SEPARATOR: &str = "::";

/// Number of digest characters kept in a code.
pub const CODE_LEN: usize = 16;

/// A formatted activation code, `XXXX-XXXX-XXXX-XXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationCode(String);

impl ActivationCode {
    /// Returns the grouped code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code, returning the grouped string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the digest source string.
#[must_use]
pub fn source_string(device: &DeviceIdentifier, secret_key: &str, expiry_token: &str) -> String {
    format!(
        "{}{SOURCE_SEPARATOR}{secret_key}{SOURCE_SEPARATOR}{expiry_token}",
        device.grouped()
    )
}

/// Derives activation codes with an injected digest backend.
pub struct CodeDeriver {
    digester: Box<dyn Digester>,
}

impl CodeDeriver {
    /// Creates a deriver backed by SHA-256.
    #[must_use]
    pub fn new() -> Self {
        Self::with_digester(Box::new(Sha256Digester))
    }

    /// Creates a deriver with a custom digest backend.
    #[must_use]
    pub fn with_digester(digester: Box<dyn Digester>) -> Self {
        Self { digester }
    }

    /// Name of the active digest backend.
    #[must_use]
    pub fn digester_name(&self) -> &'static str {
        self.digester.name()
    }

    /// Derives the code for a device, secret and expiry token.
    ///
    /// Identical inputs always produce the identical code.
    ///
    /// # Errors
    ///
    /// Returns [`KeygenError::DerivationFailed`] if the backend fails or
    /// yields fewer than 16 usable characters. No partial code is returned.
    pub fn derive(
        &self,
        device: &DeviceIdentifier,
        secret_key: &str,
        expiry_token: &str,
    ) -> KeygenResult<ActivationCode> {
        let source = source_string(device, secret_key, expiry_token);
        debug!(
            digester = self.digester.name(),
            device = %device,
            "Deriving activation code"
        );

        let digest = self.digester.digest(source.as_bytes())?;
        let head: String = digest.chars().take(CODE_LEN).collect();

        if head.chars().count() < CODE_LEN || !head.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(KeygenError::DerivationFailed(format!(
                "{} digest produced an unusable value",
                self.digester.name()
            )));
        }

        Ok(ActivationCode(format_grouped(&head)))
    }
}

impl Default for CodeDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodeDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeDeriver")
            .field("digester", &self.digester.name())
            .finish()
    }
}

/// Derives a SHA-256 activation code from a 16-hex device id.
///
/// `device_hex` is canonicalized first, so any input is accepted.
///
/// # Errors
///
/// Propagates [`KeygenError::DerivationFailed`] from the digest.
pub fn derive_activation_code(
    device_hex: &str,
    secret_key: &str,
    expiry_token: &str,
) -> KeygenResult<ActivationCode> {
    CodeDeriver::new().derive(&DeviceIdentifier::from_raw(device_hex), secret_key, expiry_token)
}
