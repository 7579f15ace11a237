//! Activation code generation for the iBase activation center.
//!
//! This crate handles:
//! - Canonicalizing machine codes into 16 uppercase hex digits
//! - Deriving activation codes from a machine code, secret key and expiry
//! - Validating the activation form and sequencing its submissions
//! - Computing the local machine code shown to end users
//!
//! # Design Principles
//!
//! - **Deterministic**: the same machine code, secret and expiry always give
//!   the same code, so nothing is ever stored
//! - **No I/O**: derivation never touches the network or disk
//! - **Immutable form state**: every user action yields a new [`FormState`]
//!
//! # Code Format
//!
//! `SHA-256("{XXXX-XXXX-XXXX-XXXX}::{secret}::{expiry_token}")`, first 16
//! uppercase hex digits, grouped as `XXXX-XXXX-XXXX-XXXX`. The expiry token
//! is `permanent` or a `YYYY-MM-DD` date.
//!
//! Codes are not verified anywhere in this crate.

mod activation;
mod canonical;
mod code;
mod config;
mod device;
mod digest;
mod error;
mod expiry;
mod form;
mod submission;

pub use activation::{ActivationCenter, ActivationRequest, ActivationResult};
pub use canonical::{
    canonicalize_device_id, format_grouped, is_grouped_hex, DeviceIdentifier, DEVICE_ID_HEX_LEN,
    GROUP_LEN,
};
pub use code::{
    derive_activation_code, source_string, ActivationCode, CodeDeriver, CODE_LEN,
    SOURCE_SEPARATOR,
};
pub use config::KeygenConfig;
pub use device::{identifier_from_components, local_device_identifier, DeviceInfo};
pub use digest::{DigestKind, Digester, FallbackDigester, Sha256Digester, FALLBACK_DIGEST_LEN};
pub use error::{KeygenError, KeygenResult};
pub use expiry::{
    parse_date, today_utc, ExpiryOption, ExpiryPolicy, ResolvedExpiry, DATE_FORMAT,
    PERMANENT_TOKEN,
};
pub use form::{
    Field, FieldErrors, FormEvent, FormState, FormValues, Status, StatusKind, Validator,
    AGGREGATE_ERROR_MESSAGE, CUSTOM_DATE_MESSAGE, DERIVATION_ERROR_MESSAGE, MACHINE_CODE_MESSAGE,
    SUCCESS_MESSAGE,
};
pub use submission::{PendingSubmission, SubmissionOutcome};
