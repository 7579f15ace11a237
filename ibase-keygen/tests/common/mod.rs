//! Shared test helpers for keygen tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use ibase_keygen::{ActivationRequest, ExpiryOption, FormEvent, FormState, Field, Validator};

/// Machine code used throughout the golden vectors.
pub const MACHINE_CODE: &str = "D977-B6F1-7EE3-1675";

/// Secret used throughout the golden vectors.
pub const SECRET: &str = "mysecretkey";

/// SHA-256 code for `D977-B6F1-7EE3-1675::mysecretkey::permanent`.
pub const PERMANENT_CODE: &str = "84D9-346E-7E5D-209B";

/// Fallback code for the same source.
pub const PERMANENT_FALLBACK_CODE: &str = "RDK3-NY1C-NKYX-LTDF";

/// A fixed "today" so date-dependent tests are reproducible.
pub fn today() -> NaiveDate {
    date("2026-10-17")
}

/// Parses a `YYYY-MM-DD` date.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A request for the golden machine code and secret.
pub fn request(option: ExpiryOption, custom_date: Option<&str>) -> ActivationRequest {
    ActivationRequest {
        device_identifier_raw: "d977b6f17ee31675".to_string(),
        secret_key: SECRET.to_string(),
        expiry_option: option,
        custom_date: custom_date.map(String::from),
    }
}

/// A form filled in with the golden machine code and secret.
pub fn filled_form(validator: &Validator) -> FormState {
    FormState::new()
        .apply(FormEvent::edit(Field::MachineCode, "d977b6f17ee31675"), validator, today())
        .apply(FormEvent::edit(Field::SecretKey, SECRET), validator, today())
}
