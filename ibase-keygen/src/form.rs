//! Form state and validation.
//!
//! The form is an immutable [`FormState`] value. Every user action is a
//! [`FormEvent`], and [`FormState::apply`] returns the next state. Nothing is
//! mutated in place, so each transition can be tested on its own.
//!
//! Errors are surfaced lazily: a field is checked on blur, and re-checked on
//! every edit only while it already shows an error. Submitting checks every
//! field regardless of what the user has touched (see [`crate::submission`]).

use crate::activation::ActivationResult;
use crate::canonical::{canonicalize_device_id, format_grouped, is_grouped_hex};
use crate::config::KeygenConfig;
use crate::error::{KeygenError, KeygenResult};
use crate::expiry::{parse_date, ExpiryOption};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Shown when the machine code is not `XXXX-XXXX-XXXX-XXXX`.
pub const MACHINE_CODE_MESSAGE: &str =
    "Enter a machine code in the form XXXX-XXXX-XXXX-XXXX (digits and letters A-F only).";

/// Shown when the custom date is missing or in the past.
pub const CUSTOM_DATE_MESSAGE: &str = "Choose an expiry date no earlier than today.";

/// Banner shown when a submit is blocked by invalid fields.
pub const AGGREGATE_ERROR_MESSAGE: &str =
    "Please check the form and make sure every field is filled in correctly.";

/// Banner shown when derivation fails.
pub const DERIVATION_ERROR_MESSAGE: &str =
    "Something went wrong while generating the activation code. Please try again later.";

/// Banner shown after a successful submit.
pub const SUCCESS_MESSAGE: &str = "Activation code generated.";

/// A form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// The device identifier ("machine code").
    MachineCode,
    /// The secret key.
    SecretKey,
    /// The expiry selector.
    ExpiryOption,
    /// The custom expiry date.
    CustomDate,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Self; 4] = [
        Self::MachineCode,
        Self::SecretKey,
        Self::ExpiryOption,
        Self::CustomDate,
    ];

    /// The wire name of the field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MachineCode => "machineCode",
            Self::SecretKey => "secretKey",
            Self::ExpiryOption => "expiryOption",
            Self::CustomDate => "customDate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = KeygenError;

    fn from_str(s: &str) -> KeygenResult<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| KeygenError::UnknownField(s.to_string()))
    }
}

/// Messages for the fields currently failing validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the message for a field, if it is failing.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Returns true if the field is failing.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Sets or clears a field's error.
    pub fn set(&mut self, field: Field, error: Option<String>) {
        match error {
            Some(message) => {
                self.0.insert(field, message);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    /// Removes a field's error.
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no field is failing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over failing fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// Raw values as held by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    /// Grouped machine code as displayed (re-canonicalized on every edit).
    pub machine_code: String,
    /// Secret key, untrimmed.
    pub secret_key: String,
    /// Selected expiry option.
    pub expiry_option: ExpiryOption,
    /// Custom date as typed, `YYYY-MM-DD`.
    pub custom_date: String,
}

impl FormValues {
    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::MachineCode => &self.machine_code,
            Field::SecretKey => &self.secret_key,
            Field::ExpiryOption => self.expiry_option.as_str(),
            Field::CustomDate => &self.custom_date,
        }
    }
}

/// Per-field validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    secret_key_min_len: usize,
}

impl Validator {
    /// Builds a validator from configuration.
    #[must_use]
    pub fn new(config: &KeygenConfig) -> Self {
        Self {
            secret_key_min_len: config.secret_key_min_len,
        }
    }

    /// Minimum trimmed secret key length, in UTF-16 code units.
    #[must_use]
    pub fn secret_key_min_len(&self) -> usize {
        self.secret_key_min_len
    }

    /// Validates a single field against the full form values.
    ///
    /// Returns the error message, or `None` if the field is valid. The custom
    /// date is only checked while the custom expiry option is selected.
    #[must_use]
    pub fn validate(&self, field: Field, values: &FormValues, today: NaiveDate) -> Option<String> {
        self.validate_value(field, values.get(field), values.expiry_option, today)
    }

    /// Validates a lone value under the given expiry option.
    #[must_use]
    pub fn validate_value(
        &self,
        field: Field,
        value: &str,
        expiry_option: ExpiryOption,
        today: NaiveDate,
    ) -> Option<String> {
        let valid = match field {
            Field::MachineCode => is_grouped_hex(value.trim()),
            Field::SecretKey => value.trim().encode_utf16().count() >= self.secret_key_min_len,
            Field::ExpiryOption => value.parse::<ExpiryOption>().is_ok(),
            Field::CustomDate => {
                !expiry_option.requires_date()
                    || parse_date(value).is_some_and(|date| date >= today)
            }
        };

        if valid {
            None
        } else {
            Some(self.message(field))
        }
    }

    /// Validates every field, ignoring touched state.
    #[must_use]
    pub fn validate_all(&self, values: &FormValues, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in Field::ALL {
            errors.set(field, self.validate(field, values, today));
        }
        errors
    }

    fn message(&self, field: Field) -> String {
        match field {
            Field::MachineCode => MACHINE_CODE_MESSAGE.to_string(),
            Field::SecretKey => format!(
                "Enter a valid secret key of at least {} characters.",
                self.secret_key_min_len
            ),
            Field::ExpiryOption => "Choose one of the listed expiry options.".to_string(),
            Field::CustomDate => CUSTOM_DATE_MESSAGE.to_string(),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&KeygenConfig::default())
    }
}

/// Banner severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// The last submit produced a code.
    Success,
    /// The last submit failed.
    Error,
}

/// A form-level banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Severity.
    pub kind: StatusKind,
    /// Message text.
    pub message: String,
}

impl Status {
    pub(crate) fn success() -> Self {
        Self {
            kind: StatusKind::Success,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub(crate) fn error(message: &str) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.to_string(),
        }
    }
}

/// A user action on the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// A field's value changed.
    Edit {
        /// The edited field.
        field: Field,
        /// The new raw value.
        value: String,
    },
    /// A field lost focus.
    Blur(Field),
    /// The expiry option changed.
    SelectExpiry(ExpiryOption),
    /// Everything is cleared.
    Reset,
}

impl FormEvent {
    /// Shorthand for [`FormEvent::Edit`].
    pub fn edit(field: Field, value: impl Into<String>) -> Self {
        Self::Edit {
            field,
            value: value.into(),
        }
    }
}

/// The complete, immutable form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub(crate) values: FormValues,
    pub(crate) errors: FieldErrors,
    pub(crate) status: Option<Status>,
    pub(crate) result: Option<ActivationResult>,
    pub(crate) generation: u64,
}

impl FormState {
    /// The initial, empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current field values.
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Fields currently showing an error.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The current banner, if any.
    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// The last successful result, if any.
    #[must_use]
    pub fn result(&self) -> Option<&ActivationResult> {
        self.result.as_ref()
    }

    /// Submission generation. Outcomes from older generations are ignored.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if every field currently required validates.
    #[must_use]
    pub fn is_submittable(&self, validator: &Validator, today: NaiveDate) -> bool {
        validator.validate_all(&self.values, today).is_empty()
    }

    /// Applies an event and returns the next state.
    #[must_use]
    pub fn apply(self, event: FormEvent, validator: &Validator, today: NaiveDate) -> Self {
        match event {
            FormEvent::Edit { field, value } => self.edit(field, value, validator, today),
            FormEvent::Blur(field) => self.blur(field, validator, today),
            FormEvent::SelectExpiry(option) => self.select_expiry(option, validator, today),
            FormEvent::Reset => self.reset(),
        }
    }

    fn edit(mut self, field: Field, value: String, validator: &Validator, today: NaiveDate) -> Self {
        match field {
            Field::MachineCode => {
                self.values.machine_code = format_grouped(&canonicalize_device_id(&value));
            }
            Field::SecretKey => self.values.secret_key = value,
            Field::CustomDate => self.values.custom_date = value,
            Field::ExpiryOption => {
                return match value.parse::<ExpiryOption>() {
                    Ok(option) => self.select_expiry(option, validator, today),
                    Err(_) => self,
                };
            }
        }

        if self.errors.contains(field) {
            let error = validator.validate(field, &self.values, today);
            self.errors.set(field, error);
        }
        self
    }

    fn blur(mut self, field: Field, validator: &Validator, today: NaiveDate) -> Self {
        let error = validator.validate(field, &self.values, today);
        self.errors.set(field, error);
        self
    }

    fn select_expiry(mut self, option: ExpiryOption, validator: &Validator, today: NaiveDate) -> Self {
        self.values.expiry_option = option;
        if option.requires_date() {
            if self.errors.contains(Field::CustomDate) {
                let error = validator.validate(Field::CustomDate, &self.values, today);
                self.errors.set(Field::CustomDate, error);
            }
        } else {
            self.values.custom_date.clear();
            self.errors.clear(Field::CustomDate);
        }
        self
    }

    fn reset(self) -> Self {
        Self {
            generation: self.generation + 1,
            ..Self::default()
        }
    }
}
