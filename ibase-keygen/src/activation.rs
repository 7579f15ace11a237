//! Request/response contracts and the [`ActivationCenter`] entry point.

use crate::canonical::DeviceIdentifier;
use crate::code::{ActivationCode, CodeDeriver};
use crate::config::KeygenConfig;
use crate::error::{KeygenError, KeygenResult};
use crate::expiry::{today_utc, ExpiryOption};
use crate::form::{FormEvent, FormState, FormValues, Validator};
use crate::submission::{PendingSubmission, SubmissionOutcome};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Already-collected form values handed over by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRequest {
    /// The machine code as typed.
    pub device_identifier_raw: String,
    /// The secret key as typed.
    pub secret_key: String,
    /// The selected expiry option.
    pub expiry_option: ExpiryOption,
    /// `YYYY-MM-DD`, only meaningful for the custom option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_date: Option<String>,
}

impl ActivationRequest {
    /// Converts the request into form values, canonicalizing the machine code
    /// the way an edit would. A blank machine code stays blank, like a field
    /// the user never touched.
    #[must_use]
    pub fn to_values(&self) -> FormValues {
        let raw = self.device_identifier_raw.trim();
        let machine_code = if raw.is_empty() {
            String::new()
        } else {
            DeviceIdentifier::from_raw(raw).grouped()
        };
        FormValues {
            machine_code,
            secret_key: self.secret_key.clone(),
            expiry_option: self.expiry_option,
            custom_date: self.custom_date.clone().unwrap_or_default(),
        }
    }
}

/// A generated activation code and everything shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResult {
    /// The code, `XXXX-XXXX-XXXX-XXXX`.
    pub code: ActivationCode,
    /// The canonical machine code, `XXXX-XXXX-XXXX-XXXX`.
    pub device_identifier: String,
    /// The trimmed secret key that went into the digest.
    pub secret_key: String,
    /// Expiry date, `None` for permanent codes.
    pub expires_on: Option<NaiveDate>,
    /// Human-readable expiry description.
    pub expiry_label: String,
}

/// Ties configuration, validation and derivation together for a UI layer.
#[derive(Debug)]
pub struct ActivationCenter {
    config: KeygenConfig,
    validator: Validator,
    deriver: CodeDeriver,
}

impl ActivationCenter {
    /// Creates a center using the digest backend named in `config`.
    #[must_use]
    pub fn new(config: KeygenConfig) -> Self {
        let deriver = CodeDeriver::with_digester(config.digest.digester());
        Self::with_deriver(config, deriver)
    }

    /// Creates a center with an explicit deriver.
    #[must_use]
    pub fn with_deriver(config: KeygenConfig, deriver: CodeDeriver) -> Self {
        Self {
            validator: Validator::new(&config),
            config,
            deriver,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &KeygenConfig {
        &self.config
    }

    /// The field validator.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// The code deriver.
    #[must_use]
    pub fn deriver(&self) -> &CodeDeriver {
        &self.deriver
    }

    /// Applies a user action to the form.
    #[must_use]
    pub fn update(&self, state: FormState, event: FormEvent, today: NaiveDate) -> FormState {
        state.apply(event, &self.validator, today)
    }

    /// Starts a submit; see [`FormState::begin_submit`].
    #[must_use]
    pub fn begin_submit(
        &self,
        state: FormState,
        today: NaiveDate,
    ) -> (FormState, Option<PendingSubmission>) {
        state.begin_submit(&self.validator, today)
    }

    /// Runs a pending submission.
    #[must_use]
    pub fn run(&self, pending: &PendingSubmission) -> SubmissionOutcome {
        pending.run(&self.deriver)
    }

    /// Validates and derives in one step.
    #[must_use]
    pub fn submit(&self, state: FormState, today: NaiveDate) -> FormState {
        state.submit(&self.validator, &self.deriver, today)
    }

    /// Generates a code straight from a request, without form state.
    ///
    /// # Errors
    ///
    /// Returns [`KeygenError::Validation`] with every failing field if the
    /// request is invalid, or [`KeygenError::DerivationFailed`] if the digest
    /// fails.
    pub fn generate(
        &self,
        request: &ActivationRequest,
        today: NaiveDate,
    ) -> KeygenResult<ActivationResult> {
        let values = request.to_values();
        let errors = self.validator.validate_all(&values, today);
        if !errors.is_empty() {
            warn!(failing_fields = errors.len(), "Activation request rejected");
            return Err(KeygenError::Validation(errors));
        }

        PendingSubmission::prepare(0, &values, today)?
            .run(&self.deriver)
            .result
    }

    /// [`Self::generate`] against the current UTC date.
    ///
    /// # Errors
    ///
    /// See [`Self::generate`].
    pub fn generate_now(&self, request: &ActivationRequest) -> KeygenResult<ActivationResult> {
        self.generate(request, today_utc())
    }
}

impl Default for ActivationCenter {
    fn default() -> Self {
        Self::new(KeygenConfig::default())
    }
}
