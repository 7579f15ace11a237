//! Submitting the form.
//!
//! A submit is split into three steps so derivation can run off the UI path:
//!
//! 1. [`FormState::begin_submit`] validates every field. On success it bumps
//!    the generation and hands back a [`PendingSubmission`].
//! 2. [`PendingSubmission::run`] derives the code. It is pure and may run on
//!    any thread, any number of times.
//! 3. [`FormState::complete`] applies the outcome, unless a newer submit or a
//!    reset has happened since, in which case the outcome is dropped.

use crate::activation::ActivationResult;
use crate::canonical::DeviceIdentifier;
use crate::code::CodeDeriver;
use crate::error::KeygenResult;
use crate::expiry::{ExpiryPolicy, ResolvedExpiry};
use crate::form::{
    FormState, FormValues, Status, Validator, AGGREGATE_ERROR_MESSAGE, DERIVATION_ERROR_MESSAGE,
};
use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

/// Validated, canonicalized inputs for one derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    generation: u64,
    device: DeviceIdentifier,
    secret_key: String,
    expiry: ResolvedExpiry,
}

impl PendingSubmission {
    /// Canonicalizes validated form values.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry cannot be resolved.
    pub fn prepare(generation: u64, values: &FormValues, today: NaiveDate) -> KeygenResult<Self> {
        let policy = ExpiryPolicy::from_option(values.expiry_option, &values.custom_date, today)?;
        Ok(Self {
            generation,
            device: DeviceIdentifier::from_raw(&values.machine_code),
            secret_key: values.secret_key.trim().to_string(),
            expiry: policy.resolve(today)?,
        })
    }

    /// The generation this submission belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The canonical device identifier.
    #[must_use]
    pub fn device(&self) -> &DeviceIdentifier {
        &self.device
    }

    /// The resolved expiry.
    #[must_use]
    pub fn expiry(&self) -> &ResolvedExpiry {
        &self.expiry
    }

    /// Derives the code and assembles the result.
    #[must_use]
    pub fn run(&self, deriver: &CodeDeriver) -> SubmissionOutcome {
        let result = deriver
            .derive(&self.device, &self.secret_key, &self.expiry.token)
            .map(|code| ActivationResult {
                code,
                device_identifier: self.device.grouped(),
                secret_key: self.secret_key.clone(),
                expires_on: self.expiry.expires_on,
                expiry_label: self.expiry.label.clone(),
            });

        SubmissionOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// The result of running a [`PendingSubmission`].
#[derive(Debug)]
pub struct SubmissionOutcome {
    /// Generation of the submission that produced this outcome.
    pub generation: u64,
    /// The derived result or the derivation failure.
    pub result: KeygenResult<ActivationResult>,
}

impl FormState {
    /// Validates every field and, if all pass, starts a new submission.
    ///
    /// On validation failure the returned state carries every field error,
    /// an aggregate error banner, and no result.
    #[must_use]
    pub fn begin_submit(
        mut self,
        validator: &Validator,
        today: NaiveDate,
    ) -> (Self, Option<PendingSubmission>) {
        self.generation += 1;

        let errors = validator.validate_all(&self.values, today);
        if !errors.is_empty() {
            warn!(failing_fields = errors.len(), "Submit blocked by invalid fields");
            self.errors = errors;
            self.status = Some(Status::error(AGGREGATE_ERROR_MESSAGE));
            self.result = None;
            return (self, None);
        }
        self.errors = errors;

        match PendingSubmission::prepare(self.generation, &self.values, today) {
            Ok(pending) => (self, Some(pending)),
            Err(e) => {
                error!(error = %e, "Failed to prepare activation code submission");
                self.status = Some(Status::error(DERIVATION_ERROR_MESSAGE));
                self.result = None;
                (self, None)
            }
        }
    }

    /// Applies a submission outcome if it belongs to the current generation.
    #[must_use]
    pub fn complete(mut self, outcome: SubmissionOutcome) -> Self {
        if outcome.generation != self.generation {
            debug!(
                outcome_generation = outcome.generation,
                current_generation = self.generation,
                "Dropping stale submission outcome"
            );
            return self;
        }

        match outcome.result {
            Ok(result) => {
                info!(
                    device = %result.device_identifier,
                    expires_on = ?result.expires_on,
                    "Activation code generated"
                );
                self.result = Some(result);
                self.status = Some(Status::success());
            }
            Err(e) => {
                error!(error = %e, "Failed to generate activation code");
                self.result = None;
                self.status = Some(Status::error(DERIVATION_ERROR_MESSAGE));
            }
        }
        self
    }

    /// Runs a whole submit synchronously.
    #[must_use]
    pub fn submit(self, validator: &Validator, deriver: &CodeDeriver, today: NaiveDate) -> Self {
        match self.begin_submit(validator, today) {
            (state, Some(pending)) => {
                let outcome = pending.run(deriver);
                state.complete(outcome)
            }
            (state, None) => state,
        }
    }
}
