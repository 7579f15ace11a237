//! Expiry policies and their canonical tokens.
//!
//! The form offers four choices ([`ExpiryOption`]). Once validated, a choice
//! becomes an [`ExpiryPolicy`], which resolves against "today" into the
//! token that is mixed into the digest plus the date and label shown to the
//! user.

use crate::error::{KeygenError, KeygenResult};
use crate::form::Field;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token used for codes that never expire.
pub const PERMANENT_TOKEN: &str = "permanent";

/// Date format used for tokens and custom dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The expiry selector as collected by the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryOption {
    /// Never expires.
    #[default]
    Permanent,
    /// Expires 365 days from today.
    Year,
    /// Expires tomorrow.
    Day,
    /// Expires on a user-chosen date.
    Custom,
}

impl ExpiryOption {
    /// All options in display order.
    pub const ALL: [Self; 4] = [Self::Permanent, Self::Year, Self::Day, Self::Custom];

    /// The wire name (`permanent`, `year`, `day`, `custom`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::Year => "year",
            Self::Day => "day",
            Self::Custom => "custom",
        }
    }

    /// Label shown in the selector.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Permanent => "Permanent",
            Self::Year => "One year (365 days)",
            Self::Day => "One day",
            Self::Custom => "Pick a specific date",
        }
    }

    /// Helper line shown under the selector for the active option.
    #[must_use]
    pub fn helper_text(&self) -> &'static str {
        match self {
            Self::Permanent => {
                "The key never expires. Use this when no expiry control is needed."
            }
            Self::Year => "The expiry date is set 365 days out, suited to annual subscriptions.",
            Self::Day => "Grants 24 hours of use, suited to temporary authorization.",
            Self::Custom => "Choose a specific date to give the customer a tailored validity period.",
        }
    }

    /// Returns true if this option requires a custom date.
    #[must_use]
    pub fn requires_date(&self) -> bool {
        matches!(self, Self::Custom)
    }
}

impl fmt::Display for ExpiryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpiryOption {
    type Err = KeygenError;

    fn from_str(s: &str) -> KeygenResult<Self> {
        Self::ALL
            .into_iter()
            .find(|opt| opt.as_str() == s)
            .ok_or_else(|| KeygenError::InvalidField {
                field: Field::ExpiryOption,
                message: format!("unknown expiry option '{s}'"),
            })
    }
}

/// A validated expiry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryPolicy {
    /// Never expires.
    Permanent,
    /// Expires 365 days after the day of generation.
    OneYear,
    /// Expires the day after generation.
    OneDay,
    /// Expires on the given date.
    Custom(NaiveDate),
}

impl ExpiryPolicy {
    /// Builds a policy from the form selector and the raw custom date.
    ///
    /// The custom date is only consulted for [`ExpiryOption::Custom`].
    ///
    /// # Errors
    ///
    /// Returns [`KeygenError::InvalidField`] if a custom date is required but
    /// missing, malformed, or earlier than `today`.
    pub fn from_option(
        option: ExpiryOption,
        custom_date: &str,
        today: NaiveDate,
    ) -> KeygenResult<Self> {
        match option {
            ExpiryOption::Permanent => Ok(Self::Permanent),
            ExpiryOption::Year => Ok(Self::OneYear),
            ExpiryOption::Day => Ok(Self::OneDay),
            ExpiryOption::Custom => {
                let date = parse_date(custom_date).ok_or_else(|| invalid_custom_date(custom_date))?;
                if date < today {
                    return Err(invalid_custom_date(custom_date));
                }
                Ok(Self::Custom(date))
            }
        }
    }

    /// Resolves the policy against today's date.
    ///
    /// # Errors
    ///
    /// Returns [`KeygenError::DerivationFailed`] if the expiry date falls
    /// outside the representable calendar.
    pub fn resolve(&self, today: NaiveDate) -> KeygenResult<ResolvedExpiry> {
        let resolved = match *self {
            Self::Permanent => ResolvedExpiry {
                token: PERMANENT_TOKEN.to_string(),
                expires_on: None,
                label: "Permanent (no fixed date)".to_string(),
            },
            Self::OneYear => {
                let date = add_days(today, 365)?;
                ResolvedExpiry::dated(date, "valid for one year")
            }
            Self::OneDay => {
                let date = add_days(today, 1)?;
                ResolvedExpiry::dated(date, "valid for one day")
            }
            Self::Custom(date) => ResolvedExpiry::dated(date, "custom date"),
        };
        Ok(resolved)
    }
}

/// An expiry policy resolved to concrete values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExpiry {
    /// Canonical string fed into the digest.
    pub token: String,
    /// Expiry date, or `None` for permanent codes.
    pub expires_on: Option<NaiveDate>,
    /// Human-readable description.
    pub label: String,
}

impl ResolvedExpiry {
    fn dated(date: NaiveDate, note: &str) -> Self {
        let token = date.format(DATE_FORMAT).to_string();
        Self {
            label: format!("{token} ({note})"),
            token,
            expires_on: Some(date),
        }
    }
}

/// Today's calendar date in UTC.
#[must_use]
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parses a strict `YYYY-MM-DD` date.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn add_days(today: NaiveDate, days: u64) -> KeygenResult<NaiveDate> {
    today
        .checked_add_days(Days::new(days))
        .ok_or_else(|| KeygenError::DerivationFailed(format!("{today} + {days} days overflows")))
}

fn invalid_custom_date(value: &str) -> KeygenError {
    KeygenError::InvalidField {
        field: Field::CustomDate,
        message: format!("'{value}' is not a date on or after today"),
    }
}
