//! Booking lead submission.
//!
//! The site footer carries a consultation form; leads go to an external
//! spreadsheet-backed endpoint as a single JSON POST. The same contract is
//! implemented here so leads can be submitted (and the endpoint smoke-tested)
//! from the CLI.
//!
//! ## Wire format
//!
//! ```json
//! {"name": "...", "phone": "...", "countryCode": "+91", "email": "...",
//!  "branch": "punjagutta", "concerns": "...",
//!  "timestamp": "2026-03-01T09:30:00.000Z", "source": "website"}
//! ```
//!
//! The endpoint answers `{"success": true, "message": "..."}` or
//! `{"success": false, "error": "..."}`.
//!
//! ## Failure handling
//!
//! Input is validated before any request is made. Transport errors
//! (including a response body that fails mid-read), `429` and `5xx` are retried with exponential backoff up to
//! `booking.max_retries`; after that the caller gets
//! [`BookingError::RetriesExhausted`] and should tell the visitor to try
//! again. An explicit `success: false` is never retried.

use crate::config::BookingConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Maximum length for response bodies quoted in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 300;

const DEFAULT_COUNTRY_CODE: &str = "+91";

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking endpoint is not configured (set [booking] endpoint in config.toml)")]
    NotConfigured,
    #[error("Invalid booking form: {}", join_field_errors(.0))]
    Invalid(Vec<FieldError>),
    #[error("Booking was rejected: {0}")]
    Rejected(String),
    #[error("Booking failed after {attempts} attempts ({last}); please try again")]
    RetriesExhausted { attempts: u32, last: String },
    #[error("Booking endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response from booking endpoint: {0}")]
    InvalidResponse(String),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl BookingError {
    fn from_status(status: StatusCode, body: &str) -> Self {
        BookingError::Status {
            status: status.as_u16(),
            body: truncate_body(body),
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Form and request
// ============================================================================

/// Clinic branch the visitor wants to visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Branch {
    Punjagutta,
    Kokapet,
    Other(String),
}

impl From<String> for Branch {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "punjagutta" => Branch::Punjagutta,
            "kokapet" => Branch::Kokapet,
            _ => Branch::Other(value.trim().to_string()),
        }
    }
}

impl From<Branch> for String {
    fn from(branch: Branch) -> Self {
        branch.to_string()
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Punjagutta => f.write_str("punjagutta"),
            Branch::Kokapet => f.write_str("kokapet"),
            Branch::Other(name) => f.write_str(name),
        }
    }
}

/// A validation failure tied to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Raw form input, as typed by the visitor.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub name: String,
    pub phone: String,
    /// Defaults to `+91` when blank.
    pub country_code: String,
    pub email: String,
    pub branch: String,
    pub concerns: String,
}

/// A validated lead, ready to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub name: String,
    pub phone: String,
    pub country_code: String,
    pub email: String,
    pub branch: Branch,
    pub concerns: String,
    /// RFC 3339, UTC, millisecond precision.
    pub timestamp: String,
    pub source: String,
}

impl BookingForm {
    /// Check every field and build the request. All field errors are
    /// returned together.
    pub fn validate(
        &self,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<BookingRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Please enter your name"));
        }

        let phone = normalize_phone(&self.phone);
        if phone.is_empty() {
            errors.push(FieldError::new("phone", "Please enter your phone number"));
        } else if !is_valid_phone(&phone) {
            errors.push(FieldError::new(
                "phone",
                "Phone number should be 7 to 15 digits",
            ));
        }

        let country_code = match self.country_code.trim() {
            "" => DEFAULT_COUNTRY_CODE,
            code => code,
        };
        if !is_valid_country_code(country_code) {
            errors.push(FieldError::new(
                "countryCode",
                "Country code should look like +91",
            ));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Please enter your email"));
        } else if !is_valid_email(email) {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }

        if self.branch.trim().is_empty() {
            errors.push(FieldError::new("branch", "Please choose a branch"));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(BookingRequest {
            name: name.to_string(),
            phone,
            country_code: country_code.to_string(),
            email: email.to_string(),
            branch: Branch::from(self.branch.clone()),
            concerns: self.concerns.trim().to_string(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            source: source.to_string(),
        })
    }
}

/// Drop the separators people type into phone numbers.
fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

fn is_valid_phone(phone: &str) -> bool {
    (7..=15).contains(&phone.len()) && phone.chars().all(|c| c.is_ascii_digit())
}

fn is_valid_country_code(code: &str) -> bool {
    code.strip_prefix('+').is_some_and(|digits| {
        (1..=4).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
    })
}

/// `local@domain.tld`, no whitespace, one `@`.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Confirmation returned by the endpoint for an accepted lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub message: String,
}

/// Interpret a response body. `success: false` becomes [`BookingError::Rejected`].
pub fn parse_response(body: &str) -> Result<BookingReceipt, BookingError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| BookingError::InvalidResponse(format!("{e}: {}", truncate_body(body))))?;
    if envelope.success {
        Ok(BookingReceipt {
            message: envelope
                .message
                .unwrap_or_else(|| "Booking received".to_string()),
        })
    } else {
        Err(BookingError::Rejected(
            envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "no reason given".to_string()),
        ))
    }
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the booking endpoint.
/// Clone is cheap, `reqwest::Client` shares its pool.
#[derive(Debug, Clone)]
pub struct BookingClient {
    client: Client,
    endpoint: String,
    source: String,
    max_retries: u32,
    initial_backoff_ms: u64,
}

impl BookingClient {
    pub fn new(config: &BookingConfig) -> Result<Self, BookingError> {
        if config.endpoint.trim().is_empty() {
            return Err(BookingError::NotConfigured);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            source: config.source.clone(),
            max_retries: config.max_retries,
            initial_backoff_ms: config.initial_backoff_ms,
        })
    }

    /// Validate the form, then submit it. Invalid input never reaches the network.
    pub async fn submit_form(
        &self,
        form: &BookingForm,
        now: DateTime<Utc>,
    ) -> Result<BookingReceipt, BookingError> {
        let request = form
            .validate(&self.source, now)
            .map_err(BookingError::Invalid)?;
        self.submit(&request).await
    }

    /// POST the lead, retrying transport errors, 429 and 5xx.
    pub async fn submit(&self, request: &BookingRequest) -> Result<BookingReceipt, BookingError> {
        let mut retries = 0;
        let mut backoff_ms = self.initial_backoff_ms;

        loop {
            let failure = match self.client.post(&self.endpoint).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    match response.text().await {
                        // A body cut off mid-read is a transport failure.
                        Err(e) => format!("HTTP {status}, body read failed: {e}"),
                        Ok(body) => {
                            if status.is_success() {
                                let receipt = parse_response(&body)?;
                                info!(branch = %request.branch, "booking submitted");
                                return Ok(receipt);
                            }
                            if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                                // An envelope on an error status still carries the reason.
                                return match parse_response(&body) {
                                    Err(rejected @ BookingError::Rejected(_)) => Err(rejected),
                                    _ => Err(BookingError::from_status(status, &body)),
                                };
                            }
                            format!("HTTP {status}")
                        }
                    }
                }
                Err(e) => e.to_string(),
            };

            retries += 1;
            if retries > self.max_retries {
                return Err(BookingError::RetriesExhausted {
                    attempts: retries,
                    last: failure,
                });
            }
            warn!(
                url = %self.endpoint,
                retry = retries,
                backoff_ms = backoff_ms,
                error = %failure,
                "Booking submission failed, backing off"
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms = backoff_ms.saturating_mul(2);
            debug!(retry = retries, "retrying booking submission");
        }
    }
}
