use std::error::Error;
use std::fmt::Display;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

use crate::InstituteError;

pub(crate) static FALLBACK_MESSAGE: &str = "Unable to complete the request. Please try again.";
pub(crate) static SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";
pub(crate) static MISSING_CREDENTIALS_MESSAGE: &str =
    "Authentication credentials were not provided.";

static SIGNUP_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)not\s+registered|not\s+found|does\s+not\s+exist|no\s+account")
        .expect("signup hint pattern is valid")
});

/// Looks for a human readable message in one known place of an error body.
type Extractor = fn(&Value) -> Option<String>;

/// Tried in order, the first hit becomes the error message.
static EXTRACTORS: &[Extractor] = &[
    top_level_message,
    nested_detail,
    first_email_error,
    otp_code_error,
    first_non_field_error,
    top_level_detail,
    top_level_error,
    first_field_error,
];

fn top_level_message(data: &Value) -> Option<String> {
    text(data.get("message")?)
}

fn nested_detail(data: &Value) -> Option<String> {
    text(data.get("errors")?.get("detail")?)
}

fn first_email_error(data: &Value) -> Option<String> {
    text(data.get("errors")?.get("email")?.get(0)?)
}

fn otp_code_error(data: &Value) -> Option<String> {
    text(data.get("errors")?.get("otp_code")?)
}

fn first_non_field_error(data: &Value) -> Option<String> {
    text(data.get("errors")?.get("non_field_errors")?.get(0)?)
}

fn top_level_detail(data: &Value) -> Option<String> {
    text(data.get("detail")?)
}

fn top_level_error(data: &Value) -> Option<String> {
    text(data.get("error")?)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
        other => Some(other.to_string()),
    }
}

fn first_field_error(data: &Value) -> Option<String> {
    data.get("errors")?
        .as_object()?
        .values()
        .find_map(|field| match field {
            Value::Array(items) => items.first().and_then(text),
            other => text(other),
        })
}

pub(crate) fn extract_message(data: &Value) -> Option<String> {
    EXTRACTORS.iter().find_map(|extract| extract(data))
}

/// True when a message reads like the account has never been registered.
pub fn suggests_signup(message: &str) -> bool {
    SIGNUP_HINT.is_match(message)
}

/// The single error shape every failed API call resolves to.
///
/// `status` is the HTTP status of the response that failed the call, or `0`
/// when no response was received at all. `data` echoes the parsed error body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: u16,
    message: String,
    data: Value,
    suggests_signup: bool,
}

impl ApiError {
    pub fn from_response(status: u16, data: Value) -> Self {
        Self::with_fallback(status, data, FALLBACK_MESSAGE)
    }

    /// Like [`ApiError::from_response`], with `fallback` used when the body
    /// carries no message.
    pub(crate) fn with_fallback(status: u16, data: Value, fallback: &str) -> Self {
        let message = extract_message(&data).unwrap_or_else(|| fallback.to_string());

        Self {
            status,
            suggests_signup: suggests_signup(&message),
            message,
            data,
        }
    }

    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_response(status, json!({ "message": message }))
    }

    pub fn session_expired() -> Self {
        Self::new(401, SESSION_EXPIRED_MESSAGE)
    }

    pub(crate) fn missing_credentials() -> Self {
        Self::from_response(
            401,
            json!({
                "message": MISSING_CREDENTIALS_MESSAGE,
                "detail": MISSING_CREDENTIALS_MESSAGE,
            }),
        )
    }

    pub(crate) fn transport(err: &InstituteError) -> Self {
        Self::from_response(0, json!({ "error": err.message() }))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn suggests_signup(&self) -> bool {
        self.suggests_signup
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl Error for ApiError {}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ApiError] ({}): {}", self.status, self.message)
    }
}

impl From<InstituteError> for ApiError {
    fn from(err: InstituteError) -> Self {
        Self::transport(&err)
    }
}
