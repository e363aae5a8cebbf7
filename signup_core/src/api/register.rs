use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The request to register a new account: whatever was in the form.
pub type Req = crate::Submission;

/// Where the register endpoint lives.
pub const PATH: &str = "/register";

/// The header the server reads the CSRF token from.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Result of registering a new account. The server doesn't tag these; we tell
/// them apart by which keys are present, checking `errors`, then `error`, and
/// treating anything else as success.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(from = "RawResp", into = "RawResp")]
pub enum Resp {
    /// Validation failed. Keys are form field names, values are the messages
    /// for that field.
    FieldErrors(BTreeMap<String, Vec<String>>),

    /// Registration failed for some reason not tied to a single field (e.g.
    /// the email is already in use.)
    Error(String),

    /// The account was created.
    Success(String),
}

/// The shape of the response on the wire.
#[derive(Debug, Default, Deserialize, Serialize)]
struct RawResp {
    /// Per-field validation messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,

    /// A general error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    /// A success message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    success: Option<String>,
}

impl From<RawResp> for Resp {
    fn from(raw: RawResp) -> Self {
        if let Some(errors) = raw.errors {
            return Self::FieldErrors(errors);
        }

        // An empty error message doesn't count as an error.
        match raw.error {
            Some(error) if !error.is_empty() => Self::Error(error),
            _ => Self::Success(raw.success.unwrap_or_default()),
        }
    }
}

impl From<Resp> for RawResp {
    fn from(resp: Resp) -> Self {
        match resp {
            Resp::FieldErrors(errors) => Self {
                errors: Some(errors),
                ..Self::default()
            },
            Resp::Error(error) => Self {
                error: Some(error),
                ..Self::default()
            },
            Resp::Success(success) => Self {
                success: Some(success),
                ..Self::default()
            },
        }
    }
}
