//! Error types and message templates for the Trefle client

use std::fmt;
use tracing::error;

pub(crate) const TIMEOUT_MESSAGE: &str = "The request timed out.";
pub(crate) const REDIRECTS_MESSAGE: &str = "The request had too many redirects.";
pub(crate) const JSON_MESSAGE: &str = "Invalid JSON in response.";

/// Errors surfaced by the Trefle client
#[derive(Debug)]
pub enum TrefleError {
    /// An out-of-range argument, unknown operation name or illegal HTTP
    /// method; raised before any request is made
    Validation(String),
    /// The request timed out
    Timeout,
    /// The request was redirected too many times
    TooManyRedirects,
    /// A non-success status or other transport failure
    Http(String),
    /// The response body was not valid JSON
    Json,
}

impl fmt::Display for TrefleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrefleError::Validation(message) => f.write_str(message),
            TrefleError::Timeout => f.write_str(TIMEOUT_MESSAGE),
            TrefleError::TooManyRedirects => f.write_str(REDIRECTS_MESSAGE),
            TrefleError::Http(detail) => write!(f, "Unknown exception raised: {}", detail),
            TrefleError::Json => f.write_str(JSON_MESSAGE),
        }
    }
}

impl std::error::Error for TrefleError {}

pub type Result<T> = std::result::Result<T, TrefleError>;

/// Check a constrained argument against its allowed values.
///
/// Runs before any request is built, so a violation never reaches the
/// network. The error names the parameter and the allowed values.
pub(crate) fn check_argument_value(parameter: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    let values = allowed
        .iter()
        .map(|allowed_value| format!("'{}'", allowed_value))
        .collect::<Vec<_>>()
        .join(" or ");
    let message = format!("The parameter '{}' can only be {}.", parameter, values);
    error!("{}", message);
    Err(TrefleError::Validation(message))
}

/// Validation error for a symbolic name outside the endpoint and
/// navigation sets
pub(crate) fn unsupported_operation(name: &str) -> TrefleError {
    let message = format!("The operation '{}' is not supported.", name);
    error!("{}", message);
    TrefleError::Validation(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = TrefleError::Timeout;
        assert_eq!(format!("{}", err), "The request timed out.");
    }

    #[test]
    fn test_redirects_display() {
        let err = TrefleError::TooManyRedirects;
        assert_eq!(format!("{}", err), "The request had too many redirects.");
    }

    #[test]
    fn test_json_display() {
        let err = TrefleError::Json;
        assert_eq!(format!("{}", err), "Invalid JSON in response.");
    }

    #[test]
    fn test_http_display() {
        let err = TrefleError::Http("503 Service Unavailable".to_string());
        assert_eq!(
            format!("{}", err),
            "Unknown exception raised: 503 Service Unavailable"
        );
    }

    #[test]
    fn test_check_argument_value_accepts_allowed() {
        assert!(check_argument_value("what", "plants", &["plants", "species"]).is_ok());
        assert!(check_argument_value("what", "species", &["plants", "species"]).is_ok());
    }

    #[test]
    fn test_check_argument_value_rejects_unknown() {
        let err = check_argument_value("what", "stuff", &["plants", "species"]).unwrap_err();
        assert_eq!(
            format!("{}", err),
            "The parameter 'what' can only be 'plants' or 'species'."
        );
    }

    #[test]
    fn test_unsupported_operation_message() {
        let err = unsupported_operation("bogus");
        assert_eq!(
            format!("{}", err),
            "The operation 'bogus' is not supported."
        );
    }

    #[test]
    fn test_error_is_debug() {
        let err = TrefleError::Json;
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Json"));
    }
}
