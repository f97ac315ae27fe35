//! Classification of HTTP failures into [`BackofficeError`] kinds.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::BackofficeError;

use super::envelope::error_message_of;

/// Whether the backend rejected the session credentials.
pub fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Error for a non-2xx response, or a 2xx response that reported failure.
///
/// The message comes from the body's `message`, then `error`, then
/// `fallback`, and otherwise names the status code.
pub fn request_failed(status: StatusCode, body: &Value, fallback: Option<&str>) -> BackofficeError {
    let message = error_message_of(body)
        .or_else(|| fallback.map(str::to_string))
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
    BackofficeError::RequestFailed {
        status: status.as_u16(),
        message,
    }
}

/// Error for a request that never produced a response.
pub fn transport_failure(error: &reqwest::Error, timeout_secs: u64) -> BackofficeError {
    if error.is_timeout() {
        BackofficeError::RequestTimeout(timeout_secs)
    } else if error.is_decode() {
        BackofficeError::InvalidResponse(error.to_string())
    } else {
        BackofficeError::NetworkUnavailable(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_rejection_statuses() {
        assert!(is_auth_rejection(StatusCode::UNAUTHORIZED));
        assert!(is_auth_rejection(StatusCode::FORBIDDEN));
        assert!(!is_auth_rejection(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_request_failed_messages() {
        let err = request_failed(StatusCode::CONFLICT, &json!({"message": "in use"}), None);
        assert!(matches!(
            err,
            BackofficeError::RequestFailed { status: 409, ref message } if message == "in use"
        ));

        let err = request_failed(StatusCode::BAD_REQUEST, &json!({"error": "Bad Request"}), None);
        assert_eq!(err.user_message(), "Bad Request");

        let err = request_failed(StatusCode::INTERNAL_SERVER_ERROR, &Value::Null, None);
        assert_eq!(err.user_message(), "HTTP error! status: 500");

        let err = request_failed(StatusCode::UNAUTHORIZED, &Value::Null, Some("Invalid login"));
        assert_eq!(err.user_message(), "Invalid login");
    }
}
