use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use crate::modules::notify::NotifyKind;

/// Library-wide Result type
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Notification processing error taxonomy
///
/// Every authentication-phase error aborts processing before any handler is
/// invoked; none of these may ever be answered with a success acknowledgment.
#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    /// Notification transport payload or a required field is absent
    #[error("Missing notification data: {0}")]
    MissingData(String),

    /// Timestamp outside the accepted replay window
    #[error("Notification timestamp skew of {skew}s exceeds the {limit}s replay window")]
    ReplayOrClockSkew { skew: i64, limit: i64 },

    /// Declared app_id or certificate serial does not match configuration
    #[error("Identity mismatch: {0}")]
    IdentityMismatch(String),

    /// Cryptographic signature verification failed
    #[error("Notification signature verification failed")]
    SignatureInvalid,

    /// AEAD decryption or authentication-tag check failed
    #[error("Notification resource decryption failed: {0}")]
    DecryptionFailed(String),

    /// Wire event type not present in the classification table
    #[error("Unknown notification event type: {0}")]
    UnknownEventType(String),

    /// Registered handler declares a different kind than the classified one
    #[error("Handler declares '{declared}' but notification classified as '{classified}'")]
    HandlerKindMismatch {
        declared: NotifyKind,
        classified: NotifyKind,
    },

    /// Invalid or incomplete provider trust material
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ResponseError for NotifyError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            NotifyError::MissingData(_) => StatusCode::BAD_REQUEST,
            NotifyError::ReplayOrClockSkew { .. } => StatusCode::BAD_REQUEST,
            NotifyError::IdentityMismatch(_) => StatusCode::UNAUTHORIZED,
            NotifyError::SignatureInvalid => StatusCode::UNAUTHORIZED,
            NotifyError::DecryptionFailed(_) => StatusCode::BAD_REQUEST,
            NotifyError::UnknownEventType(_) => StatusCode::BAD_REQUEST,
            NotifyError::HandlerKindMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            NotifyError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper constructors for common error scenarios
impl NotifyError {
    pub fn missing(field: impl Into<String>) -> Self {
        NotifyError::MissingData(field.into())
    }

    pub fn identity(msg: impl Into<String>) -> Self {
        NotifyError::IdentityMismatch(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        NotifyError::Configuration(msg.into())
    }

    pub fn decryption(msg: impl Into<String>) -> Self {
        NotifyError::DecryptionFailed(msg.into())
    }
}
