//! actix-web boundary adapter.
//!
//! The webhook endpoint extracts a [`NotificationEnvelope`] from the inbound
//! request, runs the provider pipeline, and renders the resulting
//! [`Acknowledgment`]. The core never touches the HTTP layer itself.

use actix_web::{http::StatusCode, web::Bytes, HttpRequest, HttpResponse};
use std::collections::HashMap;

use crate::core::{NotifyError, Result};
use crate::modules::notify::{Acknowledgment, NotificationEnvelope};
use crate::modules::providers::Provider;

/// Build a form-style envelope from an Alipay webhook request: query-string
/// and form-body fields merged, body fields winning on conflict.
pub fn alipay_envelope(req: &HttpRequest, body: &Bytes) -> Result<NotificationEnvelope> {
    let query: HashMap<String, String> = serde_urlencoded::from_str(req.query_string())
        .map_err(|e| NotifyError::missing(format!("malformed query string: {e}")))?;
    let form: HashMap<String, String> = serde_urlencoded::from_bytes(body)
        .map_err(|e| NotifyError::missing(format!("malformed form body: {e}")))?;
    Ok(NotificationEnvelope::from_form_fields(query, form))
}

/// Build a header-style envelope from a WeChat Pay webhook request.
///
/// Absent or non-numeric timestamp headers surface as a missing timestamp,
/// which authentication rejects with `MissingData`.
pub fn wechat_envelope(req: &HttpRequest, body: &Bytes) -> NotificationEnvelope {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let timestamp = header("Wechatpay-Timestamp").parse::<i64>().ok();
    NotificationEnvelope::from_headers(
        header("Wechatpay-Serial"),
        header("Wechatpay-Signature"),
        header("Wechatpay-Nonce"),
        timestamp,
        body.to_vec(),
    )
}

/// Render an acknowledgment into the provider-mandated HTTP response.
pub fn ack_response(ack: &Acknowledgment) -> HttpResponse {
    let status = StatusCode::from_u16(ack.status()).unwrap_or(StatusCode::OK);
    let mut builder = HttpResponse::build(status);
    match (ack.provider, ack.accepted) {
        // Alipay reads a literal text body either way
        (Provider::Alipay, _) => builder.content_type("text/plain").body(ack.body()),
        // WeChat Pay: empty body on success, JSON error document on failure
        (Provider::Wechat, true) => builder.finish(),
        (Provider::Wechat, false) => builder.content_type("application/json").body(ack.body()),
    }
}
