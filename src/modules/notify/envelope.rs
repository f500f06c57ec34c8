use std::collections::HashMap;

use crate::core::{NotifyError, Result};

/// Transport-level evidence of an inbound notification, captured before any
/// trust is established.
///
/// Built once per inbound request by the HTTP-layer collaborator and consumed
/// by a provider's `authenticate`; discarded afterwards.
#[derive(Debug, Clone, Default)]
pub struct NotificationEnvelope {
    /// Raw request body
    pub body: Vec<u8>,
    /// Provider-declared signature
    pub signature: String,
    /// Provider-declared certificate serial (WeChat Pay)
    pub serial: String,
    /// Signature nonce (WeChat Pay)
    pub nonce: String,
    /// Unix timestamp in seconds (WeChat Pay; Alipay notifications carry none)
    pub timestamp: Option<i64>,
    /// Form-style transport fields (Alipay)
    pub fields: HashMap<String, String>,
}

impl NotificationEnvelope {
    /// Form-style transport: query-string and body fields merged, body fields
    /// taking precedence when a key appears in both.
    pub fn from_form_fields(
        query: HashMap<String, String>,
        body: HashMap<String, String>,
    ) -> Self {
        let mut fields = query;
        fields.extend(body);
        let signature = fields.get("sign").cloned().unwrap_or_default();
        Self {
            signature,
            fields,
            ..Self::default()
        }
    }

    /// Header-style transport: serial, signature, nonce and timestamp headers
    /// plus the raw body.
    pub fn from_headers(
        serial: impl Into<String>,
        signature: impl Into<String>,
        nonce: impl Into<String>,
        timestamp: Option<i64>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            body,
            signature: signature.into(),
            serial: serial.into(),
            nonce: nonce.into(),
            timestamp,
            fields: HashMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn body_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|_| NotifyError::missing("notification body is not valid UTF-8"))
    }
}
