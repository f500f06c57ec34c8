use serde_json::{Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{info, warn};

use super::handler::NotifyHandler;
use super::kind::NotifyKind;
use crate::core::{NotifyError, Result};
use crate::modules::providers::Provider;

/// Trusted, decrypted result of notification authentication.
///
/// Produced only by a provider's `authenticate` and consumed exactly once by
/// [`dispatch`]; never persisted.
#[derive(Debug, Clone)]
pub struct VerifiedNotification {
    pub provider: Provider,
    pub kind: NotifyKind,
    /// Plaintext field mapping: the original form fields for Alipay, the
    /// decrypted resource object for WeChat Pay
    pub data: Map<String, Value>,
}

/// Provider-mandated acknowledgment for a processed notification.
///
/// The core never writes the HTTP response or terminates the request; the
/// web-framework layer renders this value (see `modules::web`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgment {
    pub provider: Provider,
    pub accepted: bool,
}

impl Acknowledgment {
    pub fn success(provider: Provider) -> Self {
        Self {
            provider,
            accepted: true,
        }
    }

    pub fn failure(provider: Provider) -> Self {
        Self {
            provider,
            accepted: false,
        }
    }

    /// Response body the gateway expects.
    ///
    /// Alipay reads a literal `success` / `fail` body; WeChat Pay expects an
    /// empty 200/204 body on success and a JSON error document on failure.
    pub fn body(&self) -> &'static str {
        match (self.provider, self.accepted) {
            (Provider::Alipay, true) => "success",
            (Provider::Alipay, false) => "fail",
            (Provider::Wechat, true) => "",
            (Provider::Wechat, false) => r#"{"code":"FAIL","message":"mch have an errors"}"#,
        }
    }

    /// HTTP status the gateway expects alongside [`Self::body`].
    pub fn status(&self) -> u16 {
        match (self.provider, self.accepted) {
            (Provider::Wechat, false) => 500,
            _ => 200,
        }
    }
}

/// Match the handler's declared kind against the classified notification and
/// invoke it at most once.
///
/// A kind mismatch is fatal to the request: the handler is not invoked and no
/// success acknowledgment may be produced.
pub fn dispatch(
    verified: VerifiedNotification,
    handler: &dyn NotifyHandler,
) -> Result<Acknowledgment> {
    let declared = handler.kind();
    if declared != verified.kind {
        warn!(
            provider = %verified.provider,
            declared = %declared,
            classified = %verified.kind,
            "notification handler kind mismatch"
        );
        return Err(NotifyError::HandlerKindMismatch {
            declared,
            classified: verified.kind,
        });
    }

    // A handler that panics must surface as a failed acknowledgment, not as
    // an unwind through the shared dispatch path.
    let accepted = catch_unwind(AssertUnwindSafe(|| {
        handler.handle(verified.provider, &verified.data)
    }))
    .unwrap_or_else(|_| {
        warn!(
            provider = %verified.provider,
            kind = %verified.kind,
            "notification handler panicked; acknowledging failure"
        );
        false
    });
    info!(
        provider = %verified.provider,
        kind = %verified.kind,
        accepted,
        "notification dispatched"
    );
    Ok(if accepted {
        Acknowledgment::success(verified.provider)
    } else {
        Acknowledgment::failure(verified.provider)
    })
}
