use serde_json::{Map, Value};

use super::kind::NotifyKind;
use crate::modules::providers::Provider;

/// Caller-supplied notification handler.
///
/// A handler declares exactly one canonical kind and processes the verified
/// plaintext fields of a matching notification. The boolean outcome drives
/// the acknowledgment sent back to the gateway: `true` tells the gateway the
/// notification was consumed, `false` asks for redelivery.
///
/// The gateway may redeliver a logical event; handlers must be idempotent on
/// their own terms.
pub trait NotifyHandler {
    /// The canonical kind this handler consumes
    fn kind(&self) -> NotifyKind;

    /// Process the verified notification fields
    fn handle(&self, provider: Provider, data: &Map<String, Value>) -> bool;
}

/// Closure-backed handler for a fixed kind.
pub struct FnNotify<F> {
    kind: NotifyKind,
    callback: F,
}

impl<F> FnNotify<F>
where
    F: Fn(Provider, &Map<String, Value>) -> bool,
{
    pub fn new(kind: NotifyKind, callback: F) -> Self {
        Self { kind, callback }
    }

    /// Payment-result handler
    pub fn on_pay(callback: F) -> Self {
        Self::new(NotifyKind::Pay, callback)
    }

    /// Refund-result handler
    pub fn on_refund(callback: F) -> Self {
        Self::new(NotifyKind::Refund, callback)
    }

    /// Agreement-signed handler
    pub fn on_sign(callback: F) -> Self {
        Self::new(NotifyKind::Sign, callback)
    }

    /// Agreement-unsigned handler
    pub fn on_unsign(callback: F) -> Self {
        Self::new(NotifyKind::Unsign, callback)
    }
}

impl<F> NotifyHandler for FnNotify<F>
where
    F: Fn(Provider, &Map<String, Value>) -> bool,
{
    fn kind(&self) -> NotifyKind {
        self.kind
    }

    fn handle(&self, provider: Provider, data: &Map<String, Value>) -> bool {
        (self.callback)(provider, data)
    }
}
