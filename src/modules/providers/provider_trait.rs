use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{NotifyError, Result};
use crate::modules::notify::{
    dispatch, Acknowledgment, NotificationEnvelope, NotifyHandler, VerifiedNotification,
};

/// Supported payment providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Alipay,
    Wechat,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Alipay => "alipay",
            Provider::Wechat => "wechat",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "alipay" => Ok(Provider::Alipay),
            "wechat" => Ok(Provider::Wechat),
            other => Err(NotifyError::configuration(format!(
                "unsupported payment provider '{other}'"
            ))),
        }
    }
}

/// Provider client able to authenticate inbound notifications and drive the
/// verify-classify-dispatch pipeline.
///
/// Trust material is read-only after construction, so a single client is safe
/// to share across concurrent inbound requests.
pub trait PaymentProvider: Send + Sync {
    fn provider(&self) -> Provider;

    /// Authenticate an inbound notification envelope: presence checks,
    /// replay-window and identity checks, signature verification and, where
    /// the provider requires it, resource decryption. Any failure aborts the
    /// notification with a specific error kind; there are no retries.
    fn authenticate(&self, envelope: &NotificationEnvelope) -> Result<VerifiedNotification>;

    /// Full notification pipeline: authenticate, then dispatch to `handler`.
    ///
    /// The handler is invoked at most once and only when its declared kind
    /// matches the classified notification.
    fn notify(
        &self,
        envelope: &NotificationEnvelope,
        handler: &dyn NotifyHandler,
    ) -> Result<Acknowledgment> {
        let verified = self.authenticate(envelope)?;
        dispatch(verified, handler)
    }
}
