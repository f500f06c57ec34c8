use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{NotifyError, Result};
use crate::modules::providers::Provider;

/// Canonical notification kind every provider wire event is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotifyKind {
    /// Trade paid
    #[serde(rename = "pay")]
    Pay,
    /// Refund completed
    #[serde(rename = "refund")]
    Refund,
    /// Deduction agreement created
    #[serde(rename = "sign")]
    Sign,
    /// Deduction agreement canceled
    #[serde(rename = "unsign")]
    Unsign,
    /// Service market order
    #[serde(rename = "service.market.order")]
    ServiceMarketOrder,
    /// Open-platform app authorization
    #[serde(rename = "open.app.auth")]
    OpenAppAuth,
    /// Merchant transfer batch finished
    #[serde(rename = "mchtransfer.batch.finished")]
    MerchantTransferBatchFinished,
}

impl NotifyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyKind::Pay => "pay",
            NotifyKind::Refund => "refund",
            NotifyKind::Sign => "sign",
            NotifyKind::Unsign => "unsign",
            NotifyKind::ServiceMarketOrder => "service.market.order",
            NotifyKind::OpenAppAuth => "open.app.auth",
            NotifyKind::MerchantTransferBatchFinished => "mchtransfer.batch.finished",
        }
    }
}

impl fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a provider wire event-type string to its canonical kind.
///
/// Pure lookup over a fixed per-provider table; an unrecognized value is an
/// `UnknownEventType` error, never a silent default.
pub fn classify(provider: Provider, wire_event_type: &str) -> Result<NotifyKind> {
    let kind = match provider {
        Provider::Alipay => match wire_event_type {
            "trade_status_sync" => NotifyKind::Pay,
            "dut_user_sign" => NotifyKind::Sign,
            "dut_user_unsign" => NotifyKind::Unsign,
            "servicemarket_order_notify" => NotifyKind::ServiceMarketOrder,
            "open_app_auth_notify" => NotifyKind::OpenAppAuth,
            other => return Err(NotifyError::UnknownEventType(other.to_string())),
        },
        Provider::Wechat => match wire_event_type {
            "TRANSACTION.SUCCESS" => NotifyKind::Pay,
            "REFUND.SUCCESS" => NotifyKind::Refund,
            other => return Err(NotifyError::UnknownEventType(other.to_string())),
        },
    };
    Ok(kind)
}
