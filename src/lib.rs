//! Paybridge Unified Payment Client Library
//!
//! A single facade over Alipay and WeChat Pay with verified asynchronous
//! notification handling: signature verification, replay-window checks,
//! payload decryption, event classification and handler dispatch.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use config::{AlipayConfig, PaymentConfig, SignType, WechatConfig};
pub use core::{NotifyError, Result};
pub use modules::notify::{
    classify, dispatch, Acknowledgment, FnNotify, NotificationEnvelope, NotifyHandler, NotifyKind,
    VerifiedNotification,
};
pub use modules::providers::{
    AlipayProvider, Payment, PaymentProvider, Provider, WechatProvider, DEFAULT_MERCHANT,
};
