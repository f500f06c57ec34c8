use super::alipay::AlipayProvider;
use super::provider_trait::{PaymentProvider, Provider};
use super::wechat::WechatProvider;
use crate::config::PaymentConfig;
use crate::core::{NotifyError, Result};

/// Merchant name used when the caller does not distinguish merchants.
pub const DEFAULT_MERCHANT: &str = "default";

/// Entry-point facade over the configured providers.
///
/// Holds per-merchant trust material for every provider and builds provider
/// clients on demand; a built client owns an immutable copy of its material.
pub struct Payment {
    config: PaymentConfig,
}

impl Payment {
    pub fn config(config: PaymentConfig) -> Self {
        Self { config }
    }

    /// Alipay client for the given merchant.
    pub fn alipay(&self, merchant: &str) -> Result<AlipayProvider> {
        let config = self.config.alipay.get(merchant).ok_or_else(|| {
            NotifyError::configuration(format!("no Alipay configuration for merchant '{merchant}'"))
        })?;
        AlipayProvider::new(config)
    }

    /// WeChat Pay client for the given merchant.
    pub fn wechat(&self, merchant: &str) -> Result<WechatProvider> {
        let config = self.config.wechat.get(merchant).ok_or_else(|| {
            NotifyError::configuration(format!(
                "no WeChat Pay configuration for merchant '{merchant}'"
            ))
        })?;
        WechatProvider::new(config)
    }

    /// Provider client behind the common interface.
    pub fn provider(
        &self,
        provider: Provider,
        merchant: &str,
    ) -> Result<Box<dyn PaymentProvider>> {
        match provider {
            Provider::Alipay => self
                .alipay(merchant)
                .map(|p| Box::new(p) as Box<dyn PaymentProvider>),
            Provider::Wechat => self
                .wechat(merchant)
                .map(|p| Box::new(p) as Box<dyn PaymentProvider>),
        }
    }
}
