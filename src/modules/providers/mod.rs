pub mod alipay;
pub mod payment;
pub mod provider_trait;
pub mod wechat;

pub use alipay::AlipayProvider;
pub use payment::{Payment, DEFAULT_MERCHANT};
pub use provider_trait::{PaymentProvider, Provider};
pub use wechat::WechatProvider;
