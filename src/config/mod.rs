use serde::Deserialize;
use std::collections::HashMap;

/// Per-merchant trust material for both providers, keyed by merchant name
/// (the `"default"` merchant by convention).
///
/// Loading this from files or the environment is the caller's concern; the
/// library only validates the material when a provider client is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    #[serde(default)]
    pub alipay: HashMap<String, AlipayConfig>,
    #[serde(default)]
    pub wechat: HashMap<String, WechatConfig>,
}

/// Alipay merchant trust material
#[derive(Debug, Clone, Deserialize)]
pub struct AlipayConfig {
    /// Open-platform application id; inbound notifications must declare it
    pub app_id: String,

    /// Merchant signing key for outbound calls. Accepted as PEM or a raw
    /// Base64 body; validated at client construction.
    #[serde(default)]
    pub app_private_key: Option<String>,

    /// Alipay public key used to verify inbound notification signatures
    pub alipay_public_key: String,

    /// Signature scheme, RSA2 (SHA-256) unless the merchant is on legacy RSA
    #[serde(default)]
    pub sign_type: SignType,

    /// Default asynchronous notification URL
    #[serde(default)]
    pub notify_url: Option<String>,
}

/// WeChat Pay merchant trust material (APIv3)
#[derive(Debug, Clone, Deserialize)]
pub struct WechatConfig {
    /// Official-account / mini-program application id
    pub app_id: String,

    /// Direct merchant number
    pub mch_id: String,

    /// APIv3 symmetric key, exactly 32 bytes, used for AES-256-GCM resource
    /// decryption
    pub api_v3_key: String,

    /// Platform certificate public key used to verify inbound notification
    /// signatures
    pub platform_public_key: String,

    /// Serial number of the platform certificate; inbound notifications must
    /// declare it in the Wechatpay-Serial header
    pub platform_certificate_serial: String,

    /// Default asynchronous notification URL
    #[serde(default)]
    pub notify_url: Option<String>,
}

/// Alipay signature scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SignType {
    /// SHA1-with-RSA, legacy merchants only
    #[serde(rename = "RSA")]
    Rsa,
    /// SHA256-with-RSA
    #[default]
    #[serde(rename = "RSA2")]
    Rsa2,
}

impl SignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignType::Rsa => "RSA",
            SignType::Rsa2 => "RSA2",
        }
    }
}
