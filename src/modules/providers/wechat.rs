use chrono::{DateTime, Utc};
use rsa::RsaPublicKey;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::alipay::validate_notify_url;
use super::provider_trait::{PaymentProvider, Provider};
use crate::config::{SignType, WechatConfig};
use crate::core::{NotifyError, Result};
use crate::modules::crypto;
use crate::modules::notify::{classify, NotificationEnvelope, VerifiedNotification};

/// Maximum accepted skew between notification timestamp and receipt time.
/// A skew of exactly this many seconds is still accepted.
pub const REPLAY_WINDOW_SECS: i64 = 300;

/// WeChat Pay APIv3 client
///
/// Notifications arrive as a JSON body with the signature, nonce, timestamp
/// and platform-certificate serial carried in headers; the business payload
/// is an AES-256-GCM encrypted `resource` block.
/// API documentation: https://pay.weixin.qq.com/docs/merchant/apis/jsapi-payment/payment-notice.html
pub struct WechatProvider {
    app_id: String,
    mch_id: String,
    api_v3_key: Vec<u8>,
    platform_public_key: RsaPublicKey,
    platform_certificate_serial: String,
}

/// Notification body envelope, APIv3 wire format
#[derive(Debug, Deserialize)]
struct NotifyBody {
    event_type: Option<String>,
    resource: Option<NotifyResource>,
}

#[derive(Debug, Deserialize)]
struct NotifyResource {
    ciphertext: String,
    nonce: String,
    #[serde(default)]
    associated_data: Option<String>,
}

impl WechatProvider {
    /// Build a client from merchant trust material, validating key material
    /// up front.
    pub fn new(config: &WechatConfig) -> Result<Self> {
        if config.app_id.is_empty() {
            return Err(NotifyError::configuration("WeChat app_id must not be empty"));
        }
        if config.mch_id.is_empty() {
            return Err(NotifyError::configuration("WeChat mch_id must not be empty"));
        }
        if config.api_v3_key.len() != crypto::aes::KEY_LEN {
            return Err(NotifyError::configuration(format!(
                "WeChat api_v3_key must be exactly {} bytes",
                crypto::aes::KEY_LEN
            )));
        }
        if config.platform_certificate_serial.is_empty() {
            return Err(NotifyError::configuration(
                "WeChat platform certificate serial must not be empty",
            ));
        }
        let platform_public_key = crypto::rsa::parse_public_key(&config.platform_public_key)?;
        if let Some(notify_url) = &config.notify_url {
            validate_notify_url(notify_url)?;
        }
        Ok(Self {
            app_id: config.app_id.clone(),
            mch_id: config.mch_id.clone(),
            api_v3_key: config.api_v3_key.as_bytes().to_vec(),
            platform_public_key,
            platform_certificate_serial: config.platform_certificate_serial.clone(),
        })
    }

    /// Authenticate against an explicit receipt time; `authenticate` passes
    /// the current time. Split out so the replay-window boundary is testable.
    pub fn authenticate_at(
        &self,
        envelope: &NotificationEnvelope,
        now: DateTime<Utc>,
    ) -> Result<VerifiedNotification> {
        if envelope.body.is_empty() {
            return Err(NotifyError::missing("notification body is empty"));
        }
        if envelope.signature.is_empty() {
            return Err(NotifyError::missing("Wechatpay-Signature header"));
        }
        if envelope.serial.is_empty() {
            return Err(NotifyError::missing("Wechatpay-Serial header"));
        }
        if envelope.nonce.is_empty() {
            return Err(NotifyError::missing("Wechatpay-Nonce header"));
        }
        let timestamp = envelope
            .timestamp
            .ok_or_else(|| NotifyError::missing("Wechatpay-Timestamp header"))?;

        let skew = (now.timestamp() - timestamp).abs();
        if skew > REPLAY_WINDOW_SECS {
            return Err(NotifyError::ReplayOrClockSkew {
                skew,
                limit: REPLAY_WINDOW_SECS,
            });
        }

        if envelope.serial != self.platform_certificate_serial {
            return Err(NotifyError::identity(format!(
                "certificate serial '{}' does not match the configured platform certificate",
                envelope.serial
            )));
        }

        let body = envelope.body_str()?;
        // Signed message: timestamp, nonce and body, each line-feed terminated.
        let message = format!("{timestamp}\n{}\n{body}\n", envelope.nonce);
        debug!(
            mch_id = %self.mch_id,
            serial = %envelope.serial,
            "verifying WeChat Pay notification signature"
        );
        if !crypto::rsa::verify(
            &self.platform_public_key,
            SignType::Rsa2,
            message.as_bytes(),
            &envelope.signature,
        ) {
            return Err(NotifyError::SignatureInvalid);
        }

        let parsed: NotifyBody = serde_json::from_str(body)
            .map_err(|e| NotifyError::missing(format!("notification body is not valid JSON: {e}")))?;
        let event_type = parsed
            .event_type
            .ok_or_else(|| NotifyError::missing("event_type field"))?;
        let resource = parsed
            .resource
            .ok_or_else(|| NotifyError::missing("resource object"))?;

        let associated_data = resource.associated_data.unwrap_or_default();
        let plaintext = crypto::aes::decrypt(
            &self.api_v3_key,
            resource.nonce.as_bytes(),
            associated_data.as_bytes(),
            &resource.ciphertext,
        )?;
        let data: Map<String, Value> = serde_json::from_slice(&plaintext)
            .map_err(|_| NotifyError::decryption("decrypted resource is not a JSON object"))?;

        let kind = classify(Provider::Wechat, &event_type)?;
        Ok(VerifiedNotification {
            provider: Provider::Wechat,
            kind,
            data,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn mch_id(&self) -> &str {
        &self.mch_id
    }
}

impl PaymentProvider for WechatProvider {
    fn provider(&self) -> Provider {
        Provider::Wechat
    }

    fn authenticate(&self, envelope: &NotificationEnvelope) -> Result<VerifiedNotification> {
        self.authenticate_at(envelope, Utc::now())
    }
}
