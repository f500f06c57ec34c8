use rsa::RsaPublicKey;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::provider_trait::{PaymentProvider, Provider};
use crate::config::{AlipayConfig, SignType};
use crate::core::{NotifyError, Result};
use crate::modules::crypto;
use crate::modules::notify::{classify, NotificationEnvelope, VerifiedNotification};

/// Alipay client
///
/// Notifications arrive as form fields (query string or POST body) carrying a
/// detached RSA signature over a canonical serialization of the fields.
/// API documentation: https://opendocs.alipay.com/open/203/105286
pub struct AlipayProvider {
    app_id: String,
    alipay_public_key: RsaPublicKey,
    sign_type: SignType,
}

impl AlipayProvider {
    /// Build a client from merchant trust material, validating key material
    /// up front.
    pub fn new(config: &AlipayConfig) -> Result<Self> {
        if config.app_id.is_empty() {
            return Err(NotifyError::configuration("Alipay app_id must not be empty"));
        }
        let alipay_public_key = crypto::rsa::parse_public_key(&config.alipay_public_key)?;
        // The merchant signing key is only used for outbound calls, but bad
        // material should still surface at construction, not at first use.
        if let Some(private_key) = &config.app_private_key {
            crypto::rsa::parse_private_key(private_key)?;
        }
        if let Some(notify_url) = &config.notify_url {
            validate_notify_url(notify_url)?;
        }
        Ok(Self {
            app_id: config.app_id.clone(),
            alipay_public_key,
            sign_type: config.sign_type,
        })
    }

    /// Canonical pre-sign string: every field except `sign` and `sign_type`,
    /// sorted by key, serialized as `k=v` joined with `&`.
    ///
    /// This is Alipay's published canonicalization contract; any deviation
    /// breaks all verification.
    fn canonical_string(fields: &std::collections::HashMap<String, String>) -> String {
        let sorted: BTreeMap<&str, &str> = fields
            .iter()
            .filter(|(k, _)| k.as_str() != "sign" && k.as_str() != "sign_type")
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        sorted
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Signature scheme for one notification: the declared `sign_type` field
    /// when present, the configured scheme when absent. A declared scheme we
    /// cannot verify is rejected outright, never defaulted.
    fn notification_sign_type(
        &self,
        fields: &std::collections::HashMap<String, String>,
    ) -> Result<SignType> {
        match fields.get("sign_type").map(String::as_str) {
            Some("RSA") => Ok(SignType::Rsa),
            Some("RSA2") => Ok(SignType::Rsa2),
            None => Ok(self.sign_type),
            Some(other) => {
                warn!(declared = other, "unsupported sign_type declared by notification");
                Err(NotifyError::SignatureInvalid)
            }
        }
    }
}

impl PaymentProvider for AlipayProvider {
    fn provider(&self) -> Provider {
        Provider::Alipay
    }

    fn authenticate(&self, envelope: &NotificationEnvelope) -> Result<VerifiedNotification> {
        let fields = &envelope.fields;
        if fields.is_empty() {
            return Err(NotifyError::missing("notification data is empty"));
        }
        let wire_event_type = fields
            .get("notify_type")
            .ok_or_else(|| NotifyError::missing("notify_type field"))?;
        let signature = fields
            .get("sign")
            .ok_or_else(|| NotifyError::missing("sign field"))?;
        let kind = classify(Provider::Alipay, wire_event_type)?;

        match fields.get("app_id") {
            Some(app_id) if *app_id == self.app_id => {}
            declared => {
                return Err(NotifyError::identity(format!(
                    "notification app_id {:?} does not match configured app_id",
                    declared
                )))
            }
        }

        let message = Self::canonical_string(fields);
        let sign_type = self.notification_sign_type(fields)?;
        debug!(kind = %kind, sign_type = sign_type.as_str(), "verifying Alipay notification signature");
        if !crypto::rsa::verify(
            &self.alipay_public_key,
            sign_type,
            message.as_bytes(),
            signature,
        ) {
            return Err(NotifyError::SignatureInvalid);
        }

        let data: Map<String, Value> = fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Ok(VerifiedNotification {
            provider: Provider::Alipay,
            kind,
            data,
        })
    }
}

pub(crate) fn validate_notify_url(notify_url: &str) -> Result<()> {
    if notify_url.starts_with("https://") || notify_url.starts_with("http://") {
        Ok(())
    } else {
        Err(NotifyError::configuration(format!(
            "notify_url '{notify_url}' is not a valid HTTP(S) URL"
        )))
    }
}
