// End-to-end Alipay notification handling with real RSA keys: canonical
// string signing, authentication, classification, dispatch and the
// acknowledgment contract.

use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use actix_web::test::TestRequest;
use actix_web::web::Bytes;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;

use paybridge::modules::crypto::rsa as rsa_sig;
use paybridge::modules::web;
use paybridge::{
    AlipayConfig, AlipayProvider, FnNotify, NotificationEnvelope, NotifyError, NotifyHandler,
    NotifyKind, PaymentProvider, Provider, SignType,
};

const APP_ID: &str = "2021003188616436";

fn test_keypair() -> (RsaPrivateKey, String) {
    let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate RSA key");
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("encode public key");
    (private, public_pem)
}

fn provider(public_key: &str) -> AlipayProvider {
    AlipayProvider::new(&AlipayConfig {
        app_id: APP_ID.to_string(),
        app_private_key: None,
        alipay_public_key: public_key.to_string(),
        sign_type: SignType::Rsa2,
        notify_url: Some("https://merchant.example/notify/alipay".to_string()),
    })
    .expect("build provider")
}

/// Alipay's canonicalization: sorted `k=v` pairs joined with `&`, `sign` and
/// `sign_type` excluded.
fn canonical(fields: &HashMap<String, String>) -> String {
    let mut pairs: Vec<_> = fields
        .iter()
        .filter(|(k, _)| k.as_str() != "sign" && k.as_str() != "sign_type")
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn signed_fields(private: &RsaPrivateKey, pairs: &[(&str, &str)]) -> HashMap<String, String> {
    let mut fields: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let signature = rsa_sig::sign(private, SignType::Rsa2, canonical(&fields).as_bytes())
        .expect("sign canonical string");
    fields.insert("sign".to_string(), signature);
    fields.insert("sign_type".to_string(), "RSA2".to_string());
    fields
}

fn pay_fields(private: &RsaPrivateKey) -> HashMap<String, String> {
    signed_fields(
        private,
        &[
            ("notify_type", "trade_status_sync"),
            ("app_id", APP_ID),
            ("trade_status", "TRADE_SUCCESS"),
            ("out_trade_no", "T1"),
            ("total_amount", "9.90"),
        ],
    )
}

fn envelope(fields: HashMap<String, String>) -> NotificationEnvelope {
    NotificationEnvelope::from_form_fields(HashMap::new(), fields)
}

struct CountingHandler {
    kind: NotifyKind,
    calls: Cell<u32>,
}

impl NotifyHandler for CountingHandler {
    fn kind(&self) -> NotifyKind {
        self.kind
    }

    fn handle(&self, _provider: Provider, _data: &Map<String, Value>) -> bool {
        self.calls.set(self.calls.get() + 1);
        true
    }
}

#[test]
fn pay_notification_reaches_the_pay_handler() {
    let (private, public_pem) = test_keypair();
    let provider = provider(&public_pem);

    let seen_trade_no = RefCell::new(None);
    let handler = FnNotify::on_pay(|provider, data| {
        assert_eq!(provider, Provider::Alipay);
        *seen_trade_no.borrow_mut() = data
            .get("out_trade_no")
            .and_then(Value::as_str)
            .map(str::to_string);
        true
    });

    let ack = provider
        .notify(&envelope(pay_fields(&private)), &handler)
        .expect("notify");
    assert_eq!(ack.body(), "success");
    assert_eq!(ack.status(), 200);
    assert_eq!(seen_trade_no.borrow().as_deref(), Some("T1"));
}

#[test]
fn authenticate_returns_the_original_fields() {
    let (private, public_pem) = test_keypair();
    let fields = pay_fields(&private);

    let verified = provider(&public_pem)
        .authenticate(&envelope(fields.clone()))
        .expect("authenticate");
    assert_eq!(verified.provider, Provider::Alipay);
    assert_eq!(verified.kind, NotifyKind::Pay);
    for (key, value) in &fields {
        assert_eq!(
            verified.data.get(key).and_then(Value::as_str),
            Some(value.as_str()),
            "field {key}"
        );
    }
}

#[test]
fn foreign_app_id_is_rejected_before_the_handler_runs() {
    let (private, public_pem) = test_keypair();
    let fields = signed_fields(
        &private,
        &[
            ("notify_type", "trade_status_sync"),
            ("app_id", "2021000000000000"),
            ("out_trade_no", "T1"),
        ],
    );

    let handler = CountingHandler {
        kind: NotifyKind::Pay,
        calls: Cell::new(0),
    };
    let err = provider(&public_pem)
        .notify(&envelope(fields), &handler)
        .unwrap_err();
    assert!(matches!(err, NotifyError::IdentityMismatch(_)));
    assert_eq!(handler.calls.get(), 0);
}

#[test]
fn tampered_field_invalidates_the_signature() {
    let (private, public_pem) = test_keypair();
    let mut fields = pay_fields(&private);
    fields.insert("out_trade_no".to_string(), "T2".to_string());

    assert!(matches!(
        provider(&public_pem).authenticate(&envelope(fields)),
        Err(NotifyError::SignatureInvalid)
    ));
}

#[test]
fn missing_sign_field_is_missing_data() {
    let (private, public_pem) = test_keypair();
    let mut fields = pay_fields(&private);
    fields.remove("sign");

    assert!(matches!(
        provider(&public_pem).authenticate(&envelope(fields)),
        Err(NotifyError::MissingData(_))
    ));
}

#[test]
fn missing_notify_type_is_missing_data() {
    let (private, public_pem) = test_keypair();
    let mut fields = pay_fields(&private);
    fields.remove("notify_type");

    assert!(matches!(
        provider(&public_pem).authenticate(&envelope(fields)),
        Err(NotifyError::MissingData(_))
    ));
}

#[test]
fn empty_notification_is_missing_data() {
    let (_, public_pem) = test_keypair();
    assert!(matches!(
        provider(&public_pem).authenticate(&envelope(HashMap::new())),
        Err(NotifyError::MissingData(_))
    ));
}

#[test]
fn unlisted_notify_type_is_unknown_event_type() {
    let (private, public_pem) = test_keypair();
    let fields = signed_fields(
        &private,
        &[("notify_type", "trade_mystery"), ("app_id", APP_ID)],
    );

    assert!(matches!(
        provider(&public_pem).authenticate(&envelope(fields)),
        Err(NotifyError::UnknownEventType(_))
    ));
}

#[test]
fn unsupported_declared_sign_type_is_rejected_not_defaulted() {
    let (private, public_pem) = test_keypair();
    // The signature itself is valid; only the declared scheme is bogus.
    // sign_type is outside the canonical string, so this is not a tamper.
    let mut fields = pay_fields(&private);
    fields.insert("sign_type".to_string(), "MD5".to_string());

    assert!(matches!(
        provider(&public_pem).authenticate(&envelope(fields)),
        Err(NotifyError::SignatureInvalid)
    ));
}

#[test]
fn absent_sign_type_falls_back_to_the_configured_scheme() {
    let (private, public_pem) = test_keypair();
    let mut fields = pay_fields(&private);
    fields.remove("sign_type");

    let verified = provider(&public_pem)
        .authenticate(&envelope(fields))
        .expect("authenticate under configured RSA2");
    assert_eq!(verified.kind, NotifyKind::Pay);
}

#[test]
fn agreement_sign_notification_classifies_as_sign() {
    let (private, public_pem) = test_keypair();
    let fields = signed_fields(
        &private,
        &[
            ("notify_type", "dut_user_sign"),
            ("app_id", APP_ID),
            ("external_agreement_no", "AG1"),
        ],
    );

    let handler = FnNotify::on_sign(|_, data| {
        data.get("external_agreement_no").and_then(Value::as_str) == Some("AG1")
    });
    let ack = provider(&public_pem)
        .notify(&envelope(fields), &handler)
        .expect("notify");
    assert_eq!(ack.body(), "success");
}

#[test]
fn raw_base64_public_key_body_is_accepted() {
    let (private, public_pem) = test_keypair();
    let raw_body: String = public_pem
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();

    let verified = provider(&raw_body)
        .authenticate(&envelope(pay_fields(&private)))
        .expect("authenticate with raw key body");
    assert_eq!(verified.kind, NotifyKind::Pay);
}

#[test]
fn invalid_public_key_fails_at_construction() {
    let result = AlipayProvider::new(&AlipayConfig {
        app_id: APP_ID.to_string(),
        app_private_key: None,
        alipay_public_key: "dGhpcyBpcyBub3QgYSBrZXk=".to_string(),
        sign_type: SignType::Rsa2,
        notify_url: None,
    });
    assert!(matches!(result, Err(NotifyError::Configuration(_))));
}

#[actix_web::test]
async fn form_body_webhook_round_trips_through_the_web_adapter() {
    let (private, public_pem) = test_keypair();
    let body = serde_urlencoded::to_string(pay_fields(&private)).expect("encode form");

    // Stale value in the query string; the signed body must win
    let req = TestRequest::post()
        .uri("/notify/alipay?out_trade_no=SPOOFED")
        .to_http_request();
    let envelope =
        web::alipay_envelope(&req, &Bytes::from(body.into_bytes())).expect("build envelope");

    let handler = FnNotify::on_pay(|_, data| {
        data.get("out_trade_no").and_then(Value::as_str) == Some("T1")
    });
    let ack = provider(&public_pem)
        .notify(&envelope, &handler)
        .expect("notify");

    let response = web::ack_response(&ack);
    assert_eq!(response.status().as_u16(), 200);
    let bytes = actix_web::body::to_bytes(response.into_body())
        .await
        .expect("read body");
    assert_eq!(&bytes[..], b"success");
}
