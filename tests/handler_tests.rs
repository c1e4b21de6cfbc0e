use std::collections::HashMap;

use notification_orchestrator::{
    handlers::{
        self, format_sms_timestamp, password_reset_requested, password_updated, user_created,
        user_login,
    },
    models::{
        alert::{AlertEvent, AlertItem},
        event::{AuthEvent, EventData, EventMeta},
        notification::{Channel, NotificationPayload, NotificationRequest},
    },
};
use serde_json::json;

fn auth_event(phone: Option<&str>) -> AuthEvent {
    AuthEvent {
        event_type: Some("user.created".to_string()),
        data: EventData {
            id: Some("42".to_string()),
            username: Some("alice".to_string()),
            email: Some("alice@example.com".to_string()),
            phone: phone.map(str::to_string),
            token: Some("tok123".to_string()),
        },
        meta: EventMeta {
            ip: Some("10.0.0.1".to_string()),
            timestamp: Some("2024-03-15T10:30:00".to_string()),
        },
    }
}

fn email_parts(request: &NotificationRequest) -> (&str, &HashMap<String, serde_json::Value>) {
    match &request.payload {
        NotificationPayload::Email { template, data } => (template.as_str(), data),
        NotificationPayload::Sms { .. } => panic!("expected an email payload"),
    }
}

fn sms_message(request: &NotificationRequest) -> &str {
    match &request.payload {
        NotificationPayload::Sms { message } => message.as_str(),
        NotificationPayload::Email { .. } => panic!("expected an SMS payload"),
    }
}

/// Test: user.created with complete data produces the confirmation email
/// and the welcome SMS
#[test]
fn test_user_created_complete_data() {
    let requests = user_created(&auth_event(Some("+15551234"))).unwrap();

    assert_eq!(requests.len(), 2);

    let email = &requests[0];
    assert_eq!(email.notification_type, "account.confirmation");
    assert_eq!(email.recipient, "alice@example.com");
    assert_eq!(email.channel(), Channel::Email);

    let (template, data) = email_parts(email);
    assert_eq!(template, "welcome");
    assert_eq!(data["username"], json!("alice"));
    assert_eq!(data["confirmationUrl"], json!("http://localhost:3500/confirm/42"));

    let sms = &requests[1];
    assert_eq!(sms.notification_type, "account.created");
    assert_eq!(sms.recipient, "+15551234");
    assert_eq!(
        sms_message(sms),
        "Welcome alice! Your account was created successfully. Thanks for signing up!"
    );
}

/// Test: user.created with a blank or absent phone only produces the email
#[test]
fn test_user_created_phone_skip() {
    for phone in [None, Some(""), Some("   ")] {
        let requests = user_created(&auth_event(phone)).unwrap();

        assert_eq!(requests.len(), 1, "phone {:?} should skip the SMS", phone);
        assert_eq!(requests[0].channel(), Channel::Email);
    }
}

/// Test: user.login with complete data produces the security email and SMS
#[test]
fn test_user_login_complete_data() {
    let requests = user_login(&auth_event(Some("+15551234"))).unwrap();

    assert_eq!(requests.len(), 2);

    let email = &requests[0];
    assert_eq!(email.notification_type, "security.login");
    assert_eq!(email.recipient, "alice@example.com");

    let (template, data) = email_parts(email);
    assert_eq!(template, "security-alert");
    assert_eq!(data["username"], json!("alice"));
    assert_eq!(data["ip"], json!("10.0.0.1"));
    assert_eq!(data["timestamp"], json!("2024-03-15T10:30:00"));

    let sms = &requests[1];
    assert_eq!(sms.notification_type, "security.login");
    assert_eq!(sms.recipient, "+15551234");
    assert_eq!(
        sms_message(sms),
        "Alert: new access to your account from 10.0.0.1 on 15/03/2024 10:30"
    );
}

/// Test: user.login with no IP in metadata falls back to "unknown IP"
#[test]
fn test_user_login_missing_ip_defaults() {
    let mut event = auth_event(Some("+15551234"));
    event.meta.ip = None;

    let requests = user_login(&event).unwrap();

    let (_, data) = email_parts(&requests[0]);
    assert_eq!(data["ip"], json!("unknown IP"));

    assert!(sms_message(&requests[1]).contains("from unknown IP on "));
}

/// Test: password.reset.requested only ever produces the email, phone or not
#[test]
fn test_password_reset_email_only() {
    for phone in [Some("+15551234"), None] {
        let requests = password_reset_requested(&auth_event(phone)).unwrap();

        assert_eq!(requests.len(), 1);

        let email = &requests[0];
        assert_eq!(email.notification_type, "password.reset");
        assert_eq!(email.recipient, "alice@example.com");

        let (template, data) = email_parts(email);
        assert_eq!(template, "password-reset");
        assert_eq!(
            data["resetUrl"],
            json!("http://localhost:3500/reset-password/tok123")
        );
    }
}

/// Test: password.updated produces the change notification email and SMS
#[test]
fn test_password_updated_complete_data() {
    let requests = password_updated(&auth_event(Some("+15551234"))).unwrap();

    assert_eq!(requests.len(), 2);

    let email = &requests[0];
    assert_eq!(email.notification_type, "security.password_change");

    let (template, data) = email_parts(email);
    assert_eq!(template, "password-changed");
    assert_eq!(data["username"], json!("alice"));
    assert_eq!(data["timestamp"], json!("2024-03-15T10:30:00"));

    let sms = &requests[1];
    assert_eq!(sms.notification_type, "security.password_change");
    assert_eq!(
        sms_message(sms),
        "Your password was changed successfully on 15/03/2024 10:30"
    );
}

/// Test: link identifiers are concatenated verbatim, no URL-encoding
#[test]
fn test_link_identifiers_pass_through_verbatim() {
    let mut event = auth_event(None);
    event.data.token = Some("a b/c&d".to_string());

    let requests = password_reset_requested(&event).unwrap();
    let (_, data) = email_parts(&requests[0]);

    assert_eq!(
        data["resetUrl"],
        json!("http://localhost:3500/reset-password/a b/c&d")
    );
}

/// Test: an event with every field absent still produces the email without
/// erroring
#[test]
fn test_empty_event_degrades_gracefully() {
    let event = AuthEvent::default();

    let requests = user_created(&event).unwrap();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].recipient, "");

    let (_, data) = email_parts(&requests[0]);
    assert_eq!(data["confirmationUrl"], json!("http://localhost:3500/confirm/"));
}

/// Test: handlers are idempotent for identical input
#[test]
fn test_handler_idempotence() {
    let event = auth_event(Some("+15551234"));

    assert_eq!(user_login(&event).unwrap(), user_login(&event).unwrap());
    assert_eq!(
        password_updated(&event).unwrap(),
        password_updated(&event).unwrap()
    );
}

/// Test: ISO timestamps render as dd/mm/yyyy hh:mm
#[test]
fn test_sms_timestamp_iso_roundtrip() {
    assert_eq!(format_sms_timestamp("2024-03-15T10:30:00"), "15/03/2024 10:30");
    assert_eq!(format_sms_timestamp("2024-03-15T10:30:00Z"), "15/03/2024 10:30");
    assert_eq!(format_sms_timestamp("2024-12-01T23:59:59.123"), "01/12/2024 23:59");
}

/// Test: an unparsable timestamp falls back to current time in the same
/// dd/mm/yyyy hh:mm shape
#[test]
fn test_sms_timestamp_fallback_shape() {
    let formatted = format_sms_timestamp("not-a-date");

    assert!(
        is_sms_timestamp_shape(&formatted),
        "unexpected fallback format: {}",
        formatted
    );
}

fn is_sms_timestamp_shape(s: &str) -> bool {
    let bytes = s.as_bytes();

    bytes.len() == 16
        && bytes[2] == b'/'
        && bytes[5] == b'/'
        && bytes[10] == b' '
        && bytes[13] == b':'
        && [0, 1, 3, 4, 6, 7, 8, 9, 11, 12, 14, 15]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

/// Test: alert payloads reshape into the flat service.alert body with
/// unknown defaults
#[test]
fn test_alert_reshape() {
    let alert = AlertEvent {
        receiver: Some("webhook".to_string()),
        status: Some("firing".to_string()),
        alerts: vec![AlertItem {
            status: Some("firing".to_string()),
            labels: HashMap::from([
                ("alertname".to_string(), "HighErrorRate".to_string()),
                ("service".to_string(), "auth".to_string()),
            ]),
            annotations: HashMap::new(),
        }],
    };

    let payload = handlers::reshape_alert(&alert).unwrap();

    assert_eq!(payload["type"], json!("service.alert"));
    assert_eq!(payload["alert_name"], json!("HighErrorRate"));
    assert_eq!(payload["service"], json!("auth"));
    assert_eq!(payload["instance"], json!("unknown"));
    assert_eq!(payload["severity"], json!("unknown"));
    assert!(payload["timestamp"].is_string());
}

/// Test: an alert event with no alerts produces no payload
#[test]
fn test_alert_reshape_empty_list() {
    assert!(handlers::reshape_alert(&AlertEvent::default()).is_none());
}
