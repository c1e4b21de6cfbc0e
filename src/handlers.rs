use std::collections::HashMap;

use anyhow::{Error, Result};
use chrono::{Local, NaiveDateTime};
use serde_json::{Value as JsonValue, json};
use tracing::{info, warn};

use crate::models::{alert::AlertEvent, event::AuthEvent, notification::NotificationRequest};

/// Base URL for links embedded in email templates. Identifiers are
/// concatenated verbatim, without URL-encoding.
const LINK_BASE_URL: &str = "http://localhost:3500";

const SMS_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Handle a `user.created` event: account confirmation email, plus a
/// welcome SMS when the user has a phone number on file.
pub fn user_created(event: &AuthEvent) -> Result<Vec<NotificationRequest>, Error> {
    let username = event.username();
    let email = event.email();

    info!(
        username,
        email,
        phone = event.phone().unwrap_or_default(),
        "User registered"
    );

    let mut requests = Vec::new();

    let email_data = HashMap::from([
        ("username".to_string(), json!(username)),
        (
            "confirmationUrl".to_string(),
            json!(format!("{}/confirm/{}", LINK_BASE_URL, event.user_id())),
        ),
    ]);

    requests.push(NotificationRequest::email(
        "account.confirmation",
        email,
        "welcome",
        email_data,
    ));

    if event.has_phone() {
        let message = format!(
            "Welcome {}! Your account was created successfully. Thanks for signing up!",
            username
        );

        requests.push(NotificationRequest::sms(
            "account.created",
            event.phone().unwrap_or_default(),
            &message,
        ));
    } else {
        warn!(username, "User has no phone number configured for welcome SMS");
    }

    Ok(requests)
}

/// Handle a `user.login` event: security-alert email, plus an SMS alert
/// when a phone number is present. Missing IP and timestamp fall back to
/// defaults rather than failing.
pub fn user_login(event: &AuthEvent) -> Result<Vec<NotificationRequest>, Error> {
    let username = event.username();
    let ip = event.ip().unwrap_or("unknown IP");
    let timestamp = event
        .timestamp()
        .map(str::to_string)
        .unwrap_or_else(current_timestamp);

    info!(username, ip, "User login");

    let mut requests = Vec::new();

    let email_data = HashMap::from([
        ("username".to_string(), json!(username)),
        ("ip".to_string(), json!(ip)),
        ("timestamp".to_string(), json!(timestamp)),
    ]);

    requests.push(NotificationRequest::email(
        "security.login",
        event.email(),
        "security-alert",
        email_data,
    ));

    if event.has_phone() {
        let message = format!(
            "Alert: new access to your account from {} on {}",
            ip,
            format_sms_timestamp(&timestamp)
        );

        requests.push(NotificationRequest::sms(
            "security.login",
            event.phone().unwrap_or_default(),
            &message,
        ));
    } else {
        warn!(username, "User has no phone number configured for SMS alert");
    }

    Ok(requests)
}

/// Handle a `password.reset.requested` event: recovery-link email only,
/// never an SMS.
pub fn password_reset_requested(event: &AuthEvent) -> Result<Vec<NotificationRequest>, Error> {
    let email = event.email();

    info!(email, "Password reset requested");

    let email_data = HashMap::from([(
        "resetUrl".to_string(),
        json!(format!("{}/reset-password/{}", LINK_BASE_URL, event.token())),
    )]);

    Ok(vec![NotificationRequest::email(
        "password.reset",
        email,
        "password-reset",
        email_data,
    )])
}

/// Handle a `password.updated` event: security notification email, plus
/// an SMS when a phone number is present.
pub fn password_updated(event: &AuthEvent) -> Result<Vec<NotificationRequest>, Error> {
    let username = event.username();
    let timestamp = event
        .timestamp()
        .map(str::to_string)
        .unwrap_or_else(current_timestamp);

    info!(username, "Password updated");

    let mut requests = Vec::new();

    let email_data = HashMap::from([
        ("username".to_string(), json!(username)),
        ("timestamp".to_string(), json!(timestamp)),
    ]);

    requests.push(NotificationRequest::email(
        "security.password_change",
        event.email(),
        "password-changed",
        email_data,
    ));

    if event.has_phone() {
        let message = format!(
            "Your password was changed successfully on {}",
            format_sms_timestamp(&timestamp)
        );

        requests.push(NotificationRequest::sms(
            "security.password_change",
            event.phone().unwrap_or_default(),
            &message,
        ));
    } else {
        warn!(username, "User has no phone number for SMS notification");
    }

    Ok(requests)
}

/// Reshape an alert-webhook payload into the flat `service.alert` body.
/// Returns `None` when the payload carries no alerts.
pub fn reshape_alert(event: &AlertEvent) -> Option<JsonValue> {
    let Some(alert) = event.alerts.first() else {
        warn!("Alert received but contains no alerts");
        return None;
    };

    let alert_name = alert.label("alertname");
    let service = alert.label("service");
    let instance = alert.label("instance");
    let severity = alert.label("severity");

    warn!(service, alert_name, severity, "Service alert received");

    Some(json!({
        "type": "service.alert",
        "service": service,
        "alert_name": alert_name,
        "instance": instance,
        "severity": severity,
        "timestamp": current_timestamp(),
    }))
}

/// Render a raw event timestamp as `dd/mm/yyyy hh:mm` for SMS text.
///
/// ISO-like values (containing `T`) have a trailing `Z` stripped and are
/// parsed as a local date-time; anything else is tried as
/// `YYYY-MM-DD HH:MM:SS`. Any parse failure falls back to the current time.
pub fn format_sms_timestamp(raw: &str) -> String {
    let parsed = if raw.contains('T') {
        raw.strip_suffix('Z').unwrap_or(raw).parse::<NaiveDateTime>()
    } else {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
    };

    match parsed {
        Ok(datetime) => datetime.format(SMS_TIME_FORMAT).to_string(),
        Err(e) => {
            warn!(timestamp = raw, error = %e, "Could not parse timestamp, using current time");
            Local::now().format(SMS_TIME_FORMAT).to_string()
        }
    }
}

/// ISO-like local timestamp used when an event carries none of its own.
fn current_timestamp() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string()
}
