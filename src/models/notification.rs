use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Outbound notification request consumed by the email and SMS sender
/// services. The payload enum keeps the two channel shapes mutually
/// exclusive: an email request carries a template code plus template data,
/// an SMS request carries a fully rendered message string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "type")]
    pub notification_type: String,

    pub recipient: String,

    #[serde(flatten)]
    pub payload: NotificationPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationPayload {
    Email {
        template: String,
        data: HashMap<String, JsonValue>,
    },
    Sms {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Sms,
}

impl NotificationRequest {
    pub fn email(
        notification_type: &str,
        recipient: &str,
        template: &str,
        data: HashMap<String, JsonValue>,
    ) -> Self {
        Self {
            notification_type: notification_type.to_string(),
            recipient: recipient.to_string(),
            payload: NotificationPayload::Email {
                template: template.to_string(),
                data,
            },
        }
    }

    pub fn sms(notification_type: &str, recipient: &str, message: &str) -> Self {
        Self {
            notification_type: notification_type.to_string(),
            recipient: recipient.to_string(),
            payload: NotificationPayload::Sms {
                message: message.to_string(),
            },
        }
    }

    pub fn channel(&self) -> Channel {
        match self.payload {
            NotificationPayload::Email { .. } => Channel::Email,
            NotificationPayload::Sms { .. } => Channel::Sms,
        }
    }
}
