use serde::{Deserialize, Serialize};

/// Inbound identity-lifecycle event as produced by the auth service.
///
/// The wire format is schema-flexible: every field is optional and unknown
/// fields are ignored, so upstream producers can evolve their payloads
/// without breaking this consumer. Dispatch is driven by the AMQP routing
/// key, not by `event_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthEvent {
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,

    #[serde(default)]
    pub data: EventData,

    #[serde(default)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMeta {
    #[serde(default)]
    pub ip: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

impl AuthEvent {
    pub fn user_id(&self) -> &str {
        self.data.id.as_deref().unwrap_or_default()
    }

    pub fn username(&self) -> &str {
        self.data.username.as_deref().unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        self.data.email.as_deref().unwrap_or_default()
    }

    pub fn token(&self) -> &str {
        self.data.token.as_deref().unwrap_or_default()
    }

    /// Presence matters for the SMS branch, so the raw option is exposed.
    pub fn phone(&self) -> Option<&str> {
        self.data.phone.as_deref()
    }

    pub fn ip(&self) -> Option<&str> {
        self.meta.ip.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.meta.timestamp.as_deref()
    }

    /// True when a phone number is present and non-blank after trimming.
    /// An explicitly empty string and an absent field are equivalent.
    pub fn has_phone(&self) -> bool {
        self.phone().is_some_and(|p| !p.trim().is_empty())
    }
}
