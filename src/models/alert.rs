use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Alertmanager-style webhook payload. Only the first alert's labels are
/// used downstream; everything else is carried for logging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertEvent {
    #[serde(default)]
    pub receiver: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub alerts: Vec<AlertItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertItem {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub labels: HashMap<String, String>,

    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

impl AlertItem {
    /// Label lookup with the conventional `"unknown"` default.
    pub fn label(&self, name: &str) -> &str {
        self.labels.get(name).map(String::as_str).unwrap_or("unknown")
    }
}
