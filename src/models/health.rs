use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: CheckStatus,
    pub checks: Vec<HealthCheck>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: CheckStatus,
    pub data: JsonValue,
}

impl HealthReport {
    /// Overall status is UP only when every individual check is UP.
    pub fn from_checks(checks: Vec<HealthCheck>) -> Self {
        let all_up = checks.iter().all(|c| c.status == CheckStatus::Up);

        Self {
            status: if all_up {
                CheckStatus::Up
            } else {
                CheckStatus::Down
            },
            checks,
        }
    }
}
