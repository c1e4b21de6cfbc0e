use std::{collections::HashMap, sync::OnceLock};

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    clients::rbmq::RabbitMqClient,
    config::Config,
    models::health::{CheckStatus, HealthCheck, HealthReport},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

static START_TIME: OnceLock<DateTime<Utc>> = OnceLock::new();

/// Records the process start time. Called once from `main`; read-only
/// afterwards.
pub fn init_start_time() {
    let _ = START_TIME.set(Utc::now());
}

fn start_time() -> DateTime<Utc> {
    *START_TIME.get_or_init(Utc::now)
}

pub struct HealthChecker {
    config: Config,
}

impl HealthChecker {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn check_all(&self) -> HealthReport {
        let broker_up = self.check_rabbitmq().await;
        let ready = broker_up;

        let checks = vec![
            HealthCheck {
                name: "Readiness check".to_string(),
                status: up_or_down(ready),
                data: json!({
                    "from": start_time().to_rfc3339(),
                    "status": if ready { "READY" } else { "NOT_READY" },
                    "version": VERSION,
                    "uptime": uptime(),
                }),
            },
            HealthCheck {
                name: "Liveness check".to_string(),
                status: CheckStatus::Up,
                data: json!({
                    "from": start_time().to_rfc3339(),
                    "status": "ALIVE",
                    "version": VERSION,
                    "uptime": uptime(),
                }),
            },
            HealthCheck {
                name: "RabbitMQ check".to_string(),
                status: up_or_down(broker_up),
                data: json!({
                    "status": if broker_up { "connected" } else { "disconnected" },
                }),
            },
        ];

        HealthReport::from_checks(checks)
    }

    /// Readiness is tied to broker reachability: without it the worker
    /// cannot consume or publish.
    pub async fn check_ready(&self) -> HealthReport {
        let broker_up = self.check_rabbitmq().await;

        HealthReport::from_checks(vec![HealthCheck {
            name: "Readiness check".to_string(),
            status: up_or_down(broker_up),
            data: json!({
                "from": start_time().to_rfc3339(),
                "status": if broker_up { "READY" } else { "NOT_READY" },
                "version": VERSION,
                "uptime": uptime(),
                "rabbitmq": if broker_up { "connected" } else { "disconnected" },
            }),
        }])
    }

    pub async fn check_live(&self) -> HealthReport {
        HealthReport::from_checks(vec![HealthCheck {
            name: "Liveness check".to_string(),
            status: CheckStatus::Up,
            data: json!({
                "from": start_time().to_rfc3339(),
                "status": "ALIVE",
                "version": VERSION,
                "uptime": uptime(),
                "memory": memory_info(),
            }),
        }])
    }

    async fn check_rabbitmq(&self) -> bool {
        match RabbitMqClient::connect(&self.config).await {
            Ok(_) => {
                debug!("RabbitMQ health check passed");
                true
            }
            Err(e) => {
                warn!(error = %e, "RabbitMQ connection failed");
                false
            }
        }
    }
}

fn up_or_down(up: bool) -> CheckStatus {
    if up { CheckStatus::Up } else { CheckStatus::Down }
}

fn uptime() -> String {
    let elapsed = Utc::now() - start_time();
    let days = elapsed.num_days();
    let hours = elapsed.num_hours() % 24;
    let minutes = elapsed.num_minutes() % 60;
    let seconds = elapsed.num_seconds() % 60;

    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}

/// Best-effort memory snapshot from /proc; empty on platforms without it.
fn memory_info() -> HashMap<String, String> {
    let mut info = HashMap::new();

    if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
        for line in status.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };

            let mapped = match key {
                "VmSize" => "total",
                "VmRSS" => "used",
                "VmPeak" => "peak",
                _ => continue,
            };

            info.insert(mapped.to_string(), value.trim().to_string());
        }
    }

    info
}
