use std::future::Future;

use anyhow::{Error, Result};
use serde_json::Value as JsonValue;
use tracing::{error, info};

use crate::{
    config::Config,
    models::notification::{Channel, NotificationRequest},
};

/// Routing key for reshaped service alerts.
const ALERT_ROUTING_KEY: &str = "service.alert";

/// Outbound transport seam. The production implementation publishes to
/// the AMQP exchange; tests substitute an in-memory sink.
pub trait BrokerSink: Send + Sync {
    fn send(
        &self,
        routing_key: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Fire-and-forget publisher. Failures are logged and swallowed: a broker
/// hiccup on one channel must never abort the sibling notification for
/// the same event, nor fail the dispatch that produced it.
pub struct Publisher<S: BrokerSink> {
    sink: S,
    send_email_routing_key: String,
    send_sms_routing_key: String,
}

impl<S: BrokerSink> Publisher<S> {
    pub fn new(sink: S, config: &Config) -> Self {
        Self {
            sink,
            send_email_routing_key: config.send_email_routing_key.clone(),
            send_sms_routing_key: config.send_sms_routing_key.clone(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn publish(&self, request: &NotificationRequest) {
        let routing_key = match request.channel() {
            Channel::Email => self.send_email_routing_key.as_str(),
            Channel::Sms => self.send_sms_routing_key.as_str(),
        };

        match serde_json::to_vec(request) {
            Ok(payload) => match self.sink.send(routing_key, payload).await {
                Ok(()) => {
                    info!(
                        routing_key,
                        notification_type = %request.notification_type,
                        recipient = %request.recipient,
                        "Notification published"
                    );
                }
                Err(e) => {
                    error!(routing_key, error = %e, "Error publishing notification");
                }
            },
            Err(e) => {
                error!(routing_key, error = %e, "Error serializing notification");
            }
        }
    }

    /// Attempts each request in order; one failure does not stop the rest.
    pub async fn publish_all(&self, requests: &[NotificationRequest]) {
        for request in requests {
            self.publish(request).await;
        }
    }

    pub async fn publish_alert(&self, payload: &JsonValue) {
        match serde_json::to_vec(payload) {
            Ok(body) => match self.sink.send(ALERT_ROUTING_KEY, body).await {
                Ok(()) => {
                    info!(routing_key = ALERT_ROUTING_KEY, "Service alert published");
                }
                Err(e) => {
                    error!(routing_key = ALERT_ROUTING_KEY, error = %e, "Error publishing service alert");
                }
            },
            Err(e) => {
                error!(routing_key = ALERT_ROUTING_KEY, error = %e, "Error serializing service alert");
            }
        }
    }
}
