use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use tracing::{debug, error, warn};

use crate::{
    handlers,
    models::{event::AuthEvent, notification::NotificationRequest},
};

/// Per-event-type transformation function. Missing optional fields never
/// error; only fatal conditions may propagate.
pub type Handler = fn(&AuthEvent) -> Result<Vec<NotificationRequest>, Error>;

const DEFAULT_ROUTES: [(&str, Handler); 4] = [
    ("user.created", handlers::user_created),
    ("user.login", handlers::user_login),
    ("password.reset.requested", handlers::password_reset_requested),
    ("password.updated", handlers::password_updated),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Handled(Vec<NotificationRequest>),
    Unrouted,
}

/// Maps an inbound routing key to its handler. The table is fixed at
/// startup and read-only afterwards.
pub struct Dispatcher {
    routes: HashMap<&'static str, Handler>,
}

impl Dispatcher {
    pub fn new() -> Result<Self, Error> {
        Self::from_routes(&DEFAULT_ROUTES)
    }

    /// Builds the routing table, failing fast on an empty or
    /// duplicate-key definition.
    pub fn from_routes(routes: &[(&'static str, Handler)]) -> Result<Self, Error> {
        if routes.is_empty() {
            return Err(anyhow!("Routing table is empty"));
        }

        let mut table = HashMap::with_capacity(routes.len());

        for (key, handler) in routes {
            if table.insert(*key, *handler).is_some() {
                return Err(anyhow!("Duplicate routing key in table: {}", key));
            }
        }

        Ok(Self { routes: table })
    }

    /// Selects the handler for `routing_key` and runs it. An unknown key
    /// is not an error: it is logged and dropped. A handler failure is
    /// re-raised unchanged so the transport layer can apply its
    /// redelivery or dead-letter policy.
    pub fn dispatch(&self, routing_key: &str, event: &AuthEvent) -> Result<Dispatch, Error> {
        let Some(handler) = self.routes.get(routing_key) else {
            warn!(routing_key, "Unhandled event");
            return Ok(Dispatch::Unrouted);
        };

        debug!(routing_key, event_type = event.event_type.as_deref(), "Dispatching event");

        match handler(event) {
            Ok(requests) => Ok(Dispatch::Handled(requests)),
            Err(e) => {
                error!(routing_key, error = %e, "Error processing event");
                Err(e)
            }
        }
    }
}
