use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub rabbitmq_url: String,
    pub exchange_name: String,
    pub input_queue_name: String,

    /// Topic patterns binding the input queue, e.g. `user.*` and `password.*`.
    pub user_binding_key: String,
    pub password_binding_key: String,

    /// Outbound routing keys consumed by the email and SMS sender services.
    pub send_email_routing_key: String,
    pub send_sms_routing_key: String,

    pub prefetch_count: u16,

    pub server_port: u16,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }
}
