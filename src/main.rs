use std::sync::Arc;

use anyhow::{Error, Result};
use notification_orchestrator::{
    api::run_api_server,
    clients::{health::init_start_time, rbmq::RabbitMqClient},
    config::Config,
    dispatcher::Dispatcher,
    publisher::Publisher,
    worker::run_worker,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    init_start_time();

    let config = Config::load()?;

    // Fails fast on a broken routing table before touching the broker.
    let dispatcher = Arc::new(Dispatcher::new()?);

    let rabbitmq = Arc::new(RabbitMqClient::connect(&config).await?);
    let publisher = Arc::new(Publisher::new(rabbitmq.sink(), &config));

    info!("Notification orchestrator starting");

    tokio::select! {
        result = run_worker(Arc::clone(&rabbitmq), Arc::clone(&dispatcher), Arc::clone(&publisher)) => result,
        result = run_api_server(config, dispatcher, publisher) => result,
    }
}
