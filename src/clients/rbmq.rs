use anyhow::{Error, Result, anyhow};
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
        BasicRejectOptions, ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
    },
    types::FieldTable,
};
use tracing::info;

use crate::{config::Config, publisher::BrokerSink};

pub struct RabbitMqClient {
    channel: Channel,
    exchange_name: String,
    input_queue_name: String,
}

impl RabbitMqClient {
    /// Connects and provisions the topic exchange, the durable input
    /// queue, and its two bindings (user events, password events).
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        info!("Connecting to RabbitMQ...");

        let connection = Connection::connect(&config.rabbitmq_url, ConnectionProperties::default())
            .await
            .map_err(|_| anyhow!("Failed to connect to RabbitMQ"))?;

        info!("RabbitMQ connection established");

        let channel = connection
            .create_channel()
            .await
            .map_err(|_| anyhow!("RabbitMQ channel creation failed"))?;

        channel
            .basic_qos(config.prefetch_count, BasicQosOptions::default())
            .await
            .map_err(|_| anyhow!("Failed to set up QoS"))?;

        channel
            .exchange_declare(
                &config.exchange_name,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|_| anyhow!("Failed to declare exchange"))?;

        channel
            .queue_declare(
                &config.input_queue_name,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|_| anyhow!("Failed to declare input queue"))?;

        for binding_key in [&config.user_binding_key, &config.password_binding_key] {
            channel
                .queue_bind(
                    &config.input_queue_name,
                    &config.exchange_name,
                    binding_key,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await
                .map_err(|_| anyhow!("Failed to bind input queue ({})", binding_key))?;
        }

        info!(
            exchange = %config.exchange_name,
            queue = %config.input_queue_name,
            "Exchange, queue and bindings declared"
        );

        Ok(Self {
            channel,
            exchange_name: config.exchange_name.clone(),
            input_queue_name: config.input_queue_name.clone(),
        })
    }

    pub async fn create_consumer(&self) -> Result<Consumer, Error> {
        let consumer = self
            .channel
            .basic_consume(
                &self.input_queue_name,
                "orchestrator_worker",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|_| anyhow!("Failed to create consumer"))?;

        info!(queue = %self.input_queue_name, "Consumer created for queue");

        Ok(consumer)
    }

    pub async fn acknowledge(&self, delivery_tag: u64) -> Result<(), Error> {
        self.channel
            .basic_ack(delivery_tag, BasicAckOptions::default())
            .await
            .map_err(|_| anyhow!("Failed to acknowledge message"))?;

        Ok(())
    }

    pub async fn reject(&self, delivery_tag: u64, requeue: bool) -> Result<(), Error> {
        self.channel
            .basic_reject(delivery_tag, BasicRejectOptions { requeue })
            .await
            .map_err(|_| anyhow!("Failed to reject message"))?;

        Ok(())
    }

    /// Outbound sink for the publisher, sharing this client's channel.
    pub fn sink(&self) -> AmqpSink {
        AmqpSink {
            channel: self.channel.clone(),
            exchange_name: self.exchange_name.clone(),
        }
    }
}

pub struct AmqpSink {
    channel: Channel,
    exchange_name: String,
}

impl BrokerSink for AmqpSink {
    async fn send(&self, routing_key: &str, payload: Vec<u8>) -> Result<(), Error> {
        self.channel
            .basic_publish(
                &self.exchange_name,
                routing_key,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|_| anyhow!("Failed to publish message to exchange"))?;

        Ok(())
    }
}
