use std::sync::Arc;

use anyhow::{Error, Result};
use futures_util::StreamExt;
use tracing::{error, info};

use crate::{
    clients::rbmq::RabbitMqClient,
    dispatcher::{Dispatch, Dispatcher},
    models::event::AuthEvent,
    publisher::{BrokerSink, Publisher},
};

/// One full message pass: dispatch, then publish whatever the handler
/// produced. Dispatch failures propagate; publish failures are contained
/// inside the publisher.
pub async fn process_event<S: BrokerSink>(
    dispatcher: &Dispatcher,
    publisher: &Publisher<S>,
    routing_key: &str,
    event: &AuthEvent,
) -> Result<(), Error> {
    match dispatcher.dispatch(routing_key, event)? {
        Dispatch::Handled(requests) => publisher.publish_all(&requests).await,
        Dispatch::Unrouted => {}
    }

    Ok(())
}

/// Consumes the input queue until the stream ends. Each delivery is
/// processed in its own task; effective concurrency is bounded by the
/// channel prefetch count. A failed message is rejected without requeue
/// so the broker's dead-letter policy decides what happens next.
pub async fn run_worker<S>(
    rabbitmq: Arc<RabbitMqClient>,
    dispatcher: Arc<Dispatcher>,
    publisher: Arc<Publisher<S>>,
) -> Result<(), Error>
where
    S: BrokerSink + 'static,
{
    let mut consumer = rabbitmq.create_consumer().await?;

    info!("Worker started, waiting for auth events");

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                error!(error = %e, "Consumer stream error");
                continue;
            }
        };

        let rabbitmq = Arc::clone(&rabbitmq);
        let dispatcher = Arc::clone(&dispatcher);
        let publisher = Arc::clone(&publisher);

        tokio::spawn(async move {
            let routing_key = delivery.routing_key.as_str().to_string();
            let delivery_tag = delivery.delivery_tag;

            let outcome = match serde_json::from_slice::<AuthEvent>(&delivery.data) {
                Ok(event) => {
                    process_event(&dispatcher, &publisher, &routing_key, &event).await
                }
                Err(e) => Err(Error::from(e)),
            };

            match outcome {
                Ok(()) => {
                    if let Err(e) = rabbitmq.acknowledge(delivery_tag).await {
                        error!(routing_key, error = %e, "Failed to acknowledge message");
                    }
                }
                Err(e) => {
                    error!(
                        routing_key,
                        error = %e,
                        "Event processing failed, rejecting for dead-letter"
                    );

                    if let Err(reject_err) = rabbitmq.reject(delivery_tag, false).await {
                        error!(routing_key, error = %reject_err, "Failed to reject message");
                    }
                }
            }
        });
    }

    Ok(())
}
