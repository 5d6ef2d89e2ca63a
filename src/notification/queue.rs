use std::time::Duration;

use futures_util::stream::StreamExt;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, options::*, types::FieldTable,
};
use tokio_executor_trait::Tokio as TokioExec;
use tokio_reactor_trait::Tokio as TokioReactor;

use super::mailer::SmtpMailer;
use super::models::EmailJob;

const EMAIL_QUEUE: &str = "notification_emails";
const CONSUMER_TAG: &str = "email_worker";
const MAX_SEND_ATTEMPTS: u32 = 3;

/// Handle to the declared e-mail queue. Cheap to clone.
#[derive(Clone)]
pub struct EmailQueue {
    channel: Channel,
}

impl EmailQueue {
    pub async fn connect(url: &str) -> Result<Self, String> {
        let conn = Connection::connect(
            url,
            ConnectionProperties::default()
                .with_executor(TokioExec::current())
                .with_reactor(TokioReactor),
        )
        .await
        .map_err(|e| format!("Failed to connect to RabbitMQ: {}", e))?;

        let channel = conn
            .create_channel()
            .await
            .map_err(|e| format!("Failed to create a channel: {}", e))?;

        channel
            .queue_declare(
                EMAIL_QUEUE,
                QueueDeclareOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| format!("Failed to declare the queue: {}", e))?;

        Ok(EmailQueue { channel })
    }

    pub async fn publish(&self, job: &EmailJob) -> Result<(), String> {
        let payload =
            serde_json::to_vec(job).map_err(|e| format!("Failed to serialize a job: {}", e))?;

        self.channel
            .basic_publish(
                "",
                EMAIL_QUEUE,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default(),
            )
            .await
            .map_err(|e| format!("Failed to publish: {}", e))?
            .await
            .map_err(|e| format!("Publish was not confirmed: {}", e))?;

        Ok(())
    }

    /// Starts the background worker that drains the queue and sends mail.
    pub fn spawn_consumer(&self, mailer: SmtpMailer) {
        let channel = self.channel.clone();

        tokio::spawn(async move {
            if let Err(er) = consume(channel, mailer).await {
                tracing::error!("email consumer stopped: {er}");
            }
        });
    }
}

async fn consume(channel: Channel, mailer: SmtpMailer) -> Result<(), String> {
    let mut consumer = channel
        .basic_consume(
            EMAIL_QUEUE,
            CONSUMER_TAG,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(|e| format!("Failed to register the consumer: {}", e))?;

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(er) => {
                tracing::error!("bad delivery: {er}");
                continue;
            }
        };

        match serde_json::from_slice::<EmailJob>(&delivery.data) {
            Ok(job) => send_with_retry(&mailer, &job).await,
            Err(er) => tracing::error!("failed to parse an email job: {er}"),
        }

        if let Err(er) = delivery.ack(BasicAckOptions::default()).await {
            tracing::error!("failed to ack a delivery: {er}");
        }
    }

    Ok(())
}

async fn send_with_retry(mailer: &SmtpMailer, job: &EmailJob) {
    let mut backoff = Duration::from_secs(1);

    for attempt in 1..=MAX_SEND_ATTEMPTS {
        match mailer.send(job).await {
            Ok(()) => {
                tracing::debug!(recipient = %job.recipient_email, "email sent");
                return;
            }
            Err(er) if attempt < MAX_SEND_ATTEMPTS => {
                tracing::warn!("send attempt {attempt} failed, retrying: {er}");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(er) => {
                tracing::error!(
                    recipient = %job.recipient_email,
                    "giving up on email after {MAX_SEND_ATTEMPTS} attempts: {er}"
                );
            }
        }
    }
}
