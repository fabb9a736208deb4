//! SQS consumer for upload notifications
//!
//! Long-polls the scan queue for S3 event messages and drives the
//! orchestrator. Messages are deleted after the batch runs; a malformed
//! message body is logged and deleted too, so a poison message cannot wedge
//! the queue. Redelivery of in-flight messages stays the queue's concern.

use std::sync::Arc;
use std::time::Duration;

use quillpress_scan::{parse_s3_event, ScanOrchestrator};
use tokio::time::sleep;

const MAX_MESSAGES_PER_POLL: i32 = 10;
const LONG_POLL_WAIT_SECS: i32 = 20;
const RECEIVE_ERROR_BACKOFF_SECS: u64 = 5;

pub struct SqsConsumer {
    client: aws_sdk_sqs::Client,
    queue_url: String,
    orchestrator: Arc<ScanOrchestrator>,
}

impl SqsConsumer {
    pub fn new(
        client: aws_sdk_sqs::Client,
        queue_url: String,
        orchestrator: Arc<ScanOrchestrator>,
    ) -> Self {
        Self {
            client,
            queue_url,
            orchestrator,
        }
    }

    /// Consume until a shutdown signal arrives.
    pub async fn run(&self) {
        tracing::info!(queue = %self.queue_url, "Scan worker consuming upload notifications");

        loop {
            tokio::select! {
                _ = shutdown_signal() => {
                    tracing::info!("Shutdown signal received, stopping consumer");
                    break;
                }
                result = self.poll_once() => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Failed to receive messages");
                        sleep(Duration::from_secs(RECEIVE_ERROR_BACKOFF_SECS)).await;
                    }
                }
            }
        }
    }

    async fn poll_once(&self) -> Result<(), anyhow::Error> {
        let response = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(MAX_MESSAGES_PER_POLL)
            .wait_time_seconds(LONG_POLL_WAIT_SECS)
            .send()
            .await?;

        for message in response.messages() {
            if let Some(body) = message.body() {
                match parse_s3_event(body) {
                    Ok(notifications) => {
                        self.orchestrator.process_batch(&notifications).await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Discarding malformed notification message");
                    }
                }
            }

            if let Some(receipt_handle) = message.receipt_handle() {
                if let Err(e) = self
                    .client
                    .delete_message()
                    .queue_url(&self.queue_url)
                    .receipt_handle(receipt_handle)
                    .send()
                    .await
                {
                    tracing::warn!(error = %e, "Failed to delete message, it will be redelivered");
                }
            }
        }

        Ok(())
    }
}

/// Signal handler for graceful shutdown
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM signals.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
