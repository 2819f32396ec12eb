use crate::api::{ApiError, DeleteResponse, MessageApi};
use crate::snowflake::{MessageId, Snowflake};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info, warn};

/// Self-imposed waiting between requests.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("Error deleting message ({message_id}) in channel ({channel_id}): [Code {status}]\n\nHTTP Response: [{body}]")]
    Rejected {
        message_id: MessageId,
        channel_id: Snowflake,
        status: u16,
        body: String,
    },
    #[error("Error deleting message ({message_id}) in channel ({channel_id}): still failing after waiting out the rate limit\n\nHTTP Response: [{body}]")]
    RetryFailed {
        message_id: MessageId,
        channel_id: Snowflake,
        body: String,
    },
    #[error("Error deleting message ({message_id}): {source}")]
    Api {
        message_id: MessageId,
        #[source]
        source: ApiError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteReport {
    pub requested: usize,
    pub deleted: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteEvent {
    Deleting { position: usize, total: usize, message_id: MessageId },
    RateLimited { message_id: MessageId, wait: Duration },
    Deleted { message_id: MessageId, pause: Duration },
}

/// Deletes messages of one channel, one at a time.
pub struct Deleter<'a, A: ?Sized, P: ?Sized> {
    api: &'a A,
    pacer: &'a P,
    channel_id: Snowflake,
    delay: Duration,
    rate_limit_buffer: Duration,
}

impl<'a, A, P> Deleter<'a, A, P>
where
    A: MessageApi + ?Sized,
    P: Pacer + ?Sized,
{
    pub fn new(
        api: &'a A,
        pacer: &'a P,
        channel_id: Snowflake,
        delay: Duration,
        rate_limit_buffer: Duration,
    ) -> Self {
        Self {
            api,
            pacer,
            channel_id,
            delay,
            rate_limit_buffer,
        }
    }

    /// Delete one message, waiting out at most one rate limit.
    pub async fn delete_one(
        &self,
        message_id: MessageId,
        on_event: &mut dyn FnMut(DeleteEvent),
    ) -> Result<(), DeleteError> {
        match self.request(message_id).await? {
            DeleteResponse::Deleted => Ok(()),
            DeleteResponse::Rejected { status, body } => Err(DeleteError::Rejected {
                message_id,
                channel_id: self.channel_id,
                status,
                body,
            }),
            DeleteResponse::RateLimited { retry_after, .. } => {
                let wait = retry_after + self.rate_limit_buffer;
                warn!("Delete: rate limit hit, retrying message {} in {:?}", message_id, wait);
                on_event(DeleteEvent::RateLimited { message_id, wait });
                self.pacer.pause(wait).await;

                match self.request(message_id).await? {
                    DeleteResponse::Deleted => Ok(()),
                    DeleteResponse::RateLimited { body, .. }
                    | DeleteResponse::Rejected { body, .. } => Err(DeleteError::RetryFailed {
                        message_id,
                        channel_id: self.channel_id,
                        body,
                    }),
                }
            }
        }
    }

    /// Delete every message in order, pausing after each one.
    ///
    /// Stops at the first failure and returns what was done so far alongside it.
    pub async fn delete_all(
        &self,
        message_ids: &[MessageId],
        on_event: &mut dyn FnMut(DeleteEvent),
    ) -> (DeleteReport, Option<DeleteError>) {
        let mut report = DeleteReport {
            requested: message_ids.len(),
            deleted: 0,
        };

        for (index, &message_id) in message_ids.iter().enumerate() {
            on_event(DeleteEvent::Deleting {
                position: index + 1,
                total: message_ids.len(),
                message_id,
            });

            if let Err(e) = self.delete_one(message_id, on_event).await {
                error!("Delete: halting after {} of {}: {}", report.deleted, report.requested, e);
                return (report, Some(e));
            }
            report.deleted += 1;

            on_event(DeleteEvent::Deleted {
                message_id,
                pause: self.delay,
            });
            self.pacer.pause(self.delay).await;
        }

        info!("Delete: removed {} messages from channel {}", report.deleted, self.channel_id);
        (report, None)
    }

    async fn request(&self, message_id: MessageId) -> Result<DeleteResponse, DeleteError> {
        self.api
            .delete(self.channel_id, message_id)
            .await
            .map_err(|source| DeleteError::Api { message_id, source })
    }
}
