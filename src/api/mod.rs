use crate::search::SearchQuery;
use crate::snowflake::{MessageId, Snowflake};
use async_trait::async_trait;
use std::time::Duration;

pub mod client;
pub mod models;

pub use client::DiscordClient;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("[Code {status}]: {body}")]
    Http { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid {0} header value")]
    InvalidHeader(&'static str),
}

/// One hit from a search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: MessageId,
    pub author_id: Snowflake,
}

#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub total_results: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteResponse {
    Deleted,
    RateLimited { retry_after: Duration, body: String },
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait MessageApi: Send + Sync {
    /// Fetch the page of results starting at `offset`.
    async fn search(&self, query: &SearchQuery, offset: u64) -> Result<SearchPage, ApiError>;

    async fn delete(
        &self,
        channel_id: Snowflake,
        message_id: MessageId,
    ) -> Result<DeleteResponse, ApiError>;
}

pub fn guild_search_endpoint(base: &str, guild_id: Snowflake) -> String {
    format!("{}/guilds/{}/messages/search", base, guild_id)
}

pub fn channel_search_endpoint(base: &str, channel_id: Snowflake) -> String {
    format!("{}/channels/{}/messages/search", base, channel_id)
}

pub fn delete_message_endpoint(base: &str, channel_id: Snowflake, message_id: MessageId) -> String {
    format!("{}/channels/{}/messages/{}", base, channel_id, message_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(v: u64) -> Snowflake {
        Snowflake::new(v).unwrap()
    }

    #[test]
    fn test_endpoints() {
        let base = "https://discord.com/api/v9";
        assert_eq!(
            guild_search_endpoint(base, id(1)),
            "https://discord.com/api/v9/guilds/1/messages/search"
        );
        assert_eq!(
            channel_search_endpoint(base, id(2)),
            "https://discord.com/api/v9/channels/2/messages/search"
        );
        assert_eq!(
            delete_message_endpoint(base, id(2), id(3)),
            "https://discord.com/api/v9/channels/2/messages/3"
        );
    }

    #[test]
    fn test_http_error_display() {
        let err = ApiError::Http {
            status: 401,
            body: "{\"message\": \"401: Unauthorized\"}".to_string(),
        };
        assert_eq!(err.to_string(), "[Code 401]: {\"message\": \"401: Unauthorized\"}");
    }
}
