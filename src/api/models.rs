use crate::api::{SearchHit, SearchPage};
use crate::snowflake::Snowflake;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_results: i64,
    /// Each group holds a hit and, on older API versions, its surrounding context.
    #[serde(default)]
    pub messages: Vec<Vec<SearchMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchMessage {
    pub id: Snowflake,
    pub author: Author,
}

#[derive(Debug, Deserialize)]
pub struct Author {
    pub id: Snowflake,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitBody {
    pub retry_after: f64,
}

impl RateLimitBody {
    /// `None` when the server sent a negative or non-finite value.
    pub fn retry_after(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.retry_after).ok()
    }
}

impl From<SearchResponse> for SearchPage {
    fn from(response: SearchResponse) -> Self {
        let hits = response
            .messages
            .into_iter()
            .flatten()
            .map(|message| SearchHit {
                id: message.id,
                author_id: message.author.id,
            })
            .collect();

        SearchPage {
            hits,
            total_results: response.total_results.max(0) as u64,
        }
    }
}
