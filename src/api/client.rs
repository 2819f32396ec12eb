use crate::api::models::{RateLimitBody, SearchResponse};
use crate::api::{
    channel_search_endpoint, delete_message_endpoint, guild_search_endpoint, ApiError,
    DeleteResponse, MessageApi, SearchPage,
};
use crate::config::Config;
use crate::credentials::Credentials;
use crate::search::{SearchQuery, SearchScope};
use crate::snowflake::{MessageId, Snowflake};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Authenticated client for the search and delete endpoints.
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
}

impl DiscordClient {
    pub fn new(config: &Config, credentials: &Credentials) -> Result<Self, ApiError> {
        let headers = build_headers(config, credentials)?;
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
        })
    }
}

#[async_trait]
impl MessageApi for DiscordClient {
    async fn search(&self, query: &SearchQuery, offset: u64) -> Result<SearchPage, ApiError> {
        let url = match query.scope {
            SearchScope::DirectMessage => channel_search_endpoint(&self.api_base, query.channel_id),
            SearchScope::Guild(guild_id) => guild_search_endpoint(&self.api_base, guild_id),
        };
        let params = search_params(query, offset);
        debug!("Search: GET {} offset={}", url, offset);

        let response = self.http.get(&url).query(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.into())
    }

    async fn delete(
        &self,
        channel_id: Snowflake,
        message_id: MessageId,
    ) -> Result<DeleteResponse, ApiError> {
        let url = delete_message_endpoint(&self.api_base, channel_id, message_id);
        debug!("Delete: DELETE {}", url);

        let response = self.http.delete(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(DeleteResponse::Deleted);
        }

        let header_retry = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
        let body = response.text().await?;

        let retry_after = serde_json::from_str::<RateLimitBody>(&body)
            .ok()
            .and_then(|limit| limit.retry_after())
            .or(header_retry);

        match retry_after {
            Some(retry_after) => {
                warn!(
                    "Delete: rate limited on message {} (retry after {:?})",
                    message_id, retry_after
                );
                Ok(DeleteResponse::RateLimited { retry_after, body })
            }
            None => Ok(DeleteResponse::Rejected {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

fn search_params(query: &SearchQuery, offset: u64) -> Vec<(&'static str, String)> {
    let mut params = vec![("author_id", query.author_id.to_string())];
    if let SearchScope::Guild(_) = query.scope {
        params.push(("channel_id", query.channel_id.to_string()));
    }
    params.push(("offset", offset.to_string()));
    params.push(("include_nsfw", "true".to_string()));
    if let Some(start) = query.start_bound {
        params.push(("max_id", start.successor().to_string()));
    }
    if let Some(stop) = query.stop_bound.and_then(Snowflake::predecessor) {
        params.push(("min_id", stop.to_string()));
    }
    params
}

fn build_headers(config: &Config, credentials: &Credentials) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|_| ApiError::InvalidHeader("User-Agent"))?,
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(HeaderName::from_static("sec-gpc"), HeaderValue::from_static("1"));
    headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("empty"));
    headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("cors"));
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );

    if let Some((origin, host)) = origin_of(&config.api_base) {
        if let Ok(value) = HeaderValue::from_str(&origin) {
            headers.insert(header::ORIGIN, value);
        }
        if let Ok(value) = HeaderValue::from_str(&host) {
            headers.insert(HeaderName::from_static("alt-used"), value);
        }
    }

    let mut cookie = HeaderValue::from_bytes(&latin1_bytes(&credentials.cookie))
        .map_err(|_| ApiError::InvalidHeader("Cookie"))?;
    cookie.set_sensitive(true);
    headers.insert(header::COOKIE, cookie);

    let mut authorization = HeaderValue::from_str(&credentials.authorization)
        .map_err(|_| ApiError::InvalidHeader("Authorization"))?;
    authorization.set_sensitive(true);
    headers.insert(header::AUTHORIZATION, authorization);

    Ok(headers)
}

/// Split `scheme://host[:port]/path` into (`scheme://host[:port]`, `host[:port]`).
fn origin_of(base: &str) -> Option<(String, String)> {
    let (scheme, rest) = base.split_once("://")?;
    let host = rest.split('/').next().filter(|host| !host.is_empty())?;
    Some((format!("{}://{}", scheme, host), host.to_string()))
}

/// Browsers send cookies as Latin-1; anything outside it is dropped.
fn latin1_bytes(value: &str) -> Vec<u8> {
    value
        .trim()
        .chars()
        .filter_map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}
