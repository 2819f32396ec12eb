use crate::api::{ApiError, MessageApi, SearchHit};
use crate::config::SEARCH_PAGE_SIZE;
use crate::snowflake::{MessageId, Snowflake};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    DirectMessage,
    Guild(Snowflake),
}

/// Which messages to look for. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub author_id: Snowflake,
    pub channel_id: Snowflake,
    pub scope: SearchScope,
    /// Newest message to collect. Newer ones are skipped.
    pub start_bound: Option<MessageId>,
    /// Oldest message to collect. Collection stops once it is reached.
    pub stop_bound: Option<MessageId>,
}

impl SearchQuery {
    pub fn is_direct_message(&self) -> bool {
        self.scope == SearchScope::DirectMessage
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        match self.scope {
            SearchScope::Guild(id) => Some(id),
            SearchScope::DirectMessage => None,
        }
    }
}

/// Message IDs gathered across pages, newest first.
#[derive(Debug, Default)]
pub struct ResultSet {
    ids: Vec<MessageId>,
    stop_reached: bool,
}

impl ResultSet {
    /// Take the hits of one page, honouring author and bounds.
    pub fn absorb(&mut self, query: &SearchQuery, hits: &[SearchHit]) {
        for hit in hits {
            if self.stop_reached {
                return;
            }
            if hit.author_id != query.author_id {
                continue;
            }
            if let Some(stop) = query.stop_bound {
                if hit.id == stop {
                    self.ids.push(hit.id);
                    self.stop_reached = true;
                    return;
                }
                if hit.id < stop {
                    self.stop_reached = true;
                    return;
                }
            }
            if query.start_bound.map_or(true, |start| hit.id <= start) {
                self.ids.push(hit.id);
            }
        }
    }

    pub fn stop_reached(&self) -> bool {
        self.stop_reached
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_ids(self) -> Vec<MessageId> {
        self.ids
    }
}

/// Walk every search page for `query` and return the matching message IDs.
pub async fn collect_message_ids<A: MessageApi + ?Sized>(
    api: &A,
    query: &SearchQuery,
) -> Result<Vec<MessageId>, ApiError> {
    let mut results = ResultSet::default();
    let mut offset = 0u64;

    loop {
        let page = api.search(query, offset).await?;
        if page.total_results == 0 {
            debug!("Search: no results at offset {}", offset);
            break;
        }

        results.absorb(query, &page.hits);
        debug!(
            "Search: offset {} gave {} hits ({}/{} collected)",
            offset,
            page.hits.len(),
            results.len(),
            page.total_results
        );

        if results.stop_reached() || page.hits.is_empty() {
            break;
        }
        offset += SEARCH_PAGE_SIZE;
        if offset >= page.total_results {
            break;
        }
    }

    info!(
        "Search: collected {} messages in channel {}",
        results.len(),
        query.channel_id
    );
    Ok(results.into_ids())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DeleteResponse, SearchPage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn id(v: u64) -> Snowflake {
        Snowflake::new(v).unwrap()
    }

    const AUTHOR: u64 = 7;

    /// Serves `total` messages authored by `AUTHOR`, newest first, with IDs `total..=1`.
    struct PagedApi {
        total: u64,
        /// How many of them the server actually hands out.
        available: u64,
        offsets: Mutex<Vec<u64>>,
    }

    impl PagedApi {
        fn new(total: u64) -> Self {
            Self::over_reporting(total, total)
        }

        fn over_reporting(total: u64, available: u64) -> Self {
            Self {
                total,
                available,
                offsets: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<u64> {
            self.offsets.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageApi for PagedApi {
        async fn search(&self, _query: &SearchQuery, offset: u64) -> Result<SearchPage, ApiError> {
            self.offsets.lock().unwrap().push(offset);
            let end = (offset + SEARCH_PAGE_SIZE).min(self.available);
            let hits = (offset.min(end)..end)
                .map(|i| SearchHit {
                    id: id(self.total - i),
                    author_id: id(AUTHOR),
                })
                .collect();
            Ok(SearchPage {
                hits,
                total_results: self.total,
            })
        }

        async fn delete(&self, _: Snowflake, _: MessageId) -> Result<DeleteResponse, ApiError> {
            unreachable!("search tests never delete")
        }
    }

    fn query() -> SearchQuery {
        SearchQuery {
            author_id: id(AUTHOR),
            channel_id: id(500),
            scope: SearchScope::DirectMessage,
            start_bound: None,
            stop_bound: None,
        }
    }

    #[tokio::test]
    async fn test_pages_until_total() {
        for (total, expected_requests) in [(1, 1), (25, 1), (26, 2), (60, 3), (75, 3)] {
            let api = PagedApi::new(total);
            let ids = collect_message_ids(&api, &query()).await.unwrap();

            assert_eq!(ids.len() as u64, total);
            assert_eq!(api.requests().len(), expected_requests, "total {}", total);
            assert_eq!(ids.first().map(|i| i.get()), Some(total));
        }
    }

    #[tokio::test]
    async fn test_offsets_are_multiples_of_page_size() {
        let api = PagedApi::new(60);
        collect_message_ids(&api, &query()).await.unwrap();
        assert_eq!(api.requests(), vec![0, 25, 50]);
    }

    #[tokio::test]
    async fn test_zero_total_is_empty() {
        let api = PagedApi::new(0);
        let ids = collect_message_ids(&api, &query()).await.unwrap();
        assert!(ids.is_empty());
        assert_eq!(api.requests(), vec![0]);
    }

    #[tokio::test]
    async fn test_stop_bound_halts_pagination() {
        // IDs 60..=1; 40 sits on the first page.
        let api = PagedApi::new(60);
        let query = SearchQuery {
            stop_bound: Some(id(40)),
            ..query()
        };
        let ids = collect_message_ids(&api, &query).await.unwrap();

        assert_eq!(ids.len(), 21);
        assert_eq!(ids.last(), Some(&id(40)));
        assert_eq!(api.requests(), vec![0]);
    }

    #[tokio::test]
    async fn test_stop_bound_on_later_page_with_start_bound() {
        // IDs 100..=1; 90 is on the first page, 60 on the second.
        let api = PagedApi::new(100);
        let query = SearchQuery {
            start_bound: Some(id(90)),
            stop_bound: Some(id(60)),
            ..query()
        };
        let ids = collect_message_ids(&api, &query).await.unwrap();

        assert_eq!(ids.len(), 31);
        assert_eq!(ids.first(), Some(&id(90)));
        assert_eq!(ids.last(), Some(&id(60)));
        assert_eq!(api.requests(), vec![0, 25]);
    }

    #[tokio::test]
    async fn test_empty_page_ends_pagination() {
        // Claims 100 results but only the first page has any.
        let api = PagedApi::over_reporting(100, 25);
        let ids = collect_message_ids(&api, &query()).await.unwrap();

        assert_eq!(api.requests(), vec![0, 25]);
        assert_eq!(ids.len(), 25);
        assert_eq!(ids.first(), Some(&id(100)));
        assert_eq!(ids.last(), Some(&id(76)));
    }

    #[tokio::test]
    async fn test_start_bound_skips_newer() {
        let api = PagedApi::new(30);
        let query = SearchQuery {
            start_bound: Some(id(10)),
            ..query()
        };
        let ids = collect_message_ids(&api, &query).await.unwrap();

        assert_eq!(ids.first(), Some(&id(10)));
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_absorb_skips_other_authors() {
        let mut results = ResultSet::default();
        let hits = vec![
            SearchHit { id: id(9), author_id: id(AUTHOR) },
            SearchHit { id: id(8), author_id: id(99) },
            SearchHit { id: id(7), author_id: id(AUTHOR) },
        ];
        results.absorb(&query(), &hits);
        assert_eq!(results.into_ids(), vec![id(9), id(7)]);
    }

    #[test]
    fn test_absorb_passing_stop_without_seeing_it() {
        let mut results = ResultSet::default();
        let query = SearchQuery {
            stop_bound: Some(id(8)),
            ..query()
        };
        let hits = vec![
            SearchHit { id: id(9), author_id: id(AUTHOR) },
            SearchHit { id: id(6), author_id: id(AUTHOR) },
        ];
        results.absorb(&query, &hits);
        assert!(results.stop_reached());
        assert_eq!(results.into_ids(), vec![id(9)]);
    }

    #[test]
    fn test_query_accessors() {
        let dm = query();
        assert!(dm.is_direct_message());
        assert_eq!(dm.guild_id(), None);

        let guild = SearchQuery {
            scope: SearchScope::Guild(id(900)),
            ..query()
        };
        assert!(!guild.is_direct_message());
        assert_eq!(guild.guild_id(), Some(id(900)));
    }
}
