//! Item search against a STAC API, following `next` links page by page.
use crate::collection::ResultCollection;
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::filter::SearchFilter;
use crate::page::{Link, Page};
use reqwest::Response;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Everything a search returned.
#[derive(Debug, Clone)]
pub struct SearchResults {
    /// The body sent for the first page.
    pub query: Value,

    /// Feature records from every page, in fetch order.
    pub features: Vec<Map<String, Value>>,

    pub pages: usize,

    /// Total matches reported by the first page, if any.
    pub number_matched: Option<u64>,
}

impl SearchResults {
    pub fn into_collection(self) -> ResultCollection {
        ResultCollection::new(self.features)
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    config: SearchConfig,
}

impl Client {
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.check()?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Uses an existing HTTP client. The config timeout is not applied.
    pub fn with_client(client: reqwest::Client, config: SearchConfig) -> Result<Self> {
        config.check()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs the search and collects the features of every page.
    ///
    /// Pages are fetched one at a time until the server stops returning a
    /// `next` link, a page comes back empty, or `max_pages` is reached. Any
    /// failure discards the pages fetched so far.
    pub async fn search(&self, filter: &SearchFilter) -> Result<SearchResults> {
        let query = filter.query();
        debug!(%query, endpoint = %self.config.endpoint, "searching");

        let mut page = self.post(self.config.endpoint.as_str(), &query).await?;
        let number_matched = page.number_matched();
        let mut body = query.clone();
        let mut pages = 1;
        let mut features = Vec::new();

        loop {
            let next = page.next_link().cloned();
            let empty = page.is_empty();
            features.append(&mut page.features);

            let Some(link) = next else { break };
            if empty {
                debug!(pages, "empty page, stopping");
                break;
            }
            if self.config.max_pages.is_some_and(|max| pages >= max) {
                info!(pages, "reached max pages, stopping");
                break;
            }

            page = self.follow(&link, &mut body).await?;
            pages += 1;
        }

        info!(
            pages,
            features = features.len(),
            matched = ?number_matched,
            "search complete"
        );
        Ok(SearchResults {
            query,
            features,
            pages,
            number_matched,
        })
    }

    pub async fn search_collection(&self, filter: &SearchFilter) -> Result<ResultCollection> {
        let results = self.search(filter).await?;
        Ok(results.into_collection())
    }

    async fn follow(&self, link: &Link, body: &mut Value) -> Result<Page> {
        if link.is_post() {
            *body = link.post_body(body);
            self.post(&link.href, body).await
        } else {
            self.get(&link.href).await
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Page> {
        debug!(url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        read_page(url, response).await
    }

    async fn get(&self, url: &str) -> Result<Page> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        read_page(url, response).await
    }
}

async fn read_page(url: &str, response: Response) -> Result<Page> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Status {
            url: url.to_string(),
            status,
            body: body.chars().take(500).collect(),
        });
    }
    let bytes = response.bytes().await?;
    Page::from_slice(url, &bytes)
}
