//! Blocking wrapper around the async [`search::Client`](crate::search::Client).
//!
//! Each client owns a current-thread Tokio runtime, so it must not be used
//! from inside another async runtime.
use crate::collection::ResultCollection;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::filter::SearchFilter;
use crate::search::{self, SearchResults};
use tokio::runtime::{Builder, Runtime};

pub struct Client {
    rt: Runtime,
    inner: search::Client,
}

impl Client {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let rt = Builder::new_current_thread().enable_all().build()?;
        let inner = search::Client::new(config)?;
        Ok(Self { rt, inner })
    }

    pub fn config(&self) -> &SearchConfig {
        self.inner.config()
    }

    pub fn search(&self, filter: &SearchFilter) -> Result<SearchResults> {
        self.rt.block_on(self.inner.search(filter))
    }

    pub fn search_collection(&self, filter: &SearchFilter) -> Result<ResultCollection> {
        self.rt.block_on(self.inner.search_collection(filter))
    }
}
