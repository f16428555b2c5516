use crate::error::{Error, Result};
use crate::filter::SearchFilter;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://landsatlook.usgs.gov/stac-server/search";
pub const DEFAULT_MAX_PAGES: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how far to search.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Full URL of the item search endpoint.
    pub endpoint: Url,

    /// Stop after this many pages, at least one. `None` follows `next` links
    /// until the server stops returning them.
    #[serde(deserialize_with = "deserialize_max_pages")]
    pub max_pages: Option<usize>,

    /// Per-request timeout handed to the HTTP client.
    pub timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            max_pages: Some(DEFAULT_MAX_PAGES),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SearchConfig {
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            ..Self::default()
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn check(&self) -> Result<()> {
        if self.max_pages == Some(0) {
            return Err(Error::InvalidConfig("max_pages must be at least 1".into()));
        }
        Ok(())
    }
}

fn deserialize_max_pages<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<usize>::deserialize(deserializer)? {
        Some(0) => Err(serde::de::Error::custom("max_pages must be at least 1")),
        max_pages => Ok(max_pages),
    }
}

/// A saved search: a config plus a filter, stored as TOML.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SearchProfile {
    #[serde(default)]
    pub config: SearchConfig,
    #[serde(default)]
    pub filter: SearchFilter,
}

impl SearchProfile {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let profile: Self = toml::from_str(&content)?;
        Ok(profile)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn from_template(table: &toml::Table) -> Result<Self> {
        let profile: Self = toml::from_str(&table.to_string())?;
        Ok(profile)
    }
}

/// A Collection 2 Level-1 search over Manila (WRS 116/050) for 2022.
pub fn landsat_c2l1_template() -> toml::Table {
    toml::toml! {
        [config]
        endpoint = "https://landsatlook.usgs.gov/stac-server/search"
        max_pages = 10
        timeout_secs = 30

        [filter]
        collection = "landsat-c2l1"
        limit = 100
        wrs_path = "116"
        wrs_row = "050"
        cloud_cover_max = 20.0
        date_start = "2022-01-01"
        date_end = "2022-12-31"
        platform = "LANDSAT_9"
    }
}
