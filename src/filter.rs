//! Search filters and their translation into a STAC item search body.
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const DEFAULT_COLLECTION: &str = "landsat-c2l1";
pub const DEFAULT_LIMIT: usize = 100;

pub const PLATFORMS: [&str; 9] = [
    "LANDSAT_1",
    "LANDSAT_2",
    "LANDSAT_3",
    "LANDSAT_4",
    "LANDSAT_5",
    "LANDSAT_6",
    "LANDSAT_7",
    "LANDSAT_8",
    "LANDSAT_9",
];

const MAX_WRS_PATH: u16 = 254;
const MAX_WRS_ROW: u16 = 247;

/// Unvalidated filter fields. Call [`FilterBuilder::build`] to get a
/// [`SearchFilter`].
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FilterBuilder {
    #[serde(default = "default_collection")]
    collection: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wrs_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wrs_row: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cloud_cover_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bbox: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intersects: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_shape: Option<[u32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scene_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    extra_query: Map<String, Value>,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            limit: default_limit(),
            wrs_path: None,
            wrs_row: None,
            cloud_cover_max: None,
            date_start: None,
            date_end: None,
            bbox: None,
            intersects: None,
            platform: None,
            image_shape: None,
            scene_id: None,
            ids: Vec::new(),
            extra_query: Map::new(),
        }
    }
}

impl FilterBuilder {
    pub fn collection(mut self, collection: &str) -> Self {
        self.collection = collection.to_string();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Zero-padded WRS-2 path, e.g. `"116"`.
    pub fn wrs_path(mut self, path: &str) -> Self {
        self.wrs_path = Some(path.to_string());
        self
    }

    pub fn wrs_row(mut self, row: &str) -> Self {
        self.wrs_row = Some(row.to_string());
        self
    }

    pub fn cloud_cover_max(mut self, max: f64) -> Self {
        self.cloud_cover_max = Some(max);
        self
    }

    pub fn date_start(mut self, date: NaiveDate) -> Self {
        self.date_start = Some(date);
        self
    }

    pub fn date_end(mut self, date: NaiveDate) -> Self {
        self.date_end = Some(date);
        self
    }

    pub fn bbox(mut self, bbox: Vec<f64>) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn intersects(mut self, geometry: Value) -> Self {
        self.intersects = Some(geometry);
        self
    }

    pub fn platform(mut self, platform: &str) -> Self {
        self.platform = Some(platform.to_string());
        self
    }

    /// `[rows, columns]` as reported in `proj:shape`.
    pub fn image_shape(mut self, rows: u32, cols: u32) -> Self {
        self.image_shape = Some([rows, cols]);
        self
    }

    pub fn scene_id(mut self, scene_id: &str) -> Self {
        self.scene_id = Some(scene_id.to_string());
        self
    }

    pub fn ids(mut self, ids: Vec<String>) -> Self {
        self.ids = ids;
        self
    }

    /// Adds a raw entry to the `query` object. Entries added this way are not
    /// checked and take precedence over the typed fields.
    pub fn query_entry(mut self, key: &str, predicate: Value) -> Self {
        self.extra_query.insert(key.to_string(), predicate);
        self
    }

    pub fn build(self) -> Result<SearchFilter> {
        if self.collection.trim().is_empty() {
            return Err(Error::InvalidFilter("collection must not be empty".into()));
        }
        if self.limit == 0 {
            return Err(Error::InvalidFilter("limit must be at least 1".into()));
        }
        if let Some(path) = &self.wrs_path {
            check_wrs("path", path, MAX_WRS_PATH)?;
        }
        if let Some(row) = &self.wrs_row {
            check_wrs("row", row, MAX_WRS_ROW)?;
        }
        if let Some(max) = self.cloud_cover_max {
            if !(0.0..=100.0).contains(&max) {
                return Err(Error::InvalidFilter(format!(
                    "cloud cover {max} is not between 0 and 100"
                )));
            }
        }
        if let (Some(start), Some(end)) = (self.date_start, self.date_end) {
            if start > end {
                return Err(Error::InvalidFilter(format!(
                    "date range starts after it ends: {start}/{end}"
                )));
            }
        }
        if let Some(platform) = &self.platform {
            if !PLATFORMS.contains(&platform.as_str()) {
                return Err(Error::InvalidFilter(format!(
                    "platform {platform} is not a Landsat platform"
                )));
            }
        }
        Ok(SearchFilter(self))
    }
}

fn check_wrs(name: &str, value: &str, max: u16) -> Result<()> {
    let valid = value.len() == 3
        && value.bytes().all(|b| b.is_ascii_digit())
        && value.parse::<u16>().map(|v| v <= max).unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidFilter(format!(
            "WRS {name} {value:?} is not a zero-padded number between 000 and {max:03}"
        )))
    }
}

fn start_of_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00Z").to_string()
}

fn end_of_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT23:59:59Z").to_string()
}

/// A validated set of search parameters.
///
/// Only the fields that were set end up in the request body, so an empty
/// filter matches every item in the collection.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(try_from = "FilterBuilder", into = "FilterBuilder")]
pub struct SearchFilter(FilterBuilder);

impl TryFrom<FilterBuilder> for SearchFilter {
    type Error = Error;

    fn try_from(builder: FilterBuilder) -> Result<Self> {
        builder.build()
    }
}

impl From<SearchFilter> for FilterBuilder {
    fn from(filter: SearchFilter) -> Self {
        filter.0
    }
}

impl Default for SearchFilter {
    fn default() -> Self {
        SearchFilter(FilterBuilder::default())
    }
}

impl SearchFilter {
    pub fn builder() -> FilterBuilder {
        FilterBuilder::default()
    }

    pub fn collection(&self) -> &str {
        &self.0.collection
    }

    pub fn limit(&self) -> usize {
        self.0.limit
    }

    pub fn wrs_path(&self) -> Option<&str> {
        self.0.wrs_path.as_deref()
    }

    pub fn wrs_row(&self) -> Option<&str> {
        self.0.wrs_row.as_deref()
    }

    pub fn cloud_cover_max(&self) -> Option<f64> {
        self.0.cloud_cover_max
    }

    pub fn date_start(&self) -> Option<NaiveDate> {
        self.0.date_start
    }

    pub fn date_end(&self) -> Option<NaiveDate> {
        self.0.date_end
    }

    /// The STAC `datetime` interval in RFC 3339, covering whole days and open
    /// ended on the side that was not set.
    pub fn datetime(&self) -> Option<String> {
        let start = self.0.date_start.map(start_of_day);
        let end = self.0.date_end.map(end_of_day);
        match (start, end) {
            (None, None) => None,
            (Some(start), Some(end)) => Some(format!("{start}/{end}")),
            (Some(start), None) => Some(format!("{start}/..")),
            (None, Some(end)) => Some(format!("../{end}")),
        }
    }

    pub fn query(&self) -> Value {
        let f = &self.0;
        let mut body = Map::new();
        body.insert("collections".into(), json!([f.collection]));
        body.insert("limit".into(), json!(f.limit));
        if let Some(datetime) = self.datetime() {
            body.insert("datetime".into(), Value::String(datetime));
        }
        if let Some(bbox) = &f.bbox {
            body.insert("bbox".into(), json!(bbox));
        }
        if let Some(geometry) = &f.intersects {
            body.insert("intersects".into(), geometry.clone());
        }
        if !f.ids.is_empty() {
            body.insert("ids".into(), json!(f.ids));
        }

        let mut query = Map::new();
        if let Some(max) = f.cloud_cover_max {
            query.insert("eo:cloud_cover".into(), json!({ "lte": max }));
        }
        if let Some(path) = &f.wrs_path {
            query.insert("landsat:wrs_path".into(), json!({ "eq": path }));
        }
        if let Some(row) = &f.wrs_row {
            query.insert("landsat:wrs_row".into(), json!({ "eq": row }));
        }
        if let Some(platform) = &f.platform {
            query.insert("platform".into(), json!({ "eq": platform }));
        }
        if let Some(shape) = &f.image_shape {
            query.insert("proj:shape".into(), json!({ "eq": shape }));
        }
        if let Some(scene_id) = &f.scene_id {
            query.insert("landsat:scene_id".into(), json!({ "eq": scene_id }));
        }
        for (key, predicate) in &f.extra_query {
            query.insert(key.clone(), predicate.clone());
        }
        if !query.is_empty() {
            body.insert("query".into(), Value::Object(query));
        }

        Value::Object(body)
    }
}
