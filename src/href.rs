//! Rewrites public asset hrefs into their object-storage equivalents.
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Bucket behind `https://landsatlook.usgs.gov/data/`.
pub const USGS_LANDSAT_BUCKET: &str = "usgs-landsat";

const LANDSATLOOK_DATA_PREFIX: &str = "https://landsatlook.usgs.gov/data/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Object {
    pub bucket: String,
    pub key: String,
    pub region: Option<String>,
}

impl S3Object {
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            region: None,
        }
    }

    /// Parses an asset href into a bucket and key.
    ///
    /// Recognised forms:
    /// - `s3://bucket/key`
    /// - `https://landsatlook.usgs.gov/data/<key>`, which lives in the
    ///   `usgs-landsat` bucket
    /// - `https://<bucket>.s3.<region>.amazonaws.com/<key>`
    ///
    /// Returns `None` for anything else.
    pub fn from_href(href: &str) -> Option<Self> {
        if let Some(rest) = href.strip_prefix("s3://") {
            let (bucket, key) = rest.split_once('/')?;
            if bucket.is_empty() || key.is_empty() {
                return None;
            }
            return Some(Self::new(bucket, key));
        }

        if let Some(key) = href.strip_prefix(LANDSATLOOK_DATA_PREFIX) {
            if key.is_empty() {
                return None;
            }
            return Some(Self::new(USGS_LANDSAT_BUCKET, key));
        }

        let captures = virtual_hosted().captures(href)?;
        let (_, [bucket, region, key]) = captures.extract();
        Some(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            region: Some(region.to_string()),
        })
    }

    pub fn uri(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for S3Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Rewrites `href` to an `s3://` URI, if it follows a known convention.
pub fn to_s3_uri(href: &str) -> Option<String> {
    S3Object::from_href(href).map(|object| object.uri())
}

/// True when the path of `href` ends with `.tif` or `.tiff`, ignoring case and
/// any query string.
pub fn is_tiff(href: &str) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let path = path.to_ascii_lowercase();
    path.ends_with(".tif") || path.ends_with(".tiff")
}

fn virtual_hosted() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://(?<bucket>[\w.-]+?)\.s3\.(?<region>[\w-]+)\.amazonaws\.com/(?<key>.+)$")
            .expect("Regex pattern should always compile")
    })
}
