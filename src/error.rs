use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The search endpoint could not be reached or the transfer failed.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// The search endpoint answered with a non-success status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// A page did not have the structure of a STAC item search response.
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    /// A feature record could not be turned into a scene.
    #[error("feature {index} is not a valid scene: {reason}")]
    SceneParse { index: usize, reason: String },

    #[error("index {index} out of bounds for collection of {len} scenes")]
    Index { index: usize, len: usize },

    #[error("invalid search filter: {0}")]
    InvalidFilter(String),

    #[error("invalid search config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Returns true for failures talking to the search endpoint, as opposed to
    /// bad data or a bad index.
    pub fn is_request(&self) -> bool {
        matches!(self, Error::Request(_) | Error::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
