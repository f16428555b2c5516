//! Search USGS Landsat scenes through a STAC API and work with the results.
//!
//! ```no_run
//! # async fn run() -> landsat_stac::Result<()> {
//! use landsat_stac::{Client, SearchConfig, SearchFilter};
//!
//! let filter = SearchFilter::builder()
//!     .wrs_path("116")
//!     .wrs_row("050")
//!     .cloud_cover_max(20.0)
//!     .build()?;
//! let client = Client::new(SearchConfig::default())?;
//! let scenes = client.search_collection(&filter).await?;
//! for scene in &scenes {
//!     println!("{} {:?}", scene.id(), scene.s3_tiff_paths().get("B4"));
//! }
//! # Ok(())
//! # }
//! ```
pub mod blocking;
pub mod collection;
pub mod config;
mod error;
pub mod filter;
pub mod href;
pub mod page;
pub mod scene;
pub mod search;

pub use collection::{ResultCollection, SkippedRecord};
pub use config::{SearchConfig, SearchProfile};
pub use error::{Error, Result};
pub use filter::{FilterBuilder, SearchFilter};
pub use scene::{AssetKind, Scene};
pub use search::{Client, SearchResults};
