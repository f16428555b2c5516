use crate::error::{Error, Result};
use crate::href;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use stac::Asset;
use tracing::warn;

const METADATA_ASSETS: [&str; 4] = ["MTL.txt", "MTL.json", "MTL.xml", "ANG.txt"];
const COEFFICIENT_ASSETS: [&str; 4] = ["VAA", "VZA", "SAA", "SZA"];

/// What a Landsat asset holds, judged from its key and fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    Band(String),
    QualityAssessment,
    Metadata,
    Coefficient,
    Thumbnail,
    Other,
}

impl AssetKind {
    /// Band images keyed like QA assets classify as QA, but still show up in
    /// [`Scene::s3_tiff_paths`].
    pub fn classify(key: &str, asset: &Asset) -> Self {
        if COEFFICIENT_ASSETS.contains(&key) {
            return Self::Coefficient;
        }
        if METADATA_ASSETS.contains(&key) {
            return Self::Metadata;
        }
        if key.contains("qa_") {
            return Self::QualityAssessment;
        }
        if key == "thumbnail" {
            return Self::Thumbnail;
        }
        match band_name(key, asset) {
            Some(name) => Self::Band(name.to_string()),
            None => Self::Other,
        }
    }
}

/// First `eo:bands` name of a TIFF asset, falling back to the asset key.
fn band_name<'a>(key: &'a str, asset: &'a Asset) -> Option<&'a str> {
    let bands = asset.additional_fields.get("eo:bands")?;
    if !href::is_tiff(&asset.href) {
        return None;
    }
    Some(
        bands
            .get(0)
            .and_then(|band| band.get("name"))
            .and_then(Value::as_str)
            .unwrap_or(key),
    )
}

#[derive(Debug, Clone, Default, PartialEq)]
struct AssetPaths {
    s3_tiff: IndexMap<String, String>,
    https_tiff: IndexMap<String, String>,
    s3_qa: IndexMap<String, String>,
    s3_metadata: IndexMap<String, String>,
    s3_coefficient: IndexMap<String, String>,
    bands: IndexMap<String, Option<String>>,
    thumbnail: Option<String>,
}

impl AssetPaths {
    fn from_assets(scene_id: &str, assets: &IndexMap<String, Asset>) -> Self {
        let mut paths = Self::default();
        for (key, asset) in assets {
            let band = band_name(key, asset);
            if let Some(name) = band {
                paths.https_tiff.insert(name.to_string(), asset.href.clone());
                paths.bands.insert(name.to_string(), common_name(asset));
            }
            let target = match AssetKind::classify(key, asset) {
                AssetKind::QualityAssessment => Some(&mut paths.s3_qa),
                AssetKind::Metadata => Some(&mut paths.s3_metadata),
                AssetKind::Coefficient => Some(&mut paths.s3_coefficient),
                AssetKind::Thumbnail => {
                    paths.thumbnail = Some(asset.href.clone());
                    None
                }
                AssetKind::Band(_) | AssetKind::Other => None,
            };
            if band.is_none() && target.is_none() {
                continue;
            }

            let Some(uri) = s3_href(asset) else {
                warn!(
                    scene = scene_id,
                    asset = key.as_str(),
                    href = asset.href.as_str(),
                    "no object storage path for asset"
                );
                continue;
            };
            if let Some(target) = target {
                target.insert(key.clone(), uri.clone());
            }
            if let Some(name) = band {
                paths.s3_tiff.insert(name.to_string(), uri);
            }
        }
        paths
    }
}

/// The `alternate.s3.href` of an asset, or its href rewritten to `s3://`.
fn s3_href(asset: &Asset) -> Option<String> {
    asset
        .additional_fields
        .get("alternate")
        .and_then(|alternate| alternate.get("s3"))
        .and_then(|s3| s3.get("href"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| href::to_s3_uri(&asset.href))
}

fn common_name(asset: &Asset) -> Option<String> {
    asset
        .additional_fields
        .get("eo:bands")?
        .get(0)?
        .get("common_name")?
        .as_str()
        .map(str::to_string)
}

#[derive(Debug, Clone)]
pub struct Scene {
    id: String,
    collection: Option<String>,
    bbox: Option<Vec<f64>>,
    geometry: Option<Value>,
    properties: Map<String, Value>,
    assets: IndexMap<String, Asset>,
    paths: AssetPaths,
}

impl Scene {
    /// Builds a scene from the feature at `index` of a result list.
    ///
    /// `id` and `assets` are required, and every asset needs an `href`.
    /// `properties` may be absent but must be an object when present.
    pub fn from_feature(index: usize, mut feature: Map<String, Value>) -> Result<Self> {
        let parse_error = |reason: String| Error::SceneParse { index, reason };

        let id = match feature.remove("id") {
            Some(Value::String(id)) => id,
            Some(_) => return Err(parse_error("`id` is not a string".into())),
            None => return Err(parse_error("missing `id`".into())),
        };
        let assets = match feature.remove("assets") {
            Some(Value::Object(assets)) => assets,
            Some(_) => return Err(parse_error(format!("{id}: `assets` is not an object"))),
            None => return Err(parse_error(format!("{id}: missing `assets`"))),
        };
        let assets = assets
            .into_iter()
            .map(|(key, value)| {
                serde_json::from_value::<Asset>(value)
                    .map(|asset| (key.clone(), asset))
                    .map_err(|err| parse_error(format!("{id}: asset `{key}`: {err}")))
            })
            .collect::<Result<IndexMap<_, _>>>()?;
        let properties = match feature.remove("properties") {
            Some(Value::Object(properties)) => properties,
            None | Some(Value::Null) => Map::new(),
            Some(_) => return Err(parse_error(format!("{id}: `properties` is not an object"))),
        };
        let collection = match feature.remove("collection") {
            Some(Value::String(collection)) => Some(collection),
            _ => None,
        };
        let bbox = feature
            .remove("bbox")
            .and_then(|bbox| serde_json::from_value(bbox).ok());
        let geometry = feature.remove("geometry").filter(|g| !g.is_null());

        let paths = AssetPaths::from_assets(&id, &assets);
        Ok(Self {
            id,
            collection,
            bbox,
            geometry,
            properties,
            assets,
            paths,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn bbox(&self) -> Option<&[f64]> {
        self.bbox.as_deref()
    }

    pub fn geometry(&self) -> Option<&Value> {
        self.geometry.as_ref()
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn assets(&self) -> &IndexMap<String, Asset> {
        &self.assets
    }

    pub fn asset(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }

    /// Band name to `s3://` URI for every band image.
    pub fn s3_tiff_paths(&self) -> &IndexMap<String, String> {
        &self.paths.s3_tiff
    }

    pub fn https_tiff_paths(&self) -> &IndexMap<String, String> {
        &self.paths.https_tiff
    }

    pub fn s3_qa_paths(&self) -> &IndexMap<String, String> {
        &self.paths.s3_qa
    }

    pub fn s3_metadata_paths(&self) -> &IndexMap<String, String> {
        &self.paths.s3_metadata
    }

    pub fn s3_coefficient_paths(&self) -> &IndexMap<String, String> {
        &self.paths.s3_coefficient
    }

    /// Band name to common name (`B4` to `red`).
    pub fn bands(&self) -> &IndexMap<String, Option<String>> {
        &self.paths.bands
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.paths.thumbnail.as_deref()
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let datetime = self.property_str("datetime")?;
        DateTime::parse_from_rfc3339(datetime)
            .ok()
            .map(|datetime| datetime.with_timezone(&Utc))
    }

    pub fn cloud_cover(&self) -> Option<f64> {
        self.property_f64("eo:cloud_cover")
    }

    pub fn cloud_cover_land(&self) -> Option<f64> {
        self.property_f64("landsat:cloud_cover_land")
    }

    pub fn platform(&self) -> Option<&str> {
        self.property_str("platform")
    }

    pub fn instruments(&self) -> Vec<&str> {
        self.property("instruments")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn wrs_type(&self) -> Option<&str> {
        self.property_str("landsat:wrs_type")
    }

    pub fn wrs_path(&self) -> Option<&str> {
        self.property_str("landsat:wrs_path")
    }

    pub fn wrs_row(&self) -> Option<&str> {
        self.property_str("landsat:wrs_row")
    }

    pub fn scene_id(&self) -> Option<&str> {
        self.property_str("landsat:scene_id")
    }

    pub fn collection_category(&self) -> Option<&str> {
        self.property_str("landsat:collection_category")
    }

    pub fn collection_number(&self) -> Option<&str> {
        self.property_str("landsat:collection_number")
    }

    pub fn correction(&self) -> Option<&str> {
        self.property_str("landsat:correction")
    }

    pub fn epsg(&self) -> Option<u32> {
        self.property("proj:epsg")
            .and_then(Value::as_u64)
            .and_then(|epsg| u32::try_from(epsg).ok())
    }

    pub fn shape(&self) -> Option<Vec<u64>> {
        self.property("proj:shape")?
            .as_array()?
            .iter()
            .map(Value::as_u64)
            .collect()
    }

    pub fn sun_azimuth(&self) -> Option<f64> {
        self.property_f64("view:sun_azimuth")
    }

    pub fn sun_elevation(&self) -> Option<f64> {
        self.property_f64("view:sun_elevation")
    }

    pub fn off_nadir(&self) -> Option<f64> {
        self.property_f64("view:off_nadir")
    }

    fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(Value::as_str)
    }

    fn property_f64(&self, key: &str) -> Option<f64> {
        self.property(key).and_then(Value::as_f64)
    }
}
