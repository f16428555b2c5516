//! An ordered, read-only collection of scenes parsed from search results.
use crate::error::{Error, Result};
use crate::scene::Scene;
use serde_json::{Map, Value};
use std::ops::Index;
use tracing::warn;

/// A feature record that could not be turned into a [`Scene`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResultCollection {
    scenes: Vec<Scene>,
    skipped: Vec<SkippedRecord>,
}

impl ResultCollection {
    /// Parses every feature record, skipping the ones that are not valid
    /// scenes. Skipped records are reported by [`ResultCollection::skipped`].
    pub fn new(features: Vec<Map<String, Value>>) -> Self {
        let mut scenes = Vec::with_capacity(features.len());
        let mut skipped = Vec::new();
        for (index, feature) in features.into_iter().enumerate() {
            match Scene::from_feature(index, feature) {
                Ok(scene) => scenes.push(scene),
                Err(err) => {
                    warn!(index, error = %err, "skipping feature record");
                    skipped.push(SkippedRecord {
                        index,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Self { scenes, skipped }
    }

    /// Parses every feature record, failing on the first invalid one.
    pub fn strict(features: Vec<Map<String, Value>>) -> Result<Self> {
        let scenes = features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| Scene::from_feature(index, feature))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            scenes,
            skipped: Vec::new(),
        })
    }

    /// Returns the scene at `index`, in the order the server returned them.
    pub fn get(&self, index: usize) -> Result<&Scene> {
        self.scenes.get(index).ok_or(Error::Index {
            index,
            len: self.scenes.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scene> {
        self.scenes.iter()
    }

    pub fn as_slice(&self) -> &[Scene] {
        &self.scenes
    }

    /// Records dropped by [`ResultCollection::new`].
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn find(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.id() == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.scenes.iter().map(Scene::id).collect()
    }

    /// Landsat scene ids (`landsat:scene_id`) of the scenes that report one.
    pub fn scene_ids(&self) -> Vec<&str> {
        self.scenes.iter().filter_map(Scene::scene_id).collect()
    }
}

impl Index<usize> for ResultCollection {
    type Output = Scene;

    fn index(&self, index: usize) -> &Scene {
        &self.scenes[index]
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a Scene;
    type IntoIter = std::slice::Iter<'a, Scene>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenes.iter()
    }
}

impl IntoIterator for ResultCollection {
    type Item = Scene;
    type IntoIter = std::vec::IntoIter<Scene>;

    fn into_iter(self) -> Self::IntoIter {
        self.scenes.into_iter()
    }
}
