//! Valence-arousal targets and the category mapping.

use crate::error::{LookupError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Two-dimensional continuous emotion target.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "[f32; 2]")]
pub struct ValenceArousal {
    /// Pleasantness
    pub valence: f32,
    /// Intensity
    pub arousal: f32,
}

impl ValenceArousal {
    pub const fn new(valence: f32, arousal: f32) -> Self {
        Self { valence, arousal }
    }

    pub fn to_array(self) -> [f32; 2] {
        [self.valence, self.arousal]
    }
}

impl From<[f32; 2]> for ValenceArousal {
    fn from([valence, arousal]: [f32; 2]) -> Self {
        Self { valence, arousal }
    }
}

impl From<(f32, f32)> for ValenceArousal {
    fn from((valence, arousal): (f32, f32)) -> Self {
        Self { valence, arousal }
    }
}

/// Emotion category name to valence-arousal mapping.
///
/// Serialized as a JSON object: `{"hap": [0.8, 0.6], "sad": [-0.6, 0.3]}`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct VaMap {
    entries: HashMap<String, ValenceArousal>,
}

impl VaMap {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Valence-arousal pair of `category`.
    pub fn get(&self, category: &str) -> Result<ValenceArousal> {
        self.entries
            .get(category)
            .copied()
            .ok_or_else(|| LookupError::UnknownCategory(category.to_string()).into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for VaMap
where
    K: Into<String>,
    V: Into<ValenceArousal>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error};

    #[test]
    fn parses_json_pairs() {
        let map = VaMap::from_json_str(r#"{"Happy": [0.8, 0.6], "Sad": [-0.6, 0.3]}"#).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Sad").unwrap(), ValenceArousal::new(-0.6, 0.3));
    }

    #[test]
    fn unknown_category_is_lookup_error() {
        let map: VaMap = [("Neutral", [0.0f32, 0.0])].into_iter().collect();

        let err = map.get("Angry").unwrap_err();

        assert!(matches!(err, Error::Lookup(LookupError::UnknownCategory(ref c)) if c == "Angry"));
    }

    #[test]
    fn rejects_malformed_pairs() {
        let err = VaMap::from_json_str(r#"{"Happy": [0.8]}"#).unwrap_err();

        assert!(matches!(err, Error::Config(ConfigError::InvalidVaMap(_))));
    }
}
