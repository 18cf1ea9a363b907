//! Secondary-action catalog: item name -> how long the action button is held

use super::error::{AutomationError, AutomationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct ActionCatalog {
    entries: BTreeMap<String, f64>,
}

impl From<BTreeMap<String, f64>> for ActionCatalog {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        raw.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}

impl From<ActionCatalog> for BTreeMap<String, f64> {
    fn from(catalog: ActionCatalog) -> Self {
        catalog.entries
    }
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in hold times (seconds) used when no catalog file can be read.
    pub fn builtin() -> Self {
        [
            ("steak", 1.61),
            ("bread", 1.61),
            ("baked_potato", 1.61),
            ("golden_carrot", 1.61),
            ("cooked_chicken", 1.61),
            ("dried_kelp", 0.865),
        ]
        .into_iter()
        .collect()
    }

    pub fn insert(&mut self, key: &str, seconds: f64) {
        self.entries.insert(key.trim().to_ascii_lowercase(), seconds);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Hold duration for `key`.
    ///
    /// An empty catalog, an unknown key, or a non-positive/non-finite entry all
    /// mean there is no usable action.
    pub fn lookup(&self, key: &str) -> AutomationResult<Duration> {
        let normalized = key.trim().to_ascii_lowercase();
        self.entries
            .get(&normalized)
            .copied()
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .ok_or_else(|| AutomationError::MissingActionData {
                key: normalized,
                catalog_len: self.entries.len(),
            })
    }
}

impl<'a> FromIterator<(&'a str, f64)> for ActionCatalog {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut catalog = ActionCatalog::new();
        for (key, seconds) in iter {
            catalog.insert(key, seconds);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_item() {
        let catalog = ActionCatalog::builtin();
        assert_eq!(
            catalog.lookup("Dried_Kelp").unwrap(),
            Duration::from_secs_f64(0.865)
        );
    }

    #[test]
    fn test_empty_catalog_reports_missing_data() {
        let err = ActionCatalog::new().lookup("steak").unwrap_err();
        assert!(matches!(
            err,
            AutomationError::MissingActionData { catalog_len: 0, .. }
        ));
    }

    #[test]
    fn test_unknown_or_invalid_entries_are_missing() {
        let mut catalog = ActionCatalog::new();
        catalog.insert("zero", 0.0);
        catalog.insert("negative", -1.0);
        catalog.insert("nan", f64::NAN);
        for key in ["zero", "negative", "nan", "cake"] {
            assert!(catalog.lookup(key).is_err(), "{key} should be missing");
        }
    }

    #[test]
    fn test_catalog_json_shape() {
        let catalog: ActionCatalog = serde_json::from_str(r#"{"Steak": 1.5}"#).unwrap();
        assert_eq!(catalog.lookup("steak").unwrap(), Duration::from_millis(1500));
        assert_eq!(serde_json::to_string(&catalog).unwrap(), r#"{"steak":1.5}"#);
    }
}
