//! Well-known-address rewrites.
//!
//! Local callers book to "the cathedral" or "the train station"; the
//! dispatch system needs a full address. The table maps lowercase landmark
//! keys to canonical full addresses. A built-in table covers the operating
//! area; a YAML file can replace it per deployment.

use std::path::Path;

use serde::Deserialize;

use crate::GeoError;

/// Built-in landmark table for the default operating area.
const BUILTIN_LANDMARKS: &[(&str, &str)] = &[
    (
        "cathedral",
        "Chelmsford Cathedral, 53 New Street, Chelmsford, CM1 1TY",
    ),
    (
        "railway station",
        "Chelmsford Railway Station, Duke Street, Chelmsford, CM1 1HT",
    ),
    (
        "train station",
        "Chelmsford Railway Station, Duke Street, Chelmsford, CM1 1HT",
    ),
    (
        "bus station",
        "Chelmsford Bus Station, Coval Lane, Chelmsford, CM1 1TD",
    ),
    (
        "hospital",
        "Broomfield Hospital, Court Road, Chelmsford, CM1 7ET",
    ),
    (
        "university",
        "Anglia Ruskin University, Bishop Hall Lane, Chelmsford, CM1 1SQ",
    ),
    ("high street", "High Street, Chelmsford, CM1 1BE"),
    (
        "cricket ground",
        "The Cloud County Ground, New Writtle Street, Chelmsford, CM2 0PG",
    ),
    (
        "county hall",
        "County Hall, Market Road, Chelmsford, CM1 1QH",
    ),
];

/// One entry in a landmark override file.
#[derive(Debug, Clone, Deserialize)]
pub struct LandmarkEntry {
    /// Lowercase key matched by containment against incoming address text.
    pub key: String,
    /// Canonical full address the input is rewritten to.
    pub address: String,
}

#[derive(Debug, Deserialize)]
struct LandmarksFile {
    landmarks: Vec<LandmarkEntry>,
}

/// The active landmark rewrite table.
#[derive(Debug, Clone)]
pub struct LandmarkTable {
    entries: Vec<(String, String)>,
}

impl Default for LandmarkTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LandmarkTable {
    /// The built-in table for the default operating area.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_LANDMARKS
                .iter()
                .map(|&(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        }
    }

    /// Loads and validates a landmark table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `GeoError` if the file cannot be read, parsed, or fails
    /// validation (empty or duplicate keys).
    pub fn from_file(path: &Path) -> Result<Self, GeoError> {
        let content = std::fs::read_to_string(path).map_err(|e| GeoError::LandmarksIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let file: LandmarksFile = serde_yaml::from_str(&content)?;
        Self::from_entries(file.landmarks)
    }

    /// Builds a table from entries, validating keys.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::LandmarksValidation`] on empty or duplicate keys.
    pub fn from_entries(entries: Vec<LandmarkEntry>) -> Result<Self, GeoError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &entries {
            let key = entry.key.trim().to_lowercase();
            if key.is_empty() {
                return Err(GeoError::LandmarksValidation(
                    "landmark key must be non-empty".to_owned(),
                ));
            }
            if entry.address.trim().is_empty() {
                return Err(GeoError::LandmarksValidation(format!(
                    "landmark '{key}' has an empty address"
                )));
            }
            if !seen.insert(key.clone()) {
                return Err(GeoError::LandmarksValidation(format!(
                    "duplicate landmark key '{key}'"
                )));
            }
        }
        Ok(Self {
            entries: entries
                .into_iter()
                .map(|e| (e.key.trim().to_lowercase(), e.address))
                .collect(),
        })
    }

    /// Returns the canonical address when the input mentions a known landmark.
    ///
    /// Matching is lowercase containment; the first matching table entry wins.
    #[must_use]
    pub fn rewrite(&self, raw: &str) -> Option<&str> {
        let lower = raw.to_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| lower.contains(key.as_str()))
            .map(|(_, address)| address.as_str())
    }
}
