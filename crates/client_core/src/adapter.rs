//! Mapping from raw backend collection bodies to canonical [`Record`]s.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Record, RecordId},
    protocol::{FirebaseCollection, FirebaseRecordFields, SwapiCollection},
};
use tracing::warn;

use crate::error::StoreError;

/// Which response shape the configured backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendShape {
    #[default]
    Firebase,
    Swapi,
}

impl fmt::Display for BackendShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendShape::Firebase => f.write_str("firebase"),
            BackendShape::Swapi => f.write_str("swapi"),
        }
    }
}

impl FromStr for BackendShape {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "firebase" => Ok(BackendShape::Firebase),
            "swapi" => Ok(BackendShape::Swapi),
            other => Err(format!(
                "unknown backend shape '{other}' (expected firebase or swapi)"
            )),
        }
    }
}

pub trait RecordAdapter: Send + Sync {
    fn decode_collection(&self, body: &[u8]) -> Result<Vec<Record>, StoreError>;
}

/// Object keyed by opaque id; the key becomes the record id.
pub struct FirebaseAdapter;

impl RecordAdapter for FirebaseAdapter {
    fn decode_collection(&self, body: &[u8]) -> Result<Vec<Record>, StoreError> {
        let collection: FirebaseCollection = serde_json::from_slice(body)?;
        Ok(collection
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, child)| decode_firebase_child(key, child))
            .collect())
    }
}

fn decode_firebase_child(key: String, child: serde_json::Value) -> Option<Record> {
    if !child.is_object() {
        warn!(key = %key, "firebase: skipping non-object child");
        return None;
    }
    match serde_json::from_value::<FirebaseRecordFields>(child) {
        Ok(fields) => Some(Record {
            id: RecordId(key),
            title: fields.title,
            opening_text: fields.opening_text,
            release_date: fields.release_date,
        }),
        Err(err) => {
            warn!(key = %key, "firebase: skipping malformed child: {err}");
            None
        }
    }
}

/// `results` array with `episode_id` / `opening_crawl` naming.
pub struct SwapiAdapter;

impl RecordAdapter for SwapiAdapter {
    fn decode_collection(&self, body: &[u8]) -> Result<Vec<Record>, StoreError> {
        let collection: SwapiCollection = serde_json::from_slice(body)?;
        Ok(collection
            .results
            .into_iter()
            .map(|film| Record {
                id: RecordId(film.episode_id.to_string()),
                title: film.title,
                opening_text: film.opening_crawl,
                release_date: film.release_date,
            })
            .collect())
    }
}

pub fn adapter_for(shape: BackendShape) -> Arc<dyn RecordAdapter> {
    match shape {
        BackendShape::Firebase => Arc::new(FirebaseAdapter),
        BackendShape::Swapi => Arc::new(SwapiAdapter),
    }
}

#[cfg(test)]
#[path = "tests/adapter_tests.rs"]
mod tests;
