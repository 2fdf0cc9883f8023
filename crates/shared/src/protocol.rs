//! Wire shapes of the backends the client talks to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fields stored under each key of a Firebase-style collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FirebaseRecordFields {
    pub title: String,
    pub opening_text: String,
    pub release_date: String,
}

/// `GET movies.json` on a Firebase realtime database. An empty database
/// answers `null`, hence the `Option`. Children stay raw so that one
/// malformed child can be skipped without losing its siblings.
pub type FirebaseCollection = Option<BTreeMap<String, serde_json::Value>>;

/// `POST movies.json` answer on Firebase: the key of the new child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseCreateResponse {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapiFilm {
    pub episode_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub opening_crawl: String,
    #[serde(default)]
    pub release_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapiCollection {
    pub results: Vec<SwapiFilm>,
}
