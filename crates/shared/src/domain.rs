use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownDraftField;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(RecordId);

/// A movie entry as held by the controller. Ids are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub opening_text: String,
    pub release_date: String,
}

/// Unsubmitted form input for a new record. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub title: String,
    pub opening_text: String,
    pub release_date: String,
}

impl Draft {
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let slot = match field {
            DraftField::Title => &mut self.title,
            DraftField::OpeningText => &mut self.opening_text,
            DraftField::ReleaseDate => &mut self.release_date,
        };
        *slot = value.into();
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::OpeningText => &self.opening_text,
            DraftField::ReleaseDate => &self.release_date,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.opening_text.is_empty() && self.release_date.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Title,
    OpeningText,
    ReleaseDate,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [
        DraftField::Title,
        DraftField::OpeningText,
        DraftField::ReleaseDate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::OpeningText => "openingText",
            DraftField::ReleaseDate => "releaseDate",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DraftField {
    type Err = UnknownDraftField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "title" => Ok(DraftField::Title),
            "openingText" | "opening_text" => Ok(DraftField::OpeningText),
            "releaseDate" | "release_date" => Ok(DraftField::ReleaseDate),
            other => Err(UnknownDraftField::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_serializes_with_camel_case_keys() {
        let draft = Draft {
            title: "X".into(),
            opening_text: "Y".into(),
            release_date: "2020-01-01".into(),
        };
        let value = serde_json::to_value(&draft).expect("serialize draft");
        assert_eq!(
            value,
            serde_json::json!({
                "title": "X",
                "openingText": "Y",
                "releaseDate": "2020-01-01",
            })
        );
    }

    #[test]
    fn draft_field_accepts_form_and_snake_case_names() {
        assert_eq!("openingText".parse::<DraftField>().ok(), Some(DraftField::OpeningText));
        assert_eq!("release_date".parse::<DraftField>().ok(), Some(DraftField::ReleaseDate));
        let err = "director".parse::<DraftField>().expect_err("unknown field");
        assert_eq!(err.name, "director");
    }

    #[test]
    fn setting_a_field_leaves_the_others_alone() {
        let mut draft = Draft::default();
        draft.set(DraftField::Title, "A New Hope");
        assert_eq!(draft.get(DraftField::Title), "A New Hope");
        assert!(draft.opening_text.is_empty());
        assert!(!draft.is_blank());
    }
}
