use thiserror::Error;

use crate::domain::DraftField;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown draft field '{name}' (expected one of: {expected})")]
pub struct UnknownDraftField {
    pub name: String,
    pub expected: String,
}

impl UnknownDraftField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: DraftField::ALL
                .iter()
                .map(|field| field.name())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
