use serde::{Deserialize, Serialize};

/// Canonical subject identifier, used for every map key and comparison.
pub type SubjectId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
}

impl Subject {
    pub fn new(id: SubjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Case-insensitive name match, as used by the CLI lookups.
    pub fn matches(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query.trim())
            || query.trim().parse::<SubjectId>().ok() == Some(self.id)
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
