use serde::{Serialize, Serializer};

use crate::screening::Keyword;

/// One project as read from a source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectRow {
    pub name: String,
    pub description: String,
    /// Extra labelled columns in the order they were first seen.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "fields_as_map")]
    pub raw_fields: Vec<(String, String)>,
}

impl ProjectRow {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        ProjectRow {
            name: name.into(),
            description: description.into(),
            raw_fields: vec![],
        }
    }

    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.raw_fields.push((column.into(), value.into()));
        self
    }

    pub fn field(&self, column: &str) -> Option<&str> {
        self.raw_fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }
}

fn fields_as_map<S: Serializer>(fields: &[(String, String)], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(fields.iter().map(|(k, v)| (k, v)))
}

/// A [`ProjectRow`] together with the keywords found in its name and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedRow {
    #[serde(flatten)]
    pub row: ProjectRow,
    pub name_matches: Vec<Keyword>,
    pub description_matches: Vec<Keyword>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub name_matches: usize,
    pub description_matches: usize,
    pub any_matches: usize,
}
