use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use super::normalize::normalize;
use crate::error::KeywordError;

/// A keyword in normalized form. Only constructed through [`KeywordSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Keyword {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Ordered, deduplicated keyword list. Loaded once and shared read-only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    /// Builds the set from raw entries. Entries are normalized; blank entries
    /// and entries whose normalized form was already seen are dropped, so the
    /// first occurrence fixes the position.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();

        for entry in entries {
            let normalized = normalize(entry.as_ref());
            if normalized.is_empty() || !seen.insert(normalized.clone()) {
                continue;
            }
            keywords.push(Keyword(normalized));
        }

        KeywordSet { keywords }
    }

    /// Parses a newline-delimited keyword list.
    pub fn parse(source: &str) -> Self {
        Self::from_entries(source.lines())
    }

    pub fn from_file(path: &Path) -> Result<Self, KeywordError> {
        let source = std::fs::read_to_string(path).map_err(|e| KeywordError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let set = Self::parse(&source);
        if set.is_empty() {
            tracing::warn!(path = %path.display(), "keyword file is empty, no project will match");
        } else {
            tracing::info!(path = %path.display(), count = set.len(), "loaded keywords");
        }

        Ok(set)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyword> {
        self.keywords.iter()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a Keyword;
    type IntoIter = std::slice::Iter<'a, Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}
