use rayon::prelude::*;
use serde::Serialize;

use super::keywords::{Keyword, KeywordSet};
use super::normalize::normalize;
use crate::model::{AnnotatedRow, ProjectRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched: bool,
    pub keywords: Vec<Keyword>,
}

/// Keywords that occur in `text`, in keyword-set order, each at most once.
///
/// Matching is plain substring containment on the normalized forms, so
/// "egg" is found inside "eggplant".
pub fn find_keywords(text: &str, keywords: &KeywordSet) -> Vec<Keyword> {
    if keywords.is_empty() {
        return vec![];
    }

    let text = normalize(text);
    if text.is_empty() {
        return vec![];
    }

    // Keyword values are already normalized and unique within the set.
    keywords
        .iter()
        .filter(|keyword| text.contains(keyword.as_str()))
        .cloned()
        .collect()
}

pub fn match_field(text: &str, keywords: &KeywordSet) -> MatchResult {
    let keywords = find_keywords(text, keywords);
    MatchResult {
        matched: !keywords.is_empty(),
        keywords,
    }
}

pub fn annotate(row: &ProjectRow, keywords: &KeywordSet) -> AnnotatedRow {
    AnnotatedRow {
        name_matches: find_keywords(&row.name, keywords),
        description_matches: find_keywords(&row.description, keywords),
        row: row.clone(),
    }
}

/// Annotates every row. Rows are independent, so the work is spread across
/// the rayon pool; output order follows input order.
pub fn annotate_all(rows: &[ProjectRow], keywords: &KeywordSet) -> Vec<AnnotatedRow> {
    rows.par_iter().map(|row| annotate(row, keywords)).collect()
}
