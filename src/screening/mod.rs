//! Screening Module
//!
//! Flags livestock and agriculture related projects in a document by matching
//! a fixed keyword list against each project's name and description.
//!
//! # Pipeline
//!
//! - [`normalize`] folds case, accents and white space
//! - [`find_keywords`] returns the keywords contained in a text, in keyword-set order
//! - [`annotate`] attaches name and description matches to a row
//! - [`classify`] and [`View`] select rows for display and export
//!
//! Matching is substring based without word boundaries: "egg" matches
//! "eggplant".
//!
//! # Usage
//!
//! ```rust,ignore
//! use agrifilter::screening;
//!
//! let keywords = screening::KeywordSet::from_file(Path::new("keywords.txt"))?;
//! let analysis = screening::analyze_document(&bytes, "portfolio.pdf", &keywords)?;
//! let livestock = screening::filter_rows(&analysis.rows, "any".parse()?);
//! ```

mod filter;
mod handler;
mod keywords;
mod matcher;
mod normalize;
mod routes;

pub use filter::{Category, View, classify, filter_rows, summarize};
pub use keywords::{Keyword, KeywordSet};
pub use matcher::{MatchResult, annotate, annotate_all, find_keywords, match_field};
pub use normalize::normalize;
pub use routes::routes;

use crate::error::InputError;
use crate::extract::{extract_text, parse_projects};
use crate::model::{AnnotatedRow, Summary};

/// Annotated rows of one source document.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub document: String,
    pub rows: Vec<AnnotatedRow>,
    pub summary: Summary,
}

impl Analysis {
    pub fn select(&self, view: View) -> Vec<AnnotatedRow> {
        filter_rows(&self.rows, view)
    }
}

/// Extracts, parses and annotates a PDF. Nothing is returned for a document
/// that fails extraction.
pub fn analyze_document(
    bytes: &[u8],
    document: &str,
    keywords: &KeywordSet,
) -> Result<Analysis, InputError> {
    let text = extract_text(bytes, document)?;
    Ok(analyze_text(&text, document, keywords))
}

pub fn analyze_text(text: &str, document: &str, keywords: &KeywordSet) -> Analysis {
    let projects = parse_projects(text, document);
    let rows = annotate_all(&projects, keywords);
    let summary = summarize(&rows);

    tracing::info!(
        document,
        total = summary.total,
        name_matches = summary.name_matches,
        description_matches = summary.description_matches,
        any_matches = summary.any_matches,
        "analyzed document"
    );

    Analysis {
        document: document.to_string(),
        rows,
        summary,
    }
}
