use serde::{Deserialize, Serialize};

use crate::model::{AnnotatedRow, Summary};
use crate::screening::{Category, Keyword, classify};

#[derive(Debug, Deserialize, Default)]
pub struct FilterParams {
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct APIResponse {
    pub status: String,
}

impl APIResponse {
    pub fn new(msg: &str) -> Self {
        APIResponse {
            status: msg.to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse<'a> {
    pub count: usize,
    pub keywords: Vec<&'a Keyword>,
}

#[derive(Debug, Serialize)]
pub struct ProjectView<'a> {
    #[serde(flatten)]
    pub project: &'a AnnotatedRow,
    pub category: Category,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse<'a> {
    pub status: String,
    pub document: &'a str,
    pub filter: String,
    pub summary: Summary,
    pub projects: Vec<ProjectView<'a>>,
}

impl<'a> AnalysisResponse<'a> {
    pub fn new(document: &'a str, filter: String, summary: Summary, rows: &'a [AnnotatedRow]) -> Self {
        let projects = rows
            .iter()
            .map(|project| ProjectView {
                project,
                category: classify(project),
            })
            .collect();

        AnalysisResponse {
            status: format!("extracted {} projects", summary.total),
            document,
            filter,
            summary,
            projects,
        }
    }
}
