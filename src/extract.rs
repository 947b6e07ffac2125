//! Text extraction from PDF uploads and heuristic recovery of project rows.

use crate::error::InputError;
use crate::model::ProjectRow;

const MAX_CHUNKS: usize = 10;
const CHUNK_LINE_MIN_CHARS: usize = 50;
const CHUNK_MIN_CHARS: usize = 100;
const SECTION_TITLE_MAX_CHARS: usize = 100;
const FALLBACK_DESCRIPTION_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Name,
    Description,
    Field(&'static str),
}

const LABELS: &[(&str, Label)] = &[
    ("project name:", Label::Name),
    ("project:", Label::Name),
    ("title:", Label::Name),
    ("nombre del proyecto:", Label::Name),
    ("project description:", Label::Description),
    ("description:", Label::Description),
    ("summary:", Label::Description),
    ("descripción:", Label::Description),
    ("budget:", Label::Field("Budget")),
    ("cost:", Label::Field("Cost")),
    ("date:", Label::Field("Date")),
];

/// Pulls the text layer out of a PDF held in memory.
pub fn extract_text(bytes: &[u8], document: &str) -> Result<String, InputError> {
    if !looks_like_pdf(bytes) {
        return Err(InputError::NotPdf {
            document: document.to_string(),
        });
    }

    // pdf-extract panics on some malformed inputs instead of returning an error
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| InputError::Unreadable {
            document: document.to_string(),
            reason: "pdf parser panicked".to_string(),
        })?
        .map_err(|e| InputError::Unreadable {
            document: document.to_string(),
            reason: e.to_string(),
        })?;

    if text.trim().is_empty() {
        return Err(InputError::NoText {
            document: document.to_string(),
        });
    }

    Ok(text)
}

/// The `%PDF-` header may be preceded by garbage within the first kilobyte.
fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

/// Recovers project rows from extracted text.
///
/// Strategies are tried in order until one yields rows: labelled records,
/// a whitespace separated table, long-paragraph sections and finally a
/// single row covering the start of the document. The result is never empty.
pub fn parse_projects(text: &str, document: &str) -> Vec<ProjectRow> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let projects = parse_labelled(&lines);
    if !projects.is_empty() {
        return projects;
    }

    tracing::debug!(document, "no labelled projects, trying table layout");
    let projects = parse_table(&lines);
    if !projects.is_empty() {
        return projects;
    }

    tracing::debug!(document, "no table layout, splitting into sections");
    let projects = parse_sections(&lines);
    if !projects.is_empty() {
        return projects;
    }

    tracing::debug!(document, "falling back to whole document row");
    vec![ProjectRow::new(
        format!("Full Document Analysis - {}", document),
        text.chars().take(FALLBACK_DESCRIPTION_CHARS).collect::<String>(),
    )]
}

/// Finds the label that starts earliest in the line and returns it together
/// with the text after its colon. On a tie the longer label wins.
fn classify_line(line: &str) -> Option<(Label, String)> {
    let lower = line.to_lowercase();

    let (pos, pattern, label) = LABELS
        .iter()
        .filter_map(|(pattern, label)| lower.find(pattern).map(|pos| (pos, *pattern, *label)))
        .min_by_key(|(pos, pattern, _)| (*pos, std::cmp::Reverse(pattern.len())))?;

    // lowercasing can change byte offsets but never the number of colons
    let colons = lower[..pos + pattern.len()].matches(':').count();
    let value = line.splitn(colons + 1, ':').nth(colons).unwrap_or("").trim();

    Some((label, value.to_string()))
}

fn append(target: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

fn set_field(row: &mut ProjectRow, column: &str, value: String) {
    match row.raw_fields.iter_mut().find(|(c, _)| c == column) {
        Some((_, existing)) => *existing = value,
        None => row.raw_fields.push((column.to_string(), value)),
    }
}

fn parse_labelled(lines: &[&str]) -> Vec<ProjectRow> {
    let mut projects = Vec::new();
    let mut current: Option<ProjectRow> = None;

    for line in lines {
        match classify_line(line) {
            Some((Label::Name, value)) => {
                projects.extend(current.take());
                current = Some(ProjectRow::new(value, ""));
            }
            Some((Label::Description, value)) => {
                if let Some(project) = current.as_mut() {
                    append(&mut project.description, &value);
                }
            }
            Some((Label::Field(column), value)) => {
                if let Some(project) = current.as_mut() {
                    set_field(project, column, value);
                }
            }
            None => {
                if let Some(project) = current.as_mut() {
                    append(&mut project.description, line);
                }
            }
        }
    }

    projects.extend(current);
    projects
}

fn parse_table(lines: &[&str]) -> Vec<ProjectRow> {
    let header = lines.iter().position(|line| {
        let lower = line.to_lowercase();
        lower.contains("project") && (lower.contains("name") || lower.contains("title"))
    });

    let Some(header) = header else {
        return vec![];
    };

    lines[header + 1..]
        .iter()
        .filter_map(|line| line.split_once(char::is_whitespace))
        .map(|(name, rest)| ProjectRow::new(name, rest.trim()))
        .filter(|row| !row.description.is_empty())
        .collect()
}

fn parse_sections(lines: &[&str]) -> Vec<ProjectRow> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let mut flush = |current: &mut Vec<&str>| {
        let chunk = current.join(" ");
        if chunk.chars().count() > CHUNK_MIN_CHARS {
            chunks.push(chunk);
        }
        current.clear();
    };

    for line in lines {
        if line.chars().count() > CHUNK_LINE_MIN_CHARS {
            current.push(*line);
        } else if !current.is_empty() {
            flush(&mut current);
        }
    }
    if !current.is_empty() {
        flush(&mut current);
    }

    chunks
        .into_iter()
        .take(MAX_CHUNKS)
        .enumerate()
        .map(|(i, chunk)| {
            let title: String = chunk
                .split('.')
                .next()
                .unwrap_or("")
                .trim()
                .chars()
                .take(SECTION_TITLE_MAX_CHARS)
                .collect();
            ProjectRow::new(format!("Section {}: {}", i + 1, title), chunk)
        })
        .collect()
}
