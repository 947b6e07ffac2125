//! CSV and XLSX serialization of annotated rows.
//!
//! Every export uses the same column layout: name, description, any extra
//! columns found by the parser, then the two keyword columns. An empty match
//! list is written as `None`.

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::model::AnnotatedRow;
use crate::screening::{Analysis, Category, Keyword, View};

pub const NAME_COLUMN: &str = "Project Name";
pub const DESCRIPTION_COLUMN: &str = "Project Description";
pub const NAME_MATCHES_COLUMN: &str = "Keywords Found in Project Name";
pub const DESCRIPTION_MATCHES_COLUMN: &str = "Keywords Found in Project Description";
pub const NO_MATCHES: &str = "None";

pub const FILTERED_SHEET: &str = "Filtered Projects";
pub const ALL_SHEET: &str = "All Projects";
pub const LIVESTOCK_SHEET: &str = "Livestock Projects";
pub const SUMMARY_SHEET: &str = "Summary";

const NAME_WIDTH: f64 = 40.0;
const DESCRIPTION_WIDTH: f64 = 80.0;
const FIELD_WIDTH: f64 = 18.0;
const MATCHES_WIDTH: f64 = 36.0;

/// Longest string Excel accepts in a single cell.
const CELL_MAX_CHARS: usize = 32_767;

pub fn join_matches(keywords: &[Keyword]) -> String {
    if keywords.is_empty() {
        return NO_MATCHES.to_string();
    }
    keywords.iter().map(Keyword::as_str).collect::<Vec<_>>().join(", ")
}

/// Cuts `value` to what fits in one worksheet cell. CSV output is never cut.
fn cell_text(value: &str) -> &str {
    match value.char_indices().nth(CELL_MAX_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Extra columns across all rows, in first-seen order.
fn extra_columns(rows: &[AnnotatedRow]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for (column, _) in rows.iter().flat_map(|r| r.row.raw_fields.iter()) {
        if !columns.contains(&column.as_str()) {
            columns.push(column);
        }
    }
    columns
}

fn header(extra: &[&str]) -> Vec<String> {
    let mut header = vec![NAME_COLUMN.to_string(), DESCRIPTION_COLUMN.to_string()];
    header.extend(extra.iter().map(|c| c.to_string()));
    header.push(NAME_MATCHES_COLUMN.to_string());
    header.push(DESCRIPTION_MATCHES_COLUMN.to_string());
    header
}

fn record(row: &AnnotatedRow, extra: &[&str]) -> Vec<String> {
    let mut record = vec![row.row.name.clone(), row.row.description.clone()];
    record.extend(
        extra
            .iter()
            .map(|c| row.row.field(c).unwrap_or_default().to_string()),
    );
    record.push(join_matches(&row.name_matches));
    record.push(join_matches(&row.description_matches));
    record
}

pub fn write_csv<W: Write>(rows: &[AnnotatedRow], writer: W) -> Result<(), ExportError> {
    let extra = extra_columns(rows);
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(header(&extra))?;
    for row in rows {
        wtr.write_record(record(row, &extra))?;
    }
    wtr.flush()?;

    Ok(())
}

pub fn csv_bytes(rows: &[AnnotatedRow]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    Ok(buf)
}

fn write_rows_sheet(worksheet: &mut Worksheet, rows: &[AnnotatedRow]) -> Result<(), ExportError> {
    let bold = Format::new().set_bold();
    let wrap = Format::new().set_text_wrap();
    let extra = extra_columns(rows);

    for (col, title) in header(&extra).iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title, &bold)?;
    }

    let last = extra.len() as u16 + 2;
    worksheet.set_column_width(0, NAME_WIDTH)?;
    worksheet.set_column_width(1, DESCRIPTION_WIDTH)?;
    for col in 2..last {
        worksheet.set_column_width(col, FIELD_WIDTH)?;
    }
    worksheet.set_column_width(last, MATCHES_WIDTH)?;
    worksheet.set_column_width(last + 1, MATCHES_WIDTH)?;
    worksheet.set_freeze_panes(1, 0)?;

    for (i, row) in rows.iter().enumerate() {
        let line = i as u32 + 1;
        for (col, value) in record(row, &extra).iter().enumerate() {
            let value = cell_text(value);
            if col == 1 {
                worksheet.write_string_with_format(line, col as u16, value, &wrap)?;
            } else {
                worksheet.write_string(line, col as u16, value)?;
            }
        }
    }

    Ok(())
}

fn add_rows_sheet(workbook: &mut Workbook, name: &str, rows: &[AnnotatedRow]) -> Result<(), ExportError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;
    write_rows_sheet(worksheet, rows)
}

/// Workbook offered for download from the web interface: the selected rows
/// and the complete result set.
pub fn analysis_workbook(analysis: &Analysis, view: View) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    add_rows_sheet(&mut workbook, FILTERED_SHEET, &analysis.select(view))?;
    add_rows_sheet(&mut workbook, ALL_SHEET, &analysis.rows)?;
    Ok(workbook.save_to_buffer()?)
}

#[derive(Debug)]
struct Metric {
    name: &'static str,
    value: MetricValue,
}

#[derive(Debug)]
enum MetricValue {
    Count(usize),
    Text(String),
}

fn summary_metrics(analysis: &Analysis, processed_at: DateTime<Local>) -> Vec<Metric> {
    let s = analysis.summary;
    vec![
        Metric { name: "Total Projects", value: MetricValue::Count(s.total) },
        Metric { name: "Projects with Name Matches", value: MetricValue::Count(s.name_matches) },
        Metric {
            name: "Projects with Description Matches",
            value: MetricValue::Count(s.description_matches),
        },
        Metric { name: "Projects with Any Matches", value: MetricValue::Count(s.any_matches) },
        Metric {
            name: "Processing Date",
            value: MetricValue::Text(processed_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        },
        Metric { name: "Source File", value: MetricValue::Text(analysis.document.clone()) },
    ]
}

/// Workbook written by the batch processor: all rows, rows with any match
/// (only when there are some) and a summary sheet.
pub fn report_workbook(analysis: &Analysis, processed_at: DateTime<Local>) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    add_rows_sheet(&mut workbook, ALL_SHEET, &analysis.rows)?;

    let livestock = analysis.select(View::Only(Category::AnyMatch));
    if !livestock.is_empty() {
        add_rows_sheet(&mut workbook, LIVESTOCK_SHEET, &livestock)?;
    }

    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SUMMARY_SHEET)?;
    worksheet.write_string_with_format(0, 0, "Metric", &bold)?;
    worksheet.write_string_with_format(0, 1, "Value", &bold)?;
    worksheet.set_column_width(0, 36.0)?;
    worksheet.set_column_width(1, 28.0)?;

    for (i, metric) in summary_metrics(analysis, processed_at).iter().enumerate() {
        let line = i as u32 + 1;
        worksheet.write_string(line, 0, metric.name)?;
        match &metric.value {
            MetricValue::Count(n) => worksheet.write_number(line, 1, *n as f64)?,
            MetricValue::Text(t) => worksheet.write_string(line, 1, cell_text(t))?,
        };
    }

    Ok(workbook.save_to_buffer()?)
}

/// Output file stem for a processed document, e.g.
/// `portfolio_livestock_analysis_20240131_154500`.
pub fn report_stem(document: &str, processed_at: DateTime<Local>) -> String {
    let stem = Path::new(document)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    format!("{}_livestock_analysis_{}", stem, processed_at.format("%Y%m%d_%H%M%S"))
}

/// Writes the CSV and XLSX report for one document into `output_dir`.
///
/// Both files are rendered in memory first, so a failed export leaves
/// nothing behind for that document.
pub fn save_report(
    analysis: &Analysis,
    output_dir: &Path,
    processed_at: DateTime<Local>,
) -> Result<(PathBuf, PathBuf), ExportError> {
    let workbook = report_workbook(analysis, processed_at)?;
    let csv = csv_bytes(&analysis.rows)?;

    std::fs::create_dir_all(output_dir)?;
    let stem = report_stem(&analysis.document, processed_at);
    let csv_path = output_dir.join(format!("{}.csv", stem));
    let xlsx_path = output_dir.join(format!("{}.xlsx", stem));

    std::fs::write(&xlsx_path, workbook)?;
    if let Err(e) = std::fs::write(&csv_path, csv) {
        let _ = std::fs::remove_file(&xlsx_path);
        return Err(e.into());
    }

    Ok((csv_path, xlsx_path))
}
