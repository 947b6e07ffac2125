use agrifilter::export;
use agrifilter::screening::{KeywordSet, analyze_document};
use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "agrifilter-batch")]
#[command(about = "Screen local PDF files for livestock related projects")]
struct Cli {
    /// Directory scanned for PDF files
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    /// Directory receiving the CSV and XLSX reports
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    #[arg(short, long, default_value = "keywords.txt")]
    keywords_file: PathBuf,

    /// Process a single PDF instead of the whole input directory
    #[arg(short, long)]
    file: Option<PathBuf>,
}

fn is_pdf(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut pdfs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_pdf(path))
        .collect();
    pdfs.sort();
    Ok(pdfs)
}

fn process_file(path: &Path, keywords: &KeywordSet, output_dir: &Path) -> Result<()> {
    let document = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf")
        .to_string();

    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let analysis = analyze_document(&bytes, &document, keywords)?;

    let (csv_path, xlsx_path) = export::save_report(&analysis, output_dir, Local::now())?;
    tracing::info!(
        document = %document,
        csv = %csv_path.display(),
        xlsx = %xlsx_path.display(),
        "saved report"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_target(false).init();

    let keywords = KeywordSet::from_file(&cli.keywords_file)?;
    if keywords.is_empty() {
        bail!("no keywords loaded from {}", cli.keywords_file.display());
    }

    let pdfs = match &cli.file {
        Some(file) => {
            if !file.is_file() {
                bail!("file not found: {}", file.display());
            }
            vec![file.clone()]
        }
        None => find_pdfs(&cli.input_dir)?,
    };

    if pdfs.is_empty() {
        bail!(
            "no PDF files found in {}, place PDF files there or pass --input-dir",
            cli.input_dir.display()
        );
    }

    tracing::info!(
        files = pdfs.len(),
        keywords = keywords.len(),
        output_dir = %cli.output_dir.display(),
        "processing documents"
    );

    let mut processed = 0;
    for pdf in &pdfs {
        match process_file(pdf, &keywords, &cli.output_dir) {
            Ok(()) => processed += 1,
            Err(e) => tracing::error!(file = %pdf.display(), error = %format!("{:#}", e), "failed to process"),
        }
    }

    tracing::info!("processing complete: {}/{} files", processed, pdfs.len());
    Ok(())
}
