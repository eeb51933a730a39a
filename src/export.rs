//! Downloadable eligible-list documents.
//!
//! A document is laid out once into pages of positioned lines; the PDF and text
//! renderers both consume that layout, so page breaks match across formats.

use crate::error::ExportError;
use crate::models::{format_rank, AllotmentRecord, ExportFormat};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

pub const TITLE: &str = "MPDTE Eligible College List";
pub const FILE_SUFFIX: &str = "MPDTE_Eligible_List";

const POINTS_TO_MM: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub position: usize,
    pub institute_name: String,
    pub branch: String,
    pub allotted_category: String,
    pub opening_rank: f64,
    pub closing_rank: f64,
}

impl ListEntry {
    pub fn line(&self) -> String {
        format!(
            "{}. {} | {} | {} | OR:{} | CR:{}",
            self.position,
            self.institute_name,
            self.branch,
            self.allotted_category,
            format_rank(self.opening_rank),
            format_rank(self.closing_rank)
        )
    }
}

/// Ranked, ungrouped seat list for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibleListDocument {
    pub candidate_name: String,
    pub candidate_rank: u32,
    pub entries: Vec<ListEntry>,
}

impl EligibleListDocument {
    pub fn new(candidate_name: &str, candidate_rank: u32, sorted: &[&AllotmentRecord]) -> Self {
        let entries = sorted
            .iter()
            .enumerate()
            .map(|(index, record)| ListEntry {
                position: index + 1,
                institute_name: record.institute_name.clone(),
                branch: record.branch.clone(),
                allotted_category: record.allotted_category.as_str().to_string(),
                opening_rank: record.opening_rank,
                closing_rank: record.closing_rank,
            })
            .collect();

        Self {
            candidate_name: candidate_name.to_string(),
            candidate_rank,
            entries,
        }
    }

    pub fn candidate_line(&self) -> String {
        format!("Name: {} | CRL: {}", self.candidate_name, self.candidate_rank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// Baseline, in points from the bottom edge.
    pub y: f32,
    pub style: LineStyle,
}

pub type Page = Vec<PlacedLine>;

/// Vertical space budget of a page, in points. Defaults to A4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub page_top: f32,
    pub page_bottom: f32,
    pub margin_left: f32,
    pub title_gap: f32,
    pub header_gap: f32,
    pub line_height: f32,
    pub title_size: f32,
    pub body_size: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            page_top: 800.0,
            page_bottom: 50.0,
            margin_left: 40.0,
            title_gap: 25.0,
            header_gap: 20.0,
            line_height: 14.0,
            title_size: 14.0,
            body_size: 10.0,
        }
    }
}

impl PageLayout {
    /// Place the title, the candidate line and every entry; a new page starts
    /// once the cursor drops below the bottom margin.
    pub fn paginate(&self, document: &EligibleListDocument) -> Vec<Page> {
        let mut pages = Vec::new();
        let mut page = Vec::new();
        let mut y = self.page_top;

        page.push(PlacedLine {
            text: TITLE.to_string(),
            y,
            style: LineStyle::Title,
        });
        y -= self.title_gap;
        page.push(PlacedLine {
            text: document.candidate_line(),
            y,
            style: LineStyle::Body,
        });
        y -= self.header_gap;

        for entry in &document.entries {
            page.push(PlacedLine {
                text: entry.line(),
                y,
                style: LineStyle::Body,
            });
            y -= self.line_height;
            if y < self.page_bottom {
                pages.push(std::mem::take(&mut page));
                y = self.page_top;
            }
        }

        if !page.is_empty() {
            pages.push(page);
        }
        pages
    }
}

/// Pages separated by form feeds.
pub fn render_text(pages: &[Page]) -> String {
    pages
        .iter()
        .map(|page| {
            let mut text = page
                .iter()
                .map(|line| line.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            text.push('\n');
            text
        })
        .collect::<Vec<_>>()
        .join("\u{c}")
}

pub fn render_pdf(pages: &[Page], layout: &PageLayout) -> Result<Vec<u8>, ExportError> {
    let width = Mm(layout.page_width * POINTS_TO_MM);
    let height = Mm(layout.page_height * POINTS_TO_MM);

    let (document, first_page, first_layer) = PdfDocument::new(TITLE, width, height, "Layer 1");
    let regular = document
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = document
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let mut first = Some((first_page, first_layer));
    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = match first.take() {
            Some(indices) => indices,
            None => document.add_page(width, height, format!("Layer {}", index + 1)),
        };
        let layer = document.get_page(page_index).get_layer(layer_index);

        for line in page {
            let (font, size) = match line.style {
                LineStyle::Title => (&bold, layout.title_size),
                LineStyle::Body => (&regular, layout.body_size),
            };
            layer.use_text(
                line.text.clone(),
                size,
                Mm(layout.margin_left * POINTS_TO_MM),
                Mm(line.y * POINTS_TO_MM),
                font,
            );
        }
    }

    document.save_to_bytes().map_err(pdf_error)
}

fn pdf_error(e: printpdf::Error) -> ExportError {
    ExportError::Pdf {
        message: e.to_string(),
    }
}

fn file_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[^\p{L}\p{M}\p{N}_-]+").expect("file name pattern is valid")
    })
}

/// `<name>_MPDTE_Eligible_List.<ext>`. Letters and digits of any script are kept;
/// separators, punctuation and whitespace become `_`.
pub fn document_file_name(candidate_name: &str, format: ExportFormat) -> String {
    let safe_name = file_name_pattern().replace_all(candidate_name.trim(), "_");
    let safe_name = safe_name.trim_matches('_');
    let safe_name = if safe_name.is_empty() {
        "candidate"
    } else {
        safe_name
    };
    format!("{}_{}.{}", safe_name, FILE_SUFFIX, format.extension())
}

pub struct DocumentExporter {
    pub layout: PageLayout,
    pub output_directory: PathBuf,
}

impl DocumentExporter {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            layout: PageLayout::default(),
            output_directory: output_directory.into(),
        }
    }

    /// Write the document and return its path.
    pub fn export(
        &self,
        document: &EligibleListDocument,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.output_directory).map_err(|e| ExportError::Io {
            path: self.output_directory.clone(),
            source: e,
        })?;
        let path = self
            .output_directory
            .join(document_file_name(&document.candidate_name, format));

        match format {
            ExportFormat::Pdf => {
                let pages = self.layout.paginate(document);
                debug!(pages = pages.len(), "rendering PDF");
                let bytes = render_pdf(&pages, &self.layout)?;
                write_file(&path, &bytes)?;
            }
            ExportFormat::Text => {
                let pages = self.layout.paginate(document);
                write_file(&path, render_text(&pages).as_bytes())?;
            }
            ExportFormat::Csv => write_csv(&path, document)?,
        }

        Ok(path)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    fs::write(path, bytes).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_csv(path: &Path, document: &EligibleListDocument) -> Result<(), ExportError> {
    use csv::Writer;

    let csv_error = |e: csv::Error| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = Writer::from_path(path).map_err(csv_error)?;
    writer
        .write_record([
            "#",
            "INSTITUTE NAME",
            "BRANCH",
            "ALLOTTED CATEGORY",
            "OPENING JEE COMMON RANK",
            "CLOSING JEE COMMON RANK",
        ])
        .map_err(csv_error)?;

    for entry in &document.entries {
        writer
            .write_record([
                entry.position.to_string(),
                entry.institute_name.clone(),
                entry.branch.clone(),
                entry.allotted_category.clone(),
                format_rank(entry.opening_rank),
                format_rank(entry.closing_rank),
            ])
            .map_err(csv_error)?;
    }

    writer.flush().map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
