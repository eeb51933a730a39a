//! Reads the allotment table and normalizes it into [`AllotmentRecord`]s.
//!
//! The table is the first sheet of a workbook (`.xlsx` and the other formats
//! calamine opens) or a CSV file; both go through [`RawAllotmentRow::normalize`].

use crate::error::DatasetError;
use crate::models::{
    normalize_branch, AllotmentRecord, CategoryTag, DomicileFlag, InstituteType,
};
use calamine::{open_workbook_auto, Data, Reader};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

pub const INSTITUTE_NAME: &str = "INSTITUTE NAME";
pub const INSTITUTE_TYPE: &str = "INSTITUTE TYPE";
pub const BRANCH: &str = "BRANCH";
pub const OPENING_RANK: &str = "OPENING JEE COMMON RANK";
pub const CLOSING_RANK: &str = "CLOSING JEE COMMON RANK";
pub const ALLOTTED_CATEGORY: &str = "ALLOTTED CATEGORY";
pub const DOMICILE: &str = "DOMICILE";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    INSTITUTE_NAME,
    INSTITUTE_TYPE,
    BRANCH,
    OPENING_RANK,
    CLOSING_RANK,
    ALLOTTED_CATEGORY,
    DOMICILE,
];

static SNAPSHOT: OnceLock<Dataset> = OnceLock::new();

/// One row as it appears in the source file, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawAllotmentRow {
    #[serde(rename = "INSTITUTE NAME")]
    pub institute_name: Option<String>,
    #[serde(rename = "INSTITUTE TYPE")]
    pub institute_type: Option<String>,
    #[serde(rename = "BRANCH")]
    pub branch: Option<String>,
    #[serde(rename = "OPENING JEE COMMON RANK")]
    pub opening_rank: Option<String>,
    #[serde(rename = "CLOSING JEE COMMON RANK")]
    pub closing_rank: Option<String>,
    #[serde(rename = "ALLOTTED CATEGORY")]
    pub allotted_category: Option<String>,
    #[serde(rename = "DOMICILE")]
    pub domicile: Option<String>,
}

impl RawAllotmentRow {
    /// Normalize every field; `None` when a required field is blank or a rank is not numeric.
    pub fn normalize(&self) -> Option<AllotmentRecord> {
        let institute_name = non_blank(&self.institute_name)?.to_string();
        let institute_type = InstituteType::normalize(non_blank(&self.institute_type)?);
        let branch = normalize_branch(non_blank(&self.branch)?);
        let opening_rank = parse_rank(self.opening_rank.as_deref())?;
        let closing_rank = parse_rank(self.closing_rank.as_deref())?;
        let allotted_category = CategoryTag::new(non_blank(&self.allotted_category)?);
        if allotted_category.as_str().is_empty() {
            return None;
        }
        let domicile = DomicileFlag::normalize(self.domicile.as_deref().unwrap_or_default());

        Some(AllotmentRecord {
            institute_name,
            institute_type,
            branch,
            opening_rank,
            closing_rank,
            allotted_category,
            domicile,
        })
    }

    /// Render a normalized record back into source-row form.
    pub fn from_record(record: &AllotmentRecord) -> Self {
        Self {
            institute_name: Some(record.institute_name.clone()),
            institute_type: Some(record.institute_type.as_str().to_string()),
            branch: Some(record.branch.clone()),
            opening_rank: Some(record.opening_rank.to_string()),
            closing_rank: Some(record.closing_rank.to_string()),
            allotted_category: Some(record.allotted_category.as_str().to_string()),
            domicile: Some(record.domicile.as_str().to_string()),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn parse_rank(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|rank| rank.is_finite())
}

/// The normalized, read-only allotment table.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<AllotmentRecord>,
    rows_read: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSummary {
    pub institutes: usize,
    pub branches: usize,
    pub total_options: usize,
}

impl Dataset {
    pub fn records(&self) -> &[AllotmentRecord] {
        &self.records
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Source rows discarded during normalization.
    pub fn dropped_rows(&self) -> usize {
        self.rows_read - self.records.len()
    }

    pub fn summary(&self) -> DatasetSummary {
        let institutes: HashSet<&str> = self
            .records
            .iter()
            .map(|record| record.institute_name.as_str())
            .collect();
        let branches: HashSet<&str> = self
            .records
            .iter()
            .map(|record| record.branch.as_str())
            .collect();

        DatasetSummary {
            institutes: institutes.len(),
            branches: branches.len(),
            total_options: self.records.len(),
        }
    }
}

/// On-disk layout of the allotment table, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Workbook),
            "csv" => Some(SourceFormat::Csv),
            _ => None,
        }
    }
}

/// Load and normalize the dataset at `path`.
pub fn load(path: &Path) -> Result<Dataset, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::Unavailable {
            path: path.to_path_buf(),
        });
    }

    match SourceFormat::from_path(path) {
        Some(SourceFormat::Workbook) => read_workbook(path),
        Some(SourceFormat::Csv) => {
            let file = File::open(path).map_err(|e| DatasetError::Read {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
            read_dataset(file, path)
        }
        None => Err(DatasetError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Normalize the first sheet of the workbook at `path`.
pub fn read_workbook(path: &Path) -> Result<Dataset, DatasetError> {
    let workbook_error = |source: calamine::Error| DatasetError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DatasetError::NoWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(workbook_error)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| {
            row.iter()
                .map(|cell| cell_text(cell).unwrap_or_default().trim().to_string())
                .collect()
        })
        .unwrap_or_default();
    let columns = resolve_columns(headers.iter().map(String::as_str), path)?;

    let mut tally = RowTally::default();
    for (index, row) in rows.enumerate() {
        let cell = |column: usize| row.get(columns[column]).and_then(cell_text);
        let raw = RawAllotmentRow {
            institute_name: cell(0),
            institute_type: cell(1),
            branch: cell(2),
            opening_rank: cell(3),
            closing_rank: cell(4),
            allotted_category: cell(5),
            domicile: cell(6),
        };
        // Header is row 1.
        tally.accept(index + 2, &raw);
    }

    tally.finish(path)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Position of every entry of [`REQUIRED_COLUMNS`] in the header row, in that order.
fn resolve_columns<'h>(
    headers: impl IntoIterator<Item = &'h str>,
    source: &Path,
) -> Result<[usize; REQUIRED_COLUMNS.len()], DatasetError> {
    let headers: Vec<&str> = headers.into_iter().collect();
    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, column) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|header| *header == column)
            .ok_or_else(|| DatasetError::MissingColumn {
                column,
                path: source.to_path_buf(),
            })?;
    }
    Ok(columns)
}

#[derive(Default)]
struct RowTally {
    rows_read: usize,
    records: Vec<AllotmentRecord>,
}

impl RowTally {
    fn accept(&mut self, line: usize, raw: &RawAllotmentRow) {
        self.rows_read += 1;
        match raw.normalize() {
            Some(record) => self.records.push(record),
            None => debug!(line, "dropping incomplete allotment row"),
        }
    }

    fn reject(&mut self, line: usize, error: &dyn Display) {
        self.rows_read += 1;
        debug!(line, error = %error, "dropping unreadable allotment row");
    }

    fn finish(self, source: &Path) -> Result<Dataset, DatasetError> {
        let RowTally { rows_read, records } = self;
        if rows_read > 0 && records.is_empty() {
            return Err(DatasetError::Unparseable {
                path: source.to_path_buf(),
                rows: rows_read,
            });
        }

        info!(
            path = %source.display(),
            rows_read,
            kept = records.len(),
            "allotment dataset loaded"
        );

        Ok(Dataset { records, rows_read })
    }
}

/// Normalize a CSV stream; `source` is only used in errors and logs.
pub fn read_dataset<R: Read>(reader: R, source: &Path) -> Result<Dataset, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| DatasetError::Read {
            path: source.to_path_buf(),
            source: e,
        })?
        .clone();
    resolve_columns(headers.iter(), source)?;

    let mut tally = RowTally::default();
    for (index, row) in csv_reader.deserialize::<RawAllotmentRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        match row {
            Ok(raw) => tally.accept(line, &raw),
            Err(e) if e.is_io_error() => {
                return Err(DatasetError::Read {
                    path: source.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => tally.reject(line, &e),
        }
    }

    tally.finish(source)
}

/// Process-wide dataset, loaded from `path` on first call and reused afterwards.
///
/// Later calls return the first snapshot regardless of `path`.
pub fn snapshot(path: &Path) -> Result<&'static Dataset, DatasetError> {
    if let Some(dataset) = SNAPSHOT.get() {
        return Ok(dataset);
    }
    let dataset = load(path)?;
    Ok(SNAPSHOT.get_or_init(|| dataset))
}
