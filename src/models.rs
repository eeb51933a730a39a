use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_file: String,
    pub output_directory: Option<String>,
    #[serde(default)]
    pub export_format: ExportFormat,
    pub log_level: Option<String>,
    #[serde(default = "default_show_disclaimer")]
    pub show_disclaimer: bool,
}

fn default_show_disclaimer() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "pdf")]
    Pdf,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "csv")]
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Text => "txt",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "text" | "txt" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(QueryError {
                field: "export format",
                value: value.to_string(),
                expected: "pdf, text, csv",
            }),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: "data/mpdte_2025.xlsx".to_string(),
            output_directory: Some("output".to_string()),
            export_format: ExportFormat::Pdf,
            log_level: Some("info".to_string()),
            show_disclaimer: true,
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// Ownership/funding class of an institute, normalized from free-text synonyms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstituteType {
    GovernmentAided,
    GovernmentAutonomous,
    Private,
    SelfFinancing,
    /// Any value outside the known synonyms, kept uppercased and trimmed.
    Unrecognized(String),
}

impl InstituteType {
    pub const KNOWN: [InstituteType; 4] = [
        InstituteType::GovernmentAided,
        InstituteType::GovernmentAutonomous,
        InstituteType::Private,
        InstituteType::SelfFinancing,
    ];

    pub fn normalize(raw: &str) -> Self {
        let value = raw.to_uppercase().trim().to_string();
        match value.as_str() {
            "AIDED" | "GOVERNMENT AIDED" => InstituteType::GovernmentAided,
            "GOVT" | "GOVERNMENT AUTONOMOUS" => InstituteType::GovernmentAutonomous,
            "PRIVATE" => InstituteType::Private,
            "S.F.I" | "SELF FINANCING" => InstituteType::SelfFinancing,
            _ => InstituteType::Unrecognized(value),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstituteType::GovernmentAided => "GOVERNMENT AIDED",
            InstituteType::GovernmentAutonomous => "GOVERNMENT AUTONOMOUS",
            InstituteType::Private => "PRIVATE",
            InstituteType::SelfFinancing => "SELF FINANCING",
            InstituteType::Unrecognized(value) => value,
        }
    }
}

impl fmt::Display for InstituteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Home-state flag of an allotment row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomicileFlag {
    Yes,
    No,
    /// The literal `X` marker: seat not tied to home-state status.
    Sentinel,
    Other(String),
}

impl DomicileFlag {
    pub fn normalize(raw: &str) -> Self {
        let value = raw.to_uppercase();
        match value.as_str() {
            "D" | "YES" | "Y" => DomicileFlag::Yes,
            "NO" | "N" => DomicileFlag::No,
            "X" => DomicileFlag::Sentinel,
            _ => DomicileFlag::Other(value),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DomicileFlag::Yes => "Y",
            DomicileFlag::No => "N",
            DomicileFlag::Sentinel => "X",
            DomicileFlag::Other(value) => value,
        }
    }
}

/// Slash-delimited allotted-category token such as `UR/X/OP`.
///
/// The normalized text is kept verbatim for display and export; the segments the
/// eligibility stages look at are split out once when the tag is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTag {
    raw: String,
    category: String,
    classes: Vec<String>,
    open_seat: bool,
}

impl CategoryTag {
    pub fn new(raw: &str) -> Self {
        let normalized = normalize_category_tag(raw);
        let segments: Vec<&str> = normalized.split('/').collect();

        let category = segments.first().copied().unwrap_or_default().to_string();
        // Only segments with a slash on both sides count as a reservation class.
        let classes = if segments.len() > 2 {
            segments[1..segments.len() - 1]
                .iter()
                .map(|segment| segment.to_string())
                .collect()
        } else {
            Vec::new()
        };
        let open_seat = segments.iter().skip(1).any(|segment| segment.starts_with("OP"));

        Self {
            raw: normalized,
            category,
            classes,
            open_seat,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Leading segment, e.g. `UR` for `UR/X/OP`.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn starts_with_category(&self, code: &str) -> bool {
        self.category.starts_with(code)
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.classes.iter().any(|class| class == token)
    }

    /// Seat was allotted in the open round for its category.
    pub fn is_open_seat(&self) -> bool {
        self.open_seat
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Uppercase, drop spaces, use `/` as the only delimiter.
pub fn normalize_category_tag(raw: &str) -> String {
    raw.to_uppercase().replace(' ', "").replace('-', "/")
}

/// Uppercase, trimmed branch code.
pub fn normalize_branch(raw: &str) -> String {
    raw.to_uppercase().trim().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllotmentRecord {
    pub institute_name: String,
    pub institute_type: InstituteType,
    pub branch: String,
    pub opening_rank: f64,
    pub closing_rank: f64,
    pub allotted_category: CategoryTag,
    pub domicile: DomicileFlag,
}

/// Ranks come from a numeric spreadsheet column; whole values print without a fraction.
pub fn format_rank(rank: f64) -> String {
    if rank.fract() == 0.0 && rank.abs() < 1e15 {
        format!("{:.0}", rank)
    } else {
        rank.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomicilePreference {
    #[default]
    All,
    Yes,
    No,
}

impl FromStr for DomicilePreference {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(DomicilePreference::All),
            "YES" | "Y" => Ok(DomicilePreference::Yes),
            "NO" | "N" => Ok(DomicilePreference::No),
            _ => Err(QueryError {
                field: "domicile",
                value: value.to_string(),
                expected: "ALL, YES, NO",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryChoice {
    #[default]
    All,
    Ur,
    Obc,
    Sc,
    St,
}

impl CategoryChoice {
    /// Tag prefix for the category, `None` for `All`.
    pub fn code(self) -> Option<&'static str> {
        match self {
            CategoryChoice::All => None,
            CategoryChoice::Ur => Some("UR"),
            CategoryChoice::Obc => Some("OBC"),
            CategoryChoice::Sc => Some("SC"),
            CategoryChoice::St => Some("ST"),
        }
    }
}

impl FromStr for CategoryChoice {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(CategoryChoice::All),
            "UR" => Ok(CategoryChoice::Ur),
            "OBC" => Ok(CategoryChoice::Obc),
            "SC" => Ok(CategoryChoice::Sc),
            "ST" => Ok(CategoryChoice::St),
            _ => Err(QueryError {
                field: "category",
                value: value.to_string(),
                expected: "ALL, UR, OBC, SC, ST",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReservationClass {
    #[default]
    All,
    Nil,
    PhysicallyHandicapped,
    Sainik,
    FreedomFighter,
    TechnicalStream,
}

impl ReservationClass {
    /// Segment used inside category tags, `None` for `All`.
    pub fn token(self) -> Option<&'static str> {
        match self {
            ReservationClass::All => None,
            ReservationClass::Nil => Some("X"),
            ReservationClass::PhysicallyHandicapped => Some("H"),
            ReservationClass::Sainik => Some("S"),
            ReservationClass::FreedomFighter => Some("FF"),
            ReservationClass::TechnicalStream => Some("TS"),
        }
    }
}

impl FromStr for ReservationClass {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match key.as_str() {
            "ALL" => Ok(ReservationClass::All),
            "NIL" | "X" => Ok(ReservationClass::Nil),
            "PH" | "H" | "PHYSICALLY_HANDICAPPED" => Ok(ReservationClass::PhysicallyHandicapped),
            "SAINIK" | "S" => Ok(ReservationClass::Sainik),
            "FREEDOM_FIGHTER" | "FF" => Ok(ReservationClass::FreedomFighter),
            "TECHNICAL_STREAM" | "TS" => Ok(ReservationClass::TechnicalStream),
            _ => Err(QueryError {
                field: "class",
                value: value.to_string(),
                expected: "ALL, NIL, PH, SAINIK, FREEDOM_FIGHTER, TECHNICAL_STREAM",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstituteTypePreference {
    #[default]
    All,
    Only(InstituteType),
}

impl InstituteTypePreference {
    pub fn is_all(&self) -> bool {
        matches!(self, InstituteTypePreference::All)
    }
}

impl FromStr for InstituteTypePreference {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = value.trim().to_uppercase().replace('_', " ");
        if key == "ALL" {
            return Ok(InstituteTypePreference::All);
        }
        match InstituteType::normalize(&key) {
            InstituteType::Unrecognized(_) => Err(QueryError {
                field: "institute type",
                value: value.to_string(),
                expected: "ALL, GOVERNMENT AIDED, GOVERNMENT AUTONOMOUS, PRIVATE, SELF FINANCING",
            }),
            known => Ok(InstituteTypePreference::Only(known)),
        }
    }
}

/// One candidate's query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateProfile {
    pub rank: u32,
    pub domicile: DomicilePreference,
    pub category: CategoryChoice,
    pub reservation_class: ReservationClass,
    pub institute_type: InstituteTypePreference,
}

impl CandidateProfile {
    /// Profile with every choice left at `ALL`.
    pub fn new(rank: u32) -> Self {
        Self {
            rank,
            domicile: DomicilePreference::All,
            category: CategoryChoice::All,
            reservation_class: ReservationClass::All,
            institute_type: InstituteTypePreference::All,
        }
    }
}
