//! Eligibility filter and report generator for MPDTE B.Tech counselling.
//!
//! Data flows one way: [`loader`] → [`analyzer`] → [`ranking`] → [`report`] /
//! [`export`].

pub mod analyzer;
pub mod error;
pub mod export;
pub mod loader;
pub mod models;
pub mod ranking;
pub mod report;
pub mod telemetry;

pub use analyzer::{EligibilityAnalyzer, EligibilityResult, Stage, StageCounts};
pub use error::{DatasetError, ExportError, QueryError};
pub use export::{DocumentExporter, EligibleListDocument, PageLayout};
pub use loader::{Dataset, DatasetSummary};
pub use models::{AllotmentRecord, CandidateProfile, Config, ExportFormat};
pub use report::InstituteGroup;
