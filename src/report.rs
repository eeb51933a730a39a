//! Groups ranked seats by institute and renders them for the terminal.

use crate::analyzer::StageCounts;
use crate::loader::DatasetSummary;
use crate::models::{format_rank, AllotmentRecord, InstituteType};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SeatRow {
    pub branch: String,
    pub allotted_category: String,
    pub opening_rank: f64,
    pub closing_rank: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstituteGroup {
    pub institute_name: String,
    /// Type of the first row in the group.
    pub institute_type: InstituteType,
    pub rows: Vec<SeatRow>,
}

/// One group per institute, in the order institutes first appear in `sorted`.
pub fn group_by_institute(sorted: &[&AllotmentRecord]) -> Vec<InstituteGroup> {
    let mut groups: Vec<InstituteGroup> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in sorted {
        let index = *positions
            .entry(record.institute_name.as_str())
            .or_insert_with(|| {
                groups.push(InstituteGroup {
                    institute_name: record.institute_name.clone(),
                    institute_type: record.institute_type.clone(),
                    rows: Vec::new(),
                });
                groups.len() - 1
            });

        groups[index].rows.push(SeatRow {
            branch: record.branch.clone(),
            allotted_category: record.allotted_category.as_str().to_string(),
            opening_rank: record.opening_rank,
            closing_rank: record.closing_rank,
        });
    }

    groups
}

pub fn group_heading(group: &InstituteGroup) -> String {
    format!("🏫 {} ({})", group.institute_name, group.institute_type)
}

pub fn group_table(group: &InstituteGroup) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "BRANCH",
            "ALLOTTED CATEGORY",
            "OPENING JEE COMMON RANK",
            "CLOSING JEE COMMON RANK",
        ]);

    for row in &group.rows {
        table.add_row(vec![
            Cell::new(&row.branch),
            Cell::new(&row.allotted_category),
            Cell::new(format_rank(row.opening_rank)).set_alignment(CellAlignment::Right),
            Cell::new(format_rank(row.closing_rank)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

pub fn render_groups(groups: &[InstituteGroup]) -> String {
    let mut content = String::new();
    for group in groups {
        content.push_str(&group_heading(group));
        content.push('\n');
        content.push_str(&group_table(group).to_string());
        content.push_str("\n\n");
    }
    content
}

pub fn render_dataset_summary(summary: &DatasetSummary) -> String {
    format!(
        "   🏫 Institutes: {}\n   🔀 Branches: {}\n   📋 Total options: {}",
        summary.institutes, summary.branches, summary.total_options
    )
}

pub fn render_stage_counts(counts: &StageCounts) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(vec!["Stage", "Reached", "Passed"]);
    table.add_row(vec![
        Cell::new("total"),
        Cell::new(counts.total).set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);
    for (stage, reached) in counts.iter() {
        table.add_row(vec![
            Cell::new(stage.name()),
            Cell::new(reached).set_alignment(CellAlignment::Right),
            Cell::new(counts.passed(stage)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}
