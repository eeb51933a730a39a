use crate::models::{
    AllotmentRecord, CandidateProfile, CategoryChoice, DomicileFlag, DomicilePreference,
    InstituteTypePreference, ReservationClass,
};
use std::fmt;

/// Eligibility checks, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Rank,
    Category,
    Class,
    OpenSeat,
    Domicile,
    Institute,
}

impl Stage {
    pub const ORDER: [Stage; 6] = [
        Stage::Rank,
        Stage::Category,
        Stage::Class,
        Stage::OpenSeat,
        Stage::Domicile,
        Stage::Institute,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Rank => "rank",
            Stage::Category => "category",
            Stage::Class => "class",
            Stage::OpenSeat => "op",
            Stage::Domicile => "domicile",
            Stage::Institute => "institute",
        }
    }

    fn index(self) -> usize {
        match self {
            Stage::Rank => 0,
            Stage::Category => 1,
            Stage::Class => 2,
            Stage::OpenSeat => 3,
            Stage::Domicile => 4,
            Stage::Institute => 5,
        }
    }

    pub fn admits(self, record: &AllotmentRecord, profile: &CandidateProfile) -> bool {
        match self {
            Stage::Rank => rank_in_range(record, profile.rank),
            Stage::Category => category_matches(record, profile.category),
            Stage::Class => class_matches(record, profile.reservation_class),
            Stage::OpenSeat => is_open_seat(record),
            Stage::Domicile => domicile_matches(record, profile.domicile),
            Stage::Institute => institute_matches(record, &profile.institute_type),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn rank_in_range(record: &AllotmentRecord, rank: u32) -> bool {
    let rank = f64::from(rank);
    record.opening_rank <= rank && rank <= record.closing_rank
}

/// EWS seats count as UR.
pub fn category_matches(record: &AllotmentRecord, category: CategoryChoice) -> bool {
    let tag = &record.allotted_category;
    match category {
        CategoryChoice::All => true,
        CategoryChoice::Ur => tag.starts_with_category("UR") || tag.starts_with_category("EWS"),
        other => other
            .code()
            .is_some_and(|code| tag.starts_with_category(code)),
    }
}

/// A seat in the `X` (no special reservation) class is open to every class.
pub fn class_matches(record: &AllotmentRecord, class: ReservationClass) -> bool {
    match class.token() {
        None => true,
        Some(token) => {
            let tag = &record.allotted_category;
            tag.has_class(token) || tag.has_class("X")
        }
    }
}

pub fn is_open_seat(record: &AllotmentRecord) -> bool {
    record.allotted_category.is_open_seat()
}

/// `No` only admits rows explicitly flagged `X`, not every row that is not `Y`.
pub fn domicile_matches(record: &AllotmentRecord, preference: DomicilePreference) -> bool {
    match preference {
        DomicilePreference::All => true,
        DomicilePreference::Yes => record.domicile != DomicileFlag::No,
        DomicilePreference::No => record.domicile == DomicileFlag::Sentinel,
    }
}

pub fn institute_matches(record: &AllotmentRecord, preference: &InstituteTypePreference) -> bool {
    match preference {
        InstituteTypePreference::All => true,
        InstituteTypePreference::Only(institute_type) => record.institute_type == *institute_type,
    }
}

/// How far records got through the stages of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub total: usize,
    reached: [usize; 6],
    pub matched: usize,
}

impl StageCounts {
    /// Records that were evaluated against `stage`.
    pub fn reached(&self, stage: Stage) -> usize {
        self.reached[stage.index()]
    }

    /// Records that passed `stage`.
    pub fn passed(&self, stage: Stage) -> usize {
        match Stage::ORDER.get(stage.index() + 1) {
            Some(next) => self.reached(*next),
            None => self.matched,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, usize)> + '_ {
        Stage::ORDER.iter().map(|stage| (*stage, self.reached(*stage)))
    }
}

#[derive(Debug, Clone)]
pub struct EligibilityResult<'a> {
    pub matches: Vec<&'a AllotmentRecord>,
    pub stage_counts: StageCounts,
}

impl EligibilityResult<'_> {
    /// No eligible options for the profile; a valid outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

pub struct EligibilityAnalyzer<'a> {
    pub profile: &'a CandidateProfile,
}

impl<'a> EligibilityAnalyzer<'a> {
    pub fn new(profile: &'a CandidateProfile) -> Self {
        Self { profile }
    }

    /// Run every record through the stages, stopping at the first failure.
    pub fn analyze<'r>(&self, records: &'r [AllotmentRecord]) -> EligibilityResult<'r> {
        let mut stage_counts = StageCounts {
            total: records.len(),
            ..StageCounts::default()
        };
        let mut matches = Vec::new();

        for record in records {
            if self.passes_all(record, &mut stage_counts) {
                matches.push(record);
            }
        }
        stage_counts.matched = matches.len();

        EligibilityResult {
            matches,
            stage_counts,
        }
    }

    fn passes_all(&self, record: &AllotmentRecord, counts: &mut StageCounts) -> bool {
        for stage in Stage::ORDER {
            counts.reached[stage.index()] += 1;
            if !stage.admits(record, self.profile) {
                return false;
            }
        }
        true
    }
}
