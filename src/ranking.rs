//! Display order for eligible seats: affordable institutes first, then the more
//! sought-after branches, then seats that opened to better ranks.

use crate::models::{AllotmentRecord, InstituteType, InstituteTypePreference};
use std::cmp::Ordering;

pub const UNRANKED_INSTITUTE: usize = 99;
pub const UNRANKED_BRANCH: usize = 999;

pub const BRANCH_PRIORITY: [&str; 58] = [
    "CSE",
    "CSEAI",
    "CSEIML",
    "CSEDS",
    "AIML",
    "AIAIDS",
    "AIADS",
    "DS",
    "CSEAIADS",
    "CSEBC",
    "CSECS",
    "CSIT",
    "IT",
    "ITAIAR",
    "CYSEC",
    "CSBS",
    "CSD",
    "CST",
    "CSEIOT",
    "CSEITCS",
    "CSERC",
    "ECS",
    "INOT",
    "IP",
    "CMPS",
    "MAC",
    "LG",
    "EACE",
    "ECACT",
    "ELECTRONICS AND TELECOMMUNICATIONS",
    "ET",
    "ELEX",
    "ELECT ELEX",
    "EC",
    "EE",
    "EEVDT",
    "EI",
    "EL",
    "EV",
    "ARE",
    "AIR",
    "AGRITECH",
    "AG",
    "AGE",
    "AUTO",
    "MECH",
    "MINING",
    "MTENG",
    "CE",
    "CENG",
    "CEWCA",
    "BM",
    "BT",
    "BEIL",
    "CHEM",
    "PCT",
    "FTS",
    "EAPE",
];

pub fn institute_priority(institute_type: &InstituteType) -> usize {
    match institute_type {
        InstituteType::GovernmentAided => 0,
        InstituteType::GovernmentAutonomous => 1,
        InstituteType::Private => 2,
        InstituteType::SelfFinancing => 3,
        InstituteType::Unrecognized(_) => UNRANKED_INSTITUTE,
    }
}

pub fn branch_priority(branch: &str) -> usize {
    BRANCH_PRIORITY
        .iter()
        .position(|known| *known == branch)
        .unwrap_or(UNRANKED_BRANCH)
}

/// Compare two records under the key used for `preference`.
///
/// With a specific institute type requested every row shares the same institute
/// priority, so it drops out of the key.
pub fn compare(
    a: &AllotmentRecord,
    b: &AllotmentRecord,
    preference: &InstituteTypePreference,
) -> Ordering {
    let by_institute = if preference.is_all() {
        institute_priority(&a.institute_type).cmp(&institute_priority(&b.institute_type))
    } else {
        Ordering::Equal
    };

    by_institute
        .then_with(|| branch_priority(&a.branch).cmp(&branch_priority(&b.branch)))
        .then_with(|| a.opening_rank.total_cmp(&b.opening_rank))
}

/// Stable sort; equal keys keep their dataset order.
pub fn sort_matches(matches: &mut [&AllotmentRecord], preference: &InstituteTypePreference) {
    matches.sort_by(|a, b| compare(a, b, preference));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryTag, DomicileFlag};

    fn record(name: &str, institute_type: InstituteType, branch: &str, opening: f64) -> AllotmentRecord {
        AllotmentRecord {
            institute_name: name.to_string(),
            institute_type,
            branch: branch.to_string(),
            opening_rank: opening,
            closing_rank: opening + 1000.0,
            allotted_category: CategoryTag::new("UR/X/OP"),
            domicile: DomicileFlag::Yes,
        }
    }

    fn order(records: &[AllotmentRecord], preference: &InstituteTypePreference) -> Vec<String> {
        let mut refs: Vec<&AllotmentRecord> = records.iter().collect();
        sort_matches(&mut refs, preference);
        refs.iter()
            .map(|r| format!("{}:{}", r.institute_name, r.branch))
            .collect()
    }

    #[test]
    fn branch_table_positions() {
        assert_eq!(branch_priority("CSE"), 0);
        assert_eq!(branch_priority("AIML"), 4);
        assert_eq!(branch_priority("MECH"), 45);
        assert_eq!(branch_priority("UNDERWATER BASKETRY"), UNRANKED_BRANCH);
    }

    #[test]
    fn unknown_institute_sorts_last() {
        let unknown = InstituteType::Unrecognized("DEEMED".to_string());
        assert!(institute_priority(&unknown) > institute_priority(&InstituteType::SelfFinancing));
    }

    #[test]
    fn preferred_branch_comes_first_within_institute() {
        let records = [
            record("Alpha", InstituteType::GovernmentAided, "MECH", 10.0),
            record("Alpha", InstituteType::GovernmentAided, "AIML", 20.0),
        ];
        assert_eq!(
            order(&records, &InstituteTypePreference::All),
            vec!["Alpha:AIML", "Alpha:MECH"]
        );
    }

    #[test]
    fn institute_priority_leads_when_all_types_requested() {
        let records = [
            record("Private", InstituteType::Private, "CSE", 10.0),
            record("Aided", InstituteType::GovernmentAided, "MECH", 10.0),
        ];
        assert_eq!(
            order(&records, &InstituteTypePreference::All),
            vec!["Aided:MECH", "Private:CSE"]
        );
    }

    #[test]
    fn institute_priority_ignored_for_specific_type() {
        let records = [
            record("Private", InstituteType::Private, "CSE", 10.0),
            record("Aided", InstituteType::GovernmentAided, "MECH", 10.0),
        ];
        let preference = InstituteTypePreference::Only(InstituteType::Private);
        assert_eq!(order(&records, &preference), vec!["Private:CSE", "Aided:MECH"]);
    }

    #[test]
    fn opening_rank_breaks_ties_then_dataset_order() {
        let records = [
            record("Late", InstituteType::Private, "IT", 300.0),
            record("First", InstituteType::Private, "IT", 100.0),
            record("Second", InstituteType::Private, "IT", 100.0),
        ];
        assert_eq!(
            order(&records, &InstituteTypePreference::All),
            vec!["First:IT", "Second:IT", "Late:IT"]
        );
    }
}
