use mpdte_counsellor::analyzer::{EligibilityAnalyzer, Stage};
use mpdte_counsellor::loader::RawAllotmentRow;
use mpdte_counsellor::models::{
    AllotmentRecord, CandidateProfile, CategoryChoice, CategoryTag, DomicileFlag,
    DomicilePreference, InstituteType, InstituteTypePreference, ReservationClass,
};
use mpdte_counsellor::ranking;
use proptest::prelude::*;
use proptest::sample::select;

prop_compose! {
    fn arb_record()(
        institute_name in select(vec!["Alpha", "Beta", "Gamma", "Delta"]),
        institute_type in select(vec!["AIDED", "GOVT", "PRIVATE", "S.F.I", "DEEMED"]),
        branch in select(vec!["CSE", "AIML", "IT", "MECH", "CE", "NAVAL"]),
        opening in 1u32..3000,
        closing in 1u32..3000,
        category in select(vec!["UR", "EWS", "OBC", "SC", "ST"]),
        class in select(vec!["X", "H", "S", "FF", "TS"]),
        seat in select(vec!["/OP", "/HS", ""]),
        domicile in select(vec!["Y", "N", "X", "D", "NO", ""]),
    ) -> AllotmentRecord {
        AllotmentRecord {
            institute_name: institute_name.to_string(),
            institute_type: InstituteType::normalize(institute_type),
            branch: branch.to_string(),
            opening_rank: f64::from(opening),
            closing_rank: f64::from(closing),
            allotted_category: CategoryTag::new(&format!("{category}/{class}{seat}")),
            domicile: DomicileFlag::normalize(domicile),
        }
    }
}

prop_compose! {
    fn arb_profile()(
        rank in 1u32..3000,
        domicile in select(vec![
            DomicilePreference::All,
            DomicilePreference::Yes,
            DomicilePreference::No,
        ]),
        category in select(vec![
            CategoryChoice::All,
            CategoryChoice::Ur,
            CategoryChoice::Obc,
            CategoryChoice::Sc,
            CategoryChoice::St,
        ]),
        reservation_class in select(vec![
            ReservationClass::All,
            ReservationClass::Nil,
            ReservationClass::PhysicallyHandicapped,
            ReservationClass::Sainik,
            ReservationClass::FreedomFighter,
            ReservationClass::TechnicalStream,
        ]),
        institute_type in select(vec![
            InstituteTypePreference::All,
            InstituteTypePreference::Only(InstituteType::GovernmentAided),
            InstituteTypePreference::Only(InstituteType::Private),
            InstituteTypePreference::Only(InstituteType::SelfFinancing),
        ]),
    ) -> CandidateProfile {
        CandidateProfile {
            rank,
            domicile,
            category,
            reservation_class,
            institute_type,
        }
    }
}

prop_compose! {
    fn arb_raw_row()(
        institute_name in "[A-Za-z ]{0,12}",
        institute_type in "[A-Za-z. ]{0,10}",
        branch in "[A-Za-z ]{0,8}",
        opening in "[0-9]{1,5}(\\.[0-9])?|[a-z]{1,3}",
        closing in "[0-9]{1,5}(\\.[0-9])?",
        category in "[A-Za-z/ -]{0,12}",
        domicile in "[A-Za-z ]{0,4}",
    ) -> RawAllotmentRow {
        RawAllotmentRow {
            institute_name: Some(institute_name),
            institute_type: Some(institute_type),
            branch: Some(branch),
            opening_rank: Some(opening),
            closing_rank: Some(closing),
            allotted_category: Some(category),
            domicile: Some(domicile),
        }
    }
}

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in arb_raw_row()) {
        if let Some(record) = raw.normalize() {
            let again = RawAllotmentRow::from_record(&record).normalize();
            prop_assert_eq!(again, Some(record));
        }
    }

    #[test]
    fn narrowing_category_never_adds_matches(
        records in prop::collection::vec(arb_record(), 0..40),
        profile in arb_profile(),
    ) {
        let mut open = profile.clone();
        open.category = CategoryChoice::All;
        let baseline = EligibilityAnalyzer::new(&open).analyze(&records).matches.len();
        let narrowed = EligibilityAnalyzer::new(&profile).analyze(&records).matches.len();
        prop_assert!(narrowed <= baseline);
    }

    #[test]
    fn stage_counts_never_increase(
        records in prop::collection::vec(arb_record(), 0..40),
        profile in arb_profile(),
    ) {
        let counts = EligibilityAnalyzer::new(&profile).analyze(&records).stage_counts;
        prop_assert_eq!(counts.reached(Stage::Rank), counts.total);
        for pair in Stage::ORDER.windows(2) {
            prop_assert!(counts.reached(pair[0]) >= counts.reached(pair[1]));
        }
        prop_assert!(counts.reached(Stage::Institute) >= counts.matched);
    }

    #[test]
    fn sorting_twice_changes_nothing(
        records in prop::collection::vec(arb_record(), 0..40),
        profile in arb_profile(),
    ) {
        let mut once: Vec<&AllotmentRecord> = records.iter().collect();
        ranking::sort_matches(&mut once, &profile.institute_type);
        let mut twice = once.clone();
        ranking::sort_matches(&mut twice, &profile.institute_type);

        prop_assert!(once.iter().zip(&twice).all(|(a, b)| std::ptr::eq(*a, *b)));
        for pair in once.windows(2) {
            prop_assert_ne!(
                ranking::compare(pair[0], pair[1], &profile.institute_type),
                std::cmp::Ordering::Greater
            );
        }
    }

    #[test]
    fn seats_without_open_marker_never_match(
        records in prop::collection::vec(arb_record(), 0..40),
        profile in arb_profile(),
    ) {
        let result = EligibilityAnalyzer::new(&profile).analyze(&records);
        prop_assert!(result
            .matches
            .iter()
            .all(|record| record.allotted_category.as_str().contains("/OP")));
    }
}
