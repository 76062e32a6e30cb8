//! Property-based tests for detection and decomposition.

mod common;

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use relnorm::config::DetectorConfig;
use relnorm::detector::DependencyDetector;
use relnorm::model::{AnalysisResult, Diagnostic, NormalForm, TableProfile, TableSchema};

/// Column names without digits; numbered groups are added separately.
const NAMES: [&str; 8] = [
    "col_a", "col_b", "col_c", "col_d", "col_e", "col_f", "col_g", "col_h",
];

fn profile_strategy(
    columns: std::ops::RangeInclusive<usize>,
    rows: std::ops::Range<usize>,
) -> impl Strategy<Value = TableProfile> {
    (columns, rows).prop_flat_map(|(width, height)| {
        prop::collection::vec(prop::collection::vec(0u8..3, width), height).prop_map(
            move |cells| {
                let mut builder = TableProfile::builder("Sample").columns(NAMES[..width].iter().copied());
                for row in cells {
                    builder = builder.row(row.iter().map(|v| format!("v{v}")));
                }
                builder.build().unwrap()
            },
        )
    })
}

/// Plain columns followed by a numbered group `item1`, `item2`, ... whose
/// cells are sometimes blank.
fn grouped_profile_strategy() -> impl Strategy<Value = TableProfile> {
    (2usize..=4, 2usize..=3, 4usize..10).prop_flat_map(|(width, group, height)| {
        prop::collection::vec(prop::collection::vec(0u8..4, width + group), height).prop_map(
            move |cells| {
                let mut columns: Vec<String> = NAMES[..width].iter().map(|n| n.to_string()).collect();
                columns.extend((1..=group).map(|n| format!("item{n}")));
                let mut builder = TableProfile::builder("Sample").columns(columns);
                for row in cells {
                    builder = builder.row(row.iter().enumerate().map(|(i, &v)| {
                        if i >= width && v == 3 {
                            String::new()
                        } else {
                            format!("v{}", v % 3)
                        }
                    }));
                }
                builder.build().unwrap()
            },
        )
    })
}

fn covered_attributes(result: &AnalysisResult) -> BTreeSet<String> {
    let mut covered = BTreeSet::new();
    for table in &result.tables {
        for column in table.columns.iter().filter(|c| !c.synthetic) {
            if column.derived_from.is_empty() {
                covered.insert(column.name.clone());
            } else {
                covered.extend(column.derived_from.iter().cloned());
            }
        }
    }
    covered
}

fn analyze(profile: &TableProfile) -> AnalysisResult {
    common::engine().analyze(profile).unwrap()
}

fn is_unique(table: &TableSchema, key: &[String]) -> bool {
    let positions: Vec<usize> = key
        .iter()
        .map(|k| table.columns.iter().position(|c| &c.name == k).unwrap())
        .collect();
    let mut seen = HashSet::new();
    table
        .rows
        .iter()
        .all(|row| seen.insert(positions.iter().map(|&i| row[i].clone()).collect::<Vec<_>>()))
}

fn is_minimal_key(table: &TableSchema, key: &[String]) -> bool {
    is_unique(table, key)
        && (key.len() == 1
            || (0..key.len()).all(|skip| {
                let smaller: Vec<String> = key
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, k)| k.clone())
                    .collect();
                !is_unique(table, &smaller)
            }))
}

fn searches_complete(result: &AnalysisResult) -> bool {
    !result.truncated
        && result.diagnostics.iter().all(|d| {
            matches!(d, Diagnostic::SyntheticKeyInserted { .. })
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_attributes_are_conserved(profile in profile_strategy(3..=5, 4..12)) {
        let result = analyze(&profile);
        let original: BTreeSet<String> =
            profile.attributes().iter().map(|a| a.name.clone()).collect();
        prop_assert_eq!(covered_attributes(&result), original);
    }

    #[test]
    fn prop_grouped_attributes_are_conserved(profile in grouped_profile_strategy()) {
        let result = analyze(&profile);
        let original: BTreeSet<String> =
            profile.attributes().iter().map(|a| a.name.clone()).collect();
        prop_assert_eq!(covered_attributes(&result), original);
    }

    #[test]
    fn prop_numbered_groups_are_unnested(profile in grouped_profile_strategy()) {
        let result = analyze(&profile);
        prop_assert!(result.final_nf >= NormalForm::First);
        for table in &result.tables {
            prop_assert!(
                !table.columns.iter().any(|c| c.name.starts_with("item") && c.name.len() > 4),
                "{} still holds numbered columns",
                table.name
            );
        }
        let group_has_values = profile.rows().iter().any(|row| {
            profile
                .attributes()
                .iter()
                .zip(row)
                .any(|(a, cell)| a.name.starts_with("item") && cell.is_some())
        });
        if group_has_values {
            prop_assert_eq!(result.original_nf, NormalForm::Unnormalized);
            prop_assert_eq!(result.steps[0].to_nf, NormalForm::First);
            prop_assert!(result.tables.iter().any(|t| t.has_column("item")));
        }
    }

    #[test]
    fn prop_grouped_steps_never_go_down(profile in grouped_profile_strategy()) {
        let result = analyze(&profile);
        let mut previous = result.original_nf;
        for step in &result.steps {
            prop_assert!(step.to_nf > step.from_nf);
            prop_assert!(step.to_nf >= previous);
            previous = step.to_nf;
        }
    }

    #[test]
    fn prop_keys_are_minimal(profile in profile_strategy(3..=5, 4..12)) {
        let result = analyze(&profile);
        prop_assume!(searches_complete(&result));
        for table in &result.tables {
            prop_assert!(is_minimal_key(table, &table.primary_key), "primary key of {}", table.name);
            for key in &table.candidate_keys {
                prop_assert!(is_minimal_key(table, key), "candidate key of {}", table.name);
            }
        }
    }

    #[test]
    fn prop_steps_never_go_down(profile in profile_strategy(3..=5, 4..12)) {
        let result = analyze(&profile);
        let mut previous = result.original_nf;
        for step in &result.steps {
            prop_assert!(step.to_nf > step.from_nf);
            prop_assert!(step.to_nf >= previous);
            previous = step.to_nf;
        }
        prop_assert!(result.final_nf >= result.original_nf);
    }

    #[test]
    fn prop_leaves_are_stable(profile in profile_strategy(3..=5, 4..12)) {
        let result = analyze(&profile);
        prop_assume!(searches_complete(&result));
        prop_assume!(!result.diagnostics.iter().any(|d| {
            matches!(d, Diagnostic::DecompositionLoopGuardTripped { .. })
        }));
        for table in &result.tables {
            let again = analyze(&table.to_profile().unwrap());
            prop_assert_eq!(again.steps_count, 0, "{} decomposed again", table.name);
        }
    }

    #[test]
    fn prop_parallel_detection_matches_sequential(profile in profile_strategy(8..=8, 4..10)) {
        let sequential = DependencyDetector::new(DetectorConfig::sequential()).detect(&profile);
        let parallel = DependencyDetector::new(DetectorConfig::default().with_parallelism(4))
            .detect(&profile);
        prop_assert_eq!(sequential, parallel);
    }

    #[test]
    fn prop_all_attributes_determine_each(profile in profile_strategy(3..=5, 4..12)) {
        let detector = DependencyDetector::new(DetectorConfig::sequential());
        let all = profile.all_attributes();
        for rhs in 0..profile.column_count() {
            prop_assert_eq!(detector.determination(&profile, &all, rhs), 1.0);
        }
    }
}
