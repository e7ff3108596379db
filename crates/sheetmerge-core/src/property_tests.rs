use proptest::prelude::*;

use crate::filter::{filter, LogicOperator};
use crate::join::{join, KeyColumnPair, JoinType, REF_PREFIX};
use crate::page::paginate;
use crate::predicate::{FilterCondition, Predicate};
use crate::record::{RecordSet, Row};
use crate::sort::{sort, SortDirection};
use crate::value::CellValue;

const CONDITIONS: &[&str] = &[
    "equals",
    "notEquals",
    "greaterThan",
    "lessThan",
    "greaterThanOrEqual",
    "lessThanOrEqual",
    "between",
    "contains",
    "doesNotContain",
    "startsWith",
    "endsWith",
    "exactMatch",
    "before",
    "after",
    "on",
    "betweenDates",
    "isEmpty",
    "isNotEmpty",
    "noSuchCondition",
];

fn cell_strategy() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Null),
        "[ a-cA-C0-9.]{0,4}".prop_map(CellValue::Text),
        (-50i64..50).prop_map(CellValue::from),
        (1u32..28).prop_map(|d| CellValue::text(format!("2024-01-{d:02}"))),
    ]
}

/// Record set with columns `id` (row position), `a` and `b`.
fn record_set_strategy() -> impl Strategy<Value = RecordSet> {
    prop::collection::vec((cell_strategy(), cell_strategy()), 0..40).prop_map(|cells| {
        let rows = cells
            .into_iter()
            .enumerate()
            .map(|(i, (a, b))| Row::new(vec![CellValue::from(i as i64), a, b]))
            .collect();
        RecordSet::new(vec!["id".into(), "a".into(), "b".into()], rows).unwrap()
    })
}

fn condition_strategy() -> impl Strategy<Value = FilterCondition> {
    (
        prop::sample::select(vec!["a", "b", "missing"]),
        prop::sample::select(CONDITIONS),
        "[ a-c0-9-]{0,10}",
        proptest::option::of("[0-9-]{0,10}"),
    )
        .prop_map(|(column, condition, value, value2)| {
            let mut cond = FilterCondition::new(column, condition, value);
            cond.value2 = value2;
            cond
        })
}

fn ids(set: &RecordSet) -> Vec<CellValue> {
    set.rows().iter().map(|r| r.get(0).clone()).collect()
}

proptest! {
    #[test]
    fn filter_is_idempotent(
        set in record_set_strategy(),
        conditions in prop::collection::vec(condition_strategy(), 0..4),
        or in any::<bool>(),
    ) {
        let op = if or { LogicOperator::Or } else { LogicOperator::And };
        let once = filter(&set, &conditions, op).unwrap();
        let twice = filter(&once, &conditions, op).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn filter_partitions_rows_by_predicate(
        set in record_set_strategy(),
        condition in condition_strategy(),
    ) {
        let out = filter(&set, std::slice::from_ref(&condition), LogicOperator::And).unwrap();
        let predicate = Predicate::compile(set.headers(), &condition);
        let kept = ids(&out);

        for row in set.rows() {
            prop_assert_eq!(predicate.evaluate(row), kept.contains(row.get(0)));
        }
    }

    #[test]
    fn filter_preserves_relative_order(
        set in record_set_strategy(),
        condition in condition_strategy(),
    ) {
        let out = filter(&set, &[condition], LogicOperator::And).unwrap();
        let positions: Vec<f64> = ids(&out).iter().filter_map(CellValue::as_number).collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn adding_and_conditions_only_narrows(
        set in record_set_strategy(),
        c1 in condition_strategy(),
        c2 in condition_strategy(),
    ) {
        let narrow = ids(&filter(&set, &[c1.clone(), c2], LogicOperator::And).unwrap());
        let wide = ids(&filter(&set, &[c1], LogicOperator::And).unwrap());
        prop_assert!(narrow.iter().all(|id| wide.contains(id)));
    }

    #[test]
    fn left_join_keeps_every_primary_row_once_with_unique_keys(
        primary in record_set_strategy(),
        reference_keys in prop::collection::hash_set("[a-c]{1,2}", 1..6),
    ) {
        prop_assume!(!primary.is_empty());
        let reference_rows = reference_keys
            .iter()
            .map(|k| Row::from_iter([k.as_str(), "payload"]))
            .collect();
        let reference =
            RecordSet::new(vec!["key".into(), "payload".into()], reference_rows).unwrap();

        let out = join(&primary, &reference, &[KeyColumnPair::new("key", "a")], JoinType::Left)
            .unwrap();
        prop_assert_eq!(out.result.len(), primary.len());

        let ref_col = out.result.column_index(&format!("{REF_PREFIX}key")).unwrap();
        for row in out.result.rows() {
            let primary_key = row.get(1).as_text().trim().to_lowercase();
            if reference_keys.contains(&primary_key) {
                prop_assert!(!row.get(ref_col).is_null());
            } else {
                prop_assert!(row.get(ref_col).is_null());
                prop_assert!(row.get(ref_col + 1).is_null());
            }
        }
    }

    #[test]
    fn inner_join_is_bounded_by_fan_out(
        primary in record_set_strategy(),
        reference in record_set_strategy(),
    ) {
        prop_assume!(!primary.is_empty() && !reference.is_empty());
        let out = join(&primary, &reference, &[KeyColumnPair::same("a")], JoinType::Inner)
            .unwrap();
        prop_assert!(out.result.len() <= primary.len() * reference.len());
        prop_assert!(out.matched_keys <= primary.len());
        prop_assert_eq!(out.result.headers().len(), 6);
    }

    #[test]
    fn key_matching_ignores_case_and_padding(key in "[a-zA-Z0-9]{1,8}", pad in " {0,3}") {
        let reference = RecordSet::new(
            vec!["k".into()],
            vec![Row::from_iter([format!("{pad}{}{pad}", key.to_uppercase())])],
        )
        .unwrap();
        let primary =
            RecordSet::new(vec!["k".into()], vec![Row::from_iter([key.to_lowercase()])]).unwrap();
        let out = join(&primary, &reference, &[KeyColumnPair::same("k")], JoinType::Inner).unwrap();
        prop_assert_eq!(out.result.len(), 1);
    }

    #[test]
    fn sort_is_a_permutation(set in record_set_strategy(), desc in any::<bool>()) {
        let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
        let out = sort(&set, Some("a"), direction).unwrap();
        let mut before: Vec<f64> = ids(&set).iter().filter_map(CellValue::as_number).collect();
        let mut after: Vec<f64> = ids(&out).iter().filter_map(CellValue::as_number).collect();
        before.sort_by(f64::total_cmp);
        after.sort_by(f64::total_cmp);
        prop_assert_eq!(before, after);
        prop_assert_eq!(out.headers(), set.headers());
    }

    #[test]
    fn pages_cover_the_sequence(len in 0usize..300, page_size in 1usize..60) {
        let items: Vec<usize> = (0..len).collect();
        let first = paginate(&items, 1, page_size).unwrap();
        let mut seen = Vec::new();
        for page_number in 1..=first.total_pages {
            let page = paginate(&items, page_number, page_size).unwrap();
            prop_assert_eq!(page.has_more, page_number < first.total_pages);
            seen.extend(page.items);
        }
        prop_assert_eq!(seen, items);
    }
}
