#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sheetmerge_core::{join, JoinType, KeyColumnPair, RecordSet, Row};

#[derive(Arbitrary, Debug)]
struct JoinInput {
    reference: Vec<(String, String)>,
    primary: Vec<(String, String)>,
    left: bool,
}

fn record_set(pairs: &[(String, String)]) -> Option<RecordSet> {
    let rows = pairs
        .iter()
        .take(64) // Bound fan-out to keep iterations fast
        .map(|(k, v)| Row::from_iter([k.as_str(), v.as_str()]))
        .collect();
    RecordSet::new(vec!["k".to_string(), "v".to_string()], rows).ok()
}

fuzz_target!(|input: JoinInput| {
    let (Some(reference), Some(primary)) =
        (record_set(&input.reference), record_set(&input.primary))
    else {
        return;
    };
    let join_type = if input.left { JoinType::Left } else { JoinType::Inner };

    if let Ok(outcome) = join(&primary, &reference, &[KeyColumnPair::same("k")], join_type) {
        assert_eq!(outcome.result.headers().len(), 4);
        assert!(outcome.matched_keys <= primary.len());
        assert!(outcome.unmatched_primary_rows <= primary.len());
        if join_type == JoinType::Left {
            assert!(outcome.result.len() >= primary.len());
        } else {
            assert!(outcome.result.len() <= primary.len() * reference.len());
        }
    }
});
