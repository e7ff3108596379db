#![no_main]

use libfuzzer_sys::fuzz_target;
use sheetmerge_core::dates::{format_date, matches_calendar_pattern, parse_date};

fuzz_target!(|input: &str| {
    let parsed = parse_date(input);

    // The calendar patterns are a subset of what the general parser accepts
    if matches_calendar_pattern(input) {
        assert!(parsed.is_some());
    }

    // Formatted four-digit-year dates without fractions parse back unchanged
    if let Some(dt) = parsed {
        let text = format_date(&dt);
        if dt.and_utc().timestamp_subsec_nanos() == 0 && matches!(text.len(), 10 | 19) {
            assert_eq!(parse_date(&text), Some(dt));
        }
    }
});
