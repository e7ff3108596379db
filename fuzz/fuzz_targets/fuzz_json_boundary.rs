#![no_main]

use libfuzzer_sys::fuzz_target;
use sheetmerge::{Engine, EngineConfig, OperationContext};

fuzz_target!(|data: &[u8]| {
    // Malformed envelopes must come back as errors, never panics
    if let Ok(payload) = std::str::from_utf8(data) {
        let engine = Engine::with_config(EngineConfig::default().with_max_join_rows(100_000));
        let _ = engine.handle_json_str(&mut OperationContext::new(), payload);
    }
});
