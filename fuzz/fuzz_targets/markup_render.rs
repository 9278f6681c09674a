#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

use scriptgen::render::DocumentRenderer;
use scriptgen::scripts::{extract_title, parse_script_markup};

fuzz_target!(|data: &[u8]| {
    let markup = String::from_utf8_lossy(data);

    // titles are derived from arbitrary client text
    let _ = extract_title(&markup);

    let items = parse_script_markup(&markup);
    let Some(generated_at) = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return;
    };

    // rendering may fail on exotic input, but must never panic
    let _ = DocumentRenderer::default().render(&items, generated_at);
});
