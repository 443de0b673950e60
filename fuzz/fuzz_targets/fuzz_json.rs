#![no_main]

use libfuzzer_sys::fuzz_target;
use shapejs::Context;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Limit input size to avoid timeout
    if source.len() > 100_000 {
        return;
    }

    let mut ctx = Context::new();
    let Ok(value) = ctx.parse_json(source) else {
        return;
    };

    // Anything parsed must export and re-import to the same document
    let exported = ctx.value_to_json(&value).unwrap();
    let reparsed = ctx.value_from_json(&exported).unwrap();
    assert_eq!(ctx.value_to_json(&reparsed).unwrap(), exported);
});
