//! Fuzz target for HTML entity encoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rampart_security::{HtmlEntities, QuoteStyle};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let encoder = HtmlEntities::new();
    let once = encoder.encode(text);
    assert!(!once.contains(['<', '>', '"', '\'']));
    assert_eq!(encoder.encode(&once), once);

    let compat = HtmlEntities::new().with_quote_style(QuoteStyle::Compat);
    let _ = compat.encode(text);

    let double = HtmlEntities::new().with_double_encode(true);
    let _ = double.encode(text);
});
