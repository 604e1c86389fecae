//! Fuzz target for URI cleaning.
//!
//! Strict normalization must never leave relative segments behind and must
//! be stable when applied twice.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rampart_security::{SecurityConfig, SecurityManager, normalize_path};

#[derive(Debug, Arbitrary)]
struct FuzzUri {
    uri: String,
    strict: bool,
    encode: bool,
}

fuzz_target!(|input: FuzzUri| {
    let normalized = normalize_path(&input.uri);
    assert_eq!(normalize_path(&normalized), normalized);

    let path = normalized.split(['?', '#']).next().unwrap_or_default();
    assert!(path.split('/').all(|segment| segment != ".." && segment != "."));

    let config = if input.encode {
        SecurityConfig::default().with_uri_filter(["htmlentities"])
    } else {
        SecurityConfig::default()
    };
    let mut security = SecurityManager::new(config);
    let _ = security.clean_uri(&input.uri, input.strict);
});
