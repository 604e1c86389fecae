//! Property tests for token issuance and validation

use base64::{Engine, engine::general_purpose::STANDARD};
use proptest::prelude::*;
use rampart_csrf::{CsrfConfig, CsrfManager, NOOP_TOKEN, TOKEN_BYTES, TokenGenerator};
use rampart_session::MemorySessionStore;
use std::collections::HashSet;

fn manager(driver: &str) -> CsrfManager {
    let session = MemorySessionStore::default().shared();
    CsrfManager::new(&CsrfConfig::new(driver), Some(session)).unwrap()
}

fn subject() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z.]{1,12}",
        any::<String>(),
    ]
}

proptest! {
    #[test]
    fn issued_token_validates_for_every_driver(subject in subject()) {
        for driver in ["noop", "session", "form"] {
            let csrf = manager(driver);
            let token = csrf.get_token(&subject).unwrap();
            prop_assert!(csrf.validate_token(&subject, token.as_str()).unwrap(), "{}", driver);
        }
    }

    #[test]
    fn form_token_is_consumed(subject in subject()) {
        let csrf = manager("form");
        let token = csrf.get_token(&subject).unwrap();
        prop_assert!(csrf.validate_token(&subject, token.as_str()).unwrap());
        prop_assert!(!csrf.validate_token(&subject, token.as_str()).unwrap());
    }

    #[test]
    fn form_subjects_are_independent(first in subject(), second in subject()) {
        prop_assume!(first != second);
        let csrf = manager("form");
        let first_token = csrf.get_token(&first).unwrap();
        let second_token = csrf.get_token(&second).unwrap();

        prop_assert!(!csrf.validate_token(&second, "forged").unwrap());
        prop_assert!(csrf.validate_token(&first, first_token.as_str()).unwrap());
        prop_assert!(!csrf.validate_token(&second, second_token.as_str()).unwrap());
    }

    #[test]
    fn session_token_survives_validation(subject in subject(), rounds in 1usize..8) {
        let csrf = manager("session");
        let token = csrf.get_token(&subject).unwrap();
        for _ in 0..rounds {
            prop_assert!(csrf.validate_token(&subject, token.as_str()).unwrap());
        }
    }

    #[test]
    fn noop_rejects_everything_but_sentinel(subject in subject(), candidate in ".*") {
        let csrf = manager("noop");
        let expected = candidate == NOOP_TOKEN;
        prop_assert_eq!(csrf.validate_token(&subject, &candidate).unwrap(), expected);
    }
}

#[test]
fn generated_tokens_are_unique() {
    let tokens: HashSet<String> = (0..10_000)
        .map(|_| TokenGenerator::generate().into_inner())
        .collect();
    assert_eq!(tokens.len(), 10_000);

    for token in tokens.iter().take(100) {
        assert!(STANDARD.decode(token).unwrap().len() >= TOKEN_BYTES);
    }
}
