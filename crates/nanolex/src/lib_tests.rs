use crate::Error;

#[test]
fn infinite_loop_names_the_rule() {
    let err = Error::InfiniteLoop {
        rule: Some("LIST".into()),
        offset: 3,
    };
    assert_eq!(
        err.to_string(),
        "infinite loop: repetition in rule `LIST` matched without consuming input at byte 3"
    );

    let err = Error::InfiniteLoop {
        rule: None,
        offset: 0,
    };
    assert_eq!(
        err.to_string(),
        "infinite loop: repetition in entry rule matched without consuming input at byte 0"
    );
}

#[test]
fn undefined_rule_mentions_referrer() {
    let err = Error::UndefinedRule {
        name: "VALUE".into(),
        referenced_from: Some("ARRAY".into()),
    };
    assert_eq!(
        err.to_string(),
        "rule `VALUE` is referenced from `ARRAY` but never defined"
    );

    let err = Error::UndefinedRule {
        name: "VALUE".into(),
        referenced_from: None,
    };
    assert_eq!(
        err.to_string(),
        "rule `VALUE` is referenced but never defined"
    );
}

#[test]
fn grammar_defects() {
    let defects = [
        Error::RecursionLimitExceeded {
            rule: "E".into(),
            limit: 8,
        },
        Error::UnresolvedRule { name: "A".into() },
        Error::DuplicateRule("A".into()),
        Error::UnknownRule("A".into()),
        Error::InvalidPattern {
            pattern: "(".into(),
            message: "unclosed group".into(),
        },
    ];

    for err in &defects {
        assert!(err.is_grammar_defect(), "{err}");
        assert!(err.as_syntax().is_none());
    }
    assert_eq!(
        defects[0].to_string(),
        "recursion limit of 8 exceeded while entering rule `E`"
    );
}
