use crate::test_utils::lit;
use crate::{EOF, Error, INFINITE_LOOP, Token, UNEXPECTED};

#[test]
fn literal_matches_exactly() {
    let null = lit("null");

    assert!(null.test("null"));
    assert!(!null.test("nul"));
    assert!(!null.test("nulls"));
    assert!(!null.test(""));
}

#[test]
fn literal_source_is_escaped() {
    assert_eq!(lit("{").source(), Some(r"\{"));
    assert_eq!(lit("a.b").source(), Some(r"a\.b"));
    assert_eq!(lit("{").name(), "{");
}

#[test]
fn pattern_must_match_whole_chunk() {
    let number = Token::pattern(r"\d+").unwrap();

    assert!(number.test("123"));
    assert!(!number.test("12a"));
    assert!(!number.test("a12"));
    assert!(!number.test(""));
}

#[test]
fn pattern_alternation_is_grouped() {
    let keyword = Token::pattern("true|false").unwrap();

    assert!(keyword.test("false"));
    assert!(!keyword.test("truefalse"));
}

#[test]
fn pattern_name_defaults_to_source() {
    let number = Token::pattern(r"-?\d+").unwrap();
    assert_eq!(number.name(), r"-?\d+");
    assert_eq!(number.source(), Some(r"-?\d+"));
}

#[test]
fn pattern_results_are_memoized() {
    let number = Token::pattern(r"\d+").unwrap();
    let Token::Matcher(matcher) = &number else {
        panic!("pattern tokens are matchers");
    };

    assert!(number.test("1"));
    assert!(number.test("1"));
    assert!(!number.test("x"));
    assert!(!number.test("x"));

    assert_eq!(matcher.memoized(), 2);
}

#[test]
fn named_overrides_diagnostic_name_only() {
    let number = Token::pattern(r"\d+").unwrap().named("Number");

    assert_eq!(number.name(), "Number");
    assert_eq!(number.source(), Some(r"\d+"));
    assert!(number.test("42"));
}

#[test]
fn tokens_compare_by_identity() {
    let a = lit("a");
    let other = lit("a");

    assert_eq!(a, a.clone());
    assert_ne!(a, other);
    assert_ne!(a.clone().named("A"), a);
}

#[test]
fn sentinels_never_match_text() {
    for sentinel in [EOF, UNEXPECTED, INFINITE_LOOP] {
        assert!(sentinel.is_sentinel());
        assert_eq!(sentinel.source(), None);
        assert!(!sentinel.test(""));
        assert!(!sentinel.test("EOF"));
    }
    assert_eq!(EOF.name(), "EOF");
    assert_eq!(UNEXPECTED.name(), "UNEXPECTED");
    assert_eq!(INFINITE_LOOP.name(), "INFINITE_LOOP");
    assert_eq!(EOF.named("End"), EOF);
}

#[test]
fn sentinels_compare_by_kind() {
    assert_eq!(EOF, Token::Eof);
    assert_ne!(EOF, UNEXPECTED);
    assert_ne!(UNEXPECTED, INFINITE_LOOP);
}

#[test]
fn invalid_pattern_is_an_error() {
    let err = Token::pattern("(").unwrap_err();

    let Error::InvalidPattern { pattern, .. } = &err else {
        panic!("expected InvalidPattern, got {err:?}");
    };
    assert_eq!(pattern, "(");
    assert!(err.is_grammar_defect());
}

#[test]
fn debug_shows_name() {
    assert_eq!(format!("{:?}", lit("a")), r#"Token("a")"#);
    assert_eq!(format!("{:?}", EOF), "EOF");
}
