use crate::test_utils::{context, lit, run};
use crate::{
    EOF, Error, Failure, Outcome, Token, UNEXPECTED, and, consume, consume_behind, consume_until,
    skip_in,
};

fn whitespace() -> Token {
    Token::pattern(r"\s+").unwrap().named("Whitespace")
}

#[test]
fn consume_steps_over_empty_chunks() {
    let (open, close) = (lit("{"), lit("}"));
    let grammar = and((consume(&open), consume(&close)));

    let (outcome, cursor) = run(&[open, close], &grammar, "{}");

    assert_eq!(outcome, Outcome::Success(("{".to_owned(), "}".to_owned())));
    assert_eq!(cursor, 4);
}

#[test]
fn consume_eof_only_at_end() {
    let a = lit("a");

    let (outcome, cursor) = run(&[a.clone()], &and((consume(&a), consume(&EOF))), "a");
    assert!(outcome.is_success());
    assert_eq!(cursor, 3);

    let (outcome, cursor) = run(&[a.clone()], &consume(&EOF), "a");
    assert_eq!(outcome, Outcome::Failure(Failure::new(1, EOF)));
    assert_eq!(cursor, 0);
}

#[test]
fn consume_eof_skips_trailing_filler() {
    let a = lit("a");
    let ws = whitespace();
    let grammar = skip_in(consume(&ws), and((consume(&a), consume(&EOF))));

    let (outcome, cursor) = run(&[a, ws], &grammar, "a  ");

    assert!(outcome.is_success());
    assert_eq!(cursor, 5);
}

#[test]
fn failure_position_is_after_skipped_filler() {
    let (a, b) = (lit("a"), lit("b"));
    let ws = whitespace();
    let grammar = skip_in(consume(&ws), consume(&b));

    let (outcome, cursor) = run(&[a, ws], &grammar, " a");

    assert_eq!(outcome, Outcome::Failure(Failure::new(3, b)));
    assert_eq!(cursor, 0);
}

#[test]
fn skip_rule_failures_stay_private() {
    let (a, b) = (lit("a"), lit("b"));
    let ws = whitespace();
    let mut ctx = context(&[a], "a");

    let outcome = skip_in(consume(&ws), consume(&b)).parse(&mut ctx);

    assert_eq!(outcome, Outcome::Failure(Failure::new(1, b.clone())));
    assert_eq!(ctx.deepest(), Some(&Failure::new(1, b)));
}

#[test]
fn consume_behind_steps_back() {
    let (a, b) = (lit("a"), lit("b"));
    let mut ctx = context(&[a.clone(), b.clone()], "ab");

    ctx.set_cursor(3);
    let outcome = consume_behind(&a).parse(&mut ctx);
    assert_eq!(outcome, Outcome::Success("a".to_owned()));
    assert_eq!(ctx.cursor(), 1);

    ctx.set_cursor(3);
    let outcome = consume_behind(&b).parse(&mut ctx);
    assert_eq!(outcome, Outcome::Failure(Failure::new(1, b)));
    assert_eq!(ctx.cursor(), 3);
}

#[test]
fn consume_behind_eof_matches_at_start() {
    let a = lit("a");
    let mut ctx = context(&[a.clone()], "a");

    ctx.set_cursor(1);
    assert!(consume_behind(&EOF).parse(&mut ctx).is_success());
    assert_eq!(ctx.cursor(), 0);

    ctx.set_cursor(2);
    let outcome = consume_behind(&EOF).parse(&mut ctx);
    assert_eq!(outcome, Outcome::Failure(Failure::new(1, EOF)));

    ctx.set_cursor(0);
    let outcome = consume_behind(&a).parse(&mut ctx);
    assert_eq!(outcome, Outcome::Failure(Failure::new(0, a)));
}

#[test]
fn consume_until_token() {
    let semi = lit(";");

    let (outcome, cursor) = run(&[semi.clone()], &consume_until(&semi), "a b;c");

    assert_eq!(outcome, Outcome::Success(vec!["a b".to_owned()]));
    assert_eq!(cursor, 1);
}

#[test]
fn consume_until_missing_token_fails_at_end() {
    let semi = lit(";");

    let (outcome, cursor) = run(&[semi.clone()], &consume_until(&semi), "abc");

    assert_eq!(outcome, Outcome::Failure(Failure::new(1, semi)));
    assert_eq!(cursor, 0);
}

#[test]
fn consume_until_eof_gathers_everything() {
    let semi = lit(";");

    let (outcome, cursor) = run(&[semi], &consume_until(EOF), "a;;b");

    assert_eq!(
        outcome,
        Outcome::Success(vec!["a".to_owned(), ";".into(), ";".into(), "b".into()])
    );
    assert_eq!(cursor, 5);
}

#[test]
fn consume_until_grammar() {
    let semi = lit(";");
    let double = and((consume(&semi), consume(&semi)));

    let (outcome, cursor) = run(&[semi], &consume_until(double), "a;b;;c");

    assert_eq!(
        outcome,
        Outcome::Success(vec!["a".to_owned(), ";".into(), "b".into()])
    );
    assert_eq!(cursor, 3);
}

#[test]
fn consume_until_missing_grammar_fails_at_start() {
    let semi = lit(";");
    let double = and((consume(&semi), consume(&semi)));

    let (outcome, cursor) = run(&[semi], &consume_until(double), "a;b");

    assert_eq!(outcome, Outcome::Failure(Failure::new(0, UNEXPECTED)));
    assert_eq!(cursor, 0);
}

#[test]
fn matchers_fail_fast_once_halted() {
    let a = lit("a");
    let mut ctx = context(&[a.clone()], "a");
    ctx.halt(Error::UnknownRule("stop".into()));

    assert!(consume(&a).parse(&mut ctx).is_failure());
    assert!(consume_until(&a).parse(&mut ctx).is_failure());
    assert_eq!(ctx.cursor(), 0);
    assert_eq!(ctx.deepest(), None);
}
