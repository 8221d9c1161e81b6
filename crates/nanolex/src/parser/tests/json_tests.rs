use std::sync::LazyLock;
use std::thread;

use indoc::indoc;
use serde_json::{Value, json};

use crate::{EOF, Error, Grammar, Parser, Rules, Token, and, consume, or, skip_in, zero_or_many_sep};

struct JsonTokens {
    whitespace: Token,
    string: Token,
    number: Token,
    comma: Token,
    colon: Token,
    lcurly: Token,
    rcurly: Token,
    lsquare: Token,
    rsquare: Token,
    true_kw: Token,
    false_kw: Token,
    null_kw: Token,
}

static TOKENS: LazyLock<JsonTokens> = LazyLock::new(|| JsonTokens {
    whitespace: Token::pattern(r"[ \t\n\r]+").unwrap().named("WhiteSpace"),
    string: Token::pattern(r#""(?:[^\\"]|\\(?:[bfnrtv"\\/]|u[0-9a-fA-F]{4}))*""#)
        .unwrap()
        .named("StringLiteral"),
    number: Token::pattern(r"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?")
        .unwrap()
        .named("NumberLiteral"),
    comma: Token::literal(","),
    colon: Token::literal(":"),
    lcurly: Token::literal("{"),
    rcurly: Token::literal("}"),
    lsquare: Token::literal("["),
    rsquare: Token::literal("]"),
    true_kw: Token::literal("true"),
    false_kw: Token::literal("false"),
    null_kw: Token::literal("null"),
});

/// Split order; whitespace stays filler and is skipped by `PROGRAM`.
fn split_order() -> Vec<Token> {
    let t = &*TOKENS;
    [
        &t.string, &t.number, &t.comma, &t.colon, &t.lcurly, &t.rcurly, &t.lsquare, &t.rsquare,
        &t.true_kw, &t.false_kw, &t.null_kw,
    ]
    .into_iter()
    .cloned()
    .collect()
}

fn string() -> Grammar<String> {
    consume(&TOKENS.string).map(|raw| serde_json::from_str(&raw).expect("string literal"))
}

fn object(rules: &Rules<Value>) -> Grammar<Value> {
    let t = &*TOKENS;
    let item = and((string(), consume(&t.colon), rules.rule("VALUE")))
        .map(|(key, _, value)| (key, value));
    and((
        consume(&t.lcurly),
        zero_or_many_sep(item, consume(&t.comma)),
        consume(&t.rcurly),
    ))
    .map(|(_, entries, _)| Value::Object(entries.into_iter().collect()))
}

fn array(rules: &Rules<Value>) -> Grammar<Value> {
    let t = &*TOKENS;
    and((
        consume(&t.lsquare),
        zero_or_many_sep(rules.rule("VALUE"), consume(&t.comma)),
        consume(&t.rsquare),
    ))
    .map(|(_, items, _)| Value::Array(items))
}

fn value(rules: &Rules<Value>) -> Grammar<Value> {
    let t = &*TOKENS;
    or([
        string().map(Value::String),
        consume(&t.number).map(|raw| serde_json::from_str(&raw).expect("number literal")),
        rules.rule("OBJECT"),
        rules.rule("ARRAY"),
        consume(&t.true_kw).map(|_| Value::Bool(true)),
        consume(&t.false_kw).map(|_| Value::Bool(false)),
        consume(&t.null_kw).map(|_| Value::Null),
    ])
}

fn json_parser() -> Parser<Value> {
    Parser::builder(split_order())
        .rule("JSON", |rules| or([rules.rule("OBJECT"), rules.rule("ARRAY")]))
        .rule("OBJECT", object)
        .rule("ARRAY", array)
        .rule("VALUE", value)
        .rule("PROGRAM", |rules| {
            let document = and((rules.rule("JSON"), consume(&EOF))).map(|(json, _)| json);
            skip_in(consume(&TOKENS.whitespace), document)
        })
        .build()
        .unwrap()
}

fn parse(input: &str) -> Result<Value, Error> {
    json_parser().parse("PROGRAM", input)
}

#[test]
fn empty_object() {
    assert_eq!(parse("{}").unwrap(), json!({}));
}

#[test]
fn nested_document() {
    let input = r#"{"a":[1,2,"3",null,{},[]],"b":{},"c":{"d":{"e":"asd","f":0}}}"#;

    let parsed = parse(input).unwrap();

    assert_eq!(parsed, serde_json::from_str::<Value>(input).unwrap());
    assert_eq!(
        parsed,
        json!({"a": [1, 2, "3", null, {}, []], "b": {}, "c": {"d": {"e": "asd", "f": 0}}})
    );
}

#[test]
fn whitespace_is_skipped_everywhere() {
    let input = indoc! {r#"
        {
          "name": "Example",
          "nums": [1, 2, 3],
          "nested": { "ok": true, "n": null, "v": -12.5e2, "s": "a\"b" }
        }
    "#};

    assert_eq!(
        parse(input).unwrap(),
        serde_json::from_str::<Value>(input).unwrap()
    );
}

#[test]
fn top_level_array() {
    assert_eq!(
        parse("[true, false, null]").unwrap(),
        json!([true, false, null])
    );
}

#[test]
fn scalar_is_not_a_document() {
    let err = parse("1").unwrap_err();

    let syntax = err.as_syntax().expect("syntax error");
    assert_eq!(syntax.expected.as_deref(), Some("["));
    assert_eq!(syntax.column, 1);
}

#[test]
fn missing_comma() {
    let err = parse(r#"{"a":1 "b":2}"#).unwrap_err();

    insta::assert_snapshot!(err.to_string(), @r#"
    expected "}", found "\"b\"" at 1:8

    1 | {"a":1 "b":2}
      |        ^^^
    "#);
}

#[test]
fn missing_closing_bracket_reports_deepest_failure() {
    let input = indoc! {r#"
        {
          "a": 1,
          "b": [1, 2
        }
    "#};

    let err = parse(input).unwrap_err();

    insta::assert_snapshot!(err.to_string(), @r#"
    expected "]", found "}" at 4:1

    3 |   "b": [1, 2
    4 | }
      | ^
    "#);
}

#[test]
fn missing_closing_brace() {
    let err = parse(r#"{"a":1"#).unwrap_err();

    let syntax = err.as_syntax().expect("syntax error");
    assert_eq!(syntax.expected.as_deref(), Some("}"));
    assert_eq!(syntax.found, None);
    assert_eq!(syntax.column - 1, r#"{"a":1"#.len());
}

#[test]
fn trailing_input_is_rejected() {
    let err = parse("{} {}").unwrap_err();

    insta::assert_snapshot!(err.to_string(), @r#"
    expected EOF, found "{" at 1:4

    1 | {} {}
      |    ^
    "#);
}

#[test]
fn one_parser_many_threads() {
    let parser = json_parser();
    let inputs = [
        r#"{"a":[1,2,3]}"#,
        r#"[{"b":null},{"c":[true]}]"#,
        r#"{ "d" : { "e" : "f" } }"#,
        r#"[[[[[]]]]]"#,
    ];

    thread::scope(|scope| {
        for input in inputs {
            let parser = &parser;
            scope.spawn(move || {
                let expected = serde_json::from_str::<Value>(input).unwrap();
                for _ in 0..50 {
                    assert_eq!(parser.parse("PROGRAM", input).unwrap(), expected);
                }
            });
        }
    });

    assert_eq!(parser.tokenizer().cached(), inputs.len());
}
