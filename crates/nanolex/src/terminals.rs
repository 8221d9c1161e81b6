//! Terminal matchers: the only grammars that look at chunk text.

use crate::combinators::probe;
use crate::context::Outcome;
use crate::grammar::Grammar;
use crate::token::{EOF, Token, UNEXPECTED};

/// Match one chunk of `token` at the cursor.
///
/// Empty chunks are skipped. When the chunk does not match and a skip rule is
/// installed, the skip rule runs once (not recursively) and matching retries
/// after it. `EOF` matches at the end of input, after skipping.
pub fn consume(token: &Token) -> Grammar<String> {
    let token = token.clone();
    Grammar::new(move |ctx| {
        if ctx.is_halted() {
            return Outcome::Failure(ctx.halted_failure());
        }
        let start = ctx.cursor();

        loop {
            let index = ctx.skip_empty();
            if index >= ctx.chunks().len() && token == EOF {
                ctx.trace_match(&token, index);
                return Outcome::Success(String::new());
            }
            let matched = ctx
                .chunk(index)
                .filter(|chunk| token.test(chunk))
                .map(str::to_owned);
            if let Some(chunk) = matched {
                ctx.trace_match(&token, index);
                ctx.set_cursor(index + 1);
                return Outcome::Success(chunk);
            }
            if !ctx.try_skip() {
                break;
            }
        }

        let position = ctx.cursor();
        ctx.trace_mismatch(&token, position);
        ctx.restore(start);
        Outcome::Failure(ctx.fail(position, token.clone()))
    })
}

/// Match one chunk of `token` just before the cursor, moving one step back.
///
/// Empty chunks are skipped and the skip rule is ignored. `EOF` matches only
/// at the start of input. Wrap in `peek` or `not` for a pure lookbehind.
pub fn consume_behind(token: &Token) -> Grammar<String> {
    let token = token.clone();
    Grammar::new(move |ctx| {
        if ctx.is_halted() {
            return Outcome::Failure(ctx.halted_failure());
        }

        let mut index = ctx.cursor();
        while index > 0 && ctx.chunk(index - 1).is_some_and(str::is_empty) {
            index -= 1;
        }

        if index == 0 {
            if token == EOF {
                ctx.set_cursor(0);
                return Outcome::Success(String::new());
            }
            return Outcome::Failure(ctx.fail(0, token.clone()));
        }

        let matched = ctx
            .chunk(index - 1)
            .filter(|chunk| token.test(chunk))
            .map(str::to_owned);
        match matched {
            Some(chunk) => {
                ctx.trace_match(&token, index - 1);
                ctx.set_cursor(index - 1);
                Outcome::Success(chunk)
            }
            None => {
                ctx.trace_mismatch(&token, index - 1);
                Outcome::Failure(ctx.fail(index - 1, token.clone()))
            }
        }
    })
}

/// What `consume_until` stops at.
#[derive(Debug, Clone)]
pub enum Sentinel {
    /// Stop before a chunk of this token; `EOF` gathers to the end.
    Token(Token),
    /// Stop where this grammar matches under lookahead.
    Grammar(Grammar<()>),
}

impl From<Token> for Sentinel {
    fn from(token: Token) -> Self {
        Sentinel::Token(token)
    }
}

impl From<&Token> for Sentinel {
    fn from(token: &Token) -> Self {
        Sentinel::Token(token.clone())
    }
}

impl<T: 'static> From<Grammar<T>> for Sentinel {
    fn from(grammar: Grammar<T>) -> Self {
        Sentinel::Grammar(grammar.discard())
    }
}

/// Gather chunks verbatim up to, not including, the sentinel.
///
/// Empty chunks are not gathered. A token sentinel that never shows up fails
/// at the end of input, expecting that token; a grammar sentinel that never
/// matches fails at the start with `UNEXPECTED`.
pub fn consume_until(sentinel: impl Into<Sentinel>) -> Grammar<Vec<String>> {
    match sentinel.into() {
        Sentinel::Token(token) => until_token(token),
        Sentinel::Grammar(stop) => until_grammar(stop),
    }
}

fn until_token(token: Token) -> Grammar<Vec<String>> {
    Grammar::new(move |ctx| {
        if ctx.is_halted() {
            return Outcome::Failure(ctx.halted_failure());
        }
        let start = ctx.cursor();
        let mut gathered = Vec::new();

        loop {
            let index = ctx.skip_empty();
            let Some(chunk) = ctx.chunk(index) else {
                break;
            };
            if token.test(chunk) {
                return Outcome::Success(gathered);
            }
            gathered.push(chunk.to_owned());
            ctx.set_cursor(index + 1);
        }

        if token == EOF {
            return Outcome::Success(gathered);
        }
        let end = ctx.cursor();
        ctx.trace_mismatch(&token, end);
        ctx.restore(start);
        Outcome::Failure(ctx.fail(end, token.clone()))
    })
}

fn until_grammar(stop: Grammar<()>) -> Grammar<Vec<String>> {
    Grammar::new(move |ctx| {
        if ctx.is_halted() {
            return Outcome::Failure(ctx.halted_failure());
        }
        let start = ctx.cursor();
        let mut gathered = Vec::new();

        loop {
            let index = ctx.skip_empty();
            if probe(ctx, &stop) {
                return Outcome::Success(gathered);
            }
            let Some(chunk) = ctx.chunk(index).map(str::to_owned) else {
                break;
            };
            gathered.push(chunk);
            ctx.set_cursor(index + 1);
        }

        ctx.restore(start);
        Outcome::Failure(ctx.fail(start, UNEXPECTED))
    })
}
