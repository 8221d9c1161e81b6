//! nanolex: a backtracking parser-combinator runtime.
//!
//! Input text is split once into chunks by the alternation of every registered
//! token; grammars then walk those chunks with a cursor, backtracking freely.
//!
//! # Example
//!
//! ```
//! use nanolex::{Parser, Token, and, consume, one_or_many_sep};
//!
//! let number = Token::pattern(r"\d+").unwrap().named("Number");
//! let comma = Token::literal(",");
//!
//! let parser = Parser::builder([number.clone(), comma.clone()])
//!     .rule("List", move |_| {
//!         one_or_many_sep(consume(&number), consume(&comma))
//!             .map(|items| items.join("+"))
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(parser.parse("List", "1,2,3").unwrap(), "1+2+3");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod combinators;
pub mod parser;
pub mod trace;

mod context;
mod diagnostics;
mod grammar;
mod repetition;
mod rules;
mod terminals;
mod token;
mod tokenizer;

#[cfg(test)]
mod lib_tests;
#[cfg(test)]
mod terminals_tests;
#[cfg(test)]
pub(crate) mod test_utils;
#[cfg(test)]
mod token_tests;

pub use combinators::{Sequence, and, not, or, peek, skip_in, zero_or_one};
pub use context::{Context, Failure, Outcome};
pub use diagnostics::SyntaxError;
pub use grammar::Grammar;
pub use parser::{
    DEFAULT_RECURSION_LIMIT, Parser, ParserBuilder, RuleFactory, SkipFactory, create_parser,
};
pub use repetition::{
    Repetition, one_or_many, one_or_many_sep, one_or_many_until, zero_or_many, zero_or_many_sep,
    zero_or_many_until,
};
pub use rules::{RuleRef, Rules, rule};
pub use terminals::{Sentinel, consume, consume_behind, consume_until};
pub use token::{EOF, INFINITE_LOOP, Matcher, Token, UNEXPECTED};
pub use tokenizer::{Chunks, Tokenizer};
pub use trace::{NoopTracer, PrintTracer, Tracer};

/// Errors surfaced by parser construction and by `Parser::parse`.
///
/// Everything except [`Error::Syntax`] points at a defect in the grammar
/// itself rather than in the parsed input.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The input does not match the grammar.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A repeated rule matched without consuming input.
    #[error(
        "infinite loop: repetition in {} matched without consuming input at byte {offset}",
        .rule.as_deref().map_or_else(|| "entry rule".to_owned(), |rule| format!("rule `{rule}`"))
    )]
    InfiniteLoop { rule: Option<String>, offset: usize },

    /// Too many nested rule invocations, usually left recursion.
    #[error("recursion limit of {limit} exceeded while entering rule `{rule}`")]
    RecursionLimitExceeded { rule: String, limit: u32 },

    #[error(
        "rule `{name}` is referenced{} but never defined",
        .referenced_from.as_deref().map_or_else(String::new, |from| format!(" from `{from}`"))
    )]
    UndefinedRule {
        name: String,
        referenced_from: Option<String>,
    },

    /// A rule handle was invoked before its parser finished resolving rules.
    #[error("rule `{name}` invoked before the rule table was resolved")]
    UnresolvedRule { name: String },

    #[error("rule `{0}` is defined more than once")]
    DuplicateRule(String),

    /// `parse` was asked for a rule the parser does not know.
    #[error("unknown rule `{0}`")]
    UnknownRule(String),

    #[error("invalid token pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl Error {
    /// True for every variant that indicates a broken grammar rather than bad input.
    pub fn is_grammar_defect(&self) -> bool {
        !matches!(self, Error::Syntax(_))
    }

    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for parser construction and parsing.
pub type Result<T> = std::result::Result<T, Error>;
