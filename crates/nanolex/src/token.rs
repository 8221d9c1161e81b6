//! Tokens: literal or pattern matchers with a diagnostic name.
//!
//! Tokens play two roles. Their source fragments are joined into the
//! tokenizer's alternation, and their `test` decides whether one chunk is an
//! instance of the token. A token that is never handed to a tokenizer is
//! still usable by `consume` to classify filler chunks.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use regex_automata::meta::Regex;

use crate::{Error, Result};

/// Matches only when the cursor sits at the end of the chunk sequence.
pub const EOF: Token = Token::Eof;

/// Generic mismatch reported by lookahead-style failures.
pub const UNEXPECTED: Token = Token::Unexpected;

/// Reported by repetitions whose element matched without consuming input.
pub const INFINITE_LOOP: Token = Token::InfiniteLoop;

/// A token: one of the three sentinels, or a shared matcher.
///
/// Cloning is cheap. Matchers compare by identity, so two tokens built from
/// the same pattern are still different tokens.
#[derive(Clone)]
pub enum Token {
    Eof,
    Unexpected,
    InfiniteLoop,
    Matcher(Arc<Matcher>),
}

impl Token {
    /// A token matching exactly `text`.
    pub fn literal(text: impl Into<String>) -> Token {
        let text = text.into();
        Token::Matcher(Arc::new(Matcher {
            name: text.clone(),
            source: regex_syntax::escape(&text),
            kind: MatcherKind::Literal(text),
        }))
    }

    /// A token matching chunks that fully match the regular expression `source`.
    pub fn pattern(source: impl Into<String>) -> Result<Token> {
        let source = source.into();
        let regex =
            Regex::new(&format!("^(?:{source})$")).map_err(|err| Error::InvalidPattern {
                pattern: source.clone(),
                message: err.to_string(),
            })?;

        Ok(Token::Matcher(Arc::new(Matcher {
            name: source.clone(),
            source,
            kind: MatcherKind::Pattern {
                regex,
                memo: Mutex::default(),
            },
        })))
    }

    /// Override the diagnostic name. Sentinels keep their fixed names.
    pub fn named(self, name: impl Into<String>) -> Token {
        match self {
            Token::Matcher(matcher) => {
                let mut matcher = Arc::unwrap_or_clone(matcher);
                matcher.name = name.into();
                Token::Matcher(Arc::new(matcher))
            }
            sentinel => sentinel,
        }
    }

    /// Name used in diagnostics and traces.
    pub fn name(&self) -> &str {
        match self {
            Token::Eof => "EOF",
            Token::Unexpected => "UNEXPECTED",
            Token::InfiniteLoop => "INFINITE_LOOP",
            Token::Matcher(matcher) => &matcher.name,
        }
    }

    /// Regex fragment contributed to the tokenizer alternation.
    ///
    /// Sentinels have none.
    pub fn source(&self) -> Option<&str> {
        match self {
            Token::Matcher(matcher) => Some(&matcher.source),
            _ => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Token::Matcher(_))
    }

    /// Whether `chunk` is an instance of this token. Sentinels never match text.
    pub fn test(&self, chunk: &str) -> bool {
        match self {
            Token::Matcher(matcher) => matcher.test(chunk),
            _ => false,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Matcher(a), Token::Matcher(b)) => Arc::ptr_eq(a, b),
            (Token::Eof, Token::Eof)
            | (Token::Unexpected, Token::Unexpected)
            | (Token::InfiniteLoop, Token::InfiniteLoop) => true,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Matcher(matcher) => write!(f, "Token({:?})", matcher.name),
            sentinel => f.write_str(sentinel.name()),
        }
    }
}

/// The compiled half of a non-sentinel token.
pub struct Matcher {
    name: String,
    source: String,
    kind: MatcherKind,
}

enum MatcherKind {
    Literal(String),
    Pattern {
        regex: Regex,
        memo: Mutex<HashMap<String, bool>>,
    },
}

impl Matcher {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, MatcherKind::Literal(_))
    }

    fn test(&self, chunk: &str) -> bool {
        match &self.kind {
            MatcherKind::Literal(text) => text == chunk,
            MatcherKind::Pattern { regex, memo } => {
                if let Some(&hit) = memo
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(chunk)
                {
                    return hit;
                }
                let hit = regex.is_match(chunk);
                memo.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(chunk.to_owned(), hit);
                hit
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn memoized(&self) -> usize {
        match &self.kind {
            MatcherKind::Literal(_) => 0,
            MatcherKind::Pattern { memo, .. } => {
                memo.lock().unwrap_or_else(PoisonError::into_inner).len()
            }
        }
    }
}

// Renaming a shared matcher copies it; the copy starts with an empty memo.
impl Clone for Matcher {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            MatcherKind::Literal(text) => MatcherKind::Literal(text.clone()),
            MatcherKind::Pattern { regex, .. } => MatcherKind::Pattern {
                regex: regex.clone(),
                memo: Mutex::default(),
            },
        };
        Self {
            name: self.name.clone(),
            source: self.source.clone(),
            kind,
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}
