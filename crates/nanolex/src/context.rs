//! Per-parse state and the success/failure protocol.
//!
//! A `Context` belongs to exactly one parse. Grammars move its cursor
//! forward; combinators that fail rewind it to where they started, so a
//! caller never restores on a callee's behalf.

use std::sync::Arc;

use crate::grammar::Grammar;
use crate::token::{Token, UNEXPECTED};
use crate::tokenizer::Chunks;
use crate::trace::Tracer;
use crate::{Error, Result, SyntaxError};

/// Where a grammar failed and which token it wanted there.
///
/// `position` is a chunk index; `chunks.len()` means end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub position: usize,
    pub expected: Token,
}

impl Failure {
    pub fn new(position: usize, expected: Token) -> Self {
        Self { position, expected }
    }

    /// Later failures win ties.
    pub fn is_at_least_as_deep(&self, other: &Failure) -> bool {
        self.position >= other.position
    }
}

/// Outcome of running a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(self) -> Option<Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }
}

/// Mutable state of one parse over a shared chunk sequence.
pub struct Context<'t> {
    chunks: Arc<Chunks>,
    cursor: usize,
    skip: Option<Grammar<()>>,
    skipping: bool,
    deepest: Option<Failure>,
    rule_stack: Vec<Arc<str>>,
    recursion_limit: Option<u32>,
    fatal: Option<Error>,
    tracer: Option<&'t mut dyn Tracer>,
}

impl Context<'static> {
    pub fn new(chunks: Arc<Chunks>) -> Self {
        Self::build(chunks, None)
    }
}

impl<'t> Context<'t> {
    /// A context reporting its events to `tracer`.
    pub fn with_tracer(chunks: Arc<Chunks>, tracer: &'t mut dyn Tracer) -> Self {
        Self::build(chunks, Some(tracer))
    }

    fn build(chunks: Arc<Chunks>, tracer: Option<&'t mut dyn Tracer>) -> Self {
        Self {
            chunks,
            cursor: 0,
            skip: None,
            skipping: false,
            deepest: None,
            rule_stack: Vec::new(),
            recursion_limit: None,
            fatal: None,
            tracer,
        }
    }

    /// Install the default skip rule.
    pub fn with_skip(mut self, skip: Option<Grammar<()>>) -> Self {
        self.skip = skip;
        self
    }

    /// Maximum nesting of rule references; `None` disables the guard.
    pub fn with_recursion_limit(mut self, limit: Option<u32>) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn chunks(&self) -> &Chunks {
        &self.chunks
    }

    pub fn chunk(&self, index: usize) -> Option<&str> {
        self.chunks.get(index)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor without reporting a backtrack.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    /// Rewind to `cursor` after a failed attempt.
    pub fn restore(&mut self, cursor: usize) {
        if cursor != self.cursor {
            if let Some(tracer) = &mut self.tracer {
                tracer.trace_backtrack(self.cursor, cursor);
            }
            self.cursor = cursor;
        }
    }

    /// True when no chunk is left, empty or not.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.chunks.len()
    }

    /// Advance over empty chunks and return the new cursor.
    pub fn skip_empty(&mut self) -> usize {
        while self.chunk(self.cursor).is_some_and(str::is_empty) {
            self.cursor += 1;
        }
        self.cursor
    }

    /// Build a failure and remember it if it is the deepest so far.
    pub fn fail(&mut self, position: usize, expected: Token) -> Failure {
        let failure = Failure::new(position, expected);
        if self
            .deepest
            .as_ref()
            .is_none_or(|deepest| failure.is_at_least_as_deep(deepest))
        {
            self.deepest = Some(failure.clone());
        }
        failure
    }

    /// The deepest failure recorded during this parse.
    pub fn deepest(&self) -> Option<&Failure> {
        self.deepest.as_ref()
    }

    pub(crate) fn deepest_mark(&self) -> Option<Failure> {
        self.deepest.clone()
    }

    pub(crate) fn reset_deepest(&mut self, mark: Option<Failure>) {
        self.deepest = mark;
    }

    pub(crate) fn replace_skip(&mut self, skip: Option<Grammar<()>>) -> Option<Grammar<()>> {
        std::mem::replace(&mut self.skip, skip)
    }

    /// Run the skip rule once at the cursor, with reentrancy disabled.
    ///
    /// Returns whether it advanced. Failures inside the skip rule never
    /// reach the deepest-failure record.
    pub(crate) fn try_skip(&mut self) -> bool {
        if self.skipping {
            return false;
        }
        let Some(skip) = self.skip.clone() else {
            return false;
        };

        let from = self.cursor;
        let mark = self.deepest_mark();
        self.skipping = true;
        let outcome = skip.parse(self);
        self.skipping = false;
        self.reset_deepest(mark);

        if outcome.is_success() && self.cursor > from {
            if let Some(tracer) = &mut self.tracer {
                tracer.trace_skip(from, self.cursor);
            }
            true
        } else {
            self.cursor = from;
            false
        }
    }

    /// Push a rule invocation, enforcing the recursion limit.
    ///
    /// Returns false when the parse must stop.
    pub(crate) fn enter_rule(&mut self, name: &Arc<str>) -> bool {
        if self.fatal.is_some() {
            return false;
        }
        if let Some(limit) = self.recursion_limit {
            if self.rule_stack.len() >= limit as usize {
                self.halt(Error::RecursionLimitExceeded {
                    rule: name.to_string(),
                    limit,
                });
                return false;
            }
        }

        self.rule_stack.push(Arc::clone(name));
        if let Some(tracer) = &mut self.tracer {
            tracer.trace_enter_rule(name, self.cursor);
        }
        true
    }

    pub(crate) fn exit_rule(&mut self, matched: bool) {
        let Some(name) = self.rule_stack.pop() else {
            return;
        };
        if let Some(tracer) = &mut self.tracer {
            tracer.trace_exit_rule(&name, self.cursor, matched);
        }
    }

    /// Innermost rule being parsed.
    pub fn current_rule(&self) -> Option<&str> {
        self.rule_stack.last().map(|name| &**name)
    }

    /// Record a fatal grammar defect. The first one sticks.
    pub fn halt(&mut self, error: Error) {
        if self.fatal.is_none() {
            self.fatal = Some(error);
        }
    }

    pub fn is_halted(&self) -> bool {
        self.fatal.is_some()
    }

    pub fn fatal(&self) -> Option<&Error> {
        self.fatal.as_ref()
    }

    /// Failure returned by matchers once the parse is halted. Not recorded.
    pub(crate) fn halted_failure(&self) -> Failure {
        Failure::new(self.cursor, UNEXPECTED)
    }

    pub(crate) fn trace_match(&mut self, token: &Token, index: usize) {
        if let Some(tracer) = &mut self.tracer {
            let chunk = self.chunks.get(index).unwrap_or_default();
            tracer.trace_match(token, index, chunk);
        }
    }

    pub(crate) fn trace_mismatch(&mut self, token: &Token, index: usize) {
        if let Some(tracer) = &mut self.tracer {
            tracer.trace_mismatch(token, index, self.chunks.get(index));
        }
    }

    /// Turn the final outcome into the parse result.
    ///
    /// A fatal defect wins over a syntax error; a syntax error reports the
    /// deepest failure seen.
    pub(crate) fn finish<T>(self, outcome: Outcome<T>) -> Result<T> {
        if let Some(error) = self.fatal {
            return Err(error);
        }
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(failure) => {
                let failure = match self.deepest {
                    Some(deepest) if deepest.is_at_least_as_deep(&failure) => deepest,
                    _ => failure,
                };
                Err(Error::Syntax(SyntaxError::new(&self.chunks, &failure)))
            }
        }
    }
}
