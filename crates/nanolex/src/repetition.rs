//! Repetition: bounded, separated and sentinel-terminated loops.

use crate::Error;
use crate::combinators::probe;
use crate::context::Outcome;
use crate::grammar::Grammar;
use crate::token::{INFINITE_LOOP, UNEXPECTED};

/// Builder for a repeated rule.
///
/// ```
/// # use nanolex::{Repetition, Token, consume};
/// let item = Token::literal("x");
/// let comma = Token::literal(",");
/// let list = Repetition::new(consume(&item))
///     .at_least(1)
///     .separated_by(consume(&comma))
///     .build();
/// # let _ = list;
/// ```
pub struct Repetition<T> {
    rule: Grammar<T>,
    min: usize,
    separator: Option<Grammar<()>>,
    until: Option<Grammar<()>>,
}

impl<T: 'static> Repetition<T> {
    pub fn new(rule: Grammar<T>) -> Self {
        Self {
            rule,
            min: 0,
            separator: None,
            until: None,
        }
    }

    /// Fail unless at least `min` elements match.
    pub fn at_least(mut self, min: usize) -> Self {
        self.min = min;
        self
    }

    /// Require `separator` between elements. A trailing separator is not consumed.
    pub fn separated_by<S: 'static>(mut self, separator: Grammar<S>) -> Self {
        self.separator = Some(separator.discard());
        self
    }

    /// Stop before any element at which `stop` matches. `stop` is not consumed.
    pub fn until<U: 'static>(mut self, stop: Grammar<U>) -> Self {
        self.until = Some(stop.discard());
        self
    }

    pub fn build(self) -> Grammar<Vec<T>> {
        let Repetition {
            rule,
            min,
            separator,
            until,
        } = self;

        Grammar::new(move |ctx| {
            let start = ctx.cursor();
            // Position after the last element, before any separator.
            let mut rewind = start;
            let mut values = Vec::new();

            loop {
                if ctx.is_exhausted() && values.len() >= min {
                    break;
                }
                if until.as_ref().is_some_and(|stop| probe(ctx, stop)) {
                    if values.len() < min {
                        let position = ctx.cursor();
                        ctx.restore(start);
                        return Outcome::Failure(ctx.fail(position, UNEXPECTED));
                    }
                    break;
                }

                let iteration = ctx.cursor();
                match rule.parse(ctx) {
                    Outcome::Success(value) => values.push(value),
                    Outcome::Failure(failure) => {
                        if values.len() < min {
                            ctx.restore(start);
                            return Outcome::Failure(failure);
                        }
                        break;
                    }
                }
                rewind = ctx.cursor();

                if let Some(separator) = &separator {
                    if separator.parse(ctx).is_failure() {
                        break;
                    }
                }

                if ctx.cursor() == iteration {
                    let error = Error::InfiniteLoop {
                        rule: ctx.current_rule().map(str::to_owned),
                        offset: ctx.chunks().offset(iteration),
                    };
                    ctx.halt(error);
                    ctx.restore(start);
                    return Outcome::Failure(ctx.fail(iteration, INFINITE_LOOP));
                }
            }

            ctx.restore(rewind);
            Outcome::Success(values)
        })
    }
}

impl<T: 'static> From<Repetition<T>> for Grammar<Vec<T>> {
    fn from(repetition: Repetition<T>) -> Self {
        repetition.build()
    }
}

/// Repeat `rule` as often as it matches, possibly never.
pub fn zero_or_many<T: 'static>(rule: Grammar<T>) -> Grammar<Vec<T>> {
    Repetition::new(rule).build()
}

/// Repeat `rule` as often as it matches, at least once.
pub fn one_or_many<T: 'static>(rule: Grammar<T>) -> Grammar<Vec<T>> {
    Repetition::new(rule).at_least(1).build()
}

pub fn zero_or_many_sep<T: 'static, S: 'static>(
    rule: Grammar<T>,
    separator: Grammar<S>,
) -> Grammar<Vec<T>> {
    Repetition::new(rule).separated_by(separator).build()
}

pub fn one_or_many_sep<T: 'static, S: 'static>(
    rule: Grammar<T>,
    separator: Grammar<S>,
) -> Grammar<Vec<T>> {
    Repetition::new(rule)
        .at_least(1)
        .separated_by(separator)
        .build()
}

/// Repeat `rule` until `stop` matches under lookahead.
pub fn zero_or_many_until<T: 'static, U: 'static>(
    rule: Grammar<T>,
    stop: Grammar<U>,
) -> Grammar<Vec<T>> {
    Repetition::new(rule).until(stop).build()
}

pub fn one_or_many_until<T: 'static, U: 'static>(
    rule: Grammar<T>,
    stop: Grammar<U>,
) -> Grammar<Vec<T>> {
    Repetition::new(rule).at_least(1).until(stop).build()
}
