//! Sequence, choice, optional, lookahead and skip-injection combinators.
//!
//! Every combinator here honors the restore contract: on failure the cursor
//! is back where the combinator started.

use crate::context::{Context, Failure, Outcome};
use crate::grammar::Grammar;
use crate::token::UNEXPECTED;

/// Grammars that can run one after another, collecting their values.
///
/// Implemented for tuples of up to ten grammars (heterogeneous values, tuple
/// output), for arrays and vectors of same-typed grammars (`Vec` output) and
/// for `()`.
pub trait Sequence: Send + Sync + 'static {
    type Output: 'static;

    /// Run every element in order, stopping at the first failure.
    ///
    /// Does not restore on failure; `and` does.
    fn parse_all(&self, ctx: &mut Context<'_>) -> Outcome<Self::Output>;
}

impl Sequence for () {
    type Output = ();

    fn parse_all(&self, _ctx: &mut Context<'_>) -> Outcome<()> {
        Outcome::Success(())
    }
}

impl<T: 'static> Sequence for Vec<Grammar<T>> {
    type Output = Vec<T>;

    fn parse_all(&self, ctx: &mut Context<'_>) -> Outcome<Vec<T>> {
        parse_each(self, ctx)
    }
}

impl<T: 'static, const N: usize> Sequence for [Grammar<T>; N] {
    type Output = Vec<T>;

    fn parse_all(&self, ctx: &mut Context<'_>) -> Outcome<Vec<T>> {
        parse_each(self, ctx)
    }
}

fn parse_each<T: 'static>(grammars: &[Grammar<T>], ctx: &mut Context<'_>) -> Outcome<Vec<T>> {
    let mut values = Vec::with_capacity(grammars.len());
    for grammar in grammars {
        match grammar.parse(ctx) {
            Outcome::Success(value) => values.push(value),
            Outcome::Failure(failure) => return Outcome::Failure(failure),
        }
    }
    Outcome::Success(values)
}

macro_rules! tuple_sequence {
    ($($name:ident $value:ident),+) => {
        impl<$($name: 'static),+> Sequence for ($(Grammar<$name>,)+) {
            type Output = ($($name,)+);

            #[allow(non_snake_case)]
            fn parse_all(&self, ctx: &mut Context<'_>) -> Outcome<Self::Output> {
                let ($($name,)+) = self;
                $(
                    let $value = match $name.parse(ctx) {
                        Outcome::Success(value) => value,
                        Outcome::Failure(failure) => return Outcome::Failure(failure),
                    };
                )+
                Outcome::Success(($($value,)+))
            }
        }
    };
}

tuple_sequence!(A a);
tuple_sequence!(A a, B b);
tuple_sequence!(A a, B b, C c);
tuple_sequence!(A a, B b, C c, D d);
tuple_sequence!(A a, B b, C c, D d, E e);
tuple_sequence!(A a, B b, C c, D d, E e, F f);
tuple_sequence!(A a, B b, C c, D d, E e, F f, G g);
tuple_sequence!(A a, B b, C c, D d, E e, F f, G g, H h);
tuple_sequence!(A a, B b, C c, D d, E e, F f, G g, H h, I i);
tuple_sequence!(A a, B b, C c, D d, E e, F f, G g, H h, I i, J j);

/// Match every grammar of `sequence` in order.
///
/// On failure the cursor returns to where the sequence started and the first
/// failure is reported.
pub fn and<S: Sequence>(sequence: S) -> Grammar<S::Output> {
    Grammar::new(move |ctx| {
        let start = ctx.cursor();
        let outcome = sequence.parse_all(ctx);
        if outcome.is_failure() {
            ctx.restore(start);
        }
        outcome
    })
}

/// Ordered choice: the first alternative that matches wins.
///
/// The cursor is restored between attempts. When nothing matches, the
/// deepest failure among the alternatives is reported; an empty choice fails
/// with `UNEXPECTED`.
pub fn or<T: 'static>(alternatives: impl IntoIterator<Item = Grammar<T>>) -> Grammar<T> {
    let alternatives: Vec<Grammar<T>> = alternatives.into_iter().collect();
    Grammar::new(move |ctx| {
        let start = ctx.cursor();
        let mut deepest: Option<Failure> = None;

        for alternative in &alternatives {
            match alternative.parse(ctx) {
                Outcome::Success(value) => return Outcome::Success(value),
                Outcome::Failure(failure) => {
                    ctx.restore(start);
                    if deepest
                        .as_ref()
                        .is_none_or(|deepest| failure.is_at_least_as_deep(deepest))
                    {
                        deepest = Some(failure);
                    }
                }
            }
        }

        let failure = match deepest {
            Some(failure) => failure,
            None => ctx.fail(start, UNEXPECTED),
        };
        Outcome::Failure(failure)
    })
}

/// Optional match: `Some(value)`, or `None` without moving the cursor.
pub fn zero_or_one<T: 'static>(rule: Grammar<T>) -> Grammar<Option<T>> {
    Grammar::new(move |ctx| {
        let start = ctx.cursor();
        match rule.parse(ctx) {
            Outcome::Success(value) => Outcome::Success(Some(value)),
            Outcome::Failure(_) => {
                ctx.restore(start);
                Outcome::Success(None)
            }
        }
    })
}

/// Zero-width lookahead: run `rule`, then put the cursor back.
///
/// The outcome is propagated unchanged.
pub fn peek<T: 'static>(rule: Grammar<T>) -> Grammar<T> {
    Grammar::new(move |ctx| lookahead(ctx, &rule))
}

/// Negative lookahead: succeed exactly when `rule` does not match here.
///
/// Never moves the cursor. The inner failure is not leaked.
pub fn not<T: 'static>(rule: Grammar<T>) -> Grammar<()> {
    Grammar::new(move |ctx| {
        let start = ctx.cursor();
        match lookahead(ctx, &rule) {
            Outcome::Success(_) => Outcome::Failure(ctx.fail(start, UNEXPECTED)),
            Outcome::Failure(_) => Outcome::Success(()),
        }
    })
}

/// Run `rule` with `skip` installed as the skip rule.
///
/// The previous skip rule, if any, is reinstated afterwards whatever the
/// outcome, so skipping regions nest.
pub fn skip_in<S: 'static, T: 'static>(skip: Grammar<S>, rule: Grammar<T>) -> Grammar<T> {
    let skip = skip.discard();
    Grammar::new(move |ctx| {
        let previous = ctx.replace_skip(Some(skip.clone()));
        let outcome = rule.parse(ctx);
        ctx.replace_skip(previous);
        outcome
    })
}

/// Run `rule` without moving the cursor or touching the deepest failure.
pub(crate) fn lookahead<T>(ctx: &mut Context<'_>, rule: &Grammar<T>) -> Outcome<T>
where
    T: 'static,
{
    let start = ctx.cursor();
    let mark = ctx.deepest_mark();
    let outcome = rule.parse(ctx);
    ctx.restore(start);
    ctx.reset_deepest(mark);
    outcome
}

/// Whether `rule` matches at the cursor, as a lookahead.
pub(crate) fn probe<T: 'static>(ctx: &mut Context<'_>, rule: &Grammar<T>) -> bool {
    lookahead(ctx, rule).is_success()
}
