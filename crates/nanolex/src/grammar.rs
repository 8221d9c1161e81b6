use std::fmt;
use std::sync::Arc;

use crate::context::{Context, Outcome};

type Run<T> = dyn Fn(&mut Context<'_>) -> Outcome<T> + Send + Sync;

/// A parsing rule: a shared function from parse state to an outcome.
///
/// A failing grammar may leave the cursor anywhere; the combinator wrapping
/// it restores. Cloning shares the underlying function.
pub struct Grammar<T> {
    run: Arc<Run<T>>,
}

impl<T: 'static> Grammar<T> {
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Outcome<T> + Send + Sync + 'static,
    {
        Self { run: Arc::new(run) }
    }

    #[inline]
    pub fn parse(&self, ctx: &mut Context<'_>) -> Outcome<T> {
        (self.run)(ctx)
    }

    /// Transform the value on success. Failures pass through untouched.
    pub fn map<U, F>(self, f: F) -> Grammar<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Grammar::new(move |ctx| self.parse(ctx).map(&f))
    }

    /// Drop the value, keeping only whether and where it matched.
    pub fn discard(self) -> Grammar<()> {
        self.map(|_| ())
    }
}

impl<T> Clone for Grammar<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Grammar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Grammar")
    }
}
