//! The parser compiler.
//!
//! A [`Parser`] ties a token set and a set of named rule factories into a
//! callable `parse(rule, text)`. Building runs in two phases: every defined
//! rule name is interned first, then each factory runs exactly once against a
//! [`Rules`] registry handing out lazy references. References are checked
//! and resolved only after all factories ran, so definition order does not
//! matter.
//!
//! Each parse tokenizes the text (cached by content), creates a fresh
//! [`Context`], and runs the requested rule followed by an end-of-input
//! check.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use nanolex_core::{Interner, Symbol};

use crate::combinators::and;
use crate::context::Context;
use crate::grammar::Grammar;
use crate::rules::{RuleRef, RuleTable, Rules, rule};
use crate::terminals::consume;
use crate::token::{EOF, Token};
use crate::tokenizer::Tokenizer;
use crate::trace::Tracer;
use crate::{Error, Result};

/// Default maximum nesting of rule invocations in one parse.
pub const DEFAULT_RECURSION_LIMIT: u32 = 512;

/// Factory building the grammar of one named rule.
pub type RuleFactory<V> = Box<dyn FnOnce(&Rules<V>) -> Grammar<V>>;

/// Factory building the default skip rule.
pub type SkipFactory<V> = Box<dyn FnOnce(&Rules<V>) -> Grammar<()>>;

/// Builder for [`Parser`].
///
/// ```
/// # use nanolex::{Parser, Token, consume};
/// let word = Token::pattern("[a-z]+").unwrap();
/// let parser = Parser::builder([word.clone()])
///     .rule("Word", move |_| consume(&word))
///     .with_recursion_limit(Some(64))
///     .build()
///     .unwrap();
/// assert_eq!(parser.parse("Word", "hello").unwrap(), "hello");
/// ```
pub struct ParserBuilder<V> {
    tokens: Vec<Token>,
    factories: IndexMap<String, RuleFactory<V>>,
    duplicate: Option<String>,
    skip: Option<SkipFactory<V>>,
    recursion_limit: Option<u32>,
    cache_limit: Option<usize>,
}

impl<V: 'static> ParserBuilder<V> {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
            factories: IndexMap::new(),
            duplicate: None,
            skip: None,
            recursion_limit: Some(DEFAULT_RECURSION_LIMIT),
            cache_limit: None,
        }
    }

    /// Define rule `name`. Its factory runs once, during [`build`](Self::build).
    pub fn rule<F>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce(&Rules<V>) -> Grammar<V> + 'static,
    {
        self.boxed_rule(name.into(), Box::new(factory))
    }

    fn boxed_rule(mut self, name: String, factory: RuleFactory<V>) -> Self {
        if self.factories.contains_key(&name) {
            self.duplicate.get_or_insert(name);
        } else {
            self.factories.insert(name, factory);
        }
        self
    }

    /// Install a default skip rule for every parse.
    pub fn skip<S, F>(mut self, factory: F) -> Self
    where
        S: 'static,
        F: FnOnce(&Rules<V>) -> Grammar<S> + 'static,
    {
        self.skip = Some(Box::new(move |rules: &Rules<V>| factory(rules).discard()));
        self
    }

    /// Set the maximum nesting of rule invocations; `None` disables the guard.
    ///
    /// Default: [`DEFAULT_RECURSION_LIMIT`].
    pub fn with_recursion_limit(mut self, limit: Option<u32>) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Bound the number of distinct texts whose chunks are cached. Default: unbounded.
    pub fn with_cache_limit(mut self, limit: Option<usize>) -> Self {
        self.cache_limit = limit;
        self
    }

    pub fn build(self) -> Result<Parser<V>> {
        if let Some(name) = self.duplicate {
            return Err(Error::DuplicateRule(name));
        }

        let tokenizer = Tokenizer::new(&self.tokens)?.with_cache_limit(self.cache_limit);

        let mut names = Interner::new();
        for name in self.factories.keys() {
            names.intern(name);
        }

        let table = Arc::new(RuleTable::new());
        let mut rules = Rules::new(&table, names);

        let mut grammars = Vec::with_capacity(self.factories.len());
        for (index, (_, factory)) in self.factories.into_iter().enumerate() {
            rules.set_current(Some(Symbol::from_raw(index as u32)));
            grammars.push(factory(&rules));
        }
        rules.set_current(None);
        let skip = self.skip.map(|factory| factory(&rules));

        let names = rules.resolve(&table, grammars)?;

        Ok(Parser {
            tokenizer,
            table,
            names,
            skip,
            recursion_limit: self.recursion_limit,
            entries: Mutex::default(),
        })
    }
}

/// A compiled parser, shareable across threads.
pub struct Parser<V> {
    tokenizer: Tokenizer,
    table: Arc<RuleTable<V>>,
    names: Interner,
    skip: Option<Grammar<()>>,
    recursion_limit: Option<u32>,
    entries: Mutex<HashMap<Symbol, Grammar<V>>>,
}

impl<V: 'static> Parser<V> {
    pub fn builder(tokens: impl IntoIterator<Item = Token>) -> ParserBuilder<V> {
        ParserBuilder::new(tokens)
    }

    /// Parse all of `text` as rule `name`.
    ///
    /// A prefix match is a syntax error. Grammar defects found on the way
    /// (zero-width repetition, runaway recursion) take precedence over
    /// syntax errors.
    pub fn parse(&self, name: &str, text: &str) -> Result<V> {
        let entry = self.entry(name)?;
        let ctx = Context::new(self.tokenizer.tokenize(text));
        self.run(&entry, ctx)
    }

    /// Like [`parse`](Self::parse), reporting every step to `tracer`.
    pub fn parse_traced(&self, name: &str, text: &str, tracer: &mut dyn Tracer) -> Result<V> {
        let entry = self.entry(name)?;
        let ctx = Context::with_tracer(self.tokenizer.tokenize(text), tracer);
        self.run(&entry, ctx)
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Defined rule names, in definition order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|(_, name)| name)
    }

    fn run(&self, entry: &Grammar<V>, ctx: Context<'_>) -> Result<V> {
        let mut ctx = ctx
            .with_skip(self.skip.clone())
            .with_recursion_limit(self.recursion_limit);
        let outcome = entry.parse(&mut ctx);
        ctx.finish(outcome)
    }

    /// The rule wrapped with the end-of-input check, built once per rule.
    fn entry(&self, name: &str) -> Result<Grammar<V>> {
        let symbol = self
            .names
            .get(name)
            .ok_or_else(|| Error::UnknownRule(name.to_owned()))?;

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(symbol).or_insert_with(|| {
            let target = RuleRef::new(symbol, Arc::from(name), Arc::downgrade(&self.table));
            and((rule(&target), consume(&EOF))).map(|(value, _)| value)
        });
        Ok(entry.clone())
    }
}

/// Build a parser from a token list, named rule factories and an optional
/// skip factory.
pub fn create_parser<V, N>(
    tokens: impl IntoIterator<Item = Token>,
    factories: impl IntoIterator<Item = (N, RuleFactory<V>)>,
    skip: Option<SkipFactory<V>>,
) -> Result<Parser<V>>
where
    V: 'static,
    N: Into<String>,
{
    let mut builder = factories
        .into_iter()
        .fold(ParserBuilder::new(tokens), |builder, (name, factory)| {
            builder.boxed_rule(name.into(), factory)
        });
    builder.skip = skip;
    builder.build()
}
