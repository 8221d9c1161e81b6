//! Named rules and lazy references between them.
//!
//! Rule factories run while the parser is being built, before every rule
//! exists. They therefore receive handles rather than grammars: a `RuleRef`
//! names a rule and points weakly at the parser's rule table, which is filled
//! in once all factories have run.

use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use nanolex_core::{Interner, Symbol};

use crate::context::{Context, Outcome};
use crate::grammar::Grammar;
use crate::{Error, Result};

/// Compiled grammars of a parser, indexed by rule symbol.
pub(crate) struct RuleTable<V> {
    grammars: OnceLock<Vec<Grammar<V>>>,
}

impl<V> RuleTable<V> {
    pub(crate) fn new() -> Self {
        Self {
            grammars: OnceLock::new(),
        }
    }

    fn get(&self, symbol: Symbol) -> Option<&Grammar<V>> {
        self.grammars.get()?.get(symbol.index())
    }
}

/// Handle to a named rule that may not be resolved yet.
pub struct RuleRef<V> {
    symbol: Symbol,
    name: Arc<str>,
    table: Weak<RuleTable<V>>,
}

impl<V: 'static> RuleRef<V> {
    pub(crate) fn new(symbol: Symbol, name: Arc<str>, table: Weak<RuleTable<V>>) -> Self {
        Self {
            symbol,
            name,
            table,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the referenced rule, tracking nesting on the context.
    fn invoke(&self, ctx: &mut Context<'_>) -> Outcome<V> {
        let Some(grammar) = self.resolve() else {
            ctx.halt(Error::UnresolvedRule {
                name: self.name.to_string(),
            });
            return Outcome::Failure(ctx.halted_failure());
        };
        if !ctx.enter_rule(&self.name) {
            return Outcome::Failure(ctx.halted_failure());
        }
        let outcome = grammar.parse(ctx);
        ctx.exit_rule(outcome.is_success());
        outcome
    }

    fn resolve(&self) -> Option<Grammar<V>> {
        self.table.upgrade()?.get(self.symbol).cloned()
    }
}

impl<V> Clone for RuleRef<V> {
    fn clone(&self) -> Self {
        Self {
            symbol: self.symbol,
            name: Arc::clone(&self.name),
            table: Weak::clone(&self.table),
        }
    }
}

impl<V> fmt::Debug for RuleRef<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuleRef").field(&self.name).finish()
    }
}

/// Lazy grammar for the rule behind `target`.
///
/// Resolution happens at parse time, so rules may refer to each other in
/// any order. Each invocation counts towards the recursion limit.
pub fn rule<V: 'static>(target: &RuleRef<V>) -> Grammar<V> {
    let target = target.clone();
    Grammar::new(move |ctx| target.invoke(ctx))
}

/// The rule registry seen by rule factories.
pub struct Rules<V> {
    table: Weak<RuleTable<V>>,
    names: RefCell<Interner>,
    defined: usize,
    current: Option<Symbol>,
    references: RefCell<Vec<(Symbol, Option<Symbol>)>>,
}

impl<V: 'static> Rules<V> {
    /// `names` holds the defined rules, interned first and in order.
    pub(crate) fn new(table: &Arc<RuleTable<V>>, names: Interner) -> Self {
        let defined = names.len();
        Self {
            table: Arc::downgrade(table),
            names: RefCell::new(names),
            defined,
            current: None,
            references: RefCell::new(Vec::new()),
        }
    }

    /// Handle to the rule called `name`, defined or not yet defined.
    pub fn get(&self, name: &str) -> RuleRef<V> {
        let symbol = self.names.borrow_mut().intern(name);
        self.references.borrow_mut().push((symbol, self.current));
        RuleRef::new(symbol, Arc::from(name), Weak::clone(&self.table))
    }

    /// Lazy grammar for the rule called `name`.
    pub fn rule(&self, name: &str) -> Grammar<V> {
        rule(&self.get(name))
    }

    pub(crate) fn set_current(&mut self, symbol: Option<Symbol>) {
        self.current = symbol;
    }

    /// Check every reference and publish the compiled grammars.
    ///
    /// `grammars` is indexed like the defined names.
    pub(crate) fn resolve(
        self,
        table: &RuleTable<V>,
        grammars: Vec<Grammar<V>>,
    ) -> Result<Interner> {
        let names = self.names.into_inner();
        for (symbol, from) in self.references.into_inner() {
            if symbol.index() >= self.defined {
                return Err(Error::UndefinedRule {
                    name: names.resolve(symbol).to_owned(),
                    referenced_from: from.map(|from| names.resolve(from).to_owned()),
                });
            }
        }

        // A fresh table is filled exactly once.
        let _ = table.grammars.set(grammars);
        Ok(names)
    }
}
