//! Tracing infrastructure for debugging grammars.
//!
//! A parse reports its steps to a [`Tracer`]: rules entered and left, tokens
//! matched or missed, skip-rule advances and backtracking restores. Plain
//! [`Parser::parse`](crate::Parser::parse) runs without a tracer; use
//! [`Parser::parse_traced`](crate::Parser::parse_traced) with a
//! [`PrintTracer`] to see what a grammar actually does.
//!
//! All cursor positions are chunk indices.

use nanolex_core::Colors;

use crate::token::Token;

/// Chunk text longer than this is truncated in trace lines.
const MAX_TEXT_WIDTH: usize = 24;

/// Instrumentation hooks called during a parse.
pub trait Tracer {
    /// Called when a rule reference is entered.
    fn trace_enter_rule(&mut self, rule: &str, cursor: usize);

    /// Called when a rule reference returns.
    fn trace_exit_rule(&mut self, rule: &str, cursor: usize, matched: bool);

    /// Called when `token` matched the chunk at `cursor`.
    fn trace_match(&mut self, token: &Token, cursor: usize, chunk: &str);

    /// Called when `token` did not match. `found` is `None` at end of input.
    fn trace_mismatch(&mut self, token: &Token, cursor: usize, found: Option<&str>);

    /// Called when the skip rule advanced the cursor.
    fn trace_skip(&mut self, from: usize, to: usize);

    /// Called when a failed attempt rewinds the cursor.
    fn trace_backtrack(&mut self, from: usize, to: usize);
}

/// Tracer that ignores everything.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_enter_rule(&mut self, _rule: &str, _cursor: usize) {}

    #[inline(always)]
    fn trace_exit_rule(&mut self, _rule: &str, _cursor: usize, _matched: bool) {}

    #[inline(always)]
    fn trace_match(&mut self, _token: &Token, _cursor: usize, _chunk: &str) {}

    #[inline(always)]
    fn trace_mismatch(&mut self, _token: &Token, _cursor: usize, _found: Option<&str>) {}

    #[inline(always)]
    fn trace_skip(&mut self, _from: usize, _to: usize) {}

    #[inline(always)]
    fn trace_backtrack(&mut self, _from: usize, _to: usize) {}
}

/// Tracer that collects one indented line per event.
///
/// Lines are nested by rule depth:
///
/// ```text
/// JSON @0
///   match "{" @1 {
///   skip 2..4
///   miss "StringLiteral" @4 found "}"
/// JSON @0 -> @5 ok
/// ```
#[derive(Debug, Default)]
pub struct PrintTracer {
    lines: Vec<String>,
    /// Entry cursor of each open rule.
    entries: Vec<usize>,
    colors: Colors,
}

impl PrintTracer {
    pub fn new(colors: Colors) -> Self {
        Self {
            lines: Vec::new(),
            entries: Vec::new(),
            colors,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with newlines.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    fn push(&mut self, line: String) {
        let indent = "  ".repeat(self.entries.len());
        self.lines.push(format!("{indent}{line}"));
    }

    fn at(&self, cursor: usize) -> String {
        self.colors.paint(self.colors.dim, &format!("@{cursor}"))
    }
}

impl Tracer for PrintTracer {
    fn trace_enter_rule(&mut self, rule: &str, cursor: usize) {
        let line = format!(
            "{} {}",
            self.colors.paint(self.colors.blue, rule),
            self.at(cursor)
        );
        self.push(line);
        self.entries.push(cursor);
    }

    fn trace_exit_rule(&mut self, rule: &str, cursor: usize, matched: bool) {
        let entered = self.entries.pop().unwrap_or(cursor);
        let verdict = if matched {
            self.colors.paint(self.colors.green, "ok")
        } else {
            self.colors.paint(self.colors.red, "fail")
        };
        let line = format!(
            "{} {} -> {} {verdict}",
            self.colors.paint(self.colors.blue, rule),
            self.at(entered),
            self.at(cursor),
        );
        self.push(line);
    }

    fn trace_match(&mut self, token: &Token, cursor: usize, chunk: &str) {
        let mut line = format!("match {:?} {}", token.name(), self.at(cursor));
        if !chunk.is_empty() {
            line.push(' ');
            line.push_str(
                &self
                    .colors
                    .paint(self.colors.green, &truncate_text(chunk, MAX_TEXT_WIDTH)),
            );
        }
        self.push(line);
    }

    fn trace_mismatch(&mut self, token: &Token, cursor: usize, found: Option<&str>) {
        let found = match found {
            Some(chunk) => format!("{:?}", truncate_text(chunk, MAX_TEXT_WIDTH)),
            None => "EOF".to_owned(),
        };
        let line = format!(
            "{} {:?} {} found {found}",
            self.colors.paint(self.colors.red, "miss"),
            token.name(),
            self.at(cursor),
        );
        self.push(line);
    }

    fn trace_skip(&mut self, from: usize, to: usize) {
        let line = self
            .colors
            .paint(self.colors.dim, &format!("skip {from}..{to}"));
        self.push(line);
    }

    fn trace_backtrack(&mut self, from: usize, to: usize) {
        let line = self
            .colors
            .paint(self.colors.dim, &format!("backtrack {from} -> {to}"));
        self.push(line);
    }
}

/// Cut `text` to `max` characters, marking the cut with an ellipsis.
fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
