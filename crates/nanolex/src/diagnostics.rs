//! Syntax errors with a source excerpt.

use std::fmt::Write;
use std::ops::Range;
use std::sync::Arc;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

use crate::context::Failure;
use crate::token::Token;
use crate::tokenizer::Chunks;

/// The input did not match: what was expected, what was found, and where.
///
/// `Display` gives the message, the position, and a plain excerpt:
///
/// ```text
/// expected "}", found "\"b\"" at 1:8
///
/// 1 | {"a":1 "b":2}
///   |        ^^^
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {line}:{column}\n\n{excerpt}")]
pub struct SyntaxError {
    /// `expected X, found Y` or `unexpected Y`.
    pub message: String,
    /// Diagnostic name of the expected token; `None` for a generic mismatch.
    pub expected: Option<String>,
    /// Offending chunk text; `None` at end of input.
    pub found: Option<String>,
    /// Byte offset of the offending chunk.
    pub offset: usize,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
    pub span: Range<usize>,
    pub excerpt: String,
    input: Arc<str>,
}

impl SyntaxError {
    pub(crate) fn new(chunks: &Chunks, failure: &Failure) -> Self {
        let text = chunks.text();

        // Report the first non-empty chunk at or after the failure.
        let index = (failure.position..chunks.len())
            .find(|&index| chunks.get(index).is_some_and(|chunk| !chunk.is_empty()))
            .unwrap_or(chunks.len());
        let span = chunks
            .span(index)
            .unwrap_or(text.len()..text.len());
        let found = chunks.get(index).map(str::to_owned);

        let expected = match &failure.expected {
            Token::Unexpected | Token::InfiniteLoop => None,
            token => Some(token.name().to_owned()),
        };
        let message = match &expected {
            Some(name) => format!("expected {}, found {}", quote_name(name), quote_found(&found)),
            None => format!("unexpected {}", quote_found(&found)),
        };

        let offset = span.start;
        let line_start = text[..offset].rfind('\n').map_or(0, |at| at + 1);
        let line = text[..offset].matches('\n').count() + 1;
        let column = text[line_start..offset].chars().count() + 1;
        let width = found
            .as_deref()
            .map_or(0, |found| found.chars().take_while(|&c| c != '\n').count())
            .max(1);
        let excerpt = excerpt(text, line, line_start, column - 1, width);

        Self {
            message,
            expected,
            found,
            offset,
            line,
            column,
            span,
            excerpt,
            input: chunks.shared_text(),
        }
    }

    /// The full input text the error points into.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Render as an annotated report, optionally with ANSI colors.
    pub fn render(&self, colored: bool) -> String {
        let renderer = if colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let range = adjust_range(self.span.clone(), self.input.len());
        let label = match &self.found {
            Some(_) => "found here",
            None => "input ends here",
        };
        let snippet = Snippet::source(&*self.input)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(range).label(label));
        let report = vec![Level::ERROR.primary_title(&self.message).element(snippet)];

        renderer.render(&report).to_string()
    }
}

fn quote_name(name: &str) -> String {
    if name == Token::Eof.name() {
        name.to_owned()
    } else {
        format!("{name:?}")
    }
}

fn quote_found(found: &Option<String>) -> String {
    match found {
        Some(text) => format!("{text:?}"),
        None => "EOF".to_owned(),
    }
}

/// The offending line, one line of prior context when it has text, and a
/// caret underline.
fn excerpt(text: &str, line: usize, line_start: usize, column: usize, width: usize) -> String {
    let line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |at| line_start + at);
    let current = text[line_start..line_end].trim_end_matches('\r');

    let previous = line_start
        .checked_sub(1)
        .map(|newline| {
            let start = text[..newline].rfind('\n').map_or(0, |at| at + 1);
            text[start..newline].trim_end_matches('\r')
        })
        .filter(|previous| !previous.is_empty());

    let gutter = line.to_string().len();
    let mut out = String::new();
    if let Some(previous) = previous {
        writeln!(out, "{:>gutter$} | {previous}", line - 1).expect("String write never fails");
    }
    writeln!(out, "{line:>gutter$} | {current}").expect("String write never fails");
    write!(
        out,
        "{:>gutter$} | {}{}",
        "",
        " ".repeat(column),
        "^".repeat(width)
    )
    .expect("String write never fails");
    out
}

/// Widen an empty span so the renderer has something to point at.
fn adjust_range(range: Range<usize>, limit: usize) -> Range<usize> {
    if range.start == range.end {
        let end = (range.end + 1).min(limit);
        return range.start.min(end)..end;
    }
    range
}
