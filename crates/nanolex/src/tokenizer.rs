//! Splitting raw text into chunks.
//!
//! The tokenizer joins the source fragments of its tokens into one
//! leftmost-first alternation and splits text around every match, so the
//! resulting chunks alternate filler, match, filler, ..., filler. Adjacent
//! matches leave empty filler chunks behind; consumers skip them.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};

use regex_automata::Input;
use regex_automata::meta::Regex;

use crate::token::Token;
use crate::{Error, Result};

/// The chunk sequence of one input text.
///
/// Chunks are byte ranges into the shared text; the sequence is never mutated
/// once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunks {
    text: Arc<str>,
    spans: Vec<Range<usize>>,
}

impl Chunks {
    fn new(text: Arc<str>, spans: Vec<Range<usize>>) -> Self {
        Self { text, spans }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.spans.get(index).map(|span| &self.text[span.clone()])
    }

    pub fn span(&self, index: usize) -> Option<Range<usize>> {
        self.spans.get(index).cloned()
    }

    /// Byte offset where chunk `index` starts; the text length past the end.
    pub fn offset(&self, index: usize) -> usize {
        self.spans
            .get(index)
            .map_or(self.text.len(), |span| span.start)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.spans.iter().map(|span| &self.text[span.clone()])
    }
}

/// Splits text on the alternation of a token set, caching results by text.
#[derive(Debug)]
pub struct Tokenizer {
    regex: Option<Regex>,
    pattern: String,
    cache: Mutex<HashMap<Arc<str>, Arc<Chunks>>>,
    cache_limit: Option<usize>,
}

impl Tokenizer {
    /// Compile the alternation of `tokens`, in priority order.
    ///
    /// Sentinels contribute nothing. Without any matcher token, every text
    /// is a single filler chunk.
    pub fn new(tokens: &[Token]) -> Result<Self> {
        let pattern = tokens
            .iter()
            .filter_map(Token::source)
            .map(|source| format!("(?:{source})"))
            .collect::<Vec<_>>()
            .join("|");

        let regex = if pattern.is_empty() {
            None
        } else {
            let regex = Regex::new(&pattern).map_err(|err| Error::InvalidPattern {
                pattern: pattern.clone(),
                message: err.to_string(),
            })?;
            Some(regex)
        };

        Ok(Self {
            regex,
            pattern,
            cache: Mutex::default(),
            cache_limit: None,
        })
    }

    /// Bound the number of distinct texts kept; the cache is cleared when full.
    pub fn with_cache_limit(mut self, limit: Option<usize>) -> Self {
        self.cache_limit = limit;
        self
    }

    /// The composed alternation.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Split `text`, reusing the chunk sequence of an identical earlier text.
    pub fn tokenize(&self, text: &str) -> Arc<Chunks> {
        if let Some(chunks) = self.lock_cache().get(text) {
            return Arc::clone(chunks);
        }

        let spans = match &self.regex {
            Some(regex) => split(regex, text),
            None => vec![0..text.len()],
        };
        let text: Arc<str> = Arc::from(text);
        let chunks = Arc::new(Chunks::new(Arc::clone(&text), spans));

        let mut cache = self.lock_cache();
        if self.cache_limit.is_some_and(|limit| cache.len() >= limit) {
            cache.clear();
        }
        if self.cache_limit != Some(0) {
            cache.insert(text, Arc::clone(&chunks));
        }
        chunks
    }

    /// Number of texts currently cached.
    pub fn cached(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<Arc<str>, Arc<Chunks>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Split around every match, keeping the matches.
///
/// An empty match at the previous split point is stepped over by one
/// character, and matches starting at the very end are ignored.
fn split(regex: &Regex, text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut last = 0;
    let mut from = 0;

    while from < text.len() {
        let Some(found) = regex.search(&Input::new(text).range(from..)) else {
            break;
        };
        if found.start() >= text.len() {
            break;
        }
        if found.end() == last {
            from = found.start() + char_width(text, found.start());
            continue;
        }
        spans.push(last..found.start());
        spans.push(found.range());
        last = found.end();
        from = last;
    }

    spans.push(last..text.len());
    spans
}

fn char_width(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(1, char::len_utf8)
}
