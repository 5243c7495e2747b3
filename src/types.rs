//! Types module: range values used by pattern steps.
//!
//! This module provides ChildRange (which children a Down step visits) and WordRange
//! (which words of a node's text a WordRange step extracts).

use crate::WalkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Widest child range the `(*)` shorthand expands to.
pub const ANY_CHILD_LIMIT: usize = 10;

/// An inclusive, 1-based range of child positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawChildRange")]
pub struct ChildRange {
    start: usize,
    end: usize,
}

#[derive(Deserialize)]
struct RawChildRange {
    start: usize,
    end: usize,
}

impl TryFrom<RawChildRange> for ChildRange {
    type Error = WalkError;

    fn try_from(raw: RawChildRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl ChildRange {
    pub fn new(start: usize, end: usize) -> Result<Self, WalkError> {
        if start == 0 || start > end {
            return Err(WalkError::InvalidChildRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range selecting exactly one child.
    pub fn single(position: usize) -> Result<Self, WalkError> {
        Self::new(position, position)
    }

    /// The `(*)` range.
    pub fn any() -> Self {
        Self { start: 1, end: ANY_CHILD_LIMIT }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn contains(&self, position: usize) -> bool {
        (self.start..=self.end).contains(&position)
    }
}

impl fmt::Display for ChildRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "({})", self.start)
        } else {
            write!(f, "({}-{})", self.start, self.end)
        }
    }
}

impl FromStr for ChildRange {
    type Err = WalkError;

    /// Accepts `(2)`, `(1-3)` and `(*)`; the parentheses are optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = strip_delimiters(s.trim(), '(', ')');
        if inner == "*" {
            return Ok(Self::any());
        }
        let (start, end) = match inner.split_once('-') {
            Some((start, end)) => (parse_position(start, s)?, parse_position(end, s)?),
            None => {
                let position = parse_position(inner, s)?;
                (position, position)
            }
        };
        Self::new(start, end)
    }
}

/// An inclusive range of words, 1-based. Negative positions count from the end, so `-1` is the
/// last word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWordRange")]
pub struct WordRange {
    first: i32,
    last: i32,
}

#[derive(Deserialize)]
struct RawWordRange {
    first: i32,
    last: i32,
}

impl TryFrom<RawWordRange> for WordRange {
    type Error = WalkError;

    fn try_from(raw: RawWordRange) -> Result<Self, Self::Error> {
        Self::new(raw.first, raw.last)
    }
}

impl WordRange {
    pub fn new(first: i32, last: i32) -> Result<Self, WalkError> {
        let same_sign = (first > 0) == (last > 0);
        if first == 0 || last == 0 || (same_sign && first > last) {
            return Err(WalkError::InvalidWordRange { first, last });
        }
        Ok(Self { first, last })
    }

    pub fn first(&self) -> i32 {
        self.first
    }

    pub fn last(&self) -> i32 {
        self.last
    }

    /// True when the static index already stores this range, i.e. it is a prefix `[1-n]` with
    /// `n` no wider than what the index keeps.
    pub fn is_in_static_index(&self, indexed_word_limit: usize) -> bool {
        self.first == 1 && self.last >= 1 && self.last as usize <= indexed_word_limit
    }

    /// Extracts the words this range selects, keeping the original separators between them.
    /// Returns `None` when the range does not fit the text.
    pub fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        let words = word_spans(text);
        let first = resolve_position(self.first, words.len())?;
        let last = resolve_position(self.last, words.len())?;
        if first > last {
            return None;
        }
        Some(&text[words[first].start..words[last].end])
    }
}

impl fmt::Display for WordRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "[{}]", self.first)
        } else {
            write!(f, "[{}-{}]", self.first, self.last)
        }
    }
}

impl FromStr for WordRange {
    type Err = WalkError;

    /// Accepts `[2]`, `[2-3]`, `[-3]` (words 1 to 3), `[2-]` (word 2 to the end) and signed
    /// forms such as `[-3--1]`. The brackets are optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = strip_delimiters(s.trim(), '[', ']');
        if let Some(last) = inner.strip_prefix('-') {
            if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
                return Self::new(1, parse_word(last, s)?);
            }
        }
        // The separating dash is the first one after a possible leading sign.
        let split = inner
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '-')
            .map(|(i, _)| i);
        match split {
            Some(i) => {
                let first = parse_word(&inner[..i], s)?;
                let rest = &inner[i + 1..];
                let last = if rest.is_empty() { -1 } else { parse_word(rest, s)? };
                Self::new(first, last)
            }
            None => {
                let word = parse_word(inner, s)?;
                Self::new(word, word)
            }
        }
    }
}

/// Characters that separate words inside a node's text. Dots are not separators so that dotted
/// version numbers stay a single word.
pub fn is_word_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '/' | ';' | ':' | ',' | '_' | '-' | '=' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>' | '|' | '&' | '"' | '\''
        )
}

/// Byte spans of every word in `text`.
fn word_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (is_word_separator(c), start) {
            (true, Some(s)) => {
                spans.push(s..i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(s..text.len());
    }
    spans
}

/// Turns a 1-based (or negative, from the end) position into a 0-based index.
fn resolve_position(position: i32, count: usize) -> Option<usize> {
    let count = i64::try_from(count).ok()?;
    let one_based = if position > 0 {
        i64::from(position)
    } else {
        count + 1 + i64::from(position)
    };
    if one_based < 1 || one_based > count {
        return None;
    }
    usize::try_from(one_based - 1).ok()
}

fn strip_delimiters(s: &str, open: char, close: char) -> &str {
    s.strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .unwrap_or(s)
        .trim()
}

fn parse_position(s: &str, original: &str) -> Result<usize, WalkError> {
    s.trim()
        .parse::<usize>()
        .map_err(|_| WalkError::ParseError(format!("Invalid child range \"{}\"", original)))
}

fn parse_word(s: &str, original: &str) -> Result<i32, WalkError> {
    s.trim()
        .parse::<i32>()
        .map_err(|_| WalkError::ParseError(format!("Invalid word range \"{}\"", original)))
}
