//! Fitting rendered MarkdownV2 into message-sized chunks.
//!
//! Lengths are counted in Unicode scalar values, which is how Telegram
//! counts the 4096 character message limit.

use crate::parsing::render::fence;

/// Overhead of a bare ```` ```\n...\n``` ```` fence.
const FENCE_OVERHEAD: usize = 8;

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// A piece handed to [`ChunkPacker::push`] was longer than the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceTooLong {
    pub len: usize,
    pub max_len: usize,
}

/// Joins pieces with a blank line, starting a new chunk whenever the next
/// piece would push the current one past `max_len`.
#[derive(Debug)]
pub struct ChunkPacker {
    max_len: usize,
    current: String,
    current_len: usize,
    chunks: Vec<String>,
}

impl ChunkPacker {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            current: String::new(),
            current_len: 0,
            chunks: Vec::new(),
        }
    }

    pub fn push(&mut self, piece: &str) -> Result<(), PieceTooLong> {
        let len = char_len(piece);
        if len > self.max_len {
            return Err(PieceTooLong {
                len,
                max_len: self.max_len,
            });
        }
        if len == 0 {
            return Ok(());
        }

        if !self.current.is_empty() && self.current_len + 2 + len > self.max_len {
            self.flush();
        }
        if !self.current.is_empty() {
            self.current.push_str("\n\n");
            self.current_len += 2;
        }
        self.current.push_str(piece);
        self.current_len += len;
        Ok(())
    }

    /// Take every completed chunk, including the one in progress.
    pub fn drain(&mut self) -> Vec<String> {
        self.flush();
        std::mem::take(&mut self.chunks)
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current));
        }
        self.current_len = 0;
    }
}

/// Split rendered MarkdownV2 text so that every piece fits `max_len`.
///
/// Prefers line boundaries, then spaces, then plain character boundaries.
/// An escape sequence (`\` plus the escaped character) is never split. Any
/// entity still open at a cut (bold, italic, strikethrough, inline code, a
/// link or a `pre` block) is closed at the end of the piece and reopened at
/// the start of the next one, so every piece parses on its own.
pub fn split_text(text: &str, max_len: usize) -> Vec<String> {
    if char_len(text) <= max_len {
        return vec![text.to_owned()];
    }

    let units = units(text);
    let mut pieces = Vec::new();
    let mut entities = Entities::default();
    let mut start = 0;

    while start < units.len() {
        let reopen = entities.reopen();
        let mut state = entities.clone();
        let mut len = char_len(&reopen);
        let mut end = start;
        let mut line_break = None;
        let mut space = None;

        // Every accepted prefix fits together with the markup closing it
        while let Some(&(unit_text, unit)) = units.get(end) {
            let mut next = state.clone();
            next.apply(unit);
            let unit_len = char_len(unit_text);
            if len + unit_len + char_len(&next.close()) > max_len {
                break;
            }
            len += unit_len;
            state = next;
            end += 1;
            if unit == Unit::Plain {
                match unit_text {
                    // A piece never starts with an empty reopened `pre`
                    "\n" if !matches!(units.get(end), Some((_, Unit::FenceClose))) => {
                        line_break = Some(end)
                    }
                    " " => space = Some(end),
                    _ => {}
                }
            }
        }

        let cut = if end == units.len() {
            end
        } else {
            line_break.or(space).unwrap_or(end).max(start + 1)
        };

        let mut body = String::new();
        for &(unit_text, unit) in &units[start..cut] {
            body.push_str(unit_text);
            entities.apply(unit);
        }
        let body = if entities.is_verbatim() {
            body.trim_end_matches('\n')
        } else {
            body.trim_end_matches(['\n', ' '])
        };
        if !body.trim().is_empty() {
            pieces.push(format!("{reopen}{body}{}", entities.close()));
        }
        start = cut;
    }

    pieces
}

/// Split a code block into several fenced blocks, each within `max_len`.
pub fn split_code(code: &str, lang: Option<&str>, max_len: usize) -> Vec<String> {
    // Drop the language tag when it would eat most of the budget.
    let lang = lang.filter(|lang| char_len(lang) + FENCE_OVERHEAD < max_len / 2);
    let overhead = FENCE_OVERHEAD + lang.map(char_len).unwrap_or(0);
    let budget = max_len.saturating_sub(overhead).max(2);

    let mut pieces = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    for line in code.trim_end_matches('\n').split_inclusive('\n') {
        for part in escaped_parts(line, budget) {
            let part_len = escaped_len(&part);
            if buffer_len + part_len > budget && !buffer.is_empty() {
                pieces.push(fence(lang, &buffer));
                buffer.clear();
                buffer_len = 0;
            }
            buffer.push_str(&part);
            buffer_len += part_len;
        }
    }
    if !buffer.trim_end_matches('\n').is_empty() {
        pieces.push(fence(lang, &buffer));
    }

    pieces
}

/// What a unit of rendered MarkdownV2 does to the open entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit<'a> {
    Plain,
    FenceOpen(&'a str),
    FenceClose,
    Code,
    Style(char),
    /// Opening `[`, with the escaped target of the link
    LinkOpen(&'a str),
    /// The whole `](target)` tail
    LinkClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open<'a> {
    Style(char),
    Link(&'a str),
}

/// Entities open at some point of a rendered text.
#[derive(Debug, Clone, Default)]
struct Entities<'a> {
    /// Language of the open `pre` block
    pre: Option<&'a str>,
    code: bool,
    open: Vec<Open<'a>>,
}

impl<'a> Entities<'a> {
    fn apply(&mut self, unit: Unit<'a>) {
        match unit {
            Unit::Plain => {}
            Unit::FenceOpen(lang) => self.pre = Some(lang),
            Unit::FenceClose => self.pre = None,
            Unit::Code => self.code = !self.code,
            Unit::Style(marker) => {
                match self.open.iter().rposition(|o| *o == Open::Style(marker)) {
                    Some(at) => {
                        self.open.remove(at);
                    }
                    None => self.open.push(Open::Style(marker)),
                }
            }
            Unit::LinkOpen(target) => self.open.push(Open::Link(target)),
            Unit::LinkClose => {
                if let Some(at) = self.open.iter().rposition(|o| matches!(o, Open::Link(_))) {
                    self.open.remove(at);
                }
            }
        }
    }

    /// Inside code, where whitespace is content
    fn is_verbatim(&self) -> bool {
        self.pre.is_some() || self.code
    }

    fn reopen(&self) -> String {
        let mut out = String::new();
        for open in &self.open {
            match open {
                Open::Style(marker) => out.push(*marker),
                Open::Link(_) => out.push('['),
            }
        }
        if self.code {
            out.push('`');
        }
        if let Some(lang) = self.pre {
            out.push_str("```");
            out.push_str(lang);
            out.push('\n');
        }
        out
    }

    fn close(&self) -> String {
        let mut out = String::new();
        if self.pre.is_some() {
            out.push_str("\n```");
        }
        if self.code {
            out.push('`');
        }
        for open in self.open.iter().rev() {
            match open {
                Open::Style(marker) => out.push(*marker),
                Open::Link(target) => {
                    out.push_str("](");
                    out.push_str(target);
                    out.push(')');
                }
            }
        }
        out
    }
}

/// Break rendered MarkdownV2 into the smallest pieces a cut may fall
/// between: escape pairs, fence lines, `](target)` tails and single
/// characters.
fn units(text: &str) -> Vec<(&str, Unit<'_>)> {
    let mut out = Vec::new();
    let mut state = Entities::default();
    let mut rest = text;
    let mut line_start = true;

    while let Some(c) = rest.chars().next() {
        let (len, unit) = if c == '\\' {
            let escaped = rest[1..].chars().next().map_or(0, char::len_utf8);
            (1 + escaped, Unit::Plain)
        } else if line_start && rest.starts_with("```") {
            if state.pre.is_some() {
                (3, Unit::FenceClose)
            } else {
                let end = rest.find('\n').map_or(rest.len(), |n| n + 1);
                (end, Unit::FenceOpen(rest[3..end].trim_end()))
            }
        } else if state.pre.is_some() || (state.code && c != '`') {
            (c.len_utf8(), Unit::Plain)
        } else {
            match c {
                '`' => (1, Unit::Code),
                '*' | '_' | '~' => (1, Unit::Style(c)),
                '[' => match link_target(&rest[1..]) {
                    Some(target) => (1, Unit::LinkOpen(target)),
                    None => (1, Unit::Plain),
                },
                ']' if rest[1..].starts_with('(') => {
                    let len = unescaped_find(&rest[2..], ')').map_or(rest.len(), |at| at + 3);
                    (len, Unit::LinkClose)
                }
                _ => (c.len_utf8(), Unit::Plain),
            }
        };

        let (unit_text, tail) = rest.split_at(len);
        state.apply(unit);
        line_start = unit_text.ends_with('\n');
        out.push((unit_text, unit));
        rest = tail;
    }
    out
}

/// Escaped target of the link whose text starts at `text`
fn link_target(text: &str) -> Option<&str> {
    let close = unescaped_find(text, ']')?;
    let target = text[close + 1..].strip_prefix('(')?;
    let end = unescaped_find(target, ')')?;
    Some(&target[..end])
}

fn unescaped_find(text: &str, needle: char) -> Option<usize> {
    let mut chars = text.char_indices();
    while let Some((at, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == needle {
            return Some(at);
        }
    }
    None
}

/// Split an unescaped code line into parts whose escaped form fits `budget`.
fn escaped_parts(line: &str, budget: usize) -> Vec<String> {
    if escaped_len(line) <= budget {
        return vec![line.to_owned()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for c in line.chars() {
        let unit_len = if c == '\\' || c == '`' { 2 } else { 1 };
        if current_len + unit_len > budget && !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push(c);
        current_len += unit_len;
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Length of `code` once backticks and backslashes are escaped.
fn escaped_len(code: &str) -> usize {
    code.chars()
        .map(|c| if c == '\\' || c == '`' { 2 } else { 1 })
        .sum()
}
