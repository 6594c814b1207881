//! MarkdownV2 escaping rules.
//!
//! See <https://core.telegram.org/bots/api#markdownv2-style>.

/// Characters that must be backslash-escaped anywhere outside code and URLs.
const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escape plain text for MarkdownV2.
pub fn escape_text(text: &str) -> String {
    escape_with(text, |c| c == '\\' || RESERVED.contains(&c))
}

/// Escape the body of an inline code span or a `pre` block.
pub fn escape_code(text: &str) -> String {
    escape_with(text, |c| c == '\\' || c == '`')
}

/// Escape the target of an inline link.
pub fn escape_url(text: &str) -> String {
    escape_with(text, |c| c == '\\' || c == ')')
}

fn escape_with(text: &str, needs_escape: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
