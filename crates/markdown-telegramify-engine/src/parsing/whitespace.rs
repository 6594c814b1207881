use std::borrow::Cow;

/// Collapse every run of spaces and tabs into a single space.
pub fn collapse_inline(text: &str) -> Cow<'_, str> {
    let needs_work = text
        .as_bytes()
        .windows(2)
        .any(|w| matches!(w[0], b' ' | b'\t') && matches!(w[1], b' ' | b'\t'))
        || text.contains('\t');
    if !needs_work {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c == ' ' || c == '\t' {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    Cow::Owned(out)
}
