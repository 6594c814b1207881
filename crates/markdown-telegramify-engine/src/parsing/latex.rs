//! LaTeX math handling.
//!
//! Telegram has no math support, so math spans are shown as plain text with
//! the most common commands swapped for their Unicode symbols.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Rewrite `\(..\)` and `\[..\]` into the `$..$` / `$$..$$` form the parser
/// understands. Fenced code, indented code and inline code spans are left
/// alone.
///
/// In prose every `\(..\)` pair counts as math, including Markdown-escaped
/// parentheses such as `f\(x\)`, which end up as `f` followed by the math
/// span `x`.
pub fn normalize_delimiters(markdown: &str) -> Cow<'_, str> {
    if !markdown.contains("\\(") && !markdown.contains("\\[") {
        return Cow::Borrowed(markdown);
    }

    let mut out = String::with_capacity(markdown.len());
    let mut prose = String::new();
    let mut fence: Option<&'static str> = None;
    // Indented code needs a blank line before it; it cannot interrupt a paragraph
    let mut after_blank = true;
    let mut in_indented = false;

    for line in markdown.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let blank = trimmed.is_empty();
        match fence {
            Some(marker) => {
                out.push_str(line);
                if trimmed.starts_with(marker) {
                    fence = None;
                }
            }
            None if !blank && is_indented(line) && (after_blank || in_indented) => {
                out.push_str(&rewrite_delimiters(&prose));
                prose.clear();
                out.push_str(line);
                in_indented = true;
            }
            None => {
                if let Some(marker) = fence_marker(trimmed) {
                    out.push_str(&rewrite_delimiters(&prose));
                    prose.clear();
                    out.push_str(line);
                    fence = Some(marker);
                } else {
                    prose.push_str(line);
                }
                if !blank {
                    in_indented = false;
                }
            }
        }
        after_blank = blank;
    }
    out.push_str(&rewrite_delimiters(&prose));

    Cow::Owned(out)
}

fn is_indented(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

fn fence_marker(trimmed: &str) -> Option<&'static str> {
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

fn rewrite_delimiters(prose: &str) -> Cow<'_, str> {
    static DELIMITERS: OnceLock<Regex> = OnceLock::new();
    let re = DELIMITERS.get_or_init(|| {
        Regex::new(r"(?s)(`+[^`]*`+)|\\\[(.+?)\\\]|\\\((.+?)\\\)").expect("Invalid delimiter regex")
    });

    re.replace_all(prose, |caps: &Captures| {
        if let Some(code) = caps.get(1) {
            code.as_str().to_owned()
        } else if let Some(display) = caps.get(2) {
            format!("$${}$$", display.as_str().trim())
        } else {
            format!("${}$", caps[3].trim())
        }
    })
}

/// Render a math span as readable text.
pub fn to_unicode(latex: &str) -> String {
    static FRAC: OnceLock<Regex> = OnceLock::new();
    static COMMAND: OnceLock<Regex> = OnceLock::new();
    let frac = FRAC.get_or_init(|| {
        Regex::new(r"\\frac\s*\{([^{}]*)\}\s*\{([^{}]*)\}").expect("Invalid frac regex")
    });
    let command = COMMAND.get_or_init(|| Regex::new(r"\\([A-Za-z]+)").expect("Invalid command regex"));

    let text = frac.replace_all(latex, "$1/$2");
    let text = text
        .replace("\\,", " ")
        .replace("\\;", " ")
        .replace("\\quad", " ")
        .replace("\\!", "");
    let text = command.replace_all(&text, |caps: &Captures| {
        symbol(&caps[1])
            .map(str::to_owned)
            .unwrap_or_else(|| caps[0].to_owned())
    });

    text.replace(['{', '}'], "").trim().to_owned()
}

fn symbol(command: &str) -> Option<&'static str> {
    let symbol = match command {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Omega" => "Ω",
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "neq" | "ne" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "infty" => "∞",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" | "implies" => "⇒",
        "Leftrightarrow" | "iff" => "⇔",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "sqrt" => "√",
        "partial" => "∂",
        "nabla" => "∇",
        "in" => "∈",
        "notin" => "∉",
        "forall" => "∀",
        "exists" => "∃",
        "cup" => "∪",
        "cap" => "∩",
        "subset" => "⊂",
        "subseteq" => "⊆",
        "emptyset" => "∅",
        "ldots" | "dots" | "cdots" => "…",
        "left" | "right" | "displaystyle" => "",
        _ => return None,
    };
    Some(symbol)
}
