pub mod escape;
pub mod latex;
pub mod render;
pub mod whitespace;

use pulldown_cmark::{Event, Options, Parser, Tag};
use std::borrow::Cow;
use std::ops::Range;

use crate::models::ConvertOptions;
pub use render::CodeBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    Quote,
    Code,
    Table,
    Rule,
    Html,
    Footnote,
    Other,
}

impl BlockKind {
    fn of(event: &Event<'_>) -> Self {
        match event {
            Event::Start(Tag::Paragraph) => Self::Paragraph,
            Event::Start(Tag::Heading { .. }) => Self::Heading,
            Event::Start(Tag::List(_)) => Self::List,
            Event::Start(Tag::BlockQuote(_)) => Self::Quote,
            Event::Start(Tag::CodeBlock(_)) => Self::Code,
            Event::Start(Tag::Table(_)) => Self::Table,
            Event::Start(Tag::HtmlBlock) => Self::Html,
            Event::Start(Tag::FootnoteDefinition(_)) => Self::Footnote,
            Event::Rule => Self::Rule,
            _ => Self::Other,
        }
    }
}

/// A top-level Markdown block, already rendered to MarkdownV2.
#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    /// Byte range in the source after LaTeX delimiter rewriting
    pub source: Range<usize>,
    pub rendered: String,
    /// Unescaped `pre` contents of [`BlockKind::Code`] and [`BlockKind::Table`]
    /// blocks
    pub code: Option<CodeBlock>,
}

pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_MATH
}

/// Split a document into top-level blocks and render each one independently.
///
/// Every MarkdownV2 entity stays inside the block that opened it, so chunks
/// can be cut between any two blocks.
pub fn parse_blocks(markdown: &str, options: &ConvertOptions) -> Vec<Block> {
    let source = if options.latex_escape {
        latex::normalize_delimiters(markdown)
    } else {
        Cow::Borrowed(markdown)
    };

    let mut blocks = Vec::new();
    let mut pending = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut kind = BlockKind::Other;

    for (event, range) in Parser::new_ext(&source, parser_options()).into_offset_iter() {
        if depth == 0 {
            start = range.start;
            kind = BlockKind::of(&event);
        }
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        pending.push(event);

        if depth == 0 {
            let rendered = render::render(pending.drain(..), options);
            blocks.push(Block {
                kind,
                source: start..range.end,
                rendered: rendered.text,
                code: rendered
                    .code
                    .filter(|_| matches!(kind, BlockKind::Code | BlockKind::Table)),
            });
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(md: &str) -> Vec<BlockKind> {
        parse_blocks(md, &ConvertOptions::default())
            .into_iter()
            .map(|b| b.kind)
            .collect()
    }

    #[test]
    fn test_empty_document_has_no_blocks() {
        assert!(parse_blocks("", &ConvertOptions::default()).is_empty());
        assert!(parse_blocks("  \n\n \n", &ConvertOptions::default()).is_empty());
    }

    #[test]
    fn test_top_level_blocks() {
        let md = "# Title\n\nSome text.\n\n- a\n- b\n\n> quote\n\n```\ncode\n```\n\n---\n";
        assert_eq!(
            kinds(md),
            vec![
                BlockKind::Heading,
                BlockKind::Paragraph,
                BlockKind::List,
                BlockKind::Quote,
                BlockKind::Code,
                BlockKind::Rule,
            ]
        );
    }

    #[test]
    fn test_nested_blocks_stay_in_their_container() {
        let md = "> # Heading in quote\n>\n> - item\n";
        assert_eq!(kinds(md), vec![BlockKind::Quote]);
    }

    #[test]
    fn test_code_block_carries_raw_code() {
        let blocks = parse_blocks("```rust\nlet a = 1;\n```\n", &ConvertOptions::default());
        let code = blocks[0].code.as_ref().unwrap();
        assert_eq!(code.lang.as_deref(), Some("rust"));
        assert_eq!(code.code, "let a = 1;\n");
    }

    #[test]
    fn test_code_inside_quote_is_not_reported_as_code_block() {
        let blocks = parse_blocks("> ```\n> x\n> ```\n", &ConvertOptions::default());
        assert_eq!(blocks[0].kind, BlockKind::Quote);
        assert!(blocks[0].code.is_none());
    }

    #[test]
    fn test_table_block_carries_its_layout() {
        let blocks = parse_blocks("| a | b |\n|---|---|\n| 1 | 2 |\n", &ConvertOptions::default());
        assert_eq!(blocks[0].kind, BlockKind::Table);
        let layout = blocks[0].code.as_ref().unwrap();
        assert_eq!(layout.lang, None);
        assert_eq!(layout.code, "a | b\n--+--\n1 | 2");
    }

    #[test]
    fn test_source_ranges_cover_each_block() {
        let md = "first\n\nsecond\n";
        let blocks = parse_blocks(md, &ConvertOptions::default());
        assert_eq!(md[blocks[0].source.clone()].trim_end(), "first");
        assert_eq!(md[blocks[1].source.clone()].trim_end(), "second");
    }

    #[test]
    fn test_latex_delimiters_rewritten_before_parsing() {
        let blocks = parse_blocks(r"so \(\alpha\) it is", &ConvertOptions::default());
        assert_eq!(blocks[0].rendered, "so α it is");
    }
}
