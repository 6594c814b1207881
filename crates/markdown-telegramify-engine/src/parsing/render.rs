use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Tag, TagEnd};

use super::{
    escape::{escape_code, escape_text, escape_url},
    latex, whitespace,
};
use crate::models::ConvertOptions;

pub const RULE: &str = "————————";

/// Raw contents of a fenced or indented code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub lang: Option<String>,
    pub code: String,
}

impl CodeBlock {
    /// Render as a MarkdownV2 `pre` block
    pub fn fenced(&self) -> String {
        fence(self.lang.as_deref(), &self.code)
    }
}

/// Wrap already-unescaped code in a MarkdownV2 `pre` block.
pub fn fence(lang: Option<&str>, code: &str) -> String {
    format!(
        "```{}\n{}\n```",
        lang.unwrap_or(""),
        escape_code(code.trim_end_matches('\n'))
    )
}

#[derive(Debug)]
pub struct Rendered {
    pub text: String,
    /// Set when the rendered events formed a code block
    pub code: Option<CodeBlock>,
}

struct ListState {
    next: Option<u64>,
}

struct TableState {
    alignments: Vec<Alignment>,
    rows: Vec<Vec<String>>,
    cell: String,
}

/// Renders the events of one top-level block to MarkdownV2.
///
/// Container blocks (list items, quotes, footnotes) render into their own
/// buffer and are re-indented or prefixed when they close, so nesting falls
/// out of the buffer stack.
struct Renderer<'o> {
    options: &'o ConvertOptions,
    root: String,
    stack: Vec<String>,
    lists: Vec<ListState>,
    quote_depth: usize,
    footnotes: Vec<String>,
    bold: usize,
    italic: usize,
    strike: usize,
    /// Target of each open link; `None` for an image shown as plain text
    links: Vec<Option<String>>,
    code: Option<CodeBlock>,
    finished_code: Option<CodeBlock>,
    table: Option<TableState>,
}

pub fn render<'e>(events: impl IntoIterator<Item = Event<'e>>, options: &ConvertOptions) -> Rendered {
    let mut renderer = Renderer::new(options);
    for event in events {
        renderer.event(event);
    }
    renderer.finish()
}

impl<'o> Renderer<'o> {
    fn new(options: &'o ConvertOptions) -> Self {
        Self {
            options,
            root: String::new(),
            stack: Vec::new(),
            lists: Vec::new(),
            quote_depth: 0,
            footnotes: Vec::new(),
            bold: 0,
            italic: 0,
            strike: 0,
            links: Vec::new(),
            code: None,
            finished_code: None,
            table: None,
        }
    }

    fn finish(self) -> Rendered {
        Rendered {
            text: self.root.trim_matches('\n').to_owned(),
            code: self.finished_code,
        }
    }

    fn buf(&mut self) -> &mut String {
        match self.stack.last_mut() {
            Some(buf) => buf,
            None => &mut self.root,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::InlineMath(math) => self.math(&math, "$"),
            Event::DisplayMath(math) => self.math(&math, "$$"),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::FootnoteReference(label) => self.literal(&format!("[{label}]")),
            Event::SoftBreak | Event::HardBreak => self.line_break(),
            Event::Rule => {
                self.start_block();
                self.buf().push_str(RULE);
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "✅ " } else { "☐ " };
                self.buf().push_str(marker);
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::HtmlBlock => self.start_block(),
            Tag::Heading { .. } => {
                self.start_block();
                self.open_style(Style::Bold);
            }
            Tag::Strong => self.open_style(Style::Bold),
            Tag::Emphasis => self.open_style(Style::Italic),
            Tag::Strikethrough => self.open_style(Style::Strike),
            Tag::BlockQuote(_) => {
                self.start_block();
                self.quote_depth += 1;
                self.stack.push(String::new());
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|lang| !lang.is_empty())
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBlock {
                    lang,
                    code: String::new(),
                });
            }
            Tag::List(start) => {
                self.start_block();
                self.lists.push(ListState { next: start });
            }
            Tag::Item => self.stack.push(String::new()),
            Tag::FootnoteDefinition(label) => {
                self.start_block();
                self.footnotes.push(label.to_string());
                self.stack.push(String::new());
            }
            Tag::Table(alignments) => {
                self.start_block();
                self.table = Some(TableState {
                    alignments,
                    rows: Vec::new(),
                    cell: String::new(),
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = &mut self.table {
                    table.rows.push(Vec::new());
                }
            }
            Tag::TableCell => {
                if let Some(table) = &mut self.table {
                    table.cell.clear();
                }
            }
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                let url = match link_type {
                    LinkType::Email => format!("mailto:{dest_url}"),
                    _ => dest_url.to_string(),
                };
                self.open_link("[", url);
            }
            // Telegram links cannot nest, so an image inside a link keeps
            // only its alt text
            Tag::Image { .. } if !self.links.is_empty() => {
                self.links.push(None);
                self.literal("🖼 ");
            }
            Tag::Image { dest_url, .. } => self.open_link("[🖼 ", dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) | TagEnd::Strong => self.close_style(Style::Bold),
            TagEnd::Emphasis => self.close_style(Style::Italic),
            TagEnd::Strikethrough => self.close_style(Style::Strike),
            TagEnd::BlockQuote(_) => self.end_quote(),
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    let fenced = code.fenced();
                    self.buf().push_str(&fenced);
                    self.finished_code = Some(code);
                }
            }
            TagEnd::List(_) => {
                self.lists.pop();
            }
            TagEnd::Item => self.end_item(),
            TagEnd::FootnoteDefinition => {
                let content = self.stack.pop().unwrap_or_default();
                let label = self.footnotes.pop().unwrap_or_default();
                let line = format!(
                    "{}{}",
                    escape_text(&format!("[{label}]: ")),
                    content.trim_matches('\n')
                );
                self.buf().push_str(&line);
            }
            TagEnd::TableCell => {
                if let Some(table) = &mut self.table {
                    let cell = table.cell.trim().to_owned();
                    if let Some(row) = table.rows.last_mut() {
                        row.push(cell);
                    }
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    let layout = CodeBlock {
                        lang: None,
                        code: layout_table(&table),
                    };
                    let fenced = layout.fenced();
                    self.buf().push_str(&fenced);
                    self.finished_code = Some(layout);
                }
            }
            TagEnd::Link | TagEnd::Image => self.close_link(),
            _ => {}
        }
    }

    /// Separate a new block from whatever the current buffer already holds.
    fn start_block(&mut self) {
        let separator = if self.lists.is_empty() { "\n\n" } else { "\n" };
        let buf = self.buf();
        if !buf.is_empty() {
            let trimmed = buf.trim_end_matches('\n').len();
            buf.truncate(trimmed);
            buf.push_str(separator);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = &mut self.code {
            code.code.push_str(text);
            return;
        }
        if let Some(table) = &mut self.table {
            table.cell.push_str(text);
            return;
        }
        let text = if self.options.normalize_whitespace {
            whitespace::collapse_inline(text)
        } else {
            text.into()
        };
        let escaped = escape_text(&text);
        self.buf().push_str(&escaped);
    }

    /// Text that must appear exactly as given, never collapsed.
    fn literal(&mut self, text: &str) {
        if let Some(table) = &mut self.table {
            table.cell.push_str(text);
            return;
        }
        let escaped = escape_text(text);
        self.buf().push_str(&escaped);
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(table) = &mut self.table {
            table.cell.push_str(code);
            return;
        }
        let rendered = format!("`{}`", escape_code(code));
        self.buf().push_str(&rendered);
    }

    fn math(&mut self, math: &str, delimiter: &str) {
        let text = if self.options.latex_escape {
            latex::to_unicode(math)
        } else {
            format!("{delimiter}{math}{delimiter}")
        };
        self.literal(&text);
    }

    fn line_break(&mut self) {
        if let Some(table) = &mut self.table {
            table.cell.push(' ');
            return;
        }
        self.buf().push('\n');
    }

    fn open_style(&mut self, style: Style) {
        let depth = self.style_depth(style);
        *depth += 1;
        if *depth == 1 && self.table.is_none() {
            self.buf().push_str(style.marker());
        }
    }

    fn close_style(&mut self, style: Style) {
        let depth = self.style_depth(style);
        let was_outermost = *depth == 1;
        *depth = depth.saturating_sub(1);
        if was_outermost && self.table.is_none() {
            self.buf().push_str(style.marker());
        }
    }

    fn style_depth(&mut self, style: Style) -> &mut usize {
        match style {
            Style::Bold => &mut self.bold,
            Style::Italic => &mut self.italic,
            Style::Strike => &mut self.strike,
        }
    }

    fn open_link(&mut self, opener: &str, url: String) {
        self.links.push(Some(url));
        if self.table.is_none() {
            self.buf().push_str(opener);
        }
    }

    fn close_link(&mut self) {
        let Some(Some(url)) = self.links.pop() else {
            return;
        };
        if self.table.is_none() {
            let target = format!("]({})", escape_url(&url));
            self.buf().push_str(&target);
        }
    }

    fn end_item(&mut self) {
        let content = self.stack.pop().unwrap_or_default();
        let marker = match self.lists.last_mut() {
            Some(ListState { next: Some(n) }) => {
                let marker = format!("{n}\\. ");
                *n += 1;
                marker
            }
            _ => "• ".to_owned(),
        };

        // Fences and the lines of a pre block stay at column zero
        let mut item = String::with_capacity(content.len() + marker.len());
        let mut in_pre = false;
        for (index, line) in content.trim_matches('\n').lines().enumerate() {
            let fence = line.starts_with("```");
            if index == 0 {
                item.push_str(&marker);
                if fence {
                    item.truncate(item.trim_end().len());
                    item.push('\n');
                }
            } else {
                item.push('\n');
                if !line.is_empty() && !fence && !in_pre {
                    item.push_str("  ");
                }
            }
            item.push_str(line);
            if fence {
                in_pre = !in_pre;
            }
        }
        if item.is_empty() {
            item.push_str(marker.trim_end());
        }

        let buf = self.buf();
        if !buf.is_empty() {
            let trimmed = buf.trim_end_matches('\n').len();
            buf.truncate(trimmed);
            buf.push('\n');
        }
        buf.push_str(&item);
    }

    fn end_quote(&mut self) {
        let content = self.stack.pop().unwrap_or_default();
        self.quote_depth = self.quote_depth.saturating_sub(1);
        if self.quote_depth > 0 {
            self.buf().push_str(&content);
            return;
        }

        // `>` only starts a quote at the beginning of a line, so quotes nested
        // in list items get a plain bar instead.
        let prefix = if self.lists.is_empty() { ">" } else { "│ " };
        let quoted = content
            .trim_matches('\n')
            .lines()
            .map(|line| format!("{prefix}{line}"))
            .collect::<Vec<_>>()
            .join("\n");
        self.buf().push_str(&quoted);
    }
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Bold,
    Italic,
    Strike,
}

impl Style {
    fn marker(self) -> &'static str {
        match self {
            Style::Bold => "*",
            Style::Italic => "_",
            Style::Strike => "~",
        }
    }
}

/// Lay a table out as aligned monospace text, ready to go in a `pre` block.
fn layout_table(table: &TableState) -> String {
    let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in &table.rows {
        for (column, cell) in row.iter().enumerate() {
            widths[column] = widths[column].max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    for (index, row) in table.rows.iter().enumerate() {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(column, &width)| {
                let cell = row.get(column).map(String::as_str).unwrap_or("");
                match table.alignments.get(column) {
                    Some(Alignment::Right) => format!("{cell:>width$}"),
                    Some(Alignment::Center) => format!("{cell:^width$}"),
                    _ => format!("{cell:<width$}"),
                }
            })
            .collect();
        lines.push(cells.join(" | ").trim_end().to_owned());

        if index == 0 && table.rows.len() > 1 {
            let separator: Vec<String> = widths.iter().map(|&width| "-".repeat(width)).collect();
            lines.push(separator.join("-+-"));
        }
    }

    lines.join("\n")
}
