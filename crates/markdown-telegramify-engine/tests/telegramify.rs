//! End-to-end conversion with the built-in converter.

use markdown_telegramify_engine::{
    ContentBox, ContentType, ConvertOptions, Converter, Driver, InterpreterChain, Telegramify,
    decode_records,
};
use pretty_assertions::assert_eq;

fn convert(md: &str) -> Vec<String> {
    let mut out = Vec::new();
    Driver::new(Telegramify)
        .convert_and_emit(md, &mut out)
        .unwrap();
    decode_records(&out)
}

#[test]
fn converts_mixed_document() {
    let md = "# Release notes\n\n\
              Version **1.2** fixes `parse()` and adds [docs](https://example.com/docs).\n\n\
              - faster startup\n- smaller binary\n\n\
              > Thanks to everyone who tested!\n";

    let records = convert(md);

    assert_eq!(records.len(), 1);
    insta::assert_snapshot!(records[0], @r"
    *Release notes*

    Version *1\.2* fixes `parse()` and adds [docs](https://example.com/docs)\.

    • faster startup
    • smaller binary

    >Thanks to everyone who tested\!
    ");
}

#[test]
fn hello_world_with_real_converter() {
    assert_eq!(convert("# Hello\n\n**world**\n"), vec!["*Hello*\n\n*world*"]);
}

#[test]
fn empty_input_produces_no_records() {
    assert!(convert("").is_empty());
}

#[test]
fn long_input_is_chunked_below_telegram_limit() {
    let paragraph = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(20);
    let md = format!("{paragraph}\n\n").repeat(20);

    let records = convert(&md);

    assert!(records.len() > 1);
    for record in &records {
        assert!(record.chars().count() <= 4090);
    }
    let words: usize = records.iter().map(|r| r.matches("Lorem").count()).sum();
    assert_eq!(words, 400);
}

#[test]
fn latex_is_rendered_as_text() {
    assert_eq!(
        convert(r"Euler: \(e^{i\pi} + 1 = 0\)"),
        vec!["Euler: e^iπ \\+ 1 \\= 0"]
    );
}

#[test]
fn default_chain_sends_huge_code_as_file() {
    let code = "x = 1\n".repeat(1000);
    let md = format!("intro\n\n```python\n{code}```\n");

    let boxes = Telegramify
        .telegramify(&md, &InterpreterChain::default(), &ConvertOptions::default())
        .unwrap();

    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0], ContentBox::text("intro"));
    assert_eq!(boxes[1].content_type(), ContentType::File);
}

#[test]
fn text_only_chain_splits_huge_code_instead() {
    let code = "x = 1\n".repeat(1000);
    let records = convert(&format!("```python\n{code}```\n"));

    assert!(records.len() > 1);
    for record in &records {
        assert!(record.starts_with("```python\n"));
        assert!(record.ends_with("\n```"));
    }
}

fn convert_with_limit(md: &str, max_word_count: usize) -> Vec<String> {
    let options = ConvertOptions {
        max_word_count,
        ..ConvertOptions::default()
    };
    let mut out = Vec::new();
    Driver::with_options(Telegramify, options, InterpreterChain::text_only())
        .convert_and_emit(md, &mut out)
        .unwrap();
    decode_records(&out)
}

/// Checks that a message parses as MarkdownV2 on its own: fences, inline
/// code and style markers are balanced, links are complete and no reserved
/// character appears unescaped outside code.
fn assert_valid_markdown_v2(message: &str) {
    let mut in_pre = false;
    let mut in_code = false;
    let mut in_link = false;
    let mut styles: Vec<char> = Vec::new();
    let mut chars = message.char_indices();

    while let Some((at, c)) = chars.next() {
        let line_start = at == 0 || message[..at].ends_with('\n');
        if c == '\\' {
            assert!(chars.next().is_some(), "dangling backslash in {message:?}");
            continue;
        }
        if line_start && message[at..].starts_with("```") {
            in_pre = !in_pre;
            chars.nth(1);
            continue;
        }
        if in_pre {
            continue;
        }
        match c {
            '`' => in_code = !in_code,
            _ if in_code => {}
            '*' | '_' | '~' => match styles.iter().rposition(|&s| s == c) {
                Some(at) => {
                    styles.remove(at);
                }
                None => styles.push(c),
            },
            '[' => {
                assert!(!in_link, "nested link in {message:?}");
                in_link = true;
            }
            ']' => {
                assert!(in_link, "stray ] in {message:?}");
                assert_eq!(
                    chars.next().map(|(_, c)| c),
                    Some('('),
                    "link without target in {message:?}"
                );
                loop {
                    match chars.next() {
                        Some((_, '\\')) => {
                            chars.next();
                        }
                        Some((_, ')')) => break,
                        Some(_) => {}
                        None => panic!("unterminated link target in {message:?}"),
                    }
                }
                in_link = false;
            }
            '>' => assert!(line_start, "unescaped > inside a line of {message:?}"),
            '(' | ')' | '#' | '+' | '-' | '=' | '|' | '{' | '}' | '.' | '!' => {
                panic!("unescaped {c:?} in {message:?}")
            }
            _ => {}
        }
    }

    assert!(!in_pre, "unclosed pre block in {message:?}");
    assert!(!in_code, "unclosed inline code in {message:?}");
    assert!(!in_link, "unclosed link in {message:?}");
    assert!(styles.is_empty(), "unclosed {styles:?} in {message:?}");
}

fn assert_all_valid(records: &[String], max_word_count: usize) {
    assert!(records.len() > 1, "expected a split, got {records:?}");
    for record in records {
        assert!(record.chars().count() <= max_word_count, "{record:?} too long");
        assert_valid_markdown_v2(record);
    }
}

#[test]
fn oversized_table_is_split_into_fenced_pieces() {
    let rows: String = (0..20).map(|i| format!("| row{i} | value{i} |\n")).collect();
    let md = format!("| a | b |\n|---|---|\n{rows}");

    let records = convert_with_limit(&md, 80);

    assert_all_valid(&records, 80);
    for record in &records {
        assert!(record.starts_with("```\n") && record.ends_with("\n```"), "{record:?}");
    }
    assert!(records.iter().any(|r| r.contains("row19 | value19")));
}

#[test]
fn oversized_bold_paragraph_keeps_markers_balanced() {
    let md = format!("**{}**\n", vec!["word"; 40].join(" "));

    let records = convert_with_limit(&md, 40);

    assert_all_valid(&records, 40);
    let words: usize = records.iter().map(|r| r.matches("word").count()).sum();
    assert_eq!(words, 40);
}

#[test]
fn oversized_list_with_code_keeps_pre_blocks_closed() {
    let code: String = (0..15).map(|i| format!("  let v{i} = {i}.0;\n")).collect();
    let md = format!("- setup:\n\n  ```rust\n{code}  ```\n- done.\n");

    let records = convert_with_limit(&md, 60);

    assert_all_valid(&records, 60);
    assert!(records[0].starts_with("• setup:"));
    assert!(records[1..].iter().any(|r| r.starts_with("```rust\n")));
}

#[test]
fn oversized_paragraph_with_links_and_code_stays_valid() {
    let sentence = "See [the *long* guide](https://example.com/a_(b)) and `x.y()` now. ";
    let md = format!("{}\n", sentence.repeat(12));

    let records = convert_with_limit(&md, 64);

    assert_all_valid(&records, 64);
}

#[test]
fn badge_link_is_a_single_link() {
    assert_eq!(
        convert("[![build](https://ci.example/badge.svg)](https://ci.example/job)\n"),
        vec!["[🖼 build](https://ci.example/job)"]
    );
}
