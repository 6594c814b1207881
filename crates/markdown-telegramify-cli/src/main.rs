use anyhow::{Context, Result};
use markdown_telegramify_engine::{Driver, Telegramify, io};
use std::io::{BufWriter, stdin, stdout};
use std::{env, process};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries nothing but records
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 1 {
        eprintln!("Usage: {} < input.md", args[0]);
        eprintln!("Reads Markdown from stdin and writes NUL-terminated Telegram messages to stdout");
        process::exit(1);
    }

    let markdown = io::read_input(stdin().lock()).context("Failed to read Markdown from stdin")?;
    log::debug!("read {} bytes of Markdown", markdown.len());

    let driver = Driver::new(Telegramify);
    log::debug!("conversion options: {:?}", driver.options());
    let mut out = BufWriter::new(stdout().lock());
    let summary = driver
        .convert_and_emit(&markdown, &mut out)
        .context("Failed to convert Markdown")?;

    log::info!(
        "wrote {} messages ({} non-text boxes skipped)",
        summary.records,
        summary.skipped
    );
    Ok(())
}
