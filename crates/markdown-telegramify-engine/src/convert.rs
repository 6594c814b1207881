use crate::interpreters::InterpreterChain;
use crate::models::{ContentBox, ConvertOptions, MIN_MAX_WORD_COUNT};
use crate::parsing::parse_blocks;
use crate::splitting::ChunkPacker;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Invalid conversion options: {0}")]
    InvalidOptions(String),
    #[error("Interpreter '{interpreter}' failed: {message}")]
    Interpreter {
        interpreter: &'static str,
        message: String,
    },
    #[error("Interpreter '{interpreter}' produced {len} characters, limit is {max_len}")]
    Oversized {
        interpreter: &'static str,
        len: usize,
        max_len: usize,
    },
}

/// Turns Markdown into a sequence of Telegram-ready content boxes.
pub trait Converter {
    fn telegramify(
        &self,
        content: &str,
        interpreters: &InterpreterChain,
        options: &ConvertOptions,
    ) -> Result<Vec<ContentBox>, ConvertError>;
}

impl<C: Converter + ?Sized> Converter for &C {
    fn telegramify(
        &self,
        content: &str,
        interpreters: &InterpreterChain,
        options: &ConvertOptions,
    ) -> Result<Vec<ContentBox>, ConvertError> {
        (**self).telegramify(content, interpreters, options)
    }
}

/// The built-in converter: pulldown-cmark parsing, MarkdownV2 rendering and
/// chunking to `max_word_count`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Telegramify;

impl Converter for Telegramify {
    fn telegramify(
        &self,
        content: &str,
        interpreters: &InterpreterChain,
        options: &ConvertOptions,
    ) -> Result<Vec<ContentBox>, ConvertError> {
        if options.max_word_count < MIN_MAX_WORD_COUNT {
            return Err(ConvertError::InvalidOptions(format!(
                "max_word_count must be at least {MIN_MAX_WORD_COUNT}, got {}",
                options.max_word_count
            )));
        }

        let blocks = parse_blocks(content, options);
        let mut packer = ChunkPacker::new(options.max_word_count);
        let mut boxes = Vec::new();

        for block in &blocks {
            let Some(interpreter) = interpreters.find(block, options) else {
                log::debug!(
                    "no interpreter accepted {:?} block at {:?}, dropping it",
                    block.kind,
                    block.source
                );
                continue;
            };

            for produced in interpreter.interpret(block, options)? {
                match produced {
                    ContentBox::Text { content: text } => {
                        packer
                            .push(&text)
                            .map_err(|e| ConvertError::Oversized {
                                interpreter: interpreter.name(),
                                len: e.len,
                                max_len: e.max_len,
                            })?;
                    }
                    other => {
                        boxes.extend(packer.drain().into_iter().map(ContentBox::text));
                        boxes.push(other);
                    }
                }
            }
        }
        boxes.extend(packer.drain().into_iter().map(ContentBox::text));

        log::debug!(
            "converted {} blocks into {} boxes",
            blocks.len(),
            boxes.len()
        );
        Ok(boxes)
    }
}
