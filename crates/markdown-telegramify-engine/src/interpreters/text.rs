use super::Interpreter;
use crate::convert::ConvertError;
use crate::models::{ContentBox, ConvertOptions};
use crate::parsing::Block;
use crate::splitting::{char_len, split_code, split_text};

/// Renders any block as MarkdownV2 text, splitting it when it is too long
/// for one message.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextInterpreter;

impl Interpreter for TextInterpreter {
    fn name(&self) -> &'static str {
        "text"
    }

    fn accepts(&self, _block: &Block, _options: &ConvertOptions) -> bool {
        true
    }

    fn interpret(
        &self,
        block: &Block,
        options: &ConvertOptions,
    ) -> Result<Vec<ContentBox>, ConvertError> {
        let max_len = options.max_word_count;
        if block.rendered.is_empty() {
            return Ok(Vec::new());
        }
        if char_len(&block.rendered) <= max_len {
            return Ok(vec![ContentBox::text(block.rendered.clone())]);
        }

        let pieces = match &block.code {
            Some(code) => split_code(&code.code, code.lang.as_deref(), max_len),
            None => split_text(&block.rendered, max_len),
        };
        log::debug!(
            "split {:?} block at {:?} into {} pieces",
            block.kind,
            block.source,
            pieces.len()
        );
        Ok(pieces.into_iter().map(ContentBox::text).collect())
    }
}
