use super::Interpreter;
use crate::convert::ConvertError;
use crate::models::{ContentBox, ConvertOptions};
use crate::parsing::{Block, BlockKind};
use crate::splitting::char_len;

/// Sends code blocks that cannot fit in one message as a document.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileInterpreter;

impl Interpreter for FileInterpreter {
    fn name(&self) -> &'static str {
        "file"
    }

    fn accepts(&self, block: &Block, options: &ConvertOptions) -> bool {
        block.kind == BlockKind::Code
            && block.code.is_some()
            && char_len(&block.rendered) > options.max_word_count
    }

    fn interpret(
        &self,
        block: &Block,
        _options: &ConvertOptions,
    ) -> Result<Vec<ContentBox>, ConvertError> {
        let code = block.code.as_ref().ok_or_else(|| ConvertError::Interpreter {
            interpreter: self.name(),
            message: format!("block at {:?} has no code", block.source),
        })?;
        let lang = code.lang.as_deref();

        Ok(vec![ContentBox::File {
            file_name: format!("code.{}", extension(lang)),
            data: code.code.clone().into_bytes(),
            caption: lang.unwrap_or_default().to_owned(),
        }])
    }
}

fn extension(lang: Option<&str>) -> String {
    let Some(lang) = lang else {
        return "txt".to_owned();
    };
    let lang = lang.to_ascii_lowercase();
    let ext = match lang.as_str() {
        "rust" => "rs",
        "python" | "py" => "py",
        "javascript" | "js" => "js",
        "typescript" | "ts" => "ts",
        "bash" | "sh" | "shell" | "zsh" => "sh",
        "yaml" | "yml" => "yaml",
        "c++" | "cpp" => "cpp",
        "markdown" | "md" => "md",
        "text" | "plaintext" => "txt",
        other if other.len() <= 8 && other.chars().all(|c| c.is_ascii_alphanumeric()) => {
            return other.to_owned();
        }
        _ => "txt",
    };
    ext.to_owned()
}
