//! Block handlers.
//!
//! Each top-level block is offered to the interpreters of an
//! [`InterpreterChain`] in order; the first one that accepts the block turns
//! it into content boxes.

mod file;
mod text;

pub use file::FileInterpreter;
pub use text::TextInterpreter;

use crate::convert::ConvertError;
use crate::models::{ContentBox, ConvertOptions};
use crate::parsing::Block;

pub trait Interpreter: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepts(&self, block: &Block, options: &ConvertOptions) -> bool;

    fn interpret(
        &self,
        block: &Block,
        options: &ConvertOptions,
    ) -> Result<Vec<ContentBox>, ConvertError>;
}

pub struct InterpreterChain {
    interpreters: Vec<Box<dyn Interpreter>>,
}

impl InterpreterChain {
    pub fn new(interpreters: Vec<Box<dyn Interpreter>>) -> Self {
        Self { interpreters }
    }

    /// Plain text handling only; rich content is rendered as text too.
    pub fn text_only() -> Self {
        Self::new(vec![Box::new(TextInterpreter)])
    }

    pub fn is_empty(&self) -> bool {
        self.interpreters.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interpreters.iter().map(|i| i.name()).collect()
    }

    /// First interpreter willing to handle `block`
    pub fn find(&self, block: &Block, options: &ConvertOptions) -> Option<&dyn Interpreter> {
        self.interpreters
            .iter()
            .find(|i| i.accepts(block, options))
            .map(|i| i.as_ref())
    }
}

/// Oversized code goes out as a file, everything else as text.
impl Default for InterpreterChain {
    fn default() -> Self {
        Self::new(vec![Box::new(FileInterpreter), Box::new(TextInterpreter)])
    }
}

impl std::fmt::Debug for InterpreterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
