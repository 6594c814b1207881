//! Shared helpers for unit tests.

use std::cell::RefCell;

use crate::convert::{ConvertError, Converter};
use crate::interpreters::InterpreterChain;
use crate::models::{ContentBox, ConvertOptions};

/// Returns canned boxes and records what it was called with.
pub struct StubConverter {
    boxes: Vec<ContentBox>,
    calls: RefCell<Vec<String>>,
    options: RefCell<Option<ConvertOptions>>,
    interpreters: RefCell<Vec<&'static str>>,
}

impl StubConverter {
    pub fn new(boxes: Vec<ContentBox>) -> Self {
        Self {
            boxes,
            calls: RefCell::new(Vec::new()),
            options: RefCell::new(None),
            interpreters: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn last_options(&self) -> Option<ConvertOptions> {
        self.options.borrow().clone()
    }

    pub fn last_interpreters(&self) -> Vec<&'static str> {
        self.interpreters.borrow().clone()
    }
}

impl Converter for StubConverter {
    fn telegramify(
        &self,
        content: &str,
        interpreters: &InterpreterChain,
        options: &ConvertOptions,
    ) -> Result<Vec<ContentBox>, ConvertError> {
        self.calls.borrow_mut().push(content.to_owned());
        *self.options.borrow_mut() = Some(options.clone());
        *self.interpreters.borrow_mut() = interpreters.names();
        Ok(self.boxes.clone())
    }
}

/// Always fails, like a converter that rejects its input.
pub struct FailingConverter;

impl Converter for FailingConverter {
    fn telegramify(
        &self,
        _content: &str,
        _interpreters: &InterpreterChain,
        _options: &ConvertOptions,
    ) -> Result<Vec<ContentBox>, ConvertError> {
        Err(ConvertError::Interpreter {
            interpreter: "stub",
            message: "malformed input".to_string(),
        })
    }
}

pub fn file_box() -> ContentBox {
    ContentBox::File {
        file_name: "code.txt".to_string(),
        data: b"data".to_vec(),
        caption: String::new(),
    }
}
