use std::io::{self, Write};

use crate::convert::{ConvertError, Converter};
use crate::interpreters::InterpreterChain;
use crate::io::write_record;
use crate::models::ConvertOptions;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Conversion failed: {0}")]
    Convert(#[from] ConvertError),
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// What a single [`Driver::convert_and_emit`] call wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitSummary {
    /// TEXT boxes written as records
    pub records: usize,
    /// Non-TEXT boxes dropped
    pub skipped: usize,
}

/// Read → convert → filter → emit, once per call.
///
/// The driver owns no conversion logic. It hands the Markdown to its
/// [`Converter`] with a fixed profile and frames every TEXT box as
/// `payload + 0x00`, in the order the converter returned them.
#[derive(Debug)]
pub struct Driver<C> {
    converter: C,
    options: ConvertOptions,
    interpreters: InterpreterChain,
}

impl<C: Converter> Driver<C> {
    /// Default profile: LaTeX escaping, whitespace normalization,
    /// 4090-character boxes and a text-only interpreter chain.
    pub fn new(converter: C) -> Self {
        Self::with_options(
            converter,
            ConvertOptions::default(),
            InterpreterChain::text_only(),
        )
    }

    pub fn with_options(
        converter: C,
        options: ConvertOptions,
        interpreters: InterpreterChain,
    ) -> Self {
        Self {
            converter,
            options,
            interpreters,
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn convert_and_emit<W: Write>(
        &self,
        markdown: &str,
        out: &mut W,
    ) -> Result<EmitSummary, DriverError> {
        let boxes = self
            .converter
            .telegramify(markdown, &self.interpreters, &self.options)?;

        let mut summary = EmitSummary::default();
        for content_box in &boxes {
            match content_box.as_text() {
                Some(text) => {
                    write_record(out, text)?;
                    summary.records += 1;
                }
                None => summary.skipped += 1,
            }
        }
        out.flush()?;

        log::debug!(
            "emitted {} records, skipped {} non-text boxes",
            summary.records,
            summary.skipped
        );
        Ok(summary)
    }
}
