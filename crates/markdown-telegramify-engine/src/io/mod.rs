//! Reading Markdown in and writing NUL-framed records out.

use std::io::{self, Read, Write};

/// Byte written after every record.
pub const RECORD_SEPARATOR: u8 = 0x00;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Input is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidUtf8 { offset: usize },
}

/// Read the whole input stream as UTF-8 text
pub fn read_input<R: Read>(mut reader: R) -> Result<String, InputError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| InputError::InvalidUtf8 {
        offset: e.utf8_error().valid_up_to(),
    })
}

/// Write one payload followed by the record separator
pub fn write_record<W: Write>(out: &mut W, payload: &str) -> io::Result<()> {
    out.write_all(payload.as_bytes())?;
    out.write_all(&[RECORD_SEPARATOR])
}

/// Split a framed stream back into its payloads.
///
/// The final separator terminates the last record, so the trailing empty
/// segment is not a record of its own.
pub fn decode_records(bytes: &[u8]) -> Vec<String> {
    let mut segments: Vec<&[u8]> = bytes.split(|&b| b == RECORD_SEPARATOR).collect();
    if segments.last().is_some_and(|last| last.is_empty()) {
        segments.pop();
    }
    segments
        .into_iter()
        .map(|segment| String::from_utf8_lossy(segment).into_owned())
        .collect()
}
