pub mod convert;
pub mod driver;
pub mod interpreters;
pub mod io;
pub mod models;
pub mod parsing;
pub mod splitting;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::{ConvertError, Converter, Telegramify};
pub use driver::{Driver, DriverError, EmitSummary};
pub use interpreters::{FileInterpreter, Interpreter, InterpreterChain, TextInterpreter};
pub use io::{InputError, decode_records, read_input};
pub use models::*;
