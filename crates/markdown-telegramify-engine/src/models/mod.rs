pub mod content;
pub mod options;

pub use content::*;
pub use options::*;
