pub mod types;

pub use types::{AppError, ParseError, ProbeError, SourceError};
