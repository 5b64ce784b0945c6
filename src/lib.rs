pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod error;
pub mod fixed;
pub mod geometry;
pub mod parser;
pub mod speller;

pub use checker::DictionaryEngine;
pub use config::Config;
pub use error::{EngineError, FlowError};
pub use fixed::FixedTextContainer;
pub use speller::{IdleStatus, SpellingError, Speller};

/// Direction of a position query relative to the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalDirection {
    Forward,
    Backward,
}

/// Spelling errors of one checked file, located for display.
#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub error_count: usize,
    pub errors: Vec<LocatedError>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct LocatedError {
    pub word: String,
    pub line: usize,
    pub column: usize,
    pub context: String,
    pub suggestions: Vec<String>,
}
