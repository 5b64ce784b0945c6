use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("malformed page description: {0}")]
    MalformedPage(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("linguistic engine failed to initialize: {0}")]
    Initialization(String),

    #[error("no dictionary available for locale '{0}'")]
    UnsupportedLocale(String),

    #[error("dictionary is corrupt: {0}")]
    CorruptDictionary(String),
}
