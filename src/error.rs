use thiserror::Error;

#[derive(Error, Debug)]
pub enum HomeFinanceError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown entry type: {0}")]
    UnknownEntryType(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Database not found at {0}. Run `homefinance init` first.")]
    NotInitialized(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HomeFinanceError>;
