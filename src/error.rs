use thiserror::Error;

use crate::models::TransactionStatus;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Transaction {0} not found")]
    TransactionNotFound(i64),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    #[error("Status {0:?} requires an assigned category")]
    MissingCategory(TransactionStatus),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TallyError {
    fn from(err: reqwest::Error) -> Self {
        TallyError::Remote(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
