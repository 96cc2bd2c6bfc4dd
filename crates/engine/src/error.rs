//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidAmount`] thrown when user input is not a non-negative number.
//! - [`AbsentRecord`] thrown when a user has never submitted any data.
//! - [`Database`] thrown when the storage layer fails (after retries).
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`AbsentRecord`]: EngineError::AbsentRecord
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("no ledger record for user \"{0}\"")]
    AbsentRecord(String),
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::AbsentRecord(a), Self::AbsentRecord(b)) => a == b,
            (Self::MissingConfig(a), Self::MissingConfig(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
