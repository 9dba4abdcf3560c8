//! Errors raised while validating a delivered reading.
//!
//! None of these are fatal: the engine drops the offending reading from the
//! current cycle and carries on with the rest of the batch.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadingError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("field '{0}' is empty")]
    EmptyField(&'static str),

    #[error("observation timestamp {0} is out of range")]
    BadTimestamp(i64),
}
