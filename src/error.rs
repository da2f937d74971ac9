//! Query error taxonomy
//!
//! Aggregates and listings are pure over the loaded records and only ever fail
//! with `NotFound`. `Unavailable` covers the dataset failing to load or a remote
//! engine not answering; callers get it as a single generic failure.
//!
//! There is no invalid-input variant: unparsable optional query values are
//! dropped while parsing parameters (see `repository::ListSchoolsParams`) so a
//! bad bound never fails a whole listing.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("school {0} not found")]
    NotFound(u32),

    #[error("school data unavailable: {0}")]
    Unavailable(String),
}

pub type QueryResult<T> = Result<T, QueryError>;
