//! Errors that abort the demo run.

use std::io;
use thiserror::Error;

use crudtour_core::error::DocumentStoreError;

#[derive(Error, Debug)]
pub enum DemoError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] DocumentStoreError),
    /// Writing the report failed.
    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
    /// A step that works on the first example document ran before it was inserted.
    #[error("Step {0} needs the first example document, which has not been inserted")]
    FirstDocumentMissing(&'static str),
}

pub type DemoResult<T> = Result<T, DemoError>;
