use autoredirect_core::{RoutingError, StorageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaintainerError>;

/// Failures of the collaborators the maintainer calls into.
///
/// Errors are passed through unchanged; redirect writes made before the
/// failing step are not rolled back.
#[derive(Debug, Clone, Error)]
pub enum MaintainerError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
}
