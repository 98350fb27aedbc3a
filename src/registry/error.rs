//! Registry error types

use thiserror::Error;

/// Errors raised by site registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("site not found: {0}")]
    SiteNotFound(String),
}
