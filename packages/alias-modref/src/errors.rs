//! Error types for alias-modref.
//!
//! Queries are total over their lattices and never fail; imprecision is
//! expressed as a less precise lattice value. Errors exist only on the
//! configuration surface.

use thiserror::Error;

/// Unified error type for engine configuration.
#[derive(Debug, Error)]
pub enum AliasModRefError {
    /// Pipeline specification named a component the registry does not know
    #[error("unknown alias analysis component: {0}")]
    UnknownComponent(String),

    /// A factory was registered twice under the same name
    #[error("alias analysis component registered twice: {0}")]
    DuplicateComponent(String),

    /// Pipeline specification was malformed
    #[error("invalid pipeline specification: {0}")]
    InvalidPipeline(String),
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, AliasModRefError>;
