//! Failure taxonomy of the mapping engine.

use thiserror::Error;

/// Everything the mapping engine can raise.
///
/// Engine-native codes (SQLSTATE-style) are preserved where the storage layer
/// reported one, so the façade can surface them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Generic object-relational mapping failure, constraint violations
    /// included.
    #[error("mapping failure: {message}")]
    Orm {
        message: String,
        code: Option<String>,
    },

    /// A concurrent modification invalidated an expected entity version.
    #[error("optimistic lock conflict on `{entity}`: {message}")]
    OptimisticLock { entity: String, message: String },

    /// The operation demands an active transaction.
    #[error("`{operation}` requires an active transaction")]
    TransactionRequired { operation: String },

    /// Metadata resolution failed for the named entity type.
    #[error("unknown entity type `{entity}`")]
    UnknownEntity { entity: String },

    /// Connectivity failure while talking to storage.
    #[error("storage connection failure: {message}")]
    Connection { message: String },
}

impl EngineError {
    pub fn orm(message: impl Into<String>) -> Self {
        EngineError::Orm {
            message: message.into(),
            code: None,
        }
    }

    pub fn orm_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        EngineError::Orm {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// The engine-native error code, when the failure carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            EngineError::Orm { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
