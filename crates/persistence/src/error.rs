//! Façade-level failure taxonomy.
//!
//! Callers see exactly two failure kinds: [`ManagerError::InvalidArgument`]
//! for unresolvable type names, detected before anything reaches the engine,
//! and [`ManagerError::Persistence`] for everything the engine (or, at the
//! transactional boundary, caller-supplied work) can fail with. Engine-native
//! error types never cross this boundary.

use orm::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    /// The caller named an entity type that is not declared in the metadata
    /// registry. Never retried, never delegated.
    #[error("unknown entity type `{entity}`")]
    InvalidArgument { entity: String },

    /// A failure raised by the mapping engine, or by caller-supplied work
    /// inside a transaction. The original failure stays attached as the
    /// source chain.
    #[error("{message}")]
    Persistence {
        message: String,
        /// Engine-native code, when the failure carried one.
        code: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl ManagerError {
    pub fn invalid_argument(entity: impl Into<String>) -> Self {
        ManagerError::InvalidArgument {
            entity: entity.into(),
        }
    }

    pub(crate) fn persistence(message: impl Into<String>) -> Self {
        ManagerError::Persistence {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Wraps a failure from caller-supplied transactional work.
    pub(crate) fn from_work_failure(err: anyhow::Error) -> Self {
        ManagerError::Persistence {
            message: format!("transactional work failed: {err}"),
            code: None,
            source: Some(err.into()),
        }
    }

    /// The engine-native code attached to the failure, when one exists.
    pub fn code(&self) -> Option<&str> {
        match self {
            ManagerError::Persistence { code, .. } => code.as_deref(),
            ManagerError::InvalidArgument { .. } => None,
        }
    }
}

impl From<EngineError> for ManagerError {
    fn from(err: EngineError) -> Self {
        let code = err.code().map(str::to_owned);
        let message = match &err {
            EngineError::Orm { message, .. } => {
                format!("mapping engine rejected the operation: {message}")
            }
            EngineError::OptimisticLock { entity, .. } => {
                format!("optimistic lock conflict on `{entity}`")
            }
            EngineError::TransactionRequired { operation } => {
                format!("`{operation}` requires an active transaction")
            }
            EngineError::UnknownEntity { entity } => {
                format!("no mapping metadata for `{entity}`")
            }
            EngineError::Connection { message } => {
                format!("storage connection failure: {message}")
            }
        };
        ManagerError::Persistence {
            message,
            code,
            source: Some(Box::new(err)),
        }
    }
}
