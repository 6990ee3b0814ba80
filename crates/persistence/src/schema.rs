//! Schema synchronization against declared metadata.

use std::sync::RwLock;

use orm::{Configuration, MappingEngine, SyncMode};
use tracing::{debug, info};

use crate::error::ManagerError;

/// Outcome of one synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaSyncReport {
    /// DDL statements the engine computed for the pass.
    pub statements: Vec<String>,
    /// Whether the statements were applied.
    pub applied: bool,
}

/// Compares live storage against the declared metadata and applies the
/// missing DDL.
///
/// Deployment-time tooling: introspection and DDL execution are expensive and
/// must not race live traffic; coordinating that is the operator's job.
pub struct SchemaSynchronizer<'a> {
    engine: &'a mut dyn MappingEngine,
    configuration: &'a RwLock<Configuration>,
}

impl<'a> SchemaSynchronizer<'a> {
    pub fn new(
        engine: &'a mut dyn MappingEngine,
        configuration: &'a RwLock<Configuration>,
    ) -> Self {
        Self {
            engine,
            configuration,
        }
    }

    /// Brings live storage into agreement with the declared metadata.
    ///
    /// Without `invalidate` the schema is assumed current and nothing runs.
    /// With it, an empty declared set or an empty diff also short-circuits;
    /// otherwise the computed statements are applied per `mode`.
    pub fn synchronize(
        &mut self,
        mode: SyncMode,
        invalidate: bool,
    ) -> Result<SchemaSyncReport, ManagerError> {
        if !invalidate {
            return Ok(SchemaSyncReport::default());
        }

        let declared = self
            .configuration
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .metadata()
            .all();
        if declared.is_empty() {
            debug!("no declared metadata; nothing to synchronize");
            return Ok(SchemaSyncReport::default());
        }

        let statements = self.engine.schema_diff(&declared)?;
        if statements.is_empty() {
            debug!("live schema already matches declared metadata");
            return Ok(SchemaSyncReport {
                statements,
                applied: false,
            });
        }

        self.engine.apply_ddl(&statements, mode)?;
        info!(count = statements.len(), ?mode, "schema statements applied");
        Ok(SchemaSyncReport {
            statements,
            applied: true,
        })
    }
}
