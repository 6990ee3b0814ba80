//! Slow-statement capture and its backing record.

use std::time::Duration;

use chrono::{DateTime, Utc};
use orm::{
    ColumnMetadata, ColumnType, Entity, EntityId, EntityMetadata, IndexMetadata,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::ManagerError;
use crate::manager::ModelManager;
use crate::metrics;
use crate::repository::Repository;
use crate::settings::ManagerSettings;

/// Entity type name of the slow-query log.
pub const SLOW_QUERY_ENTITY: &str = "slow_query_log";

/// One captured slow statement. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SlowQueryRecord {
    id: Uuid,
    query: String,
    duration_secs: f64,
    hash: String,
    captured_at: DateTime<Utc>,
}

impl SlowQueryRecord {
    /// Captures `query`, hashing the raw statement text with SHA-256.
    pub fn new(query: impl Into<String>, duration_secs: f64) -> Self {
        let query = query.into();
        let hash = shared::digest::sha256_hex(&query);
        Self::with_hash(query, duration_secs, hash)
    }

    /// Captures `query` with a caller-supplied content hash, for callers that
    /// normalize statements before hashing.
    pub fn with_hash(
        query: impl Into<String>,
        duration_secs: f64,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
            duration_secs: duration_secs.max(0.0),
            hash: hash.into(),
            captured_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Execution time in seconds, never negative.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// The dynamic record persisted through the manager.
    pub fn to_entity(&self) -> Entity {
        Entity::new(SLOW_QUERY_ENTITY)
            .with_id(EntityId::Uuid(self.id))
            .with_field("query", self.query.clone())
            .with_field("duration", self.duration_secs)
            .with_field("hash", self.hash.clone())
            .with_field("captured_at", self.captured_at.to_rfc3339())
    }

    /// Rebuilds a record from its persisted form. `None` when the entity is
    /// not a well-formed slow-query row.
    pub fn from_entity(entity: &Entity) -> Option<Self> {
        if entity.name() != SLOW_QUERY_ENTITY {
            return None;
        }
        let id = match entity.id()? {
            EntityId::Uuid(id) => *id,
            _ => return None,
        };
        let query = entity.field("query")?.as_str()?.to_string();
        let duration_secs = entity.field("duration")?.as_f64()?;
        let hash = entity.field("hash")?.as_str()?.to_string();
        let captured_at = DateTime::parse_from_rfc3339(entity.field("captured_at")?.as_str()?)
            .ok()?
            .with_timezone(&Utc);

        Some(Self {
            id,
            query,
            duration_secs,
            hash,
            captured_at,
        })
    }
}

/// Declared metadata for the slow-query table.
///
/// One row per captured statement. The hash uniqueness constraint lives here,
/// in the storage layer, not in application logic.
pub fn slow_query_metadata() -> EntityMetadata {
    EntityMetadata::new(SLOW_QUERY_ENTITY, "slow_query_log")
        .with_column(ColumnMetadata::new("id", ColumnType::Uuid))
        .with_column(ColumnMetadata::new("query", ColumnType::Text))
        .with_column(ColumnMetadata::new("duration", ColumnType::Double))
        .with_column(ColumnMetadata::new("hash", ColumnType::VarChar(64)).unique())
        .with_column(ColumnMetadata::new("captured_at", ColumnType::TimestampTz))
        .with_index(
            IndexMetadata::new("idx_slow_query_hash", vec!["hash".into()]).unique(),
        )
        .with_index(IndexMetadata::new(
            "idx_slow_query_id_hash",
            vec!["id".into(), "hash".into()],
        ))
}

/// Capture hook fed by the statement-execution path.
///
/// Every observation lands in the duration histogram; only statements
/// crossing the threshold produce a record.
pub struct SlowQueryLog {
    threshold: Duration,
}

impl SlowQueryLog {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn from_settings(settings: &ManagerSettings) -> Self {
        Self::new(Duration::from_millis(settings.query_log.threshold_ms))
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Returns a record when `duration` crosses the threshold.
    pub fn observe(&self, query: &str, duration: Duration) -> Option<SlowQueryRecord> {
        metrics::record_statement_duration("execute", duration.as_secs_f64());
        if duration < self.threshold {
            return None;
        }
        debug!(
            elapsed_ms = duration.as_millis() as u64,
            "slow statement captured"
        );
        Some(SlowQueryRecord::new(query, duration.as_secs_f64()))
    }
}

/// Custom repository for the slow-query log.
///
/// Register it for [`SLOW_QUERY_ENTITY`] to get capture persistence on top of
/// the generic lookup surface.
pub struct SlowQueryRepository {
    metadata: EntityMetadata,
}

impl SlowQueryRepository {
    pub fn new(metadata: EntityMetadata) -> Self {
        Self { metadata }
    }

    /// Persists one captured record and flushes it immediately, so a capture
    /// survives even when the surrounding unit of work never flushes.
    pub fn record(
        &self,
        manager: &mut ModelManager,
        record: &SlowQueryRecord,
    ) -> Result<(), ManagerError> {
        let entity = record.to_entity();
        manager.persist(entity.clone())?;
        manager.flush_scoped(&entity)?;
        Ok(())
    }
}

impl Repository for SlowQueryRepository {
    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }
}
