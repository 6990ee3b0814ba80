//! Contract of the object-relational mapping engine.
//!
//! This crate contains:
//! - The dynamic entity model exchanged with the engine
//! - Declarative entity-to-table metadata
//! - The engine capability trait and its failure taxonomy
//! - The shared configuration object and cache backend capability
//!
//! The engine itself (statement generation, hydration, identity map) lives
//! behind the [`MappingEngine`] trait and is supplied by the embedding
//! application; this crate only fixes the seam.

pub mod cache;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod metadata;

pub use cache::{CacheBackend, MemoryCache};
pub use config::{Configuration, ProxyMode};
pub use engine::{LockMode, MappingEngine, SyncMode};
pub use entity::{Entity, EntityId};
pub use error::EngineError;
pub use metadata::{ColumnMetadata, ColumnType, EntityMetadata, IndexMetadata, MetadataRegistry};
