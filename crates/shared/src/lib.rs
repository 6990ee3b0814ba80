//! Shared utilities for the model manager workspace.
//!
//! This crate provides common functionality used across the other crates:
//! - Content hashing (SHA-256 hex digests)
//! - Deterministic namespace derivation

pub mod digest;
