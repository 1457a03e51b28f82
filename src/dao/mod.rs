//! Persistence layer: entity definitions and the repository abstraction.

/// Repository trait and mutation batch types.
pub mod match_store;
/// Persisted entity definitions shared across layers.
pub mod models;
/// Storage error types shared by every backend.
pub mod storage;
