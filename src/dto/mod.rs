//! Input/output shapes crossing the library boundary.

/// References shared by several operations.
pub mod common;
/// Match mutation payloads and results.
pub mod match_ops;
/// Sharing lifecycle payloads.
pub mod share;
/// Validation helpers for DTOs.
pub mod validation;
