//! Service layer: the operations embedders call.

/// Match mutation service: timer, round scores, winners, completion.
pub mod match_service;
/// Canonical resolver gating every mutation.
pub mod resolver;
/// Sharing grant lifecycle.
pub mod share_service;
