use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::{SharePermission, ShareRequestEntity, ShareRequestStatus, ShareTarget};

/// Payload creating a share invitation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShareRequest {
    /// Account invited to accept the share.
    pub shared_with_id: Uuid,
    /// Entity being offered; must be owned by the caller.
    pub target: ShareTarget,
    /// Capability level offered; falls back to the configured default.
    #[serde(default)]
    pub permission: Option<SharePermission>,
    /// Bundle parent when this request is part of a game+children share.
    #[serde(default)]
    pub parent_request_id: Option<Uuid>,
}

/// Recipient's answer to a share invitation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "answer", rename_all = "lowercase")]
pub enum ShareAnswer {
    /// Accept, creating the capability grant.
    Accept {
        /// For game shares: the recipient's own game the shared one maps to.
        #[serde(default)]
        linked_game_id: Option<Uuid>,
    },
    /// Reject; no grant is created.
    Reject,
}

/// Summary of a share request as shown in the recipient's inbox.
#[derive(Debug, Clone, Serialize)]
pub struct ShareRequestSummary {
    /// Primary key of the request.
    pub id: Uuid,
    /// Account offering the share.
    pub owner_id: Uuid,
    /// Entity being offered.
    pub target: ShareTarget,
    /// Capability level offered.
    pub permission: SharePermission,
    /// Current lifecycle state.
    pub status: ShareRequestStatus,
    /// When the request was created.
    pub created_at: OffsetDateTime,
}

impl From<ShareRequestEntity> for ShareRequestSummary {
    fn from(entity: ShareRequestEntity) -> Self {
        Self {
            id: entity.id,
            owner_id: entity.owner_id,
            target: entity.target,
            permission: entity.permission,
            status: entity.status,
            created_at: entity.created_at,
        }
    }
}
