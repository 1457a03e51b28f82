//! Canonical resolver: the single gate between a caller-supplied match
//! reference and the underlying rows.
//!
//! The same gameplay row is reachable via two addressing schemes (owner
//! direct vs. sharing grant); both collapse here into one canonical view per
//! participant before any business logic runs. The resolver performs no
//! writes.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::{
    dao::models::{MatchEntity, MatchPlayerEntity, SharePermission},
    dto::common::MatchRef,
    error::ServiceError,
    state::SharedState,
};

/// Narrowing applied to the resolved participant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerFilter {
    /// Every participant of the match.
    All,
    /// A single participant row.
    MatchPlayer(Uuid),
    /// Every member of one team. Team mutations must see the whole team so
    /// the caller can check permission across all of it, not just one row.
    Team(Uuid),
}

/// The single underlying participant row, resolved regardless of whether the
/// caller reached it via ownership or a sharing grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMatchPlayer {
    /// Canonical participant row id.
    pub base_match_player_id: Uuid,
    /// Canonical match id.
    pub canonical_match_id: Uuid,
    /// Player profile behind the participant.
    pub player_id: Uuid,
    /// Team the participant plays on, if any.
    pub team_id: Option<Uuid>,
    /// Account owning the underlying match.
    pub owner_id: Uuid,
    /// Grant recipient when resolved through a share, otherwise null.
    pub shared_with_id: Option<Uuid>,
    /// Caller's effective permission on this participant row.
    pub permission: SharePermission,
}

/// Result of resolving a match reference for one caller.
#[derive(Debug, Clone)]
pub struct ResolvedMatch {
    /// The canonical match row.
    pub match_entity: MatchEntity,
    /// Caller's match-level permission.
    pub permission: SharePermission,
    /// One canonical view per participant, after filtering.
    pub players: Vec<CanonicalMatchPlayer>,
    /// The raw participant rows backing `players`, in the same order.
    pub match_players: Vec<MatchPlayerEntity>,
}

impl ResolvedMatch {
    /// Require match-level edit permission.
    pub fn require_edit(&self) -> Result<(), ServiceError> {
        if !self.permission.can_edit() {
            return Err(ServiceError::Unauthorized(format!(
                "match `{}` is shared read-only",
                self.match_entity.id
            )));
        }
        Ok(())
    }

    /// Require edit permission on every resolved participant row.
    ///
    /// This is the all-or-nothing check for team-scoped mutations: checked
    /// once over the full resolved set before any write begins.
    pub fn require_edit_all(&self) -> Result<(), ServiceError> {
        self.require_edit()?;
        for player in &self.players {
            if !player.permission.can_edit() {
                return Err(ServiceError::Unauthorized(format!(
                    "match player `{}` is shared read-only",
                    player.base_match_player_id
                )));
            }
        }
        Ok(())
    }

    /// Reject the operation when the match has already been completed.
    pub fn ensure_unfinished(&self) -> Result<(), ServiceError> {
        if self.match_entity.finished {
            return Err(ServiceError::InvalidState(format!(
                "match `{}` is already finished",
                self.match_entity.id
            )));
        }
        Ok(())
    }
}

/// Resolve a caller + match reference into canonical participant rows.
///
/// For an `original` reference the match must have been created by the
/// caller; for a `shared` reference a grant must exist for the caller. In
/// both failure cases the outcome is `NotFound`: holding no grant is
/// indistinguishable from the match not existing.
pub async fn resolve_canonical_match_players(
    state: &SharedState,
    caller_id: Uuid,
    match_ref: MatchRef,
    filter: PlayerFilter,
) -> Result<ResolvedMatch, ServiceError> {
    let store = state.store().await?;

    let Some(match_entity) = store.find_match(match_ref.id()).await? else {
        return Err(not_found(match_ref.id()));
    };

    let (permission, shared_with_id, mut row_permissions) = match match_ref {
        MatchRef::Original(_) => {
            if match_entity.created_by != caller_id {
                return Err(not_found(match_entity.id));
            }
            (SharePermission::Edit, None, HashMap::new())
        }
        MatchRef::Shared(_) => {
            let Some(grant) = store.find_shared_match(match_entity.id, caller_id).await? else {
                return Err(not_found(match_entity.id));
            };
            let overrides: HashMap<Uuid, SharePermission> = store
                .list_shared_match_players(grant.id)
                .await?
                .into_iter()
                .map(|row| (row.match_player_id, row.permission))
                .collect();
            (grant.permission, Some(grant.shared_with_id), overrides)
        }
    };

    let mut match_players = store.list_match_players(match_entity.id).await?;
    match filter {
        PlayerFilter::All => {}
        PlayerFilter::MatchPlayer(id) => {
            match_players.retain(|row| row.id == id);
            if match_players.is_empty() {
                return Err(ServiceError::NotFound(format!(
                    "match player `{id}` not found in match `{}`",
                    match_entity.id
                )));
            }
        }
        PlayerFilter::Team(team_id) => {
            let teams = store.list_teams(match_entity.id).await?;
            if !teams.iter().any(|team| team.id == team_id) {
                return Err(ServiceError::NotFound(format!(
                    "team `{team_id}` not found in match `{}`",
                    match_entity.id
                )));
            }
            match_players.retain(|row| row.team_id == Some(team_id));
            if match_players.is_empty() {
                return Err(ServiceError::NotFound(format!(
                    "team `{team_id}` has no members in match `{}`",
                    match_entity.id
                )));
            }
        }
    }

    let players = match_players
        .iter()
        .map(|row| CanonicalMatchPlayer {
            base_match_player_id: row.id,
            canonical_match_id: match_entity.id,
            player_id: row.player_id,
            team_id: row.team_id,
            owner_id: match_entity.created_by,
            shared_with_id,
            permission: row_permissions.remove(&row.id).unwrap_or(permission),
        })
        .collect::<Vec<_>>();

    debug!(
        match_id = %match_entity.id,
        caller = %caller_id,
        permission = ?permission,
        players = players.len(),
        "resolved canonical match players"
    );

    Ok(ResolvedMatch {
        match_entity,
        permission,
        players,
        match_players,
    })
}

fn not_found(match_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("match `{match_id}` not found"))
}
