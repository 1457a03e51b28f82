//! Sharing grant lifecycle: invitations, answers, and revocation.
//!
//! A share is never created directly; the owner sends a request and the
//! grant only comes into existence when the recipient accepts. Revocation
//! deletes the grant and immediately cuts off shared addressing.

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        match_store::MatchStore,
        models::{
            SharedGameEntity, SharedMatchEntity, SharedPlayerEntity, SharedScoresheetEntity,
            ShareRequestEntity, ShareRequestStatus, ShareTarget,
        },
    },
    dto::share::{CreateShareRequest, ShareAnswer, ShareRequestSummary},
    error::ServiceError,
    state::SharedState,
};

/// Create a share invitation for an entity the caller owns.
///
/// The offered permission falls back to the configured default when absent.
pub async fn create_share_request(
    state: &SharedState,
    request: CreateShareRequest,
    caller_id: Uuid,
) -> Result<ShareRequestSummary, ServiceError> {
    if request.shared_with_id == caller_id {
        return Err(ServiceError::InvalidInput(
            "cannot share an entity with its own owner".into(),
        ));
    }

    let store = state.store().await?;
    verify_target_ownership(store.as_ref(), caller_id, request.target).await?;

    if let Some(parent_id) = request.parent_request_id {
        let Some(parent) = store.find_share_request(parent_id).await? else {
            return Err(ServiceError::NotFound(format!(
                "share request `{parent_id}` not found"
            )));
        };
        if parent.owner_id != caller_id || parent.shared_with_id != request.shared_with_id {
            return Err(ServiceError::InvalidInput(
                "parent request must belong to the same owner and recipient".into(),
            ));
        }
        if !matches!(parent.target, ShareTarget::Game(_)) {
            return Err(ServiceError::InvalidInput(
                "only game shares can parent other share requests".into(),
            ));
        }
    }

    let entity = ShareRequestEntity {
        id: Uuid::new_v4(),
        owner_id: caller_id,
        shared_with_id: request.shared_with_id,
        target: request.target,
        permission: request
            .permission
            .unwrap_or_else(|| state.config().default_share_permission()),
        status: ShareRequestStatus::Pending,
        parent_request_id: request.parent_request_id,
        created_at: OffsetDateTime::now_utc(),
    };
    store.save_share_request(entity.clone()).await?;
    info!(
        request_id = %entity.id,
        owner = %entity.owner_id,
        recipient = %entity.shared_with_id,
        target = ?entity.target,
        "share request created"
    );
    Ok(entity.into())
}

/// Answer a pending share invitation.
///
/// Only the recipient may answer, and only once. Accepting creates the
/// capability grant; rejecting leaves no trace beyond the request status.
/// A child request (part of a game bundle) can only be accepted after its
/// parent game share was accepted.
pub async fn respond_to_share_request(
    state: &SharedState,
    request_id: Uuid,
    answer: ShareAnswer,
    caller_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.store().await?;

    let Some(request) = store.find_share_request(request_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "share request `{request_id}` not found"
        )));
    };
    if request.shared_with_id != caller_id {
        return Err(ServiceError::Unauthorized(format!(
            "only the recipient may answer share request `{request_id}`"
        )));
    }
    if request.status != ShareRequestStatus::Pending {
        return Err(ServiceError::InvalidState(format!(
            "share request `{request_id}` was already answered"
        )));
    }

    match answer {
        ShareAnswer::Reject => {
            store
                .set_share_request_status(request.id, ShareRequestStatus::Rejected)
                .await?;
            info!(request_id = %request.id, "share request rejected");
            Ok(())
        }
        ShareAnswer::Accept { linked_game_id } => {
            if let Some(parent_id) = request.parent_request_id {
                let parent = store.find_share_request(parent_id).await?;
                if parent.is_none_or(|p| p.status != ShareRequestStatus::Accepted) {
                    return Err(ServiceError::InvalidState(format!(
                        "parent request `{parent_id}` must be accepted first"
                    )));
                }
            }

            let now = OffsetDateTime::now_utc();
            match request.target {
                ShareTarget::Game(game_id) => {
                    store
                        .save_shared_game(SharedGameEntity {
                            id: Uuid::new_v4(),
                            owner_id: request.owner_id,
                            shared_with_id: request.shared_with_id,
                            game_id,
                            linked_game_id,
                            permission: request.permission,
                            created_at: now,
                        })
                        .await?;
                }
                ShareTarget::Match(match_id) => {
                    store
                        .save_shared_match(SharedMatchEntity {
                            id: Uuid::new_v4(),
                            owner_id: request.owner_id,
                            shared_with_id: request.shared_with_id,
                            match_id,
                            permission: request.permission,
                            created_at: now,
                        })
                        .await?;
                }
                ShareTarget::Player(player_id) => {
                    store
                        .save_shared_player(SharedPlayerEntity {
                            id: Uuid::new_v4(),
                            owner_id: request.owner_id,
                            shared_with_id: request.shared_with_id,
                            player_id,
                            permission: request.permission,
                            created_at: now,
                        })
                        .await?;
                }
                ShareTarget::Scoresheet(scoresheet_id) => {
                    store
                        .save_shared_scoresheet(SharedScoresheetEntity {
                            id: Uuid::new_v4(),
                            owner_id: request.owner_id,
                            shared_with_id: request.shared_with_id,
                            scoresheet_id,
                            permission: request.permission,
                            created_at: now,
                        })
                        .await?;
                }
            }
            store
                .set_share_request_status(request.id, ShareRequestStatus::Accepted)
                .await?;
            info!(
                request_id = %request.id,
                target = ?request.target,
                permission = ?request.permission,
                "share request accepted"
            );
            Ok(())
        }
    }
}

/// Revoke an existing grant over an entity the caller owns.
pub async fn revoke_share(
    state: &SharedState,
    target: ShareTarget,
    shared_with_id: Uuid,
    caller_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.store().await?;
    verify_target_ownership(store.as_ref(), caller_id, target).await?;

    let deleted = match target {
        ShareTarget::Game(id) => store.delete_shared_game(id, shared_with_id).await?,
        ShareTarget::Match(id) => store.delete_shared_match(id, shared_with_id).await?,
        ShareTarget::Player(id) => store.delete_shared_player(id, shared_with_id).await?,
        ShareTarget::Scoresheet(id) => store.delete_shared_scoresheet(id, shared_with_id).await?,
    };
    if !deleted {
        return Err(ServiceError::NotFound(format!(
            "no grant over {target:?} held by `{shared_with_id}`"
        )));
    }
    info!(target = ?target, recipient = %shared_with_id, "share revoked");
    Ok(())
}

/// List the share invitations addressed to the caller, newest first.
pub async fn list_incoming_requests(
    state: &SharedState,
    caller_id: Uuid,
) -> Result<Vec<ShareRequestSummary>, ServiceError> {
    let store = state.store().await?;
    let requests = store.list_share_requests_for(caller_id).await?;
    Ok(requests.into_iter().map(Into::into).collect())
}

/// Check that the caller owns the entity a request or revocation points at.
///
/// A non-owned or missing entity is reported as `NotFound` in both cases so
/// probing for other accounts' ids reveals nothing.
async fn verify_target_ownership(
    store: &dyn MatchStore,
    caller_id: Uuid,
    target: ShareTarget,
) -> Result<(), ServiceError> {
    let owned = match target {
        ShareTarget::Game(id) => store
            .find_game(id)
            .await?
            .is_some_and(|game| game.owner_id == caller_id),
        ShareTarget::Match(id) => store
            .find_match(id)
            .await?
            .is_some_and(|game_match| game_match.created_by == caller_id),
        ShareTarget::Player(id) => store
            .find_player(id)
            .await?
            .is_some_and(|player| player.owner_id == caller_id),
        ShareTarget::Scoresheet(id) => match store.find_scoresheet(id).await? {
            Some(scoresheet) => store
                .find_game(scoresheet.game_id)
                .await?
                .is_some_and(|game| game.owner_id == caller_id),
            None => false,
        },
    };
    if !owned {
        return Err(ServiceError::NotFound(format!("{target:?} not found")));
    }
    Ok(())
}
