//! Match mutation service: every operation resolves the caller's canonical
//! view first, checks permission over the full resolved set, then performs
//! one atomic store write.

use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        match_store::{MatchCompletion, MatchStore, PlayerResultWrite, RoundScoreWrite},
        models::{ScoresheetEntity, WinCondition},
    },
    dto::{
        common::{MatchRef, ScoreTarget},
        match_ops::{ManualWinnersRequest, MatchOutcome, PlayerResultSummary, RoundScoreRequest},
    },
    error::ServiceError,
    services::resolver::{self, PlayerFilter, ResolvedMatch},
    state::{
        SharedState,
        scoring::{self, PlayerStanding},
        timer::{MatchTimer, TimerError},
    },
};

/// Start (or restart) a match timer.
pub async fn timer_start(
    state: &SharedState,
    match_ref: MatchRef,
    caller_id: Uuid,
) -> Result<(), ServiceError> {
    let resolved = resolve_all(state, caller_id, match_ref).await?;
    resolved.require_edit()?;

    let match_id = resolved.match_entity.id;
    let timer =
        MatchTimer::from_entity(&resolved.match_entity).map_err(|err| timer_failure(match_id, err))?;
    let patch = timer
        .start(OffsetDateTime::now_utc())
        .map_err(|err| timer_failure(match_id, err))?;

    let store = state.store().await?;
    store.write_timer(match_id, patch).await?;
    info!(match_id = %match_id, "match timer started");
    Ok(())
}

/// Pause a running match timer, folding the elapsed segment into the stored
/// duration.
pub async fn timer_pause(
    state: &SharedState,
    match_ref: MatchRef,
    caller_id: Uuid,
) -> Result<(), ServiceError> {
    let resolved = resolve_all(state, caller_id, match_ref).await?;
    resolved.require_edit()?;

    let match_id = resolved.match_entity.id;
    let timer =
        MatchTimer::from_entity(&resolved.match_entity).map_err(|err| timer_failure(match_id, err))?;
    let patch = timer
        .pause(OffsetDateTime::now_utc())
        .map_err(|err| timer_failure(match_id, err))?;

    let store = state.store().await?;
    let duration_secs = patch.duration_secs;
    store.write_timer(match_id, patch).await?;
    info!(match_id = %match_id, duration_secs, "match timer paused");
    Ok(())
}

/// Reset a match timer: stop the clock and discard accumulated duration.
pub async fn timer_reset(
    state: &SharedState,
    match_ref: MatchRef,
    caller_id: Uuid,
) -> Result<(), ServiceError> {
    let resolved = resolve_all(state, caller_id, match_ref).await?;
    resolved.require_edit()?;

    let match_id = resolved.match_entity.id;
    let timer =
        MatchTimer::from_entity(&resolved.match_entity).map_err(|err| timer_failure(match_id, err))?;
    let patch = timer.reset().map_err(|err| timer_failure(match_id, err))?;

    let store = state.store().await?;
    store.write_timer(match_id, patch).await?;
    info!(match_id = %match_id, "match timer reset");
    Ok(())
}

/// Write one round score for a participant or a whole team.
///
/// A team target resolves every member and requires edit permission on all
/// of them before any row is written; mixed grants reject the whole call
/// with zero rows changed.
///
/// The permission gate and the batch write are separate store calls: a grant
/// revoked between the two still lands the write. Concurrent revocation is
/// last-writer-wins, like timer toggles.
pub async fn update_round_score(
    state: &SharedState,
    match_ref: MatchRef,
    request: RoundScoreRequest,
    caller_id: Uuid,
) -> Result<(), ServiceError> {
    request.validate()?;

    let filter = match request.target {
        ScoreTarget::Player(id) => PlayerFilter::MatchPlayer(id),
        ScoreTarget::Team(id) => PlayerFilter::Team(id),
    };
    let resolved =
        resolver::resolve_canonical_match_players(state, caller_id, match_ref, filter).await?;
    resolved.ensure_unfinished()?;
    resolved.require_edit_all()?;

    let match_id = resolved.match_entity.id;
    let store = state.store().await?;

    let rounds = store.list_rounds(resolved.match_entity.scoresheet_id).await?;
    if !rounds.iter().any(|round| round.id == request.round_id) {
        return Err(ServiceError::NotFound(format!(
            "round `{}` not found in match `{match_id}`",
            request.round_id
        )));
    }

    let round_players = store.list_round_players(match_id).await?;
    let mut writes = Vec::with_capacity(resolved.players.len());
    for player in &resolved.players {
        let row = round_players
            .iter()
            .find(|row| {
                row.match_player_id == player.base_match_player_id
                    && row.round_id == request.round_id
            })
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no round score row for match player `{}` in round `{}`",
                    player.base_match_player_id, request.round_id
                ))
            })?;
        writes.push(RoundScoreWrite {
            round_player_id: row.id,
            score: request.score,
        });
    }

    let rows = writes.len();
    store.set_round_scores(writes).await?;
    info!(
        match_id = %match_id,
        round_id = %request.round_id,
        rows,
        "round score updated"
    );
    Ok(())
}

/// Persist manually selected winners.
///
/// Only legal when the scoresheet uses [`WinCondition::Manual`]; every listed
/// participant is marked winner, everyone else is cleared, and final scores
/// are computed and persisted alongside.
pub async fn submit_manual_winners(
    state: &SharedState,
    match_ref: MatchRef,
    request: ManualWinnersRequest,
    caller_id: Uuid,
) -> Result<(), ServiceError> {
    let resolved = resolve_all(state, caller_id, match_ref).await?;
    resolved.ensure_unfinished()?;
    resolved.require_edit_all()?;

    let match_id = resolved.match_entity.id;
    let store = state.store().await?;
    let scoresheet = load_scoresheet(store.as_ref(), &resolved).await?;

    if scoresheet.win_condition != WinCondition::Manual {
        return Err(ServiceError::InvalidState(format!(
            "match `{match_id}` does not use the manual win condition"
        )));
    }

    for winner_id in &request.winners {
        if !resolved
            .players
            .iter()
            .any(|player| player.base_match_player_id == *winner_id)
        {
            return Err(ServiceError::NotFound(format!(
                "match player `{winner_id}` not found in match `{match_id}`"
            )));
        }
    }

    let rounds_by_player = round_scores_by_player(store.as_ref(), match_id).await?;
    let writes: Vec<PlayerResultWrite> = resolved
        .match_players
        .iter()
        .map(|row| {
            let won = request.winners.contains(&row.id);
            let round_scores = rounds_by_player.get(&row.id).map_or(&[][..], Vec::as_slice);
            PlayerResultWrite {
                match_player_id: row.id,
                score: scoring::final_score(round_scores, row.score, &scoresheet).or(row.score),
                winner: won,
                placement: won.then_some(1),
            }
        })
        .collect();

    store.write_player_results(match_id, writes).await?;
    info!(
        match_id = %match_id,
        winners = request.winners.len(),
        "manual winners submitted"
    );
    Ok(())
}

/// Complete a match: compute final scores, winners, and placements, stop the
/// timer, and mark the match finished. Terminal; later mutations fail.
pub async fn finish_match(
    state: &SharedState,
    match_ref: MatchRef,
    caller_id: Uuid,
) -> Result<MatchOutcome, ServiceError> {
    let resolved = resolve_all(state, caller_id, match_ref).await?;
    resolved.ensure_unfinished()?;
    resolved.require_edit_all()?;

    let match_id = resolved.match_entity.id;
    let store = state.store().await?;
    let scoresheet = load_scoresheet(store.as_ref(), &resolved).await?;
    let rounds_by_player = round_scores_by_player(store.as_ref(), match_id).await?;

    let standings: Vec<PlayerStanding> = resolved
        .match_players
        .iter()
        .map(|row| {
            let round_scores = rounds_by_player.get(&row.id).map_or(&[][..], Vec::as_slice);
            PlayerStanding {
                id: row.id,
                team_id: row.team_id,
                final_score: scoring::final_score(round_scores, row.score, &scoresheet)
                    .or(row.score),
            }
        })
        .collect();

    // Manual winners were persisted ahead of time by submit_manual_winners;
    // the engine never invents them.
    let winner_set = if scoresheet.win_condition == WinCondition::Manual {
        resolved
            .match_players
            .iter()
            .filter(|row| row.winner)
            .map(|row| row.id)
            .collect()
    } else {
        scoring::winners(&standings, &scoresheet)
    };
    let placed = scoring::placements(&standings, &scoresheet, &winner_set);

    let timer =
        MatchTimer::from_entity(&resolved.match_entity).map_err(|err| timer_failure(match_id, err))?;
    let patch = timer
        .finish(OffsetDateTime::now_utc())
        .map_err(|err| timer_failure(match_id, err))?;
    let duration_secs = patch.duration_secs;

    let results: Vec<PlayerResultWrite> = standings
        .iter()
        .map(|standing| PlayerResultWrite {
            match_player_id: standing.id,
            score: standing.final_score,
            winner: winner_set.contains(&standing.id),
            placement: placed.get(&standing.id).copied(),
        })
        .collect();

    store
        .complete_match(
            match_id,
            MatchCompletion {
                timer: patch,
                results: results.clone(),
            },
        )
        .await?;

    let mut winners: Vec<Uuid> = winner_set.into_iter().collect();
    winners.sort();
    info!(
        match_id = %match_id,
        winners = winners.len(),
        duration_secs,
        "match finished"
    );

    Ok(MatchOutcome {
        results: results
            .into_iter()
            .map(|write| PlayerResultSummary {
                match_player_id: write.match_player_id,
                score: write.score,
                winner: write.winner,
                placement: write.placement,
            })
            .collect(),
        winners,
        duration_secs,
    })
}

async fn resolve_all(
    state: &SharedState,
    caller_id: Uuid,
    match_ref: MatchRef,
) -> Result<ResolvedMatch, ServiceError> {
    resolver::resolve_canonical_match_players(state, caller_id, match_ref, PlayerFilter::All).await
}

async fn load_scoresheet(
    store: &dyn MatchStore,
    resolved: &ResolvedMatch,
) -> Result<ScoresheetEntity, ServiceError> {
    store
        .find_scoresheet(resolved.match_entity.scoresheet_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "scoresheet `{}` not found for match `{}`",
                resolved.match_entity.scoresheet_id, resolved.match_entity.id
            ))
        })
}

async fn round_scores_by_player(
    store: &dyn MatchStore,
    match_id: Uuid,
) -> Result<HashMap<Uuid, Vec<Option<f64>>>, ServiceError> {
    let mut by_player: HashMap<Uuid, Vec<Option<f64>>> = HashMap::new();
    for row in store.list_round_players(match_id).await? {
        by_player.entry(row.match_player_id).or_default().push(row.score);
    }
    Ok(by_player)
}

fn timer_failure(match_id: Uuid, err: TimerError) -> ServiceError {
    if matches!(err, TimerError::MissingStartTime | TimerError::NotRunning) {
        error!(match_id = %match_id, error = %err, "match timer state is inconsistent");
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::dao::models::{RoundsScore, SharePermission};
    use crate::services::testing::{Fixture, FixtureSpec, fixture};

    fn solo_spec(win_condition: WinCondition) -> FixtureSpec {
        FixtureSpec {
            win_condition,
            rounds_score: RoundsScore::Aggregate,
            is_coop: false,
            target_score: None,
            round_count: 2,
            teams: vec![None, None, None],
        }
    }

    fn score_request(fx: &Fixture, target: ScoreTarget, round: usize, score: f64) -> RoundScoreRequest {
        RoundScoreRequest {
            target,
            round_id: fx.rounds[round].id,
            score: Some(score),
        }
    }

    #[tokio::test]
    async fn timer_start_then_pause_round_trips_through_the_store() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        let match_ref = MatchRef::Original(fx.match_id);

        timer_start(&fx.state, match_ref, fx.owner).await.unwrap();
        let entity = fx.match_entity().await;
        assert!(entity.running);
        assert!(entity.start_time.is_some());
        assert!(!entity.finished);

        timer_pause(&fx.state, match_ref, fx.owner).await.unwrap();
        let entity = fx.match_entity().await;
        assert!(!entity.running);
        assert_eq!(entity.start_time, None);
        assert!(entity.end_time.is_some());
        assert!(entity.duration_secs >= 0);
    }

    #[tokio::test]
    async fn pause_without_start_surfaces_an_internal_error() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        let match_ref = MatchRef::Original(fx.match_id);

        let err = timer_pause(&fx.state, match_ref, fx.owner).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));

        timer_start(&fx.state, match_ref, fx.owner).await.unwrap();
        timer_pause(&fx.state, match_ref, fx.owner).await.unwrap();
        let err = timer_pause(&fx.state, match_ref, fx.owner).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn timer_reset_discards_accumulated_duration() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        let match_ref = MatchRef::Original(fx.match_id);

        timer_start(&fx.state, match_ref, fx.owner).await.unwrap();
        timer_reset(&fx.state, match_ref, fx.owner).await.unwrap();
        let entity = fx.match_entity().await;
        assert!(!entity.running);
        assert_eq!(entity.duration_secs, 0);
        assert_eq!(entity.start_time, None);
    }

    #[tokio::test]
    async fn view_only_share_cannot_drive_the_timer() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        fx.share_match(SharePermission::View).await;

        let err = timer_start(&fx.state, MatchRef::Shared(fx.match_id), fx.guest)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        assert!(!fx.match_entity().await.running);
    }

    #[tokio::test]
    async fn view_only_share_cannot_update_round_scores() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        let target = fx.players[0].id;
        fx.seed_round_score(target, fx.rounds[0].id, Some(3.0)).await;
        fx.share_match(SharePermission::View).await;

        let err = update_round_score(
            &fx.state,
            MatchRef::Shared(fx.match_id),
            score_request(&fx, ScoreTarget::Player(target), 0, 9.0),
            fx.guest,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        // The failed call must not have touched the row.
        let row = fx.round_player(target, fx.rounds[0].id).await;
        assert_eq!(row.score, Some(3.0));
    }

    #[tokio::test]
    async fn mixed_team_grants_reject_the_whole_update() {
        let fx = fixture(FixtureSpec {
            win_condition: WinCondition::HighestScore,
            rounds_score: RoundsScore::Aggregate,
            is_coop: false,
            target_score: None,
            round_count: 1,
            teams: vec![Some(0), Some(0), Some(0)],
        })
        .await;
        let team_id = fx.teams[0].id;
        fx.share_match(SharePermission::Edit).await;
        fx.set_player_grant(fx.players[2].id, SharePermission::View)
            .await;

        let err = update_round_score(
            &fx.state,
            MatchRef::Shared(fx.match_id),
            score_request(&fx, ScoreTarget::Team(team_id), 0, 5.0),
            fx.guest,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        // Zero rows changed, including the two editable ones.
        for player in &fx.players {
            let row = fx.round_player(player.id, fx.rounds[0].id).await;
            assert_eq!(row.score, None);
        }
    }

    #[tokio::test]
    async fn team_update_writes_every_member() {
        let fx = fixture(FixtureSpec {
            win_condition: WinCondition::HighestScore,
            rounds_score: RoundsScore::Aggregate,
            is_coop: false,
            target_score: None,
            round_count: 1,
            teams: vec![Some(0), Some(0), None],
        })
        .await;
        let team_id = fx.teams[0].id;

        update_round_score(
            &fx.state,
            MatchRef::Original(fx.match_id),
            score_request(&fx, ScoreTarget::Team(team_id), 0, 4.0),
            fx.owner,
        )
        .await
        .unwrap();

        for player in &fx.players[..2] {
            let row = fx.round_player(player.id, fx.rounds[0].id).await;
            assert_eq!(row.score, Some(4.0));
        }
        let solo = fx.round_player(fx.players[2].id, fx.rounds[0].id).await;
        assert_eq!(solo.score, None);
    }

    #[tokio::test]
    async fn checkbox_rounds_arrive_as_plain_scores() {
        use crate::dao::models::{RoundEntity, RoundKind, RoundPlayerEntity};

        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;

        // A checkbox round carries a fixed point value; clients submit that
        // value (checked) or null (unchecked) as an ordinary round score.
        let checkbox = RoundEntity {
            id: Uuid::new_v4(),
            scoresheet_id: fx.scoresheet_id,
            kind: RoundKind::Checkbox,
            score: Some(3.0),
            order: 2,
        };
        fx.store.save_round(checkbox.clone()).await.unwrap();
        for player in &fx.players {
            fx.store
                .save_round_player(RoundPlayerEntity {
                    id: Uuid::new_v4(),
                    match_player_id: player.id,
                    round_id: checkbox.id,
                    score: None,
                })
                .await
                .unwrap();
        }

        update_round_score(
            &fx.state,
            MatchRef::Original(fx.match_id),
            RoundScoreRequest {
                target: ScoreTarget::Player(fx.players[0].id),
                round_id: checkbox.id,
                score: checkbox.score,
            },
            fx.owner,
        )
        .await
        .unwrap();

        let row = fx.round_player(fx.players[0].id, checkbox.id).await;
        assert_eq!(row.score, Some(3.0));
    }

    #[tokio::test]
    async fn unknown_round_is_not_found() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        let request = RoundScoreRequest {
            target: ScoreTarget::Player(fx.players[0].id),
            round_id: Uuid::new_v4(),
            score: Some(1.0),
        };
        let err = update_round_score(&fx.state, MatchRef::Original(fx.match_id), request, fx.owner)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn non_finite_score_is_rejected_at_the_boundary() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        let request = RoundScoreRequest {
            target: ScoreTarget::Player(fx.players[0].id),
            round_id: fx.rounds[0].id,
            score: Some(f64::INFINITY),
        };
        let err = update_round_score(&fx.state, MatchRef::Original(fx.match_id), request, fx.owner)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn finish_resolves_tied_highest_scores_as_joint_winners() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        let [a, b, c] = [fx.players[0].id, fx.players[1].id, fx.players[2].id];
        fx.seed_round_score(a, fx.rounds[0].id, Some(6.0)).await;
        fx.seed_round_score(a, fx.rounds[1].id, Some(4.0)).await;
        fx.seed_round_score(b, fx.rounds[0].id, Some(7.0)).await;
        fx.seed_round_score(b, fx.rounds[1].id, Some(3.0)).await;
        fx.seed_round_score(c, fx.rounds[0].id, Some(3.0)).await;
        // c's second round stays null and counts as 0.

        let outcome = finish_match(&fx.state, MatchRef::Original(fx.match_id), fx.owner)
            .await
            .unwrap();

        let winners: HashSet<Uuid> = outcome.winners.iter().copied().collect();
        assert_eq!(winners, HashSet::from([a, b]));

        let entity = fx.match_entity().await;
        assert!(entity.finished);
        assert!(!entity.running);

        assert_eq!(fx.match_player(a).await.score, Some(10.0));
        assert_eq!(fx.match_player(a).await.placement, Some(1));
        assert_eq!(fx.match_player(b).await.placement, Some(1));
        let third = fx.match_player(c).await;
        assert_eq!(third.score, Some(3.0));
        assert_eq!(third.placement, Some(3));
        assert!(!third.winner);
    }

    #[tokio::test]
    async fn finish_coop_target_marks_the_whole_table() {
        let fx = fixture(FixtureSpec {
            win_condition: WinCondition::TargetScore,
            rounds_score: RoundsScore::Aggregate,
            is_coop: true,
            target_score: Some(15),
            round_count: 1,
            teams: vec![Some(0), Some(0)],
        })
        .await;
        fx.seed_round_score(fx.players[0].id, fx.rounds[0].id, Some(8.0))
            .await;
        fx.seed_round_score(fx.players[1].id, fx.rounds[0].id, Some(7.0))
            .await;

        let outcome = finish_match(&fx.state, MatchRef::Original(fx.match_id), fx.owner)
            .await
            .unwrap();
        assert_eq!(outcome.winners.len(), 2);
        for player in &fx.players {
            assert!(fx.match_player(player.id).await.winner);
        }
    }

    #[tokio::test]
    async fn coop_target_miss_marks_nobody() {
        let fx = fixture(FixtureSpec {
            win_condition: WinCondition::TargetScore,
            rounds_score: RoundsScore::Aggregate,
            is_coop: true,
            target_score: Some(15),
            round_count: 1,
            teams: vec![Some(0), Some(0)],
        })
        .await;
        fx.seed_round_score(fx.players[0].id, fx.rounds[0].id, Some(8.0))
            .await;
        fx.seed_round_score(fx.players[1].id, fx.rounds[0].id, Some(8.0))
            .await;

        let outcome = finish_match(&fx.state, MatchRef::Original(fx.match_id), fx.owner)
            .await
            .unwrap();
        assert!(outcome.winners.is_empty());
        for player in &fx.players {
            assert!(!fx.match_player(player.id).await.winner);
        }
    }

    #[tokio::test]
    async fn finished_match_rejects_further_mutation() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        finish_match(&fx.state, MatchRef::Original(fx.match_id), fx.owner)
            .await
            .unwrap();

        let err = update_round_score(
            &fx.state,
            MatchRef::Original(fx.match_id),
            score_request(&fx, ScoreTarget::Player(fx.players[0].id), 0, 2.0),
            fx.owner,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let err = finish_match(&fx.state, MatchRef::Original(fx.match_id), fx.owner)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    fn manual_spec() -> FixtureSpec {
        FixtureSpec {
            win_condition: WinCondition::Manual,
            rounds_score: RoundsScore::None,
            is_coop: false,
            target_score: None,
            round_count: 0,
            teams: vec![None, None],
        }
    }

    #[tokio::test]
    async fn manual_winners_only_apply_to_manual_scoresheets() {
        let fx = fixture(solo_spec(WinCondition::HighestScore)).await;
        let err = submit_manual_winners(
            &fx.state,
            MatchRef::Original(fx.match_id),
            ManualWinnersRequest {
                winners: vec![fx.players[0].id],
            },
            fx.owner,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn manual_winners_are_persisted_and_survive_completion() {
        let fx = fixture(manual_spec()).await;
        let [winner, loser] = [fx.players[0].id, fx.players[1].id];

        submit_manual_winners(
            &fx.state,
            MatchRef::Original(fx.match_id),
            ManualWinnersRequest {
                winners: vec![winner],
            },
            fx.owner,
        )
        .await
        .unwrap();

        assert!(fx.match_player(winner).await.winner);
        assert_eq!(fx.match_player(winner).await.placement, Some(1));
        assert!(!fx.match_player(loser).await.winner);

        let outcome = finish_match(&fx.state, MatchRef::Original(fx.match_id), fx.owner)
            .await
            .unwrap();
        assert_eq!(outcome.winners, vec![winner]);
        assert!(fx.match_player(winner).await.winner);
        assert!(!fx.match_player(loser).await.winner);
    }

    #[tokio::test]
    async fn manual_winner_must_be_a_participant() {
        let fx = fixture(manual_spec()).await;
        let err = submit_manual_winners(
            &fx.state,
            MatchRef::Original(fx.match_id),
            ManualWinnersRequest {
                winners: vec![Uuid::new_v4()],
            },
            fx.owner,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn shared_edit_grant_can_finish_the_match() {
        let fx = fixture(solo_spec(WinCondition::LowestScore)).await;
        // Every player needs a score: an unseeded player would aggregate to 0
        // and steal the lowest-score win.
        fx.seed_round_score(fx.players[0].id, fx.rounds[0].id, Some(2.0))
            .await;
        fx.seed_round_score(fx.players[1].id, fx.rounds[0].id, Some(5.0))
            .await;
        fx.seed_round_score(fx.players[2].id, fx.rounds[0].id, Some(9.0))
            .await;
        fx.share_match(SharePermission::Edit).await;

        let outcome = finish_match(&fx.state, MatchRef::Shared(fx.match_id), fx.guest)
            .await
            .unwrap();
        assert_eq!(outcome.winners, vec![fx.players[0].id]);
        assert!(fx.match_entity().await.finished);
    }
}
