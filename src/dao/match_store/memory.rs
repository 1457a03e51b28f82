//! In-memory [`MatchStore`] backend.
//!
//! The whole table set sits behind a single `RwLock`, so every trait method
//! is one critical section and batch mutations are naturally atomic: each
//! batch validates every target row before touching any of them.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::match_store::{
    MatchCompletion, MatchStore, PlayerResultWrite, RoundScoreWrite, TimerPatch,
};
use crate::dao::models::{
    GameEntity, MatchEntity, MatchPlayerEntity, PlayerEntity, RoundEntity, RoundPlayerEntity,
    ScoresheetEntity, SharedGameEntity, SharedMatchEntity, SharedMatchPlayerEntity,
    SharedPlayerEntity, SharedScoresheetEntity, ShareRequestEntity, ShareRequestStatus, TeamEntity,
};
use crate::dao::storage::{StorageError, StorageResult};

#[derive(Debug, Default)]
struct Tables {
    games: HashMap<Uuid, GameEntity>,
    players: HashMap<Uuid, PlayerEntity>,
    scoresheets: HashMap<Uuid, ScoresheetEntity>,
    rounds: HashMap<Uuid, RoundEntity>,
    matches: HashMap<Uuid, MatchEntity>,
    teams: HashMap<Uuid, TeamEntity>,
    match_players: HashMap<Uuid, MatchPlayerEntity>,
    round_players: HashMap<Uuid, RoundPlayerEntity>,
    // Grants are keyed by (canonical id, recipient) since an owner can share
    // the same entity with several accounts.
    shared_matches: HashMap<(Uuid, Uuid), SharedMatchEntity>,
    shared_match_players: HashMap<Uuid, SharedMatchPlayerEntity>,
    shared_games: HashMap<(Uuid, Uuid), SharedGameEntity>,
    shared_players: HashMap<(Uuid, Uuid), SharedPlayerEntity>,
    shared_scoresheets: HashMap<(Uuid, Uuid), SharedScoresheetEntity>,
    share_requests: HashMap<Uuid, ShareRequestEntity>,
}

impl Tables {
    fn apply_player_results(
        &mut self,
        match_id: Uuid,
        writes: &[PlayerResultWrite],
    ) -> StorageResult<()> {
        for write in writes {
            match self.match_players.get(&write.match_player_id) {
                Some(row) if row.match_id == match_id => {}
                _ => {
                    return Err(StorageError::missing_row(format!(
                        "match player `{}` in match `{match_id}`",
                        write.match_player_id
                    )));
                }
            }
        }
        for write in writes {
            if let Some(row) = self.match_players.get_mut(&write.match_player_id) {
                row.score = write.score;
                row.winner = write.winner;
                row.placement = write.placement;
            }
        }
        Ok(())
    }

    fn apply_timer(&mut self, match_id: Uuid, patch: &TimerPatch) -> StorageResult<()> {
        let Some(row) = self.matches.get_mut(&match_id) else {
            return Err(StorageError::missing_row(format!("match `{match_id}`")));
        };
        row.running = patch.running;
        row.duration_secs = patch.duration_secs;
        row.start_time = patch.start_time;
        row.end_time = patch.end_time;
        row.finished = patch.finished;
        Ok(())
    }
}

/// In-memory store backend, cheap to clone and safe to share across tasks.
#[derive(Clone, Default)]
pub struct MemoryMatchStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryMatchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchStore for MemoryMatchStore {
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.games.get(&id).cloned()) })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.players.get(&id).cloned()) })
    }

    fn find_scoresheet(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ScoresheetEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.scoresheets.get(&id).cloned()) })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.matches.get(&id).cloned()) })
    }

    fn list_rounds(
        &self,
        scoresheet_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            let mut rounds: Vec<RoundEntity> = guard
                .rounds
                .values()
                .filter(|round| round.scoresheet_id == scoresheet_id)
                .cloned()
                .collect();
            rounds.sort_by_key(|round| round.order);
            Ok(rounds)
        })
    }

    fn list_teams(&self, match_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            Ok(guard
                .teams
                .values()
                .filter(|team| team.match_id == match_id)
                .cloned()
                .collect())
        })
    }

    fn list_match_players(
        &self,
        match_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchPlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            let mut rows: Vec<MatchPlayerEntity> = guard
                .match_players
                .values()
                .filter(|row| row.match_id == match_id)
                .cloned()
                .collect();
            rows.sort_by_key(|row| row.id);
            Ok(rows)
        })
    }

    fn list_round_players(
        &self,
        match_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundPlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            let member_ids: Vec<Uuid> = guard
                .match_players
                .values()
                .filter(|row| row.match_id == match_id)
                .map(|row| row.id)
                .collect();
            Ok(guard
                .round_players
                .values()
                .filter(|row| member_ids.contains(&row.match_player_id))
                .cloned()
                .collect())
        })
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.games.insert(game.id, game);
            Ok(())
        })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.players.insert(player.id, player);
            Ok(())
        })
    }

    fn save_scoresheet(
        &self,
        scoresheet: ScoresheetEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .scoresheets
                .insert(scoresheet.id, scoresheet);
            Ok(())
        })
    }

    fn save_round(&self, round: RoundEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.rounds.insert(round.id, round);
            Ok(())
        })
    }

    fn save_match(&self, game_match: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.matches.insert(game_match.id, game_match);
            Ok(())
        })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.teams.insert(team.id, team);
            Ok(())
        })
    }

    fn save_match_player(
        &self,
        match_player: MatchPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .match_players
                .insert(match_player.id, match_player);
            Ok(())
        })
    }

    fn save_round_player(
        &self,
        round_player: RoundPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .round_players
                .insert(round_player.id, round_player);
            Ok(())
        })
    }

    fn write_timer(
        &self,
        match_id: Uuid,
        patch: TimerPatch,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move { tables.write().await.apply_timer(match_id, &patch) })
    }

    fn set_round_scores(
        &self,
        writes: Vec<RoundScoreWrite>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            for write in &writes {
                if !guard.round_players.contains_key(&write.round_player_id) {
                    return Err(StorageError::missing_row(format!(
                        "round player `{}`",
                        write.round_player_id
                    )));
                }
            }
            for write in writes {
                if let Some(row) = guard.round_players.get_mut(&write.round_player_id) {
                    row.score = write.score;
                }
            }
            Ok(())
        })
    }

    fn write_player_results(
        &self,
        match_id: Uuid,
        writes: Vec<PlayerResultWrite>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            guard.apply_player_results(match_id, &writes)
        })
    }

    fn complete_match(
        &self,
        match_id: Uuid,
        completion: MatchCompletion,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            if !guard.matches.contains_key(&match_id) {
                return Err(StorageError::missing_row(format!("match `{match_id}`")));
            }
            guard.apply_player_results(match_id, &completion.results)?;
            guard.apply_timer(match_id, &completion.timer)
        })
    }

    fn find_shared_match(
        &self,
        match_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<SharedMatchEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .shared_matches
                .get(&(match_id, shared_with_id))
                .cloned())
        })
    }

    fn list_shared_match_players(
        &self,
        shared_match_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<SharedMatchPlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            Ok(guard
                .shared_match_players
                .values()
                .filter(|row| row.shared_match_id == shared_match_id)
                .cloned()
                .collect())
        })
    }

    fn save_shared_match(
        &self,
        shared: SharedMatchEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .shared_matches
                .insert((shared.match_id, shared.shared_with_id), shared);
            Ok(())
        })
    }

    fn save_shared_match_player(
        &self,
        shared: SharedMatchPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .shared_match_players
                .insert(shared.id, shared);
            Ok(())
        })
    }

    fn save_shared_game(&self, shared: SharedGameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .shared_games
                .insert((shared.game_id, shared.shared_with_id), shared);
            Ok(())
        })
    }

    fn save_shared_player(
        &self,
        shared: SharedPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .shared_players
                .insert((shared.player_id, shared.shared_with_id), shared);
            Ok(())
        })
    }

    fn save_shared_scoresheet(
        &self,
        shared: SharedScoresheetEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .shared_scoresheets
                .insert((shared.scoresheet_id, shared.shared_with_id), shared);
            Ok(())
        })
    }

    fn delete_shared_match(
        &self,
        match_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let removed = guard.shared_matches.remove(&(match_id, shared_with_id));
            if let Some(grant) = &removed {
                let grant_id = grant.id;
                guard
                    .shared_match_players
                    .retain(|_, row| row.shared_match_id != grant_id);
            }
            Ok(removed.is_some())
        })
    }

    fn delete_shared_game(
        &self,
        game_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .write()
                .await
                .shared_games
                .remove(&(game_id, shared_with_id))
                .is_some())
        })
    }

    fn delete_shared_player(
        &self,
        player_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .write()
                .await
                .shared_players
                .remove(&(player_id, shared_with_id))
                .is_some())
        })
    }

    fn delete_shared_scoresheet(
        &self,
        scoresheet_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .write()
                .await
                .shared_scoresheets
                .remove(&(scoresheet_id, shared_with_id))
                .is_some())
        })
    }

    fn find_share_request(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ShareRequestEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.share_requests.get(&id).cloned()) })
    }

    fn list_share_requests_for(
        &self,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ShareRequestEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            let mut requests: Vec<ShareRequestEntity> = guard
                .share_requests
                .values()
                .filter(|request| request.shared_with_id == shared_with_id)
                .cloned()
                .collect();
            requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(requests)
        })
    }

    fn save_share_request(
        &self,
        request: ShareRequestEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .share_requests
                .insert(request.id, request);
            Ok(())
        })
    }

    fn set_share_request_status(
        &self,
        id: Uuid,
        status: ShareRequestStatus,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let Some(request) = guard.share_requests.get_mut(&id) else {
                return Err(StorageError::missing_row(format!("share request `{id}`")));
            };
            request.status = status;
            Ok(())
        })
    }
}
