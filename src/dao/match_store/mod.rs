//! Repository abstraction over the relational store.
//!
//! Every method is one storage round-trip and, for the batch mutation
//! methods, one transaction: backends must apply all rows of a batch or
//! none of them.

/// In-memory backend used by tests and storage-less embedders.
pub mod memory;

use futures::future::BoxFuture;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::{
    GameEntity, MatchEntity, MatchPlayerEntity, PlayerEntity, RoundEntity, RoundPlayerEntity,
    ScoresheetEntity, SharedGameEntity, SharedMatchEntity, SharedMatchPlayerEntity,
    SharedPlayerEntity, SharedScoresheetEntity, ShareRequestEntity, ShareRequestStatus, TeamEntity,
};
use crate::dao::storage::StorageResult;

/// New values for a match's timer columns, written as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerPatch {
    /// Whether the timer is running after the write.
    pub running: bool,
    /// Accumulated play time in seconds after the write.
    pub duration_secs: i64,
    /// Start of the current timer segment, or null when stopped.
    pub start_time: Option<OffsetDateTime>,
    /// When the timer last stopped, if known.
    pub end_time: Option<OffsetDateTime>,
    /// Whether the match is completed after the write.
    pub finished: bool,
}

/// One round-score cell update inside an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundScoreWrite {
    /// Row receiving the new score.
    pub round_player_id: Uuid,
    /// New score value; null clears the cell.
    pub score: Option<f64>,
}

/// Final result columns for one participant inside an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerResultWrite {
    /// Participant row receiving the result.
    pub match_player_id: Uuid,
    /// Final score to persist.
    pub score: Option<f64>,
    /// Whether the participant won.
    pub winner: bool,
    /// Rank within the match, when ranked.
    pub placement: Option<u32>,
}

/// Everything written when a match is completed: results plus final timer
/// state, applied as a single transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCompletion {
    /// Final timer columns (stops the clock, marks finished).
    pub timer: TimerPatch,
    /// Final result columns for every participant.
    pub results: Vec<PlayerResultWrite>,
}

/// Abstraction over the persistence layer for matches, scoring rows, and
/// sharing grants.
pub trait MatchStore: Send + Sync {
    /// Fetch a game by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Fetch a player profile by id.
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Fetch a scoresheet by id.
    fn find_scoresheet(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ScoresheetEntity>>>;
    /// Fetch a match by id.
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    /// List the rounds of a scoresheet ordered by their `order` column.
    fn list_rounds(
        &self,
        scoresheet_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>>;
    /// List the teams of a match.
    fn list_teams(&self, match_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    /// List every participant row of a match.
    fn list_match_players(
        &self,
        match_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchPlayerEntity>>>;
    /// List every per-round score row of a match.
    fn list_round_players(
        &self,
        match_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundPlayerEntity>>>;

    /// Upsert a game.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a player profile.
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a scoresheet.
    fn save_scoresheet(
        &self,
        scoresheet: ScoresheetEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a round.
    fn save_round(&self, round: RoundEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a match.
    fn save_match(&self, game_match: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a team.
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a participant row.
    fn save_match_player(
        &self,
        match_player: MatchPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a per-round score row.
    fn save_round_player(
        &self,
        round_player: RoundPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Overwrite a match's timer columns as one unit.
    fn write_timer(
        &self,
        match_id: Uuid,
        patch: TimerPatch,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Apply a batch of round-score updates atomically.
    fn set_round_scores(
        &self,
        writes: Vec<RoundScoreWrite>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Apply final result columns to participants of a match atomically.
    fn write_player_results(
        &self,
        match_id: Uuid,
        writes: Vec<PlayerResultWrite>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Complete a match: final results plus final timer state in one
    /// transaction.
    fn complete_match(
        &self,
        match_id: Uuid,
        completion: MatchCompletion,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Fetch the sharing grant for a match held by a specific account.
    fn find_shared_match(
        &self,
        match_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<SharedMatchEntity>>>;
    /// List the per-participant permission rows of a shared match.
    fn list_shared_match_players(
        &self,
        shared_match_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<SharedMatchPlayerEntity>>>;
    /// Upsert a match grant.
    fn save_shared_match(
        &self,
        shared: SharedMatchEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a per-participant permission row.
    fn save_shared_match_player(
        &self,
        shared: SharedMatchPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a game grant.
    fn save_shared_game(&self, shared: SharedGameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a player grant.
    fn save_shared_player(
        &self,
        shared: SharedPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Upsert a scoresheet grant.
    fn save_shared_scoresheet(
        &self,
        shared: SharedScoresheetEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a match grant; returns whether a grant existed.
    fn delete_shared_match(
        &self,
        match_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Delete a game grant; returns whether a grant existed.
    fn delete_shared_game(
        &self,
        game_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Delete a player grant; returns whether a grant existed.
    fn delete_shared_player(
        &self,
        player_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Delete a scoresheet grant; returns whether a grant existed.
    fn delete_shared_scoresheet(
        &self,
        scoresheet_id: Uuid,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Fetch a share request by id.
    fn find_share_request(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ShareRequestEntity>>>;
    /// List the share requests addressed to an account, newest first.
    fn list_share_requests_for(
        &self,
        shared_with_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ShareRequestEntity>>>;
    /// Insert a share request.
    fn save_share_request(
        &self,
        request: ShareRequestEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Update the lifecycle state of a share request.
    fn set_share_request_status(
        &self,
        id: Uuid,
        status: ShareRequestStatus,
    ) -> BoxFuture<'static, StorageResult<()>>;
}
