use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// How a scoresheet decides who won a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WinCondition {
    /// The highest final score wins; ties produce multiple winners.
    HighestScore,
    /// The lowest final score wins; ties produce multiple winners.
    LowestScore,
    /// Exactly hitting the scoresheet's target score wins.
    TargetScore,
    /// Winners are picked by a human and persisted as-is.
    Manual,
}

/// How per-round scores contribute to a player's final score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RoundsScore {
    /// Final score is the sum of all round scores (null rounds count as 0).
    Aggregate,
    /// The match-level score entered by hand is authoritative.
    Manual,
    /// Rounds carry no score at all; only legal with [`WinCondition::Manual`].
    None,
}

/// Kind of input a round accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RoundKind {
    /// Free numeric entry.
    Numeric,
    /// A checkbox awarding the round's fixed point value when checked.
    Checkbox,
}

/// Capability level granted by a sharing relationship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    /// Read-only access to the shared entity.
    View,
    /// Full mutation rights over the shared entity.
    Edit,
}

impl SharePermission {
    /// Whether this permission allows mutating the underlying record.
    pub fn can_edit(self) -> bool {
        matches!(self, SharePermission::Edit)
    }
}

/// Lifecycle of a share invitation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShareRequestStatus {
    /// Waiting for the recipient's answer.
    Pending,
    /// Accepted; the corresponding capability grant exists.
    Accepted,
    /// Rejected; no grant was created.
    Rejected,
}

/// Entity a share request or grant points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ShareTarget {
    /// A game owned by the sharer.
    Game(Uuid),
    /// A match owned by the sharer.
    Match(Uuid),
    /// A player profile owned by the sharer.
    Player(Uuid),
    /// A scoresheet template owned by the sharer.
    Scoresheet(Uuid),
}

/// A board game owned by a user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name of the game.
    pub name: String,
    /// Account that owns this game record.
    pub owner_id: Uuid,
    /// Creation timestamp for auditing/debugging.
    pub created_at: OffsetDateTime,
}

/// Scoring configuration attached to a game or snapshotted onto a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoresheetEntity {
    /// Primary key of the scoresheet.
    pub id: Uuid,
    /// Game this scoresheet belongs to.
    pub game_id: Uuid,
    /// Display name of the scoresheet.
    pub name: String,
    /// How winners are decided.
    pub win_condition: WinCondition,
    /// How round scores are folded into a final score.
    pub rounds_score: RoundsScore,
    /// Whether all participants share a single win/lose outcome.
    pub is_coop: bool,
    /// Target to hit exactly; only meaningful with [`WinCondition::TargetScore`].
    pub target_score: Option<i64>,
}

impl ScoresheetEntity {
    /// Check the structural invariants of the scoring configuration.
    ///
    /// A co-op sheet can only use manual or target-score win conditions, and
    /// every non-manual win condition needs round scores to work with.
    pub fn is_valid(&self) -> bool {
        if self.is_coop
            && !matches!(
                self.win_condition,
                WinCondition::Manual | WinCondition::TargetScore
            )
        {
            return false;
        }
        if self.win_condition != WinCondition::Manual && self.rounds_score == RoundsScore::None {
            return false;
        }
        if self.win_condition == WinCondition::TargetScore && self.target_score.is_none() {
            return false;
        }
        true
    }
}

/// One scoring round inside a scoresheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundEntity {
    /// Primary key of the round.
    pub id: Uuid,
    /// Scoresheet this round belongs to.
    pub scoresheet_id: Uuid,
    /// Input kind for this round.
    pub kind: RoundKind,
    /// Fixed point value awarded when a checkbox round is checked. Clients
    /// translate a checked box into this value (or null when unchecked)
    /// before submitting it as an ordinary round score; the scoring engine
    /// only ever sees numbers.
    pub score: Option<f64>,
    /// Position of the round within the scoresheet.
    pub order: u32,
}

/// A player profile owned by a user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: Uuid,
    /// Display name of the player.
    pub name: String,
    /// Account that owns this player record.
    pub owner_id: Uuid,
}

/// One recorded play of a game.
///
/// The scoresheet reference points at a snapshot copied from the game's
/// template when the match was created, so later template edits never change
/// how an old match was scored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// Game that was played.
    pub game_id: Uuid,
    /// Scoresheet snapshot used to score this match.
    pub scoresheet_id: Uuid,
    /// Display name of the play session.
    pub name: String,
    /// Account that created (and therefore owns) the match.
    pub created_by: Uuid,
    /// Accumulated play time in seconds.
    pub duration_secs: i64,
    /// Whether the timer is currently running.
    pub running: bool,
    /// When the current timer segment started; set exactly when `running`.
    pub start_time: Option<OffsetDateTime>,
    /// When the timer last stopped.
    pub end_time: Option<OffsetDateTime>,
    /// Whether the match has been completed; terminal.
    pub finished: bool,
    /// Creation timestamp for auditing/debugging.
    pub created_at: OffsetDateTime,
}

/// Optional grouping of match players within one match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamEntity {
    /// Primary key of the team.
    pub id: Uuid,
    /// Match this team belongs to.
    pub match_id: Uuid,
    /// Display name of the team.
    pub name: String,
}

/// One participant in one match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchPlayerEntity {
    /// Primary key of the participant row.
    pub id: Uuid,
    /// Match this participant belongs to.
    pub match_id: Uuid,
    /// Player profile behind this participant.
    pub player_id: Uuid,
    /// Team the participant plays on, if any.
    pub team_id: Option<Uuid>,
    /// Final score, computed or manually entered; null until known.
    pub score: Option<f64>,
    /// Rank within the match once finished; null until known or unranked.
    pub placement: Option<u32>,
    /// Whether this participant won the match.
    pub winner: bool,
}

/// Raw per-round score for one participant; the scoring engine's input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundPlayerEntity {
    /// Primary key of the row.
    pub id: Uuid,
    /// Participant this score belongs to.
    pub match_player_id: Uuid,
    /// Round this score was entered for.
    pub round_id: Uuid,
    /// Entered score; null while unset.
    pub score: Option<f64>,
}

/// Capability grant letting a non-owner address an owner's match.
///
/// Grants never duplicate gameplay data; they only reference the canonical
/// original rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharedMatchEntity {
    /// Primary key of the grant.
    pub id: Uuid,
    /// Account that owns the underlying match.
    pub owner_id: Uuid,
    /// Account the match was shared with.
    pub shared_with_id: Uuid,
    /// Canonical match being shared.
    pub match_id: Uuid,
    /// Capability level granted.
    pub permission: SharePermission,
    /// When the grant was created.
    pub created_at: OffsetDateTime,
}

/// Per-participant permission attached to a shared match.
///
/// Defaults to the match grant's permission when absent; present rows let an
/// owner narrow or widen access to individual participants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharedMatchPlayerEntity {
    /// Primary key of the row.
    pub id: Uuid,
    /// Shared match grant this row refines.
    pub shared_match_id: Uuid,
    /// Canonical participant row being shared.
    pub match_player_id: Uuid,
    /// Capability level for this participant.
    pub permission: SharePermission,
}

/// Capability grant over an owner's game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharedGameEntity {
    /// Primary key of the grant.
    pub id: Uuid,
    /// Account that owns the underlying game.
    pub owner_id: Uuid,
    /// Account the game was shared with.
    pub shared_with_id: Uuid,
    /// Canonical game being shared.
    pub game_id: Uuid,
    /// Recipient's own game the shared one is mapped onto, if any.
    pub linked_game_id: Option<Uuid>,
    /// Capability level granted.
    pub permission: SharePermission,
    /// When the grant was created.
    pub created_at: OffsetDateTime,
}

/// Capability grant over an owner's player profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharedPlayerEntity {
    /// Primary key of the grant.
    pub id: Uuid,
    /// Account that owns the underlying player.
    pub owner_id: Uuid,
    /// Account the player was shared with.
    pub shared_with_id: Uuid,
    /// Canonical player being shared.
    pub player_id: Uuid,
    /// Capability level granted.
    pub permission: SharePermission,
    /// When the grant was created.
    pub created_at: OffsetDateTime,
}

/// Capability grant over an owner's scoresheet template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharedScoresheetEntity {
    /// Primary key of the grant.
    pub id: Uuid,
    /// Account that owns the underlying scoresheet.
    pub owner_id: Uuid,
    /// Account the scoresheet was shared with.
    pub shared_with_id: Uuid,
    /// Canonical scoresheet being shared.
    pub scoresheet_id: Uuid,
    /// Capability level granted.
    pub permission: SharePermission,
    /// When the grant was created.
    pub created_at: OffsetDateTime,
}

/// Pending/answered invitation to create a capability grant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShareRequestEntity {
    /// Primary key of the request.
    pub id: Uuid,
    /// Account offering the share.
    pub owner_id: Uuid,
    /// Account invited to accept the share.
    pub shared_with_id: Uuid,
    /// Entity being offered.
    pub target: ShareTarget,
    /// Capability level offered.
    pub permission: SharePermission,
    /// Current lifecycle state of the invitation.
    pub status: ShareRequestStatus,
    /// Bundle parent when this request is part of a game+children share.
    pub parent_request_id: Option<Uuid>,
    /// When the request was created.
    pub created_at: OffsetDateTime,
}
