use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::dto::{common::ScoreTarget, validation::validate_finite_score};

/// Payload for writing one round-score cell, for a player or a whole team.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundScoreRequest {
    /// Participant or team receiving the score.
    pub target: ScoreTarget,
    /// Round the score belongs to.
    pub round_id: Uuid,
    /// New score; null clears the cell.
    #[serde(default)]
    pub score: Option<f64>,
}

impl Validate for RoundScoreRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(score) = self.score {
            if let Err(e) = validate_finite_score(score) {
                errors.add("score", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload selecting the winners of a manually decided match.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualWinnersRequest {
    /// Participant rows to mark as winners; everyone else is cleared.
    pub winners: Vec<Uuid>,
}

/// Final result columns for one participant, as returned by completion.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlayerResultSummary {
    /// Participant row the result belongs to.
    pub match_player_id: Uuid,
    /// Final computed or manually entered score.
    pub score: Option<f64>,
    /// Whether the participant won.
    pub winner: bool,
    /// Rank within the match, when ranked.
    pub placement: Option<u32>,
}

/// Outcome of completing a match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    /// Final result per participant.
    pub results: Vec<PlayerResultSummary>,
    /// Participant rows marked as winners.
    pub winners: Vec<Uuid>,
    /// Final accumulated duration in seconds.
    pub duration_secs: i64,
}
