use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminated match reference: the same underlying match is addressable
/// by its owner (`original`) or by a sharing-grant recipient (`shared`).
///
/// A reference must never be interpreted without first passing through the
/// canonical resolver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum MatchRef {
    /// Addressed by the match creator.
    Original(Uuid),
    /// Addressed through a sharing grant on the canonical match.
    Shared(Uuid),
}

impl MatchRef {
    /// Canonical match id the reference carries.
    pub fn id(&self) -> Uuid {
        match self {
            MatchRef::Original(id) | MatchRef::Shared(id) => *id,
        }
    }
}

/// Target of a round-score mutation: one participant, or a whole team at
/// once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ScoreTarget {
    /// A single participant row.
    Player(Uuid),
    /// Every member of a team, updated as one atomic unit.
    Team(Uuid),
}
