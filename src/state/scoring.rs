//! Scoring engine: pure computation of final scores, winners, and
//! placements from a scoresheet configuration. No I/O, no clocks.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::dao::models::{RoundsScore, ScoresheetEntity, WinCondition};

/// One participant's input to winner and placement resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStanding {
    /// Participant identifier (match player id).
    pub id: Uuid,
    /// Team the participant plays on, if any.
    pub team_id: Option<Uuid>,
    /// Final score, or null when no data exists.
    pub final_score: Option<f64>,
}

/// Compute one participant's final score.
///
/// With [`RoundsScore::Aggregate`] the result is the sum of all round scores,
/// treating null rounds as 0. With [`RoundsScore::Manual`] the match-level
/// score entered by hand is authoritative and round scores are ignored. With
/// [`RoundsScore::None`] there is no score at all.
///
/// Non-finite values (NaN, ±infinity, used by some callers as a "no data
/// yet" sentinel) are normalized to 0 before use so they can never leak into
/// a final score.
pub fn final_score(
    round_scores: &[Option<f64>],
    manual_score: Option<f64>,
    scoresheet: &ScoresheetEntity,
) -> Option<f64> {
    match scoresheet.rounds_score {
        RoundsScore::Aggregate => Some(
            round_scores
                .iter()
                .map(|score| normalized(score.unwrap_or(0.0)))
                .sum(),
        ),
        RoundsScore::Manual => manual_score.map(normalized),
        RoundsScore::None => None,
    }
}

/// Resolve the set of winning participants.
///
/// Ties under highest/lowest produce multiple winners; target score may
/// produce none. [`WinCondition::Manual`] always yields an empty set: manual
/// winners are supplied by a human and persisted, never invented here.
///
/// Team members are aggregated to one score per team and win or lose
/// together. On a co-op sheet the whole table shares one outcome: everyone
/// wins or nobody does.
pub fn winners(players: &[PlayerStanding], scoresheet: &ScoresheetEntity) -> HashSet<Uuid> {
    if scoresheet.win_condition == WinCondition::Manual {
        return HashSet::new();
    }

    let candidates = candidates(players, scoresheet);

    if scoresheet.is_coop {
        // Only the target-score condition is reachable here; a co-op sheet
        // cannot rank its own participants against each other.
        let won = match scoresheet.win_condition {
            WinCondition::TargetScore => {
                let target = scoresheet.target_score.map(|t| t as f64);
                candidates
                    .iter()
                    .any(|candidate| candidate.score.is_some() && candidate.score == target)
            }
            _ => false,
        };
        return if won {
            players.iter().map(|player| player.id).collect()
        } else {
            HashSet::new()
        };
    }

    let winning_members = |keep: &dyn Fn(f64) -> bool| -> HashSet<Uuid> {
        candidates
            .iter()
            .filter(|candidate| candidate.score.is_some_and(keep))
            .flat_map(|candidate| candidate.member_ids.iter().copied())
            .collect()
    };

    match scoresheet.win_condition {
        WinCondition::HighestScore => match best_score(&candidates, f64::max) {
            Some(max) => winning_members(&|score| score == max),
            None => HashSet::new(),
        },
        WinCondition::LowestScore => match best_score(&candidates, f64::min) {
            Some(min) => winning_members(&|score| score == min),
            None => HashSet::new(),
        },
        WinCondition::TargetScore => match scoresheet.target_score {
            Some(target) => winning_members(&|score| score == target as f64),
            None => HashSet::new(),
        },
        WinCondition::Manual => HashSet::new(),
    }
}

/// Compute competition-style placements ("1, 1, 3" on a tie).
///
/// Ranked sheets order by the win condition's direction (highest descending,
/// lowest ascending, target by absolute distance to the target); teams share
/// their aggregated rank. Manual and co-op sheets place winners at 1 and
/// leave everyone else unplaced, as do participants without a score.
pub fn placements(
    players: &[PlayerStanding],
    scoresheet: &ScoresheetEntity,
    winners: &HashSet<Uuid>,
) -> HashMap<Uuid, u32> {
    if scoresheet.win_condition == WinCondition::Manual || scoresheet.is_coop {
        return winners.iter().map(|id| (*id, 1)).collect();
    }

    let candidates = candidates(players, scoresheet);
    let target = scoresheet.target_score.map(|t| t as f64).unwrap_or(0.0);

    let mut scored: Vec<(&Candidate, f64)> = candidates
        .iter()
        .filter_map(|candidate| candidate.score.map(|score| (candidate, score)))
        .collect();

    // Sort key ascending: lower is better for every condition.
    let key = |score: f64| -> f64 {
        match scoresheet.win_condition {
            WinCondition::HighestScore => -score,
            WinCondition::LowestScore => score,
            WinCondition::TargetScore => (score - target).abs(),
            WinCondition::Manual => 0.0,
        }
    };
    scored.sort_by(|a, b| key(a.1).total_cmp(&key(b.1)));

    let mut placed = HashMap::new();
    let mut rank = 0;
    let mut previous_key: Option<f64> = None;
    for (position, (candidate, score)) in scored.iter().enumerate() {
        let current_key = key(*score);
        if previous_key != Some(current_key) {
            rank = position as u32 + 1;
            previous_key = Some(current_key);
        }
        for member in &candidate.member_ids {
            placed.insert(*member, rank);
        }
    }
    placed
}

/// One scoring unit: a whole team, or a single participant without a team.
#[derive(Debug, Clone)]
struct Candidate {
    member_ids: Vec<Uuid>,
    score: Option<f64>,
}

/// Group participants into scoring units and aggregate team scores.
///
/// Under aggregate semantics a team's score is the sum of its members'
/// scores (null as 0, all-null stays null). Under manual semantics the
/// members share one hand-entered score, so the first non-null value wins.
fn candidates(players: &[PlayerStanding], scoresheet: &ScoresheetEntity) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut team_slots: HashMap<Uuid, usize> = HashMap::new();

    for player in players {
        let score = player.final_score.map(normalized);
        match player.team_id {
            None => candidates.push(Candidate {
                member_ids: vec![player.id],
                score,
            }),
            Some(team_id) => match team_slots.get(&team_id) {
                Some(&slot) => {
                    let candidate = &mut candidates[slot];
                    candidate.member_ids.push(player.id);
                    candidate.score = match scoresheet.rounds_score {
                        RoundsScore::Manual => candidate.score.or(score),
                        _ => match (candidate.score, score) {
                            (None, None) => None,
                            (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
                        },
                    };
                }
                None => {
                    team_slots.insert(team_id, candidates.len());
                    candidates.push(Candidate {
                        member_ids: vec![player.id],
                        score,
                    });
                }
            },
        }
    }

    candidates
}

fn best_score(candidates: &[Candidate], pick: fn(f64, f64) -> f64) -> Option<f64> {
    candidates
        .iter()
        .filter_map(|candidate| candidate.score)
        .reduce(pick)
}

fn normalized(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
