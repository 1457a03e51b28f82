//! Match timer state machine.
//!
//! The timer has no in-process state of its own: it is rebuilt from the
//! persisted `running` / `start_time` / `duration` columns on every request,
//! and each transition produces a [`TimerPatch`] the caller writes back in
//! one storage transaction.

use thiserror::Error;
use time::OffsetDateTime;

use crate::dao::match_store::TimerPatch;
use crate::dao::models::MatchEntity;

/// Lifecycle phase of a match timer, derived from stored columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// Never started: not running, no start time, zero accumulated duration.
    Idle,
    /// Actively counting since `started_at`.
    Running {
        /// Start of the current timer segment.
        started_at: OffsetDateTime,
    },
    /// Stopped with accumulated duration; can be started again.
    Paused,
    /// Match is completed; terminal.
    Finished,
}

/// Error returned when a timer transition cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Stored state says running but carries no start time. A violated
    /// invariant: surfaced as an internal error, never silently repaired.
    #[error("match is marked running but has no start time")]
    MissingStartTime,
    /// Pause was requested while the timer is not running.
    #[error("cannot pause a match whose timer is not running")]
    NotRunning,
    /// The match is finished; its timer can no longer change.
    #[error("match is already finished")]
    Finished,
}

/// Timer state machine rebuilt from a match's persisted columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchTimer {
    phase: TimerPhase,
    duration_secs: i64,
}

impl MatchTimer {
    /// Derive the timer state from stored match columns.
    ///
    /// Fails with [`TimerError::MissingStartTime`] when the row claims to be
    /// running without a start time.
    pub fn from_entity(entity: &MatchEntity) -> Result<Self, TimerError> {
        let phase = if entity.finished {
            TimerPhase::Finished
        } else if entity.running {
            match entity.start_time {
                Some(started_at) => TimerPhase::Running { started_at },
                None => return Err(TimerError::MissingStartTime),
            }
        } else if entity.duration_secs > 0 {
            TimerPhase::Paused
        } else {
            TimerPhase::Idle
        };

        Ok(Self {
            phase,
            duration_secs: entity.duration_secs,
        })
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Accumulated duration in seconds, excluding any open segment.
    pub fn duration_secs(&self) -> i64 {
        self.duration_secs
    }

    /// Start (or restart) the timer.
    ///
    /// Valid from idle and paused. Starting an already-running timer
    /// overwrites the segment start with `now`; concurrent toggles from
    /// several devices resolve last-writer-wins.
    pub fn start(&self, now: OffsetDateTime) -> Result<TimerPatch, TimerError> {
        if self.phase == TimerPhase::Finished {
            return Err(TimerError::Finished);
        }

        Ok(TimerPatch {
            running: true,
            duration_secs: self.duration_secs,
            start_time: Some(now),
            end_time: None,
            finished: false,
        })
    }

    /// Stop the running timer, folding the elapsed segment into the duration.
    pub fn pause(&self, now: OffsetDateTime) -> Result<TimerPatch, TimerError> {
        let started_at = match self.phase {
            TimerPhase::Running { started_at } => started_at,
            TimerPhase::Finished => return Err(TimerError::Finished),
            TimerPhase::Idle | TimerPhase::Paused => return Err(TimerError::NotRunning),
        };

        let elapsed_secs = (now - started_at).whole_seconds().max(0);

        Ok(TimerPatch {
            running: false,
            duration_secs: self.duration_secs + elapsed_secs,
            start_time: None,
            end_time: Some(now),
            finished: false,
        })
    }

    /// Discard accumulated duration and stop the timer.
    pub fn reset(&self) -> Result<TimerPatch, TimerError> {
        if self.phase == TimerPhase::Finished {
            return Err(TimerError::Finished);
        }

        Ok(TimerPatch {
            running: false,
            duration_secs: 0,
            start_time: None,
            end_time: None,
            finished: false,
        })
    }

    /// Final timer columns for match completion: close any open segment at
    /// `now`, stop the clock, and mark the match finished.
    pub fn finish(&self, now: OffsetDateTime) -> Result<TimerPatch, TimerError> {
        let duration_secs = match self.phase {
            TimerPhase::Running { started_at } => {
                self.duration_secs + (now - started_at).whole_seconds().max(0)
            }
            TimerPhase::Finished => return Err(TimerError::Finished),
            TimerPhase::Idle | TimerPhase::Paused => self.duration_secs,
        };

        Ok(TimerPatch {
            running: false,
            duration_secs,
            start_time: None,
            end_time: Some(now),
            finished: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn match_entity(
        running: bool,
        start_time: Option<OffsetDateTime>,
        duration_secs: i64,
        finished: bool,
    ) -> MatchEntity {
        MatchEntity {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            scoresheet_id: Uuid::new_v4(),
            name: "friday night".into(),
            created_by: Uuid::new_v4(),
            duration_secs,
            running,
            start_time,
            end_time: None,
            finished,
            created_at: ts(0),
        }
    }

    fn ts(secs: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000 + secs).unwrap()
    }

    #[test]
    fn idle_start_then_pause_accumulates_elapsed_seconds() {
        let timer = MatchTimer::from_entity(&match_entity(false, None, 0, false)).unwrap();
        assert_eq!(timer.phase(), TimerPhase::Idle);

        let started = timer.start(ts(0)).unwrap();
        assert!(started.running);
        assert_eq!(started.start_time, Some(ts(0)));
        assert_eq!(started.duration_secs, 0);

        let running = MatchTimer::from_entity(&match_entity(true, Some(ts(0)), 0, false)).unwrap();
        let paused = running.pause(ts(10)).unwrap();
        assert!(!paused.running);
        assert_eq!(paused.duration_secs, 10);
        assert_eq!(paused.start_time, None);
        assert_eq!(paused.end_time, Some(ts(10)));
    }

    #[test]
    fn pause_without_start_is_rejected() {
        let timer = MatchTimer::from_entity(&match_entity(false, None, 10, false)).unwrap();
        assert_eq!(timer.phase(), TimerPhase::Paused);
        assert_eq!(timer.pause(ts(20)).unwrap_err(), TimerError::NotRunning);
    }

    #[test]
    fn running_without_start_time_violates_the_invariant() {
        let err = MatchTimer::from_entity(&match_entity(true, None, 0, false)).unwrap_err();
        assert_eq!(err, TimerError::MissingStartTime);
    }

    #[test]
    fn restart_from_paused_keeps_accumulated_duration() {
        let timer = MatchTimer::from_entity(&match_entity(false, None, 42, false)).unwrap();
        let restarted = timer.start(ts(100)).unwrap();
        assert_eq!(restarted.duration_secs, 42);
        assert_eq!(restarted.start_time, Some(ts(100)));
    }

    #[test]
    fn start_while_running_moves_the_segment_start() {
        let timer = MatchTimer::from_entity(&match_entity(true, Some(ts(0)), 5, false)).unwrap();
        let restarted = timer.start(ts(30)).unwrap();
        assert_eq!(restarted.start_time, Some(ts(30)));
        assert_eq!(restarted.duration_secs, 5);
    }

    #[test]
    fn reset_discards_duration_from_any_unfinished_phase() {
        let paused = MatchTimer::from_entity(&match_entity(false, None, 99, false)).unwrap();
        let patch = paused.reset().unwrap();
        assert_eq!(patch.duration_secs, 0);
        assert!(!patch.running);
        assert_eq!(patch.start_time, None);

        let running = MatchTimer::from_entity(&match_entity(true, Some(ts(0)), 3, false)).unwrap();
        assert_eq!(running.reset().unwrap().duration_secs, 0);
    }

    #[test]
    fn finished_matches_reject_every_transition() {
        let timer = MatchTimer::from_entity(&match_entity(false, None, 60, true)).unwrap();
        assert_eq!(timer.phase(), TimerPhase::Finished);
        assert_eq!(timer.start(ts(0)).unwrap_err(), TimerError::Finished);
        assert_eq!(timer.pause(ts(0)).unwrap_err(), TimerError::Finished);
        assert_eq!(timer.reset().unwrap_err(), TimerError::Finished);
        assert_eq!(timer.finish(ts(0)).unwrap_err(), TimerError::Finished);
    }

    #[test]
    fn finish_closes_an_open_segment() {
        let running = MatchTimer::from_entity(&match_entity(true, Some(ts(0)), 30, false)).unwrap();
        let patch = running.finish(ts(15)).unwrap();
        assert!(patch.finished);
        assert!(!patch.running);
        assert_eq!(patch.duration_secs, 45);
        assert_eq!(patch.end_time, Some(ts(15)));
    }

    #[test]
    fn finish_from_paused_keeps_the_stored_duration() {
        let paused = MatchTimer::from_entity(&match_entity(false, None, 30, false)).unwrap();
        let patch = paused.finish(ts(500)).unwrap();
        assert!(patch.finished);
        assert_eq!(patch.duration_secs, 30);
    }

    #[test]
    fn backwards_clock_never_subtracts_duration() {
        let running = MatchTimer::from_entity(&match_entity(true, Some(ts(50)), 7, false)).unwrap();
        let patch = running.pause(ts(40)).unwrap();
        assert_eq!(patch.duration_secs, 7);
    }
}
