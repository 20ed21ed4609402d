//! Round state and buzz arbitration
//!
//! The authoritative in-memory record of lock status and buzz order for
//! the current round. Callers apply every mutation while holding the
//! session lock, so arrival order is the order in which `attempt_buzz`
//! runs: there is always a single well-defined winner, and wall-clock
//! timestamps never break ties.

use chrono::{DateTime, Utc};

use crate::error::SessionError;

/// One accepted buzz. Immutable once recorded.
#[derive(Debug, Clone)]
pub struct BuzzEntry {
    pub team_name: String,
    /// 0-based rank assigned at acceptance time; 0 is the winner.
    pub order_index: usize,
    /// Wall-clock arrival time, display only.
    pub buzzed_at: DateTime<Utc>,
}

/// Lock status and buzz order for the current round.
///
/// A round spans from one `reset` to the next; within it a team may
/// buzz at most once.
#[derive(Debug)]
pub struct RoundState {
    locked: bool,
    buzz_order: Vec<BuzzEntry>,
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundState {
    /// Rounds start locked; the admin unlocks before the first question.
    pub fn new() -> Self {
        Self {
            locked: true,
            buzz_order: Vec::new(),
        }
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Accepted buzzes in arrival order (index 0 won).
    pub fn entries(&self) -> &[BuzzEntry] {
        &self.buzz_order
    }

    pub fn buzz_count(&self) -> usize {
        self.buzz_order.len()
    }

    pub fn has_buzzed(&self, team: &str) -> bool {
        self.buzz_order.iter().any(|e| e.team_name == team)
    }

    /// Idempotent.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Idempotent.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Clear the buzz order and re-lock. The admin must explicitly
    /// unlock again before the next question.
    pub fn reset(&mut self) {
        self.locked = true;
        self.buzz_order.clear();
    }

    /// Record a buzz for `team`, returning its order index.
    ///
    /// Rejected attempts leave the round untouched. This is the only
    /// path that grows the buzz order.
    pub fn attempt_buzz(&mut self, team: &str) -> Result<usize, SessionError> {
        if self.locked {
            return Err(SessionError::BuzzLocked);
        }
        if self.has_buzzed(team) {
            return Err(SessionError::AlreadyBuzzed {
                team: team.to_string(),
            });
        }

        let order_index = self.buzz_order.len();
        self.buzz_order.push(BuzzEntry {
            team_name: team.to_string(),
            order_index,
            buzzed_at: Utc::now(),
        });
        Ok(order_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_start_locked() {
        let mut round = RoundState::new();
        assert!(round.locked());
        assert_eq!(
            round.attempt_buzz("Alpha"),
            Err(SessionError::BuzzLocked)
        );
        assert_eq!(round.buzz_count(), 0);
    }

    #[test]
    fn test_order_indices_follow_application_order() {
        let mut round = RoundState::new();
        round.unlock();

        for (i, team) in ["Alpha", "Beta", "Gamma", "Delta"].iter().enumerate() {
            assert_eq!(round.attempt_buzz(team), Ok(i));
        }

        let indices: Vec<usize> = round.entries().iter().map(|e| e.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(round.entries()[0].team_name, "Alpha");
    }

    #[test]
    fn test_locked_rejects_regardless_of_history() {
        let mut round = RoundState::new();
        round.unlock();
        round.attempt_buzz("Alpha").unwrap();
        round.lock();

        assert_eq!(round.attempt_buzz("Beta"), Err(SessionError::BuzzLocked));
        assert_eq!(
            round.attempt_buzz("Alpha"),
            Err(SessionError::BuzzLocked)
        );
        assert_eq!(round.buzz_count(), 1);
    }

    #[test]
    fn test_team_cannot_buzz_twice_until_reset() {
        let mut round = RoundState::new();
        round.unlock();

        assert_eq!(round.attempt_buzz("Alpha"), Ok(0));
        assert_eq!(
            round.attempt_buzz("Alpha"),
            Err(SessionError::AlreadyBuzzed {
                team: "Alpha".to_string()
            })
        );
        assert_eq!(round.buzz_count(), 1);

        round.reset();
        round.unlock();
        assert_eq!(round.attempt_buzz("Alpha"), Ok(0));
    }

    #[test]
    fn test_reset_relocks_and_clears() {
        let mut round = RoundState::new();
        round.unlock();
        round.attempt_buzz("Alpha").unwrap();
        round.attempt_buzz("Beta").unwrap();

        round.reset();
        assert!(round.locked());
        assert_eq!(round.buzz_count(), 0);

        // Reset from an already-locked, empty round is a no-op too.
        round.reset();
        assert!(round.locked());
        assert_eq!(round.buzz_count(), 0);
    }

    #[test]
    fn test_lock_unlock_idempotent() {
        let mut round = RoundState::new();
        round.lock();
        round.lock();
        assert!(round.locked());
        round.unlock();
        round.unlock();
        assert!(!round.locked());
    }
}
