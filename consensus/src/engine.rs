//! The per-process consensus state machine.
//!
//! The engine holds the current proposal value, the round counter, and the
//! decided flag, and applies one completed round's tally at a time. All
//! I/O (broadcasting, the collection window, vote delivery) lives in the
//! node runtime; this module only computes transitions.
//!
//! The engine is deterministic given its inputs except for the
//! no-majority branch of the decision rule, which draws fresh randomness
//! through the caller-supplied generator.

use {
    crate::{
        decision::{self, Decision},
        types::{BinaryValue, ProcessId, Vote},
    },
    log::*,
    rand::Rng,
};

/// Result of completing one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Whether the process has decided.
    pub decided: bool,
    /// The value adopted for the next round, or the decision.
    pub value: BinaryValue,
    /// The round counter after the transition.
    pub round: u64,
}

/// State machine for one correct process.
///
/// Faulty processes never construct an engine; their protocol fields are
/// absent, not zeroed.
#[derive(Debug)]
pub struct ConsensusEngine {
    id: ProcessId,
    cluster_size: u32,
    value: BinaryValue,
    round: u64,
    decided: bool,
}

impl ConsensusEngine {
    /// Create an engine at round 0 with the given initial proposal.
    pub fn new(id: ProcessId, cluster_size: u32, initial_value: BinaryValue) -> Self {
        Self {
            id,
            cluster_size,
            value: initial_value,
            round: 0,
            decided: false,
        }
    }

    /// The broadcast payload for the current round.
    pub fn current_vote(&self) -> Vote {
        Vote::new(self.value, self.round)
    }

    /// Apply a completed round's received votes.
    ///
    /// The local proposal is tallied alongside the received votes, so under
    /// the synchrony assumption every correct process evaluates the same
    /// multiset. Adopts the rule's next value, then either latches the
    /// decision or advances the round counter by exactly one.
    pub fn complete_round<R: Rng + ?Sized>(
        &mut self,
        received: &[BinaryValue],
        rng: &mut R,
    ) -> RoundOutcome {
        if self.decided {
            warn!("process {}: complete_round called after decision", self.id);
            return self.outcome();
        }

        let mut tally = Vec::with_capacity(received.len() + 1);
        tally.extend_from_slice(received);
        tally.push(self.value);

        let Decision {
            next_value,
            decided,
        } = decision::decide(&tally, self.cluster_size, rng);

        self.value = next_value;
        if decided {
            self.decided = true;
            info!(
                "process {}: decided value {} in round {}",
                self.id, self.value, self.round
            );
        } else {
            debug!(
                "process {}: no majority in round {} ({} votes tallied), advancing",
                self.id,
                self.round,
                tally.len()
            );
            self.round += 1;
        }
        self.outcome()
    }

    // -- Accessors --

    /// Returns this process's id.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Returns the cluster size N.
    pub fn cluster_size(&self) -> u32 {
        self.cluster_size
    }

    /// Returns the current proposal value.
    pub fn value(&self) -> BinaryValue {
        self.value
    }

    /// Returns the current round counter.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Whether the process has decided. Once true, never reverts.
    pub fn is_decided(&self) -> bool {
        self.decided
    }

    fn outcome(&self) -> RoundOutcome {
        RoundOutcome {
            decided: self.decided,
            value: self.value,
            round: self.round,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rand::{rngs::StdRng, SeedableRng},
    };

    #[test]
    fn test_current_vote_carries_value_and_round() {
        let engine = ConsensusEngine::new(0, 3, BinaryValue::One);
        assert_eq!(engine.current_vote(), Vote::new(BinaryValue::One, 0));
    }

    #[test]
    fn test_local_value_counts_toward_majority() {
        // One peer vote alone misses floor(3/2) + 1 = 2; with the local
        // proposal included the engine decides.
        let mut rng = StdRng::seed_from_u64(1);
        let mut engine = ConsensusEngine::new(0, 3, BinaryValue::One);
        let outcome = engine.complete_round(&[BinaryValue::One], &mut rng);
        assert!(outcome.decided);
        assert_eq!(outcome.value, BinaryValue::One);
        assert_eq!(outcome.round, 0);
    }

    #[test]
    fn test_majority_decides_and_stays_in_round() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut engine = ConsensusEngine::new(1, 3, BinaryValue::Zero);
        let outcome = engine.complete_round(&[BinaryValue::One, BinaryValue::One], &mut rng);
        assert!(outcome.decided);
        assert_eq!(outcome.value, BinaryValue::One);
        assert_eq!(engine.round(), 0);
        assert!(engine.is_decided());
    }

    #[test]
    fn test_no_majority_advances_round_by_exactly_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut engine = ConsensusEngine::new(0, 5, BinaryValue::Zero);
        let outcome = engine.complete_round(&[BinaryValue::One], &mut rng);
        assert!(!outcome.decided);
        assert_eq!(outcome.round, 1);
        assert_eq!(engine.round(), 1);
    }

    #[test]
    fn test_round_is_monotonic_across_failed_rounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut engine = ConsensusEngine::new(0, 5, BinaryValue::Zero);
        let mut last_round = engine.round();
        for _ in 0..10 {
            let outcome = engine.complete_round(&[BinaryValue::One], &mut rng);
            assert!(!outcome.decided);
            assert_eq!(outcome.round, last_round + 1);
            last_round = outcome.round;
        }
    }

    #[test]
    fn test_decision_latches() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut engine = ConsensusEngine::new(0, 3, BinaryValue::One);
        engine.complete_round(&[BinaryValue::One, BinaryValue::One], &mut rng);
        assert!(engine.is_decided());
        let value = engine.value();
        let round = engine.round();

        // Further round work is refused without mutating anything.
        let outcome = engine.complete_round(&[BinaryValue::Zero, BinaryValue::Zero], &mut rng);
        assert!(outcome.decided);
        assert_eq!(outcome.value, value);
        assert_eq!(outcome.round, round);
        assert_eq!(engine.value(), value);
    }

    #[test]
    fn test_no_majority_adopts_random_value() {
        // With a split tally the adopted value is a coin flip; both sides
        // must show up over repeated fresh engines.
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen_zero = false;
        let mut seen_one = false;
        for _ in 0..100 {
            let mut engine = ConsensusEngine::new(0, 5, BinaryValue::Zero);
            let outcome = engine.complete_round(&[BinaryValue::One], &mut rng);
            match outcome.value {
                BinaryValue::Zero => seen_zero = true,
                BinaryValue::One => seen_one = true,
            }
        }
        assert!(seen_zero && seen_one);
    }
}
