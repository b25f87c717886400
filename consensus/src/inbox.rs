//! Round-scoped vote buffer shared between the delivery path and the
//! round driver.
//!
//! Votes are only accepted for the round the inbox is currently tuned to.
//! `reset` and `drain` are the two privileged operations of the round
//! driver; the interior mutex makes them mutually exclusive with concurrent
//! `accept` calls, so a vote arriving at a round boundary lands wholly in
//! the old or the new round, never split, lost, or duplicated.

use {
    crate::types::{BinaryValue, DeliveryOutcome, Vote},
    std::sync::Mutex,
};

#[derive(Debug)]
struct InboxState {
    round: u64,
    votes: Vec<BinaryValue>,
}

/// Thread-safe buffer of votes accepted for the current round.
#[derive(Debug)]
pub struct RoundInbox {
    state: Mutex<InboxState>,
}

impl Default for RoundInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundInbox {
    /// Create an inbox tuned to round 0 with no votes.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InboxState {
                round: 0,
                votes: Vec::new(),
            }),
        }
    }

    /// Accept a vote iff it is tagged with the current round.
    pub fn accept(&self, vote: &Vote) -> DeliveryOutcome {
        let mut state = self.state.lock().unwrap();
        if vote.round != state.round {
            return DeliveryOutcome::InvalidRound {
                current: state.round,
                got: vote.round,
            };
        }
        state.votes.push(vote.value);
        DeliveryOutcome::Accepted
    }

    /// Begin a new round with an empty buffer.
    ///
    /// Old-round votes are discarded, never merged forward. Resetting to
    /// the round already in progress keeps the buffer: votes that arrived
    /// early for that round were attributed to it at delivery time.
    pub fn reset(&self, round: u64) {
        let mut state = self.state.lock().unwrap();
        if state.round != round {
            state.round = round;
            state.votes.clear();
        }
    }

    /// Return and clear every vote accepted for the current round.
    pub fn drain(&self) -> Vec<BinaryValue> {
        let mut state = self.state.lock().unwrap();
        std::mem::take(&mut state.votes)
    }

    /// The round the inbox is currently accepting votes for.
    pub fn current_round(&self) -> u64 {
        self.state.lock().unwrap().round
    }

    /// Number of votes buffered so far this round.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
