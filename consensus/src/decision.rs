//! The pure majority / randomized-fallback decision rule.
//!
//! Given the multiset of values tallied for a round and the cluster size,
//! the rule either adopts a strict-majority value and decides, or draws a
//! fresh uniform random value and continues. The random draw is what gives
//! the protocol its probabilistic termination.

use {crate::types::BinaryValue, rand::Rng};

/// Minimum number of identical votes required to adopt a value as the
/// decision: `floor(n / 2) + 1`.
pub fn majority_threshold(cluster_size: u32) -> usize {
    (cluster_size as usize) / 2 + 1
}

/// Outcome of applying the decision rule to one round's tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// The value to adopt, either as the decision or as the next proposal.
    pub next_value: BinaryValue,
    /// Whether a strict majority was reached.
    pub decided: bool,
}

/// Apply the decision rule to a round's tally.
///
/// Deterministic whenever a majority exists. The no-majority branch draws
/// a fresh Bernoulli(0.5) value from `rng` on every call, so tests must
/// treat it as a coin flip, not a fixed output.
pub fn decide<R: Rng + ?Sized>(
    votes: &[BinaryValue],
    cluster_size: u32,
    rng: &mut R,
) -> Decision {
    let threshold = majority_threshold(cluster_size);
    let count_zero = votes.iter().filter(|v| **v == BinaryValue::Zero).count();
    let count_one = votes.iter().filter(|v| **v == BinaryValue::One).count();

    if count_zero >= threshold {
        Decision {
            next_value: BinaryValue::Zero,
            decided: true,
        }
    } else if count_one >= threshold {
        Decision {
            next_value: BinaryValue::One,
            decided: true,
        }
    } else {
        let next_value = if rng.random_bool(0.5) {
            BinaryValue::One
        } else {
            BinaryValue::Zero
        };
        Decision {
            next_value,
            decided: false,
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
    fn test_majority_threshold_formula() {
        assert_eq!(majority_threshold(1), 1);
        assert_eq!(majority_threshold(2), 2);
        assert_eq!(majority_threshold(3), 2);
        assert_eq!(majority_threshold(4), 3);
        assert_eq!(majority_threshold(5), 3);
        assert_eq!(majority_threshold(100), 51);
    }

    #[test]
    fn test_majority_of_zeros_decides_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let votes = [BinaryValue::Zero, BinaryValue::Zero, BinaryValue::One];
        let decision = decide(&votes, 3, &mut rng);
        assert_eq!(
            decision,
            Decision {
                next_value: BinaryValue::Zero,
                decided: true
            }
        );
    }

    #[test]
    fn test_majority_of_ones_decides_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let votes = [BinaryValue::One, BinaryValue::One, BinaryValue::One];
        let decision = decide(&votes, 3, &mut rng);
        assert_eq!(
            decision,
            Decision {
                next_value: BinaryValue::One,
                decided: true
            }
        );
    }

    #[test]
    fn test_exact_threshold_decides() {
        // 3 zeros out of a 5-process cluster meet floor(5/2) + 1 = 3.
        let mut rng = StdRng::seed_from_u64(1);
        let votes = [
            BinaryValue::Zero,
            BinaryValue::Zero,
            BinaryValue::Zero,
            BinaryValue::One,
        ];
        let decision = decide(&votes, 5, &mut rng);
        assert!(decision.decided);
        assert_eq!(decision.next_value, BinaryValue::Zero);
    }

    #[test]
    fn test_below_threshold_never_decides() {
        let mut rng = StdRng::seed_from_u64(1);
        let votes = [BinaryValue::Zero, BinaryValue::Zero, BinaryValue::One];
        for _ in 0..20 {
            let decision = decide(&votes, 4, &mut rng);
            assert!(!decision.decided);
        }
    }

    #[test]
    fn test_empty_tally_never_decides() {
        let mut rng = StdRng::seed_from_u64(1);
        let decision = decide(&[], 3, &mut rng);
        assert!(!decision.decided);
    }

    #[test]
    fn test_deterministic_when_majority_exists() {
        let votes = [BinaryValue::One, BinaryValue::One, BinaryValue::Zero];
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let decision = decide(&votes, 3, &mut rng);
            assert_eq!(
                decision,
                Decision {
                    next_value: BinaryValue::One,
                    decided: true
                }
            );
        }
    }

    #[test]
    fn test_no_majority_randomizes_roughly_evenly() {
        let mut rng = StdRng::seed_from_u64(42);
        let votes = [BinaryValue::Zero, BinaryValue::One];
        let mut ones = 0usize;
        for _ in 0..1000 {
            let decision = decide(&votes, 5, &mut rng);
            assert!(!decision.decided);
            if decision.next_value == BinaryValue::One {
                ones += 1;
            }
        }
        // Bernoulli(0.5): both values must occur, in roughly even shares.
        assert!((400..=600).contains(&ones), "draw heavily skewed: {ones}/1000");
    }
}
