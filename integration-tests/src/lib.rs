//! Benor Integration Tests
//!
//! End-to-end scenarios for the benor consensus cluster, exercised over
//! the real wire (framed TCP, one listener per process):
//!
//! 1. **Unanimous start** — N=3, no faults, all processes propose 1:
//!    every process decides 1 in round 0.
//! 2. **Faulty minority** — N=4 with one silent faulty process and split
//!    initial values: no round-0 majority, rounds advance, and all correct
//!    processes eventually converge on one common value.
//! 3. **Mid-protocol stop** — a stopped process becomes inert (deliveries
//!    answered informationally, state frozen) while the rest of the
//!    cluster still decides.
//! 4. **Wire-level control surface** — liveness probes, stale-round
//!    rejection, settled-process delivery, and unconditional stop
//!    acknowledgement.

pub mod harness;

#[cfg(test)]
mod scenario_tests;
