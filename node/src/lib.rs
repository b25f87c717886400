//! Benor Node Runtime
//!
//! Per-process runtime for the benor consensus cluster. Each process is an
//! independent unit with no shared memory across processes; everything it
//! owns lives in one [`process::Process`]:
//!
//! 1. The transport listener receives framed requests and dispatches them
//!    into the process's control surface (probe, deliver, start, stop,
//!    state).
//! 2. A `Start` request runs the round driver: wait for cluster readiness,
//!    then broadcast → collect → decide until the process settles.
//! 3. Inbound votes land in the round-scoped inbox, which the driver
//!    drains once per round after the collection window.
//!
//! The shared readiness gate keeps any process from broadcasting into a
//! cluster that is not fully listening yet.

pub mod process;
pub mod readiness;
pub mod service;

pub use {
    process::{Process, ProtocolError},
    readiness::ClusterReadiness,
    service::{serve, ServiceHandle},
};
