//! sqlstress: a concurrent stress and regression client for
//! MySQL-compatible servers.
//!
//! A run drives a fixed pool of workers, each owning one connection and
//! executing a workload: either a recorded SQL script replayed from a
//! file or a stream of generated statements. Per-worker counters are
//! aggregated into a single end-of-run report in the node's general
//! log.

pub mod config;
pub mod connect;
pub mod node;
pub mod report;
pub mod sink;
pub mod worker;
pub mod workload;

pub use config::{Config, NodeParameters, OptionValue};
pub use node::{Node, NodeError, RunOutcome};
