//! Dynamic workload generation for sqlstress.
//!
//! This crate produces a deterministic stream of SQL statements for
//! dynamic-mode runs: a seeded generator picks a weighted statement
//! category (SELECT/INSERT/UPDATE/DELETE/DDL) and renders it against a
//! small fixed table universe. Run-to-run continuity is kept in a
//! [`GeneratorState`] persisted as JSON between runs.

pub mod category;
pub mod generator;
pub mod state;

pub use category::Category;
pub use generator::{schema_statements, GeneratedStatement, StatementGenerator};
pub use state::{GeneratorState, StateError};
