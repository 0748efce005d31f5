//! Workload sources: static replay and dynamic generation.
//!
//! A run executes either a recorded script (read once, shared read-only
//! across workers) or a stream of generated statements (per-worker
//! generator sub-states, no sharing). Both variants hand workers a
//! [`WorkerFeed`] with a single `next_statement` contract.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sqlstress_generator::{Category, GeneratorState, StatementGenerator};

/// One statement handed to a worker, tagged with its generator category
/// in dynamic mode.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub category: Option<Category>,
}

/// The workload a run executes.
pub enum WorkloadSource {
    /// A recorded script, immutable once loaded.
    Replay {
        statements: Arc<Vec<String>>,
        shuffle: bool,
        seed: u64,
    },
    /// Per-run generator state; each worker gets its own sub-state.
    Dynamic { state: GeneratorState },
}

impl WorkloadSource {
    /// Build the feed for one worker. Replay feeds share the statement
    /// list read-only; dynamic feeds own a disjoint generator.
    pub fn feed_for_worker(&self, worker_index: usize) -> WorkerFeed {
        match self {
            WorkloadSource::Replay {
                statements,
                shuffle,
                seed,
            } => {
                if *shuffle {
                    WorkerFeed::Shuffled {
                        statements: Arc::clone(statements),
                        rng: SmallRng::seed_from_u64(seed.wrapping_add(worker_index as u64)),
                    }
                } else {
                    WorkerFeed::Sequential {
                        statements: Arc::clone(statements),
                        cursor: 0,
                    }
                }
            }
            WorkloadSource::Dynamic { state } => {
                WorkerFeed::Generated(StatementGenerator::new(state.worker_seed(worker_index)))
            }
        }
    }
}

/// Per-worker view of the workload, owned exclusively by one worker.
pub enum WorkerFeed {
    /// Walk the script once in order. Used when shuffling is disabled.
    Sequential {
        statements: Arc<Vec<String>>,
        cursor: usize,
    },
    /// Pick uniformly random script statements from a per-worker RNG.
    Shuffled {
        statements: Arc<Vec<String>>,
        rng: SmallRng,
    },
    /// Pull from this worker's statement generator.
    Generated(StatementGenerator),
}

impl WorkerFeed {
    /// Next statement, or `None` once a sequential replay is exhausted.
    pub fn next_statement(&mut self) -> Option<Statement> {
        match self {
            WorkerFeed::Sequential { statements, cursor } => {
                let sql = statements.get(*cursor)?.clone();
                *cursor += 1;
                Some(Statement {
                    sql,
                    category: None,
                })
            }
            WorkerFeed::Shuffled { statements, rng } => {
                if statements.is_empty() {
                    return None;
                }
                let index = rng.random_range(0..statements.len());
                Some(Statement {
                    sql: statements[index].clone(),
                    category: None,
                })
            }
            WorkerFeed::Generated(generator) => {
                let generated = generator.next_statement();
                Some(Statement {
                    sql: generated.sql,
                    category: Some(generated.category),
                })
            }
        }
    }
}

/// Read a recorded script: every non-empty line, in original order,
/// fully in memory before execution starts.
pub fn load_replay_file(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let mut statements = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            statements.push(line);
        }
    }
    Ok(statements)
}

/// Effective (threads, queries-per-thread) for a replay run.
///
/// Preserving script order requires a single sequential consumer, so
/// disabling shuffle forces one worker with a quota of the full script.
pub fn replay_execution_plan(
    script_len: usize,
    threads: usize,
    queries_per_thread: u64,
    no_shuffle: bool,
) -> (usize, u64) {
    if no_shuffle {
        (1, script_len as u64)
    } else {
        (threads, queries_per_thread)
    }
}
