//! Node orchestrator.
//!
//! Drives the run lifecycle: open the log sink, probe connectivity,
//! load the workload, fan out the worker pool, join, aggregate, report,
//! and persist generator state. Every step is a hard gate; termination
//! itself is performed in `main` from [`NodeError::exit_code`], never
//! inside the node or the gateway.

use std::path::PathBuf;
use std::sync::Arc;

use mysql_async::prelude::*;
use sqlstress_generator::GeneratorState;
use thiserror::Error;

use crate::config::{Config, NodeParameters};
use crate::connect::{self, ConnectError};
use crate::report;
use crate::sink::LogSink;
use crate::worker::{self, WorkerContext, WorkerStats};
use crate::workload::{self, WorkloadSource};

/// Exit code when the general log cannot be opened.
const EXIT_LOG_SINK: i32 = 2;
/// Exit code for every other unrecoverable failure.
const EXIT_FAILURE: i32 = 1;

/// Unrecoverable run failures, each mapping to a process exit code.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("unable to open log file {path}: {source}")]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to open SQL file {path}: {source}")]
    Workload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl NodeError {
    /// Process exit code this failure maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            NodeError::LogSink { .. } => EXIT_LOG_SINK,
            _ => EXIT_FAILURE,
        }
    }
}

/// What a completed run produced.
pub enum RunOutcome {
    /// The probe succeeded under `--test-connection`; no workload was
    /// read and no worker was started.
    ProbeOnly,
    /// Full run: aggregated counters over all workers.
    Completed(WorkerStats),
}

pub struct Node {
    params: NodeParameters,
    config: Config,
    sink: Option<Arc<LogSink>>,
}

impl Node {
    pub fn new(params: NodeParameters, config: Config) -> Self {
        Self {
            params,
            config,
            sink: None,
        }
    }

    /// Drive the full lifecycle.
    pub async fn start_work(&mut self) -> Result<RunOutcome, NodeError> {
        let log_path = self.params.general_log_path();
        let sink = LogSink::create(&log_path).map_err(|source| NodeError::LogSink {
            path: log_path,
            source,
        })?;
        let sink = Arc::new(sink);
        self.sink = Some(Arc::clone(&sink));

        let target = self.params.display_target();
        tracing::info!("Connecting to {} [{}]...", self.params.name, target);
        sink.append(&format!("- Connecting to {} [{}]...", self.params.name, target));

        // Connectivity is a precondition for the whole run, not a
        // per-worker concern. A failed probe invalidates everything.
        let identity = match connect::probe(&self.params, &self.config.database).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::error!("{e}");
                sink.append(&format!("! {e}"));
                sink.flush();
                return Err(e.into());
            }
        };
        tracing::info!("Connected server version: {}", identity.version);
        sink.append(&format!("- Connected server version: {}", identity.version));

        if self.config.test_connection {
            sink.flush();
            return Ok(RunOutcome::ProbeOnly);
        }

        let mut threads = self.params.threads;
        let mut quota = self.params.queries_per_thread;
        let mut generator_state = None;

        let workload = if self.config.dynamic {
            let state = self.load_generator_state(&sink);
            self.seed_schema(&sink).await;
            generator_state = Some(state.clone());
            WorkloadSource::Dynamic { state }
        } else {
            let infile = self.params.infile.clone();
            let statements = match workload::load_replay_file(&infile) {
                Ok(statements) => statements,
                Err(source) => {
                    let err = NodeError::Workload {
                        path: infile,
                        source,
                    };
                    tracing::error!("{err}");
                    sink.append(&format!("! {err}"));
                    // The report still goes out with zero counters,
                    // matching a run that never executed anything.
                    self.finalize(&WorkerStats::default());
                    return Err(err);
                }
            };
            tracing::info!(
                "Read {} lines from {}",
                statements.len(),
                self.params.infile.display()
            );
            sink.append(&format!(
                "- Read {} lines from {}",
                statements.len(),
                self.params.infile.display()
            ));

            let (effective_threads, effective_quota) = workload::replay_execution_plan(
                statements.len(),
                threads,
                quota,
                self.config.no_shuffle,
            );
            threads = effective_threads;
            quota = effective_quota;

            WorkloadSource::Replay {
                statements: Arc::new(statements),
                shuffle: !self.config.no_shuffle,
                seed: self.config.seed,
            }
        };

        let params = Arc::new(self.params.clone());
        let config = Arc::new(self.config.clone());
        let mut handles = Vec::with_capacity(threads);
        for index in 0..threads {
            let feed = workload.feed_for_worker(index);
            let ctx = WorkerContext {
                index,
                params: Arc::clone(&params),
                config: Arc::clone(&config),
                quota,
                sink: Arc::clone(&sink),
            };
            handles.push(tokio::spawn(worker::run(ctx, feed)));
        }

        // Join barrier: the only synchronization point in the run. After
        // it, every worker is provably inactive and the node has
        // exclusive access to the counters.
        let mut totals = WorkerStats::default();
        let mut join_failure = None;
        for handle in handles {
            match handle.await {
                Ok(stats) => totals.merge(&stats),
                Err(e) => {
                    tracing::error!("worker task failed: {e}");
                    join_failure.get_or_insert(e);
                }
            }
        }

        if let Some(mut state) = generator_state {
            state.advance(totals.queries_executed);
            let state_path = self.params.generator_state_path();
            match state.save(&state_path) {
                Ok(()) => sink.append(&format!(
                    "- Generator state saved to {}",
                    state_path.display()
                )),
                Err(e) => {
                    tracing::warn!(
                        "failed to persist generator state to {}: {e}",
                        state_path.display()
                    );
                }
            }
        }

        self.finalize(&totals);

        if let Some(e) = join_failure {
            return Err(NodeError::Worker(e));
        }
        Ok(RunOutcome::Completed(totals))
    }

    fn load_generator_state(&self, sink: &LogSink) -> GeneratorState {
        let state_path = self.params.generator_state_path();
        match GeneratorState::load(&state_path) {
            Ok(Some(state)) => {
                tracing::info!(
                    "Restored generator state from {} (epoch {})",
                    state_path.display(),
                    state.epoch
                );
                sink.append(&format!(
                    "- Restored generator state from {} (epoch {})",
                    state_path.display(),
                    state.epoch
                ));
                state
            }
            Ok(None) => GeneratorState::new(self.config.seed),
            Err(e) => {
                tracing::warn!(
                    "ignoring unreadable generator state {}: {e}",
                    state_path.display()
                );
                GeneratorState::new(self.config.seed)
            }
        }
    }

    /// Best-effort creation of the table universe the generator targets.
    /// Statement failures here are logged and tolerated.
    async fn seed_schema(&self, sink: &LogSink) {
        let mut conn = match connect::open(&self.params, &self.config.database).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("schema setup skipped: {e}");
                return;
            }
        };
        for ddl in sqlstress_generator::schema_statements() {
            if let Err(e) = conn.query_drop(ddl.as_str()).await {
                tracing::warn!("schema statement failed: {e}");
            }
        }
        sink.append("- Prepared generator table universe");
        let _ = conn.disconnect().await;
    }

    /// Write the aggregate report and flush the sink, exactly once.
    /// Skipped entirely when the sink was never opened.
    fn finalize(&self, totals: &WorkerStats) {
        let Some(sink) = &self.sink else { return };
        if self.config.dynamic {
            for line in report::dynamic_report(&totals.per_category) {
                sink.append(&line);
            }
        } else {
            sink.append(&report::replay_summary(totals));
        }
        sink.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_log_sink_failures() {
        let sink_err = NodeError::LogSink {
            path: PathBuf::from("/nope/node_general.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(sink_err.exit_code(), 2);

        let workload_err = NodeError::Workload {
            path: PathBuf::from("absent.sql"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(workload_err.exit_code(), 1);
    }
}
