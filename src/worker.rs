//! Worker execution loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use mysql_async::prelude::*;
use sqlstress_generator::Category;

use crate::config::{Config, NodeParameters};
use crate::connect;
use crate::sink::LogSink;
use crate::workload::WorkerFeed;

/// Success/total counters for one generator category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub total: u64,
    pub success: u64,
}

/// Counters owned by one worker, read by the node only after the join
/// barrier. Also used as the aggregate over all workers.
#[derive(Debug, Clone, Default)]
pub struct WorkerStats {
    pub queries_executed: u64,
    pub queries_failed: u64,
    /// Per-category breakdown, populated in dynamic mode only.
    pub per_category: BTreeMap<Category, CategoryStats>,
}

impl WorkerStats {
    fn record(&mut self, category: Option<Category>, success: bool) {
        self.queries_executed += 1;
        if !success {
            self.queries_failed += 1;
        }
        if let Some(category) = category {
            let entry = self.per_category.entry(category).or_default();
            entry.total += 1;
            if success {
                entry.success += 1;
            }
        }
    }

    /// Fold another worker's counters into this aggregate.
    pub fn merge(&mut self, other: &WorkerStats) {
        self.queries_executed += other.queries_executed;
        self.queries_failed += other.queries_failed;
        for (category, stats) in &other.per_category {
            let entry = self.per_category.entry(*category).or_default();
            entry.total += stats.total;
            entry.success += stats.success;
        }
    }
}

/// Everything one worker needs. Only the sink is shared.
pub struct WorkerContext {
    pub index: usize,
    pub params: Arc<NodeParameters>,
    pub config: Arc<Config>,
    pub quota: u64,
    pub sink: Arc<LogSink>,
}

/// Execute one worker to completion of its quota, its feed, or its own
/// fatal connection error.
///
/// Per-statement failures are counted and tolerated. Connection-level
/// failures end this worker early; sibling workers keep running.
pub async fn run(ctx: WorkerContext, mut feed: WorkerFeed) -> WorkerStats {
    let mut stats = WorkerStats::default();

    let mut conn = match connect::open(&ctx.params, &ctx.config.database).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("worker {}: unable to open connection: {e}", ctx.index);
            ctx.sink
                .append(&format!("! worker {}: unable to open connection: {e}", ctx.index));
            return stats;
        }
    };

    for _ in 0..ctx.quota {
        let Some(statement) = feed.next_statement() else {
            break;
        };
        match conn.query_drop(statement.sql.as_str()).await {
            Ok(()) => {
                stats.record(statement.category, true);
                if ctx.config.log_all_queries {
                    ctx.sink
                        .append(&format!("worker {}: OK: {}", ctx.index, statement.sql));
                }
            }
            Err(mysql_async::Error::Server(server_err)) => {
                stats.record(statement.category, false);
                if ctx.config.log_all_queries || ctx.config.log_failed_queries {
                    ctx.sink.append(&format!(
                        "worker {}: ERR {}: {}",
                        ctx.index, server_err.code, statement.sql
                    ));
                }
            }
            Err(e) => {
                // Connection lost mid-run: record the attempt, stop this
                // worker only.
                stats.record(statement.category, false);
                tracing::warn!("worker {}: connection lost: {e}", ctx.index);
                ctx.sink
                    .append(&format!("! worker {}: connection lost: {e}", ctx.index));
                return stats;
            }
        }
    }

    if let Err(e) = conn.disconnect().await {
        tracing::debug!("worker {}: disconnect failed: {e}", ctx.index);
    }
    stats
}
