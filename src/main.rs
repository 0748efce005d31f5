//! Command-line interface for sqlstress
//!
//! # Usage Examples
//!
//! ```bash
//! # Replay a recorded script with 16 workers
//! sqlstress --host db1 --user stress --password secret \
//!   --database testdb --infile run.sql --threads 16
//!
//! # Preserve script order (forces a single sequential worker)
//! sqlstress --infile run.sql --no-shuffle
//!
//! # Generate statements on the fly, 8 workers x 50k statements
//! sqlstress --dynamic --threads 8 --queries-per-thread 50000 \
//!   --seed 42 --logdir /var/log/sqlstress
//!
//! # Dry-run connectivity check only
//! sqlstress --host db1 --test-connection
//! ```

use clap::Parser;
use std::path::PathBuf;

use sqlstress::config::{parse_extra_options, Config, NodeParameters};
use sqlstress::node::{Node, RunOutcome};

#[derive(Parser)]
#[command(name = "sqlstress")]
#[command(about = "A concurrent stress and regression client for MySQL-compatible servers")]
#[command(version)]
struct Cli {
    /// Server hostname or IP address
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server TCP port
    #[arg(long, default_value_t = 3306)]
    port: u16,

    /// Unix socket path (preferred over TCP when set)
    #[arg(long)]
    socket: Option<String>,

    /// Username to connect as
    #[arg(long, default_value = "root", env = "SQLSTRESS_USER")]
    user: String,

    /// Password to connect with
    #[arg(long, default_value = "", env = "SQLSTRESS_PASSWORD")]
    password: String,

    /// Target database (schema)
    #[arg(long, default_value = "test")]
    database: String,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 10)]
    threads: usize,

    /// Statements each worker executes
    #[arg(long, default_value_t = 10_000)]
    queries_per_thread: u64,

    /// Recorded SQL script for replay mode (one statement per line)
    #[arg(long, default_value = "sqlstress.sql")]
    infile: PathBuf,

    /// Directory for the general log and persisted generator state
    #[arg(long, default_value = ".")]
    logdir: PathBuf,

    /// Node name used in log and state file names
    #[arg(long, default_value = "node")]
    node_name: String,

    /// Generate statements on the fly instead of replaying a script
    #[arg(long)]
    dynamic: bool,

    /// Preserve script order: replay with a single sequential worker
    #[arg(long)]
    no_shuffle: bool,

    /// Probe connectivity and exit without running any workload
    #[arg(long)]
    test_connection: bool,

    /// Log every executed statement to the general log
    #[arg(long)]
    log_all_queries: bool,

    /// Log failed statements to the general log
    #[arg(long)]
    log_failed_queries: bool,

    /// Seed for the dynamic generator and the replay shuffle
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Extra KEY=VALUE options carried but not interpreted by the core
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let extra = match parse_extra_options(&cli.set) {
        Ok(extra) => extra,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let params = NodeParameters {
        name: cli.node_name,
        address: cli.host,
        port: cli.port,
        socket: cli.socket,
        username: cli.user,
        password: cli.password,
        logdir: cli.logdir,
        threads: cli.threads.max(1),
        queries_per_thread: cli.queries_per_thread,
        infile: cli.infile,
    };
    let config = Config {
        dynamic: cli.dynamic,
        no_shuffle: cli.no_shuffle,
        test_connection: cli.test_connection,
        log_all_queries: cli.log_all_queries,
        log_failed_queries: cli.log_failed_queries,
        database: cli.database,
        seed: cli.seed,
        extra,
    };

    let mut node = Node::new(params, config);
    match node.start_work().await {
        Ok(RunOutcome::ProbeOnly) => {
            tracing::info!("Connection test succeeded");
        }
        Ok(RunOutcome::Completed(totals)) => {
            tracing::info!(
                "Run completed: {} queries executed, {} failed",
                totals.queries_executed,
                totals.queries_failed
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Exiting...");
            std::process::exit(e.exit_code());
        }
    }
}
