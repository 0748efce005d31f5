//! Run configuration and node parameters.
//!
//! Both structures are built once from the CLI before the node is
//! constructed and are read-only for the rest of the process lifetime.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;

/// A single extra option value, parsed once at load time so later
/// lookups cannot fail on type mismatch.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl OptionValue {
    /// Parse raw text: booleans first, then integers, else a string.
    pub fn parse(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            return OptionValue::Bool(b);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return OptionValue::Int(i);
        }
        OptionValue::Str(raw.to_string())
    }
}

/// Parse repeated `--set KEY=VALUE` arguments into typed extra options.
///
/// The core carries these without interpreting them, so any superset of
/// options is tolerated without behavior change.
pub fn parse_extra_options(raw: &[String]) -> anyhow::Result<BTreeMap<String, OptionValue>> {
    let mut extra = BTreeMap::new();
    for item in raw {
        let (key, value) = item
            .split_once('=')
            .with_context(|| format!("invalid --set option '{item}': expected KEY=VALUE"))?;
        if key.is_empty() {
            anyhow::bail!("invalid --set option '{item}': empty key");
        }
        extra.insert(key.to_string(), OptionValue::parse(value));
    }
    Ok(extra)
}

/// Immutable run configuration, never mutated after load.
#[derive(Debug, Clone)]
pub struct Config {
    /// Generate statements on the fly instead of replaying a script.
    pub dynamic: bool,
    /// Preserve script order: replay with a single sequential worker.
    pub no_shuffle: bool,
    /// Probe connectivity and exit without running any workload.
    pub test_connection: bool,
    /// Log every executed statement to the general log.
    pub log_all_queries: bool,
    /// Log failed statements to the general log.
    pub log_failed_queries: bool,
    /// Target database (schema) name.
    pub database: String,
    /// Seed for the dynamic generator and the replay shuffle.
    pub seed: u64,
    /// Extra options carried but not interpreted by the core.
    pub extra: BTreeMap<String, OptionValue>,
}

impl Config {
    /// Look up an extra option by key.
    pub fn extra(&self, key: &str) -> Option<&OptionValue> {
        self.extra.get(key)
    }
}

/// Node identity and connection parameters. Owned exclusively by the
/// node, read-only after construction.
#[derive(Debug, Clone)]
pub struct NodeParameters {
    /// Node name used in log and state file names.
    pub name: String,
    /// Server hostname or IP address.
    pub address: String,
    /// Server TCP port.
    pub port: u16,
    /// Unix socket path, preferred over TCP when set.
    pub socket: Option<String>,
    pub username: String,
    pub password: String,
    /// Directory for the general log and persisted generator state.
    pub logdir: PathBuf,
    /// Number of concurrent workers.
    pub threads: usize,
    /// Statements each worker executes.
    pub queries_per_thread: u64,
    /// Recorded SQL script for replay mode.
    pub infile: PathBuf,
}

impl NodeParameters {
    /// Path of the general log for this node.
    pub fn general_log_path(&self) -> PathBuf {
        self.logdir.join(format!("{}_general.log", self.name))
    }

    /// Path of the persisted generator state for this node.
    pub fn generator_state_path(&self) -> PathBuf {
        self.logdir.join(format!("{}_generator.json", self.name))
    }

    /// Connection target for logging. Never includes the password.
    pub fn display_target(&self) -> String {
        format!("{}@{}:{}", self.username, self.address, self.port)
    }
}
