//! Connection gateway.
//!
//! Opens the startup connectivity probe and the per-worker connections.
//! All failures surface as [`ConnectError`] values returned to the
//! orchestrator; the gateway never terminates the process itself.

use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder};
use thiserror::Error;

use crate::config::NodeParameters;

/// Connection-level failure. During the startup probe this invalidates
/// the whole run; mid-run it ends the owning worker only.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: mysql_async::Error,
    },
}

/// Server identity captured by the startup probe.
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    pub version: String,
}

fn build_opts(params: &NodeParameters, database: &str) -> Opts {
    let mut builder = OptsBuilder::default()
        .ip_or_hostname(params.address.clone())
        .tcp_port(params.port)
        .user(Some(params.username.clone()))
        .pass(Some(params.password.clone()))
        .db_name(Some(database.to_string()));
    if let Some(socket) = &params.socket {
        builder = builder.socket(Some(socket.clone()));
    }
    builder.into()
}

/// Open one connection. Each worker calls this exactly once; connections
/// are never shared across workers.
pub async fn open(params: &NodeParameters, database: &str) -> Result<Conn, ConnectError> {
    let opts = build_opts(params, database);
    Conn::new(opts).await.map_err(|source| ConnectError::Connect {
        target: format!("{}/{}", params.display_target(), database),
        source,
    })
}

/// Probe connectivity once and capture the server identity.
///
/// The version-comment query is diagnostic only: if it fails, the probe
/// falls back to the bare `@@version` string and still succeeds. The
/// connection is always released before returning.
pub async fn probe(
    params: &NodeParameters,
    database: &str,
) -> Result<ServerIdentity, ConnectError> {
    let mut conn = open(params, database).await?;

    let base = conn
        .query_first::<String, _>("SELECT @@version")
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| "unknown".to_string());

    let version = match conn
        .query_first::<String, _>("SELECT @@version_comment LIMIT 1")
        .await
    {
        Ok(Some(comment)) if !comment.is_empty() => format!("{base} {comment}"),
        _ => base,
    };

    let _ = conn.disconnect().await;
    Ok(ServerIdentity { version })
}
