//! Proxy Server
//!
//! Accept loop spawning one worker task per client connection.

use std::future::Future;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::proxy::handler::{handle_client, ProxyContext};

/// Accepts connections on `listener` until `shutdown` resolves.
///
/// Each connection gets its own task with a clone of `ctx`, so every worker
/// shares the same cache. In-flight workers are left to finish on their own
/// after shutdown.
pub async fn serve<F>(listener: TcpListener, ctx: ProxyContext, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Proxy stopped accepting connections");
                return;
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(connection) => connection,
                    Err(err) => {
                        warn!(error = %err, "failed to accept connection");
                        continue;
                    }
                };

                info!(%peer, "Accepted connection");
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_client(stream, &ctx).await {
                        warn!(%peer, error = %err, "connection failed");
                    }
                });
            }
        }
    }
}
