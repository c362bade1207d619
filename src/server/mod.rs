//! Server module
//!
//! Accept loop, per-connection HTTP/1.1 serving and shutdown signals.

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppState;
use crate::error::Result;
use crate::logger;

pub use connection::spawn_connection;
pub use listener::create_reusable_listener;
pub use signal::shutdown_signal;

/// Accept connections until `shutdown` resolves
///
/// Connections already being served run to completion in their own tasks.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => spawn_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => {
                logger::log_shutdown();
                return Ok(());
            }
        }
    }
}
