//! HTTP API
//!
//! - `POST /ask`: answer `{"question": ...}` with `{question, answer, sources}`
//! - `POST /clear`: forget the conversation
//! - `GET /health`: liveness check

mod error;
mod handlers;

pub use error::{ApiError, ApiResult};
pub use handlers::{AppState, AskRequest, create_router};

use std::io;
use tokio::net::TcpListener;
use tracing::info;

/// Bind `host:port` and serve until Ctrl+C.
pub async fn serve(state: AppState, host: &str, port: u16) -> io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
}
