// src/test_utils/mock_script_server.rs
use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
struct MockServerState {
    status: StatusCode,
    body: Arc<String>,
    hits: Arc<AtomicUsize>,
}

async fn script_handler(State(state): State<MockServerState>) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    log::debug!("Mock script server answering with {}", state.status);
    (state.status, state.body.as_ref().clone())
}

/// Serves an install script at `/install.sh` and `/install.ps1`
pub struct MockScriptServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    hits: Arc<AtomicUsize>,
}

impl MockScriptServer {
    pub async fn start(script: &str) -> Self {
        Self::start_with_status(StatusCode::OK, script).await
    }

    pub async fn start_with_status(status: StatusCode, body: &str) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = MockServerState {
            status,
            body: Arc::new(body.to_string()),
            hits: hits.clone(),
        };

        let app = Router::new()
            .route("/install.sh", get(script_handler))
            .route("/install.ps1", get(script_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("Mock script server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("Mock script server error: {}", e);
                });
        });

        MockScriptServer {
            addr,
            shutdown_tx,
            hits,
        }
    }

    /// URL of the script matching the current platform
    pub fn script_url(&self) -> String {
        let file = if cfg!(windows) { "install.ps1" } else { "install.sh" };
        format!("http://{}/{}", self.addr, file)
    }

    /// Number of script requests served so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock script server shutdown signal already sent or receiver dropped.");
        }
    }
}
