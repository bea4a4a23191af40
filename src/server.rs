//! Local listener for the OAuth redirect

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::oauth::{OAuthClient, TokenResponse};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub const SUCCESS_MESSAGE: &str = "Authorization successful!";
pub const FAILURE_MESSAGE: &str = "Authorization failed.";
pub const MISSING_CODE_MESSAGE: &str = "Authorization code not found.";

/// One authorization attempt: the expected `state` and, once the exchange
/// succeeds, the token
pub struct AuthFlow {
    oauth: OAuthClient,
    expected_state: String,
    token: Mutex<Option<TokenResponse>>,
    done: Notify,
}

impl AuthFlow {
    pub fn new(oauth: OAuthClient, expected_state: String) -> Arc<Self> {
        Arc::new(Self {
            oauth,
            expected_state,
            token: Mutex::new(None),
            done: Notify::new(),
        })
    }

    pub fn token(&self) -> Option<TokenResponse> {
        self.token.lock().ok().and_then(|token| token.clone())
    }

    fn complete(&self, token: TokenResponse) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token);
        }
        self.done.notify_one();
    }
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub fn router(flow: Arc<AuthFlow>, path: &str) -> Router {
    Router::new().route(path, get(callback)).with_state(flow)
}

/// Serve the callback until a token is obtained or Ctrl+C is pressed
pub async fn run(address: SocketAddr, flow: Arc<AuthFlow>, path: &str) -> Result<Option<TokenResponse>, AnyError> {
    let listener = TcpListener::bind(address).await?;
    serve(listener, flow, path).await
}

/// Like [`run`], on an already bound listener
pub async fn serve(listener: TcpListener, flow: Arc<AuthFlow>, path: &str) -> Result<Option<TokenResponse>, AnyError> {
    let app = router(flow.clone(), path);
    let address = listener.local_addr()?;
    info!(%address, path, "Waiting for OAuth callback");

    let finished = flow.clone();
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = finished.done.notified() => info!("Authorization completed"),
                _ = shutdown_signal() => {},
            }
        })
        .await?;

    Ok(flow.token())
}

async fn callback(State(flow): State<Arc<AuthFlow>>, Query(params): Query<CallbackParams>) -> impl IntoResponse {
    if let Some(error) = params.error {
        warn!(error = %error, "Authorization denied by the platform");
        return (StatusCode::BAD_REQUEST, FAILURE_MESSAGE);
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, MISSING_CODE_MESSAGE);
    };

    if params.state.as_deref() != Some(flow.expected_state.as_str()) {
        warn!(state = ?params.state, "Callback state does not match");
        return (StatusCode::BAD_REQUEST, FAILURE_MESSAGE);
    }

    info!("Authorization code received");
    match flow.oauth.exchange_code(&code).await {
        Ok(token) => {
            flow.complete(token);
            (StatusCode::OK, SUCCESS_MESSAGE)
        }
        Err(e) => {
            warn!(error = %e, "Failed to exchange authorization code");
            (StatusCode::BAD_REQUEST, FAILURE_MESSAGE)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
