use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use cocktail_types::CocktailResult;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::handlers;
use super::middleware::{ApiContext, AuthResult, RateLimitResult};
use crate::storage::EventStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub abort_flag: Arc<AtomicBool>,
    pub started_at: Instant,
}

pub struct ApiServer {
    addr: SocketAddr,
    running: Arc<RwLock<bool>>,
    state: AppState,
    context: Arc<ApiContext>,
}

impl ApiServer {
    pub fn new(addr: SocketAddr, store: Arc<dyn EventStore>, abort_flag: Arc<AtomicBool>, auth_token: Option<String>) -> Self {
        let context = match auth_token {
            Some(token) if !token.is_empty() => Arc::new(ApiContext::new(Some(token), 100, 200)),
            _ => {
                let (ctx, token) = ApiContext::with_generated_token(100, 200);
                warn!("no auth_token configured for the API, generated a random one: {}", token);
                warn!("add `auth_token = \"{}\"` under [api] in config.toml to keep it stable", token);
                Arc::new(ctx)
            }
        };

        Self {
            addr,
            running: Arc::new(RwLock::new(false)),
            state: AppState { store, abort_flag, started_at: Instant::now() },
            context,
        }
    }

    pub fn new_insecure_no_auth(addr: SocketAddr, store: Arc<dyn EventStore>, abort_flag: Arc<AtomicBool>) -> Self {
        warn!("API server created without authentication, for local/testing use only");
        Self {
            addr,
            running: Arc::new(RwLock::new(false)),
            state: AppState { store, abort_flag, started_at: Instant::now() },
            context: Arc::new(ApiContext::insecure_without_auth()),
        }
    }

    fn router(&self) -> Router {
        let context = self.context.clone();
        Router::new()
            .route("/api/status", get(handlers::system_status))
            .route("/api/abort", post(handlers::system_abort))
            .route("/api/orders", get(handlers::list_orders).post(handlers::place_order))
            .route("/api/orders/:id", get(handlers::get_order))
            .route("/api/orders/:id/enqueue", post(handlers::enqueue_order))
            .route("/api/orders/:id/cancel", post(handlers::cancel_order))
            .route("/api/recipes", get(handlers::list_recipes).post(handlers::create_recipe))
            .route("/api/recipes/:id", get(handlers::get_recipe))
            .route("/api/slots", get(handlers::list_slots).post(handlers::refill_slot))
            .with_state(self.state.clone())
            .layer(middleware::from_fn_with_state(context, guard))
    }

    pub async fn start(&self) -> CocktailResult<()> {
        if *self.running.read().await {
            return Err(cocktail_types::CocktailError::Internal("API server already running".into()));
        }

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| cocktail_types::CocktailError::Transport(format!("failed to bind API server: {e}")))?;

        info!(addr = %self.addr, auth_enabled = self.context.is_auth_enabled(), "API server listening");

        *self.running.write().await = true;
        let running = self.running.clone();
        let rate_limiter = self.context.rate_limiter.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                if !*running.read().await {
                    break;
                }
                rate_limiter.cleanup();
            }
        });

        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        let running = self.running.clone();
        tokio::spawn(async move {
            let server = axum::serve(listener, app);
            if let Err(e) = server.await {
                warn!(error = %e, "API server stopped unexpectedly");
            }
            *running.write().await = false;
        });

        Ok(())
    }

    pub async fn stop(&self) {
        *self.running.write().await = false;
        info!("API server stopped");
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }
}

async fn guard(
    State(context): State<Arc<ApiContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    match context.rate_limiter.check_request(addr.ip()) {
        RateLimitResult::Allowed => {}
        _ => return Err(StatusCode::TOO_MANY_REQUESTS),
    }

    let auth_header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match context.authenticator.authenticate(request.uri().path(), auth_header) {
        AuthResult::Authenticated | AuthResult::NotRequired => Ok(next.run(request).await),
        AuthResult::MissingToken | AuthResult::InvalidFormat => Err(StatusCode::UNAUTHORIZED),
        AuthResult::InvalidToken => Err(StatusCode::FORBIDDEN),
    }
}
