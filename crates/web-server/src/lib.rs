use analytics::StatsCalculator;
use axum::{
    routing::{get, post},
    Router,
};
use configuration::Config;
use database::StatsStore;
use std::sync::Arc;
use subscriptions::SubscriptionManager;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StatsStore>,
    pub calculator: StatsCalculator,
    pub subscriptions: SubscriptionManager,
}

impl AppState {
    pub fn new(store: Arc<dyn StatsStore>, config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            calculator: StatsCalculator::new(),
            subscriptions: SubscriptionManager::new(config.subscription.clone())?,
        })
    }
}

/// Builds the API router with CORS and request tracing applied.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/plans", get(handlers::get_plans))
        .route(
            "/api/users/:user_id/batting",
            get(handlers::list_batting).post(handlers::create_batting),
        )
        .route(
            "/api/users/:user_id/pitching",
            get(handlers::list_pitching).post(handlers::create_pitching),
        )
        .route("/api/users/:user_id/summary", get(handlers::get_summary))
        .route(
            "/api/users/:user_id/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/api/users/:user_id/subscription", get(handlers::get_subscription))
        .route(
            "/api/users/:user_id/subscription/activate",
            post(handlers::activate_subscription),
        )
        .route(
            "/api/users/:user_id/subscription/cancel",
            post(handlers::cancel_subscription),
        )
        .route("/api/users/:user_id/report", get(handlers::get_report))
        .with_state(Arc::new(state))
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured address and serves until the process is stopped.
///
/// Tracing is initialized by the caller.
pub async fn run_server(config: &Config, store: Arc<dyn StatsStore>) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;
    let app = build_router(AppState::new(store, config)?);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server started and listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
