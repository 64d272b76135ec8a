use analytics::AnalyticsEngine;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use configuration::{Config, LedgerConfig};
use database::KeyValueStore;
use identity::{FirebaseIdentity, IdentityProvider};
use insights::{GeminiAnalyzer, PatternAnalyzer};
use rust_decimal::Decimal;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod journals;
pub mod session;

use journals::Journals;
use session::SessionStore;

/// Chart screenshots arrive inline as data URLs.
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub journals: Journals,
    pub analytics: AnalyticsEngine,
    pub initial_capital: Decimal,
    /// `None` runs the journal in single-user local mode with no session gate.
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub insights: Option<Arc<dyn PatternAnalyzer>>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        ledger: LedgerConfig,
        initial_capital: Decimal,
    ) -> Self {
        Self {
            journals: Journals::new(storage, ledger),
            analytics: AnalyticsEngine::new(),
            initial_capital,
            identity: None,
            insights: None,
            sessions: SessionStore::new(),
        }
    }

    /// Builds the state with whichever remote services `config` has keys for.
    pub fn from_config(storage: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        let mut state = Self::new(
            storage,
            config.ledger.clone(),
            config.analytics.initial_capital,
        );
        if let Some(provider) = FirebaseIdentity::new(&config.identity) {
            state = state.with_identity(Arc::new(provider));
        }
        if let Some(analyzer) = GeminiAnalyzer::new(&config.insights) {
            state = state.with_insights(Arc::new(analyzer));
        }
        state
    }

    pub fn with_identity(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    pub fn with_insights(mut self, analyzer: Arc<dyn PatternAnalyzer>) -> Self {
        self.insights = Some(analyzer);
        self
    }
}

/// Assembles every route with its middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    let public = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/signup", post(handlers::sign_up))
        .route("/api/auth/login", post(handlers::sign_in));

    let journal = Router::new()
        .route("/api/auth/logout", post(handlers::sign_out))
        .route("/api/trades", get(handlers::list_trades).post(handlers::create_trade))
        .route("/api/trades/:id", get(handlers::get_trade).delete(handlers::delete_trade))
        .route("/api/notes", get(handlers::list_notes).post(handlers::create_note))
        .route("/api/notes/:id", put(handlers::update_note).delete(handlers::delete_note))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/stats/daily", get(handlers::get_daily_pnl))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/ai-insights", post(handlers::analyze_trades))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .merge(public)
        .merge(journal)
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

/// The main function to configure and run the web server.
///
/// Tracing must already be initialized by the caller.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let addr = config.server.socket_addr()?;

    let storage = database::open_store(&config.storage).await?;
    tracing::info!(storage = %storage.describe(), "Storage opened.");

    let state = Arc::new(AppState::from_config(storage, config));
    tracing::info!(
        identity = state.identity.is_some(),
        insights = state.insights.is_some(),
        "Remote services configured."
    );
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server started and listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
