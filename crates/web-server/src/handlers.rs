use crate::{error::AppError, journals::UserJournal, session::bearer_token, AppState};
use analytics::{DailyPnl, EquityPoint, TradeStats};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use core_types::{NewTradeForm, Note, NoteForm, SignInForm, SignUpForm, Trade};
use identity::AuthSession;
use insights::TradePattern;
use serde::Serialize;
use std::sync::Arc;

/// How many trades the dashboard lists.
pub const RECENT_TRADES: usize = 3;

/// What a successful sign-up or sign-in returns to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub uid: String,
    pub email: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: TradeStats,
    pub recent_trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub patterns: Vec<TradePattern>,
}

/// # GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

// --- Auth ---

/// # POST /api/auth/signup
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SignUpForm>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    form.check()?;
    let provider = state.identity.as_ref().ok_or(AppError::NotConfigured("identity"))?;
    let session = provider.sign_up(form.email.trim(), &form.password).await?;
    Ok((StatusCode::CREATED, Json(start_session(&state, session).await)))
}

/// # POST /api/auth/login
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SignInForm>,
) -> Result<Json<SessionResponse>, AppError> {
    form.check()?;
    let provider = state.identity.as_ref().ok_or(AppError::NotConfigured("identity"))?;
    let session = provider.sign_in(form.email.trim(), &form.password).await?;
    Ok(Json(start_session(&state, session).await))
}

/// # POST /api/auth/logout
/// Drops the caller's session. Answers 204 even when there was nothing to drop.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let Some(token) = bearer_token(&headers) else {
        return Ok(StatusCode::NO_CONTENT);
    };
    if let Some(session) = state.sessions.remove(token).await {
        if let Some(provider) = &state.identity {
            provider.sign_out(&session).await?;
        }
        tracing::info!(uid = %session.uid, "Signed out.");
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn start_session(state: &AppState, session: AuthSession) -> SessionResponse {
    let uid = session.uid.clone();
    let email = session.email.clone();
    let expires_in = session.expires_in;
    let token = state.sessions.insert(session).await;
    SessionResponse {
        token,
        uid,
        email,
        expires_in,
    }
}

// --- Trades ---

/// # GET /api/trades
/// Newest first.
pub async fn list_trades(UserJournal(journal): UserJournal) -> Json<Vec<Trade>> {
    Json(journal.ledger().trades().await)
}

/// # POST /api/trades
pub async fn create_trade(
    UserJournal(journal): UserJournal,
    Json(form): Json<NewTradeForm>,
) -> Result<(StatusCode, Json<Trade>), AppError> {
    let trade = form.into_trade()?;
    journal.ledger().add_trade(trade.clone()).await;
    Ok((StatusCode::CREATED, Json(trade)))
}

/// # GET /api/trades/:id
pub async fn get_trade(
    Path(id): Path<String>,
    UserJournal(journal): UserJournal,
) -> Result<Json<Trade>, AppError> {
    journal
        .ledger()
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Trade {} not found", id)))
}

/// # DELETE /api/trades/:id
pub async fn delete_trade(Path(id): Path<String>, UserJournal(journal): UserJournal) -> StatusCode {
    journal.ledger().delete_trade(&id).await;
    StatusCode::NO_CONTENT
}

// --- Notes ---

/// # GET /api/notes
pub async fn list_notes(UserJournal(journal): UserJournal) -> Json<Vec<Note>> {
    Json(journal.notes().notes().await)
}

/// # POST /api/notes
pub async fn create_note(
    UserJournal(journal): UserJournal,
    Json(form): Json<NoteForm>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let note = form.into_note(chrono::Utc::now())?;
    journal.notes().add_note(note.clone()).await;
    Ok((StatusCode::CREATED, Json(note)))
}

/// # PUT /api/notes/:id
/// Replaces the note's content, keeping its id and creation time.
pub async fn update_note(
    Path(id): Path<String>,
    UserJournal(journal): UserJournal,
    Json(form): Json<NoteForm>,
) -> Result<Json<Note>, AppError> {
    let not_found = || AppError::NotFound(format!("Note {} not found", id));
    let existing = journal.notes().get(&id).await.ok_or_else(not_found)?;
    let note = form.into_replacement(&existing)?;
    // The note may have been deleted since it was read.
    if !journal.notes().update_note(note.clone()).await {
        return Err(not_found());
    }
    Ok(Json(note))
}

/// # DELETE /api/notes/:id
pub async fn delete_note(Path(id): Path<String>, UserJournal(journal): UserJournal) -> StatusCode {
    journal.notes().delete_note(&id).await;
    StatusCode::NO_CONTENT
}

// --- Analytics ---

/// # GET /api/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    UserJournal(journal): UserJournal,
) -> Result<Json<TradeStats>, AppError> {
    let trades = journal.ledger().trades().await;
    Ok(Json(state.analytics.calculate_stats(&trades)?))
}

/// # GET /api/stats/daily
/// Realized P/L per exit day, oldest first.
pub async fn get_daily_pnl(
    State(state): State<Arc<AppState>>,
    UserJournal(journal): UserJournal,
) -> Result<Json<Vec<DailyPnl>>, AppError> {
    let trades = journal.ledger().trades().await;
    Ok(Json(state.analytics.process_trade_data(&trades)?))
}

/// # GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    UserJournal(journal): UserJournal,
) -> Result<Json<DashboardResponse>, AppError> {
    let trades = journal.ledger().trades().await;
    let stats = state.analytics.calculate_stats(&trades)?;
    let equity_curve = state
        .analytics
        .equity_curve(&trades, state.initial_capital)?;
    let recent_trades = journal.ledger().recent(RECENT_TRADES).await;
    Ok(Json(DashboardResponse {
        stats,
        recent_trades,
        equity_curve,
    }))
}

/// # POST /api/ai-insights
/// Asks the generative model for recurring patterns in the whole ledger.
pub async fn analyze_trades(
    State(state): State<Arc<AppState>>,
    UserJournal(journal): UserJournal,
) -> Result<Json<InsightsResponse>, AppError> {
    let analyzer = state.insights.as_ref().ok_or(AppError::NotConfigured("insights"))?;
    let trades = journal.ledger().trades().await;
    if trades.is_empty() {
        return Ok(Json(InsightsResponse { patterns: Vec::new() }));
    }
    let patterns = analyzer.analyze_trades(&trades).await?;
    Ok(Json(InsightsResponse { patterns }))
}
