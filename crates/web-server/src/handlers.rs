use crate::{error::AppError, AppState};
use analytics::StatSummary;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{
    BattingLine, BattingRecord, BillingCycle, CoreError, FieldPosition, PitchingLine,
    PitchingRecord, Profile, Subscription,
};
use serde::Deserialize;
use std::sync::Arc;
use subscriptions::{AccessStatus, PlanOffer};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// One game's batting line as submitted by the player.
#[derive(Debug, Deserialize)]
pub struct BattingEntry {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub line: BattingLine,
}

#[derive(Debug, Deserialize)]
pub struct PitchingEntry {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub line: PitchingLine,
}

/// Replaces the editable profile fields. An omitted `name` keeps the current one.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub position: Option<FieldPosition>,
    pub team: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub cycle: BillingCycle,
    pub checkout_id: String,
}

// --- Stat records ---

/// # POST /api/users/:user_id/batting
pub async fn create_batting(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BattingEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<BattingRecord>), AppError> {
    let Path(user_id) = path?;
    let Json(entry) = payload?;
    entry.line.validate()?;

    let record = BattingRecord::new(user_id, entry.date, entry.line);
    state.store.save_batting(&record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// # GET /api/users/:user_id/batting
pub async fn list_batting(
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<DateQuery>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BattingRecord>>, AppError> {
    let Path(user_id) = path?;
    let Query(query) = query?;
    let records = state.store.batting_for(user_id, query.date).await?;
    Ok(Json(records))
}

/// # POST /api/users/:user_id/pitching
pub async fn create_pitching(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PitchingEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<PitchingRecord>), AppError> {
    let Path(user_id) = path?;
    let Json(entry) = payload?;
    entry.line.validate()?;

    let record = PitchingRecord::new(user_id, entry.date, entry.line);
    state.store.save_pitching(&record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// # GET /api/users/:user_id/pitching
pub async fn list_pitching(
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<DateQuery>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PitchingRecord>>, AppError> {
    let Path(user_id) = path?;
    let Query(query) = query?;
    let records = state.store.pitching_for(user_id, query.date).await?;
    Ok(Json(records))
}

/// # GET /api/users/:user_id/summary
/// Totals and rate stats, either career-to-date or for the `date` given.
pub async fn get_summary(
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<DateQuery>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatSummary>, AppError> {
    let Path(user_id) = path?;
    let Query(query) = query?;
    let summary = summarize(&state, user_id, query.date).await?;
    Ok(Json(summary))
}

async fn summarize(
    state: &AppState,
    user_id: Uuid,
    date: Option<NaiveDate>,
) -> Result<StatSummary, AppError> {
    let batting = state.store.batting_for(user_id, date).await?;
    let pitching = state.store.pitching_for(user_id, date).await?;
    Ok(state.calculator.summarize(&batting, &pitching, date))
}

// --- Profile ---

/// # GET /api/users/:user_id/profile
/// First access creates a default profile.
pub async fn get_profile(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Profile>, AppError> {
    let Path(user_id) = path?;
    let profile = profile_or_default(&state, user_id).await?;
    Ok(Json(profile))
}

/// # PUT /api/users/:user_id/profile
pub async fn update_profile(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Profile>, AppError> {
    let Path(user_id) = path?;
    let Json(update) = payload?;
    let mut profile = profile_or_default(&state, user_id).await?;

    if let Some(name) = update.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("name".to_string(), "cannot be blank".to_string()).into());
        }
        profile.name = name.to_string();
    }
    profile.position = update.position;
    profile.team = update.team;
    profile.photo_url = update.photo_url;
    profile.updated_at = Utc::now();

    state.store.upsert_profile(&profile).await?;
    Ok(Json(profile))
}

async fn profile_or_default(state: &AppState, user_id: Uuid) -> Result<Profile, AppError> {
    if let Some(profile) = state.store.get_profile(user_id).await? {
        return Ok(profile);
    }
    let profile = Profile::new(user_id, Profile::DEFAULT_NAME);
    state.store.upsert_profile(&profile).await?;
    tracing::info!(%user_id, "Created default profile.");
    Ok(profile)
}

// --- Subscription ---

/// # GET /api/plans
pub async fn get_plans(State(state): State<Arc<AppState>>) -> Json<Vec<PlanOffer>> {
    Json(state.subscriptions.plans())
}

/// # GET /api/users/:user_id/subscription
/// A user without a subscription starts the free trial here.
pub async fn get_subscription(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccessStatus>, AppError> {
    let Path(user_id) = path?;
    let now = Utc::now();
    let sub = current_subscription(&state, user_id, now).await?;
    Ok(Json(state.subscriptions.access(&sub, now)))
}

/// # POST /api/users/:user_id/subscription/activate
pub async fn activate_subscription(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ActivateRequest>, JsonRejection>,
) -> Result<Json<AccessStatus>, AppError> {
    let Path(user_id) = path?;
    let Json(request) = payload?;
    let now = Utc::now();
    let sub = current_subscription(&state, user_id, now).await?;

    // A checkout that already paid for this subscription is acknowledged, not charged again.
    if sub.checkout_id.as_deref() == Some(request.checkout_id.trim()) {
        tracing::info!(%user_id, checkout_id = %request.checkout_id, "Checkout already applied.");
        return Ok(Json(state.subscriptions.access(&sub, now)));
    }

    let (upgraded, payment) =
        state
            .subscriptions
            .activate(&sub, request.cycle, &request.checkout_id, now)?;
    state.store.save_activation(&upgraded, &payment).await?;

    Ok(Json(state.subscriptions.access(&upgraded, now)))
}

/// # POST /api/users/:user_id/subscription/cancel
pub async fn cancel_subscription(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccessStatus>, AppError> {
    let Path(user_id) = path?;
    let now = Utc::now();
    let sub = current_subscription(&state, user_id, now).await?;

    let cancelled = state.subscriptions.cancel(&sub, now)?;
    state.store.save_subscription(&cancelled).await?;
    tracing::info!(%user_id, subscription_id = %cancelled.id, "Subscription cancelled.");

    Ok(Json(state.subscriptions.access(&cancelled, now)))
}

/// Loads the user's latest subscription, starting a trial if there is none
/// and persisting the expiry of a lapsed one.
async fn current_subscription(
    state: &AppState,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Subscription, AppError> {
    let sub = match state.store.latest_subscription(user_id).await? {
        Some(sub) => sub,
        None => {
            let trial = state.subscriptions.start_trial(user_id, now);
            state.store.save_subscription(&trial).await?;
            trial
        }
    };

    match state.subscriptions.expire_if_lapsed(&sub, now) {
        Some(expired) => {
            state.store.save_subscription(&expired).await?;
            tracing::info!(%user_id, subscription_id = %expired.id, "Subscription expired.");
            Ok(expired)
        }
        None => Ok(sub),
    }
}

// --- Report ---

/// # GET /api/users/:user_id/report
/// The printable report as a text download. Premium only.
pub async fn get_report(
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<DateQuery>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let Path(user_id) = path?;
    let Query(query) = query?;
    let now = Utc::now();
    let sub = current_subscription(&state, user_id, now).await?;
    if !state.subscriptions.has_premium_access(&sub, now) {
        return Err(AppError::PremiumRequired);
    }

    let profile = profile_or_default(&state, user_id).await?;
    let summary = summarize(&state, user_id, query.date).await?;
    let body = reporter::render_report(&profile, &summary, now);

    let scope = query
        .date
        .map_or_else(|| "all".to_string(), |d| d.format("%Y-%m-%d").to_string());
    let disposition = format!("attachment; filename=\"baseball-stats-{scope}.txt\"");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
