use crate::aggregate::{aggregate, chart_series, paginate};
use crate::auth::User;
use crate::errors::{AppError, TrackerError};
use crate::models::{
    Category, ChartSeries, CompleteTaskResponse, CreateJournalRequest, CreateTaskRequest,
    CreateWinRequest, CredentialsRequest, DailyXpRecord, JournalEntry, ProgressPage,
    ProgressQuery, SessionResponse, StatSheet, Task, TimerSettingsRequest, Win,
};
use crate::rewards::{RewardsResponse, rewards};
use crate::session::Session;
use crate::state::AppState;
use crate::timer::TimerView;
use crate::ui::render_index;
use crate::{journal, wins};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::Html,
};
use chrono::Utc;
use tokio::sync::OwnedMutexGuard;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.config))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let Json(payload) = payload?;
    let (token, user) = state.auth.sign_up(&payload.email, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(session_response(token, user))))
}

pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let Json(payload) = payload?;
    let (token, user) = state.auth.sign_in(&payload.email, &payload.password).await?;
    Ok(Json(session_response(token, user)))
}

pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers)?;
    state.auth.sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatSheet>, AppError> {
    let session = load_session(&state, &headers).await?;
    Ok(Json(session.stats))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>, AppError> {
    let session = load_session(&state, &headers).await?;
    Ok(Json(session.tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let Json(payload) = payload?;
    let category: Category = payload
        .category
        .parse()
        .map_err(|err: crate::models::UnknownCategory| AppError::bad_request(err.to_string()))?;

    let (_guard, mut session) = locked_session(&state, &headers).await?;
    let task = session
        .create_task(&state.store, &payload.name, category, payload.xp)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn complete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CompleteTaskResponse>, AppError> {
    let (_guard, mut session) = locked_session(&state, &headers).await?;
    let completed = session.complete_task(&state.store, &id).await?;
    let task = match completed {
        Some(task) => task,
        // already completed: nothing changes
        None => session
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or(TrackerError::NotFound { kind: "task", id })?,
    };

    Ok(Json(CompleteTaskResponse {
        task,
        stats: session.stats,
    }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let (_guard, mut session) = locked_session(&state, &headers).await?;
    session.delete_task(&state.store, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<ProgressPage>, AppError> {
    let records = daily_records(&state, &headers).await?;
    Ok(Json(paginate(&records, query.page, state.config.page_size)))
}

pub async fn get_progress_chart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ChartSeries>, AppError> {
    let records = daily_records(&state, &headers).await?;
    Ok(Json(chart_series(&records, state.config.chart_step)))
}

pub async fn get_rewards(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RewardsResponse>, AppError> {
    let session = load_session(&state, &headers).await?;
    Ok(Json(rewards(&session.stats, &session.tasks)))
}

pub async fn list_journal(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(journal::list(&state.store, &user.uid).await?))
}

pub async fn create_journal(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateJournalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JournalEntry>), AppError> {
    let Json(payload) = payload?;
    let user = authenticate(&state, &headers).await?;
    let entry = journal::create(&state.store, &user.uid, &payload.content, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = authenticate(&state, &headers).await?;
    journal::delete(&state.store, &user.uid, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_wins(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Win>>, AppError> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(wins::list(&state.store, &user.uid).await?))
}

pub async fn create_win(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateWinRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Win>), AppError> {
    let Json(payload) = payload?;
    let user = authenticate(&state, &headers).await?;
    let win = wins::create(
        &state.store,
        &user.uid,
        &payload.title,
        &payload.description,
        payload.image,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(win)))
}

pub async fn delete_win(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = authenticate(&state, &headers).await?;
    wins::delete(&state.store, &user.uid, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_timer(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TimerView>, AppError> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(state.timer_for(&user.uid).await.view().await))
}

pub async fn start_timer(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TimerView>, AppError> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(state.timer_for(&user.uid).await.start().await))
}

pub async fn pause_timer(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TimerView>, AppError> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(state.timer_for(&user.uid).await.pause().await))
}

pub async fn reset_timer(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TimerView>, AppError> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(state.timer_for(&user.uid).await.reset().await))
}

pub async fn update_timer_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TimerSettingsRequest>, JsonRejection>,
) -> Result<Json<TimerView>, AppError> {
    let Json(payload) = payload?;
    if payload.work_minutes == Some(0) || payload.break_minutes == Some(0) {
        return Err(AppError::bad_request("timer durations must be at least one minute"));
    }
    let user = authenticate(&state, &headers).await?;
    let runner = state.timer_for(&user.uid).await;
    Ok(Json(
        runner
            .update_settings(payload.work_minutes, payload.break_minutes)
            .await,
    ))
}

async fn daily_records(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Vec<DailyXpRecord>, AppError> {
    let session = load_session(state, headers).await?;
    Ok(aggregate(
        &session.tasks,
        state.config.window_start,
        state.config.window_end,
    ))
}

async fn load_session(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let user = authenticate(state, headers).await?;
    Ok(Session::load(&state.store, &user.uid).await)
}

async fn locked_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(OwnedMutexGuard<()>, Session), AppError> {
    let user = authenticate(state, headers).await?;
    let guard = state.lock_user(&user.uid).await;
    Ok((guard, Session::load(&state.store, &user.uid).await))
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer_token(headers)?;
    Ok(state.auth.current_user(token).await?)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("missing bearer token"))
}

fn session_response(token: String, user: User) -> SessionResponse {
    SessionResponse {
        token,
        uid: user.uid,
        email: user.email,
    }
}
