use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/auth/signup", post(handlers::sign_up))
        .route("/api/auth/signin", post(handlers::sign_in))
        .route("/api/auth/signout", post(handlers::sign_out))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/api/tasks/:id/complete", post(handlers::complete_task))
        .route("/api/tasks/:id", delete(handlers::delete_task))
        .route("/api/progress", get(handlers::get_progress))
        .route("/api/progress/chart", get(handlers::get_progress_chart))
        .route("/api/rewards", get(handlers::get_rewards))
        .route(
            "/api/journal",
            get(handlers::list_journal).post(handlers::create_journal),
        )
        .route("/api/journal/:id", delete(handlers::delete_journal))
        .route("/api/wins", get(handlers::list_wins).post(handlers::create_win))
        .route("/api/wins/:id", delete(handlers::delete_win))
        .route("/api/timer", get(handlers::get_timer))
        .route("/api/timer/start", post(handlers::start_timer))
        .route("/api/timer/pause", post(handlers::pause_timer))
        .route("/api/timer/reset", post(handlers::reset_timer))
        .route("/api/timer/settings", post(handlers::update_timer_settings))
        .with_state(state)
}
