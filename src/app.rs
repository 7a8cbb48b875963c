use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/session", get(handlers::get_session))
        .route("/api/session/reset", post(handlers::reset_session))
        .route("/api/profile", post(handlers::save_profile))
        .route("/api/plan/generate", post(handlers::generate_plan))
        .route("/api/plan/adjust", post(handlers::adjust_plan))
        .route("/api/plan/history", get(handlers::plan_history))
        .route(
            "/api/reminders",
            get(handlers::list_reminders).post(handlers::add_reminder),
        )
        .route("/api/reminders/preview", get(handlers::reminder_preview))
        .route(
            "/api/reminders/:index",
            put(handlers::update_reminder).delete(handlers::delete_reminder),
        )
        .route(
            "/api/checkins",
            get(handlers::list_checkins).post(handlers::record_checkin),
        )
        .route("/api/checkins/summary", get(handlers::checkin_summary))
        .route("/api/checkins/chart", get(handlers::checkin_chart))
        .route("/api/movies/recommend", post(handlers::recommend_movies))
        .route("/api/movies/exclude", post(handlers::exclude_movie))
        .route("/api/movies/:id", get(handlers::movie_details))
        .route("/api/weather", get(handlers::weather))
        .route("/api/creatures/:id", get(handlers::creature))
        .with_state(state)
}
