use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/subjects", post(handlers::add_subject_form))
        .route("/subjects/:id/:action", post(handlers::subject_action_form))
        .route(
            "/api/subjects",
            get(handlers::list_subjects).post(handlers::add_subject),
        )
        .route(
            "/api/subjects/:id",
            put(handlers::edit_subject).delete(handlers::delete_subject),
        )
        .route("/api/subjects/:id/present", post(handlers::mark_present))
        .route("/api/subjects/:id/absent", post(handlers::mark_absent))
        .route("/api/subjects/:id/undo", post(handlers::undo))
        .route("/api/subjects/:id/target", put(handlers::set_target))
        .route("/api/subjects/:id/move", post(handlers::move_subject))
        .route("/api/history", get(handlers::get_history))
        .with_state(state)
}
