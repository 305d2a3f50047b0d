use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::login_page))
        .route("/login", post(handlers::login_submit))
        .route("/logout", post(handlers::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route("/teachers", post(handlers::teacher_add))
        .route("/teachers/:id/update", post(handlers::teacher_update))
        .route("/teachers/:id/delete", post(handlers::teacher_delete))
        .route("/students", post(handlers::student_add))
        .route("/students/:id/update", post(handlers::student_update))
        .route("/students/:id/delete", post(handlers::student_delete))
        .route("/marks", post(handlers::mark_add))
        .route("/attendance", post(handlers::attendance_add))
        .route("/report", get(handlers::report_page))
        .route("/report/for/:id", get(handlers::report_preselect))
        .route("/report/generate", post(handlers::report_generate))
        .with_state(state)
}
