use crate::modules::students::controller::{
    add_student, get_student, get_students, set_student_status, update_student,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_students).post(add_student))
        .route("/{id}", get(get_student).put(update_student))
        .route("/{id}/status", post(set_student_status))
}
