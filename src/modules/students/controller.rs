//! Request handlers for the student endpoints.
//!
//! Handlers are thin by contract: inputs arrive already validated and
//! coerced by the adapters, the acting identity comes from the session
//! claims, and the store result is relayed verbatim.

use axum::{Json, extract::State};
use serde_json::json;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::AdminUser;
use crate::modules::students::model::Student;
use crate::modules::students::schema::{
    CreateStudentDto, ListStudentsDto, StatusDto, StudentFields, UpdateStudentDto,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::{StudentId, ValidatedJson, ValidatedQuery};

#[utoipa::path(
    get,
    path = "/api/students",
    params(ListStudentsDto),
    responses(
        (status = 200, description = "Filtered student list"),
        (status = 400, description = "Invalid filter, pagination, or sort parameter"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip_all)]
pub async fn get_students(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedQuery(query): ValidatedQuery<ListStudentsDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    let students = state.store.get_all_students(query).await?;
    Ok(Json(json!({ "students": students })))
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = StudentFields,
    responses(
        (status = 200, description = "Student created", body = Student),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip_all)]
pub async fn add_student(
    State(state): State<AppState>,
    AdminUser(auth_user): AdminUser,
    ValidatedJson(new_student): ValidatedJson<CreateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let reporter_id = auth_user.user_id()?;

    let student = state.store.add_new_student(new_student, reporter_id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student detail", body = Student),
        (status = 400, description = "Invalid student ID"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip_all)]
pub async fn get_student(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    StudentId(id): StudentId,
) -> Result<Json<Student>, AppError> {
    let student = state.store.get_student_detail(id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = StudentFields,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Validation failed or invalid student ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip_all)]
pub async fn update_student(
    State(state): State<AppState>,
    AdminUser(auth_user): AdminUser,
    StudentId(id): StudentId,
    ValidatedJson(changes): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let reporter_id = auth_user.user_id()?;

    let student = state.store.update_student(id, changes, reporter_id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    post,
    path = "/api/students/{id}/status",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Status updated", body = Student),
        (status = 400, description = "Invalid student ID or non-boolean status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip_all)]
pub async fn set_student_status(
    State(state): State<AppState>,
    AdminUser(auth_user): AdminUser,
    StudentId(id): StudentId,
    ValidatedJson(status): ValidatedJson<StatusDto>,
) -> Result<Json<Student>, AppError> {
    let reviewer_id = auth_user.user_id()?;

    let student = state
        .store
        .set_student_status(id, status, reviewer_id)
        .await?;
    Ok(Json(student))
}
