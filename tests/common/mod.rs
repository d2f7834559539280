//! Shared test fixtures: an in-memory `StudentStore` and helpers for
//! building the app and issuing tokens.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use rollcall::config::cors::CorsConfig;
use rollcall::config::jwt::JwtConfig;
use rollcall::modules::students::model::{NewStudent, Student, StudentQuery, StudentUpdate};
use rollcall::modules::students::service::StudentStore;
use rollcall::router::init_router;
use rollcall::state::AppState;
use rollcall::utils::errors::AppError;
use rollcall::utils::jwt::create_access_token;

/// In-memory stand-in for the persistence collaborator. Records the last
/// list query it received so tests can assert on defaulting and filter
/// forwarding.
#[derive(Default)]
pub struct MemoryStore {
    pub students: Mutex<Vec<Student>>,
    pub last_query: Mutex<Option<StudentQuery>>,
}

impl MemoryStore {
    fn next_id(&self) -> i64 {
        let students = self.students.lock().unwrap();
        students.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn get_all_students(&self, query: StudentQuery) -> Result<Vec<Student>, AppError> {
        let students = self.students.lock().unwrap();
        let matches = students
            .iter()
            .filter(|s| {
                query
                    .name
                    .as_ref()
                    .is_none_or(|n| s.name.to_lowercase().contains(&n.to_lowercase()))
                    && query.class_name.as_ref().is_none_or(|c| &s.class_name == c)
                    && query
                        .section
                        .as_ref()
                        .is_none_or(|sec| s.section.as_ref() == Some(sec))
                    && query.roll.is_none_or(|r| s.roll == Some(r))
            })
            .cloned()
            .collect();
        *self.last_query.lock().unwrap() = Some(query);
        Ok(matches)
    }

    async fn add_new_student(
        &self,
        student: NewStudent,
        reporter_id: i64,
    ) -> Result<Student, AppError> {
        let now = Utc::now();
        let created = Student {
            id: self.next_id(),
            name: student.name,
            email: student.email,
            phone: student.phone,
            gender: student.gender,
            dob: student.dob,
            class_name: student.class_name,
            section: student.section,
            roll: student.roll,
            father_name: student.father_name,
            father_phone: student.father_phone,
            mother_name: student.mother_name,
            mother_phone: student.mother_phone,
            guardian_name: student.guardian_name,
            guardian_phone: student.guardian_phone,
            relation_of_guardian: student.relation_of_guardian,
            current_address: student.current_address,
            permanent_address: student.permanent_address,
            admission_date: student.admission_date,
            reporter_id,
            reviewer_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.students.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn get_student_detail(&self, id: i64) -> Result<Student, AppError> {
        self.students
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Student not found"))
    }

    async fn update_student(
        &self,
        id: i64,
        changes: StudentUpdate,
        reporter_id: i64,
    ) -> Result<Student, AppError> {
        let mut students = self.students.lock().unwrap();
        let student = students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("Student not found"))?;

        if let Some(name) = changes.name {
            student.name = name;
        }
        if let Some(email) = changes.email {
            student.email = email;
        }
        if let Some(phone) = changes.phone {
            student.phone = Some(phone);
        }
        if let Some(gender) = changes.gender {
            student.gender = Some(gender);
        }
        if let Some(dob) = changes.dob {
            student.dob = dob;
        }
        if let Some(class_name) = changes.class_name {
            student.class_name = class_name;
        }
        if let Some(section) = changes.section {
            student.section = Some(section);
        }
        if let Some(roll) = changes.roll {
            student.roll = Some(roll);
        }
        student.reporter_id = reporter_id;
        student.updated_at = Utc::now();
        Ok(student.clone())
    }

    async fn set_student_status(
        &self,
        id: i64,
        status: bool,
        reviewer_id: i64,
    ) -> Result<Student, AppError> {
        let mut students = self.students.lock().unwrap();
        let student = students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("Student not found"))?;
        student.is_active = status;
        student.reviewer_id = Some(reviewer_id);
        student.updated_at = Utc::now();
        Ok(student.clone())
    }
}

pub fn setup_test_app(store: Arc<MemoryStore>) -> Router {
    let state = AppState {
        store,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    };
    init_router(state)
}

pub fn auth_token(user_id: i64, role: &str) -> String {
    create_access_token(user_id, "tester@example.com", role, &JwtConfig::from_env()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response: Response<Body> = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
