//! Persistence collaborator for student records.
//!
//! Handlers talk to the [`StudentStore`] trait only; the Postgres
//! implementation lives behind it. The store contract accepts the full
//! validated query for listing (filters, pagination, and sort), so the
//! pagination/sort fields validated by the query schema do take effect here.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::modules::students::model::{NewStudent, Student, StudentQuery, StudentUpdate};
use crate::utils::errors::AppError;

const STUDENT_COLUMNS: &str = "id, name, email, phone, gender, dob, class_name, section, roll, \
     father_name, father_phone, mother_name, mother_phone, guardian_name, guardian_phone, \
     relation_of_guardian, current_address, permanent_address, admission_date, \
     reporter_id, reviewer_id, is_active, created_at, updated_at";

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn get_all_students(&self, query: StudentQuery) -> Result<Vec<Student>, AppError>;

    async fn add_new_student(
        &self,
        student: NewStudent,
        reporter_id: i64,
    ) -> Result<Student, AppError>;

    async fn get_student_detail(&self, id: i64) -> Result<Student, AppError>;

    async fn update_student(
        &self,
        id: i64,
        changes: StudentUpdate,
        reporter_id: i64,
    ) -> Result<Student, AppError>;

    async fn set_student_status(
        &self,
        id: i64,
        status: bool,
        reviewer_id: i64,
    ) -> Result<Student, AppError>;
}

pub struct PgStudentStore {
    db: PgPool,
}

impl PgStudentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    #[instrument(skip(self))]
    async fn get_all_students(&self, query: StudentQuery) -> Result<Vec<Student>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {STUDENT_COLUMNS} FROM students WHERE 1=1"));

        if let Some(name) = &query.name {
            builder.push(" AND name ILIKE ");
            builder.push_bind(format!("%{name}%"));
        }
        if let Some(class_name) = &query.class_name {
            builder.push(" AND class_name = ");
            builder.push_bind(class_name.clone());
        }
        if let Some(section) = &query.section {
            builder.push(" AND section = ");
            builder.push_bind(section.clone());
        }
        if let Some(roll) = query.roll {
            builder.push(" AND roll = ");
            builder.push_bind(roll);
        }

        // sort_by/sort_order come from closed enums, never client text.
        builder.push(" ORDER BY ");
        builder.push(query.sort_by.as_column());
        builder.push(" ");
        builder.push(query.sort_order.as_sql());
        builder.push(" LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset());

        let students = builder
            .build_query_as::<Student>()
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch students")
            .map_err(AppError::database)?;

        Ok(students)
    }

    #[instrument(skip(self, student))]
    async fn add_new_student(
        &self,
        student: NewStudent,
        reporter_id: i64,
    ) -> Result<Student, AppError> {
        let sql = format!(
            "INSERT INTO students (name, email, phone, gender, dob, class_name, section, roll, \
             father_name, father_phone, mother_name, mother_phone, guardian_name, guardian_phone, \
             relation_of_guardian, current_address, permanent_address, admission_date, reporter_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
             RETURNING {STUDENT_COLUMNS}"
        );
        let email = student.email.clone();

        let created = sqlx::query_as::<_, Student>(&sql)
            .bind(student.name)
            .bind(student.email)
            .bind(student.phone)
            .bind(student.gender)
            .bind(student.dob)
            .bind(student.class_name)
            .bind(student.section)
            .bind(student.roll)
            .bind(student.father_name)
            .bind(student.father_phone)
            .bind(student.mother_name)
            .bind(student.mother_phone)
            .bind(student.guardian_name)
            .bind(student.guardian_phone)
            .bind(student.relation_of_guardian)
            .bind(student.current_address)
            .bind(student.permanent_address)
            .bind(student.admission_date)
            .bind(reporter_id)
            .fetch_one(&self.db)
            .await
            .map_err(|e| duplicate_email_or_database(e, &email))?;

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_student_detail(&self, id: i64) -> Result<Student, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");

        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch student by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found("Student not found"))
    }

    #[instrument(skip(self, changes))]
    async fn update_student(
        &self,
        id: i64,
        changes: StudentUpdate,
        reporter_id: i64,
    ) -> Result<Student, AppError> {
        let sql = format!(
            "UPDATE students SET \
             name = COALESCE($2, name), email = COALESCE($3, email), \
             phone = COALESCE($4, phone), gender = COALESCE($5, gender), \
             dob = COALESCE($6, dob), class_name = COALESCE($7, class_name), \
             section = COALESCE($8, section), roll = COALESCE($9, roll), \
             father_name = COALESCE($10, father_name), father_phone = COALESCE($11, father_phone), \
             mother_name = COALESCE($12, mother_name), mother_phone = COALESCE($13, mother_phone), \
             guardian_name = COALESCE($14, guardian_name), guardian_phone = COALESCE($15, guardian_phone), \
             relation_of_guardian = COALESCE($16, relation_of_guardian), \
             current_address = COALESCE($17, current_address), \
             permanent_address = COALESCE($18, permanent_address), \
             admission_date = COALESCE($19, admission_date), \
             reporter_id = $20, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {STUDENT_COLUMNS}"
        );
        let email = changes.email.clone();

        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.email)
            .bind(changes.phone)
            .bind(changes.gender)
            .bind(changes.dob)
            .bind(changes.class_name)
            .bind(changes.section)
            .bind(changes.roll)
            .bind(changes.father_name)
            .bind(changes.father_phone)
            .bind(changes.mother_name)
            .bind(changes.mother_phone)
            .bind(changes.guardian_name)
            .bind(changes.guardian_phone)
            .bind(changes.relation_of_guardian)
            .bind(changes.current_address)
            .bind(changes.permanent_address)
            .bind(changes.admission_date)
            .bind(reporter_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| duplicate_email_or_database(e, email.as_deref().unwrap_or("")))?
            .ok_or_else(|| AppError::not_found("Student not found"))
    }

    #[instrument(skip(self))]
    async fn set_student_status(
        &self,
        id: i64,
        status: bool,
        reviewer_id: i64,
    ) -> Result<Student, AppError> {
        let sql = format!(
            "UPDATE students SET is_active = $2, reviewer_id = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {STUDENT_COLUMNS}"
        );

        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .bind(status)
            .bind(reviewer_id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to update student status")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found("Student not found"))
    }
}

fn duplicate_email_or_database(e: sqlx::Error, email: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::bad_request(format!("Student with email {email} already exists"));
        }
    }
    AppError::database(anyhow::Error::from(e))
}
