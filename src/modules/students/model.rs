//! Student entity and the normalized payloads produced by validation.
//!
//! Raw request DTOs live in [`super::schema`]; the types here are what the
//! handlers and the persistence collaborator exchange. Identity fields
//! (`reporter_id`, `reviewer_id`) are never part of a client payload; they
//! are threaded separately from the authenticated session.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A student record as returned by the persistence collaborator.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: NaiveDate,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: Option<String>,
    pub roll: Option<i32>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub reporter_id: i64,
    pub reviewer_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized output of the create schema. Required fields are guaranteed
/// present and every value is already coerced to its typed form.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: NaiveDate,
    pub class_name: String,
    pub section: Option<String>,
    pub roll: Option<i32>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub admission_date: Option<NaiveDate>,
}

/// Normalized output of the update schema. Everything is optional; absent
/// fields are left untouched by the store. An all-`None` update is accepted
/// as a no-op payload.
#[derive(Debug, Clone, Default)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub class_name: Option<String>,
    pub section: Option<String>,
    pub roll: Option<i32>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub admission_date: Option<NaiveDate>,
}

/// Normalized output of the query schema with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentQuery {
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub section: Option<String>,
    pub roll: Option<i32>,
    pub page: i64,
    pub limit: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl StudentQuery {
    pub fn offset(&self) -> i64 {
        // `page` has no upper bound, so the multiplication saturates
        // rather than overflowing on absurd page numbers.
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// The closed set of sortable fields. Holding these as an enum (never client
/// text) is what lets the store interpolate the column name safely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Email,
    Class,
    Section,
    Roll,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "class" => Some(Self::Class),
            "section" => Some(Self::Section),
            "roll" => Some(Self::Roll),
            _ => None,
        }
    }

    pub fn as_column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Class => "class_name",
            Self::Section => "section",
            Self::Roll => "roll",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
