//! Request schemas for the student endpoints.
//!
//! Each schema is a raw, permissively-deserialized DTO plus a [`Schema`]
//! implementation that checks every field against the shared rule library
//! and produces the normalized typed payload. Create and update share one
//! raw field struct by composition; they differ only in which fields are
//! mandatory. Violations are collected in field declaration order so the
//! formatter can report them deterministically.

use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::modules::students::model::{
    NewStudent, SortField, SortOrder, StudentQuery, StudentUpdate,
};
use crate::modules::students::rules;

const GENDERS: &[&str] = &["Male", "Female", "Other"];

/// A single failed field check. The `field` is the wire name.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// One violation surfaces its message verbatim; several are folded into a
/// single "Validation failed" line, preserving discovery order.
pub fn format_violations(violations: &[Violation]) -> String {
    match violations {
        [only] => only.message.clone(),
        many => format!(
            "Validation failed: {}",
            many.iter()
                .map(|v| format!("{}: {}", v.field, v.message))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// A request schema: consumes the raw DTO and yields the normalized value,
/// or every violation found.
pub trait Schema {
    type Output;

    fn validate(self) -> Result<Self::Output, Vec<Violation>>;
}

/// Raw student fields as they appear on the wire. Everything is optional at
/// this layer; requiredness is a per-schema decision made in `validate`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub section: Option<String>,
    pub roll: Option<i64>,
    pub father_name: Option<String>,
    pub father_phone: Option<String>,
    pub mother_name: Option<String>,
    pub mother_phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation_of_guardian: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub admission_date: Option<String>,
}

/// Checked results for the fields declared after `class`, all of which are
/// optional in every schema.
struct OptionalFields {
    section: Option<String>,
    roll: Option<i32>,
    father_name: Option<String>,
    father_phone: Option<String>,
    mother_name: Option<String>,
    mother_phone: Option<String>,
    guardian_name: Option<String>,
    guardian_phone: Option<String>,
    relation_of_guardian: Option<String>,
    current_address: Option<String>,
    permanent_address: Option<String>,
    admission_date: Option<chrono::NaiveDate>,
}

/// Run a rule over an optional field: absent passes, present-but-malformed
/// records a violation.
fn check<T>(
    out: &mut Vec<Violation>,
    field: &'static str,
    value: Option<&str>,
    rule: impl FnOnce(&str) -> Result<T, String>,
) -> Option<T> {
    let raw = value?;
    match rule(raw) {
        Ok(normalized) => Some(normalized),
        Err(message) => {
            out.push(Violation::new(field, message));
            None
        }
    }
}

/// Like [`check`] but the field must be present. A missing field is a
/// distinct violation from a malformed one.
fn require<T>(
    out: &mut Vec<Violation>,
    field: &'static str,
    value: Option<&str>,
    missing: &str,
    rule: impl FnOnce(&str) -> Result<T, String>,
) -> Option<T> {
    match value {
        None => {
            out.push(Violation::new(field, missing));
            None
        }
        Some(raw) => match rule(raw) {
            Ok(normalized) => Some(normalized),
            Err(message) => {
                out.push(Violation::new(field, message));
                None
            }
        },
    }
}

impl StudentFields {
    /// Check `phone` and `gender` (declared between `email` and `dob`).
    fn check_contact(&self, out: &mut Vec<Violation>) -> (Option<String>, Option<String>) {
        let phone = check(out, "phone", self.phone.as_deref(), |s| {
            rules::phone(s, "phone number")
        });
        let gender = check(out, "gender", self.gender.as_deref(), |s| {
            rules::one_of(s, GENDERS, "Gender must be Male, Female, or Other")
        });
        (phone, gender)
    }

    /// Check every field declared after `class`, in declaration order.
    fn check_tail(&self, out: &mut Vec<Violation>) -> OptionalFields {
        let section = check(out, "section", self.section.as_deref(), |s| {
            rules::max_length(s, 10, "Section name cannot exceed 10 characters")
        });
        let roll = match self.roll {
            None => None,
            Some(raw) => match rules::roll_number(raw) {
                Ok(roll) => Some(roll),
                Err(message) => {
                    out.push(Violation::new("roll", message));
                    None
                }
            },
        };
        let father_name = check(out, "fatherName", self.father_name.as_deref(), |s| {
            rules::person_name(s, "Father's name")
        });
        let father_phone = check(out, "fatherPhone", self.father_phone.as_deref(), |s| {
            rules::phone(s, "father's phone number")
        });
        let mother_name = check(out, "motherName", self.mother_name.as_deref(), |s| {
            rules::person_name(s, "Mother's name")
        });
        let mother_phone = check(out, "motherPhone", self.mother_phone.as_deref(), |s| {
            rules::phone(s, "mother's phone number")
        });
        let guardian_name = check(out, "guardianName", self.guardian_name.as_deref(), |s| {
            rules::person_name(s, "Guardian's name")
        });
        let guardian_phone = check(out, "guardianPhone", self.guardian_phone.as_deref(), |s| {
            rules::phone(s, "guardian's phone number")
        });
        let relation_of_guardian = check(
            out,
            "relationOfGuardian",
            self.relation_of_guardian.as_deref(),
            |s| rules::max_length(s, 30, "Guardian relation cannot exceed 30 characters"),
        );
        let current_address = check(out, "currentAddress", self.current_address.as_deref(), |s| {
            rules::max_length(s, 200, "Current address cannot exceed 200 characters")
        });
        let permanent_address = check(
            out,
            "permanentAddress",
            self.permanent_address.as_deref(),
            |s| rules::max_length(s, 200, "Permanent address cannot exceed 200 characters"),
        );
        let admission_date = check(
            out,
            "admissionDate",
            self.admission_date.as_deref(),
            rules::admission_date,
        );

        OptionalFields {
            section,
            roll,
            father_name,
            father_phone,
            mother_name,
            mother_phone,
            guardian_name,
            guardian_phone,
            relation_of_guardian,
            current_address,
            permanent_address,
            admission_date,
        }
    }
}

/// Create schema: `name`, `email`, `class`, and `dob` are mandatory.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct CreateStudentDto(pub StudentFields);

impl Schema for CreateStudentDto {
    type Output = NewStudent;

    fn validate(self) -> Result<NewStudent, Vec<Violation>> {
        let fields = self.0;
        let mut out = Vec::new();

        let name = require(
            &mut out,
            "name",
            fields.name.as_deref(),
            "Student name is required",
            rules::student_name,
        );
        let email = require(
            &mut out,
            "email",
            fields.email.as_deref(),
            "Email is required",
            rules::email,
        );
        let (phone, gender) = fields.check_contact(&mut out);
        let dob = require(
            &mut out,
            "dob",
            fields.dob.as_deref(),
            "Date of birth is required",
            rules::date_of_birth,
        );
        let class_name = require(
            &mut out,
            "class",
            fields.class_name.as_deref(),
            "Class is required",
            rules::class_name,
        );
        let tail = fields.check_tail(&mut out);

        match (name, email, dob, class_name) {
            (Some(name), Some(email), Some(dob), Some(class_name)) if out.is_empty() => {
                Ok(NewStudent {
                    name,
                    email,
                    phone,
                    gender,
                    dob,
                    class_name,
                    section: tail.section,
                    roll: tail.roll,
                    father_name: tail.father_name,
                    father_phone: tail.father_phone,
                    mother_name: tail.mother_name,
                    mother_phone: tail.mother_phone,
                    guardian_name: tail.guardian_name,
                    guardian_phone: tail.guardian_phone,
                    relation_of_guardian: tail.relation_of_guardian,
                    current_address: tail.current_address,
                    permanent_address: tail.permanent_address,
                    admission_date: tail.admission_date,
                })
            }
            _ => Err(out),
        }
    }
}

/// Update schema: identical rules to create, but every field is optional.
/// A body with zero fields validates to an empty update.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct UpdateStudentDto(pub StudentFields);

impl Schema for UpdateStudentDto {
    type Output = StudentUpdate;

    fn validate(self) -> Result<StudentUpdate, Vec<Violation>> {
        let fields = self.0;
        let mut out = Vec::new();

        let name = check(&mut out, "name", fields.name.as_deref(), rules::student_name);
        let email = check(&mut out, "email", fields.email.as_deref(), rules::email);
        let (phone, gender) = fields.check_contact(&mut out);
        let dob = check(&mut out, "dob", fields.dob.as_deref(), rules::date_of_birth);
        let class_name = check(
            &mut out,
            "class",
            fields.class_name.as_deref(),
            rules::class_name,
        );
        let tail = fields.check_tail(&mut out);

        if !out.is_empty() {
            return Err(out);
        }
        Ok(StudentUpdate {
            name,
            email,
            phone,
            gender,
            dob,
            class_name,
            section: tail.section,
            roll: tail.roll,
            father_name: tail.father_name,
            father_phone: tail.father_phone,
            mother_name: tail.mother_name,
            mother_phone: tail.mother_phone,
            guardian_name: tail.guardian_name,
            guardian_phone: tail.guardian_phone,
            relation_of_guardian: tail.relation_of_guardian,
            current_address: tail.current_address,
            permanent_address: tail.permanent_address,
            admission_date: tail.admission_date,
        })
    }
}

/// Query schema for the list endpoint. Filters pass through; `roll`, `page`,
/// and `limit` are coerced from strings; sort fields are closed enums with
/// defaults.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListStudentsDto {
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub section: Option<String>,
    pub roll: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl Schema for ListStudentsDto {
    type Output = StudentQuery;

    fn validate(self) -> Result<StudentQuery, Vec<Violation>> {
        let mut out = Vec::new();

        let roll = check(&mut out, "roll", self.roll.as_deref(), |s| {
            rules::positive_int(s, "Roll number must be a positive integer")
                .and_then(|n| i32::try_from(n).map_err(|_| "Roll number must be a positive integer".into()))
        });
        let page = check(&mut out, "page", self.page.as_deref(), |s| {
            rules::positive_int(s, "Page must be a positive integer")
        })
        .unwrap_or(1);
        let limit = check(&mut out, "limit", self.limit.as_deref(), |s| {
            rules::bounded_int(s, 1, 100, "Limit must be between 1 and 100")
        })
        .unwrap_or(10);
        let sort_by = check(&mut out, "sortBy", self.sort_by.as_deref(), |s| {
            SortField::parse(s)
                .ok_or_else(|| "Sort field must be one of: id, name, email, class, section, roll".to_string())
        })
        .unwrap_or(SortField::Id);
        let sort_order = check(&mut out, "sortOrder", self.sort_order.as_deref(), |s| {
            SortOrder::parse(s).ok_or_else(|| "Sort order must be 'asc' or 'desc'".to_string())
        })
        .unwrap_or(SortOrder::Asc);

        if !out.is_empty() {
            return Err(out);
        }
        Ok(StudentQuery {
            name: self.name,
            class_name: self.class_name,
            section: self.section,
            roll,
            page,
            limit,
            sort_by,
            sort_order,
        })
    }
}

/// Status schema: a single strict boolean. Truthy strings and numbers are
/// rejected; only a native JSON boolean passes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusDto {
    pub status: Option<Value>,
}

impl Schema for StatusDto {
    type Output = bool;

    fn validate(self) -> Result<bool, Vec<Violation>> {
        match self.status {
            Some(Value::Bool(status)) => Ok(status),
            _ => Err(vec![Violation::new(
                "status",
                "Status must be a boolean value (true/false)",
            )]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_dto(body: serde_json::Value) -> CreateStudentDto {
        serde_json::from_value(body).unwrap()
    }

    fn update_dto(body: serde_json::Value) -> UpdateStudentDto {
        serde_json::from_value(body).unwrap()
    }

    fn query_dto(pairs: &[(&str, &str)]) -> ListStudentsDto {
        let map: serde_json::Map<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        serde_json::from_value(Value::Object(map)).unwrap()
    }

    fn valid_create_body() -> serde_json::Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "class": "5",
            "dob": "2015-05-01"
        })
    }

    #[test]
    fn create_accepts_minimal_valid_body() {
        let new_student = create_dto(valid_create_body()).validate().unwrap();
        assert_eq!(new_student.name, "Jane Doe");
        assert_eq!(new_student.email, "jane@example.com");
        assert_eq!(new_student.class_name, "5");
        assert_eq!(new_student.dob.to_string(), "2015-05-01");
        assert!(new_student.roll.is_none());
    }

    #[test]
    fn create_missing_name_is_a_required_violation() {
        let mut body = valid_create_body();
        body.as_object_mut().unwrap().remove("name");
        let violations = create_dto(body).validate().unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
        assert_eq!(violations[0].message, "Student name is required");
    }

    #[test]
    fn create_malformed_name_is_a_format_violation() {
        let mut body = valid_create_body();
        body["name"] = json!("A");
        let violations = create_dto(body).validate().unwrap_err();
        assert_eq!(
            violations[0].message,
            "Student name must be at least 2 characters long"
        );
    }

    #[test]
    fn create_violations_follow_declaration_order() {
        let mut body = valid_create_body();
        body.as_object_mut().unwrap().remove("name");
        body["email"] = json!("not-an-email");
        let violations = create_dto(body).validate().unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "email"]);
        assert_eq!(
            format_violations(&violations),
            "Validation failed: name: Student name is required, email: Invalid email format"
        );
    }

    #[test]
    fn single_violation_has_no_field_prefix() {
        let violations = vec![Violation::new("email", "Invalid email format")];
        assert_eq!(format_violations(&violations), "Invalid email format");
    }

    #[test]
    fn create_normalizes_name_and_email() {
        let mut body = valid_create_body();
        body["name"] = json!("  Jane Doe ");
        body["email"] = json!(" jane@example.com ");
        let new_student = create_dto(body).validate().unwrap();
        assert_eq!(new_student.name, "Jane Doe");
        assert_eq!(new_student.email, "jane@example.com");
    }

    #[test]
    fn create_checks_guardian_triples() {
        let mut body = valid_create_body();
        body["guardianName"] = json!("Uncle #1");
        body["guardianPhone"] = json!("not a phone!");
        let violations = create_dto(body).validate().unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["guardianName", "guardianPhone"]);
    }

    #[test]
    fn create_roll_bounds() {
        let mut body = valid_create_body();
        body["roll"] = json!(999);
        assert_eq!(create_dto(body).validate().unwrap().roll, Some(999));

        let mut body = valid_create_body();
        body["roll"] = json!(1000);
        let violations = create_dto(body).validate().unwrap_err();
        assert_eq!(violations[0].message, "Roll number cannot exceed 999");
    }

    #[test]
    fn update_accepts_empty_body() {
        let update = update_dto(json!({})).validate().unwrap();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
    }

    #[test]
    fn update_rejects_malformed_present_fields() {
        let violations = update_dto(json!({"email": "nope"})).validate().unwrap_err();
        assert_eq!(violations[0].message, "Invalid email format");
    }

    #[test]
    fn update_applies_age_rule_when_dob_present() {
        assert!(update_dto(json!({"dob": "1990-01-01"})).validate().is_err());
    }

    #[test]
    fn query_defaults_apply_when_absent() {
        let query = query_dto(&[]).validate().unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.sort_by, SortField::Id);
        assert_eq!(query.sort_order, SortOrder::Asc);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn query_coerces_roll_and_pagination() {
        let query = query_dto(&[("roll", "7"), ("page", "3"), ("limit", "25")])
            .validate()
            .unwrap();
        assert_eq!(query.roll, Some(7));
        assert_eq!(query.page, 3);
        assert_eq!(query.limit, 25);
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn query_huge_page_saturates_offset() {
        let query = query_dto(&[("page", "9223372036854775807")])
            .validate()
            .unwrap();
        assert_eq!(query.page, i64::MAX);
        assert_eq!(query.offset(), i64::MAX);
    }

    #[test]
    fn query_limit_bounds() {
        assert!(query_dto(&[("limit", "100")]).validate().is_ok());
        for bad in ["0", "101"] {
            let violations = query_dto(&[("limit", bad)]).validate().unwrap_err();
            assert_eq!(violations[0].message, "Limit must be between 1 and 100");
        }
    }

    #[test]
    fn query_roll_must_be_positive_integer() {
        let violations = query_dto(&[("roll", "abc")]).validate().unwrap_err();
        assert_eq!(violations[0].message, "Roll number must be a positive integer");
    }

    #[test]
    fn query_sort_by_names_the_allowed_set() {
        let violations = query_dto(&[("sortBy", "invalid")]).validate().unwrap_err();
        assert_eq!(
            violations[0].message,
            "Sort field must be one of: id, name, email, class, section, roll"
        );
    }

    #[test]
    fn query_sort_fields_parse() {
        let query = query_dto(&[("sortBy", "roll"), ("sortOrder", "desc")])
            .validate()
            .unwrap();
        assert_eq!(query.sort_by, SortField::Roll);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[test]
    fn status_accepts_only_native_booleans() {
        let dto: StatusDto = serde_json::from_value(json!({"status": true})).unwrap();
        assert!(dto.validate().unwrap());

        for bad in [json!({"status": "true"}), json!({"status": 1}), json!({})] {
            let dto: StatusDto = serde_json::from_value(bad).unwrap();
            let violations = dto.validate().unwrap_err();
            assert_eq!(
                violations[0].message,
                "Status must be a boolean value (true/false)"
            );
        }
    }
}
