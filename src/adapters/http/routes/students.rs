use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, extract::AppJson, routes::today},
    app_error::{AppError, AppResult},
    entities::{
        plan::PlanId,
        student::{EmergencyContact, Student},
    },
    use_cases::student::{BillingDiscrepancy, DueStudent, NewStudent, StudentUpdate},
    validators::parse_calendar_date,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/due", get(list_due))
        .route("/billing-audit", get(billing_audit))
        .route("/billing-audit/repair", post(repair_billing_dates))
        .route(
            "/{student_id}",
            get(get_student)
                .put(update_student)
                .patch(update_student)
                .delete(deactivate_student),
        )
        .route("/{student_id}/payments", post(record_payment))
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CreateStudentPayload {
    name: String,
    email: Option<String>,
    phone: Option<String>,
    plan_id: String,
    payment_date: String,
    avatar_url: Option<String>,
    notes: Option<String>,
    emergency_contact: Option<EmergencyContact>,
    /// Only read to reject clients that try to set it.
    next_billing_date: Option<serde_json::Value>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UpdateStudentPayload {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    plan_id: Option<String>,
    payment_date: Option<String>,
    avatar_url: Option<String>,
    is_active: Option<bool>,
    notes: Option<String>,
    emergency_contact: Option<EmergencyContact>,
    next_billing_date: Option<serde_json::Value>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RecordPaymentPayload {
    payment_date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    #[serde(default)]
    include_inactive: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DueQuery {
    on: Option<String>,
    within_days: Option<u32>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StudentResponse {
    id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    plan_id: PlanId,
    payment_date: NaiveDate,
    next_billing_date: NaiveDate,
    avatar_url: String,
    is_active: bool,
    is_overdue: bool,
    notes: Option<String>,
    emergency_contact: Option<EmergencyContact>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl StudentResponse {
    fn new(student: Student, avatar_base_url: &Url, today: NaiveDate) -> Self {
        Self {
            avatar_url: student.display_avatar_url(avatar_base_url),
            is_overdue: student.is_active && student.is_overdue(today),
            id: student.id,
            name: student.name,
            email: student.email,
            phone: student.phone,
            plan_id: student.plan_id,
            payment_date: student.payment_date,
            next_billing_date: student.next_billing_date,
            is_active: student.is_active,
            notes: student.notes,
            emergency_contact: student.emergency_contact,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DueStudentResponse {
    #[serde(flatten)]
    student: StudentResponse,
    days_until_due: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DueStudentsResponse {
    on: NaiveDate,
    within_days: u32,
    students: Vec<DueStudentResponse>,
}

fn reject_next_billing_date(value: &Option<serde_json::Value>) -> AppResult<()> {
    if value.is_some() {
        return Err(AppError::InvalidInput(
            "nextBillingDate is calculated from paymentDate and planId and cannot be set".into(),
        ));
    }
    Ok(())
}

/// Malformed ids can't match any student.
fn parse_student_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/students?includeInactive=false
async fn list_students(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let students = app_state
        .student_use_cases
        .list(query.include_inactive)
        .await?;

    let today = today();
    let body: Vec<StudentResponse> = students
        .into_iter()
        .map(|s| StudentResponse::new(s, &app_state.config.avatar_base_url, today))
        .collect();
    Ok(Json(body))
}

/// POST /api/students
async fn create_student(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<CreateStudentPayload>,
) -> AppResult<impl IntoResponse> {
    reject_next_billing_date(&payload.next_billing_date)?;

    let student = app_state
        .student_use_cases
        .create(NewStudent {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            plan_id: payload.plan_id,
            payment_date: payload.payment_date,
            avatar_url: payload.avatar_url,
            notes: payload.notes,
            emergency_contact: payload.emergency_contact,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StudentResponse::new(
            student,
            &app_state.config.avatar_base_url,
            today(),
        )),
    ))
}

/// GET /api/students/due?on=YYYY-MM-DD&withinDays=7
/// Active students billed on or before `on + withinDays`, overdue first.
async fn list_due(
    State(app_state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> AppResult<impl IntoResponse> {
    let on = match query.on.as_deref() {
        Some(raw) => parse_calendar_date(raw, "on")?,
        None => today(),
    };
    let within_days = query.within_days.unwrap_or(app_state.config.due_soon_days);

    let due = app_state.student_use_cases.list_due(on, within_days).await?;

    let students = due
        .into_iter()
        .map(|DueStudent { student, days_until_due, .. }| DueStudentResponse {
            student: StudentResponse::new(student, &app_state.config.avatar_base_url, on),
            days_until_due,
        })
        .collect();
    Ok(Json(DueStudentsResponse {
        on,
        within_days,
        students,
    }))
}

/// GET /api/students/billing-audit
async fn billing_audit(
    State(app_state): State<AppState>,
) -> AppResult<Json<Vec<BillingDiscrepancy>>> {
    Ok(Json(app_state.student_use_cases.audit_billing_dates().await?))
}

/// POST /api/students/billing-audit/repair
async fn repair_billing_dates(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let repaired = app_state.student_use_cases.repair_billing_dates().await?;
    Ok(Json(json!({ "repaired": repaired })))
}

/// GET /api/students/{student_id}
async fn get_student(
    State(app_state): State<AppState>,
    Path(student_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let student = app_state
        .student_use_cases
        .get(parse_student_id(&student_id)?)
        .await?;
    Ok(Json(StudentResponse::new(
        student,
        &app_state.config.avatar_base_url,
        today(),
    )))
}

/// PUT|PATCH /api/students/{student_id}
/// Partial update; the next billing date is always recalculated.
async fn update_student(
    State(app_state): State<AppState>,
    Path(student_id): Path<String>,
    AppJson(payload): AppJson<UpdateStudentPayload>,
) -> AppResult<impl IntoResponse> {
    let student_id = parse_student_id(&student_id)?;
    reject_next_billing_date(&payload.next_billing_date)?;

    let student = app_state
        .student_use_cases
        .update(
            student_id,
            StudentUpdate {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                plan_id: payload.plan_id,
                payment_date: payload.payment_date,
                avatar_url: payload.avatar_url,
                is_active: payload.is_active,
                notes: payload.notes,
                emergency_contact: payload.emergency_contact,
            },
        )
        .await?;

    Ok(Json(StudentResponse::new(
        student,
        &app_state.config.avatar_base_url,
        today(),
    )))
}

/// DELETE /api/students/{student_id}
/// Soft delete: the student is marked inactive.
async fn deactivate_student(
    State(app_state): State<AppState>,
    Path(student_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    app_state
        .student_use_cases
        .deactivate(parse_student_id(&student_id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/students/{student_id}/payments
async fn record_payment(
    State(app_state): State<AppState>,
    Path(student_id): Path<String>,
    AppJson(payload): AppJson<RecordPaymentPayload>,
) -> AppResult<impl IntoResponse> {
    let student = app_state
        .student_use_cases
        .record_payment(parse_student_id(&student_id)?, &payload.payment_date)
        .await?;
    Ok(Json(StudentResponse::new(
        student,
        &app_state.config.avatar_base_url,
        today(),
    )))
}
