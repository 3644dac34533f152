use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    entities::{
        plan::PlanId,
        student::{EmergencyContact, Student},
    },
    validators::{
        CONTACT_NAME_MAX_LEN, NAME_MAX_LEN, NOTES_MAX_LEN, RELATIONSHIP_MAX_LEN, is_valid_email,
        is_valid_phone, parse_calendar_date, sanitize_text,
    },
};

#[async_trait]
pub trait StudentRepo: Send + Sync {
    async fn insert(&self, student: Student) -> AppResult<Student>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Student>>;
    /// Newest first.
    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Student>>;
    /// Applies `change` to the stored record while holding it exclusively and
    /// returns the result. `NotFound` if the id is unknown. If `change` fails
    /// the stored record is left untouched.
    async fn modify(&self, id: Uuid, change: StudentChange) -> AppResult<Student>;
}

/// In-place edit applied by [`StudentRepo::modify`].
pub type StudentChange = Box<dyn FnOnce(&mut Student) -> AppResult<()> + Send>;

/// Fields accepted when registering a student. Plan and date arrive as raw
/// strings and are validated here.
#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_id: String,
    pub payment_date: String,
    pub avatar_url: Option<String>,
    pub notes: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
}

/// Partial update. `None` leaves a field untouched; an empty string clears an
/// optional text field; an emergency contact with every field empty clears it.
#[derive(Debug, Clone, Default)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_id: Option<String>,
    pub payment_date: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
}

#[derive(Debug, Clone)]
pub struct DueStudent {
    pub student: Student,
    pub is_overdue: bool,
    /// Negative when the billing date has already passed.
    pub days_until_due: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingDiscrepancy {
    pub student_id: Uuid,
    pub name: String,
    pub plan_id: PlanId,
    pub payment_date: NaiveDate,
    pub stored_next_billing_date: NaiveDate,
    pub expected_next_billing_date: NaiveDate,
}

/// A student record as exported by older versions of the app, where the
/// next billing date was stored and sometimes hand-edited.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyStudentRecord {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub plan_id: Option<String>,
    pub payment_date: String,
    #[serde(default)]
    pub next_billing_date: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub plan_fallbacks: usize,
    pub corrected_billing_dates: usize,
}

#[derive(Clone)]
pub struct StudentUseCases {
    repo: Arc<dyn StudentRepo>,
}

impl StudentUseCases {
    pub fn new(repo: Arc<dyn StudentRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewStudent) -> AppResult<Student> {
        let plan_id = parse_plan(&input.plan_id)?;
        let payment_date = parse_calendar_date(&input.payment_date, "paymentDate")?;
        let now = Utc::now().naive_utc();

        let mut student = Student {
            id: Uuid::new_v4(),
            name: normalize_name(&input.name)?,
            email: normalize_email(input.email.as_deref())?,
            phone: normalize_phone(input.phone.as_deref(), "phone")?,
            plan_id,
            payment_date,
            next_billing_date: payment_date,
            avatar_url: normalize_avatar(input.avatar_url.as_deref()),
            is_active: true,
            notes: normalize_notes(input.notes.as_deref())?,
            emergency_contact: normalize_contact(input.emergency_contact)?,
            created_at: now,
            updated_at: now,
        };
        student.refresh_next_billing_date();

        let student = self.repo.insert(student).await?;
        tracing::info!(
            student_id = %student.id,
            plan = %student.plan_id,
            next_billing_date = %student.next_billing_date,
            "Student created"
        );
        Ok(student)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Student> {
        self.repo.get_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<Student>> {
        self.repo.list(include_inactive).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: Uuid, patch: StudentUpdate) -> AppResult<Student> {
        let change: StudentChange = Box::new(move |student: &mut Student| {
            if let Some(name) = patch.name.as_deref() {
                student.name = normalize_name(name)?;
            }
            if let Some(email) = patch.email.as_deref() {
                student.email = normalize_email(Some(email))?;
            }
            if let Some(phone) = patch.phone.as_deref() {
                student.phone = normalize_phone(Some(phone), "phone")?;
            }
            if let Some(plan) = patch.plan_id.as_deref() {
                student.plan_id = parse_plan(plan)?;
            }
            if let Some(payment_date) = patch.payment_date.as_deref() {
                student.payment_date = parse_calendar_date(payment_date, "paymentDate")?;
            }
            if let Some(avatar_url) = patch.avatar_url.as_deref() {
                student.avatar_url = normalize_avatar(Some(avatar_url));
            }
            if let Some(is_active) = patch.is_active {
                student.is_active = is_active;
            }
            if let Some(notes) = patch.notes.as_deref() {
                student.notes = normalize_notes(Some(notes))?;
            }
            if let Some(contact) = patch.emergency_contact {
                student.emergency_contact = normalize_contact(Some(contact))?;
            }

            student.refresh_next_billing_date();
            student.updated_at = Utc::now().naive_utc();
            Ok(())
        });

        self.repo.modify(id, change).await
    }

    /// Registers a new payment and moves the billing date accordingly.
    #[instrument(skip(self))]
    pub async fn record_payment(&self, id: Uuid, payment_date: &str) -> AppResult<Student> {
        let payment_date = parse_calendar_date(payment_date, "paymentDate")?;

        let student = self
            .repo
            .modify(
                id,
                Box::new(move |student: &mut Student| {
                    if !student.is_active {
                        return Err(AppError::InvalidInput(
                            "Cannot record a payment for an inactive student".into(),
                        ));
                    }
                    student.payment_date = payment_date;
                    student.refresh_next_billing_date();
                    student.updated_at = Utc::now().naive_utc();
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(
            student_id = %student.id,
            payment_date = %student.payment_date,
            next_billing_date = %student.next_billing_date,
            "Payment recorded"
        );
        Ok(student)
    }

    /// Soft delete. The record stays stored with `is_active = false`.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        self.repo
            .modify(
                id,
                Box::new(|student: &mut Student| {
                    if student.is_active {
                        student.is_active = false;
                        student.updated_at = Utc::now().naive_utc();
                    }
                    Ok(())
                }),
            )
            .await?;
        Ok(())
    }

    /// Active students billed on or before `today + within_days`, soonest first.
    pub async fn list_due(&self, today: NaiveDate, within_days: u32) -> AppResult<Vec<DueStudent>> {
        let horizon = today
            .checked_add_days(Days::new(u64::from(within_days)))
            .unwrap_or(NaiveDate::MAX);

        let mut due: Vec<DueStudent> = self
            .repo
            .list(false)
            .await?
            .into_iter()
            .filter(|s| s.next_billing_date <= horizon)
            .map(|student| DueStudent {
                is_overdue: student.is_overdue(today),
                days_until_due: (student.next_billing_date - today).num_days(),
                student,
            })
            .collect();
        due.sort_by(|a, b| {
            a.student
                .next_billing_date
                .cmp(&b.student.next_billing_date)
                .then_with(|| a.student.name.cmp(&b.student.name))
        });
        Ok(due)
    }

    /// Records whose stored billing date no longer matches the calculation.
    pub async fn audit_billing_dates(&self) -> AppResult<Vec<BillingDiscrepancy>> {
        let students = self.repo.list(true).await?;
        Ok(students
            .iter()
            .filter(|s| !s.has_consistent_billing_date())
            .map(|s| BillingDiscrepancy {
                student_id: s.id,
                name: s.name.clone(),
                plan_id: s.plan_id,
                payment_date: s.payment_date,
                stored_next_billing_date: s.next_billing_date,
                expected_next_billing_date: s.expected_next_billing_date(),
            })
            .collect())
    }

    /// Recomputes every inconsistent record. Returns how many were fixed.
    #[instrument(skip(self))]
    pub async fn repair_billing_dates(&self) -> AppResult<usize> {
        let mut repaired = 0;
        for student in self.repo.list(true).await? {
            if student.has_consistent_billing_date() {
                continue;
            }
            tracing::warn!(
                student_id = %student.id,
                stored = %student.next_billing_date,
                expected = %student.expected_next_billing_date(),
                "Repairing next billing date"
            );
            self.repo
                .modify(
                    student.id,
                    Box::new(|student: &mut Student| {
                        if !student.has_consistent_billing_date() {
                            student.refresh_next_billing_date();
                            student.updated_at = Utc::now().naive_utc();
                        }
                        Ok(())
                    }),
                )
                .await?;
            repaired += 1;
        }
        Ok(repaired)
    }

    /// Loads exported records. Stored billing dates are never trusted: they
    /// are recomputed and any disagreement is counted and logged.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn import(&self, records: Vec<LegacyStudentRecord>) -> AppResult<ImportReport> {
        let mut report = ImportReport::default();

        for (index, record) in records.into_iter().enumerate() {
            let plan_code = record.plan_id.clone().unwrap_or_default();
            let (plan_id, plan_fallback) = PlanId::resolve_code(&plan_code);

            let (student, corrected) = match build_imported(record, plan_id) {
                Ok(built) => built,
                Err(err) => {
                    tracing::warn!(index, error = %err, "Skipping imported record");
                    report.skipped += 1;
                    continue;
                }
            };
            if plan_fallback {
                tracing::warn!(
                    index,
                    plan = %plan_code,
                    "Unknown plan in imported record, billing as once_a_week"
                );
                report.plan_fallbacks += 1;
            }
            if corrected {
                report.corrected_billing_dates += 1;
            }

            self.repo.insert(student).await?;
            report.imported += 1;
        }

        tracing::info!(
            imported = report.imported,
            skipped = report.skipped,
            plan_fallbacks = report.plan_fallbacks,
            corrected_billing_dates = report.corrected_billing_dates,
            "Student import finished"
        );
        Ok(report)
    }
}

/// Returns the student plus whether the stored billing date had to be corrected.
fn build_imported(record: LegacyStudentRecord, plan_id: PlanId) -> AppResult<(Student, bool)> {
    let payment_date = parse_calendar_date(&record.payment_date, "paymentDate")?;
    let now = Utc::now().naive_utc();

    let mut student = Student {
        id: Uuid::new_v4(),
        name: normalize_name(&record.name)?,
        email: normalize_email(record.email.as_deref())?,
        phone: normalize_phone(record.phone.as_deref(), "phone")?,
        plan_id,
        payment_date,
        next_billing_date: payment_date,
        avatar_url: normalize_avatar(record.avatar_url.as_deref()),
        is_active: record.is_active.unwrap_or(true),
        notes: normalize_notes(record.notes.as_deref())?,
        emergency_contact: normalize_contact(record.emergency_contact)?,
        created_at: now,
        updated_at: now,
    };
    student.refresh_next_billing_date();

    let stored = record
        .next_billing_date
        .as_deref()
        .map(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok());
    let corrected = match stored {
        None => false,
        Some(Some(stored)) if stored == student.next_billing_date => false,
        Some(stored) => {
            tracing::warn!(
                student = %student.name,
                stored = ?stored,
                expected = %student.next_billing_date,
                "Imported next billing date disagrees with payment date and plan"
            );
            true
        }
    };

    Ok((student, corrected))
}

fn parse_plan(raw: &str) -> AppResult<PlanId> {
    raw.parse::<PlanId>().map_err(AppError::InvalidInput)
}

fn normalize_name(raw: &str) -> AppResult<String> {
    let name = sanitize_text(raw);
    if name.is_empty() {
        return Err(AppError::InvalidInput("name is required".into()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(AppError::InvalidInput(format!(
            "name cannot exceed {NAME_MAX_LEN} characters"
        )));
    }
    Ok(name)
}

fn normalize_email(raw: Option<&str>) -> AppResult<Option<String>> {
    let Some(email) = raw.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };
    if !is_valid_email(&email) {
        return Err(AppError::InvalidInput("email is not a valid address".into()));
    }
    Ok(Some(email))
}

fn normalize_phone(raw: Option<&str>, field: &str) -> AppResult<Option<String>> {
    let Some(phone) = raw.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    if !is_valid_phone(phone) {
        return Err(AppError::InvalidInput(format!(
            "{field} may only contain digits, spaces, +, - and parentheses"
        )));
    }
    Ok(Some(phone.to_string()))
}

fn normalize_avatar(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn normalize_notes(raw: Option<&str>) -> AppResult<Option<String>> {
    let Some(notes) = raw.map(sanitize_text).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if notes.chars().count() > NOTES_MAX_LEN {
        return Err(AppError::InvalidInput(format!(
            "notes cannot exceed {NOTES_MAX_LEN} characters"
        )));
    }
    Ok(Some(notes))
}

fn normalize_contact(raw: Option<EmergencyContact>) -> AppResult<Option<EmergencyContact>> {
    let Some(contact) = raw else {
        return Ok(None);
    };
    let name = sanitize_text(&contact.name);
    let phone = contact.phone.trim().to_string();
    let relationship = sanitize_text(&contact.relationship);

    if name.is_empty() && phone.is_empty() && relationship.is_empty() {
        return Ok(None);
    }
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            "emergencyContact.name is required".into(),
        ));
    }
    if name.chars().count() > CONTACT_NAME_MAX_LEN {
        return Err(AppError::InvalidInput(format!(
            "emergencyContact.name cannot exceed {CONTACT_NAME_MAX_LEN} characters"
        )));
    }
    let phone = normalize_phone(Some(&phone), "emergencyContact.phone")?.ok_or_else(|| {
        AppError::InvalidInput("emergencyContact.phone is required".into())
    })?;
    if relationship.chars().count() > RELATIONSHIP_MAX_LEN {
        return Err(AppError::InvalidInput(format!(
            "emergencyContact.relationship cannot exceed {RELATIONSHIP_MAX_LEN} characters"
        )));
    }

    Ok(Some(EmergencyContact {
        name,
        phone,
        relationship,
    }))
}
