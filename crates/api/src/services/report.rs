//! Attendance reconciliation and report assembly.
//!
//! Turns raw attendance rows into clean tabular reports by resolving the
//! loosely-typed foreign keys left behind by the integer-to-UUID id
//! migration. Reports are all-or-nothing: any store failure aborts the
//! whole build, while per-record lookup misses silently drop the record.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use domain::models::attendance::{derive_date, parse_timestamp};
use domain::models::{
    AttendanceType, DateRange, Event, RecordId, Report, ReportKind, User,
};
use persistence::repositories::{AttendanceRepository, EventRepository, UserRepository};
use persistence::store::StoreError;

/// A report build failed as a whole. Partial reports are never produced.
#[derive(Debug, Error)]
pub enum ReportGenerationError {
    #[error("Report data fetch failed: {0}")]
    Store(#[from] StoreError),
}

const ATTENDANCE_HEADER: &[&str] = &[
    "Student ID",
    "Name",
    "Course",
    "Year & Section",
    "Event",
    "Date",
    "Time In",
    "Time Out",
    "Duration (hrs)",
    "Method",
];

const EVENTS_HEADER: &[&str] = &[
    "Event ID",
    "Title",
    "Date",
    "Start Time",
    "End Time",
    "Location",
    "Status",
    "Total Attendance",
];

const USERS_HEADER: &[&str] = &[
    "User ID",
    "Name",
    "Email",
    "Course",
    "Year Level",
    "Section",
    "Role",
    "Events Attended",
];

/// Assembles reports from the primary store.
#[derive(Clone)]
pub struct ReportBuilder {
    users: UserRepository,
    events: EventRepository,
    attendance: AttendanceRepository,
}

impl ReportBuilder {
    pub fn new(
        users: UserRepository,
        events: EventRepository,
        attendance: AttendanceRepository,
    ) -> Self {
        Self {
            users,
            events,
            attendance,
        }
    }

    /// Builds the requested report. The date range applies to the
    /// attendance report only; the other kinds are full-table summaries.
    pub async fn build(
        &self,
        kind: ReportKind,
        range: Option<&DateRange>,
    ) -> Result<Report, ReportGenerationError> {
        match kind {
            ReportKind::Attendance => self.build_attendance(range).await,
            ReportKind::Events => self.build_events().await,
            ReportKind::Users => self.build_users().await,
        }
    }

    async fn build_attendance(
        &self,
        range: Option<&DateRange>,
    ) -> Result<Report, ReportGenerationError> {
        // All data is fetched up front; any failure here aborts the build
        // before a single row is assembled.
        let records = self.attendance.list_all().await?;
        let users = self.users.list_all().await?;
        let events = self.events.list_all().await?;

        let user_index: HashMap<&RecordId, &User> = users.iter().map(|u| (&u.id, u)).collect();
        let event_index: HashMap<&RecordId, &Event> = events.iter().map(|e| (&e.id, e)).collect();

        let mut report = Report::new(ReportKind::Attendance, ATTENDANCE_HEADER);
        for record in &records {
            let Some(user) = resolve_user(&user_index, &record.user_id) else {
                debug!(record_id = %record.id, user_id = %record.user_id, "Dropping record: user not found");
                continue;
            };
            let Some(event) = event_index.get(&record.event_id) else {
                debug!(record_id = %record.id, event_id = %record.event_id, "Dropping record: event not found");
                continue;
            };

            let check_in = record.effective_check_in();
            let date = check_in.and_then(derive_date);

            if let Some(range) = range {
                // Records whose date cannot be derived survive only when
                // no range filter is active.
                match &date {
                    Some(date) if range.contains(date) => {}
                    _ => continue,
                }
            }

            let duration = duration_hours(check_in, record.check_out_time.as_deref());

            // A check-out row must not re-report its check-in time; one
            // physical visit would otherwise show up twice.
            let (time_in, time_out) = match record.attendance_type {
                AttendanceType::CheckOut => (
                    String::new(),
                    record.check_out_time.clone().unwrap_or_default(),
                ),
                AttendanceType::CheckIn => (
                    check_in.unwrap_or_default().to_string(),
                    record.check_out_time.clone().unwrap_or_default(),
                ),
            };

            report.push_row(vec![
                user.id.to_string(),
                user.full_name(),
                user.course.clone().unwrap_or_default(),
                year_section(user),
                event.title.clone(),
                date.unwrap_or_default(),
                time_in,
                time_out,
                duration,
                record.check_in_method.clone().unwrap_or_default(),
            ]);
        }
        Ok(report)
    }

    async fn build_events(&self) -> Result<Report, ReportGenerationError> {
        let events = self.events.list_all().await?;
        let records = self.attendance.list_all().await?;

        // Check-outs are excluded so one visit counts once.
        let mut check_ins: HashMap<&RecordId, u64> = HashMap::new();
        for record in &records {
            if record.attendance_type == AttendanceType::CheckIn {
                *check_ins.entry(&record.event_id).or_default() += 1;
            }
        }

        let mut report = Report::new(ReportKind::Events, EVENTS_HEADER);
        for event in &events {
            let total = check_ins.get(&event.id).copied().unwrap_or(0);
            report.push_row(vec![
                event.id.to_string(),
                event.title.clone(),
                event.event_date.clone(),
                event.start_time.clone().unwrap_or_default(),
                event.end_time.clone().unwrap_or_default(),
                event.location.clone().unwrap_or_default(),
                event.status.to_string(),
                total.to_string(),
            ]);
        }
        Ok(report)
    }

    async fn build_users(&self) -> Result<Report, ReportGenerationError> {
        let users = self.users.list_all().await?;
        let records = self.attendance.list_all().await?;

        // Unlike the events report this counts every scan, check-outs
        // included. The two reports have always disagreed on this and
        // downstream consumers expect both behaviors as they are.
        // Counting matches on the foreign key exactly as stored; the
        // numeric-as-text retry applies only when assembling attendance
        // rows.
        let mut scans: HashMap<&RecordId, u64> = HashMap::new();
        for record in &records {
            *scans.entry(&record.user_id).or_default() += 1;
        }

        let mut report = Report::new(ReportKind::Users, USERS_HEADER);
        for user in &users {
            let attended = scans.get(&user.id).copied().unwrap_or(0);
            report.push_row(vec![
                user.id.to_string(),
                user.full_name(),
                user.email.clone(),
                user.course.clone().unwrap_or_default(),
                user.year_level.map(|y| y.to_string()).unwrap_or_default(),
                user.section.clone().unwrap_or_default(),
                user.role.to_string(),
                attended.to_string(),
            ]);
        }
        Ok(report)
    }
}

/// Resolves a user reference, retrying a numeric id as text.
///
/// User ids were re-written as text during the UUID migration while
/// attendance rows kept numeric foreign keys, hence the retry. The
/// opposite coercion (text id rendered as a numeral) is deliberately not
/// attempted; see `RecordId::coerced_to_text`.
fn resolve_user<'a>(
    index: &HashMap<&RecordId, &'a User>,
    user_id: &RecordId,
) -> Option<&'a User> {
    if let Some(user) = index.get(user_id) {
        return Some(*user);
    }
    user_id
        .coerced_to_text()
        .and_then(|text| index.get(&text).copied())
}

/// Duration between check-in and check-out in hours, two decimals.
/// Blank when either timestamp is absent or unparseable.
fn duration_hours(check_in: Option<&str>, check_out: Option<&str>) -> String {
    match (
        check_in.and_then(parse_timestamp),
        check_out.and_then(parse_timestamp),
    ) {
        (Some(time_in), Some(time_out)) => {
            let hours = (time_out - time_in).num_seconds() as f64 / 3600.0;
            format!("{:.2}", hours)
        }
        _ => String::new(),
    }
}

fn year_section(user: &User) -> String {
    match (user.year_level, user.section.as_deref()) {
        (Some(year), Some(section)) => format!("{}-{}", year, section),
        (Some(year), None) => year.to_string(),
        (None, Some(section)) => section.to_string(),
        (None, None) => String::new(),
    }
}
