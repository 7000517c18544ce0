//! Attendance record domain models and lenient timestamp parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::id::RecordId;

/// A raw check-in/check-out row as scanned at the venue.
///
/// Timestamp columns are plain text in the stores and old rows carry a mix
/// of formats (some predate the dedicated check-in-time column entirely),
/// so they stay as optional strings here and are parsed leniently where a
/// computation needs an instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub user_id: RecordId,
    pub event_id: RecordId,
    pub attendance_type: AttendanceType,
    #[serde(default)]
    pub check_in_time: Option<String>,
    #[serde(default)]
    pub check_out_time: Option<String>,
    #[serde(default)]
    pub attendance_date: Option<String>,
    #[serde(default)]
    pub check_in_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AttendanceRecord {
    /// The effective check-in timestamp: the dedicated column when present,
    /// otherwise the legacy `attendance_date` fallback.
    pub fn effective_check_in(&self) -> Option<&str> {
        self.check_in_time
            .as_deref()
            .or(self.attendance_date.as_deref())
    }
}

/// Whether a scan recorded an arrival or a departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceType {
    CheckIn,
    CheckOut,
}

impl AttendanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceType::CheckIn => "check_in",
            AttendanceType::CheckOut => "check_out",
        }
    }
}

impl FromStr for AttendanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "check_in" => Ok(AttendanceType::CheckIn),
            "check_out" => Ok(AttendanceType::CheckOut),
            _ => Err(format!("Invalid attendance type: {}", s)),
        }
    }
}

impl fmt::Display for AttendanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parses a store timestamp in any of the formats found in production data.
///
/// Returns `None` for anything unparseable; missing or malformed timestamps
/// are never an error anywhere in the portal.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    let trimmed = raw.trim();
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    // A bare date counts as midnight.
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Derives the `YYYY-MM-DD` calendar date of a timestamp string.
pub fn derive_date(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.date().format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_type_round_trip() {
        assert_eq!(
            AttendanceType::from_str("check_in").unwrap(),
            AttendanceType::CheckIn
        );
        assert_eq!(
            AttendanceType::from_str("CHECK_OUT").unwrap(),
            AttendanceType::CheckOut
        );
        assert!(AttendanceType::from_str("checkin").is_err());
    }

    #[test]
    fn test_serde_uses_snake_case_values() {
        let json = serde_json::to_string(&AttendanceType::CheckIn).unwrap();
        assert_eq!(json, "\"check_in\"");
        let parsed: AttendanceType = serde_json::from_str("\"check_out\"").unwrap();
        assert_eq!(parsed, AttendanceType::CheckOut);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15 08:00:00").is_some());
        assert!(parse_timestamp("2024-01-15T08:00:00").is_some());
        assert!(parse_timestamp("2024-01-15T08:00:00.123").is_some());
        assert!(parse_timestamp("2024-01-15T08:00:00+08:00").is_some());
        assert!(parse_timestamp("2024-01-15").is_some());
        assert!(parse_timestamp("  2024-01-15 08:00:00  ").is_some());
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("January 15, 2024").is_none());
        assert!(parse_timestamp("2024-13-45 99:00:00").is_none());
    }

    #[test]
    fn test_derive_date() {
        assert_eq!(
            derive_date("2024-01-15 08:30:00").as_deref(),
            Some("2024-01-15")
        );
        assert_eq!(derive_date("2024-01-15").as_deref(), Some("2024-01-15"));
        assert!(derive_date("not a date").is_none());
    }

    #[test]
    fn test_effective_check_in_fallback() {
        let mut record: AttendanceRecord = serde_json::from_value(serde_json::json!({
            "id": 1,
            "user_id": 5,
            "event_id": 9,
            "attendance_type": "check_in",
            "attendance_date": "2024-01-15"
        }))
        .unwrap();
        assert_eq!(record.effective_check_in(), Some("2024-01-15"));

        record.check_in_time = Some("2024-01-15 08:00:00".to_string());
        assert_eq!(record.effective_check_in(), Some("2024-01-15 08:00:00"));
    }
}
