//! Attendance report shapes for the history view.
//!
//! The backend computes attendance for a class over a manually chosen
//! date and time window. This module validates the window and models the
//! report it returns.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Date format expected by the `specific_date` query parameter.
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format expected by the `start_time_str` / `end_time_str` parameters.
pub const REPORT_TIME_FORMAT: &str = "%H:%M";

/// Manual filter for an attendance report: one class, one day, one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualReportQuery {
    pub class_id: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ManualReportQuery {
    pub fn new(
        class_id: impl Into<String>,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, CoreError> {
        let class_id = class_id.into();
        if class_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "Attendance report requires a class id".to_string(),
            ));
        }
        if end <= start {
            return Err(CoreError::Validation(format!(
                "Report window end {} must be after start {}",
                end.format(REPORT_TIME_FORMAT),
                start.format(REPORT_TIME_FORMAT),
            )));
        }
        Ok(Self {
            class_id,
            date,
            start,
            end,
        })
    }

    /// Query-string pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("class_id", self.class_id.clone()),
            ("specific_date", self.date.format(REPORT_DATE_FORMAT).to_string()),
            ("start_time_str", self.start.format(REPORT_TIME_FORMAT).to_string()),
            ("end_time_str", self.end.format(REPORT_TIME_FORMAT).to_string()),
        ]
    }
}

/// Attendee category as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendeeCategory {
    Student,
    Visitor,
    Other,
}

impl AttendeeCategory {
    /// Parse a category string, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" => Self::Student,
            "visitor" => Self::Visitor,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub category: String,
}

impl Attendee {
    pub fn category(&self) -> AttendeeCategory {
        AttendeeCategory::parse(&self.category)
    }
}

/// Attendance computed for one manual filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceReport {
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub total_attendance: u64,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

impl AttendanceReport {
    pub fn students(&self) -> Vec<&Attendee> {
        self.by_category(AttendeeCategory::Student)
    }

    pub fn visitors(&self) -> Vec<&Attendee> {
        self.by_category(AttendeeCategory::Visitor)
    }

    fn by_category(&self, category: AttendeeCategory) -> Vec<&Attendee> {
        self.attendees
            .iter()
            .filter(|a| a.category() == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn query_pairs_are_formatted() {
        let q = ManualReportQuery::new("c1", date(), time(7, 30), time(9, 5)).unwrap();
        let pairs = q.query_pairs();
        assert_eq!(pairs[0], ("class_id", "c1".to_string()));
        assert_eq!(pairs[1], ("specific_date", "2026-01-12".to_string()));
        assert_eq!(pairs[2], ("start_time_str", "07:30".to_string()));
        assert_eq!(pairs[3], ("end_time_str", "09:05".to_string()));
    }

    #[test]
    fn query_rejects_inverted_window() {
        assert!(ManualReportQuery::new("c1", date(), time(9, 0), time(9, 0)).is_err());
        assert!(ManualReportQuery::new("c1", date(), time(10, 0), time(9, 0)).is_err());
    }

    #[test]
    fn query_rejects_blank_class() {
        assert!(ManualReportQuery::new("  ", date(), time(7, 0), time(8, 0)).is_err());
    }

    #[test]
    fn report_splits_by_category() {
        let json = r#"{
            "scenario": "manual",
            "start_time": "07:00",
            "end_time": "09:00",
            "total_attendance": 3,
            "attendees": [
                {"_id": "a", "timestamp": "2026-01-12T07:58:00", "full_name": "Andi", "category": "student"},
                {"_id": "b", "timestamp": "2026-01-12T08:10:00", "full_name": "Guest", "category": "Visitor"},
                {"_id": "c", "timestamp": "2026-01-12T08:12:00", "full_name": "Staff", "category": "lecturer"}
            ]
        }"#;
        let report: AttendanceReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.total_attendance, 3);
        assert_eq!(report.students().len(), 1);
        assert_eq!(report.students()[0].full_name, "Andi");
        assert_eq!(report.visitors().len(), 1);
        assert_eq!(report.attendees[2].category(), AttendeeCategory::Other);
    }

    #[test]
    fn report_tolerates_missing_fields() {
        let report: AttendanceReport = serde_json::from_str("{}").unwrap();
        assert!(report.attendees.is_empty());
        assert_eq!(report.total_attendance, 0);
    }
}
