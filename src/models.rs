//! Data models for event analytics.
//!
//! Raw records mirror the rows handed over by the data-access layer
//! (an event joined with its optional sub-records). Derived shapes are
//! what the aggregation pipeline produces for the presentation layer;
//! they serialize with camelCase keys.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Parse a calendar date from its literal `YYYY-MM-DD` prefix.
///
/// Anything after the date (a time or offset) is ignored rather than
/// interpreted, so the date never moves across a timezone boundary.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    let literal = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .map_err(|e| format!("invalid event date '{}': {}", raw, e))
}

/// Serde adapter for literal calendar dates.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Accept identifiers stored either as strings (uuid) or as numbers.
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invalid event id: {}",
            other
        ))),
    }
}

/// Accept a count written as any whole, non-negative JSON number (`32` or `32.0`).
/// Anything else reads as missing.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| {
        v.as_u64().or_else(|| {
            v.as_f64()
                .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0)
                .map(|n| n as u64)
        })
    }))
}

/// Attendance figures for an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    /// People who responded to the invitation.
    #[serde(default, deserialize_with = "lenient_count")]
    pub registrant_responses: Option<u64>,
    /// Registrants who confirmed.
    #[serde(default, deserialize_with = "lenient_count")]
    pub confirmations: Option<u64>,
    /// People who actually showed up.
    #[serde(default, deserialize_with = "lenient_count")]
    pub attendees: Option<u64>,
    /// New clients acquired from the event.
    #[serde(default, deserialize_with = "lenient_count")]
    pub clients_from_event: Option<u64>,
    /// Raw headcount, passed through as stored. Only numeric values count.
    #[serde(default)]
    pub plate_lickers: Option<serde_json::Value>,
}

/// Commission and fee production attributed to an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialProduction {
    #[serde(default)]
    pub aum_fees: Option<f64>,
    #[serde(default)]
    pub annuity_commission: Option<f64>,
    #[serde(default)]
    pub life_insurance_commission: Option<f64>,
    #[serde(default)]
    pub financial_planning: Option<f64>,
}

/// Cost of running an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingExpenses {
    #[serde(default)]
    pub total_cost: Option<f64>,
}

/// Appointment funnel counts for an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventAppointments {
    #[serde(default, deserialize_with = "lenient_count")]
    pub set_at_event: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub set_after_event: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub first_appointment_attended: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub first_appointment_no_shows: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub second_appointment_attended: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub not_qualified: Option<u64>,
}

/// A marketing event joined with its sub-records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Owner of the row, when the export carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, alias = "event_name")]
    pub name: Option<String>,
    #[serde(with = "calendar_date", alias = "event_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub marketing_type: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub attendance: Option<Attendance>,
    #[serde(default)]
    pub financial_production: Option<FinancialProduction>,
    #[serde(default)]
    pub marketing_expenses: Option<MarketingExpenses>,
    #[serde(default)]
    pub event_appointments: Option<EventAppointments>,
}

impl Event {
    /// Creates a bare event with no sub-records.
    pub fn new(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            name: None,
            date,
            location: None,
            marketing_type: None,
            topic: None,
            time: None,
            attendance: None,
            financial_production: None,
            marketing_expenses: None,
            event_appointments: None,
        }
    }
}

/// Inclusive date range used to scope events. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Returns true if `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (None, None) => write!(f, "all dates"),
            (Some(start), None) => write!(f, "from {}", start),
            (None, Some(end)) => write!(f, "through {}", end),
            (Some(start), Some(end)) => write!(f, "{} to {}", start, end),
        }
    }
}

/// Overall totals and rates across all aggregated events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_events: usize,
    pub total_attendees: u64,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_profit: f64,
    pub total_clients: u64,
    pub total_registrants: u64,
    pub total_appointments_set: u64,
    pub total_appointments_made: u64,
    pub total_plate_lickers: f64,
    pub total_first_appointment_no_shows: u64,
    pub total_not_qualified: u64,
    pub avg_attendees: f64,
    #[serde(rename = "overallROI")]
    pub overall_roi: f64,
    pub overall_conversion_rate: f64,
}

/// ROI percentage, wrapped for display formatting.
///
/// A value equal to [`crate::analysis::ROI_SENTINEL`] means "profitable with
/// zero spend" and is not a real percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoiValue {
    pub value: f64,
}

impl RoiValue {
    pub fn is_sentinel(&self) -> bool {
        self.value == crate::analysis::ROI_SENTINEL
    }
}

/// Flat per-event projection with derived financials and funnel counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedEvent {
    pub id: String,
    pub name: Option<String>,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub day_of_week: String,
    pub location: Option<String>,
    pub marketing_type: String,
    pub topic: Option<String>,
    pub time: Option<String>,
    pub registrants: u64,
    pub confirmations: u64,
    pub attendees: u64,
    pub clients: u64,
    pub plate_lickers: Option<serde_json::Value>,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
    pub roi: RoiValue,
    pub conversion_rate: f64,
    pub appointments_set: u64,
    pub appointments_made: u64,
    pub first_appointment_no_shows: u64,
    pub not_qualified: u64,
}

/// Totals and rates for one bucket of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketMetrics {
    pub events: usize,
    pub attendees: u64,
    pub clients: u64,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
    pub avg_attendees: f64,
    pub roi: f64,
    pub conversion_rate: f64,
}

/// Events rolled up by calendar month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub month: String,
    #[serde(flatten)]
    pub metrics: BucketMetrics,
}

/// Events rolled up by marketing type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBucket {
    pub marketing_type: String,
    #[serde(flatten)]
    pub metrics: BucketMetrics,
}

/// Everything the dashboard views consume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub summary: AnalyticsSummary,
    pub events: Vec<DerivedEvent>,
    pub monthly_data: Vec<MonthlyBucket>,
    pub metrics_by_type: Vec<TypeBucket>,
}

impl AnalyticsResult {
    /// The no-data result: all totals zero, no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total_events == 0
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the event export.
    pub source: String,
    /// Advisor the events were scoped to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Date range the analytics cover.
    pub window: DateWindow,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Events loaded before the window was applied.
    pub events_loaded: usize,
    /// Time spent loading and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// A complete analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub analytics: AnalyticsResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_calendar_date_ignores_time_component() {
        assert_eq!(parse_calendar_date("2024-03-05").unwrap(), date(2024, 3, 5));
        assert_eq!(
            parse_calendar_date("2024-03-31T23:30:00-08:00").unwrap(),
            date(2024, 3, 31)
        );
        assert_eq!(
            parse_calendar_date("2024-01-01T00:00:00Z").unwrap(),
            date(2024, 1, 1)
        );
        assert!(parse_calendar_date("03/05/2024").is_err());
        assert!(parse_calendar_date("").is_err());
    }

    #[test]
    fn test_event_deserializes_with_missing_sub_records() {
        let json = r#"{
            "id": 42,
            "event_name": "Spring Seminar",
            "event_date": "2024-04-10",
            "marketing_type": "Seminar",
            "attendance": { "attendees": 12, "plate_lickers": null }
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "42");
        assert_eq!(event.name.as_deref(), Some("Spring Seminar"));
        assert_eq!(event.date, date(2024, 4, 10));
        assert!(event.financial_production.is_none());
        assert!(event.marketing_expenses.is_none());

        let attendance = event.attendance.unwrap();
        assert_eq!(attendance.attendees, Some(12));
        assert_eq!(attendance.clients_from_event, None);
        assert_eq!(attendance.plate_lickers, None);
    }

    #[test]
    fn test_counts_accept_whole_floats() {
        let json = r#"{
            "id": "e-9",
            "date": "2024-04-10",
            "attendance": {
                "registrant_responses": 40.0,
                "attendees": 32.0,
                "confirmations": 2.5,
                "clients_from_event": "3"
            },
            "event_appointments": { "set_at_event": 4, "not_qualified": -1, "set_after_event": null }
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        let attendance = event.attendance.unwrap();
        assert_eq!(attendance.registrant_responses, Some(40));
        assert_eq!(attendance.attendees, Some(32));
        assert_eq!(attendance.confirmations, None);
        assert_eq!(attendance.clients_from_event, None);

        let appointments = event.event_appointments.unwrap();
        assert_eq!(appointments.set_at_event, Some(4));
        assert_eq!(appointments.not_qualified, None);
        assert_eq!(appointments.set_after_event, None);
    }

    #[test]
    fn test_event_rejects_bad_date() {
        let json = r#"{ "id": "a", "date": "not-a-date" }"#;
        let err = serde_json::from_str::<Event>(json).unwrap_err();
        assert!(err.to_string().contains("invalid event date"));
    }

    #[test]
    fn test_date_window_contains() {
        let window = DateWindow::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        assert!(window.contains(date(2024, 1, 1)));
        assert!(window.contains(date(2024, 1, 31)));
        assert!(!window.contains(date(2023, 12, 31)));
        assert!(!window.contains(date(2024, 2, 1)));

        let open = DateWindow::default();
        assert!(open.is_unbounded());
        assert!(open.contains(date(1999, 6, 15)));
        assert_eq!(open.to_string(), "all dates");
    }

    #[test]
    fn test_summary_serializes_overall_roi_key() {
        let summary = AnalyticsSummary {
            total_events: 1,
            overall_roi: 150.0,
            ..Default::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalEvents"], 1);
        assert_eq!(json["overallROI"], 150.0);
        assert!(json.get("overallConversionRate").is_some());
    }

    #[test]
    fn test_bucket_metrics_flatten_into_row() {
        let bucket = MonthlyBucket {
            month: "2024-03".to_string(),
            metrics: BucketMetrics {
                events: 2,
                revenue: 2000.0,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["month"], "2024-03");
        assert_eq!(json["events"], 2);
        assert_eq!(json["revenue"], 2000.0);
    }
}
