//! Default substitution for raw events.
//!
//! Every missing sub-record or field is resolved to zero here, once, so the
//! reductions downstream work on fully populated values.

use super::metrics::finite_or_zero;
use crate::models::Event;
use chrono::{Datelike, Weekday};

/// Category used when an event has no marketing type.
pub const OTHER_CATEGORY: &str = "Other";

/// An event with every numeric field resolved and revenue/profit derived.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent<'a> {
    pub source: &'a Event,
    pub category: &'a str,
    pub month_key: String,
    pub day_of_week: &'static str,
    pub registrants: u64,
    pub confirmations: u64,
    pub attendees: u64,
    pub clients: u64,
    /// Contribution to the plate-licker total; 0 when the raw value is not a number.
    pub plate_lickers: f64,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
    pub appointments_set: u64,
    pub appointments_made: u64,
    pub first_appointment_no_shows: u64,
    pub not_qualified: u64,
}

impl<'a> NormalizedEvent<'a> {
    pub fn new(event: &'a Event) -> Self {
        let attendance = event.attendance.as_ref();
        let production = event.financial_production.as_ref();
        let appointments = event.event_appointments.as_ref();

        let count = |value: Option<u64>| value.unwrap_or(0);
        let money = |value: Option<f64>| finite_or_zero(value.unwrap_or(0.0));

        let revenue = production.map_or(0.0, |p| {
            money(p.aum_fees)
                + money(p.annuity_commission)
                + money(p.life_insurance_commission)
                + money(p.financial_planning)
        });
        let expenses = event
            .marketing_expenses
            .as_ref()
            .map_or(0.0, |e| money(e.total_cost));

        Self {
            source: event,
            category: category_of(event),
            month_key: month_key(event),
            day_of_week: weekday_name(event.date.weekday()),
            registrants: attendance.map_or(0, |a| count(a.registrant_responses)),
            confirmations: attendance.map_or(0, |a| count(a.confirmations)),
            attendees: attendance.map_or(0, |a| count(a.attendees)),
            clients: attendance.map_or(0, |a| count(a.clients_from_event)),
            plate_lickers: attendance
                .and_then(|a| a.plate_lickers.as_ref())
                .and_then(numeric_headcount)
                .unwrap_or(0.0),
            revenue,
            expenses,
            profit: revenue - expenses,
            appointments_set: appointments.map_or(0, |a| {
                count(a.set_at_event) + count(a.set_after_event)
            }),
            appointments_made: appointments.map_or(0, |a| {
                count(a.first_appointment_attended) + count(a.second_appointment_attended)
            }),
            first_appointment_no_shows: appointments
                .map_or(0, |a| count(a.first_appointment_no_shows)),
            not_qualified: appointments.map_or(0, |a| count(a.not_qualified)),
        }
    }
}

/// Normalize a sequence of events, preserving order.
pub fn normalize_all<'a, I>(events: I) -> Vec<NormalizedEvent<'a>>
where
    I: IntoIterator<Item = &'a Event>,
{
    events.into_iter().map(NormalizedEvent::new).collect()
}

/// `YYYY-MM` built from the literal date components.
pub fn month_key(event: &Event) -> String {
    format!("{:04}-{:02}", event.date.year(), event.date.month())
}

/// Marketing type as stored, or [`OTHER_CATEGORY`] when absent or blank.
pub fn category_of(event: &Event) -> &str {
    match event.marketing_type.as_deref() {
        Some(category) if !category.trim().is_empty() => category,
        _ => OTHER_CATEGORY,
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Any present JSON number counts as stored; null and strings are skipped.
fn numeric_headcount(value: &serde_json::Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attendance, EventAppointments, FinancialProduction, MarketingExpenses};
    use chrono::NaiveDate;
    use serde_json::json;

    fn event_on(y: i32, m: u32, d: u32) -> Event {
        Event::new("e1", NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_missing_sub_records_default_to_zero() {
        let event = event_on(2024, 3, 5);
        let n = NormalizedEvent::new(&event);

        assert_eq!(n.revenue, 0.0);
        assert_eq!(n.expenses, 0.0);
        assert_eq!(n.profit, 0.0);
        assert_eq!(n.attendees, 0);
        assert_eq!(n.clients, 0);
        assert_eq!(n.appointments_set, 0);
        assert_eq!(n.plate_lickers, 0.0);
        assert_eq!(n.category, OTHER_CATEGORY);
    }

    #[test]
    fn test_revenue_and_profit_derivation() {
        let mut event = event_on(2024, 3, 5);
        event.financial_production = Some(FinancialProduction {
            aum_fees: Some(1000.0),
            annuity_commission: Some(250.0),
            life_insurance_commission: None,
            financial_planning: Some(50.0),
        });
        event.marketing_expenses = Some(MarketingExpenses {
            total_cost: Some(300.0),
        });

        let n = NormalizedEvent::new(&event);
        assert_eq!(n.revenue, 1300.0);
        assert_eq!(n.expenses, 300.0);
        assert_eq!(n.profit, n.revenue - n.expenses);
    }

    #[test]
    fn test_funnel_counts() {
        let mut event = event_on(2024, 3, 5);
        event.event_appointments = Some(EventAppointments {
            set_at_event: Some(4),
            set_after_event: Some(2),
            first_appointment_attended: Some(3),
            first_appointment_no_shows: Some(1),
            second_appointment_attended: None,
            not_qualified: Some(2),
        });

        let n = NormalizedEvent::new(&event);
        assert_eq!(n.appointments_set, 6);
        assert_eq!(n.appointments_made, 3);
        assert_eq!(n.first_appointment_no_shows, 1);
        assert_eq!(n.not_qualified, 2);
    }

    #[test]
    fn test_plate_lickers_count_every_present_number() {
        let mut event = event_on(2024, 3, 5);
        let mut with = |value: serde_json::Value| {
            event.attendance = Some(Attendance {
                plate_lickers: Some(value),
                ..Default::default()
            });
            NormalizedEvent::new(&event).plate_lickers
        };

        assert_eq!(with(json!(5)), 5.0);
        assert_eq!(with(json!(3.0)), 3.0);
        assert_eq!(with(json!(-2)), -2.0);
        assert_eq!(with(json!(1.5)), 1.5);
        assert_eq!(with(json!(null)), 0.0);
        assert_eq!(with(json!("7")), 0.0);
        assert_eq!(with(json!(true)), 0.0);
    }

    #[test]
    fn test_month_key_and_weekday_use_literal_date() {
        let event = event_on(2024, 3, 31);
        let n = NormalizedEvent::new(&event);
        assert_eq!(n.month_key, "2024-03");
        assert_eq!(n.day_of_week, "Sunday");

        let event = event_on(987, 1, 1);
        assert_eq!(month_key(&event), "0987-01");
    }

    #[test]
    fn test_blank_category_is_other() {
        let mut event = event_on(2024, 3, 5);
        event.marketing_type = Some("   ".to_string());
        assert_eq!(category_of(&event), OTHER_CATEGORY);

        event.marketing_type = Some("Seminar".to_string());
        assert_eq!(category_of(&event), "Seminar");
    }

    #[test]
    fn test_category_key_is_kept_as_stored() {
        let mut event = event_on(2024, 3, 5);
        event.marketing_type = Some("Seminar ".to_string());
        assert_eq!(category_of(&event), "Seminar ");
        assert_eq!(NormalizedEvent::new(&event).category, "Seminar ");
    }
}
