//! CSV export of the per-event projection.

use crate::models::DerivedEvent;
use anyhow::{Context, Result};

const HEADER: [&str; 22] = [
    "id",
    "name",
    "date",
    "day_of_week",
    "location",
    "marketing_type",
    "topic",
    "time",
    "registrants",
    "confirmations",
    "attendees",
    "clients",
    "plate_lickers",
    "revenue",
    "expenses",
    "profit",
    "roi",
    "conversion_rate",
    "appointments_set",
    "appointments_made",
    "first_appointment_no_shows",
    "not_qualified",
];

/// One header row, then one row per event.
pub fn generate_csv_report(events: &[DerivedEvent]) -> Result<String> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for event in events {
        writer.write_record([
            event.id.clone(),
            event.name.clone().unwrap_or_default(),
            event.date.format("%Y-%m-%d").to_string(),
            event.day_of_week.clone(),
            event.location.clone().unwrap_or_default(),
            event.marketing_type.clone(),
            event.topic.clone().unwrap_or_default(),
            event.time.clone().unwrap_or_default(),
            event.registrants.to_string(),
            event.confirmations.to_string(),
            event.attendees.to_string(),
            event.clients.to_string(),
            raw_cell(event.plate_lickers.as_ref()),
            event.revenue.to_string(),
            event.expenses.to_string(),
            event.profit.to_string(),
            event.roi.value.to_string(),
            event.conversion_rate.to_string(),
            event.appointments_set.to_string(),
            event.appointments_made.to_string(),
            event.first_appointment_no_shows.to_string(),
            event.not_qualified.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

fn raw_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate;
    use crate::models::{Attendance, Event, FinancialProduction};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_csv_rows() {
        let mut event = Event::new("e-1", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        event.name = Some("Dinner, Downtown".to_string());
        event.marketing_type = Some("Seminar".to_string());
        event.attendance = Some(Attendance {
            attendees: Some(10),
            clients_from_event: Some(2),
            plate_lickers: Some(json!(3)),
            ..Default::default()
        });
        event.financial_production = Some(FinancialProduction {
            aum_fees: Some(1000.0),
            ..Default::default()
        });

        let result = aggregate(&[event]);
        let csv = generate_csv_report(&result.events).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,name,date,day_of_week"));
        assert_eq!(lines[0].split(',').count(), HEADER.len());
        assert!(lines[1].starts_with("e-1,\"Dinner, Downtown\",2024-03-05,Tuesday,,Seminar"));
        assert!(lines[1].contains(",3,1000,0,1000,9999,20,"));
    }

    #[test]
    fn test_csv_empty() {
        let csv = generate_csv_report(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_csv_quotes_free_text_fields() {
        let mut event = Event::new("e-2", NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        event.name = Some("The \"Big\" Dinner".to_string());
        event.location = Some("Suite 4\nMain St".to_string());
        event.topic = Some("Taxes, Estates".to_string());

        let result = aggregate(&[event]);
        let csv = generate_csv_report(&result.events).unwrap();

        assert!(csv.contains("e-2,\"The \"\"Big\"\" Dinner\",2024-04-01,Monday,\"Suite 4\nMain St\",Other,\"Taxes, Estates\","));

        let mut reader = ::csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<::csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), HEADER.len());
        assert_eq!(&rows[0][1], "The \"Big\" Dinner");
        assert_eq!(&rows[0][4], "Suite 4\nMain St");
    }

    #[test]
    fn test_raw_cell() {
        assert_eq!(raw_cell(None), "");
        assert_eq!(raw_cell(Some(&json!(null))), "");
        assert_eq!(raw_cell(Some(&json!("n/a"))), "n/a");
        assert_eq!(raw_cell(Some(&json!(4))), "4");
    }
}
