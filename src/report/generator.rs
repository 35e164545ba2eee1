//! Markdown and JSON report generation.
//!
//! This module renders an analytics [`Report`] for people (Markdown) and
//! for other tools (JSON).

use crate::analysis::top_events_by_profit;
use crate::config::ReportConfig;
use crate::models::{
    AnalyticsSummary, BucketMetrics, DerivedEvent, MonthlyBucket, Report, ReportMetadata,
    RoiValue, TypeBucket,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportConfig) -> String {
    let mut output = String::new();
    let analytics = &report.analytics;
    let currency = options.currency_symbol.as_str();

    output.push_str("# M8 Event Analytics Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    if analytics.is_empty() {
        output.push_str("## Summary\n\n");
        output.push_str("No events in the selected period.\n\n");
        output.push_str(&generate_footer());
        return output;
    }

    output.push_str(&generate_summary_section(&analytics.summary, currency));
    output.push_str(&generate_monthly_section(&analytics.monthly_data, currency));
    output.push_str(&generate_type_section(&analytics.metrics_by_type, currency));
    output.push_str(&generate_top_events_section(
        &analytics.events,
        options.top_events,
        currency,
    ));

    if options.include_events_table {
        output.push_str(&generate_events_section(&analytics.events, currency));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    if let Some(ref user_id) = metadata.user_id {
        section.push_str(&format!("- **Advisor:** {}\n", user_id));
    }
    section.push_str(&format!("- **Period:** {}\n", metadata.window));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Events Loaded:** {}\n", metadata.events_loaded));
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &AnalyticsSummary, currency: &str) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    section.push_str("### Financials\n\n");
    section.push_str("| Events | Revenue | Expenses | Profit | ROI |\n");
    section.push_str("|:---:|---:|---:|---:|---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        summary.total_events,
        format_currency(summary.total_revenue, currency),
        format_currency(summary.total_expenses, currency),
        format_currency(summary.total_profit, currency),
        format_roi(summary.overall_roi),
    ));

    section.push_str("### Attendance\n\n");
    section.push_str("| Registrants | Attendees | Avg / Event | Clients | Conversion | Plate Lickers |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {:.1} | {} | {} | {} |\n\n",
        summary.total_registrants,
        summary.total_attendees,
        summary.avg_attendees,
        summary.total_clients,
        format_percent(summary.overall_conversion_rate),
        summary.total_plate_lickers,
    ));

    section.push_str("### Appointment Funnel\n\n");
    section.push_str("| Set | Made | First-Appt No-Shows | Not Qualified |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        summary.total_appointments_set,
        summary.total_appointments_made,
        summary.total_first_appointment_no_shows,
        summary.total_not_qualified,
    ));

    section
}

fn bucket_header(key: &str) -> String {
    format!(
        "| {} | Events | Attendees | Clients | Revenue | Expenses | Profit | ROI | Conversion |\n\
         |:---|:---:|:---:|:---:|---:|---:|---:|---:|---:|\n",
        key
    )
}

fn bucket_row(key: &str, metrics: &BucketMetrics, currency: &str) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
        key.replace('|', "\\|"),
        metrics.events,
        metrics.attendees,
        metrics.clients,
        format_currency(metrics.revenue, currency),
        format_currency(metrics.expenses, currency),
        format_currency(metrics.profit, currency),
        format_roi(metrics.roi),
        format_percent(metrics.conversion_rate),
    )
}

/// Generate the month-by-month table.
fn generate_monthly_section(months: &[MonthlyBucket], currency: &str) -> String {
    let mut section = String::new();

    section.push_str("## Monthly Performance\n\n");
    section.push_str(&bucket_header("Month"));
    for bucket in months {
        section.push_str(&bucket_row(&bucket.month, &bucket.metrics, currency));
    }
    section.push('\n');

    section
}

/// Generate the marketing-type table.
fn generate_type_section(types: &[TypeBucket], currency: &str) -> String {
    let mut section = String::new();

    section.push_str("## Performance by Marketing Type\n\n");
    section.push_str(&bucket_header("Type"));
    for bucket in types {
        section.push_str(&bucket_row(&bucket.marketing_type, &bucket.metrics, currency));
    }
    section.push('\n');

    section
}

/// Generate the most-profitable-events list.
fn generate_top_events_section(events: &[DerivedEvent], n: usize, currency: &str) -> String {
    let top = top_events_by_profit(events, n);
    if top.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Top Events by Profit\n\n");
    for (i, event) in top.iter().enumerate() {
        section.push_str(&format!(
            "{}. **{}** ({}, {}) - profit {}, ROI {}\n",
            i + 1,
            display_name(event),
            event.date.format("%Y-%m-%d"),
            event.marketing_type,
            format_currency(event.profit, currency),
            format_roi_value(&event.roi),
        ));
    }
    section.push('\n');

    section
}

/// Generate the full per-event table.
fn generate_events_section(events: &[DerivedEvent], currency: &str) -> String {
    let mut section = String::new();

    section.push_str("## All Events\n\n");
    section.push_str(
        "| Date | Day | Event | Type | Attendees | Clients | Revenue | Expenses | Profit | ROI | Conversion | Appts Set | Appts Made |\n",
    );
    section.push_str("|:---|:---|:---|:---|:---:|:---:|---:|---:|---:|---:|---:|:---:|:---:|\n");

    for event in events {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            event.date.format("%Y-%m-%d"),
            event.day_of_week,
            display_name(event).replace('|', "\\|"),
            event.marketing_type.replace('|', "\\|"),
            event.attendees,
            event.clients,
            format_currency(event.revenue, currency),
            format_currency(event.expenses, currency),
            format_currency(event.profit, currency),
            format_roi_value(&event.roi),
            format_percent(event.conversion_rate),
            event.appointments_set,
            event.appointments_made,
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by m8-analytics v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

fn display_name(event: &DerivedEvent) -> &str {
    event
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(&event.id)
}

/// `$12,345.67`, with the sign ahead of the symbol.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}{}.{:02}", sign, symbol, grouped, cents % 100)
}

/// One decimal place percentage.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// ROI percentage, or a marker for the zero-spend sentinel.
pub fn format_roi(value: f64) -> String {
    format_roi_value(&RoiValue { value })
}

fn format_roi_value(roi: &RoiValue) -> String {
    if roi.is_sentinel() {
        "N/A (no spend)".to_string()
    } else {
        format_percent(roi.value)
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
