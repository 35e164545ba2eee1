//! Event aggregation and statistics.
//!
//! Turns raw events into the overall summary, the per-event projection and
//! the month and marketing-type rollups shown on the dashboard.

use super::metrics::{average, conversion_rate, roi};
use super::normalize::{normalize_all, NormalizedEvent};
use crate::models::{
    AnalyticsResult, AnalyticsSummary, BucketMetrics, DateWindow, DerivedEvent, Event,
    MonthlyBucket, RoiValue, TypeBucket,
};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Aggregate every event.
pub fn aggregate(events: &[Event]) -> AnalyticsResult {
    aggregate_normalized(normalize_all(events))
}

/// Aggregate only the events dated inside `window`.
pub fn aggregate_window(events: &[Event], window: &DateWindow) -> AnalyticsResult {
    aggregate_normalized(normalize_all(
        events.iter().filter(|e| window.contains(e.date)),
    ))
}

fn aggregate_normalized(normalized: Vec<NormalizedEvent<'_>>) -> AnalyticsResult {
    if normalized.is_empty() {
        debug!("No events to aggregate");
        return AnalyticsResult::empty();
    }

    debug!("Aggregating {} events", normalized.len());

    AnalyticsResult {
        summary: summarize(&normalized),
        events: project_events(&normalized),
        monthly_data: group_by_month(&normalized),
        metrics_by_type: group_by_type(&normalized),
    }
}

/// Single reduction producing the overall totals and rates.
pub fn summarize(events: &[NormalizedEvent<'_>]) -> AnalyticsSummary {
    let mut summary = AnalyticsSummary {
        total_events: events.len(),
        ..Default::default()
    };

    for event in events {
        summary.total_attendees += event.attendees;
        summary.total_revenue += event.revenue;
        summary.total_expenses += event.expenses;
        summary.total_clients += event.clients;
        summary.total_registrants += event.registrants;
        summary.total_appointments_set += event.appointments_set;
        summary.total_appointments_made += event.appointments_made;
        summary.total_plate_lickers += event.plate_lickers;
        summary.total_first_appointment_no_shows += event.first_appointment_no_shows;
        summary.total_not_qualified += event.not_qualified;
    }

    summary.total_profit = summary.total_revenue - summary.total_expenses;
    summary.avg_attendees = average(summary.total_attendees, summary.total_events);
    summary.overall_roi = roi(summary.total_revenue, summary.total_expenses);
    summary.overall_conversion_rate =
        conversion_rate(summary.total_clients, summary.total_attendees);

    summary
}

/// Flatten each event into its display row.
pub fn project_events(events: &[NormalizedEvent<'_>]) -> Vec<DerivedEvent> {
    events
        .iter()
        .map(|event| {
            let source = event.source;
            DerivedEvent {
                id: source.id.clone(),
                name: source.name.clone(),
                date: source.date,
                day_of_week: event.day_of_week.to_string(),
                location: source.location.clone(),
                marketing_type: event.category.to_string(),
                topic: source.topic.clone(),
                time: source.time.clone(),
                registrants: event.registrants,
                confirmations: event.confirmations,
                attendees: event.attendees,
                clients: event.clients,
                plate_lickers: source
                    .attendance
                    .as_ref()
                    .and_then(|a| a.plate_lickers.clone()),
                revenue: event.revenue,
                expenses: event.expenses,
                profit: event.profit,
                roi: RoiValue {
                    value: roi(event.revenue, event.expenses),
                },
                conversion_rate: conversion_rate(event.clients, event.attendees),
                appointments_set: event.appointments_set,
                appointments_made: event.appointments_made,
                first_appointment_no_shows: event.first_appointment_no_shows,
                not_qualified: event.not_qualified,
            }
        })
        .collect()
}

/// Running totals for one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketAccumulator {
    events: usize,
    attendees: u64,
    clients: u64,
    revenue: f64,
    expenses: f64,
}

impl BucketAccumulator {
    pub fn add(&mut self, event: &NormalizedEvent<'_>) {
        self.events += 1;
        self.attendees += event.attendees;
        self.clients += event.clients;
        self.revenue += event.revenue;
        self.expenses += event.expenses;
    }

    /// Derive profit and rates from the accumulated totals.
    pub fn finalize(&self) -> BucketMetrics {
        BucketMetrics {
            events: self.events,
            attendees: self.attendees,
            clients: self.clients,
            revenue: self.revenue,
            expenses: self.expenses,
            profit: self.revenue - self.expenses,
            avg_attendees: average(self.attendees, self.events),
            roi: roi(self.revenue, self.expenses),
            conversion_rate: conversion_rate(self.clients, self.attendees),
        }
    }
}

/// Accumulate events per `YYYY-MM` key.
pub fn accumulate_by_month(events: &[NormalizedEvent<'_>]) -> BTreeMap<String, BucketAccumulator> {
    let mut months: BTreeMap<String, BucketAccumulator> = BTreeMap::new();

    for event in events {
        months
            .entry(event.month_key.clone())
            .or_default()
            .add(event);
    }

    months
}

/// Monthly rollup, ascending by month.
pub fn group_by_month(events: &[NormalizedEvent<'_>]) -> Vec<MonthlyBucket> {
    accumulate_by_month(events)
        .into_iter()
        .map(|(month, acc)| MonthlyBucket {
            month,
            metrics: acc.finalize(),
        })
        .collect()
}

/// Accumulate events per marketing type, in first-seen order.
pub fn accumulate_by_type<'a>(events: &[NormalizedEvent<'a>]) -> Vec<(&'a str, BucketAccumulator)> {
    let mut buckets: Vec<(&'a str, BucketAccumulator)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for event in events {
        let slot = *index.entry(event.category).or_insert_with(|| {
            buckets.push((event.category, BucketAccumulator::default()));
            buckets.len() - 1
        });
        buckets[slot].1.add(event);
    }

    buckets
}

/// Marketing-type rollup, in first-seen order.
pub fn group_by_type(events: &[NormalizedEvent<'_>]) -> Vec<TypeBucket> {
    accumulate_by_type(events)
        .into_iter()
        .map(|(category, acc)| TypeBucket {
            marketing_type: category.to_string(),
            metrics: acc.finalize(),
        })
        .collect()
}

/// The `n` most profitable events, highest first.
pub fn top_events_by_profit(events: &[DerivedEvent], n: usize) -> Vec<&DerivedEvent> {
    let mut ranked: Vec<&DerivedEvent> = events.iter().collect();
    ranked.sort_by(|a, b| b.profit.total_cmp(&a.profit));
    ranked.truncate(n);
    ranked
}
