//! Statistics Aggregator
//!
//! [`summarize`] turns a sequence of events into an [`ErrorSummary`] in one
//! pass. [`StatsAggregator`] wires it to a [`LogStore`] for per-day and
//! multi-day reports.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::event_store::LogStore;
use crate::types::{ErrorSummary, Event, MessageCount, Severity, TOP_MESSAGES};
use crate::utils::hour_bucket;

/// Summarize events
///
/// Top messages are ranked by count, ties broken by the order in which a
/// message first appears in `events`.
pub fn summarize(events: &[Event]) -> ErrorSummary {
    let mut summary = ErrorSummary::default();
    // message -> (first seen position, count)
    let mut messages: HashMap<&str, (usize, usize)> = HashMap::new();

    for event in events {
        summary.total += 1;
        match event.severity {
            Severity::Fatal => summary.fatal += 1,
            Severity::Warning => summary.warning += 1,
        }
        *summary.by_category.entry(event.category).or_insert(0) += 1;
        *summary.by_kind.entry(event.kind).or_insert(0) += 1;
        *summary.by_hour.entry(hour_bucket(&event.timestamp)).or_insert(0) += 1;

        let next_position = messages.len();
        messages
            .entry(event.message.as_str())
            .or_insert((next_position, 0))
            .1 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = messages
        .into_iter()
        .map(|(message, (first_seen, count))| (message, first_seen, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));

    summary.top_messages = ranked
        .into_iter()
        .take(TOP_MESSAGES)
        .map(|(message, _, count)| MessageCount {
            message: message.to_string(),
            count,
        })
        .collect();

    summary
}

/// Read-side facade for operators: summaries straight from the store
pub struct StatsAggregator {
    store: Arc<LogStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }

    /// Summary of one day's partition
    pub fn summarize_date(&self, date: NaiveDate) -> ErrorSummary {
        summarize(&self.store.read(date, None))
    }

    /// One summary per day from `from` to `to` inclusive
    pub fn daily_summaries(&self, from: NaiveDate, to: NaiveDate) -> Vec<(NaiveDate, ErrorSummary)> {
        from.iter_days()
            .take_while(|date| *date <= to)
            .map(|date| (date, self.summarize_date(date)))
            .collect()
    }

    /// Single summary across every day from `from` to `to` inclusive
    pub fn summarize_range(&self, from: NaiveDate, to: NaiveDate) -> ErrorSummary {
        summarize(&self.store.read_range(from, to, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;
    use crate::types::{Category, EventKind};
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn event(message: &str, severity: Severity, category: Category, hour: u32) -> Event {
        Event::new(EventKind::Database, category, severity, message).with_timestamp(at(hour, 0))
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert!(summary.is_empty());
        assert!(summary.top_messages.is_empty());
        assert_eq!(summary.fatal_ratio(), 0.0);
    }

    #[test]
    fn test_counts() {
        let events = vec![
            event("a", Severity::Fatal, Category::Connection, 9),
            event("b", Severity::Warning, Category::Query, 9),
            event("b", Severity::Warning, Category::Query, 10),
            Event::new(EventKind::System, Category::Unknown, Severity::Warning, "c")
                .with_timestamp(at(10, 30)),
        ];

        let summary = summarize(&events);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.fatal, 1);
        assert_eq!(summary.warning, 3);
        assert_eq!(summary.category_count(Category::Query), 2);
        assert_eq!(summary.category_count(Category::Unknown), 1);
        assert_eq!(summary.category_count(Category::Permission), 0);
        assert_eq!(summary.kind_count(EventKind::Database), 3);
        assert_eq!(summary.kind_count(EventKind::System), 1);
        assert_eq!(summary.by_hour["2026-03-14 09:00"], 2);
        assert_eq!(summary.by_hour["2026-03-14 10:00"], 2);
        assert_eq!(summary.fatal_ratio(), 0.25);
    }

    #[test]
    fn test_hour_buckets_keep_the_date() {
        let next_day = NaiveDate::from_ymd_opt(2026, 3, 15)
            .unwrap()
            .and_hms_opt(9, 45, 0)
            .unwrap();
        let events = vec![
            event("a", Severity::Warning, Category::Query, 9),
            Event::new(EventKind::Database, Category::Query, Severity::Warning, "a")
                .with_timestamp(next_day),
        ];

        let summary = summarize(&events);
        assert_eq!(summary.by_hour.len(), 2);
        assert_eq!(summary.by_hour["2026-03-14 09:00"], 1);
        assert_eq!(summary.by_hour["2026-03-15 09:00"], 1);
    }

    #[test]
    fn test_ranking_ties_follow_first_seen_order() {
        let mut events = Vec::new();
        for message in ["A", "B", "C", "B", "A", "B", "A"] {
            events.push(event(message, Severity::Warning, Category::Query, 8));
        }

        let summary = summarize(&events);
        let ranked: Vec<(&str, usize)> = summary
            .top_messages
            .iter()
            .map(|m| (m.message.as_str(), m.count))
            .collect();
        assert_eq!(ranked, vec![("A", 3), ("B", 3), ("C", 1)]);
    }

    #[test]
    fn test_top_messages_capped_at_ten() {
        let events: Vec<Event> = (0..15)
            .flat_map(|i| {
                (0..=i).map(move |_| event(&format!("m{i}"), Severity::Warning, Category::System, 1))
            })
            .collect();

        let summary = summarize(&events);
        assert_eq!(summary.top_messages.len(), TOP_MESSAGES);
        assert_eq!(summary.top_messages[0].message, "m14");
        assert_eq!(summary.top_messages[0].count, 15);
        assert_eq!(summary.top_messages[9].message, "m5");
    }

    #[test]
    fn test_aggregator_reads_from_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(LogStore::open(LogConfig::new(temp_dir.path())).unwrap());
        store.append(&event("down", Severity::Fatal, Category::Connection, 3)).unwrap();
        store.append(&event("slow", Severity::Warning, Category::Query, 4)).unwrap();

        let aggregator = StatsAggregator::new(Arc::clone(&store));
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let summary = aggregator.summarize_date(day);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.fatal, 1);

        let daily = aggregator.daily_summaries(day.pred_opt().unwrap(), day);
        assert_eq!(daily.len(), 2);
        assert!(daily[0].1.is_empty());
        assert_eq!(daily[1].1.total, 2);

        assert_eq!(aggregator.summarize_range(day, day), summary);
    }
}
