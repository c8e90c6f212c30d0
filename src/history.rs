use crate::models::Event;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Per-subject event log, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    events: VecDeque<Event>,
}

impl HistoryLog {
    pub fn prepend(&mut self, event: Event) {
        self.events.push_front(event);
    }

    pub fn pop_head(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn pop_oldest(&mut self) -> Option<Event> {
        self.events.pop_back()
    }

    /// Keeps the newest `max_len` events.
    pub fn truncate(&mut self, max_len: usize) {
        self.events.truncate(max_len);
    }

    pub fn head(&self) -> Option<&Event> {
        self.events.front()
    }

    pub fn oldest(&self) -> Option<&Event> {
        self.events.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;
    use chrono::{DateTime, Duration, Utc};

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap() + Duration::seconds(seconds)
    }

    #[test]
    fn prepend_keeps_newest_first() {
        let mut log = HistoryLog::default();
        log.prepend(Event::new(EventKind::Present, at(0)));
        log.prepend(Event::new(EventKind::Absent, at(1)));

        assert_eq!(log.len(), 2);
        assert_eq!(log.head().map(|e| e.kind), Some(EventKind::Absent));
        assert_eq!(log.oldest().map(|e| e.kind), Some(EventKind::Present));
    }

    #[test]
    fn pop_head_on_empty_log_is_none() {
        let mut log = HistoryLog::default();
        assert!(log.pop_head().is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn truncate_drops_oldest_entries() {
        let mut log = HistoryLog::default();
        for second in 0..5 {
            log.prepend(Event::new(EventKind::Present, at(second)));
        }

        log.truncate(3);

        let stamps: Vec<_> = log.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![at(4), at(3), at(2)]);
    }

    #[test]
    fn pops_from_both_ends() {
        let mut log = HistoryLog::default();
        for second in 0..3 {
            log.prepend(Event::new(EventKind::Present, at(second)));
        }

        assert_eq!(log.pop_head().map(|e| e.timestamp), Some(at(2)));
        assert_eq!(log.pop_oldest().map(|e| e.timestamp), Some(at(0)));
        assert_eq!(log.head().map(|e| e.timestamp), Some(at(1)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut log = HistoryLog::default();
        log.prepend(Event::new(EventKind::Absent, at(0)));

        let value = serde_json::to_value(&log).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["kind"], "absent");
    }
}
