//! Attendance engine: the only place subjects and their histories are mutated.

use crate::errors::TrackerError;
use crate::models::{
    DEFAULT_TARGET_PERCENTAGE, Direction, EditSnapshot, Event, EventKind, Subject, SubjectId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Whether undo may revert an `edited` annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UndoPolicy {
    /// Only `present`/`absent` are reversible; an edit at the head blocks undo.
    #[default]
    PresenceOnly,
    /// An edit at the head restores the counts and name it replaced.
    IncludeEdits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOptions {
    /// Limit on the number of events kept across all subjects; `None` is unbounded.
    pub history_cap: Option<usize>,
    pub undo_policy: UndoPolicy,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            history_cap: Some(100),
            undo_policy: UndoPolicy::PresenceOnly,
        }
    }
}

/// New values for an edit. Counts are signed so negative input can be rejected.
#[derive(Debug, Clone)]
pub struct SubjectEdit {
    pub name: String,
    pub attended: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub subject_id: SubjectId,
    pub subject: String,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Default)]
pub struct Tracker {
    subjects: Vec<Subject>,
    options: TrackerOptions,
}

impl Tracker {
    pub fn new(options: TrackerOptions) -> Self {
        Self {
            subjects: Vec::new(),
            options,
        }
    }

    /// Takes ownership of a loaded collection, repairing counts and targets
    /// that break their invariants and applying the history cap.
    pub fn with_subjects(mut subjects: Vec<Subject>, options: TrackerOptions) -> Self {
        for subject in &mut subjects {
            if subject.attended_classes > subject.total_classes {
                warn!(
                    subject = %subject.id,
                    attended = subject.attended_classes,
                    total = subject.total_classes,
                    "attended count exceeds total, clamping"
                );
                subject.attended_classes = subject.total_classes;
            }
            if validate_target(subject.target_percentage).is_err() {
                let repaired = if subject.target_percentage.is_finite() {
                    subject.target_percentage.clamp(0.0, 100.0)
                } else {
                    DEFAULT_TARGET_PERCENTAGE
                };
                warn!(
                    subject = %subject.id,
                    target = subject.target_percentage,
                    repaired,
                    "target percentage out of range, repairing"
                );
                subject.target_percentage = repaired;
            }
            if let Some(cap) = options.history_cap {
                subject.history.truncate(cap);
            }
        }

        let mut tracker = Self { subjects, options };
        tracker.enforce_history_cap();
        tracker
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }

    pub fn history_len(&self) -> usize {
        self.subjects.iter().map(|s| s.history.len()).sum()
    }

    pub fn add_subject(&mut self, name: &str, target: f64) -> Result<&Subject, TrackerError> {
        let name = validate_name(name)?;
        validate_target(target)?;

        info!(subject = name, target, "subject added");
        self.subjects.push(Subject::new(name, target));
        Ok(&self.subjects[self.subjects.len() - 1])
    }

    pub fn delete_subject(&mut self, id: &SubjectId) -> bool {
        let before = self.subjects.len();
        self.subjects.retain(|s| &s.id != id);
        let removed = self.subjects.len() != before;
        if removed {
            info!(subject = %id, "subject deleted");
        } else {
            debug!(subject = %id, "delete ignored, unknown subject");
        }
        removed
    }

    pub fn mark_present(&mut self, id: &SubjectId) -> bool {
        self.mark_present_at(id, Utc::now())
    }

    pub fn mark_present_at(&mut self, id: &SubjectId, now: DateTime<Utc>) -> bool {
        self.record(id, EventKind::Present, now)
    }

    pub fn mark_absent(&mut self, id: &SubjectId) -> bool {
        self.mark_absent_at(id, Utc::now())
    }

    pub fn mark_absent_at(&mut self, id: &SubjectId, now: DateTime<Utc>) -> bool {
        self.record(id, EventKind::Absent, now)
    }

    /// Reverses the newest history entry and returns its kind, or `None` when
    /// nothing was undone.
    pub fn undo_last_action(&mut self, id: &SubjectId) -> Option<EventKind> {
        let policy = self.options.undo_policy;
        let subject = self.subject_mut(id)?;
        let head = subject.history.head()?;
        if !is_reversible(head, policy) {
            debug!(subject = %id, "undo blocked by edit annotation");
            return None;
        }

        let event = subject.history.pop_head()?;
        match event.kind {
            EventKind::Present => {
                subject.attended_classes = subject.attended_classes.saturating_sub(1);
                subject.total_classes = subject.total_classes.saturating_sub(1);
            }
            EventKind::Absent => {
                subject.total_classes = subject.total_classes.saturating_sub(1);
                subject.attended_classes = subject.attended_classes.min(subject.total_classes);
            }
            EventKind::Edited => {
                if let Some(previous) = event.previous {
                    subject.name = previous.name;
                    subject.total_classes = previous.total_classes;
                    subject.attended_classes = previous.attended_classes.min(previous.total_classes);
                }
            }
        }

        info!(subject = %id, kind = ?event.kind, "last action undone");
        Some(event.kind)
    }

    /// Whether `undo_last_action` would change the subject.
    pub fn can_undo(&self, id: &SubjectId) -> bool {
        self.subject(id)
            .and_then(|s| s.history.head())
            .is_some_and(|head| is_reversible(head, self.options.undo_policy))
    }

    pub fn edit_subject(&mut self, id: &SubjectId, edit: SubjectEdit) -> Result<bool, TrackerError> {
        self.edit_subject_at(id, edit, Utc::now())
    }

    pub fn edit_subject_at(
        &mut self,
        id: &SubjectId,
        edit: SubjectEdit,
        now: DateTime<Utc>,
    ) -> Result<bool, TrackerError> {
        let name = validate_name(&edit.name)?;
        let attended = validate_count("present", edit.attended)?;
        let total = validate_count("total", edit.total)?;
        if attended > total {
            return Err(TrackerError::validation(
                "present classes cannot be greater than total classes",
            ));
        }

        let Some(subject) = self.subject_mut(id) else {
            debug!(subject = %id, "edit ignored, unknown subject");
            return Ok(false);
        };

        let previous: EditSnapshot = subject.snapshot();
        subject.name = name.to_string();
        subject.attended_classes = attended;
        subject.total_classes = total;
        subject.history.prepend(Event::edited(name, previous, now));

        info!(subject = %id, attended, total, "subject edited");
        self.enforce_history_cap();
        Ok(true)
    }

    pub fn set_target(&mut self, id: &SubjectId, target: f64) -> Result<bool, TrackerError> {
        validate_target(target)?;
        let Some(subject) = self.subject_mut(id) else {
            return Ok(false);
        };
        subject.target_percentage = target;
        info!(subject = %id, target, "target updated");
        Ok(true)
    }

    pub fn reorder(&mut self, id: &SubjectId, direction: Direction) -> bool {
        let Some(index) = self.subjects.iter().position(|s| &s.id == id) else {
            return false;
        };
        let other = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.subjects.len() => index + 1,
            _ => return false,
        };
        self.subjects.swap(index, other);
        true
    }

    /// Every subject's events merged into one newest-first feed.
    pub fn activity(&self) -> Vec<ActivityEntry> {
        let mut entries: Vec<ActivityEntry> = self
            .subjects
            .iter()
            .flat_map(|subject| {
                subject.history.iter().map(move |event| ActivityEntry {
                    subject_id: subject.id.clone(),
                    subject: event.name.clone().unwrap_or_else(|| subject.name.clone()),
                    event: event.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| b.event.timestamp.cmp(&a.event.timestamp));
        entries
    }

    fn record(&mut self, id: &SubjectId, kind: EventKind, now: DateTime<Utc>) -> bool {
        let Some(subject) = self.subject_mut(id) else {
            debug!(subject = %id, ?kind, "mark ignored, unknown subject");
            return false;
        };

        subject.total_classes = subject.total_classes.saturating_add(1);
        if kind == EventKind::Present {
            subject.attended_classes = subject.attended_classes.saturating_add(1);
        }
        subject.history.prepend(Event::new(kind, now));

        info!(
            subject = %id,
            ?kind,
            attended = subject.attended_classes,
            total = subject.total_classes,
            "attendance recorded"
        );
        self.enforce_history_cap();
        true
    }

    fn enforce_history_cap(&mut self) {
        let Some(cap) = self.options.history_cap else {
            return;
        };

        let mut evicted = 0usize;
        while self.history_len() > cap {
            let oldest = self
                .subjects
                .iter()
                .enumerate()
                .filter_map(|(index, s)| s.history.oldest().map(|e| (index, e.timestamp)))
                .min_by_key(|(_, timestamp)| *timestamp)
                .map(|(index, _)| index);
            match oldest {
                Some(index) => {
                    self.subjects[index].history.pop_oldest();
                    evicted += 1;
                }
                None => break,
            }
        }
        if evicted > 0 {
            debug!(evicted, cap, "history cap applied");
        }
    }

    fn subject_mut(&mut self, id: &SubjectId) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|s| &s.id == id)
    }
}

fn is_reversible(event: &Event, policy: UndoPolicy) -> bool {
    match event.kind {
        EventKind::Present | EventKind::Absent => true,
        EventKind::Edited => policy == UndoPolicy::IncludeEdits && event.previous.is_some(),
    }
}

fn validate_name(name: &str) -> Result<&str, TrackerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::validation("name must not be empty"));
    }
    Ok(name)
}

fn validate_target(target: f64) -> Result<(), TrackerError> {
    if !target.is_finite() || !(0.0..=100.0).contains(&target) {
        return Err(TrackerError::validation("target must be between 0 and 100"));
    }
    Ok(())
}

fn validate_count(label: &str, value: i64) -> Result<u32, TrackerError> {
    u32::try_from(value)
        .map_err(|_| TrackerError::validation(format!("{label} classes must be a non-negative number")))
}
