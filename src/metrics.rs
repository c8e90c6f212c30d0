use crate::models::Subject;
use serde::{Serialize, Serializer};

/// Minimum future presences needed to reach the target, assuming every one is attended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassesNeeded {
    Count(u32),
    /// A 100% target after any absence.
    Unreachable,
}

impl ClassesNeeded {
    /// Legacy integer form, `-1` for unreachable.
    pub fn as_sentinel(self) -> i64 {
        match self {
            ClassesNeeded::Count(count) => i64::from(count),
            ClassesNeeded::Unreachable => -1,
        }
    }
}

impl Serialize for ClassesNeeded {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_sentinel())
    }
}

/// Maximum future absences tolerated, assuming none are attended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassesSkippable {
    Count(u32),
    /// A 0% target never constrains skipping.
    Unlimited,
}

impl Serialize for ClassesSkippable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ClassesSkippable::Count(count) => serializer.serialize_u32(*count),
            ClassesSkippable::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMetrics {
    pub current_percentage: f64,
    pub target_percentage: f64,
    pub classes_needed: ClassesNeeded,
    pub classes_can_skip: ClassesSkippable,
    pub on_track: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub subject_count: usize,
    pub subjects_on_track: usize,
    pub attended_classes: u64,
    pub total_classes: u64,
    pub overall_percentage: f64,
}

pub fn current_percentage(subject: &Subject) -> f64 {
    percentage(
        u64::from(subject.attended_classes),
        u64::from(subject.total_classes),
    )
}

pub fn classes_needed(subject: &Subject) -> ClassesNeeded {
    let attended = f64::from(subject.attended_classes);
    let total = f64::from(subject.total_classes);
    let target = subject.target_percentage;

    if subject.total_classes == 0 {
        return ClassesNeeded::Count(if target > 0.0 { 1 } else { 0 });
    }
    if current_percentage(subject) >= target {
        return ClassesNeeded::Count(0);
    }
    if target >= 100.0 {
        return if subject.attended_classes < subject.total_classes {
            ClassesNeeded::Unreachable
        } else {
            ClassesNeeded::Count(0)
        };
    }

    let needed = ((target * total - 100.0 * attended) / (100.0 - target)).ceil();
    ClassesNeeded::Count(clamp_count(needed))
}

pub fn classes_can_skip(subject: &Subject) -> ClassesSkippable {
    let target = subject.target_percentage;
    if current_percentage(subject) < target {
        return ClassesSkippable::Count(0);
    }
    if target <= 0.0 {
        return ClassesSkippable::Unlimited;
    }

    let attended = f64::from(subject.attended_classes);
    let total = f64::from(subject.total_classes);
    let skippable = ((100.0 * attended - target * total) / target).floor();
    ClassesSkippable::Count(clamp_count(skippable))
}

pub fn subject_metrics(subject: &Subject) -> SubjectMetrics {
    let current = current_percentage(subject);
    SubjectMetrics {
        current_percentage: current,
        target_percentage: subject.target_percentage,
        classes_needed: classes_needed(subject),
        classes_can_skip: classes_can_skip(subject),
        on_track: current >= subject.target_percentage,
    }
}

pub fn summarize(subjects: &[Subject]) -> Summary {
    let attended: u64 = subjects.iter().map(|s| u64::from(s.attended_classes)).sum();
    let total: u64 = subjects.iter().map(|s| u64::from(s.total_classes)).sum();
    let on_track = subjects
        .iter()
        .filter(|s| current_percentage(s) >= s.target_percentage)
        .count();

    Summary {
        subject_count: subjects.len(),
        subjects_on_track: on_track,
        attended_classes: attended,
        total_classes: total,
        overall_percentage: percentage(attended, total),
    }
}

/// One-line status shown under each subject.
pub fn advice(metrics: &SubjectMetrics) -> String {
    let target = metrics.target_percentage;
    if metrics.on_track {
        return match metrics.classes_can_skip {
            ClassesSkippable::Unlimited => "No minimum attendance required.".to_string(),
            ClassesSkippable::Count(0) => "Don't miss the next class!".to_string(),
            ClassesSkippable::Count(1) => "You can skip the next class safely.".to_string(),
            ClassesSkippable::Count(count) => {
                format!("You can skip the next {count} classes safely.")
            }
        };
    }

    match metrics.classes_needed {
        ClassesNeeded::Unreachable => {
            format!("A {target}% target can no longer be reached after an absence.")
        }
        ClassesNeeded::Count(1) => format!("Attend the next class to reach {target}%."),
        ClassesNeeded::Count(count) => format!("Attend the next {count} classes to reach {target}%."),
    }
}

fn percentage(attended: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    attended as f64 / total as f64 * 100.0
}

fn clamp_count(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}
