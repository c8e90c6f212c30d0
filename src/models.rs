use crate::history::HistoryLog;
use crate::metrics::{ClassesNeeded, ClassesSkippable, Summary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const DEFAULT_TARGET_PERCENTAGE: f64 = 75.0;

macro_rules! text_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        // Older saves used millisecond numbers as ids.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

text_id!(SubjectId);
text_id!(EventId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Present,
    Absent,
    Edited,
}

/// Subject state captured just before an edit overwrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSnapshot {
    pub name: String,
    pub attended_classes: u32,
    pub total_classes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default = "EventId::generate")]
    pub id: EventId,
    #[serde(alias = "date", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "type", alias = "status")]
    pub kind: EventKind,
    /// Subject name recorded with the event; set on edits.
    #[serde(default, alias = "subject", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<EditSnapshot>,
}

impl Event {
    pub fn new(kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: EventId::generate(),
            timestamp,
            kind,
            name: None,
            previous: None,
        }
    }

    pub fn edited(name: &str, previous: EditSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: Some(name.to_string()),
            previous: Some(previous),
            ..Self::new(EventKind::Edited, timestamp)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(alias = "present")]
    pub attended_classes: u32,
    #[serde(alias = "total")]
    pub total_classes: u32,
    #[serde(alias = "target", default = "default_target")]
    pub target_percentage: f64,
    #[serde(default)]
    pub history: HistoryLog,
}

impl Subject {
    pub fn new(name: &str, target_percentage: f64) -> Self {
        Self {
            id: SubjectId::generate(),
            name: name.to_string(),
            attended_classes: 0,
            total_classes: 0,
            target_percentage,
            history: HistoryLog::default(),
        }
    }

    pub fn snapshot(&self) -> EditSnapshot {
        EditSnapshot {
            name: self.name.clone(),
            attended_classes: self.attended_classes,
            total_classes: self.total_classes,
        }
    }
}

fn default_target() -> f64 {
    DEFAULT_TARGET_PERCENTAGE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Deserialize)]
pub struct AddSubjectRequest {
    pub name: String,
    pub target: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct EditSubjectRequest {
    pub name: String,
    pub attended: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub target: f64,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct AddSubjectForm {
    pub name: String,
    #[serde(default)]
    pub target: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView {
    pub id: SubjectId,
    pub name: String,
    pub attended_classes: u32,
    pub total_classes: u32,
    pub target_percentage: f64,
    pub current_percentage: f64,
    pub classes_needed: ClassesNeeded,
    pub classes_can_skip: ClassesSkippable,
    pub on_track: bool,
    pub advice: String,
    pub can_undo: bool,
    pub history: HistoryLog,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub subjects: Vec<SubjectView>,
    pub summary: Summary,
}

mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// Seconds between the Unix epoch and 2001-01-01, the reference date of
    /// the mobile app's float timestamps.
    const APPLE_REFERENCE_OFFSET: f64 = 978_307_200.0;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Millis(i64),
        AppleSeconds(f64),
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(D::Error::custom),
            RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {millis}"))),
            RawTimestamp::AppleSeconds(seconds) => {
                let millis = ((seconds + APPLE_REFERENCE_OFFSET) * 1000.0).round();
                if !millis.is_finite() {
                    return Err(D::Error::custom(format!("timestamp out of range: {seconds}")));
                }
                DateTime::from_timestamp_millis(millis as i64)
                    .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {seconds}")))
            }
        }
    }
}
