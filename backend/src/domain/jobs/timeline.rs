//! Append-only activity log owned by a job.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StatusLabel;

/// Category of a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    /// The job was created.
    Created,
    /// A technician was (re)assigned.
    Assigned,
    /// Free-text note.
    Note,
    /// Photos attached to the job.
    Image,
    /// Status moved between two labels.
    StatusChange,
}

/// Status movement recorded by a `status_change` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Label before the event.
    pub from: StatusLabel,
    /// Label after the event.
    pub to: StatusLabel,
}

/// One entry in a job timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// Event identifier.
    pub id: Uuid,
    /// When the event was recorded; strictly increasing within a timeline.
    pub timestamp: DateTime<Utc>,
    /// Event category.
    #[serde(rename = "type")]
    pub kind: TimelineEventKind,
    /// Display name of the acting user.
    pub user: String,
    /// Optional free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Image references in upload order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Present on `status_change` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_change: Option<StatusChange>,
}

/// Data for an event about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Event category.
    pub kind: TimelineEventKind,
    /// Display name of the acting user.
    pub user: String,
    /// Optional free text; blank text is dropped.
    pub content: Option<String>,
    /// Image references.
    pub images: Vec<String>,
    /// Status movement, for `status_change` events.
    pub status_change: Option<StatusChange>,
}

impl TimelineEntry {
    /// An entry of `kind` by `user` with no payload.
    pub fn new(kind: TimelineEventKind, user: impl Into<String>) -> Self {
        Self {
            kind,
            user: user.into(),
            content: None,
            images: Vec::new(),
            status_change: None,
        }
    }

    /// A `status_change` entry.
    pub fn status_change(user: impl Into<String>, from: StatusLabel, to: StatusLabel) -> Self {
        Self {
            status_change: Some(StatusChange { from, to }),
            ..Self::new(TimelineEventKind::StatusChange, user)
        }
    }

    /// Attach free text.
    #[must_use]
    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        self
    }

    /// Attach image references.
    #[must_use]
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// Ordered, append-only sequence of events.
///
/// Timestamps never go backwards: when the clock has not advanced past the
/// last event, the new event is stamped one microsecond later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline(Vec<TimelineEvent>);

impl Timeline {
    /// Append an entry observed at `now`, returning the stored event.
    pub fn append(&mut self, entry: TimelineEntry, now: DateTime<Utc>) -> TimelineEvent {
        let timestamp = match self.0.last() {
            Some(last) if now <= last.timestamp => last.timestamp + Duration::microseconds(1),
            _ => now,
        };
        let TimelineEntry {
            kind,
            user,
            content,
            images,
            status_change,
        } = entry;
        let event = TimelineEvent {
            id: Uuid::new_v4(),
            timestamp,
            kind,
            user,
            content,
            images,
            status_change,
        };
        self.0.push(event.clone());
        event
    }

    /// Events in chronological order.
    pub fn events(&self) -> &[TimelineEvent] {
        self.0.as_slice()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no events.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most recent event.
    pub fn last(&self) -> Option<&TimelineEvent> {
        self.0.last()
    }
}
