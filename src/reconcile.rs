//! Applies realtime change events to locally held collections.
//!
//! Every operation is keyed by row id, so replaying an event leaves the
//! collection exactly as the first application did.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actor_framework::Row;

/// A committed mutation on a hosted table.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<T> {
    Insert(T),
    Update(T),
    Delete { id: String },
}

impl<T: Row> ChangeEvent<T> {
    pub fn id(&self) -> &str {
        match self {
            ChangeEvent::Insert(row) | ChangeEvent::Update(row) => row.id(),
            ChangeEvent::Delete { id } => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Insert(_) => "insert",
            ChangeEvent::Update(_) => "update",
            ChangeEvent::Delete { .. } => "delete",
        }
    }
}

/// Where a previously unseen row lands in the local list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

/// What an event did to the local list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted,
    Replaced,
    Removed,
    Unchanged,
}

pub fn apply_change<T: Row>(rows: &mut Vec<T>, event: ChangeEvent<T>, placement: Placement) -> Applied {
    match event {
        // An insert for an id we already hold is our own write echoing back.
        ChangeEvent::Insert(row) | ChangeEvent::Update(row) => upsert_local(rows, row, placement),
        ChangeEvent::Delete { id } => match rows.iter().position(|r| r.id() == id) {
            Some(pos) => {
                rows.remove(pos);
                Applied::Removed
            }
            None => Applied::Unchanged,
        },
    }
}

/// Replaces the row with the same id, or places it per `placement`.
pub fn upsert_local<T: Row>(rows: &mut Vec<T>, row: T, placement: Placement) -> Applied {
    match rows.iter_mut().find(|r| r.id() == row.id()) {
        Some(existing) if *existing == row => Applied::Unchanged,
        Some(existing) => {
            *existing = row;
            Applied::Replaced
        }
        None => {
            match placement {
                Placement::Append => rows.push(row),
                Placement::Prepend => rows.insert(0, row),
            }
            Applied::Inserted
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RawEventType {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowKey {
    pub id: String,
}

/// Change record in the hosted backend's wire shape: `{eventType, new?, old?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChange<T> {
    pub event_type: RawEventType,
    pub new: Option<T>,
    pub old: Option<RowKey>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChangeError {
    #[error("{event} change is missing its {side} record")]
    MissingRecord { event: &'static str, side: &'static str },
}

impl<T> TryFrom<RawChange<T>> for ChangeEvent<T> {
    type Error = ChangeError;

    fn try_from(raw: RawChange<T>) -> Result<Self, Self::Error> {
        match raw.event_type {
            RawEventType::Insert => raw
                .new
                .map(ChangeEvent::Insert)
                .ok_or(ChangeError::MissingRecord { event: "insert", side: "new" }),
            RawEventType::Update => raw
                .new
                .map(ChangeEvent::Update)
                .ok_or(ChangeError::MissingRecord { event: "update", side: "new" }),
            RawEventType::Delete => raw
                .old
                .map(|key| ChangeEvent::Delete { id: key.id })
                .ok_or(ChangeError::MissingRecord { event: "delete", side: "old" }),
        }
    }
}
