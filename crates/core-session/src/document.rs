//! Note record exchanged with the persistence collaborator.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Title given to freshly created notes.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    pub updated_at: u64,
}

impl Document {
    /// A new empty note stamped with the current time.
    pub fn untitled(id: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            title: UNTITLED.to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Wall clock in milliseconds since the Unix epoch (0 if the clock is before it).
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
