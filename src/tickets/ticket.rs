use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflow::TicketState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Client who opened the ticket
    pub client: String,
    pub state: TicketState,
    /// Technician currently responsible, if any
    #[serde(default)]
    pub technician_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Audit trail, oldest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

/// One recorded state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// `None` for the entry written when the ticket is created
    pub previous_state: Option<TicketState>,
    pub new_state: TicketState,
    pub comment: String,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

/// Client satisfaction score for a resolved ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub rated_at: DateTime<Utc>,
}

impl Ticket {
    pub(crate) fn open(id: u64, title: String, description: String, client: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            description,
            client: client.clone(),
            state: TicketState::Pendiente,
            technician_id: None,
            created_at: now,
            updated_at: now,
            history: vec![HistoryEntry {
                previous_state: None,
                new_state: TicketState::Pendiente,
                comment: "Ticket created".to_string(),
                actor: client,
                timestamp: now,
            }],
            rating: None,
        }
    }

    /// Move to `new_state` and record it; callers validate first
    pub(crate) fn apply_transition(&mut self, new_state: TicketState, comment: &str, actor: &str) {
        let now = Utc::now();
        self.history.push(HistoryEntry {
            previous_state: Some(self.state),
            new_state,
            comment: comment.to_string(),
            actor: actor.to_string(),
            timestamp: now,
        });
        self.state = new_state;
        self.updated_at = now;
    }

    /// Only resolved or closed tickets can receive a rating
    pub fn is_rateable(&self) -> bool {
        matches!(self.state, TicketState::Resuelto | TicketState::Cerrado)
    }

    /// The most recent history entry
    pub fn last_change(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}
