//! Data Transfer Objects for the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::tickets::{HistoryEntry, Rating, Ticket};
use crate::workflow::presentation::{color_for, emoji_for};
use crate::workflow::{TicketState, TicketStateFlowValidator};

// =============================================================================
// Health DTOs
// =============================================================================

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ticket_count: usize,
    /// Ticket store file the server was configured with
    pub tickets_file: String,
}

// =============================================================================
// Workflow DTOs
// =============================================================================

/// A workflow state with its display metadata and outgoing transitions
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StateResponse {
    pub state: TicketState,
    pub emoji: String,
    pub color: String,
    pub allowed: Vec<TicketState>,
    pub requires_technician: bool,
    pub next_state: TicketState,
}

impl StateResponse {
    pub fn new(validator: &TicketStateFlowValidator, state: TicketState) -> Self {
        Self {
            state,
            emoji: emoji_for(state.as_str()).to_string(),
            color: color_for(state.as_str()).to_string(),
            allowed: validator.allowed_states(state),
            requires_technician: validator.requires_technician(state),
            next_state: validator.next_state(state),
        }
    }
}

/// Allowed next states for a stored state label
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AllowedStatesResponse {
    pub state: String,
    pub allowed: Vec<TicketState>,
}

/// Request to check a transition without applying it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateTransitionRequest {
    pub current_state: String,
    pub requested_state: String,
    #[serde(default)]
    pub technician_id: Option<i64>,
    #[serde(default)]
    pub comment: String,
}

// =============================================================================
// Ticket DTOs
// =============================================================================

/// Summary response for listing tickets
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketSummary {
    pub id: u64,
    pub title: String,
    pub client: String,
    pub state: TicketState,
    pub emoji: String,
    pub technician_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Ticket> for TicketSummary {
    fn from(t: &Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title.clone(),
            client: t.client.clone(),
            state: t.state,
            emoji: emoji_for(t.state.as_str()).to_string(),
            technician_id: t.technician_id,
            updated_at: t.updated_at,
        }
    }
}

/// Response for a single ticket, including its history
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub client: String,
    pub state: TicketState,
    pub technician_id: Option<i64>,
    pub allowed_states: Vec<TicketState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub history: Vec<HistoryEntryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingResponse>,
}

impl From<&Ticket> for TicketResponse {
    fn from(t: &Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title.clone(),
            description: t.description.clone(),
            client: t.client.clone(),
            state: t.state,
            technician_id: t.technician_id,
            allowed_states: TicketStateFlowValidator::new().allowed_states(t.state),
            created_at: t.created_at,
            updated_at: t.updated_at,
            history: t.history.iter().map(HistoryEntryResponse::from).collect(),
            rating: t.rating.as_ref().map(RatingResponse::from),
        }
    }
}

/// Response for one history entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub previous_state: Option<TicketState>,
    pub new_state: TicketState,
    pub comment: String,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&HistoryEntry> for HistoryEntryResponse {
    fn from(h: &HistoryEntry) -> Self {
        Self {
            previous_state: h.previous_state,
            new_state: h.new_state,
            comment: h.comment.clone(),
            actor: h.actor.clone(),
            timestamp: h.timestamp,
        }
    }
}

/// Response for a ticket rating
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub rated_at: DateTime<Utc>,
}

impl From<&Rating> for RatingResponse {
    fn from(r: &Rating) -> Self {
        Self {
            score: r.score,
            comment: r.comment.clone(),
            rated_at: r.rated_at,
        }
    }
}

/// Request to open a ticket
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub client: String,
}

/// Request to set the responsible technician
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignTechnicianRequest {
    pub technician_id: i64,
    #[serde(default = "default_actor")]
    pub actor: String,
}

/// Request to move a ticket to another state
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangeStateRequest {
    /// Target state label, e.g. "En Proceso"
    pub state: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "default_actor")]
    pub actor: String,
}

fn default_actor() -> String {
    "api".to_string()
}

/// Request to rate a resolved ticket
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RateTicketRequest {
    pub score: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Filters for the ticket listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TicketListQuery {
    /// Only tickets in this state (label, e.g. "Pendiente")
    pub state: Option<String>,
}
