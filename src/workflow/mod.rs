//! Ticket workflow: states, the transition table and the state-flow validator.
//!
//! Tickets move through a fixed lifecycle:
//!
//! ```text
//! Pendiente -> Asignado -> En Proceso -> Resuelto -> Cerrado
//! ```
//!
//! with a handful of backward edges (reassign, reopen). The table is static
//! and shared by every validator in the process.

pub mod presentation;
mod validator;

pub use validator::{
    TicketStateFlowValidator, TransitionRejection, TransitionRequest, TransitionResult,
    MIN_COMMENT_LENGTH,
};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a support ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TicketState {
    Pendiente,
    Asignado,
    #[serde(rename = "En Proceso", alias = "EnProceso")]
    EnProceso,
    Resuelto,
    Cerrado,
}

impl TicketState {
    /// All states in canonical workflow order (for UI population)
    pub fn all() -> &'static [TicketState] {
        &[
            TicketState::Pendiente,
            TicketState::Asignado,
            TicketState::EnProceso,
            TicketState::Resuelto,
            TicketState::Cerrado,
        ]
    }

    /// Label used in storage, messages and the wire format
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketState::Pendiente => "Pendiente",
            TicketState::Asignado => "Asignado",
            TicketState::EnProceso => "En Proceso",
            TicketState::Resuelto => "Resuelto",
            TicketState::Cerrado => "Cerrado",
        }
    }

    /// Whether no transition can leave this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketState::Cerrado)
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label does not name a known state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ticket state '{0}'")]
pub struct UnknownState(pub String);

impl FromStr for TicketState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pendiente" => Ok(TicketState::Pendiente),
            "Asignado" => Ok(TicketState::Asignado),
            "En Proceso" | "EnProceso" => Ok(TicketState::EnProceso),
            "Resuelto" => Ok(TicketState::Resuelto),
            "Cerrado" => Ok(TicketState::Cerrado),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// Allowed next states per current state, in the order they are reported
static TRANSITIONS: Lazy<HashMap<TicketState, Vec<TicketState>>> = Lazy::new(|| {
    use TicketState::{Asignado, Cerrado, EnProceso, Pendiente, Resuelto};

    HashMap::from([
        (Pendiente, vec![Asignado]),
        (Asignado, vec![EnProceso, Pendiente]),
        (EnProceso, vec![Resuelto, Asignado]),
        (Resuelto, vec![Cerrado, EnProceso]),
        (Cerrado, Vec::new()),
    ])
});

/// States that cannot be entered without an assigned technician
const TECHNICIAN_REQUIRED: &[TicketState] = &[
    TicketState::Asignado,
    TicketState::EnProceso,
    TicketState::Resuelto,
];

/// Look up the allowed successors of `state`; `None` if the table has no entry
pub(crate) fn transitions_from(state: TicketState) -> Option<&'static [TicketState]> {
    TRANSITIONS.get(&state).map(Vec::as_slice)
}

pub(crate) fn technician_required(state: TicketState) -> bool {
    TECHNICIAN_REQUIRED.contains(&state)
}
