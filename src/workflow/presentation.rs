//! Display lookups for ticket states: emoji, badge color and transition text.
//!
//! Keyed by state label so stored values render even when they no longer
//! parse. These carry no business rule.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::TicketState;

const FALLBACK_EMOJI: &str = "❓";
const FALLBACK_COLOR: &str = "light";

/// Cached map of state label to (emoji, badge color)
static STATE_STYLE: Lazy<HashMap<&'static str, (&'static str, &'static str)>> = Lazy::new(|| {
    HashMap::from([
        (TicketState::Pendiente.as_str(), ("⏳", "warning")),
        (TicketState::Asignado.as_str(), ("👤", "info")),
        (TicketState::EnProceso.as_str(), ("🔧", "primary")),
        (TicketState::Resuelto.as_str(), ("✅", "success")),
        (TicketState::Cerrado.as_str(), ("🔒", "secondary")),
    ])
});

/// Get emoji for a state label
/// Returns "❓" if the label is unknown
pub fn emoji_for(state: &str) -> &'static str {
    STATE_STYLE
        .get(state)
        .map(|(emoji, _)| *emoji)
        .unwrap_or(FALLBACK_EMOJI)
}

/// Get badge color for a state label
/// Returns "light" if the label is unknown
pub fn color_for(state: &str) -> &'static str {
    STATE_STYLE
        .get(state)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

/// Describe a transition, e.g. "⏳ Pendiente → 👤 Asignado"
pub fn transition_message(from: &str, to: &str) -> String {
    format!("{} {} → {} {}", emoji_for(from), from, emoji_for(to), to)
}
