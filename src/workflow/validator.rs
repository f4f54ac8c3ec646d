//! State-flow validator for ticket transitions.
//!
//! Rule violations are expected outcomes: every check returns normally and
//! reports the first failing rule as a [`TransitionRejection`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{technician_required, transitions_from, TicketState};

/// Minimum number of characters a transition comment must have
pub const MIN_COMMENT_LENGTH: usize = 10;

/// Why a requested transition was refused.
///
/// The display text is the user-facing message and must be shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejection {
    #[error("comment is mandatory")]
    MissingComment,

    #[error("comment must be at least {} characters", MIN_COMMENT_LENGTH)]
    CommentTooShort,

    #[error("current state is not valid")]
    InvalidCurrentState,

    #[error("cannot change state of a closed ticket")]
    TicketClosed,

    #[error("ticket already in state {0}")]
    AlreadyInState(TicketState),

    #[error(
        "transition from {from} to {to} is not allowed. Allowed states: {}",
        join_states(.allowed)
    )]
    NotAllowed {
        from: TicketState,
        to: String,
        allowed: Vec<TicketState>,
    },

    #[error("cannot move to {0} without an assigned technician.")]
    TechnicianRequired(TicketState),
}

fn join_states(states: &[TicketState]) -> String {
    states
        .iter()
        .map(TicketState::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Input to [`TicketStateFlowValidator::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub current_state: TicketState,
    pub requested_state: TicketState,
    /// Present only if a technician is currently assigned
    #[serde(default)]
    pub assigned_technician_id: Option<i64>,
    pub comment: String,
}

/// Outcome of a validation; `error_message` is empty when valid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransitionResult {
    pub is_valid: bool,
    pub error_message: String,
}

impl TransitionResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_message: message.into(),
        }
    }
}

impl From<Result<(), TransitionRejection>> for TransitionResult {
    fn from(outcome: Result<(), TransitionRejection>) -> Self {
        match outcome {
            Ok(()) => Self::valid(),
            Err(rejection) => Self::invalid(rejection.to_string()),
        }
    }
}

/// Stateless rule engine for ticket state changes.
///
/// Holds nothing; all instances share the process-wide transition table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketStateFlowValidator;

impl TicketStateFlowValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a transition request
    pub fn validate(&self, request: &TransitionRequest) -> TransitionResult {
        self.validate_transition(
            request.current_state,
            request.requested_state,
            request.assigned_technician_id,
            &request.comment,
        )
    }

    /// Validate moving a ticket from `current` to `requested`
    pub fn validate_transition(
        &self,
        current: TicketState,
        requested: TicketState,
        technician_id: Option<i64>,
        comment: &str,
    ) -> TransitionResult {
        self.check(current, requested, technician_id, comment).into()
    }

    /// Validate a transition between stored state labels.
    ///
    /// An unknown current label fails as an invalid current state; an unknown
    /// requested label fails as a disallowed transition. `EnProceso` is
    /// accepted as an alias for `En Proceso`.
    pub fn validate_transition_str(
        &self,
        current: &str,
        requested: &str,
        technician_id: Option<i64>,
        comment: &str,
    ) -> TransitionResult {
        self.check_str(current, requested, technician_id, comment)
            .into()
    }

    /// Same rules as [`Self::validate_transition`], returning the first rejection
    pub fn check(
        &self,
        current: TicketState,
        requested: TicketState,
        technician_id: Option<i64>,
        comment: &str,
    ) -> Result<(), TransitionRejection> {
        check_comment(comment)?;
        check_target(current, requested.as_str(), Some(requested), technician_id)
    }

    /// Same rules as [`Self::validate_transition_str`], returning the first rejection
    pub fn check_str(
        &self,
        current: &str,
        requested: &str,
        technician_id: Option<i64>,
        comment: &str,
    ) -> Result<(), TransitionRejection> {
        check_comment(comment)?;
        let current = current
            .parse::<TicketState>()
            .map_err(|_| TransitionRejection::InvalidCurrentState)?;
        check_target(current, requested, requested.parse().ok(), technician_id)
    }

    /// States reachable from `current` in table order
    pub fn allowed_states(&self, current: TicketState) -> Vec<TicketState> {
        transitions_from(current).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// States reachable from a stored label; unknown labels have none.
    ///
    /// Labels parse like [`TicketState`], so `EnProceso` resolves to `En Proceso`.
    pub fn allowed_states_str(&self, current: &str) -> Vec<TicketState> {
        current
            .parse()
            .map(|state| self.allowed_states(state))
            .unwrap_or_default()
    }

    /// Whether entering `state` needs an assigned technician
    pub fn requires_technician(&self, state: TicketState) -> bool {
        technician_required(state)
    }

    /// Canonical forward successor on the happy path; `Cerrado` stays put
    pub fn next_state(&self, current: TicketState) -> TicketState {
        match current {
            TicketState::Pendiente => TicketState::Asignado,
            TicketState::Asignado => TicketState::EnProceso,
            TicketState::EnProceso => TicketState::Resuelto,
            TicketState::Resuelto | TicketState::Cerrado => TicketState::Cerrado,
        }
    }

    /// Forward successor of a stored label; unknown labels are returned unchanged.
    ///
    /// `EnProceso` is accepted and answered in canonical form (`Resuelto`).
    pub fn next_state_str(&self, current: &str) -> String {
        match current.parse::<TicketState>() {
            Ok(state) => self.next_state(state).as_str().to_string(),
            Err(_) => current.to_string(),
        }
    }

    /// All states in canonical workflow order
    pub fn all_states(&self) -> Vec<TicketState> {
        TicketState::all().to_vec()
    }
}

fn check_comment(comment: &str) -> Result<(), TransitionRejection> {
    if comment.trim().is_empty() {
        return Err(TransitionRejection::MissingComment);
    }
    if comment.chars().count() < MIN_COMMENT_LENGTH {
        return Err(TransitionRejection::CommentTooShort);
    }
    Ok(())
}

/// State checks in order: table lookup, terminal state, no-op, allowed edge, technician.
/// `requested` is `None` when the label did not parse.
fn check_target(
    current: TicketState,
    requested_label: &str,
    requested: Option<TicketState>,
    technician_id: Option<i64>,
) -> Result<(), TransitionRejection> {
    let Some(allowed) = transitions_from(current) else {
        return Err(TransitionRejection::InvalidCurrentState);
    };

    // Redundant with the empty table entry, but carries its own message.
    if current.is_terminal() {
        return Err(TransitionRejection::TicketClosed);
    }

    if requested == Some(current) {
        return Err(TransitionRejection::AlreadyInState(current));
    }

    let Some(requested) = requested.filter(|state| allowed.contains(state)) else {
        return Err(TransitionRejection::NotAllowed {
            from: current,
            to: requested_label.to_string(),
            allowed: allowed.to_vec(),
        });
    };

    if technician_required(requested) && technician_id.is_none() {
        return Err(TransitionRejection::TechnicianRequired(requested));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMENT: &str = "Asignando a técnico Juan";

    fn validator() -> TicketStateFlowValidator {
        TicketStateFlowValidator::new()
    }

    #[test]
    fn test_assign_without_technician_fails() {
        let result = validator().validate_transition_str("Pendiente", "Asignado", None, COMMENT);
        assert!(!result.is_valid);
        assert_eq!(
            result.error_message,
            "cannot move to Asignado without an assigned technician."
        );
    }

    #[test]
    fn test_assign_with_technician_succeeds() {
        let result = validator().validate_transition_str("Pendiente", "Asignado", Some(5), COMMENT);
        assert_eq!(result, TransitionResult::valid());
        assert!(result.error_message.is_empty());
    }

    #[test]
    fn test_resolved_cannot_go_back_to_pending() {
        let result = validator().validate_transition_str(
            "Resuelto",
            "Pendiente",
            Some(5),
            "Revertir por error",
        );
        assert!(!result.is_valid);
        assert_eq!(
            result.error_message,
            "transition from Resuelto to Pendiente is not allowed. Allowed states: Cerrado, En Proceso"
        );
    }

    #[test]
    fn test_missing_comment() {
        for comment in ["", "   ", "\t\n"] {
            let err = validator()
                .check(
                    TicketState::Pendiente,
                    TicketState::Asignado,
                    Some(1),
                    comment,
                )
                .unwrap_err();
            assert_eq!(err, TransitionRejection::MissingComment);
            assert_eq!(err.to_string(), "comment is mandatory");
        }
    }

    #[test]
    fn test_comment_length_boundary() {
        let v = validator();

        let err = v
            .check(
                TicketState::Pendiente,
                TicketState::Asignado,
                Some(1),
                "123456789",
            )
            .unwrap_err();
        assert_eq!(err, TransitionRejection::CommentTooShort);
        assert_eq!(err.to_string(), "comment must be at least 10 characters");

        assert!(v
            .check(
                TicketState::Pendiente,
                TicketState::Asignado,
                Some(1),
                "1234567890",
            )
            .is_ok());
    }

    #[test]
    fn test_comment_length_counts_characters_not_bytes() {
        // nine characters, more than ten bytes
        let err = validator()
            .check(
                TicketState::Pendiente,
                TicketState::Asignado,
                Some(1),
                "técnicoñ1",
            )
            .unwrap_err();
        assert_eq!(err, TransitionRejection::CommentTooShort);
    }

    #[test]
    fn test_comment_rules_run_before_state_rules() {
        let err = validator()
            .check_str("Desconocido", "Asignado", None, "corto")
            .unwrap_err();
        assert_eq!(err, TransitionRejection::CommentTooShort);
    }

    #[test]
    fn test_unknown_current_state() {
        let result = validator().validate_transition_str("Archivado", "Asignado", Some(1), COMMENT);
        assert!(!result.is_valid);
        assert_eq!(result.error_message, "current state is not valid");
    }

    #[test]
    fn test_unknown_requested_state_is_not_allowed() {
        let err = validator()
            .check_str("Pendiente", "Archivado", Some(1), COMMENT)
            .unwrap_err();
        assert_eq!(
            err,
            TransitionRejection::NotAllowed {
                from: TicketState::Pendiente,
                to: "Archivado".to_string(),
                allowed: vec![TicketState::Asignado],
            }
        );
    }

    #[test]
    fn test_closed_ticket_message_wins_over_noop() {
        let err = validator()
            .check(TicketState::Cerrado, TicketState::Cerrado, Some(1), COMMENT)
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot change state of a closed ticket");
    }

    #[test]
    fn test_noop_transition() {
        let err = validator()
            .check(
                TicketState::EnProceso,
                TicketState::EnProceso,
                Some(1),
                COMMENT,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "ticket already in state En Proceso");
    }

    #[test]
    fn test_disallowed_checked_before_technician() {
        let err = validator()
            .check(TicketState::Pendiente, TicketState::Resuelto, None, COMMENT)
            .unwrap_err();
        assert!(matches!(err, TransitionRejection::NotAllowed { .. }));
    }

    #[test]
    fn test_backward_to_pending_needs_no_technician() {
        let result = validator().validate_transition(
            TicketState::Asignado,
            TicketState::Pendiente,
            None,
            COMMENT,
        );
        assert!(result.is_valid);
    }

    #[test]
    fn test_closing_needs_no_technician() {
        let result = validator().validate_transition(
            TicketState::Resuelto,
            TicketState::Cerrado,
            None,
            COMMENT,
        );
        assert!(result.is_valid);
    }

    #[test]
    fn test_validate_request() {
        let request = TransitionRequest {
            current_state: TicketState::Asignado,
            requested_state: TicketState::EnProceso,
            assigned_technician_id: Some(3),
            comment: "Comenzando el diagnóstico".to_string(),
        };
        assert!(validator().validate(&request).is_valid);
    }

    #[test]
    fn test_allowed_states() {
        let v = validator();
        assert_eq!(
            v.allowed_states(TicketState::Asignado),
            vec![TicketState::EnProceso, TicketState::Pendiente]
        );
        assert!(v.allowed_states(TicketState::Cerrado).is_empty());
        assert!(v.allowed_states_str("Archivado").is_empty());
        assert_eq!(
            v.allowed_states_str("En Proceso"),
            vec![TicketState::Resuelto, TicketState::Asignado]
        );
        assert_eq!(
            v.allowed_states_str("EnProceso"),
            v.allowed_states_str("En Proceso")
        );
    }

    #[test]
    fn test_next_state_str_passes_unknown_through() {
        let v = validator();
        assert_eq!(v.next_state_str("Pendiente"), "Asignado");
        assert_eq!(v.next_state_str("Cerrado"), "Cerrado");
        assert_eq!(v.next_state_str("Archivado"), "Archivado");
        assert_eq!(v.next_state_str("EnProceso"), "Resuelto");
    }

    #[test]
    fn test_all_states_order() {
        assert_eq!(
            validator().all_states(),
            vec![
                TicketState::Pendiente,
                TicketState::Asignado,
                TicketState::EnProceso,
                TicketState::Resuelto,
                TicketState::Cerrado,
            ]
        );
    }
}
