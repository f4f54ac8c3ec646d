//! Workflow endpoints: state catalogue and dry-run transition checks.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::rest::dto::{AllowedStatesResponse, StateResponse, ValidateTransitionRequest};
use crate::rest::state::ApiState;
use crate::workflow::TransitionResult;

/// List all workflow states in canonical order
#[utoipa::path(
    get,
    path = "/api/v1/states",
    tag = "Workflow",
    responses(
        (status = 200, description = "All ticket states", body = Vec<StateResponse>)
    )
)]
pub async fn list(State(state): State<ApiState>) -> Json<Vec<StateResponse>> {
    let validator = state.validator;
    Json(
        validator
            .all_states()
            .into_iter()
            .map(|s| StateResponse::new(&validator, s))
            .collect(),
    )
}

/// Get the states reachable from a state label
///
/// Unknown labels have no allowed transitions.
#[utoipa::path(
    get,
    path = "/api/v1/states/{state}/allowed",
    tag = "Workflow",
    params(
        ("state" = String, Path, description = "State label (e.g., Pendiente, En Proceso)")
    ),
    responses(
        (status = 200, description = "Allowed next states", body = AllowedStatesResponse)
    )
)]
pub async fn allowed(
    State(state): State<ApiState>,
    Path(label): Path<String>,
) -> Json<AllowedStatesResponse> {
    let allowed = state.validator.allowed_states_str(&label);
    Json(AllowedStatesResponse {
        state: label,
        allowed,
    })
}

/// Check whether a transition would be accepted, without applying it
#[utoipa::path(
    post,
    path = "/api/v1/transitions/validate",
    tag = "Workflow",
    request_body = ValidateTransitionRequest,
    responses(
        (status = 200, description = "Validation outcome", body = TransitionResult)
    )
)]
pub async fn validate(
    State(state): State<ApiState>,
    Json(req): Json<ValidateTransitionRequest>,
) -> Json<TransitionResult> {
    Json(state.validator.validate_transition_str(
        &req.current_state,
        &req.requested_state,
        req.technician_id,
        &req.comment,
    ))
}
