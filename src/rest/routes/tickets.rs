//! Ticket endpoints: create, list, assign, change state and rate.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::rest::dto::{
    AssignTechnicianRequest, ChangeStateRequest, CreateTicketRequest, RateTicketRequest,
    TicketListQuery, TicketResponse, TicketSummary,
};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;
use crate::workflow::TicketState;

/// List tickets, optionally filtered by state
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    tag = "Tickets",
    params(TicketListQuery),
    responses(
        (status = 200, description = "Tickets, oldest first", body = Vec<TicketSummary>),
        (status = 400, description = "Unknown state filter", body = ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<ApiState>,
    Query(query): Query<TicketListQuery>,
) -> Result<Json<Vec<TicketSummary>>, ApiError> {
    let store = state.store.read().await;

    let tickets = match query.state {
        Some(label) => {
            let filter = label
                .parse::<TicketState>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            store.list_by_state(filter)
        }
        None => store.list(),
    };

    Ok(Json(tickets.into_iter().map(TicketSummary::from).collect()))
}

/// Open a new ticket in the Pendiente state
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    tag = "Tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<ApiState>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    if req.client.trim().is_empty() {
        return Err(ApiError::ValidationError("client is required".to_string()));
    }

    let mut store = state.store.write().await;
    let ticket = store.create(&req.title, &req.description, req.client.trim())?;

    Ok((StatusCode::CREATED, Json(TicketResponse::from(&ticket))))
}

/// Get a single ticket with its history
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    tag = "Tickets",
    params(
        ("id" = u64, Path, description = "Ticket id")
    ),
    responses(
        (status = 200, description = "Ticket details", body = TicketResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse)
    )
)]
pub async fn get_one(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> Result<Json<TicketResponse>, ApiError> {
    let store = state.store.read().await;
    let ticket = store.get(id)?;

    Ok(Json(TicketResponse::from(ticket)))
}

/// Set the technician responsible for a ticket
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}/technician",
    tag = "Tickets",
    params(
        ("id" = u64, Path, description = "Ticket id")
    ),
    request_body = AssignTechnicianRequest,
    responses(
        (status = 200, description = "Technician assigned", body = TicketResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
        (status = 422, description = "Ticket is closed", body = ErrorResponse)
    )
)]
pub async fn assign(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(req): Json<AssignTechnicianRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let mut store = state.store.write().await;
    let ticket = store.assign_technician(id, req.technician_id, &req.actor)?;

    Ok(Json(TicketResponse::from(&ticket)))
}

/// Move a ticket to another workflow state
///
/// The change is validated against the workflow; on rejection the ticket is
/// unchanged and the message is returned verbatim.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/transitions",
    tag = "Tickets",
    params(
        ("id" = u64, Path, description = "Ticket id")
    ),
    request_body = ChangeStateRequest,
    responses(
        (status = 200, description = "State changed", body = TicketResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
        (status = 422, description = "Transition rejected", body = ErrorResponse)
    )
)]
pub async fn transition(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(req): Json<ChangeStateRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let mut store = state.store.write().await;

    let requested = match req.state.parse::<TicketState>() {
        Ok(requested) => requested,
        Err(_) => {
            // Let the validator phrase the rejection for an unknown target
            let ticket = store.get(id)?;
            let outcome = state.validator.check_str(
                ticket.state.as_str(),
                &req.state,
                ticket.technician_id,
                &req.comment,
            );
            let message = outcome
                .err()
                .map(|rejection| rejection.to_string())
                .unwrap_or_else(|| format!("unknown ticket state '{}'", req.state));
            return Err(ApiError::TransitionRejected(message));
        }
    };

    let ticket = store.change_state(id, requested, &req.comment, &req.actor)?;

    Ok(Json(TicketResponse::from(&ticket)))
}

/// Rate a resolved or closed ticket
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/rating",
    tag = "Tickets",
    params(
        ("id" = u64, Path, description = "Ticket id")
    ),
    request_body = RateTicketRequest,
    responses(
        (status = 200, description = "Rating recorded", body = TicketResponse),
        (status = 400, description = "Score out of range", body = ErrorResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
        (status = 409, description = "Ticket not rateable or already rated", body = ErrorResponse)
    )
)]
pub async fn rate(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(req): Json<RateTicketRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let mut store = state.store.write().await;
    let ticket = store.rate(id, req.score, req.comment.as_deref())?;

    Ok(Json(TicketResponse::from(&ticket)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tickets::TicketStore;

    fn test_state() -> ApiState {
        ApiState::with_store(Config::default(), TicketStore::in_memory())
    }

    async fn create_ticket(state: &ApiState) -> u64 {
        let req = CreateTicketRequest {
            title: "Pantalla azul".to_string(),
            description: String::new(),
            client: "lucia".to_string(),
        };
        let (status, resp) = create(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        resp.id
    }

    #[tokio::test]
    async fn test_create_requires_client() {
        let req = CreateTicketRequest {
            title: "Sin cliente".to_string(),
            description: String::new(),
            client: " ".to_string(),
        };
        let err = create(State(test_state()), Json(req)).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_list_with_unknown_state_filter() {
        let query = TicketListQuery {
            state: Some("Archivado".to_string()),
        };
        let err = list(State(test_state()), Query(query)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_transition_to_unknown_state() {
        let state = test_state();
        let id = create_ticket(&state).await;

        let req = ChangeStateRequest {
            state: "Archivado".to_string(),
            comment: "Archivando ticket viejo".to_string(),
            actor: "admin".to_string(),
        };
        let err = transition(State(state), Path(id), Json(req))
            .await
            .unwrap_err();
        match err {
            ApiError::TransitionRejected(msg) => {
                assert_eq!(
                    msg,
                    "transition from Pendiente to Archivado is not allowed. Allowed states: Asignado"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_assign_then_transition() {
        let state = test_state();
        let id = create_ticket(&state).await;

        let req = AssignTechnicianRequest {
            technician_id: 12,
            actor: "admin".to_string(),
        };
        let resp = assign(State(state.clone()), Path(id), Json(req))
            .await
            .unwrap();
        assert_eq!(resp.technician_id, Some(12));

        let req = ChangeStateRequest {
            state: "Asignado".to_string(),
            comment: "Asignado al técnico 12".to_string(),
            actor: "admin".to_string(),
        };
        let resp = transition(State(state.clone()), Path(id), Json(req))
            .await
            .unwrap();
        assert_eq!(resp.state, TicketState::Asignado);
        assert_eq!(resp.history.len(), 2);

        let resp = get_one(State(state), Path(id)).await.unwrap();
        assert_eq!(
            resp.allowed_states,
            vec![TicketState::EnProceso, TicketState::Pendiente]
        );
    }

    #[tokio::test]
    async fn test_get_missing_ticket() {
        let err = get_one(State(test_state()), Path(99)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
