//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{
    AllowedStatesResponse, AssignTechnicianRequest, ChangeStateRequest, CreateTicketRequest,
    HealthResponse, HistoryEntryResponse, RateTicketRequest, RatingResponse, StateResponse,
    TicketResponse, TicketSummary, ValidateTransitionRequest,
};
use crate::rest::error::ErrorResponse;
use crate::workflow::{TicketState, TransitionResult};

/// OpenAPI documentation for the helpdesk REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Helpdesk API",
        description = "REST API for helpdesk tickets and their state workflow.",
        license(name = "MIT")
    ),
    paths(
        // Health endpoints
        crate::rest::routes::health::health,
        // Workflow endpoints
        crate::rest::routes::states::list,
        crate::rest::routes::states::allowed,
        crate::rest::routes::states::validate,
        // Ticket endpoints
        crate::rest::routes::tickets::list,
        crate::rest::routes::tickets::create,
        crate::rest::routes::tickets::get_one,
        crate::rest::routes::tickets::assign,
        crate::rest::routes::tickets::transition,
        crate::rest::routes::tickets::rate,
    ),
    components(
        schemas(
            // Response types
            HealthResponse,
            StateResponse,
            AllowedStatesResponse,
            TransitionResult,
            TicketSummary,
            TicketResponse,
            HistoryEntryResponse,
            RatingResponse,
            TicketState,
            ErrorResponse,
            // Request types
            ValidateTransitionRequest,
            CreateTicketRequest,
            AssignTechnicianRequest,
            ChangeStateRequest,
            RateTicketRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Workflow", description = "Ticket states and transition rules"),
        (name = "Tickets", description = "Ticket lifecycle operations"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
