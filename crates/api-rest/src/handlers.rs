use crate::AppState;
use agentdna_core::{diff_words, DashboardError};
use api_shared::{
    AgentProfileRes, AgentSummaryRes, DashboardMetricsRes, DashboardOverviewRes, DiffReq,
    EmailSearchRes, HealthRes, HealthService, InspectReq, InspectRes, InteractionCardRes,
    InteractionMetricsRes, NormalizedInteractionRes, WordDiffRes,
};
use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health, overview, agent_profile, search_by_email, diff, inspect),
    components(schemas(
        HealthRes,
        AgentSummaryRes,
        DashboardMetricsRes,
        DashboardOverviewRes,
        InteractionMetricsRes,
        NormalizedInteractionRes,
        WordDiffRes,
        InteractionCardRes,
        AgentProfileRes,
        EmailSearchRes,
        DiffReq,
        InspectReq,
        InspectRes,
    ))
)]
pub struct ApiDoc;

/// Map a service error onto a status code, logging anything that is not the caller's fault.
fn error_response(context: &str, err: DashboardError) -> (StatusCode, &'static str) {
    match err {
        DashboardError::InvalidInput(msg) => {
            tracing::debug!("{context}: invalid input: {msg}");
            (StatusCode::BAD_REQUEST, "Invalid input")
        }
        other => {
            tracing::error!("{context} error: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub(crate) async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/agents",
    responses(
        (status = 200, description = "Agent list with headline counts", body = DashboardOverviewRes)
    )
)]
/// Dashboard overview
///
/// Lists every agent known to the chain connector and counts their interactions and
/// intrusions. Listed agents are written to the name cache so profile pages can show friendly
/// names. An unreachable connector yields an empty overview rather than an error.
#[axum::debug_handler]
pub(crate) async fn overview(State(state): State<AppState>) -> Json<DashboardOverviewRes> {
    Json(state.dashboard.overview().await.into())
}

#[utoipa::path(
    get,
    path = "/agents/{id}",
    params(
        ("id" = String, Path, description = "Agent identifier")
    ),
    responses(
        (status = 200, description = "Agent profile with interaction history", body = AgentProfileRes),
        (status = 400, description = "Blank agent identifier"),
        (status = 500, description = "Internal server error")
    )
)]
/// Agent profile
///
/// Returns one card per interaction (genesis block excluded) with its classification, the
/// message fields, the trust-issue reason and the word diff between the original and received
/// messages.
#[axum::debug_handler]
pub(crate) async fn agent_profile(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<AgentProfileRes>, (StatusCode, &'static str)> {
    match state.dashboard.agent_profile(&id).await {
        Ok(profile) => Ok(Json(profile.into())),
        Err(e) => Err(error_response("Agent profile", e)),
    }
}

#[utoipa::path(
    get,
    path = "/search/{email}",
    params(
        ("email" = String, Path, description = "Email address the agents are registered under")
    ),
    responses(
        (status = 200, description = "Agents registered under the email", body = EmailSearchRes),
        (status = 400, description = "Blank email"),
        (status = 500, description = "Internal server error")
    )
)]
/// Search agents by email
#[axum::debug_handler]
pub(crate) async fn search_by_email(
    State(state): State<AppState>,
    AxumPath(email): AxumPath<String>,
) -> Result<Json<EmailSearchRes>, (StatusCode, &'static str)> {
    match state.dashboard.search_by_email(&email).await {
        Ok(search) => Ok(Json(search.into())),
        Err(e) => Err(error_response("Email search", e)),
    }
}

#[utoipa::path(
    post,
    path = "/diff",
    request_body = DiffReq,
    responses(
        (status = 200, description = "Words added and removed", body = WordDiffRes)
    )
)]
/// Word diff between two messages
///
/// Case and punctuation are ignored; word order and repetition are not compared.
#[axum::debug_handler]
pub(crate) async fn diff(Json(req): Json<DiffReq>) -> Json<WordDiffRes> {
    Json(diff_words(&req.original, &req.received).into())
}

#[utoipa::path(
    post,
    path = "/inspect",
    request_body = InspectReq,
    responses(
        (status = 200, description = "Normalized and classified payload", body = InspectRes)
    )
)]
/// Normalize and classify a single raw interaction payload
#[axum::debug_handler]
pub(crate) async fn inspect(Json(req): Json<InspectReq>) -> Json<InspectRes> {
    Json(agentdna_core::inspect(&req.payload).into())
}
