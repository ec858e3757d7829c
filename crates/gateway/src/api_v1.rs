//! HTTP API v1: roster, dashboard, clients and the assistant.
//!
//! Endpoints:
//!
//! - `PUT    /v1/roster`                 Replace the roster from an upload response
//! - `GET    /v1/roster`                 The stored roster
//! - `DELETE /v1/roster`                 Drop the roster and its narratives
//! - `GET    /v1/dashboard`              Chart series and financial totals
//! - `GET    /v1/dashboard/narratives`   One comment per chart, with the tier that produced it
//! - `GET    /v1/clients?q=&page=`       Filtered, paginated client list
//! - `GET    /v1/clients/{cert}`         One client by certificate number
//! - `GET    /v1/assistant/messages`     Conversation history
//! - `POST   /v1/assistant/messages`     Ask the assistant about a page
//! - `DELETE /v1/assistant/messages`     Clear the conversation

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use trustlens_agent::{Narratives, PageRequest, RuntimeError};
use trustlens_analytics::{
    DashboardAggregate, Pagination, UploadOutcome, filter_clients, find_by_cert, paginate,
};
use trustlens_core::{ClientRecord, Message, Roster};

use crate::{ApiError, SharedState, api_error};

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route(
            "/roster",
            get(get_roster_handler)
                .put(put_roster_handler)
                .delete(delete_roster_handler),
        )
        .route("/dashboard", get(dashboard_handler))
        .route("/dashboard/narratives", get(narratives_handler))
        .route("/clients", get(list_clients_handler))
        .route("/clients/{cert}", get(get_client_handler))
        .route(
            "/assistant/messages",
            get(list_messages_handler)
                .post(send_message_handler)
                .delete(clear_messages_handler),
        )
        .with_state(state)
}

fn runtime_error(e: RuntimeError) -> ApiError {
    match e {
        RuntimeError::Ingest(e) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        RuntimeError::ClientNotFound(_) => api_error(StatusCode::NOT_FOUND, e.to_string()),
        RuntimeError::Store(_) | RuntimeError::Provider(_) => {
            error!(error = %e, "Request failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ── Roster ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RosterReplaced {
    count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequired {
    requires_password: bool,
    error: String,
}

async fn put_roster_handler(
    State(state): State<SharedState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    match state.ingest(body).map_err(runtime_error)? {
        UploadOutcome::Rows(roster) => {
            info!(records = roster.len(), "v1/roster replaced");
            Ok(Json(RosterReplaced {
                count: roster.len(),
            })
            .into_response())
        }
        UploadOutcome::PasswordRequired { message } => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(PasswordRequired {
                requires_password: true,
                error: message.unwrap_or_else(|| "Password required".into()),
            }),
        )
            .into_response()),
    }
}

async fn get_roster_handler(State(state): State<SharedState>) -> Json<Roster> {
    Json(state.roster().snapshot())
}

async fn delete_roster_handler(State(state): State<SharedState>) -> Result<StatusCode, ApiError> {
    state.clear_roster().map_err(runtime_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Dashboard ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    #[serde(flatten)]
    aggregate: DashboardAggregate,
    average_installment: f64,
}

async fn dashboard_handler(State(state): State<SharedState>) -> Json<DashboardResponse> {
    let aggregate = state.dashboard();
    let average_installment = aggregate.financial.average_installment();
    Json(DashboardResponse {
        aggregate,
        average_installment,
    })
}

async fn narratives_handler(State(state): State<SharedState>) -> Json<Narratives> {
    let aggregate = state.dashboard();
    Json(state.narratives().narratives(&aggregate).await)
}

// ── Clients ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ClientsQuery {
    #[serde(default)]
    q: String,
    #[serde(default = "first_page")]
    page: usize,
}

fn first_page() -> usize {
    1
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientsResponse {
    clients: Vec<ClientRecord>,
    total_clients: usize,
    filtered_clients: usize,
    pagination: Pagination,
}

async fn list_clients_handler(
    State(state): State<SharedState>,
    Query(query): Query<ClientsQuery>,
) -> Json<ClientsResponse> {
    let roster = state.roster().snapshot();
    let filtered = filter_clients(&roster, &query.q);
    let pagination = paginate(filtered.len(), query.page, state.config().analytics.page_size);

    Json(ClientsResponse {
        clients: filtered[pagination.start..pagination.end]
            .iter()
            .map(|r| (*r).clone())
            .collect(),
        total_clients: roster.len(),
        filtered_clients: filtered.len(),
        pagination,
    })
}

async fn get_client_handler(
    State(state): State<SharedState>,
    Path(cert): Path<String>,
) -> Result<Json<ClientRecord>, ApiError> {
    let roster = state.roster().snapshot();
    find_by_cert(&roster, &cert)
        .cloned()
        .map(Json)
        .ok_or_else(|| runtime_error(RuntimeError::ClientNotFound(cert)))
}

// ── Assistant ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SendMessageRequest {
    message: String,
    #[serde(default)]
    page: PageRequest,
}

async fn list_messages_handler(State(state): State<SharedState>) -> Json<Vec<Message>> {
    Json(state.conversation().messages())
}

async fn send_message_handler(
    State(state): State<SharedState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message must not be empty"));
    }
    let Some(permit) = state.conversation().try_acquire() else {
        return Err(api_error(
            StatusCode::CONFLICT,
            "A message is already being processed",
        ));
    };
    let context = state.page_context(&payload.page).map_err(runtime_error)?;

    info!(page = context.page_name(), "v1/assistant message");
    let reply = permit.send(payload.message.trim(), &context).await;
    Ok(Json(reply))
}

async fn clear_messages_handler(State(state): State<SharedState>) -> StatusCode {
    state.conversation().clear();
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        body_json, empty_request, failing_state, json_request, sample_rows, test_state,
    };
    use tower::ServiceExt;

    async fn loaded_state() -> SharedState {
        let state = test_state();
        let response = v1_router(state.clone())
            .oneshot(json_request("PUT", "/roster", serde_json::json!({"data": sample_rows()})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["count"], 2);
        state
    }

    #[tokio::test]
    async fn put_roster_fills_defaults() {
        let state = loaded_state().await;
        let response = v1_router(state)
            .oneshot(empty_request("GET", "/roster"))
            .await
            .unwrap();
        let rows = body_json(response).await;
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert!(rows[0]["Commenced Date"].is_string());
    }

    #[tokio::test]
    async fn empty_upload_is_400() {
        let response = v1_router(test_state())
            .oneshot(json_request("PUT", "/roster", serde_json::json!({"data": []})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn password_signal_is_422() {
        let response = v1_router(test_state())
            .oneshot(json_request(
                "PUT",
                "/roster",
                serde_json::json!({"requiresPassword": true, "error": "File is encrypted"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["requiresPassword"], true);
        assert_eq!(json["error"], "File is encrypted");
    }

    #[tokio::test]
    async fn dashboard_matches_sample_totals() {
        let state = loaded_state().await;
        let response = v1_router(state)
            .oneshot(empty_request("GET", "/dashboard"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["financial"]["totalOutstanding"], 2500.0);
        assert_eq!(json["financial"]["totalInstallments"], 1250.0);
        assert_eq!(json["financial"]["activeCount"], 0);
        assert_eq!(json["averageInstallment"], 625.0);
        assert_eq!(json["statusDistribution"][0]["name"], "Active");
        assert_eq!(json["statusDistribution"][0]["value"], 2);
        assert_eq!(json["monthlySignups"].as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn narratives_report_their_tier() {
        let state = loaded_state().await;
        let response = v1_router(state.clone())
            .oneshot(empty_request("GET", "/dashboard/narratives"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["tier"], "fresh");
        assert_eq!(json["comments"]["plan"], "Mock response");

        let response = v1_router(state)
            .oneshot(empty_request("GET", "/dashboard/narratives"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["tier"], "reused");
    }

    #[tokio::test]
    async fn narratives_fall_back_when_provider_fails() {
        let state = failing_state();
        state.ingest(sample_rows()).unwrap();
        let response = v1_router(state)
            .oneshot(empty_request("GET", "/dashboard/narratives"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["tier"], "fallback");
        assert_eq!(json["comments"]["plan"], "Analysis of plan distribution.");
    }

    #[tokio::test]
    async fn delete_roster_empties_dashboard() {
        let state = loaded_state().await;
        let response = v1_router(state.clone())
            .oneshot(empty_request("DELETE", "/roster"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.roster().snapshot().is_empty());
    }

    #[tokio::test]
    async fn clients_are_filtered_and_paginated() {
        let state = loaded_state().await;
        let response = v1_router(state)
            .oneshot(empty_request("GET", "/clients?q=bank&page=3"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["totalClients"], 2);
        assert_eq!(json["filteredClients"], 1);
        assert_eq!(json["pagination"]["currentPage"], 1);
        assert_eq!(json["clients"][0]["Cert Number"], 1002.0);
    }

    #[tokio::test]
    async fn client_lookup_by_certificate() {
        let state = loaded_state().await;
        let response = v1_router(state.clone())
            .oneshot(empty_request("GET", "/clients/1001"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["Plan Name"], "Test Plan 1");

        let response = v1_router(state)
            .oneshot(empty_request("GET", "/clients/4040"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn assistant_round_trip() {
        let state = loaded_state().await;
        let response = v1_router(state.clone())
            .oneshot(json_request(
                "POST",
                "/assistant/messages",
                serde_json::json!({"message": "Summarize", "page": {"name": "dashboard"}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "Mock response");

        let response = v1_router(state.clone())
            .oneshot(empty_request("GET", "/assistant/messages"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

        let response = v1_router(state.clone())
            .oneshot(empty_request("DELETE", "/assistant/messages"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.conversation().is_empty());
    }

    #[tokio::test]
    async fn concurrent_send_is_409() {
        let state = loaded_state().await;
        let _permit = state.conversation().try_acquire().unwrap();
        let response = v1_router(state.clone())
            .oneshot(json_request(
                "POST",
                "/assistant/messages",
                serde_json::json!({"message": "Summarize"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(state.conversation().is_empty());
    }

    #[tokio::test]
    async fn failed_send_appends_apology() {
        let state = failing_state();
        let response = v1_router(state)
            .oneshot(json_request(
                "POST",
                "/assistant/messages",
                serde_json::json!({"message": "Summarize"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["content"], trustlens_agent::APOLOGY);
    }

    #[tokio::test]
    async fn unknown_client_page_is_404() {
        let state = loaded_state().await;
        let response = v1_router(state.clone())
            .oneshot(json_request(
                "POST",
                "/assistant/messages",
                serde_json::json!({
                    "message": "Tell me about this client",
                    "page": {"name": "client-details", "cert": "9999"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!state.conversation().is_busy());
    }
}
