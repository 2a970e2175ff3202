//! Gate endpoints. Scanning is a GET and never consumes a pass; only the
//! explicit confirm POST does.

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    require_principal, store_unavailable,
    types::{ConfirmRequest, VerifyQuery, VerifyResponse},
    AuthHeader,
};
use crate::pass::PassService;

#[utoipa::path(
    get,
    path= "/v1/verify",
    params(VerifyQuery),
    responses (
        (status = 200, description = "Scan state of the token", body = VerifyResponse, content_type = "application/json"),
        (status = 503, description = "Pass store unavailable"),
    ),
    tag= "verify"
)]
#[instrument(skip(service, query))]
pub async fn verify(
    service: Extension<Arc<PassService>>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let token = query.token.unwrap_or_default();
    match service.check_token(&token).await {
        Ok(state) => Json(VerifyResponse::from(&state)).into_response(),
        Err(err) => store_unavailable(&err),
    }
}

#[utoipa::path(
    post,
    path= "/v1/verify/confirm",
    request_body = ConfirmRequest,
    responses (
        (status = 200, description = "Pass consumed, bearer admitted", body = VerifyResponse, content_type = "application/json"),
        (status = 400, description = "Missing payload"),
        (status = 401, description = "No authenticated email"),
        (status = 403, description = "Caller is not gate staff; session is cleared"),
        (status = 404, description = "No pass with this token"),
        (status = 409, description = "Pass already admitted"),
        (status = 503, description = "Pass store unavailable, safe to retry"),
    ),
    tag= "verify"
)]
#[instrument(skip(service, auth, headers, payload))]
pub async fn confirm(
    service: Extension<Arc<PassService>>,
    auth: Extension<AuthHeader>,
    headers: HeaderMap,
    payload: Option<Json<ConfirmRequest>>,
) -> Response {
    let principal = match require_principal(&headers, &auth) {
        Ok(principal) => principal,
        Err(status) => return (status, "Not signed in".to_string()).into_response(),
    };

    let request: ConfirmRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service
        .confirm_admission(&request.token, &principal.email)
        .await
    {
        Ok(state) => Json(VerifyResponse::from(&state)).into_response(),
        Err(err) => err.into_response(),
    }
}
