use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::instrument;

use super::{require_principal, types::PassResponse, AuthHeader};
use crate::pass::{PassService, RegistrationForm};

#[utoipa::path(
    post,
    path= "/v1/passes",
    request_body = RegistrationForm,
    responses (
        (status = 201, description = "Pass issued", body = PassResponse, content_type = "application/json"),
        (status = 200, description = "Registrant already holds a pass", body = PassResponse, content_type = "application/json"),
        (status = 400, description = "Missing or incomplete form"),
        (status = 401, description = "No authenticated email"),
        (status = 403, description = "Email does not match the identifier or domain; session is cleared"),
        (status = 503, description = "Pass store unavailable"),
    ),
    tag= "passes"
)]
#[instrument(skip(service, auth, headers, payload))]
pub async fn register(
    service: Extension<Arc<PassService>>,
    auth: Extension<AuthHeader>,
    headers: HeaderMap,
    payload: Option<Json<RegistrationForm>>,
) -> Response {
    let principal = match require_principal(&headers, &auth) {
        Ok(principal) => principal,
        Err(status) => return (status, "Not signed in".to_string()).into_response(),
    };

    let form: RegistrationForm = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service.register(form, &principal.email).await {
        Ok(registration) => {
            let status = if registration.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(PassResponse::new(&service, &registration.pass))).into_response()
        }
        Err(err) => err.into_response(),
    }
}
