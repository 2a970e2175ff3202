use axum::{
    extract::{Extension, Path},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, instrument};

use super::{store_unavailable, types::PassResponse};
use crate::pass::{Pass, PassService};

#[utoipa::path(
    get,
    path= "/v1/passes/{token}",
    params(
        ("token" = String, Path, description = "Pass token")
    ),
    responses (
        (status = 200, description = "Pass found", body = PassResponse, content_type = "application/json"),
        (status = 404, description = "No pass with this token"),
        (status = 503, description = "Pass store unavailable"),
    ),
    tag= "passes"
)]
#[instrument(skip(service))]
pub async fn get_pass(service: Extension<Arc<PassService>>, Path(token): Path<String>) -> Response {
    match lookup(&service, &token).await {
        Ok(pass) => Json(PassResponse::new(&service, &pass)).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    get,
    path= "/v1/passes/{token}/qr",
    params(
        ("token" = String, Path, description = "Pass token")
    ),
    responses (
        (status = 200, description = "QR code of the verification URL", content_type = "image/png"),
        (status = 404, description = "No pass with this token"),
        (status = 503, description = "Pass store unavailable"),
    ),
    tag= "passes"
)]
#[instrument(skip(service))]
pub async fn get_pass_qr(
    service: Extension<Arc<PassService>>,
    Path(token): Path<String>,
) -> Response {
    let pass = match lookup(&service, &token).await {
        Ok(pass) => pass,
        Err(response) => return response,
    };

    match service.render_qr(&pass) {
        Ok(image) => (
            StatusCode::OK,
            [(CONTENT_TYPE, HeaderValue::from_static("image/png"))],
            image.into_png(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to render QR: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to render QR".to_string(),
            )
                .into_response()
        }
    }
}

async fn lookup(service: &PassService, token: &str) -> Result<Pass, Response> {
    match service.get_pass_by_token(token).await {
        Ok(Some(pass)) => Ok(pass),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Pass not found".to_string()).into_response()),
        Err(err) => Err(store_unavailable(&err)),
    }
}
