use axum::Json;
use smarthost_core::HomeResponse;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HomeResponse)
    )
)]
pub async fn get_home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Home".to_string(),
    })
}
