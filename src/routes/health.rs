use crate::models::HealthResponse;
use crate::validation::EmailValidator;
use actix_web::{HttpResponse, Responder, get, web};

/// # Health Check Endpoint
///
/// Returns the service status, a timestamp and the size of the DNS cache.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "UP",
///   "timestamp": "2023-10-05T12:34:56.789+00:00",
///   "version": "0.3.0",
///   "dns_cache_entries": 0
/// }
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health Check"
)]
#[get("/health")]
pub async fn health(validator: web::Data<EmailValidator>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::up(validator.cached_domains().await))
}

/// - `GET /health`: Health check endpoint
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}
