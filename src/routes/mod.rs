use actix_web::{HttpResponse, Responder, get, http::header, web};

/// # Health Check Endpoint
///
/// `GET /api/v1/health`: service status, timestamp and DNS cache size.
pub mod health;

/// # Email Validation Endpoints
///
/// - `GET /validate-email?email=..&check_dns=..`: validates one address
/// - `POST /bulk-validate-emails`: validates a batch of addresses
///
/// Both answer 200 whenever the check ran, whatever the verdict. Only
/// malformed requests are rejected.
pub mod email;

/// # GraphQL Endpoints
///
/// `POST /api/v1/graphql` and the `GET /api/v1/playground` UI.
pub mod graphql;

/// Sends visitors of the bare host to the API documentation.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/swagger-ui/"))
        .finish()
}

/// # API Route Configuration
///
/// ```text
/// GET  /                      - Redirect to Swagger UI
/// GET  /validate-email        - Single address validation
/// POST /bulk-validate-emails  - Batch validation
/// GET  /api/v1/health         - Service health status
/// POST /api/v1/graphql        - GraphQL endpoint
/// GET  /api/v1/playground     - GraphQL Playground
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .configure(email::configure_routes)
        .service(
            web::scope("/api/v1")
                .configure(health::configure_routes)
                .configure(graphql::configure_routes),
        );
}
