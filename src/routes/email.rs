use actix_web::{HttpRequest, HttpResponse, Responder, error, get, post, web};
use futures::future::join_all;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::IntoParams;

use crate::config::AppConfig;
use crate::models::{
    BulkEmailRequest, BulkEmailValidationResponse, BulkEmailValidationResult, ErrorResponse,
    ValidationResponse,
};
use crate::validation::EmailValidator;

fn default_check_dns() -> bool {
    true
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ValidateEmailQuery {
    /// Address to validate.
    pub email: String,
    /// Probe MX/A/AAAA records of the domain. Defaults to `true`.
    #[serde(default = "default_check_dns")]
    pub check_dns: bool,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BulkValidationQuery {
    /// Probe MX/A/AAAA records of each domain. Defaults to `true`.
    #[serde(default = "default_check_dns")]
    pub check_dns: bool,
}

/// # Email Validation Endpoint
///
/// Validates one address:
/// 1. RFC 5322 / RFC 6531 syntax, with IDN domains converted to ASCII
/// 2. Domain deliverability through MX records, falling back to A/AAAA
///    (skipped with `check_dns=false`)
///
/// ## Responses
/// - **200 OK**: the check completed, whatever the verdict
/// - **400 Bad Request**: `email` missing or `check_dns` not a boolean
///
/// ## Example Request
/// ```text
/// GET /validate-email?email=user@example.com&check_dns=false
/// ```
#[utoipa::path(
    get,
    path = "/validate-email",
    params(ValidateEmailQuery),
    responses(
        (status = 200, description = "Validation completed", body = ValidationResponse),
        (status = 400, description = "Missing or malformed query parameters", body = ErrorResponse)
    ),
    tag = "Email Validation"
)]
#[get("/validate-email")]
pub async fn validate_email(
    query: web::Query<ValidateEmailQuery>,
    validator: web::Data<EmailValidator>,
) -> impl Responder {
    let result = validator.validate(query.email.trim(), query.check_dns).await;
    HttpResponse::Ok().json(ValidationResponse::from(&result))
}

/// # Bulk Email Validation Endpoint
///
/// Validates several addresses concurrently against the shared DNS cache.
/// An address counts as valid when its syntax passes and its domain is not
/// known to be undeliverable.
///
/// ## Responses
/// - **200 OK**: one result per address, with valid/invalid counts
/// - **400 Bad Request**: malformed body
/// - **406 Not Acceptable**: more addresses than the configured limit
///
/// ## Example Request
/// ```json
/// { "emails": ["user1@example.com", "user2@example.com"] }
/// ```
#[utoipa::path(
    post,
    path = "/bulk-validate-emails",
    request_body = BulkEmailRequest,
    params(BulkValidationQuery),
    responses(
        (status = 200, description = "Bulk validation results", body = BulkEmailValidationResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 406, description = "Too many addresses in one request", body = ErrorResponse)
    ),
    tag = "Email Validation"
)]
#[post("/bulk-validate-emails")]
pub async fn bulk_validate_emails(
    req: web::Json<BulkEmailRequest>,
    query: web::Query<BulkValidationQuery>,
    validator: web::Data<EmailValidator>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    if req.emails.len() > config.bulk_limit {
        warn!(
            requested = req.emails.len(),
            limit = config.bulk_limit,
            "bulk request rejected"
        );
        return HttpResponse::NotAcceptable().json(ErrorResponse::new(
            "TOO_MANY_EMAILS",
            format!(
                "At most {} addresses can be validated per request",
                config.bulk_limit
            ),
        ));
    }

    let validator = validator.get_ref();
    let check_dns = query.check_dns;
    let validation_futures = req.emails.iter().map(|email| async move {
        let result = validator.validate(email.trim(), check_dns).await;
        (email.clone(), result)
    });

    let mut results = Vec::with_capacity(req.emails.len());
    let mut valid_count = 0;
    for (email, result) in join_all(validation_futures).await {
        if result.is_valid() {
            valid_count += 1;
        }
        results.push(BulkEmailValidationResult {
            email,
            validation: ValidationResponse::from(&result),
        });
    }
    let invalid_count = results.len() - valid_count;

    info!(total = results.len(), valid_count, "bulk validation finished");

    HttpResponse::Ok().json(BulkEmailValidationResponse {
        results,
        valid_count,
        invalid_count,
    })
}

fn bad_request<E>(err: E, code: &str) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let body = ErrorResponse::new(code, err.to_string());
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Turns query string failures into a JSON 400.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| bad_request(err, "INVALID_QUERY"))
}

/// Turns body failures into a JSON 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| bad_request(err, "INVALID_BODY"))
}

/// Registers the validation endpoints and their extractor error handlers.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .app_data(json_config())
        .service(validate_email)
        .service(bulk_validate_emails);
}
