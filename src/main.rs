use std::sync::Arc;

use actix_web::{App, HttpServer, web::Data};
use email_validator_api::config::AppConfig;
use email_validator_api::graphql::schema::create_schema;
use email_validator_api::openapi::ApiDoc;
use email_validator_api::telemetry::init_tracing;
use email_validator_api::validation::{DnsCache, EmailValidator, TrustDnsResolver};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Validator Service Entry Point
///
/// Configures and launches the Actix-web HTTP server with:
/// - REST validation endpoints backed by one shared [`EmailValidator`]
/// - GraphQL endpoint powered by Async-GraphQL
/// - Swagger UI for API documentation
/// - Environment configuration via `.env` file
///
/// # Endpoints
/// - Validation: `/validate-email`, `/bulk-validate-emails`
/// - GraphQL: `/api/v1/graphql`
/// - Swagger UI: `/swagger-ui/`
/// - OpenAPI spec: `/api-docs/openapi.json`
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let resolver = Arc::new(TrustDnsResolver::from_system_conf(config.dns_timeout));
    let cache = Arc::new(DnsCache::new(config.dns_cache_ttl));
    let validator = Arc::new(EmailValidator::new(
        resolver,
        cache,
        config.validator_options(),
    ));

    let schema = create_schema(Arc::clone(&validator));
    let bind_addr = (config.host.clone(), config.port);
    let config = Data::new(config);
    let validator = Data::from(validator);

    info!(host = %bind_addr.0, port = bind_addr.1, "starting email validator");

    HttpServer::new(move || {
        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(config.clone())
            .app_data(validator.clone())
            .app_data(Data::new(schema.clone()))
            .configure(email_validator_api::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
    })
    .bind(bind_addr)?
    .run()
    .await
}
