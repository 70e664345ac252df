use utoipa::OpenApi;

/// OpenAPI Specification Documentation
///
/// Generated at compile time from the `#[utoipa::path]` annotations on the
/// REST handlers and served at `/api-docs/openapi.json`.
///
/// # Tags
/// 1. **Health Check**: Service monitoring endpoints
/// 2. **Email Validation**: Syntax and deliverability checks
/// 3. **GraphQL**: Unified query interface
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::email::validate_email,
        crate::routes::email::bulk_validate_emails,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::validation::ValidationResponse,
            crate::models::validation::BulkEmailRequest,
            crate::models::validation::BulkEmailValidationResult,
            crate::models::validation::BulkEmailValidationResponse,
            crate::models::validation::ErrorResponse,
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Email Validation", description = "Email address syntax and deliverability validation"),
        (name = "GraphQL", description = "GraphQL API for interacting with all service features")
    ),
    info(
        description = "RFC 5322 / RFC 6531 email validation with IDN normalization and DNS deliverability checks",
        title = "Email Validator API",
        version = "0.3.0",
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_validation_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/validate-email"));
        assert!(paths.contains_key("/bulk-validate-emails"));
        assert!(paths.contains_key("/api/v1/health"));
        assert_eq!(doc.info.title, "Email Validator API");
    }

    #[test]
    fn test_openapi_serializes() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("ValidationResponse"));
        assert!(json.contains("check_dns"));
    }
}
