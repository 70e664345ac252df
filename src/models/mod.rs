/// # Health Status Response
///
/// Service status payload shared by the REST and GraphQL health checks.
pub mod health;

/// # Validation Payloads
///
/// Request and response bodies of the validation endpoints, built from a
/// [`ValidationResult`](crate::validation::ValidationResult).
pub mod validation;

pub use health::HealthResponse;
pub use validation::{
    BulkEmailRequest, BulkEmailValidationResponse, BulkEmailValidationResult, ErrorResponse,
    ValidationResponse,
};
