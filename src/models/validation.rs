use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::ValidationResult;

/// # Validation Response
///
/// Body returned by `GET /validate-email`, by each entry of the bulk
/// endpoint and by the `validateEmail` GraphQL query.
///
/// `deliverable` is `null` when the DNS check was skipped or could not reach
/// a conclusion, and `false` only when the domain is known not to accept mail.
/// `errors` holds machine-readable kind codes (`"MissingAt"`,
/// `"InvalidDomain"`, ...), `messages` the human-readable diagnostics.
/// `spf` is the SPF policy found while checking a deliverable domain.
///
/// ## Example JSON
/// ```json
/// {
///   "email": "üser@münchen.de",
///   "syntax_valid": true,
///   "deliverable": null,
///   "normalized": "üser@xn--mnchen-3ya.de",
///   "errors": [],
///   "local_part": "üser",
///   "domain": "münchen.de",
///   "ascii_domain": "xn--mnchen-3ya.de",
///   "ascii_local_part": null,
///   "ascii_email": null,
///   "smtputf8": true,
///   "mx": [],
///   "spf": null,
///   "messages": []
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema, SimpleObject)]
pub struct ValidationResponse {
    pub email: String,
    pub syntax_valid: bool,
    pub deliverable: Option<bool>,
    pub normalized: Option<String>,
    pub errors: Vec<String>,
    pub local_part: Option<String>,
    pub domain: Option<String>,
    pub ascii_domain: Option<String>,
    pub ascii_local_part: Option<String>,
    pub ascii_email: Option<String>,
    pub smtputf8: bool,
    pub mx: Vec<String>,
    pub spf: Option<String>,
    pub messages: Vec<String>,
}

impl From<&ValidationResult> for ValidationResponse {
    fn from(result: &ValidationResult) -> Self {
        let address = result.address.as_ref();
        let outcome = result.deliverability.as_ref();

        Self {
            email: result.email.clone(),
            syntax_valid: result.syntax_valid,
            deliverable: result.deliverable,
            normalized: result.normalized(),
            errors: result
                .error
                .iter()
                .map(|e| e.kind().to_string())
                .collect(),
            local_part: address.map(|a| a.local_part().to_string()),
            domain: address.map(|a| a.domain().to_string()),
            ascii_domain: address.map(|a| a.ascii_domain().to_string()),
            ascii_local_part: address
                .and_then(|a| a.ascii_local_part())
                .map(str::to_string),
            ascii_email: address.and_then(|a| a.ascii_email()),
            smtputf8: address.is_some_and(|a| a.smtputf8()),
            mx: outcome.map(|o| o.mx_hosts()).unwrap_or_default(),
            spf: outcome.and_then(|o| o.spf()).map(str::to_string),
            messages: result.diagnostics.clone(),
        }
    }
}

impl From<ValidationResult> for ValidationResponse {
    fn from(result: ValidationResult) -> Self {
        Self::from(&result)
    }
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct BulkEmailRequest {
    pub emails: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct BulkEmailValidationResult {
    pub email: String,
    pub validation: ValidationResponse,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct BulkEmailValidationResponse {
    pub results: Vec<BulkEmailValidationResult>,
    pub valid_count: usize,
    pub invalid_count: usize,
}

/// JSON body of every non-200 response.
#[derive(Serialize, Deserialize, Debug, PartialEq, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
        }
    }
}
