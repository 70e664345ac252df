use crate::models::ValidationResponse;
use crate::validation::EmailValidator;
use async_graphql::{Context, Object, Result};
use std::sync::Arc;

/// Root query type for address validation
#[derive(Default)]
pub struct EmailQuery;

#[Object]
impl EmailQuery {
    /// Validates one address. Same semantics as `GET /validate-email`.
    async fn validate_email(
        &self,
        ctx: &Context<'_>,
        email: String,
        #[graphql(default = true)] check_dns: bool,
    ) -> Result<ValidationResponse> {
        let validator = ctx.data::<Arc<EmailValidator>>()?;
        let result = validator.validate(email.trim(), check_dns).await;
        Ok(ValidationResponse::from(&result))
    }
}
