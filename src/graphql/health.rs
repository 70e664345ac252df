use crate::models::health::HealthResponse;
use crate::validation::EmailValidator;
use async_graphql::{Context, Object, Result};
use std::sync::Arc;

/// GraphQL representation of service health status
///
/// Mirrors the REST health response.
#[derive(Debug)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub dns_cache_entries: usize,
}

impl From<HealthResponse> for Health {
    fn from(response: HealthResponse) -> Self {
        Self {
            status: response.status,
            timestamp: response.timestamp,
            version: response.version,
            dns_cache_entries: response.dns_cache_entries,
        }
    }
}

#[Object]
impl Health {
    /// "UP" while the service accepts requests
    async fn status(&self) -> &str {
        &self.status
    }

    /// RFC 3339 timestamp in UTC
    async fn timestamp(&self) -> &str {
        &self.timestamp
    }

    async fn version(&self) -> &str {
        &self.version
    }

    /// Domains currently held in the DNS cache
    async fn dns_cache_entries(&self) -> usize {
        self.dns_cache_entries
    }
}

/// Root query type for health-related GraphQL operations
#[derive(Default)]
pub struct HealthQuery;

#[Object]
impl HealthQuery {
    /// Checks service health status
    async fn health(&self, ctx: &Context<'_>) -> Result<Health> {
        let validator = ctx.data::<Arc<EmailValidator>>()?;
        Ok(Health::from(HealthResponse::up(
            validator.cached_domains().await,
        )))
    }
}
