use super::email::EmailQuery;
use super::health::HealthQuery;
use crate::validation::EmailValidator;
use async_graphql::{EmptyMutation, EmptySubscription, MergedObject, Schema};
use std::sync::Arc;

/// Root query combining health and validation queries.
#[derive(MergedObject, Default)]
pub struct QueryRoot(HealthQuery, EmailQuery);

/// Main GraphQL Schema Definition
///
/// Queries only; there are no mutations or subscriptions.
pub type AppSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Creates the GraphQL schema, sharing `validator` (and therefore its DNS
/// cache) with the REST handlers.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use email_validator_api::graphql::schema::create_schema;
/// use email_validator_api::validation::{DnsCache, EmailValidator, TrustDnsResolver, ValidatorOptions};
///
/// let resolver = Arc::new(TrustDnsResolver::from_system_conf(Duration::from_secs(5)));
/// let validator = EmailValidator::new(resolver, Arc::new(DnsCache::default()), ValidatorOptions::default());
/// let schema = create_schema(Arc::new(validator));
/// ```
pub fn create_schema(validator: Arc<EmailValidator>) -> AppSchema {
    Schema::build(
        QueryRoot::default(),
        EmptyMutation::default(),
        EmptySubscription::default(),
    )
    .data(validator)
    .finish()
}
