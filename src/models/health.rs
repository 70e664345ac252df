use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Health Status Response
///
/// Operational status of the service, reported by `GET /api/v1/health` and
/// the `health` GraphQL query.
///
/// ## Fields
/// - `status`: "UP" while the service accepts requests
/// - `timestamp`: RFC 3339 timestamp of the check
/// - `version`: crate version of the running binary
/// - `dns_cache_entries`: number of domains currently held in the DNS cache
///
/// ## Example JSON
/// ```json
/// {
///   "status": "UP",
///   "timestamp": "2024-03-10T15:30:45.123456789+00:00",
///   "version": "0.3.0",
///   "dns_cache_entries": 12
/// }
/// ```
#[derive(Serialize, Debug, PartialEq, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub dns_cache_entries: usize,
}

impl HealthResponse {
    pub fn up(dns_cache_entries: usize) -> Self {
        Self {
            status: "UP".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            dns_cache_entries,
        }
    }
}
