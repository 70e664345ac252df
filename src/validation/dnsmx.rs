use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
    system_conf,
};

use super::cache::DnsCache;
use super::error::DnsError;

/// A mail exchanger advertised for a domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }

    /// RFC 7505 null MX: the exchange is the root name.
    pub fn is_null(&self) -> bool {
        self.exchange.is_empty()
    }
}

/// The DNS queries deliverability probing needs.
///
/// Implementations classify their failures into [`DnsError`]; an empty
/// answer for an existing name is either `Ok(vec![])` or
/// `Err(DnsError::NoRecords)`, and callers treat both the same way.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;
    async fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, DnsError>;
    /// TXT records, each with its character-strings concatenated.
    async fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, DnsError>;
}

/// [`DnsResolver`] backed by the trust-dns Tokio resolver.
pub struct TrustDnsResolver {
    resolver: TokioAsyncResolver,
}

impl TrustDnsResolver {
    /// Creates a resolver from the host's resolver configuration, falling
    /// back to the library defaults when it cannot be read.
    ///
    /// Each query is attempted once with the given per-query timeout.
    pub fn from_system_conf(timeout: Duration) -> Self {
        let config = match system_conf::read_system_conf() {
            Ok((config, _)) => config,
            Err(e) => {
                warn!(error = %e, "could not read system resolver configuration, using defaults");
                ResolverConfig::default()
            }
        };
        Self::with_config(config, timeout)
    }

    pub fn with_config(config: ResolverConfig, timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }

    fn classify_error(e: &ResolveError) -> DnsError {
        match e.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. } => {
                if *response_code == ResponseCode::NXDomain {
                    DnsError::NxDomain
                } else {
                    DnsError::NoRecords
                }
            }
            ResolveErrorKind::Timeout => DnsError::Timeout,
            _ => DnsError::Other(e.to_string()),
        }
    }
}

/// Queries an absolute name so resolver search domains never apply.
fn fqdn(domain: &str) -> String {
    format!("{}.", domain.trim_end_matches('.'))
}

#[async_trait]
impl DnsResolver for TrustDnsResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = self
            .resolver
            .mx_lookup(fqdn(domain))
            .await
            .map_err(|e| Self::classify_error(&e))?;

        Ok(lookup
            .iter()
            .map(|mx| {
                let exchange = mx.exchange().to_utf8();
                MxRecord::new(
                    mx.preference(),
                    exchange.trim_end_matches('.').to_ascii_lowercase(),
                )
            })
            .collect())
    }

    async fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, DnsError> {
        let lookup = self
            .resolver
            .lookup_ip(fqdn(domain))
            .await
            .map_err(|e| Self::classify_error(&e))?;

        Ok(lookup.iter().collect())
    }

    async fn lookup_txt(&self, domain: &str) -> Result<Vec<String>, DnsError> {
        let lookup = self
            .resolver
            .txt_lookup(fqdn(domain))
            .await
            .map_err(|e| Self::classify_error(&e))?;

        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|part| String::from_utf8_lossy(part))
                    .collect::<String>()
            })
            .collect())
    }
}

/// RFC 7208 version check; the `v=spf1` tag is case-insensitive.
fn is_spf_record(txt: &str) -> bool {
    let lower = txt.to_ascii_lowercase();
    lower == "v=spf1" || lower.starts_with("v=spf1 ")
}

/// Why a domain was judged unable to receive mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UndeliverableReason {
    /// The domain does not exist (NXDOMAIN).
    NoSuchDomain,
    /// The domain publishes a null MX record.
    NullMx,
    /// The domain exists but has neither MX nor A/AAAA records.
    NoMailHost,
}

impl fmt::Display for UndeliverableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UndeliverableReason::NoSuchDomain => "the domain name does not exist",
            UndeliverableReason::NullMx => "the domain explicitly does not accept email",
            UndeliverableReason::NoMailHost => "the domain has no mail exchanger or address records",
        };
        f.write_str(text)
    }
}

/// Result of a deliverability probe.
///
/// `Unknown` means the check was inconclusive. It is not a rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliverabilityOutcome {
    /// Mail can plausibly be delivered. `mx` is empty when the domain was
    /// accepted through its address records. `spf` is the domain's SPF
    /// policy, when it publishes one.
    Deliverable {
        mx: Vec<MxRecord>,
        spf: Option<String>,
    },
    Undeliverable { reason: UndeliverableReason },
    Unknown { reason: String },
}

impl DeliverabilityOutcome {
    pub fn unknown(reason: impl Into<String>) -> Self {
        DeliverabilityOutcome::Unknown {
            reason: reason.into(),
        }
    }

    /// `Some(true)`/`Some(false)` for conclusive outcomes, `None` for `Unknown`.
    pub fn is_deliverable(&self) -> Option<bool> {
        match self {
            DeliverabilityOutcome::Deliverable { .. } => Some(true),
            DeliverabilityOutcome::Undeliverable { .. } => Some(false),
            DeliverabilityOutcome::Unknown { .. } => None,
        }
    }

    pub fn is_conclusive(&self) -> bool {
        self.is_deliverable().is_some()
    }

    /// Hosts of the mail exchangers found, in preference order.
    pub fn mx_hosts(&self) -> Vec<String> {
        match self {
            DeliverabilityOutcome::Deliverable { mx, .. } => {
                mx.iter().map(|record| record.exchange.clone()).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn spf(&self) -> Option<&str> {
        match self {
            DeliverabilityOutcome::Deliverable { spf, .. } => spf.as_deref(),
            _ => None,
        }
    }

    /// Human-readable summary used as a response diagnostic.
    pub fn describe(&self) -> String {
        match self {
            DeliverabilityOutcome::Deliverable { mx, .. } if mx.is_empty() => {
                "no MX records; the domain accepts mail at its address records".to_string()
            }
            DeliverabilityOutcome::Deliverable { mx, .. } => {
                format!("the domain has {} mail exchanger(s)", mx.len())
            }
            DeliverabilityOutcome::Undeliverable { reason } => reason.to_string(),
            DeliverabilityOutcome::Unknown { reason } => {
                format!("deliverability could not be determined: {reason}")
            }
        }
    }
}

/// Checks whether domains can receive mail, consulting a shared cache first.
pub struct DeliverabilityProber {
    resolver: Arc<dyn DnsResolver>,
    cache: Arc<DnsCache>,
}

impl DeliverabilityProber {
    pub fn new(resolver: Arc<dyn DnsResolver>, cache: Arc<DnsCache>) -> Self {
        Self { resolver, cache }
    }

    pub fn cache(&self) -> &DnsCache {
        &self.cache
    }

    /// Determines whether `domain` (ASCII form) can plausibly receive mail.
    ///
    /// MX records are queried first, then A/AAAA as the RFC 5321 implicit MX
    /// fallback. The whole lookup is bounded by `timeout`; a timeout or any
    /// resolver failure gives [`DeliverabilityOutcome::Unknown`], which is
    /// never cached. No query is retried.
    pub async fn check_deliverability(
        &self,
        domain: &str,
        timeout: Duration,
    ) -> DeliverabilityOutcome {
        if let Some(outcome) = self.cache.get(domain).await {
            debug!(%domain, "deliverability cache hit");
            return outcome;
        }

        let outcome = match tokio::time::timeout(timeout, self.probe(domain)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(%domain, ?timeout, "DNS lookup timed out");
                DeliverabilityOutcome::unknown(format!(
                    "DNS lookup timed out after {} ms",
                    timeout.as_millis()
                ))
            }
        };

        if outcome.is_conclusive() {
            self.cache.insert(domain, outcome.clone()).await;
        }
        outcome
    }

    async fn probe(&self, domain: &str) -> DeliverabilityOutcome {
        match self.probe_mail_hosts(domain).await {
            DeliverabilityOutcome::Deliverable { mx, .. } => DeliverabilityOutcome::Deliverable {
                mx,
                spf: self.lookup_spf(domain).await,
            },
            other => other,
        }
    }

    /// First SPF record among the domain's TXT records. Lookup failures are
    /// not part of the verdict.
    async fn lookup_spf(&self, domain: &str) -> Option<String> {
        match self.resolver.lookup_txt(domain).await {
            Ok(records) => records.into_iter().find(|txt| is_spf_record(txt)),
            Err(e) => {
                debug!(%domain, error = %e, "TXT lookup failed");
                None
            }
        }
    }

    async fn probe_mail_hosts(&self, domain: &str) -> DeliverabilityOutcome {
        match self.resolver.lookup_mx(domain).await {
            Ok(records) if !records.is_empty() && records.iter().all(MxRecord::is_null) => {
                return DeliverabilityOutcome::Undeliverable {
                    reason: UndeliverableReason::NullMx,
                };
            }
            Ok(records) => {
                let mut mx: Vec<MxRecord> =
                    records.into_iter().filter(|record| !record.is_null()).collect();
                if !mx.is_empty() {
                    mx.sort();
                    mx.dedup();
                    return DeliverabilityOutcome::Deliverable { mx, spf: None };
                }
            }
            Err(DnsError::NoRecords) => {}
            Err(DnsError::NxDomain) => {
                return DeliverabilityOutcome::Undeliverable {
                    reason: UndeliverableReason::NoSuchDomain,
                };
            }
            Err(e) => {
                warn!(%domain, error = %e, "MX lookup failed");
                return DeliverabilityOutcome::unknown(e.to_string());
            }
        }

        // no MX records: fall back to the implicit MX of A/AAAA
        match self.resolver.lookup_ip(domain).await {
            Ok(addrs) if !addrs.is_empty() => DeliverabilityOutcome::Deliverable {
                mx: Vec::new(),
                spf: None,
            },
            Ok(_) | Err(DnsError::NoRecords) => DeliverabilityOutcome::Undeliverable {
                reason: UndeliverableReason::NoMailHost,
            },
            Err(DnsError::NxDomain) => DeliverabilityOutcome::Undeliverable {
                reason: UndeliverableReason::NoSuchDomain,
            },
            Err(e) => {
                warn!(%domain, error = %e, "address lookup failed");
                DeliverabilityOutcome::unknown(e.to_string())
            }
        }
    }
}
