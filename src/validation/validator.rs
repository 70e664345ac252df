use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, Span, debug, error};
use uuid::Uuid;

use super::cache::DnsCache;
use super::dnsmx::{DeliverabilityOutcome, DeliverabilityProber, DnsResolver};
use super::error::SyntaxError;
use super::syntax::{EmailAddress, SyntaxOptions, validate_syntax_with};

pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub syntax: SyntaxOptions,
    /// Upper bound for the whole deliverability lookup of one address.
    pub dns_timeout: Duration,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            syntax: SyntaxOptions::default(),
            dns_timeout: DEFAULT_DNS_TIMEOUT,
        }
    }
}

/// Outcome of validating one address. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub email: String,
    pub address: Option<EmailAddress>,
    pub syntax_valid: bool,
    /// `None` when the DNS check was skipped or inconclusive.
    pub deliverable: Option<bool>,
    pub deliverability: Option<DeliverabilityOutcome>,
    pub error: Option<SyntaxError>,
    pub diagnostics: Vec<String>,
}

impl ValidationResult {
    fn invalid(email: &str, error: SyntaxError) -> Self {
        Self {
            email: email.to_string(),
            address: None,
            syntax_valid: false,
            deliverable: None,
            deliverability: None,
            error: Some(error),
            diagnostics: vec![error.to_string()],
        }
    }

    fn valid(
        address: EmailAddress,
        deliverability: Option<DeliverabilityOutcome>,
        diagnostics: Vec<String>,
    ) -> Self {
        Self {
            email: address.original().to_string(),
            deliverable: deliverability
                .as_ref()
                .and_then(DeliverabilityOutcome::is_deliverable),
            address: Some(address),
            syntax_valid: true,
            deliverability,
            error: None,
            diagnostics,
        }
    }

    pub fn normalized(&self) -> Option<String> {
        self.address.as_ref().map(EmailAddress::normalized)
    }

    /// Syntax is valid and the domain is not known to be undeliverable.
    pub fn is_valid(&self) -> bool {
        self.syntax_valid && self.deliverable != Some(false)
    }
}

/// Entry point for validating addresses: syntax first, then deliverability.
pub struct EmailValidator {
    prober: Arc<DeliverabilityProber>,
    options: ValidatorOptions,
}

impl EmailValidator {
    pub fn new(
        resolver: Arc<dyn DnsResolver>,
        cache: Arc<DnsCache>,
        options: ValidatorOptions,
    ) -> Self {
        Self {
            prober: Arc::new(DeliverabilityProber::new(resolver, cache)),
            options,
        }
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub async fn cached_domains(&self) -> usize {
        self.prober.cache().len().await
    }

    /// Validates `raw`, probing DNS only when `check_dns` is set and the
    /// syntax check passed.
    ///
    /// Never fails: syntax problems and inconclusive DNS answers are both
    /// reported inside the returned [`ValidationResult`].
    #[tracing::instrument(name = "validate", skip(self, raw), fields(request_id = %Uuid::new_v4()))]
    pub async fn validate(&self, raw: &str, check_dns: bool) -> ValidationResult {
        let address = match validate_syntax_with(raw, &self.options.syntax) {
            Ok(address) => address,
            Err(e) => {
                debug!(kind = e.kind(), "syntax check failed");
                return ValidationResult::invalid(raw, e);
            }
        };

        if !check_dns {
            return ValidationResult::valid(address, None, Vec::new());
        }

        if address.is_domain_literal() {
            let note = "the domain is an IP address literal; DNS check skipped".to_string();
            return ValidationResult::valid(address, None, vec![note]);
        }

        let outcome = self.probe(address.ascii_domain()).await;
        let diagnostics = vec![outcome.describe()];
        ValidationResult::valid(address, Some(outcome), diagnostics)
    }

    /// Runs the prober on its own task so a panic inside the resolver stack
    /// is contained and reported as `Unknown`. The task stays inside the
    /// caller's `validate` span.
    async fn probe(&self, domain: &str) -> DeliverabilityOutcome {
        let prober = Arc::clone(&self.prober);
        let target = domain.to_string();
        let timeout = self.options.dns_timeout;

        let task = tokio::spawn(
            async move { prober.check_deliverability(&target, timeout).await }
                .instrument(Span::current()),
        );

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(%domain, error = %e, "deliverability probe aborted");
                DeliverabilityOutcome::unknown("internal resolver failure")
            }
        }
    }
}
