/// Parses and normalizes an email address according to RFC 5322, RFC 6531
/// and the UTS-46 IDNA profile.
///
/// Handles dot-atom and quoted-string local parts, domain literals and
/// internationalized domains, and returns either a normalized
/// [`EmailAddress`](syntax::EmailAddress) or the first [`SyntaxError`] found.
///
/// # Examples
/// ```
/// use email_validator_api::validation::syntax::validate_syntax;
/// use email_validator_api::validation::SyntaxError;
///
/// let address = validate_syntax("user.name+tag@Example.com").unwrap();
/// assert_eq!(address.normalized(), "user.name+tag@example.com");
/// assert_eq!(validate_syntax("not-an-email"), Err(SyntaxError::MissingAt));
/// ```
pub mod syntax;

/// Checks whether a domain can receive mail by looking up its DNS records.
///
/// 1. Checks for MX (Mail Exchange) records first
/// 2. Falls back to A/AAAA records if MX records are not found
///
/// Lookups go through the [`DnsResolver`](dnsmx::DnsResolver) trait, are
/// bounded by a timeout and share a [`DnsCache`](cache::DnsCache).
pub mod dnsmx;

/// Time-bounded, process-wide cache of deliverability outcomes.
pub mod cache;

/// Combines the syntax engine and the deliverability prober.
pub mod validator;

mod error;


pub use cache::DnsCache;
pub use dnsmx::{
    DeliverabilityOutcome, DeliverabilityProber, DnsResolver, MxRecord, TrustDnsResolver,
    UndeliverableReason,
};
pub use error::{DnsError, SyntaxError};
pub use syntax::{EmailAddress, LocalPartCase, SyntaxOptions, validate_syntax, validate_syntax_with};
pub use validator::{EmailValidator, ValidationResult, ValidatorOptions};
