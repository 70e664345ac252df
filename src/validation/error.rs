use thiserror::Error;

/// Reasons an input string is not a syntactically valid email address.
///
/// Every variant maps to a stable kind code (see [`SyntaxError::kind`]) that
/// is surfaced verbatim in API responses, next to the human-readable message
/// produced by `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("the email address is empty")]
    Empty,
    #[error("the email address has no @-sign")]
    MissingAt,
    #[error("the email address has more than one unquoted @-sign")]
    MultipleAt,
    #[error("there is nothing before the @-sign")]
    EmptyLocalPart,
    #[error("there is nothing after the @-sign")]
    EmptyDomain,
    #[error("the part before the @-sign is longer than 64 octets")]
    LocalPartTooLong,
    #[error("the part after the @-sign is longer than 253 octets")]
    DomainTooLong,
    #[error("a domain label is longer than 63 octets")]
    LabelTooLong,
    #[error("the email address contains a character that is not allowed")]
    InvalidCharacter,
    #[error("the email address has a leading, trailing or repeated dot")]
    MisplacedDot,
    #[error("the domain is not a valid internationalized domain name")]
    InvalidDomain,
    #[error("the quoted part of the address is malformed")]
    MalformedQuoting,
    #[error("bracketed IP address domains are not accepted")]
    DomainLiteralNotAllowed,
}

impl SyntaxError {
    /// Stable machine-readable code for this error, equal to the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            SyntaxError::Empty => "Empty",
            SyntaxError::MissingAt => "MissingAt",
            SyntaxError::MultipleAt => "MultipleAt",
            SyntaxError::EmptyLocalPart => "EmptyLocalPart",
            SyntaxError::EmptyDomain => "EmptyDomain",
            SyntaxError::LocalPartTooLong => "LocalPartTooLong",
            SyntaxError::DomainTooLong => "DomainTooLong",
            SyntaxError::LabelTooLong => "LabelTooLong",
            SyntaxError::InvalidCharacter => "InvalidCharacter",
            SyntaxError::MisplacedDot => "MisplacedDot",
            SyntaxError::InvalidDomain => "InvalidDomain",
            SyntaxError::MalformedQuoting => "MalformedQuoting",
            SyntaxError::DomainLiteralNotAllowed => "DomainLiteralNotAllowed",
        }
    }
}

/// Classified failure of a single DNS query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnsError {
    #[error("NXDOMAIN: domain does not exist")]
    NxDomain,
    #[error("no records of the requested type")]
    NoRecords,
    #[error("DNS query timed out")]
    Timeout,
    #[error("DNS error: {0}")]
    Other(String),
}
