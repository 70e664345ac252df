use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use unicode_normalization::UnicodeNormalization;

use super::error::SyntaxError;

const MAX_LOCAL_PART_LEN: usize = 64;
const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Non-alphanumeric characters allowed in an unquoted local part (RFC 5322 `atext`).
const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

/// How the local part's letter case is treated during normalization.
///
/// Local parts are case-sensitive per RFC 5321, yet most providers ignore
/// case. `Preserve` keeps the address as typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalPartCase {
    #[default]
    Preserve,
    Lowercase,
}

impl FromStr for LocalPartCase {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(LocalPartCase::Preserve),
            "lowercase" => Ok(LocalPartCase::Lowercase),
            other => Err(format!(
                "unknown local part case policy '{other}' (expected 'preserve' or 'lowercase')"
            )),
        }
    }
}

/// Tunables for [`validate_syntax_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxOptions {
    pub local_part_case: LocalPartCase,
    /// Accept bracketed IP domains such as `user@[192.0.2.1]`.
    pub allow_domain_literal: bool,
}

impl Default for SyntaxOptions {
    fn default() -> Self {
        Self {
            local_part_case: LocalPartCase::Preserve,
            allow_domain_literal: true,
        }
    }
}

/// A syntactically valid, normalized email address.
///
/// Only [`validate_syntax`] and [`validate_syntax_with`] construct this type,
/// so holding one is proof that the address parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    original: String,
    local_part: String,
    domain: String,
    ascii_domain: String,
    domain_literal: bool,
}

impl EmailAddress {
    /// The input exactly as received.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// NFC-normalized local part, quotes included when it was quoted.
    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    /// Lowercased domain in Unicode form.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Lowercased domain in IDNA ASCII-compatible form, used for DNS.
    pub fn ascii_domain(&self) -> &str {
        &self.ascii_domain
    }

    pub fn is_domain_literal(&self) -> bool {
        self.domain_literal
    }

    /// True when delivering to this address needs the SMTPUTF8 extension.
    pub fn smtputf8(&self) -> bool {
        !self.local_part.is_ascii()
    }

    /// The local part when it is pure ASCII.
    pub fn ascii_local_part(&self) -> Option<&str> {
        if self.smtputf8() {
            None
        } else {
            Some(&self.local_part)
        }
    }

    /// `local_part@ascii_domain`.
    pub fn normalized(&self) -> String {
        format!("{}@{}", self.local_part, self.ascii_domain)
    }

    /// The all-ASCII form of the address, if the local part allows one.
    pub fn ascii_email(&self) -> Option<String> {
        if self.smtputf8() {
            None
        } else {
            Some(self.normalized())
        }
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.ascii_domain)
    }
}

/// Validates an email address with the default [`SyntaxOptions`].
///
/// # Examples
/// ```
/// use email_validator_api::validation::syntax::validate_syntax;
///
/// let address = validate_syntax("Pelé@Exämple.com").unwrap();
/// assert_eq!(address.local_part(), "Pelé");
/// assert_eq!(address.ascii_domain(), "xn--exmple-cua.com");
/// assert!(validate_syntax("invalid@ex_mple.com").is_err());
/// ```
pub fn validate_syntax(raw: &str) -> Result<EmailAddress, SyntaxError> {
    validate_syntax_with(raw, &SyntaxOptions::default())
}

/// Parses `raw` against the dot-atom / quoted-string grammar and normalizes it.
///
/// Checks run in a fixed order: empty input, `@` separation, local part,
/// then domain. The first failing check decides the error.
pub fn validate_syntax_with(
    raw: &str,
    options: &SyntaxOptions,
) -> Result<EmailAddress, SyntaxError> {
    if raw.is_empty() {
        return Err(SyntaxError::Empty);
    }

    let separator = find_separator(raw)?;
    let (local_raw, rest) = raw.split_at(separator);
    let domain_raw = &rest[1..];

    let local_part = normalize_local_part(local_raw, options.local_part_case)?;
    let domain = normalize_domain(domain_raw, options)?;

    Ok(EmailAddress {
        original: raw.to_string(),
        local_part,
        domain: domain.unicode,
        ascii_domain: domain.ascii,
        domain_literal: domain.literal,
    })
}

/// Byte index of the single `@` that separates local part and domain.
///
/// Quotes and backslash escapes are honoured only until the separator is
/// found; any `@` after it counts as a second separator. A quote still open
/// at the end of the input swallowed the separator, so it is reported as
/// malformed quoting rather than a missing `@`.
fn find_separator(raw: &str) -> Result<usize, SyntaxError> {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut separator = None;

    for (i, c) in raw.char_indices() {
        if separator.is_some() {
            if c == '@' {
                return Err(SyntaxError::MultipleAt);
            }
            continue;
        }
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '@' if !in_quotes => separator = Some(i),
            _ => {}
        }
    }

    match separator {
        Some(i) => Ok(i),
        None if in_quotes => Err(SyntaxError::MalformedQuoting),
        None => Err(SyntaxError::MissingAt),
    }
}

fn normalize_local_part(local: &str, case: LocalPartCase) -> Result<String, SyntaxError> {
    if local.is_empty() {
        return Err(SyntaxError::EmptyLocalPart);
    }

    let mut normalized: String = local.nfc().collect();
    if case == LocalPartCase::Lowercase {
        normalized = normalized.to_lowercase();
    }

    if normalized.len() > MAX_LOCAL_PART_LEN {
        return Err(SyntaxError::LocalPartTooLong);
    }

    if normalized.starts_with('"') {
        check_quoted_string(&normalized)?;
    } else {
        check_dot_atom(&normalized)?;
    }
    Ok(normalized)
}

/// RFC 5322 `quoted-string`, with RFC 6532 UTF-8 allowed inside the quotes.
fn check_quoted_string(quoted: &str) -> Result<(), SyntaxError> {
    let content = quoted
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or(SyntaxError::MalformedQuoting)?;

    let mut escaped = false;
    for c in content.chars() {
        if escaped {
            if !is_quoted_pair_char(c) {
                return Err(SyntaxError::InvalidCharacter);
            }
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return Err(SyntaxError::MalformedQuoting),
            ' ' | '\t' => {}
            c if c.is_control() => return Err(SyntaxError::InvalidCharacter),
            _ => {}
        }
    }

    if escaped {
        // the closing quote was escaped
        return Err(SyntaxError::MalformedQuoting);
    }
    Ok(())
}

fn is_quoted_pair_char(c: char) -> bool {
    c == ' ' || c == '\t' || !c.is_control()
}

/// RFC 5322 `dot-atom`, with RFC 6531 UTF-8 characters accepted as `atext`.
fn check_dot_atom(atom: &str) -> Result<(), SyntaxError> {
    if atom.starts_with('.') || atom.ends_with('.') || atom.contains("..") {
        return Err(SyntaxError::MisplacedDot);
    }

    for c in atom.chars() {
        match c {
            '.' => {}
            '"' | '\\' => return Err(SyntaxError::MalformedQuoting),
            c if is_atext(c) => {}
            _ => return Err(SyntaxError::InvalidCharacter),
        }
    }
    Ok(())
}

fn is_atext(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c)
    } else {
        !c.is_control() && !c.is_whitespace()
    }
}

struct NormalizedDomain {
    unicode: String,
    ascii: String,
    literal: bool,
}

fn normalize_domain(domain: &str, options: &SyntaxOptions) -> Result<NormalizedDomain, SyntaxError> {
    if domain.is_empty() {
        return Err(SyntaxError::EmptyDomain);
    }

    if let Some(literal) = domain.strip_prefix('[') {
        let inner = literal
            .strip_suffix(']')
            .ok_or(SyntaxError::InvalidCharacter)?;
        if !options.allow_domain_literal {
            return Err(SyntaxError::DomainLiteralNotAllowed);
        }
        let normalized = normalize_domain_literal(inner)?;
        return Ok(NormalizedDomain {
            unicode: normalized.clone(),
            ascii: normalized,
            literal: true,
        });
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(SyntaxError::MisplacedDot);
    }

    if domain.is_ascii() {
        normalize_ascii_domain(domain)
    } else {
        normalize_unicode_domain(domain)
    }
}

/// Domain literal per RFC 5321 section 4.1.3: dotted IPv4 or `IPv6:` address.
fn normalize_domain_literal(inner: &str) -> Result<String, SyntaxError> {
    if let Ok(v4) = inner.parse::<Ipv4Addr>() {
        return Ok(format!("[{v4}]"));
    }

    let tag_len = "IPv6:".len();
    if inner.len() > tag_len && inner.is_char_boundary(tag_len) {
        let (tag, address) = inner.split_at(tag_len);
        if tag.eq_ignore_ascii_case("IPv6:") {
            if let Ok(v6) = address.parse::<Ipv6Addr>() {
                return Ok(format!("[IPv6:{v6}]"));
            }
        }
    }

    Err(SyntaxError::InvalidDomain)
}

fn normalize_ascii_domain(domain: &str) -> Result<NormalizedDomain, SyntaxError> {
    let ascii = domain.to_ascii_lowercase();
    check_ascii_labels(&ascii, SyntaxError::InvalidCharacter)?;

    // A-labels typed by the user must still decode to a valid U-label.
    let unicode = if ascii.split('.').any(|label| label.starts_with("xn--")) {
        let (unicode, result) = idna::domain_to_unicode(&ascii);
        result.map_err(|_| SyntaxError::InvalidDomain)?;
        unicode
    } else {
        ascii.clone()
    };

    Ok(NormalizedDomain {
        unicode,
        ascii,
        literal: false,
    })
}

fn normalize_unicode_domain(domain: &str) -> Result<NormalizedDomain, SyntaxError> {
    if domain.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(SyntaxError::InvalidCharacter);
    }

    let ascii = idna::domain_to_ascii(domain).map_err(|_| SyntaxError::InvalidDomain)?;
    check_ascii_labels(&ascii, SyntaxError::InvalidDomain)?;

    let (unicode, result) = idna::domain_to_unicode(&ascii);
    result.map_err(|_| SyntaxError::InvalidDomain)?;

    Ok(NormalizedDomain {
        unicode,
        ascii,
        literal: false,
    })
}

/// Letter-digit-hyphen labels with RFC 1035 length limits.
///
/// `char_error` is reported for a bad character, so callers can tell a typo
/// in an ASCII domain from a failed IDNA mapping.
fn check_ascii_labels(ascii: &str, char_error: SyntaxError) -> Result<(), SyntaxError> {
    for label in ascii.split('.') {
        if label.is_empty() {
            return Err(SyntaxError::MisplacedDot);
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(SyntaxError::LabelTooLong);
        }
        if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(char_error);
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(char_error);
        }
    }

    if ascii.len() > MAX_DOMAIN_LEN {
        return Err(SyntaxError::DomainTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid_email(email: &str) -> bool {
        validate_syntax(email).is_ok()
    }

    fn error_of(email: &str) -> SyntaxError {
        validate_syntax(email).expect_err("address should be rejected")
    }

    #[test]
    fn valid_standard_emails() {
        assert!(is_valid_email("simple@example.com"));
        assert!(is_valid_email("very.common@example.com"));
        assert!(is_valid_email("x@example.com"));
        assert!(is_valid_email("a.b@example.com"));
        assert!(is_valid_email("user.name+tag@example.com"));
    }

    #[test]
    fn valid_special_chars() {
        assert!(is_valid_email("!#$%&'*+-/=?^_`{}|~@example.com"));
        assert!(is_valid_email("\"quoted@local\"@example.com"));
        assert!(is_valid_email("\"escaped\\\"quote\"@example.com"));
        assert!(is_valid_email("\"with space\"@example.com"));
        assert!(is_valid_email("\"dots..inside\"@example.com"));
    }

    #[test]
    fn valid_domain_literals() {
        assert!(is_valid_email("user@[192.168.0.1]"));
        assert!(is_valid_email("user@[IPv6:2001:db8::1]"));
        assert!(is_valid_email(
            "user@[IPv6:2001:0db8:85a3:0000:0000:ac1f:8001:1234]"
        ));
    }

    #[test]
    fn domain_literal_is_flagged_and_canonical() {
        let address = validate_syntax("user@[IPv6:2001:0DB8::0001]").unwrap();
        assert!(address.is_domain_literal());
        assert_eq!(address.ascii_domain(), "[IPv6:2001:db8::1]");
    }

    #[test]
    fn domain_literal_can_be_disabled() {
        let options = SyntaxOptions {
            allow_domain_literal: false,
            ..SyntaxOptions::default()
        };
        assert_eq!(
            validate_syntax_with("user@[192.168.0.1]", &options),
            Err(SyntaxError::DomainLiteralNotAllowed)
        );
    }

    #[test]
    fn valid_international() {
        assert!(is_valid_email("Pelé@exämple.中国"));
        assert!(is_valid_email("用户@例子.中国"));
        assert!(is_valid_email("ἀρχαῖα@δόκιμη.gr"));
    }

    #[test]
    fn idn_domain_is_punycoded() {
        let address = validate_syntax("üser@münchen.de").unwrap();
        assert_eq!(address.domain(), "münchen.de");
        assert_eq!(address.ascii_domain(), "xn--mnchen-3ya.de");
        assert_eq!(address.normalized(), "üser@xn--mnchen-3ya.de");
        assert!(address.smtputf8());
        assert_eq!(address.ascii_email(), None);
        assert_eq!(address.ascii_local_part(), None);
    }

    #[test]
    fn ascii_local_part_only_for_ascii() {
        let address = validate_syntax("user.name@münchen.de").unwrap();
        assert_eq!(address.ascii_local_part(), Some("user.name"));
        assert!(!address.smtputf8());
    }

    #[test]
    fn valid_edge_cases() {
        let max_local = "a".repeat(64);
        assert!(is_valid_email(&format!("{}@example.com", max_local)));

        let label = "b".repeat(63);
        let domain = format!("{}.{}.{}.{}", label, label, label, "c".repeat(61));
        assert_eq!(domain.len(), 253);
        assert!(is_valid_email(&format!("user@{}", domain)));
    }

    #[test]
    fn invalid_missing_at() {
        assert_eq!(error_of("missing.example.com"), SyntaxError::MissingAt);
        assert_eq!(error_of("\"quoted@only\""), SyntaxError::MissingAt);
        assert_eq!(error_of("missing@"), SyntaxError::EmptyDomain);
        assert_eq!(error_of("@missing.com"), SyntaxError::EmptyLocalPart);
    }

    #[test]
    fn invalid_multiple_at() {
        assert_eq!(error_of("a@b@example.com"), SyntaxError::MultipleAt);
        assert_eq!(error_of("user@@domain.com"), SyntaxError::MultipleAt);
        assert_eq!(error_of("\"a@b\"@c@d.com"), SyntaxError::MultipleAt);
    }

    #[test]
    fn invalid_lengths() {
        let long_local = "a".repeat(65);
        assert_eq!(
            error_of(&format!("{}@example.com", long_local)),
            SyntaxError::LocalPartTooLong
        );

        let long_label = "b".repeat(64);
        assert_eq!(
            error_of(&format!("user@{}.com", long_label)),
            SyntaxError::LabelTooLong
        );

        let label = "b".repeat(63);
        let domain = format!("{}.{}.{}.{}", label, label, label, label);
        assert_eq!(
            error_of(&format!("user@{}", domain)),
            SyntaxError::DomainTooLong
        );
    }

    #[test]
    fn local_part_length_counts_octets() {
        // 32 two-byte characters fill the 64 octet budget exactly
        let local = "é".repeat(32);
        assert!(is_valid_email(&format!("{}@example.com", local)));
        let local = "é".repeat(33);
        assert_eq!(
            error_of(&format!("{}@example.com", local)),
            SyntaxError::LocalPartTooLong
        );
    }

    #[test]
    fn invalid_local_parts() {
        assert_eq!(error_of("no..dots@example.com"), SyntaxError::MisplacedDot);
        assert_eq!(error_of(".leading@example.com"), SyntaxError::MisplacedDot);
        assert_eq!(error_of("trailing.@example.com"), SyntaxError::MisplacedDot);
        assert_eq!(
            error_of("spaces unquoted@example.com"),
            SyntaxError::InvalidCharacter
        );
        assert_eq!(error_of("tab\tchar@example.com"), SyntaxError::InvalidCharacter);
        assert_eq!(error_of("nul\u{0}@example.com"), SyntaxError::InvalidCharacter);
    }

    #[test]
    fn invalid_domains() {
        assert_eq!(error_of("user@-hyphenstart.com"), SyntaxError::InvalidCharacter);
        assert_eq!(error_of("user@hyphenend-.com"), SyntaxError::InvalidCharacter);
        assert_eq!(error_of("user@.leadingdot.com"), SyntaxError::MisplacedDot);
        assert_eq!(error_of("user@trailingdot.com."), SyntaxError::MisplacedDot);
        assert_eq!(error_of("user@double..dot.com"), SyntaxError::MisplacedDot);
        assert_eq!(error_of("user@_invalidchar.com"), SyntaxError::InvalidCharacter);
        assert_eq!(error_of("user@exa mple.com"), SyntaxError::InvalidCharacter);
    }

    #[test]
    fn invalid_idn_domains() {
        // U+2028 LINE SEPARATOR
        assert_eq!(error_of("user@exä\u{2028}mple.com"), SyntaxError::InvalidCharacter);
        // U+FFFD is disallowed by the IDNA mapping table
        assert_eq!(error_of("user@exä\u{FFFD}mple.com"), SyntaxError::InvalidDomain);
    }

    #[test]
    fn invalid_domain_literals() {
        assert_eq!(error_of("user@[invalid.ip]"), SyntaxError::InvalidDomain);
        assert_eq!(error_of("user@[IPv6:2001:db8:::1]"), SyntaxError::InvalidDomain);
        assert_eq!(error_of("user@[192.168.0.256]"), SyntaxError::InvalidDomain);
        assert_eq!(error_of("user@[missing.bracket"), SyntaxError::InvalidCharacter);
    }

    #[test]
    fn invalid_quoting() {
        assert_eq!(error_of("\"unbalanced\"x@example.com"), SyntaxError::MalformedQuoting);
        assert_eq!(error_of("quote\"in\"@example.com"), SyntaxError::MalformedQuoting);
        assert_eq!(error_of("\"dangling\\\"@example.com"), SyntaxError::MalformedQuoting);
        assert_eq!(error_of("\"john@example.com"), SyntaxError::MalformedQuoting);
        assert_eq!(error_of("john\"@example.com"), SyntaxError::MalformedQuoting);
        assert_eq!(error_of("\"a\"b@example.com"), SyntaxError::MalformedQuoting);
    }

    #[test]
    fn invalid_special_cases() {
        assert_eq!(error_of(""), SyntaxError::Empty);
        assert_eq!(error_of("   "), SyntaxError::MissingAt);
        assert_eq!(error_of("@"), SyntaxError::EmptyLocalPart);
    }

    #[test]
    fn case_handling() {
        let address = validate_syntax("CaseSensitive@EXAMPLE.COM").unwrap();
        assert_eq!(address.local_part(), "CaseSensitive");
        assert_eq!(address.ascii_domain(), "example.com");

        let options = SyntaxOptions {
            local_part_case: LocalPartCase::Lowercase,
            ..SyntaxOptions::default()
        };
        let address = validate_syntax_with("CaseSensitive@EXAMPLE.COM", &options).unwrap();
        assert_eq!(address.normalized(), "casesensitive@example.com");
    }

    #[test]
    fn local_part_is_nfc_normalized() {
        // "e" followed by COMBINING ACUTE ACCENT composes to "é"
        let address = validate_syntax("re\u{0301}sume\u{0301}@example.com").unwrap();
        assert_eq!(address.local_part(), "r\u{e9}sum\u{e9}");
    }

    #[test]
    fn local_part_case_parses_from_config_strings() {
        assert_eq!("preserve".parse::<LocalPartCase>(), Ok(LocalPartCase::Preserve));
        assert_eq!(" Lowercase ".parse::<LocalPartCase>(), Ok(LocalPartCase::Lowercase));
        assert!("upper".parse::<LocalPartCase>().is_err());
    }
}
