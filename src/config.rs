use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::validation::{LocalPartCase, SyntaxOptions, ValidatorOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Service configuration, read from the environment (and `.env`, loaded in `main`).
///
/// | Variable                | Default     |
/// |-------------------------|-------------|
/// | `HOST`                  | `127.0.0.1` |
/// | `PORT`                  | `8080`      |
/// | `DNS_TIMEOUT_SECS`      | `5`         |
/// | `DNS_CACHE_TTL_SECS`    | `600`       |
/// | `LOCAL_PART_CASE`       | `preserve`  |
/// | `ALLOW_DOMAIN_LITERALS` | `true`      |
/// | `BULK_LIMIT`            | `10`        |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub dns_timeout: Duration,
    pub dns_cache_ttl: Duration,
    pub local_part_case: LocalPartCase,
    pub allow_domain_literals: bool,
    pub bulk_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dns_timeout: Duration::from_secs(5),
            dns_cache_ttl: Duration::from_secs(600),
            local_part_case: LocalPartCase::Preserve,
            allow_domain_literals: true,
            bulk_limit: 10,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            dns_timeout: Duration::from_secs(parse_nonzero_var(
                &lookup,
                "DNS_TIMEOUT_SECS",
                defaults.dns_timeout.as_secs(),
            )?),
            dns_cache_ttl: Duration::from_secs(parse_var(
                &lookup,
                "DNS_CACHE_TTL_SECS",
                defaults.dns_cache_ttl.as_secs(),
            )?),
            local_part_case: parse_var(&lookup, "LOCAL_PART_CASE", defaults.local_part_case)?,
            allow_domain_literals: parse_var(
                &lookup,
                "ALLOW_DOMAIN_LITERALS",
                defaults.allow_domain_literals,
            )?,
            bulk_limit: parse_var(&lookup, "BULK_LIMIT", defaults.bulk_limit)?,
        })
    }

    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            syntax: SyntaxOptions {
                local_part_case: self.local_part_case,
                allow_domain_literal: self.allow_domain_literals,
            },
            dns_timeout: self.dns_timeout,
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

/// A zero DNS timeout would fail every lookup before it starts.
fn parse_nonzero_var<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var(lookup, name, default)? {
        0 => Err(ConfigError::Invalid {
            name,
            value: lookup(name).unwrap_or_default(),
            reason: "must be greater than zero".to_string(),
        }),
        secs => Ok(secs),
    }
}
