use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::dnsmx::DeliverabilityOutcome;

/// How long a deliverability verdict is reused before the domain is re-checked.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Expired entries are swept on insert once the map grows past this size.
const SWEEP_THRESHOLD: usize = 4096;

#[derive(Debug, Clone)]
pub struct DnsCacheEntry {
    pub outcome: DeliverabilityOutcome,
    pub checked_at: Instant,
}

impl DnsCacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.checked_at.elapsed() < ttl
    }
}

/// Process-wide cache of deliverability outcomes keyed by ASCII domain.
///
/// Entries are replaced whole under a write lock, so a reader sees either
/// the previous entry or the new one. Entries older than the TTL are
/// treated as absent.
#[derive(Debug)]
pub struct DnsCache {
    entries: RwLock<HashMap<String, DnsCacheEntry>>,
    ttl: Duration,
}

impl Default for DnsCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl DnsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached outcome for `domain` if it is still within the TTL.
    pub async fn get(&self, domain: &str) -> Option<DeliverabilityOutcome> {
        let entries = self.entries.read().await;
        entries
            .get(&domain.to_ascii_lowercase())
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.outcome.clone())
    }

    pub async fn insert(&self, domain: &str, outcome: DeliverabilityOutcome) {
        let mut entries = self.entries.write().await;
        if entries.len() >= SWEEP_THRESHOLD {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.is_fresh(ttl));
        }
        entries.insert(
            domain.to_ascii_lowercase(),
            DnsCacheEntry {
                outcome,
                checked_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, expired ones included until they are swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::dnsmx::{MxRecord, UndeliverableReason};
    use std::sync::Arc;

    fn deliverable() -> DeliverabilityOutcome {
        DeliverabilityOutcome::Deliverable {
            mx: vec![MxRecord::new(10, "mx.example.com")],
            spf: None,
        }
    }

    #[tokio::test]
    async fn test_get_returns_fresh_entry() {
        let cache = DnsCache::default();
        assert!(cache.is_empty().await);

        cache.insert("example.com", deliverable()).await;

        assert_eq!(cache.get("example.com").await, Some(deliverable()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_keys_are_case_insensitive() {
        let cache = DnsCache::default();
        cache.insert("Example.COM", deliverable()).await;

        assert!(cache.get("example.com").await.is_some());
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache = DnsCache::new(Duration::ZERO);
        cache.insert("example.com", deliverable()).await;

        assert_eq!(cache.get("example.com").await, None);
    }

    #[tokio::test]
    async fn test_insert_replaces_whole_entry() {
        let cache = DnsCache::default();
        cache.insert("example.com", deliverable()).await;
        let undeliverable = DeliverabilityOutcome::Undeliverable {
            reason: UndeliverableReason::NoMailHost,
        };
        cache.insert("example.com", undeliverable.clone()).await;

        assert_eq!(cache.get("example.com").await, Some(undeliverable));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(DnsCache::default());
        let mut handles = Vec::new();

        for i in 0..32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let domain = format!("domain{}.example", i % 4);
                cache.insert(&domain, deliverable()).await;
                cache.get(&domain).await
            }));
        }

        for handle in handles {
            let seen = handle.await.unwrap();
            assert_eq!(seen, Some(deliverable()));
        }
        assert_eq!(cache.len().await, 4);
    }
}
