//! Per-credential record of topics that should stay subscribed across reconnects.

use crate::control_plane::credential::CredentialKey;
use crate::observability::events;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

const COMPONENT: &str = "subscription_ledger";

type TopicSet = BTreeSet<String>;

/// In-memory subscription bookkeeping. Never persisted.
#[derive(Default)]
pub struct SubscriptionLedger {
    topics: Mutex<HashMap<CredentialKey, TopicSet>>,
}

impl SubscriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CredentialKey, TopicSet>> {
        // Every mutation is a single insert/remove, so a poisoned map is still consistent.
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `topic` for `credential`. Returns `true` only when newly added.
    pub fn record_subscribed(&self, credential: &CredentialKey, topic: &str) -> bool {
        let inserted = self
            .lock()
            .entry(credential.clone())
            .or_default()
            .insert(topic.to_string());
        debug!(
            event = events::LEDGER_RECORD_SUBSCRIBED,
            component = COMPONENT,
            credential = %credential,
            topic,
            inserted,
            "recorded subscription"
        );
        inserted
    }

    /// Removes `topic` for `credential`. Returns `true` only when it was present.
    pub fn record_unsubscribed(&self, credential: &CredentialKey, topic: &str) -> bool {
        let mut topics = self.lock();
        let Some(subscribed) = topics.get_mut(credential) else {
            return false;
        };

        let removed = subscribed.remove(topic);
        if subscribed.is_empty() {
            topics.remove(credential);
        }
        drop(topics);

        debug!(
            event = events::LEDGER_RECORD_UNSUBSCRIBED,
            component = COMPONENT,
            credential = %credential,
            topic,
            removed,
            "recorded unsubscription"
        );
        removed
    }

    /// Sorted snapshot of the topics recorded for `credential`.
    pub fn list_subscribed(&self, credential: &CredentialKey) -> Vec<String> {
        self.lock()
            .get(credential)
            .map(|subscribed| subscribed.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, credential: &CredentialKey, topic: &str) -> bool {
        self.lock()
            .get(credential)
            .is_some_and(|subscribed| subscribed.contains(topic))
    }
}
