//! In-memory dialog state per identity.
//!
//! This is the only shared mutable state of the bot. Each operation takes
//! the lock once, so concurrent events for different identities never see
//! each other's entries, and for one identity the last `set` wins.

use bot_core::MessageRef;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::state::DialogState;

/// Default maximum number of identities to track before LRU eviction.
const DEFAULT_MAX_IDENTITIES: usize = 10000;

/// Per-identity dialog state with LRU eviction.
///
/// Alongside the state, the store keeps the ids of transient messages
/// (inline keyboards) so they can be deleted when their flow ends.
///
/// # Example
///
/// ```rust
/// use dialog::{DialogState, StateStore};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let store = StateStore::new();
///
///     store.set(42, DialogState::AdminCreatingOrgName).await;
///     assert_eq!(store.get(42).await, Some(DialogState::AdminCreatingOrgName));
///
///     store.clear(42).await;
///     assert_eq!(store.get(42).await, None);
/// }
/// ```
#[derive(Debug)]
pub struct StateStore {
    /// Insertion order doubles as recency for eviction.
    states: RwLock<IndexMap<i64, DialogState>>,
    transient: RwLock<IndexMap<i64, Vec<MessageRef>>>,
    max_identities: usize,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create a store with the default identity limit (10,000).
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_IDENTITIES)
    }

    /// Create a store that tracks at most `max_identities` identities.
    pub fn with_limit(max_identities: usize) -> Self {
        Self {
            states: RwLock::new(IndexMap::new()),
            transient: RwLock::new(IndexMap::new()),
            max_identities: max_identities.max(1),
        }
    }

    /// Current state of an identity, or None.
    pub async fn get(&self, user_id: i64) -> Option<DialogState> {
        self.states.read().await.get(&user_id).cloned()
    }

    /// Replace the identity's state.
    pub async fn set(&self, user_id: i64, state: DialogState) {
        let mut states = self.states.write().await;

        // Re-insert at the end to mark as recently used
        states.shift_remove(&user_id);
        tracing::debug!("State of {} -> {}", user_id, state.name());
        states.insert(user_id, state);

        while states.len() > self.max_identities {
            if let Some((evicted, _)) = states.shift_remove_index(0) {
                tracing::debug!("Evicted dialog state of {}", evicted);
            }
        }
    }

    /// Remove the identity's state entirely, returning what was there.
    pub async fn clear(&self, user_id: i64) -> Option<DialogState> {
        self.states.write().await.shift_remove(&user_id)
    }

    /// Remember a message to delete when the current flow ends.
    pub async fn attach_transient(&self, user_id: i64, message: MessageRef) {
        let mut transient = self.transient.write().await;
        transient.entry(user_id).or_default().push(message);

        while transient.len() > self.max_identities {
            transient.shift_remove_index(0);
        }
    }

    /// Take all remembered messages of the identity.
    pub async fn drain_transient(&self, user_id: i64) -> Vec<MessageRef> {
        self.transient
            .write()
            .await
            .shift_remove(&user_id)
            .unwrap_or_default()
    }

    /// Number of identities with an active state.
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::OrgContext;

    fn managing(org_id: i64) -> DialogState {
        DialogState::ManagerManagingOrg {
            org: OrgContext {
                organization_id: org_id,
                organization_name: format!("Org {}", org_id),
            },
        }
    }

    #[tokio::test]
    async fn test_unknown_identity_is_empty() {
        let store = StateStore::new();
        assert_eq!(store.get(1).await, None);
        assert_eq!(store.clear(1).await, None);
        assert!(store.drain_transient(1).await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_replaces_payload() {
        let store = StateStore::new();
        store.set(1, managing(1)).await;
        store.set(1, managing(2)).await;

        assert_eq!(store.get(1).await, Some(managing(2)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_removes_entry() {
        let store = StateStore::new();
        store.set(1, DialogState::AdminCreatingOrgName).await;
        assert_eq!(store.clear(1).await, Some(DialogState::AdminCreatingOrgName));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = StateStore::with_limit(2);
        store.set(1, managing(1)).await;
        store.set(2, managing(2)).await;
        // Touch 1 so that 2 becomes the oldest
        store.set(1, managing(3)).await;
        store.set(3, managing(4)).await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(2).await.is_none());
        assert_eq!(store.get(1).await, Some(managing(3)));
    }

    #[tokio::test]
    async fn test_transient_drain() {
        let store = StateStore::new();
        let first = MessageRef {
            chat_id: 1,
            message_id: 10,
        };
        let second = MessageRef {
            chat_id: 1,
            message_id: 11,
        };
        store.attach_transient(1, first).await;
        store.attach_transient(1, second).await;

        assert_eq!(store.drain_transient(1).await, vec![first, second]);
        assert!(store.drain_transient(1).await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_identities_are_isolated() {
        let store = Arc::new(StateStore::new());
        store.set(2, managing(99)).await;

        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set(1, managing(i)).await;
                store.clear(1).await;
                store.set(1, managing(i)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get(2).await, Some(managing(99)));
        assert!(store.get(1).await.is_some());
    }
}
