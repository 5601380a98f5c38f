//! Per-session liked-post state.
//!
//! The ledger is an explicit mapping of session key to the set of post ids
//! that session has liked. Toggles run under the DashMap entry lock, so two
//! concurrent toggles from the same session serialize instead of losing an
//! update. Keys are session-scoped even for authenticated users.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

/// Session-keyed liked-post ledger.
#[derive(Clone, Default)]
pub struct LikeLedger {
    inner: Arc<DashMap<String, HashSet<Uuid>>>,
}

impl LikeLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a like. Returns true if the post is now liked by this session.
    pub fn toggle(&self, session_key: &str, post_id: Uuid) -> bool {
        let mut entry = self.inner.entry(session_key.to_string()).or_default();
        if entry.contains(&post_id) {
            entry.remove(&post_id);
            false
        } else {
            entry.insert(post_id);
            true
        }
    }

    /// Whether this session has liked the given post.
    pub fn contains(&self, session_key: &str, post_id: Uuid) -> bool {
        self.inner
            .get(session_key)
            .is_some_and(|set| set.contains(&post_id))
    }

    /// Snapshot of the post ids liked by this session.
    pub fn liked(&self, session_key: &str) -> HashSet<Uuid> {
        self.inner
            .get(session_key)
            .map(|set| set.clone())
            .unwrap_or_default()
    }

    /// Drop a post from every session's set (post deleted).
    pub fn purge_post(&self, post_id: Uuid) {
        for mut entry in self.inner.iter_mut() {
            entry.value_mut().remove(&post_id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_like_state() {
        let ledger = LikeLedger::new();
        let post = Uuid::now_v7();

        assert!(ledger.toggle("sess-a", post));
        assert!(ledger.contains("sess-a", post));

        assert!(!ledger.toggle("sess-a", post));
        assert!(!ledger.contains("sess-a", post));
        assert!(ledger.liked("sess-a").is_empty());
    }

    #[test]
    fn sessions_are_independent() {
        let ledger = LikeLedger::new();
        let post = Uuid::now_v7();

        ledger.toggle("sess-a", post);
        assert!(!ledger.contains("sess-b", post));
    }

    #[test]
    fn purge_removes_post_from_all_sessions() {
        let ledger = LikeLedger::new();
        let post = Uuid::now_v7();
        let other = Uuid::now_v7();

        ledger.toggle("sess-a", post);
        ledger.toggle("sess-b", post);
        ledger.toggle("sess-b", other);

        ledger.purge_post(post);
        assert!(!ledger.contains("sess-a", post));
        assert!(!ledger.contains("sess-b", post));
        assert!(ledger.contains("sess-b", other));
    }
}
