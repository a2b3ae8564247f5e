//! Tab-scoped warning bypasses.
//!
//! An approval is a user's decision to proceed past the interstitial for
//! one URL in one tab. Approvals never cross tabs and never outlive their
//! tab: the tab-closed event removes the whole set, which also keeps a
//! reused tab id from inheriting stale approvals.

use std::collections::{HashMap, HashSet};

/// Host-assigned tab identifier.
pub type TabId = i32;

/// Per-tab sets of approved normalized URLs.
#[derive(Debug, Default)]
pub struct TabApprovalStore {
    approvals: HashMap<TabId, HashSet<String>>,
}

impl TabApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an approval. Idempotent.
    pub fn approve(&mut self, tab_id: TabId, normalized_url: &str) {
        self.approvals
            .entry(tab_id)
            .or_default()
            .insert(normalized_url.to_string());
    }

    pub fn is_approved(&self, tab_id: TabId, normalized_url: &str) -> bool {
        self.approvals
            .get(&tab_id)
            .is_some_and(|urls| urls.contains(normalized_url))
    }

    /// Drop every approval for a closed tab.
    pub fn on_tab_closed(&mut self, tab_id: TabId) {
        self.approvals.remove(&tab_id);
    }

    /// Number of tabs currently holding approvals.
    pub fn tab_count(&self) -> usize {
        self.approvals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_and_query() {
        let mut store = TabApprovalStore::new();
        assert!(!store.is_approved(1, "https://bad.example"));
        store.approve(1, "https://bad.example");
        assert!(store.is_approved(1, "https://bad.example"));
        assert!(!store.is_approved(1, "https://other.example"));
    }

    #[test]
    fn test_approve_is_idempotent() {
        let mut store = TabApprovalStore::new();
        store.approve(1, "https://bad.example");
        store.approve(1, "https://bad.example");
        assert!(store.is_approved(1, "https://bad.example"));
        assert_eq!(store.tab_count(), 1);
    }

    #[test]
    fn test_approvals_do_not_cross_tabs() {
        let mut store = TabApprovalStore::new();
        store.approve(1, "https://bad.example");
        assert!(!store.is_approved(2, "https://bad.example"));
    }

    #[test]
    fn test_tab_close_clears_approvals() {
        let mut store = TabApprovalStore::new();
        store.approve(1, "https://bad.example");
        store.approve(1, "https://worse.example");
        store.on_tab_closed(1);
        assert!(!store.is_approved(1, "https://bad.example"));
        assert!(!store.is_approved(1, "https://worse.example"));
        assert_eq!(store.tab_count(), 0);
    }

    #[test]
    fn test_close_unknown_tab_is_noop() {
        let mut store = TabApprovalStore::new();
        store.on_tab_closed(99);
        assert_eq!(store.tab_count(), 0);
    }
}
