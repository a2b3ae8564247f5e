//! Immutable compiled view of all classification lists.
//!
//! The registry builds a fresh [`ListSnapshot`] after every refresh and
//! swaps it in whole; readers classify against whatever snapshot was last
//! committed and never observe a list mid-rebuild.

use crate::matcher::Matcher;
use crate::types::{ListKind, MatchMode};

// =============================================================================
// CompiledList
// =============================================================================

/// One list's compiled matcher plus the stats the settings surface shows.
#[derive(Debug, Clone)]
pub struct CompiledList {
    kind: ListKind,
    matcher: Matcher,
    candidate_count: usize,
}

impl CompiledList {
    /// Compile a list from its normalized candidates.
    pub fn new<I, S>(kind: ListKind, candidates: I) -> CompiledList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates: Vec<String> = candidates
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect();
        let candidate_count = candidates.len();
        CompiledList {
            kind,
            matcher: Matcher::compile(kind.match_mode(), candidates),
            candidate_count,
        }
    }

    /// An empty list that matches nothing.
    pub fn empty(kind: ListKind) -> CompiledList {
        CompiledList {
            kind,
            matcher: Matcher::Never,
            candidate_count: 0,
        }
    }

    #[inline]
    pub fn kind(&self) -> ListKind {
        self.kind
    }

    #[inline]
    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidate_count == 0
    }

    /// Test a URL against this list, returning the form that matched so
    /// callers can report what produced the hit.
    ///
    /// Substring lists check the full normalized form and its root - any
    /// known-bad fragment anywhere flags the URL. Exact lists check only
    /// the full form: a safe root must not blanket-label its subpages, so
    /// the root participates only when the visited URL *is* the root.
    pub fn find_match(&self, full: &str, root: &str) -> Option<String> {
        match self.kind.match_mode() {
            MatchMode::Substring => {
                if self.matcher.test(full) {
                    Some(full.to_string())
                } else if self.matcher.test(root) {
                    Some(root.to_string())
                } else {
                    None
                }
            }
            MatchMode::Exact => {
                if self.matcher.test(full) {
                    Some(full.to_string())
                } else {
                    None
                }
            }
        }
    }
}

// =============================================================================
// ListSnapshot
// =============================================================================

/// The last-committed compiled state of all five lists.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    lists: [CompiledList; 5],
}

impl ListSnapshot {
    /// A snapshot with every list empty. This is the state before any
    /// fetch or cache load has completed; everything classifies `NoData`.
    pub fn empty() -> ListSnapshot {
        ListSnapshot {
            lists: [
                CompiledList::empty(ListKind::Unsafe),
                CompiledList::empty(ListKind::PotentiallyUnsafe),
                CompiledList::empty(ListKind::CommunityKnown),
                CompiledList::empty(ListKind::Safe),
                CompiledList::empty(ListKind::Starred),
            ],
        }
    }

    /// Build a snapshot from compiled lists; kinds not supplied stay empty.
    pub fn from_lists<I>(lists: I) -> ListSnapshot
    where
        I: IntoIterator<Item = CompiledList>,
    {
        let mut snapshot = ListSnapshot::empty();
        for list in lists {
            let idx = list.kind().index();
            snapshot.lists[idx] = list;
        }
        snapshot
    }

    /// The compiled list for one kind.
    #[inline]
    pub fn list(&self, kind: ListKind) -> &CompiledList {
        &self.lists[kind.index()]
    }

    /// Total candidates across all lists.
    pub fn total_candidates(&self) -> usize {
        self.lists.iter().map(|l| l.candidate_count()).sum()
    }
}

impl Default for ListSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
