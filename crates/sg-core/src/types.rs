//! Shared type definitions for the classification engine.

use serde::{Deserialize, Serialize};

// =============================================================================
// Site Status
// =============================================================================

/// Classification of a visited URL against the curated lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    /// On the unsafe list - triggers the interstitial warning.
    Unsafe,
    /// On the potentially-unsafe list.
    PotentiallyUnsafe,
    /// On the community-maintained known-sites list.
    #[serde(rename = "community")]
    CommunityKnown,
    /// On the starred/bookmarked list.
    Starred,
    /// On the curated safe list.
    Safe,
    /// Not on any list, or the URL could not be normalized.
    NoData,
    /// An extension-owned page (warning/settings/welcome).
    #[serde(rename = "extension_page")]
    ExtensionInternal,
}

impl SiteStatus {
    /// Wire/icon identifier for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsafe => "unsafe",
            Self::PotentiallyUnsafe => "potentially_unsafe",
            Self::CommunityKnown => "community",
            Self::Starred => "starred",
            Self::Safe => "safe",
            Self::NoData => "no_data",
            Self::ExtensionInternal => "extension_page",
        }
    }
}

// =============================================================================
// List Kinds
// =============================================================================

/// The five curated classification lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Unsafe,
    PotentiallyUnsafe,
    #[serde(rename = "community")]
    CommunityKnown,
    Safe,
    Starred,
}

impl ListKind {
    /// All list kinds, in storage order.
    pub const ALL: [ListKind; 5] = [
        ListKind::Unsafe,
        ListKind::PotentiallyUnsafe,
        ListKind::CommunityKnown,
        ListKind::Safe,
        ListKind::Starred,
    ];

    /// Stable identifier used for storage keys and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsafe => "unsafe",
            Self::PotentiallyUnsafe => "potentially_unsafe",
            Self::CommunityKnown => "community",
            Self::Safe => "safe",
            Self::Starred => "starred",
        }
    }

    /// Dense index for snapshot storage.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Self::Unsafe => 0,
            Self::PotentiallyUnsafe => 1,
            Self::CommunityKnown => 2,
            Self::Safe => 3,
            Self::Starred => 4,
        }
    }

    /// The status a match on this list produces.
    pub fn status(&self) -> SiteStatus {
        match self {
            Self::Unsafe => SiteStatus::Unsafe,
            Self::PotentiallyUnsafe => SiteStatus::PotentiallyUnsafe,
            Self::CommunityKnown => SiteStatus::CommunityKnown,
            Self::Safe => SiteStatus::Safe,
            Self::Starred => SiteStatus::Starred,
        }
    }

    /// How candidates on this list are matched against a URL.
    ///
    /// Unsafe-side lists match permissively (any candidate appearing as a
    /// substring of the URL); safe-side lists match only on exact equality,
    /// so a known-good root never labels its arbitrary subpages as safe.
    pub fn match_mode(&self) -> MatchMode {
        match self {
            Self::Unsafe | Self::PotentiallyUnsafe | Self::CommunityKnown => MatchMode::Substring,
            Self::Safe | Self::Starred => MatchMode::Exact,
        }
    }
}

/// Matching semantics for a compiled list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Candidate may appear anywhere in the URL (case-insensitive).
    Substring,
    /// Candidate must equal the URL byte-for-byte.
    Exact,
}

// =============================================================================
// Source Formats
// =============================================================================

/// Raw format of a list source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Newline-delimited filter list with comment and section markers.
    FilterList,
    /// Markdown prose containing bare links.
    Markdown,
    /// Exported HTML bookmark file.
    HtmlBookmarks,
}

// =============================================================================
// Classification Precedence
// =============================================================================

/// Canonical list-check order, highest precedence first.
///
/// Community-known outranks starred, and both outrank the unsafe lists:
/// explicit curation is trusted over the broad substring blocklists. Safe
/// is checked last among the lists. Extension-internal pages and invalid
/// input are handled before any list is consulted. Every query path (icon
/// updater, popup, interstitial) goes through this one constant.
pub const CLASSIFICATION_PRECEDENCE: [ListKind; 5] = [
    ListKind::CommunityKnown,
    ListKind::Starred,
    ListKind::Unsafe,
    ListKind::PotentiallyUnsafe,
    ListKind::Safe,
];

// =============================================================================
// Classification Result
// =============================================================================

/// Outcome of classifying one URL. Computed per query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// The status produced by the highest-precedence matching list.
    pub status: SiteStatus,
    /// The normalized form (full URL or root) that produced the match.
    pub matched_url: Option<String>,
}

impl ClassificationResult {
    /// A result that matched no list.
    pub fn no_data() -> Self {
        Self {
            status: SiteStatus::NoData,
            matched_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert_eq!(CLASSIFICATION_PRECEDENCE[0], ListKind::CommunityKnown);
        assert_eq!(CLASSIFICATION_PRECEDENCE[1], ListKind::Starred);
        assert_eq!(CLASSIFICATION_PRECEDENCE[2], ListKind::Unsafe);
        assert_eq!(CLASSIFICATION_PRECEDENCE[3], ListKind::PotentiallyUnsafe);
        assert_eq!(CLASSIFICATION_PRECEDENCE[4], ListKind::Safe);
    }

    #[test]
    fn test_match_modes() {
        assert_eq!(ListKind::Unsafe.match_mode(), MatchMode::Substring);
        assert_eq!(ListKind::PotentiallyUnsafe.match_mode(), MatchMode::Substring);
        assert_eq!(ListKind::CommunityKnown.match_mode(), MatchMode::Substring);
        assert_eq!(ListKind::Safe.match_mode(), MatchMode::Exact);
        assert_eq!(ListKind::Starred.match_mode(), MatchMode::Exact);
    }

    #[test]
    fn test_kind_indices_are_dense() {
        let mut seen = [false; 5];
        for kind in ListKind::ALL {
            seen[kind.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(SiteStatus::PotentiallyUnsafe.as_str(), "potentially_unsafe");
        assert_eq!(SiteStatus::CommunityKnown.as_str(), "community");
        assert_eq!(SiteStatus::ExtensionInternal.as_str(), "extension_page");
    }
}
