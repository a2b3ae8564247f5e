//! URL classification against the active list snapshot.

use crate::snapshot::ListSnapshot;
use crate::types::{ClassificationResult, SiteStatus, CLASSIFICATION_PRECEDENCE};
use crate::url::normalize;

// =============================================================================
// Classifier
// =============================================================================

/// Classifies raw URLs with the canonical precedence policy.
///
/// One classifier instance serves every query path - toolbar icon updates,
/// popup status requests, and the interstitial redirect decision all see
/// the same ordering.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    internal_prefixes: Vec<String>,
}

impl Classifier {
    /// Create a classifier that recognizes extension-owned pages by the
    /// given raw-URL prefixes (the warning/settings/welcome pages).
    pub fn new<I, S>(internal_prefixes: I) -> Classifier
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Classifier {
            internal_prefixes: internal_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// True if the raw URL points at an extension-owned page.
    ///
    /// Checked against the raw string before normalization: internal pages
    /// use the host browser's extension scheme, which the normalizer does
    /// not accept.
    pub fn is_internal(&self, raw_url: &str) -> bool {
        self.internal_prefixes
            .iter()
            .any(|prefix| raw_url.starts_with(prefix.as_str()))
    }

    /// Classify a raw URL against the snapshot.
    ///
    /// Order: extension-internal pages short-circuit, invalid input is
    /// `NoData`, then the lists are consulted per
    /// [`CLASSIFICATION_PRECEDENCE`], each against the full normalized
    /// form and its root.
    pub fn classify(&self, snapshot: &ListSnapshot, raw_url: &str) -> ClassificationResult {
        if self.is_internal(raw_url) {
            return ClassificationResult {
                status: SiteStatus::ExtensionInternal,
                matched_url: None,
            };
        }

        let normalized = match normalize(raw_url) {
            Some(url) => url,
            None => return ClassificationResult::no_data(),
        };
        let root = normalized.root();

        for kind in CLASSIFICATION_PRECEDENCE {
            if let Some(matched) = snapshot
                .list(kind)
                .find_match(normalized.as_str(), root.as_str())
            {
                return ClassificationResult {
                    status: kind.status(),
                    matched_url: Some(matched),
                };
            }
        }

        ClassificationResult::no_data()
    }
}
