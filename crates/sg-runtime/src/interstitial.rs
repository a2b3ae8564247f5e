//! Interstitial redirect decision and warning-URL round-trip.
//!
//! On navigation to an unsafe URL the controller redirects the tab to the
//! warning page with the offending URL carried as a query parameter. The
//! proceed flow records the approval *before* handing back the resume
//! target; the re-classification triggered by the resume navigation then
//! sees the approval and lets the tab through instead of looping.

use url::Url;

use sg_core::types::{ClassificationResult, SiteStatus};
use sg_core::url::normalize;

use crate::approvals::{TabApprovalStore, TabId};

/// What the host should do with a navigation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDirective {
    /// Let the navigation stand.
    Continue,
    /// Redirect the tab to the warning page.
    RedirectToWarning { warning_url: String },
}

/// Decides when the warning page interposes, and owns the per-tab
/// approvals that bypass it.
#[derive(Debug)]
pub struct InterstitialController {
    approvals: TabApprovalStore,
    warning_page_url: String,
}

impl InterstitialController {
    /// `warning_page_url` is the extension-owned warning page location,
    /// e.g. `ext://siteguard/warning.html`.
    pub fn new(warning_page_url: impl Into<String>) -> Self {
        Self {
            approvals: TabApprovalStore::new(),
            warning_page_url: warning_page_url.into(),
        }
    }

    /// Redirect decision for a classified navigation.
    pub fn decide(
        &self,
        tab_id: TabId,
        result: &ClassificationResult,
        raw_url: &str,
        warning_enabled: bool,
    ) -> NavigationDirective {
        if result.status != SiteStatus::Unsafe {
            return NavigationDirective::Continue;
        }
        if !warning_enabled {
            log::debug!("warning page disabled, not redirecting tab {tab_id}");
            return NavigationDirective::Continue;
        }
        let Some(normalized) = normalize(raw_url) else {
            return NavigationDirective::Continue;
        };
        if self.approvals.is_approved(tab_id, normalized.as_str()) {
            log::debug!("tab {tab_id} already approved {normalized}");
            return NavigationDirective::Continue;
        }
        NavigationDirective::RedirectToWarning {
            warning_url: build_warning_url(&self.warning_page_url, raw_url),
        }
    }

    /// Proceed action from the warning page: record the approval, then
    /// return the URL the tab should be navigated back to. The ordering
    /// is the loop guard - do not navigate first.
    pub fn approve_and_resume(&mut self, tab_id: TabId, raw_url: &str) -> Option<String> {
        let normalized = normalize(raw_url)?;
        self.approvals.approve(tab_id, normalized.as_str());
        log::info!("tab {tab_id} approved {normalized}");
        Some(raw_url.to_string())
    }

    pub fn is_approved(&self, tab_id: TabId, raw_url: &str) -> bool {
        match normalize(raw_url) {
            Some(normalized) => self.approvals.is_approved(tab_id, normalized.as_str()),
            None => false,
        }
    }

    pub fn on_tab_closed(&mut self, tab_id: TabId) {
        self.approvals.on_tab_closed(tab_id);
    }

    pub fn approvals(&self) -> &TabApprovalStore {
        &self.approvals
    }
}

/// Build the warning-page URL with the offending URL percent-encoded into
/// the `url` parameter.
fn build_warning_url(warning_page_url: &str, offending_url: &str) -> String {
    match Url::parse_with_params(warning_page_url, &[("url", offending_url)]) {
        Ok(url) => url.to_string(),
        Err(err) => {
            // The warning page location is extension-configured; a parse
            // failure here means misconfiguration, not bad input.
            log::error!("invalid warning page URL '{warning_page_url}': {err}");
            warning_page_url.to_string()
        }
    }
}

/// Decode the offending URL back out of a warning-page URL.
pub fn warning_target(warning_url: &str) -> Option<String> {
    let parsed = Url::parse(warning_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::types::SiteStatus;

    const WARNING: &str = "ext://siteguard/warning.html";

    fn unsafe_result() -> ClassificationResult {
        ClassificationResult {
            status: SiteStatus::Unsafe,
            matched_url: Some("https://bad.example".to_string()),
        }
    }

    #[test]
    fn test_unsafe_unapproved_redirects() {
        let controller = InterstitialController::new(WARNING);
        let directive = controller.decide(1, &unsafe_result(), "https://bad.example/page?x=1", true);
        match directive {
            NavigationDirective::RedirectToWarning { warning_url } => {
                assert!(warning_url.starts_with(WARNING));
                assert_eq!(
                    warning_target(&warning_url).as_deref(),
                    Some("https://bad.example/page?x=1")
                );
            }
            NavigationDirective::Continue => panic!("expected redirect"),
        }
    }

    #[test]
    fn test_non_unsafe_continues() {
        let controller = InterstitialController::new(WARNING);
        for status in [
            SiteStatus::Safe,
            SiteStatus::PotentiallyUnsafe,
            SiteStatus::NoData,
        ] {
            let result = ClassificationResult {
                status,
                matched_url: None,
            };
            assert_eq!(
                controller.decide(1, &result, "https://site.example", true),
                NavigationDirective::Continue
            );
        }
    }

    #[test]
    fn test_disabled_warning_page_continues() {
        let controller = InterstitialController::new(WARNING);
        assert_eq!(
            controller.decide(1, &unsafe_result(), "https://bad.example", false),
            NavigationDirective::Continue
        );
    }

    #[test]
    fn test_approve_then_no_redirect_loop() {
        let mut controller = InterstitialController::new(WARNING);
        let resume = controller.approve_and_resume(1, "https://bad.example/page");
        assert_eq!(resume.as_deref(), Some("https://bad.example/page"));

        // The resume navigation re-classifies as unsafe, but the recorded
        // approval suppresses the redirect.
        assert_eq!(
            controller.decide(1, &unsafe_result(), "https://bad.example/page", true),
            NavigationDirective::Continue
        );
    }

    #[test]
    fn test_approval_is_tab_scoped() {
        let mut controller = InterstitialController::new(WARNING);
        controller.approve_and_resume(1, "https://bad.example");
        assert!(controller.is_approved(1, "https://bad.example"));
        assert!(!controller.is_approved(2, "https://bad.example"));

        match controller.decide(2, &unsafe_result(), "https://bad.example", true) {
            NavigationDirective::RedirectToWarning { .. } => {}
            NavigationDirective::Continue => panic!("tab 2 must still be warned"),
        }
    }

    #[test]
    fn test_tab_close_revokes_approval() {
        let mut controller = InterstitialController::new(WARNING);
        controller.approve_and_resume(1, "https://bad.example");
        controller.on_tab_closed(1);
        assert!(!controller.is_approved(1, "https://bad.example"));
    }

    #[test]
    fn test_approval_normalizes_url_variants() {
        let mut controller = InterstitialController::new(WARNING);
        controller.approve_and_resume(1, "https://www.bad.example/page/");
        // Same page spelled differently still counts as approved.
        assert!(controller.is_approved(1, "https://bad.example/page?utm=x"));
    }

    #[test]
    fn test_warning_url_roundtrip_encodes_query() {
        let url = build_warning_url(WARNING, "https://bad.example/p?a=1&b=2#frag");
        assert_eq!(
            warning_target(&url).as_deref(),
            Some("https://bad.example/p?a=1&b=2#frag")
        );
    }
}
