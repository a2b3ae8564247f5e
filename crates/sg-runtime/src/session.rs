//! One background session: classifier, approvals, settings, and the
//! message protocol wired together.
//!
//! Tab events and wire requests both classify through the same
//! [`Classifier`] instance, so the toolbar icon, the popup answer, and
//! the interstitial decision can never disagree about precedence.

use serde_json::{json, Value};

use sg_core::snapshot::ListSnapshot;
use sg_core::types::ClassificationResult;
use sg_core::Classifier;

use crate::approvals::TabId;
use crate::dispatch::{Request, Response};
use crate::interstitial::{InterstitialController, NavigationDirective};
use crate::presenter::{icon_paths, IconPaths};
use crate::settings::Settings;

/// Everything the host needs to react to one tab event.
#[derive(Debug, Clone)]
pub struct TabOutcome {
    pub result: ClassificationResult,
    pub icon: IconPaths,
    pub directive: NavigationDirective,
}

/// A running background session.
///
/// The session does not persist anything itself: the host saves
/// [`Self::settings`] and reconfigures the refresh schedule after a
/// settings update is acknowledged.
#[derive(Debug)]
pub struct Session {
    classifier: Classifier,
    interstitial: InterstitialController,
    settings: Settings,
}

impl Session {
    /// `extension_base` is the root URL of extension-owned pages, e.g.
    /// `ext://siteguard/`. Everything under it classifies as an internal
    /// page; the warning page lives at `<base>warning.html`.
    pub fn new(settings: Settings, extension_base: &str) -> Session {
        let base = if extension_base.ends_with('/') {
            extension_base.to_string()
        } else {
            format!("{extension_base}/")
        };
        let warning_page_url = format!("{base}warning.html");
        Session {
            classifier: Classifier::new([base]),
            interstitial: InterstitialController::new(warning_page_url),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn interstitial(&self) -> &InterstitialController {
        &self.interstitial
    }

    /// Tab finished loading a URL. Tab activation goes through the same
    /// path, so both events always agree on a tab's status.
    pub fn on_tab_updated(
        &mut self,
        snapshot: &ListSnapshot,
        tab_id: TabId,
        raw_url: &str,
    ) -> TabOutcome {
        let result = self.classifier.classify(snapshot, raw_url);
        let directive =
            self.interstitial
                .decide(tab_id, &result, raw_url, self.settings.warning_page);
        TabOutcome {
            icon: icon_paths(result.status),
            result,
            directive,
        }
    }

    /// Tab became active. Same path as [`Self::on_tab_updated`].
    pub fn on_tab_activated(
        &mut self,
        snapshot: &ListSnapshot,
        tab_id: TabId,
        raw_url: &str,
    ) -> TabOutcome {
        self.on_tab_updated(snapshot, tab_id, raw_url)
    }

    pub fn on_tab_closed(&mut self, tab_id: TabId) {
        self.interstitial.on_tab_closed(tab_id);
    }

    /// Handle one wire request. All requests are idempotent.
    pub fn handle_request(&mut self, snapshot: &ListSnapshot, request: Request) -> Response {
        match request {
            Request::CheckSiteStatus { url } => {
                let result = self.classifier.classify(snapshot, &url);
                Response::SiteStatus {
                    status: result.status,
                    matched_url: result.matched_url,
                }
            }
            Request::ApproveSite { tab_id, url } => {
                if self.interstitial.approve_and_resume(tab_id, &url).is_none() {
                    log::warn!("approveSite with unnormalizable URL: {url}");
                }
                Response::Approved
            }
            Request::SettingsUpdated { settings } => {
                self.settings = settings;
                Response::SettingsAck
            }
        }
    }

    /// Raw JSON entry point: parse, handle, answer. Parse failures come
    /// back as `{"error": ...}` instead of tearing anything down.
    pub fn handle_json(&mut self, snapshot: &ListSnapshot, message: &Value) -> Value {
        match Request::from_json(message) {
            Ok(request) => self.handle_request(snapshot, request).to_json(),
            Err(err) => {
                log::warn!("undispatchable message: {err}");
                json!({ "error": err.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::snapshot::CompiledList;
    use sg_core::types::{ListKind, SiteStatus};

    const BASE: &str = "ext://siteguard/";

    fn snapshot() -> ListSnapshot {
        ListSnapshot::from_lists([
            CompiledList::new(ListKind::Unsafe, ["https://bad.example"]),
            CompiledList::new(ListKind::Safe, ["https://good.example"]),
            CompiledList::new(ListKind::Starred, ["https://star.example"]),
        ])
    }

    fn session() -> Session {
        Session::new(Settings::default(), BASE)
    }

    #[test]
    fn test_tab_update_unsafe_redirects_and_flags() {
        let mut session = session();
        let outcome = session.on_tab_updated(&snapshot(), 1, "https://bad.example/x");
        assert_eq!(outcome.result.status, SiteStatus::Unsafe);
        assert!(outcome.icon.small.contains("unsafe"));
        assert!(matches!(
            outcome.directive,
            NavigationDirective::RedirectToWarning { .. }
        ));
    }

    #[test]
    fn test_tab_update_safe_continues() {
        let mut session = session();
        let outcome = session.on_tab_updated(&snapshot(), 1, "https://good.example/");
        assert_eq!(outcome.result.status, SiteStatus::Safe);
        assert_eq!(outcome.directive, NavigationDirective::Continue);
    }

    #[test]
    fn test_internal_page_never_redirects() {
        let mut session = session();
        let outcome =
            session.on_tab_updated(&snapshot(), 1, "ext://siteguard/warning.html?url=x");
        assert_eq!(outcome.result.status, SiteStatus::ExtensionInternal);
        assert_eq!(outcome.directive, NavigationDirective::Continue);
    }

    #[test]
    fn test_approve_flow_breaks_redirect_loop() {
        let mut session = session();
        let snapshot = snapshot();

        let first = session.on_tab_updated(&snapshot, 1, "https://bad.example/x");
        assert!(matches!(
            first.directive,
            NavigationDirective::RedirectToWarning { .. }
        ));

        let response = session.handle_request(
            &snapshot,
            Request::ApproveSite {
                tab_id: 1,
                url: "https://bad.example/x".to_string(),
            },
        );
        assert_eq!(response, Response::Approved);

        // The resume navigation classifies unsafe but passes through.
        let second = session.on_tab_updated(&snapshot, 1, "https://bad.example/x");
        assert_eq!(second.result.status, SiteStatus::Unsafe);
        assert_eq!(second.directive, NavigationDirective::Continue);

        // A different tab is still warned.
        let other = session.on_tab_updated(&snapshot, 2, "https://bad.example/x");
        assert!(matches!(
            other.directive,
            NavigationDirective::RedirectToWarning { .. }
        ));
    }

    #[test]
    fn test_tab_close_revokes_approval() {
        let mut session = session();
        let snapshot = snapshot();
        session.handle_request(
            &snapshot,
            Request::ApproveSite {
                tab_id: 1,
                url: "https://bad.example/x".to_string(),
            },
        );
        session.on_tab_closed(1);
        let outcome = session.on_tab_updated(&snapshot, 1, "https://bad.example/x");
        assert!(matches!(
            outcome.directive,
            NavigationDirective::RedirectToWarning { .. }
        ));
    }

    #[test]
    fn test_popup_and_icon_paths_agree_on_precedence() {
        // A URL on both the starred and unsafe lists must answer the same
        // status on the popup path as on the icon path.
        let snapshot = ListSnapshot::from_lists([
            CompiledList::new(ListKind::Unsafe, ["https://dual.example"]),
            CompiledList::new(ListKind::Starred, ["https://dual.example"]),
        ]);
        let mut session = session();

        let outcome = session.on_tab_updated(&snapshot, 1, "https://dual.example");
        let response = session.handle_request(
            &snapshot,
            Request::CheckSiteStatus {
                url: "https://dual.example".to_string(),
            },
        );
        match response {
            Response::SiteStatus { status, .. } => {
                assert_eq!(status, outcome.result.status);
                assert_eq!(status, SiteStatus::Starred);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn test_settings_update_applies() {
        let mut session = session();
        let snapshot = snapshot();
        let response = session.handle_json(
            &snapshot,
            &json!({
                "type": "settingsUpdated",
                "settings": {"theme": "dark", "warningPage": false, "updateFrequency": "weekly"}
            }),
        );
        assert_eq!(response["status"], "settings_updated");
        assert!(!session.settings().warning_page);

        // Warning page now disabled: unsafe classifies but does not redirect.
        let outcome = session.on_tab_updated(&snapshot, 1, "https://bad.example/x");
        assert_eq!(outcome.result.status, SiteStatus::Unsafe);
        assert_eq!(outcome.directive, NavigationDirective::Continue);
    }

    #[test]
    fn test_handle_json_reports_errors() {
        let mut session = session();
        let response = session.handle_json(&snapshot(), &json!({"gibberish": true}));
        assert!(response.get("error").is_some());
    }

    #[test]
    fn test_check_site_status_is_idempotent() {
        let mut session = session();
        let snapshot = snapshot();
        let request = json!({"action": "checkSiteStatus", "url": "https://star.example"});
        let first = session.handle_json(&snapshot, &request);
        let second = session.handle_json(&snapshot, &request);
        assert_eq!(first, second);
        assert_eq!(first["status"], "starred");
    }
}
