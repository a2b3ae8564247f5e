//! SiteGuard Session Runtime
//!
//! The glue between the classification engine and the host browser: user
//! settings, the per-tab approval store, the interstitial redirect
//! decision, the typed message protocol used by the popup and warning
//! pages, and the status-to-icon presentation mapping.
//!
//! Host services (tab updates, icon setting, navigation) stay on the other
//! side of these seams; nothing here talks to a browser directly.
//!
//! # Modules
//!
//! - `settings`: user settings document
//! - `approvals`: tab-scoped warning bypasses
//! - `interstitial`: redirect decision and warning-URL round-trip
//! - `dispatch`: wire protocol types
//! - `session`: one background session wiring the above together
//! - `presenter`: status to icon/message mapping

pub mod approvals;
pub mod dispatch;
pub mod interstitial;
pub mod presenter;
pub mod session;
pub mod settings;

pub use approvals::{TabApprovalStore, TabId};
pub use dispatch::{Request, Response};
pub use interstitial::{warning_target, InterstitialController, NavigationDirective};
pub use presenter::{icon_paths, status_message, IconPaths};
pub use session::{Session, TabOutcome};
pub use settings::{Settings, Theme};
