//! Wire protocol for popup, settings-page, and warning-page messaging.
//!
//! One typed request enum replaces the pile of per-page message listeners:
//! every message is parsed here, handled exactly once, and answered with a
//! typed response. Requests are idempotent and safe to retry.

use serde::Deserialize;
use serde_json::{json, Value};

use sg_core::types::SiteStatus;

use crate::approvals::TabId;
use crate::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("message has neither an 'action' nor a 'type' field")]
    MissingKind,
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("unknown message type '{0}'")]
    UnknownType(String),
    #[error("malformed '{kind}' payload: {message}")]
    Payload { kind: &'static str, message: String },
}

// =============================================================================
// Requests
// =============================================================================

/// Incoming message, keyed by `action` (page queries) or `type`
/// (settings notifications).
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `{"action": "checkSiteStatus", "url": ...}`
    CheckSiteStatus { url: String },
    /// `{"action": "approveSite", "tabId": ..., "url": ...}`
    ApproveSite { tab_id: TabId, url: String },
    /// `{"type": "settingsUpdated", "settings": {...}}`
    SettingsUpdated { settings: Settings },
}

#[derive(Deserialize)]
struct CheckSiteStatusPayload {
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApproveSitePayload {
    tab_id: TabId,
    url: String,
}

#[derive(Deserialize)]
struct SettingsUpdatedPayload {
    settings: Settings,
}

fn payload<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    value: &Value,
) -> Result<T, DispatchError> {
    serde_json::from_value(value.clone()).map_err(|err| DispatchError::Payload {
        kind,
        message: err.to_string(),
    })
}

impl Request {
    /// Parse a raw wire message.
    pub fn from_json(value: &Value) -> Result<Request, DispatchError> {
        if let Some(action) = value.get("action").and_then(Value::as_str) {
            return match action {
                "checkSiteStatus" => {
                    let p: CheckSiteStatusPayload = payload("checkSiteStatus", value)?;
                    Ok(Request::CheckSiteStatus { url: p.url })
                }
                "approveSite" => {
                    let p: ApproveSitePayload = payload("approveSite", value)?;
                    Ok(Request::ApproveSite {
                        tab_id: p.tab_id,
                        url: p.url,
                    })
                }
                other => Err(DispatchError::UnknownAction(other.to_string())),
            };
        }
        if let Some(kind) = value.get("type").and_then(Value::as_str) {
            return match kind {
                "settingsUpdated" => {
                    let p: SettingsUpdatedPayload = payload("settingsUpdated", value)?;
                    Ok(Request::SettingsUpdated {
                        settings: p.settings,
                    })
                }
                other => Err(DispatchError::UnknownType(other.to_string())),
            };
        }
        Err(DispatchError::MissingKind)
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Typed answer for each request kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    SiteStatus {
        status: SiteStatus,
        matched_url: Option<String>,
    },
    Approved,
    SettingsAck,
}

impl Response {
    pub fn to_json(&self) -> Value {
        match self {
            Response::SiteStatus {
                status,
                matched_url,
            } => json!({
                "status": status.as_str(),
                "matchedUrl": matched_url,
            }),
            Response::Approved => json!({ "status": "approved" }),
            Response::SettingsAck => json!({ "status": "settings_updated" }),
        }
    }
}
