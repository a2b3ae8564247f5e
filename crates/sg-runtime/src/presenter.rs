//! Status-to-presentation mapping for the toolbar icon and popup.
//!
//! The host sets the actual icon; this module only names the assets and
//! the popup copy for each status.

use sg_core::types::SiteStatus;

/// Toolbar icon assets at the two sizes the host wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconPaths {
    pub small: &'static str,
    pub large: &'static str,
}

/// Icon assets for a status.
pub fn icon_paths(status: SiteStatus) -> IconPaths {
    match status {
        SiteStatus::Safe => IconPaths {
            small: "res/icons/safe_19.png",
            large: "res/icons/safe_38.png",
        },
        SiteStatus::Unsafe => IconPaths {
            small: "res/icons/unsafe_19.png",
            large: "res/icons/unsafe_38.png",
        },
        SiteStatus::PotentiallyUnsafe => IconPaths {
            small: "res/icons/potentially_unsafe_19.png",
            large: "res/icons/potentially_unsafe_38.png",
        },
        SiteStatus::Starred => IconPaths {
            small: "res/icons/starred_19.png",
            large: "res/icons/starred_38.png",
        },
        SiteStatus::CommunityKnown => IconPaths {
            small: "res/icons/community_19.png",
            large: "res/icons/community_38.png",
        },
        SiteStatus::ExtensionInternal => IconPaths {
            small: "res/ext_icon_144.png",
            large: "res/ext_icon_144.png",
        },
        SiteStatus::NoData => IconPaths {
            small: "res/icons/default_19.png",
            large: "res/icons/default_38.png",
        },
    }
}

/// Popup message for a status.
pub fn status_message(status: SiteStatus, display_url: &str) -> String {
    match status {
        SiteStatus::Unsafe => {
            format!("{display_url} is flagged as unsafe. Be cautious when interacting with this site.")
        }
        SiteStatus::PotentiallyUnsafe => {
            format!("{display_url} is potentially unsafe. Proceed with caution.")
        }
        SiteStatus::CommunityKnown => {
            format!("{display_url} is a community-listed site. Proceed confidently.")
        }
        SiteStatus::Safe => format!("{display_url} is safe to browse."),
        SiteStatus::Starred => format!("{display_url} is a starred site."),
        SiteStatus::ExtensionInternal => "This is an extension page.".to_string(),
        SiteStatus::NoData => format!("No data available for {display_url}."),
    }
}
