//! Application-wide constants
//!
//! Display strings, tooltips and file locations used throughout the crate,
//! kept in one place so the views and the renderer agree on wording.

/// Channel summary and control labels
pub mod labels {
    /// Email channel display name
    pub const EMAIL: &str = "Email";

    /// In-product channel display name
    pub const IN_PRODUCT: &str = "In-product notifications";

    /// Summary shown for an item with no active channel
    pub const OFF: &str = "Off";

    /// Badge shown next to required items
    pub const REQUIRED: &str = "Required";

    /// Description of the email channel in the item detail view
    pub const EMAIL_DESCRIPTION: &str = "Sent to your email address";

    /// Description of the in-product channel in the item detail view
    pub const IN_PRODUCT_DESCRIPTION: &str = "Delivered in the Notification Center, and will appear as a red badge on the bell icon, both on the web and mobile apps of Rippling";
}

/// Global policy select option labels
pub mod policy {
    pub const SEND_CHOSEN: &str = "Send only the notifications I've chosen";
    pub const REQUIRED_ONLY: &str = "Only send required notifications";
    pub const NEVER: &str = "Never send";
}

/// Tooltips for locked controls
pub mod tooltips {
    /// Category, page or item title toggle locked by a required item
    pub const REQUIRED: &str = "Some notifications are required";

    /// Channel switch locked by a global policy
    pub const ADJUST_GLOBAL: &str = "Adjust global settings to enable this channel";
}

/// Identifiers of the synthetic global settings page
pub mod global {
    /// Category id of the global settings card
    pub const CATEGORY_ID: &str = "global-settings";
}

/// Configuration file location
pub mod config {
    /// Directory under the user config dir
    pub const APP_DIR: &str = "notify-prefs";

    /// Config file name
    pub const FILENAME: &str = "config.json";

    /// Log levels accepted in config and LOG_LEVEL
    pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
}
