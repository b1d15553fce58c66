//! Core value types shared by the catalog, the preference store and the views

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::constants::labels;

/// Delivery mechanism for a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Email,
    InProduct,
}

impl Channel {
    /// Display order used when joining channel names
    pub const ALL: [Channel; 2] = [Channel::Email, Channel::InProduct];

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Email => labels::EMAIL,
            Channel::InProduct => labels::IN_PRODUCT,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of channels, always iterated in display order (Email, then In-product)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Channel>", into = "Vec<Channel>")]
pub struct ChannelSet {
    email: bool,
    in_product: bool,
}

impl ChannelSet {
    pub const EMPTY: ChannelSet = ChannelSet { email: false, in_product: false };
    pub const BOTH: ChannelSet = ChannelSet { email: true, in_product: true };

    pub fn only(channel: Channel) -> Self {
        let mut set = Self::EMPTY;
        set.insert(channel);
        set
    }

    pub fn contains(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::InProduct => self.in_product,
        }
    }

    pub fn insert(&mut self, channel: Channel) {
        self.set(channel, true);
    }

    pub fn remove(&mut self, channel: Channel) {
        self.set(channel, false);
    }

    pub fn set(&mut self, channel: Channel, on: bool) {
        match channel {
            Channel::Email => self.email = on,
            Channel::InProduct => self.in_product = on,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.email && !self.in_product
    }

    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl From<Vec<Channel>> for ChannelSet {
    fn from(channels: Vec<Channel>) -> Self {
        let mut set = Self::EMPTY;
        for channel in channels {
            set.insert(channel);
        }
        set
    }
}

impl From<ChannelSet> for Vec<Channel> {
    fn from(set: ChannelSet) -> Self {
        set.iter().collect()
    }
}

/// Renders as the display summary: "Email, In-product notifications", "Email",
/// "In-product notifications" or "Off"
impl fmt::Display for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(labels::OFF);
        }
        let names: Vec<&str> = self.iter().map(|c| c.label()).collect();
        f.write_str(&names.join(", "))
    }
}

/// Top-level page context selecting which categories are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationArea {
    GlobalSettings,
    Talent,
    TimeOff,
    Travel,
}

impl ApplicationArea {
    pub fn all() -> &'static [ApplicationArea] {
        &[
            Self::GlobalSettings,
            Self::Talent,
            Self::TimeOff,
            Self::Travel,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GlobalSettings => "Global settings",
            Self::Talent => "Talent",
            Self::TimeOff => "Time off",
            Self::Travel => "Travel",
        }
    }
}

impl fmt::Display for ApplicationArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EmailPolicy {
    /// Send only the notifications the user has chosen
    #[default]
    All,
    /// Only send required notifications
    RequiredOnly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InProductPolicy {
    #[default]
    All,
    Never,
}

/// The two page-wide defaults governing channel eligibility absent an override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPolicy {
    pub email: EmailPolicy,
    pub in_product: InProductPolicy,
}

impl GlobalPolicy {
    /// Whether policy suppresses email for an item that has no override
    pub fn suppresses_email(&self, required: bool) -> bool {
        self.email == EmailPolicy::RequiredOnly && !required
    }

    pub fn suppresses_in_product(&self) -> bool {
        self.in_product == InProductPolicy::Never
    }

    /// Channel values an override takes when it is first created for an item
    pub fn default_override(&self, required: bool) -> Override {
        Override {
            email: !self.suppresses_email(required),
            in_product: !self.suppresses_in_product(),
        }
    }
}

/// A single global policy mutation, one per policy pseudo-item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "value", rename_all = "kebab-case")]
pub enum PolicyChange {
    Email(EmailPolicy),
    InProduct(InProductPolicy),
}

impl PolicyChange {
    pub fn channel(&self) -> Channel {
        match self {
            PolicyChange::Email(_) => Channel::Email,
            PolicyChange::InProduct(_) => Channel::InProduct,
        }
    }
}

/// Stable identity of an item: (category id, item name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub category_id: String,
    pub item_name: String,
}

impl ItemKey {
    pub fn new(category_id: impl Into<String>, item_name: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            item_name: item_name.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category_id, self.item_name)
    }
}

/// Explicit per-item channel choice; takes precedence over the global policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    pub email: bool,
    pub in_product: bool,
}

impl Override {
    pub fn get(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::InProduct => self.in_product,
        }
    }
}

/// Partial override update; absent fields keep their current (or default) value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_product: Option<bool>,
}

impl ChannelPatch {
    pub fn email(on: bool) -> Self {
        Self { email: Some(on), in_product: None }
    }

    pub fn in_product(on: bool) -> Self {
        Self { email: None, in_product: Some(on) }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.in_product.is_none()
    }

    pub fn apply_to(&self, base: Override) -> Override {
        Override {
            email: self.email.unwrap_or(base.email),
            in_product: self.in_product.unwrap_or(base.in_product),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_set_display_order() {
        assert_eq!(ChannelSet::BOTH.to_string(), "Email, In-product notifications");
        assert_eq!(ChannelSet::only(Channel::Email).to_string(), "Email");
        assert_eq!(
            ChannelSet::only(Channel::InProduct).to_string(),
            "In-product notifications"
        );
        assert_eq!(ChannelSet::EMPTY.to_string(), "Off");
    }

    #[test]
    fn test_channel_set_serializes_as_list() {
        let json = serde_json::to_string(&ChannelSet::BOTH).unwrap();
        assert_eq!(json, r#"["email","in-product"]"#);

        let set: ChannelSet = serde_json::from_str(r#"["in-product"]"#).unwrap();
        assert_eq!(set, ChannelSet::only(Channel::InProduct));
    }

    #[test]
    fn test_default_override_follows_policy() {
        let policy = GlobalPolicy {
            email: EmailPolicy::RequiredOnly,
            in_product: InProductPolicy::Never,
        };
        assert_eq!(
            policy.default_override(false),
            Override { email: false, in_product: false }
        );
        assert_eq!(
            policy.default_override(true),
            Override { email: true, in_product: false }
        );
        assert_eq!(
            GlobalPolicy::default().default_override(false),
            Override { email: true, in_product: true }
        );
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let base = Override { email: true, in_product: false };
        assert_eq!(
            ChannelPatch::in_product(true).apply_to(base),
            Override { email: true, in_product: true }
        );
        assert!(ChannelPatch::default().is_empty());
    }

    #[test]
    fn test_policy_change_serializes_tagged() {
        let change = PolicyChange::Email(EmailPolicy::RequiredOnly);
        let json = serde_json::to_string(&change).unwrap();
        assert_eq!(json, r#"{"channel":"email","value":"required-only"}"#);
    }
}
