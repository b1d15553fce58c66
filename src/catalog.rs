//! Catalog provider: static category/item definitions per application area
//!
//! The catalog only carries structure. Enabled flags, overrides and policy live
//! in the preference store and are merged in when a page view is built.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{global, labels};
use crate::types::{ApplicationArea, Channel, ChannelSet, ItemKey};

/// One notification setting within a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    /// Channels the item can be delivered on at all
    #[serde(default = "default_channels")]
    pub channels: ChannelSet,
    #[serde(default)]
    pub required: bool,
    /// Set only for the global settings pseudo-items: the channel whose policy it edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Channel>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

fn default_channels() -> ChannelSet {
    ChannelSet::BOTH
}

impl ItemDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            channels: ChannelSet::BOTH,
            required: false,
            policy: None,
            description: String::new(),
        }
    }

    pub fn required(name: &str) -> Self {
        Self {
            required: true,
            ..Self::new(name)
        }
    }

    fn policy_setting(channel: Channel, description: &str) -> Self {
        Self {
            name: channel.label().to_string(),
            channels: ChannelSet::only(channel),
            required: false,
            policy: Some(channel),
            description: description.to_string(),
        }
    }

    pub fn is_global_policy_setting(&self) -> bool {
        self.policy.is_some()
    }
}

/// A notification topic grouping with its own enable toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub id: String,
    pub area: ApplicationArea,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub items: Vec<ItemDef>,
}

impl CategoryDef {
    pub fn new(id: &str, area: ApplicationArea, title: &str, description: &str, items: Vec<ItemDef>) -> Self {
        Self {
            id: id.to_string(),
            area,
            title: title.to_string(),
            description: description.to_string(),
            items,
        }
    }

    /// The synthetic global settings card has no enable toggle
    pub fn is_global(&self) -> bool {
        self.area == ApplicationArea::GlobalSettings
    }

    pub fn has_required(&self) -> bool {
        self.items.iter().any(|item| item.required)
    }

    pub fn item(&self, name: &str) -> Option<&ItemDef> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn key(&self, item: &ItemDef) -> ItemKey {
        ItemKey::new(&self.id, &item.name)
    }
}

/// Ordered set of categories across every application area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<CategoryDef>,
}

impl Catalog {
    /// Categories shown for an area, in display order
    pub fn categories(&self, area: ApplicationArea) -> impl Iterator<Item = &CategoryDef> {
        self.categories.iter().filter(move |c| c.area == area)
    }

    pub fn category(&self, id: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn lookup(&self, key: &ItemKey) -> Option<(&CategoryDef, &ItemDef)> {
        let category = self.category(&key.category_id)?;
        let item = category.item(&key.item_name)?;
        Some((category, item))
    }

    /// Every category that delivers notifications (everything but global settings)
    pub fn notification_categories(&self) -> impl Iterator<Item = &CategoryDef> {
        self.categories.iter().filter(|c| !c.is_global())
    }

    /// Load a custom catalog from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {:?}", path))?;
        let catalog: Catalog = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog JSON from {:?}", path))?;
        catalog
            .validate()
            .with_context(|| format!("Invalid catalog in {:?}", path))?;
        info!(path = %path.display(), categories = catalog.categories.len(), "Loaded custom catalog");
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut has_global = false;

        for category in &self.categories {
            if !ids.insert(category.id.as_str()) {
                bail!("duplicate category id '{}'", category.id);
            }
            if category.is_global() {
                has_global = true;
            }

            let mut names = HashSet::new();
            for item in &category.items {
                if !names.insert(item.name.as_str()) {
                    bail!("duplicate item '{}' in category '{}'", item.name, category.id);
                }
                if item.channels.is_empty() {
                    bail!("item '{}' in category '{}' supports no channel", item.name, category.id);
                }
                if item.required && !item.channels.contains(Channel::Email) {
                    bail!(
                        "required item '{}' in category '{}' must support email",
                        item.name,
                        category.id
                    );
                }
                if item.is_global_policy_setting() != category.is_global() {
                    bail!(
                        "item '{}' in category '{}': policy settings belong only to the global settings area",
                        item.name,
                        category.id
                    );
                }
            }
        }

        if !has_global {
            bail!("catalog has no global settings category");
        }
        Ok(())
    }

    /// The built-in catalog for Global settings, Talent, Time off and Travel
    pub fn builtin() -> Self {
        use ApplicationArea::*;

        Self {
            categories: vec![
                CategoryDef::new(
                    global::CATEGORY_ID,
                    GlobalSettings,
                    "Global settings",
                    "Set how you'd like to receive Rippling notifications. These preferences will determine which notification options appear on each application page.",
                    vec![
                        ItemDef::policy_setting(Channel::Email, labels::EMAIL_DESCRIPTION),
                        ItemDef::policy_setting(Channel::InProduct, labels::IN_PRODUCT_DESCRIPTION),
                    ],
                ),
                CategoryDef::new(
                    "one-on-ones",
                    Talent,
                    "1:1s",
                    "Structured one-on-one meetings between managers and employees, providing tools to schedule, track, and document discussions to enhance communication and employee development",
                    vec![
                        ItemDef::new("1:1 meeting invites"),
                        ItemDef::new("1:1 meeting updates"),
                        ItemDef::required("Announce 1:1s to everyone"),
                    ],
                ),
                CategoryDef::new(
                    "goals",
                    Talent,
                    "Goals",
                    "Set, track, and manage employee objectives and key results (OKRs), facilitating alignment across teams",
                    vec![
                        ItemDef::new("Goal assignment"),
                        ItemDef::new("Goal progress"),
                        ItemDef::new("Goal update reminder"),
                        ItemDef::new("Goals admin"),
                    ],
                ),
                CategoryDef::new(
                    "review-cycles",
                    Talent,
                    "Review cycles",
                    "Customize, schedule, and manage comprehensive feedback cycles to improve the employee performance review process",
                    vec![
                        ItemDef::new("Review cycles access"),
                        ItemDef::new("Review cycles tasks"),
                        ItemDef::new("Review cycles updates"),
                    ],
                ),
                CategoryDef::new(
                    "time-off",
                    TimeOff,
                    "Time off",
                    "Leave management product to easily request and track time off, while providing managers with tools to approve requests and monitor balances",
                    vec![
                        ItemDef::new("Time off approval required"),
                        ItemDef::new("Time off miscellaneous"),
                        ItemDef::new("Time off rejected"),
                        ItemDef::new("Time off responsibility delegation"),
                    ],
                ),
                CategoryDef::new(
                    "cars",
                    Travel,
                    "Cars",
                    "Get alerted when employees book cars for business travel",
                    vec![ItemDef::new("New car bookings")],
                ),
                CategoryDef::new(
                    "flights",
                    Travel,
                    "Flights",
                    "Monitor your company's flight spend and approve new booking requests",
                    vec![
                        ItemDef::new("Flight approval requests"),
                        ItemDef::new("Flight changes"),
                        ItemDef::new("Flight pre-approval requests"),
                        ItemDef::new("New flight bookings"),
                        ItemDef::new("Pre-approval auto booking notifications"),
                    ],
                ),
                CategoryDef::new(
                    "hotels",
                    Travel,
                    "Hotels",
                    "Get alerted when employees book stays at hotels and other properties for business travel",
                    vec![
                        ItemDef::new("Hotel check-in instructions"),
                        ItemDef::new("New hotel bookings"),
                    ],
                ),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
