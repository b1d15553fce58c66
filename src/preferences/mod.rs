//! Preference store and its mutation entry points
//!
//! The store owns the catalog, the active area and the mutable
//! [`PreferenceState`]. Every mutation runs to completion synchronously:
//! policy changes go through the synchronizer, then the reconciler, before the
//! call returns. Disallowed requests are rejected as no-ops.

pub mod reconcile;
pub mod resolver;
pub mod state;
pub mod sync;

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{Catalog, CategoryDef, ItemDef};
use crate::types::{
    ApplicationArea, Channel, ChannelPatch, ChannelSet, ItemKey, Override, PolicyChange,
};

pub use reconcile::{AdjustReason, Adjustment, PageToggle};
pub use resolver::resolve_channels;
pub use state::PreferenceState;

/// Why a mutation request was ignored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("unknown item '{0}'")]
    UnknownItem(ItemKey),
    #[error("'{0}' is a global policy setting; change the policy instead")]
    PolicyItem(ItemKey),
    #[error("global settings has no enable toggle")]
    GlobalCategory,
    #[error("'{0}' is required and cannot be turned off")]
    RequiredItem(ItemKey),
    #[error("{channel} for '{key}' is locked by global settings")]
    ChannelLocked { key: ItemKey, channel: Channel },
    #[error("every channel of '{0}' is locked by global settings")]
    AllChannelsLocked(ItemKey),
    #[error("category '{0}' contains required notifications")]
    CategoryLocked(String),
    #[error("{0} has no page toggle")]
    NoPageToggle(ApplicationArea),
    #[error("{0} page toggle is locked by required notifications")]
    PageLocked(ApplicationArea),
}

/// Outcome of a mutation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Applied,
    /// Allowed, but the store already held the requested value
    Unchanged,
    Rejected(Rejection),
}

impl Mutation {
    pub fn is_applied(&self) -> bool {
        matches!(self, Mutation::Applied)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Mutation::Rejected(_))
    }
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    catalog: Catalog,
    area: ApplicationArea,
    state: PreferenceState,
}

impl PreferenceStore {
    pub fn new(catalog: Catalog) -> Self {
        let state = PreferenceState::for_catalog(&catalog);
        Self {
            catalog,
            area: ApplicationArea::Talent,
            state,
        }
    }

    /// Store over the built-in catalog, showing the Talent page
    pub fn builtin() -> Self {
        Self::new(Catalog::builtin())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn area(&self) -> ApplicationArea {
        self.area
    }

    pub fn state(&self) -> &PreferenceState {
        &self.state
    }

    pub fn override_for(&self, key: &ItemKey) -> Option<&Override> {
        self.state.overrides.get(key)
    }

    /// Effective enabled flag; `None` for an unknown category
    pub fn is_category_enabled(&self, category_id: &str) -> Option<bool> {
        self.catalog
            .category(category_id)
            .map(|c| self.state.effective_enabled(c))
    }

    /// Effective channels of an item; `None` for an unknown item
    pub fn channels(&self, key: &ItemKey) -> Option<ChannelSet> {
        self.catalog
            .lookup(key)
            .map(|(category, item)| self.state.resolve(category, item))
    }

    pub fn page_toggle(&self) -> PageToggle {
        reconcile::page_toggle(&self.catalog, &self.state, self.area)
    }

    /// Switch the page on screen
    pub fn select_area(&mut self, area: ApplicationArea) -> Mutation {
        if self.area == area {
            return Mutation::Unchanged;
        }
        info!(from = %self.area, to = %area, "Selected application area");
        self.area = area;
        self.settle();
        Mutation::Applied
    }

    /// Change one of the two global policies
    pub fn set_global_policy(&mut self, change: PolicyChange) -> Mutation {
        let policy = &mut self.state.policy;
        let changed = match change {
            PolicyChange::Email(value) => std::mem::replace(&mut policy.email, value) != value,
            PolicyChange::InProduct(value) => {
                std::mem::replace(&mut policy.in_product, value) != value
            }
        };
        if !changed {
            return Mutation::Unchanged;
        }

        info!(change = ?change, "Global policy changed");
        self.settle();
        Mutation::Applied
    }

    /// Flip a category's toggle. Does not reconcile.
    pub fn set_category_enabled(&mut self, category_id: &str, enabled: bool) -> Mutation {
        let Some(category) = self.catalog.category(category_id) else {
            return reject(Rejection::UnknownCategory(category_id.to_string()));
        };
        if category.is_global() {
            return reject(Rejection::GlobalCategory);
        }
        if category.has_required() {
            return reject(Rejection::CategoryLocked(category_id.to_string()));
        }
        if self.state.user_intent_enabled(category_id) == enabled {
            return Mutation::Unchanged;
        }

        self.state
            .category_intent
            .insert(category_id.to_string(), enabled);
        info!(category = %category_id, enabled, "Category toggled");
        Mutation::Applied
    }

    /// Master toggle: writes `enabled` to every category on the active page
    pub fn set_page_enabled(&mut self, enabled: bool) -> Mutation {
        let toggle = self.page_toggle();
        if !toggle.shown {
            return reject(Rejection::NoPageToggle(self.area));
        }
        if toggle.locked {
            return reject(Rejection::PageLocked(self.area));
        }

        let mut changed = false;
        for category in self.catalog.categories(self.area) {
            if self.state.user_intent_enabled(&category.id) != enabled {
                self.state.category_intent.insert(category.id.clone(), enabled);
                changed = true;
            }
        }
        if !changed {
            return Mutation::Unchanged;
        }
        info!(area = %self.area, enabled, "Page toggled");
        Mutation::Applied
    }

    /// Set one or both channels of an item's override, creating it if needed
    pub fn set_item_override(&mut self, key: &ItemKey, patch: ChannelPatch) -> Mutation {
        let required = match self.item_required(key) {
            Ok(required) => required,
            Err(rejection) => return reject(rejection),
        };
        if patch.is_empty() {
            return Mutation::Unchanged;
        }

        let policy = self.state.policy;
        if patch.email == Some(false) && required {
            return reject(Rejection::RequiredItem(key.clone()));
        }
        if patch.email.is_some() && policy.suppresses_email(required) {
            return reject(Rejection::ChannelLocked { key: key.clone(), channel: Channel::Email });
        }
        if patch.in_product.is_some() && policy.suppresses_in_product() {
            return reject(Rejection::ChannelLocked {
                key: key.clone(),
                channel: Channel::InProduct,
            });
        }

        let current = self.state.overrides.get(key).copied();
        let next = patch.apply_to(current.unwrap_or_else(|| policy.default_override(required)));
        self.write_override(key, current, next)
    }

    /// Item title switch: turns every channel the policy allows on or off at once
    pub fn set_item_enabled(&mut self, key: &ItemKey, enabled: bool) -> Mutation {
        let required = match self.item_required(key) {
            Ok(required) => required,
            Err(rejection) => return reject(rejection),
        };
        if required {
            return reject(Rejection::RequiredItem(key.clone()));
        }

        let policy = self.state.policy;
        if policy.suppresses_email(required) && policy.suppresses_in_product() {
            return reject(Rejection::AllChannelsLocked(key.clone()));
        }

        let current = self.state.overrides.get(key).copied();
        let next = Override {
            email: enabled && !policy.suppresses_email(required),
            in_product: enabled && !policy.suppresses_in_product(),
        };
        self.write_override(key, current, next)
    }

    fn write_override(&mut self, key: &ItemKey, current: Option<Override>, next: Override) -> Mutation {
        if current == Some(next) {
            return Mutation::Unchanged;
        }
        self.state.overrides.insert(key.clone(), next);
        info!(item = %key, email = next.email, in_product = next.in_product, "Item override set");
        self.reconcile();
        Mutation::Applied
    }

    /// Whether the item is required, or why it cannot take an override
    fn item_required(&self, key: &ItemKey) -> Result<bool, Rejection> {
        let category = self
            .catalog
            .category(&key.category_id)
            .ok_or_else(|| Rejection::UnknownCategory(key.category_id.clone()))?;
        let item = category
            .item(&key.item_name)
            .ok_or_else(|| Rejection::UnknownItem(key.clone()))?;
        if item.is_global_policy_setting() {
            return Err(Rejection::PolicyItem(key.clone()));
        }
        Ok(item.required)
    }

    /// Synchronize overrides with the policy, then reconcile categories
    fn settle(&mut self) {
        sync::synchronize(&self.catalog, &mut self.state);
        self.reconcile();
    }

    fn reconcile(&mut self) {
        let adjustments = reconcile::reconcile(&self.catalog, &mut self.state);
        if !adjustments.is_empty() {
            info!(count = adjustments.len(), "Reconciled category toggles");
        }
    }

    /// Categories of the active area
    pub fn active_categories(&self) -> impl Iterator<Item = &CategoryDef> {
        self.catalog.categories(self.area)
    }

    /// Visible items of a category on the active page
    pub fn visible_items<'a>(&self, category: &'a CategoryDef) -> Vec<&'a ItemDef> {
        self.state.visible_items(category)
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::builtin()
    }
}

fn reject(rejection: Rejection) -> Mutation {
    warn!(reason = %rejection, "Ignored preference change");
    Mutation::Rejected(rejection)
}
