//! Mutable preference data: global policy, category intent and per-item overrides

use std::collections::HashMap;

use crate::catalog::{Catalog, CategoryDef, ItemDef};
use crate::types::{ChannelSet, GlobalPolicy, ItemKey, Override};

use super::resolver::resolve_channels;

/// Everything the user can change, passed explicitly to the resolver,
/// reconciler and synchronizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceState {
    pub policy: GlobalPolicy,
    /// Last explicit toggle per category id, adjusted by the reconciler.
    /// Categories with a required item are enabled regardless of this value.
    pub category_intent: HashMap<String, bool>,
    pub overrides: HashMap<ItemKey, Override>,
}

impl PreferenceState {
    /// Fresh state with every notification category enabled and no overrides
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self {
            policy: GlobalPolicy::default(),
            category_intent: catalog
                .notification_categories()
                .map(|c| (c.id.clone(), true))
                .collect(),
            overrides: HashMap::new(),
        }
    }

    /// Missing entries count as enabled
    pub fn user_intent_enabled(&self, category_id: &str) -> bool {
        self.category_intent.get(category_id).copied().unwrap_or(true)
    }

    pub fn effective_enabled(&self, category: &CategoryDef) -> bool {
        category.is_global() || self.user_intent_enabled(&category.id) || category.has_required()
    }

    pub fn override_for(&self, category: &CategoryDef, item: &ItemDef) -> Option<&Override> {
        self.overrides.get(&category.key(item))
    }

    pub fn resolve(&self, category: &CategoryDef, item: &ItemDef) -> ChannelSet {
        resolve_channels(
            item,
            self.effective_enabled(category),
            &self.policy,
            self.override_for(category, item),
        )
    }

    /// Items shown for a category: all of them while enabled, otherwise only required ones
    pub fn visible_items<'a>(&self, category: &'a CategoryDef) -> Vec<&'a ItemDef> {
        let enabled = self.effective_enabled(category);
        category
            .items
            .iter()
            .filter(|item| enabled || item.required)
            .collect()
    }
}
