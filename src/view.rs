//! Rendering boundary: resolved, display-ready views of the store
//!
//! Views are plain serializable data. The presentation layer renders them and
//! calls back into the store's mutation entry points; it never resolves
//! channels itself.

use serde::Serialize;

use crate::catalog::{CategoryDef, ItemDef};
use crate::constants::{labels, policy, tooltips};
use crate::preferences::PreferenceStore;
use crate::types::{ApplicationArea, Channel, EmailPolicy, GlobalPolicy, InProductPolicy, ItemKey};

/// State of a switch control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleView {
    pub checked: bool,
    /// Control is inert; requests from it would be rejected
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<&'static str>,
}

impl ToggleView {
    fn new(checked: bool, locked: bool, tooltip: &'static str) -> Self {
        Self {
            checked,
            locked,
            tooltip: locked.then_some(tooltip),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Select control of a global settings pseudo-item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySelectView {
    pub channel: Channel,
    pub selected: &'static str,
    pub label: &'static str,
    pub options: Vec<PolicyOption>,
}

impl PolicySelectView {
    fn new(channel: Channel, global: &GlobalPolicy) -> Self {
        let send_chosen = PolicyOption { value: "all", label: policy::SEND_CHOSEN };
        let (restricted, is_restricted) = match channel {
            Channel::Email => (
                PolicyOption { value: "required-only", label: policy::REQUIRED_ONLY },
                global.email == EmailPolicy::RequiredOnly,
            ),
            Channel::InProduct => (
                PolicyOption { value: "never", label: policy::NEVER },
                global.in_product == InProductPolicy::Never,
            ),
        };
        let current = if is_restricted { &restricted } else { &send_chosen };

        Self {
            channel,
            selected: current.value,
            label: current.label,
            options: vec![send_chosen.clone(), restricted.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub name: String,
    /// Channel summary, or the channel description for policy items
    pub summary: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicySelectView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub enabled: bool,
    /// Absent for the global settings card
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle: Option<ToggleView>,
    /// Visible items only
    pub items: Vec<ItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub area: ApplicationArea,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_toggle: Option<ToggleView>,
    pub categories: Vec<CategoryView>,
}

/// Build the page for the store's active area
pub fn page_view(store: &PreferenceStore) -> PageView {
    let area = store.area();
    let toggle = store.page_toggle();

    PageView {
        area,
        title: format!("{} notifications", area.display_name()),
        page_toggle: toggle
            .shown
            .then(|| ToggleView::new(toggle.checked, toggle.locked, tooltips::REQUIRED)),
        categories: store
            .active_categories()
            .map(|category| category_view(store, category))
            .collect(),
    }
}

fn category_view(store: &PreferenceStore, category: &CategoryDef) -> CategoryView {
    let state = store.state();
    let enabled = state.effective_enabled(category);
    let toggle = (!category.is_global())
        .then(|| ToggleView::new(enabled, category.has_required(), tooltips::REQUIRED));

    CategoryView {
        id: category.id.clone(),
        title: category.title.clone(),
        description: category.description.clone(),
        enabled,
        toggle,
        items: store
            .visible_items(category)
            .into_iter()
            .map(|item| item_view(store, category, item))
            .collect(),
    }
}

fn item_view(store: &PreferenceStore, category: &CategoryDef, item: &ItemDef) -> ItemView {
    let state = store.state();
    match item.policy {
        Some(channel) => ItemView {
            name: item.name.clone(),
            summary: item.description.clone(),
            required: item.required,
            policy: Some(PolicySelectView::new(channel, &state.policy)),
        },
        None => ItemView {
            name: item.name.clone(),
            summary: state.resolve(category, item).to_string(),
            required: item.required,
            policy: None,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSwitchView {
    pub channel: Channel,
    pub label: &'static str,
    pub description: &'static str,
    pub toggle: ToggleView,
}

/// Detail view of one item: title switch plus one switch per channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDetailView {
    pub key: ItemKey,
    pub required: bool,
    pub title: ToggleView,
    pub email: ChannelSwitchView,
    pub in_product: ChannelSwitchView,
}

/// `None` for unknown items and for the global policy pseudo-items
pub fn item_detail(store: &PreferenceStore, key: &ItemKey) -> Option<ItemDetailView> {
    let (_, item) = store.catalog().lookup(key)?;
    if item.is_global_policy_setting() {
        return None;
    }

    let global = store.state().policy;
    let required = item.required;
    let defaults = global.default_override(required);
    let current = store.override_for(key).copied().unwrap_or(defaults);

    let email_policy_locked = global.suppresses_email(required);
    let in_product_locked = global.suppresses_in_product();

    let email_toggle = ToggleView {
        checked: current.email,
        locked: required || email_policy_locked,
        tooltip: email_policy_locked.then_some(tooltips::ADJUST_GLOBAL),
    };
    let in_product_toggle = ToggleView::new(current.in_product, in_product_locked, tooltips::ADJUST_GLOBAL);
    let title = ToggleView {
        checked: current.email || current.in_product || required,
        locked: required || (email_policy_locked && in_product_locked),
        tooltip: required.then_some(tooltips::REQUIRED),
    };

    Some(ItemDetailView {
        key: key.clone(),
        required,
        title,
        email: ChannelSwitchView {
            channel: Channel::Email,
            label: labels::EMAIL,
            description: labels::EMAIL_DESCRIPTION,
            toggle: email_toggle,
        },
        in_product: ChannelSwitchView {
            channel: Channel::InProduct,
            label: labels::IN_PRODUCT,
            description: labels::IN_PRODUCT_DESCRIPTION,
            toggle: in_product_toggle,
        },
    })
}
