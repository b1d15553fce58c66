//! Consistency reconciler: keeps category toggles in line with item channels
//!
//! One pass per change batch. Each category's decision depends only on its own
//! items, so the plan is computed against the pre-change state and applied at once.

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, CategoryDef};
use crate::types::ApplicationArea;

use super::state::PreferenceState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustReason {
    /// Category holds a required item but its intent flag was off
    RequiredItem,
    /// Every visible item resolved to "Off"
    AllOff,
    /// A visible item regained a channel. Unreachable with the current
    /// visibility rule: a disabled category without required items shows nothing.
    ChannelsRestored,
}

/// Automatic change to a category's intent flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    pub category_id: String,
    pub enabled: bool,
    pub reason: AdjustReason,
}

fn plan_category(category: &CategoryDef, state: &PreferenceState) -> Option<AdjustReason> {
    if category.has_required() {
        return (!state.user_intent_enabled(&category.id)).then_some(AdjustReason::RequiredItem);
    }

    let enabled = state.effective_enabled(category);
    let visible = state.visible_items(category);
    let mut resolved = visible.iter().map(|item| state.resolve(category, item));

    if enabled {
        let all_off = !visible.is_empty() && resolved.all(|channels| channels.is_empty());
        all_off.then_some(AdjustReason::AllOff)
    } else {
        // `visible` is empty here, so this never fires
        let any_on = resolved.any(|channels| !channels.is_empty());
        any_on.then_some(AdjustReason::ChannelsRestored)
    }
}

/// Compute the adjustments for every notification category in the catalog
pub fn plan(catalog: &Catalog, state: &PreferenceState) -> Vec<Adjustment> {
    catalog
        .notification_categories()
        .filter_map(|category| {
            plan_category(category, state).map(|reason| Adjustment {
                category_id: category.id.clone(),
                enabled: reason != AdjustReason::AllOff,
                reason,
            })
        })
        .collect()
}

pub fn apply(state: &mut PreferenceState, adjustments: &[Adjustment]) {
    for adjustment in adjustments {
        debug!(
            category = %adjustment.category_id,
            enabled = adjustment.enabled,
            reason = ?adjustment.reason,
            "Reconciled category"
        );
        state
            .category_intent
            .insert(adjustment.category_id.clone(), adjustment.enabled);
    }
}

/// Plan and apply in one step; returns what changed
pub fn reconcile(catalog: &Catalog, state: &mut PreferenceState) -> Vec<Adjustment> {
    let adjustments = plan(catalog, state);
    apply(state, &adjustments);
    adjustments
}

/// Derived state of an area's master toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageToggle {
    /// Only pages with more than one notification category show the toggle
    pub shown: bool,
    pub checked: bool,
    /// A required item anywhere on the page makes the toggle inert
    pub locked: bool,
}

pub fn page_toggle(catalog: &Catalog, state: &PreferenceState, area: ApplicationArea) -> PageToggle {
    let categories: Vec<&CategoryDef> = catalog.categories(area).collect();
    let shown = area != ApplicationArea::GlobalSettings && categories.len() > 1;
    let has_required = categories.iter().any(|c| c.has_required());
    let any_enabled = categories.iter().any(|c| state.effective_enabled(c));

    PageToggle {
        shown,
        checked: shown && (any_enabled || has_required),
        locked: has_required,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemDef;
    use crate::types::{EmailPolicy, InProductPolicy, ItemKey, Override};

    fn strict(state: &mut PreferenceState) {
        state.policy.email = EmailPolicy::RequiredOnly;
        state.policy.in_product = InProductPolicy::Never;
    }

    #[test]
    fn test_default_state_needs_no_adjustment() {
        let catalog = Catalog::builtin();
        let state = PreferenceState::for_catalog(&catalog);
        assert!(plan(&catalog, &state).is_empty());
    }

    #[test]
    fn test_all_off_disables_category_without_required_items() {
        let catalog = Catalog::builtin();
        let mut state = PreferenceState::for_catalog(&catalog);
        strict(&mut state);

        let adjustments = reconcile(&catalog, &mut state);
        let disabled: Vec<&str> = adjustments.iter().map(|a| a.category_id.as_str()).collect();
        assert_eq!(
            disabled,
            vec!["goals", "review-cycles", "time-off", "cars", "flights", "hotels"]
        );
        assert!(adjustments.iter().all(|a| !a.enabled && a.reason == AdjustReason::AllOff));

        // required "Announce 1:1s to everyone" keeps email, category stays on
        let one_on_ones = catalog.category("one-on-ones").unwrap();
        assert!(state.effective_enabled(one_on_ones));
    }

    #[test]
    fn test_reconcile_is_single_pass_and_settles() {
        let catalog = Catalog::builtin();
        let mut state = PreferenceState::for_catalog(&catalog);
        strict(&mut state);

        reconcile(&catalog, &mut state);
        assert!(plan(&catalog, &state).is_empty());
    }

    #[test]
    fn test_partial_off_leaves_category_enabled() {
        let catalog = Catalog::builtin();
        let mut state = PreferenceState::for_catalog(&catalog);
        state.overrides.insert(
            ItemKey::new("cars", "New car bookings"),
            Override { email: false, in_product: false },
        );
        state.overrides.insert(
            ItemKey::new("hotels", "New hotel bookings"),
            Override { email: false, in_product: false },
        );

        let adjustments = reconcile(&catalog, &mut state);
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].category_id, "cars");
        assert!(state.user_intent_enabled("hotels"));
    }

    #[test]
    fn test_manually_disabled_category_stays_disabled() {
        let catalog = Catalog::builtin();
        let mut state = PreferenceState::for_catalog(&catalog);
        state.category_intent.insert("goals".to_string(), false);

        // no visible items, so nothing can restore it
        assert!(plan(&catalog, &state).is_empty());
    }

    #[test]
    fn test_required_category_intent_is_forced_back_on() {
        let catalog = Catalog::builtin();
        let mut state = PreferenceState::for_catalog(&catalog);
        state.category_intent.insert("one-on-ones".to_string(), false);

        let adjustments = reconcile(&catalog, &mut state);
        assert_eq!(
            adjustments,
            vec![Adjustment {
                category_id: "one-on-ones".to_string(),
                enabled: true,
                reason: AdjustReason::RequiredItem,
            }]
        );
        assert!(state.user_intent_enabled("one-on-ones"));
    }

    #[test]
    fn test_page_toggle_follows_any_enabled_category() {
        let catalog = Catalog::builtin();
        let mut state = PreferenceState::for_catalog(&catalog);

        let toggle = page_toggle(&catalog, &state, ApplicationArea::Travel);
        assert_eq!(toggle, PageToggle { shown: true, checked: true, locked: false });

        for id in ["cars", "flights", "hotels"] {
            state.category_intent.insert(id.to_string(), false);
        }
        assert!(!page_toggle(&catalog, &state, ApplicationArea::Travel).checked);

        state.category_intent.insert("flights".to_string(), true);
        assert!(page_toggle(&catalog, &state, ApplicationArea::Travel).checked);
    }

    #[test]
    fn test_page_toggle_locked_by_required_item() {
        let catalog = Catalog::builtin();
        let state = PreferenceState::for_catalog(&catalog);
        let toggle = page_toggle(&catalog, &state, ApplicationArea::Talent);
        assert!(toggle.shown && toggle.checked && toggle.locked);
    }

    #[test]
    fn test_page_toggle_hidden_for_single_category_pages() {
        let catalog = Catalog::builtin();
        let state = PreferenceState::for_catalog(&catalog);
        assert!(!page_toggle(&catalog, &state, ApplicationArea::TimeOff).shown);
        assert!(!page_toggle(&catalog, &state, ApplicationArea::GlobalSettings).shown);
    }

    #[test]
    fn test_talent_without_required_items_turns_master_off() {
        let mut catalog = Catalog::builtin();
        let one_on_ones = catalog
            .categories
            .iter_mut()
            .find(|c| c.id == "one-on-ones")
            .unwrap();
        one_on_ones.items[2] = ItemDef::new("Announce 1:1s to everyone");

        let mut state = PreferenceState::for_catalog(&catalog);
        for id in ["one-on-ones", "goals", "review-cycles"] {
            state.category_intent.insert(id.to_string(), false);
        }
        let toggle = page_toggle(&catalog, &state, ApplicationArea::Talent);
        assert!(toggle.shown && !toggle.checked && !toggle.locked);

        state.category_intent.insert("goals".to_string(), true);
        assert!(page_toggle(&catalog, &state, ApplicationArea::Talent).checked);
    }
}
