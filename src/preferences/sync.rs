//! Override synchronizer: pushes strict global policies into per-item overrides
//!
//! Runs over the whole catalog, not just the area on screen. Relaxing a policy
//! never clears what a strict policy wrote; the user has to re-enable the
//! channel on the item itself.

use tracing::debug;

use crate::catalog::Catalog;
use crate::types::{EmailPolicy, InProductPolicy, Override};

use super::state::PreferenceState;

/// Conform every override to the current strict policies.
/// Returns how many overrides were created or modified.
pub fn synchronize(catalog: &Catalog, state: &mut PreferenceState) -> usize {
    let mut touched = 0;

    if state.policy.in_product == InProductPolicy::Never {
        touched += conform(catalog, state, |o, _| o.in_product = false);
    }

    if state.policy.email == EmailPolicy::RequiredOnly {
        touched += conform(catalog, state, |o, required| {
            if !required {
                o.email = false;
            }
        });
    }

    if touched > 0 {
        debug!(touched, policy = ?state.policy, "Synchronized overrides with global policy");
    }
    touched
}

/// Apply `rule` to the override of every notification item, creating missing
/// overrides from the policy defaults first
fn conform<F>(catalog: &Catalog, state: &mut PreferenceState, rule: F) -> usize
where
    F: Fn(&mut Override, bool),
{
    let mut touched = 0;
    let policy = state.policy;

    for category in catalog.notification_categories() {
        for item in &category.items {
            let key = category.key(item);
            let before = state.overrides.get(&key).copied();
            let entry = state
                .overrides
                .entry(key)
                .or_insert_with(|| policy.default_override(item.required));
            rule(entry, item.required);
            if before != Some(*entry) {
                touched += 1;
            }
        }
    }
    touched
}
