//! Channel resolution: which channels an item actually delivers on

use crate::catalog::ItemDef;
use crate::types::{Channel, ChannelSet, GlobalPolicy, Override};

/// Effective channels for one item.
///
/// An override wins over the global policy unconditionally. Without one, email
/// is dropped for non-required items under `RequiredOnly` and in-product is
/// dropped under `Never`. A required item in a disabled category still gets
/// its email but never an in-product alert.
pub fn resolve_channels(
    item: &ItemDef,
    category_enabled: bool,
    policy: &GlobalPolicy,
    item_override: Option<&Override>,
) -> ChannelSet {
    let mut channels = item.channels;

    match item_override {
        Some(o) => {
            for channel in Channel::ALL {
                if !o.get(channel) {
                    channels.remove(channel);
                }
            }
        }
        None => {
            if policy.suppresses_email(item.required) {
                channels.remove(Channel::Email);
            }
            if policy.suppresses_in_product() {
                channels.remove(Channel::InProduct);
            }
        }
    }

    if !category_enabled && item.required {
        channels.remove(Channel::InProduct);
    }

    channels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmailPolicy, InProductPolicy};
    use proptest::prelude::*;

    fn policy(email: EmailPolicy, in_product: InProductPolicy) -> GlobalPolicy {
        GlobalPolicy { email, in_product }
    }

    #[test]
    fn test_default_policy_keeps_all_channels() {
        let item = ItemDef::new("1:1 meeting invites");
        let channels = resolve_channels(&item, true, &GlobalPolicy::default(), None);
        assert_eq!(channels.to_string(), "Email, In-product notifications");
    }

    #[test]
    fn test_required_only_drops_email_for_optional_items() {
        let p = policy(EmailPolicy::RequiredOnly, InProductPolicy::All);

        let optional = ItemDef::new("Goal assignment");
        assert_eq!(
            resolve_channels(&optional, true, &p, None).to_string(),
            "In-product notifications"
        );

        let required = ItemDef::required("Announce 1:1s to everyone");
        assert_eq!(
            resolve_channels(&required, true, &p, None).to_string(),
            "Email, In-product notifications"
        );
    }

    #[test]
    fn test_never_drops_in_product() {
        let p = policy(EmailPolicy::All, InProductPolicy::Never);
        let item = ItemDef::new("Flight changes");
        assert_eq!(resolve_channels(&item, true, &p, None).to_string(), "Email");
    }

    #[test]
    fn test_both_strict_policies_turn_optional_item_off() {
        let p = policy(EmailPolicy::RequiredOnly, InProductPolicy::Never);
        let item = ItemDef::new("Goals admin");
        assert_eq!(resolve_channels(&item, true, &p, None).to_string(), "Off");
    }

    #[test]
    fn test_override_takes_precedence_over_policy() {
        let p = policy(EmailPolicy::RequiredOnly, InProductPolicy::All);
        let item = ItemDef::new("Goal progress");
        let o = Override { email: true, in_product: false };
        assert_eq!(resolve_channels(&item, true, &p, Some(&o)).to_string(), "Email");
    }

    #[test]
    fn test_override_cannot_add_unsupported_channel() {
        let mut item = ItemDef::new("Email only");
        item.channels = ChannelSet::only(Channel::Email);
        let o = Override { email: true, in_product: true };
        let channels = resolve_channels(&item, true, &GlobalPolicy::default(), Some(&o));
        assert_eq!(channels, ChannelSet::only(Channel::Email));
    }

    #[test]
    fn test_disabled_category_clamps_required_item_to_email() {
        let item = ItemDef::required("Announce 1:1s to everyone");
        let channels = resolve_channels(&item, false, &GlobalPolicy::default(), None);
        assert_eq!(channels.to_string(), "Email");

        let o = Override { email: true, in_product: true };
        let channels = resolve_channels(&item, false, &GlobalPolicy::default(), Some(&o));
        assert_eq!(channels.to_string(), "Email");
    }

    #[test]
    fn test_disabled_category_does_not_clamp_optional_item() {
        let item = ItemDef::new("Goal progress");
        let channels = resolve_channels(&item, false, &GlobalPolicy::default(), None);
        assert_eq!(channels, ChannelSet::BOTH);
    }

    fn any_policy() -> impl Strategy<Value = GlobalPolicy> {
        (any::<bool>(), any::<bool>()).prop_map(|(required_only, never)| GlobalPolicy {
            email: if required_only { EmailPolicy::RequiredOnly } else { EmailPolicy::All },
            in_product: if never { InProductPolicy::Never } else { InProductPolicy::All },
        })
    }

    fn any_override() -> impl Strategy<Value = Option<Override>> {
        proptest::option::of(
            (any::<bool>(), any::<bool>()).prop_map(|(email, in_product)| Override { email, in_product }),
        )
    }

    proptest! {
        #[test]
        fn property_resolution_is_deterministic(
            required in any::<bool>(),
            enabled in any::<bool>(),
            p in any_policy(),
            o in any_override(),
        ) {
            let mut item = ItemDef::new("Item");
            item.required = required;
            let first = resolve_channels(&item, enabled, &p, o.as_ref());
            let second = resolve_channels(&item, enabled, &p, o.as_ref());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn property_required_email_survives_policy_without_override(
            enabled in any::<bool>(),
            p in any_policy(),
        ) {
            let item = ItemDef::required("Item");
            let channels = resolve_channels(&item, enabled, &p, None);
            prop_assert!(channels.contains(Channel::Email));
        }

        #[test]
        fn property_never_without_override_has_no_in_product(
            required in any::<bool>(),
            enabled in any::<bool>(),
            required_only in any::<bool>(),
        ) {
            let mut item = ItemDef::new("Item");
            item.required = required;
            let p = GlobalPolicy {
                email: if required_only { EmailPolicy::RequiredOnly } else { EmailPolicy::All },
                in_product: InProductPolicy::Never,
            };
            prop_assert!(!resolve_channels(&item, enabled, &p, None).contains(Channel::InProduct));
        }
    }
}
