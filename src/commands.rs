//! Command vocabulary between the presentation layer and the store
//!
//! Commands arrive either as JSON objects (one per line) or as short text
//! lines such as `item goals "Goal progress" --email off`.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::preferences::{Mutation, PreferenceStore};
use crate::types::{ApplicationArea, ChannelPatch, EmailPolicy, InProductPolicy, ItemKey, PolicyChange};

/// Mutations the presentation layer can request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PreferenceCommand {
    /// Switch the page on screen
    SelectArea { area: ApplicationArea },

    /// Change a global policy from the global settings page
    SetGlobalPolicy { change: PolicyChange },

    /// Category card toggle
    SetCategoryEnabled { category_id: String, enabled: bool },

    /// Page master toggle
    SetPageEnabled { enabled: bool },

    /// Channel switches in the item detail view
    SetItemOverride {
        key: ItemKey,
        #[serde(default)]
        patch: ChannelPatch,
    },

    /// Title switch in the item detail view
    SetItemEnabled { key: ItemKey, enabled: bool },
}

impl PreferenceCommand {
    pub fn apply(&self, store: &mut PreferenceStore) -> Mutation {
        match self {
            Self::SelectArea { area } => store.select_area(*area),
            Self::SetGlobalPolicy { change } => store.set_global_policy(*change),
            Self::SetCategoryEnabled { category_id, enabled } => {
                store.set_category_enabled(category_id, *enabled)
            }
            Self::SetPageEnabled { enabled } => store.set_page_enabled(*enabled),
            Self::SetItemOverride { key, patch } => store.set_item_override(key, *patch),
            Self::SetItemEnabled { key, enabled } => store.set_item_enabled(key, *enabled),
        }
    }
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Command(PreferenceCommand),
    Show,
    Detail(ItemKey),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> Self {
        switch == Switch::On
    }
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "command")]
struct Line {
    #[command(subcommand)]
    command: LineCommand,
}

#[derive(Debug, Subcommand)]
enum LineCommand {
    /// Select the application area
    Area { area: ApplicationArea },
    /// Set a global policy
    Policy {
        #[command(subcommand)]
        policy: PolicyArg,
    },
    /// Enable or disable a category
    Category { id: String, state: Switch },
    /// Enable or disable every category on the page
    Page { state: Switch },
    /// Set an item's channels
    Item {
        category: String,
        item: String,
        #[arg(long)]
        email: Option<Switch>,
        #[arg(long)]
        in_product: Option<Switch>,
    },
    /// Turn every allowed channel of an item on or off
    Toggle { category: String, item: String, state: Switch },
    /// Show the detail view of an item
    Detail { category: String, item: String },
    /// Render the current page
    Show,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Subcommand)]
enum PolicyArg {
    Email { value: EmailPolicy },
    InProduct { value: InProductPolicy },
}

impl From<LineCommand> for Request {
    fn from(command: LineCommand) -> Self {
        use PreferenceCommand::*;

        match command {
            LineCommand::Area { area } => Request::Command(SelectArea { area }),
            LineCommand::Policy { policy } => Request::Command(SetGlobalPolicy {
                change: match policy {
                    PolicyArg::Email { value } => PolicyChange::Email(value),
                    PolicyArg::InProduct { value } => PolicyChange::InProduct(value),
                },
            }),
            LineCommand::Category { id, state } => Request::Command(SetCategoryEnabled {
                category_id: id,
                enabled: state.into(),
            }),
            LineCommand::Page { state } => Request::Command(SetPageEnabled { enabled: state.into() }),
            LineCommand::Item { category, item, email, in_product } => Request::Command(SetItemOverride {
                key: ItemKey::new(category, item),
                patch: ChannelPatch {
                    email: email.map(bool::from),
                    in_product: in_product.map(bool::from),
                },
            }),
            LineCommand::Toggle { category, item, state } => Request::Command(SetItemEnabled {
                key: ItemKey::new(category, item),
                enabled: state.into(),
            }),
            LineCommand::Detail { category, item } => Request::Detail(ItemKey::new(category, item)),
            LineCommand::Show => Request::Show,
            LineCommand::Quit => Request::Quit,
        }
    }
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Request>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if line.starts_with('{') {
        let command: PreferenceCommand =
            serde_json::from_str(line).map_err(|e| anyhow!("invalid JSON command: {e}"))?;
        return Ok(Some(Request::Command(command)));
    }

    let words = shell_words::split(line)?;
    let parsed = Line::try_parse_from(words)?;
    Ok(Some(parsed.command.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> PreferenceCommand {
        match parse_line(line).unwrap() {
            Some(Request::Command(command)) => command,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn test_item_names_with_spaces() {
        let expected = PreferenceCommand::SetItemOverride {
            key: ItemKey::new("one-on-ones", "1:1 meeting invites"),
            patch: ChannelPatch::email(false),
        };
        assert_eq!(command(r#"item one-on-ones "1:1 meeting invites" --email off"#), expected);
        assert_eq!(command("item one-on-ones '1:1 meeting invites' --email off"), expected);

        assert_eq!(
            command(r"toggle goals Goal\ progress off"),
            PreferenceCommand::SetItemEnabled {
                key: ItemKey::new("goals", "Goal progress"),
                enabled: false,
            }
        );
        assert_eq!(
            parse_line(r#"detail goals """#).unwrap(),
            Some(Request::Detail(ItemKey::new("goals", "")))
        );
    }

    #[test]
    fn test_unterminated_quote_is_an_error() {
        assert!(parse_line(r#"item goals "Goal progress --email off"#).is_err());
        assert!(parse_line("toggle goals 'Goals admin on").is_err());
    }

    #[test]
    fn test_parse_text_commands() {
        assert_eq!(
            command("area time-off"),
            PreferenceCommand::SelectArea { area: ApplicationArea::TimeOff }
        );
        assert_eq!(
            command("policy email required-only"),
            PreferenceCommand::SetGlobalPolicy { change: PolicyChange::Email(EmailPolicy::RequiredOnly) }
        );
        assert_eq!(
            command("policy in-product never"),
            PreferenceCommand::SetGlobalPolicy {
                change: PolicyChange::InProduct(InProductPolicy::Never)
            }
        );
        assert_eq!(
            command("category goals off"),
            PreferenceCommand::SetCategoryEnabled { category_id: "goals".to_string(), enabled: false }
        );
        assert_eq!(command("page on"), PreferenceCommand::SetPageEnabled { enabled: true });
        assert_eq!(
            command(r#"item goals "Goal progress" --in-product off"#),
            PreferenceCommand::SetItemOverride {
                key: ItemKey::new("goals", "Goal progress"),
                patch: ChannelPatch::in_product(false),
            }
        );
        assert_eq!(
            command(r#"toggle cars "New car bookings" off"#),
            PreferenceCommand::SetItemEnabled {
                key: ItemKey::new("cars", "New car bookings"),
                enabled: false,
            }
        );
    }

    #[test]
    fn test_parse_session_requests() {
        assert_eq!(parse_line("show").unwrap(), Some(Request::Show));
        assert_eq!(parse_line("exit").unwrap(), Some(Request::Quit));
        assert_eq!(
            parse_line(r#"detail goals "Goals admin""#).unwrap(),
            Some(Request::Detail(ItemKey::new("goals", "Goals admin")))
        );
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# comment").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_line("area mars").is_err());
        assert!(parse_line("policy email never").is_err());
        assert!(parse_line("category goals maybe").is_err());
        assert!(parse_line("frobnicate").is_err());
    }

    #[test]
    fn test_parse_json_command() {
        let line = r#"{"command":"set_item_override","key":{"category_id":"goals","item_name":"Goal progress"},"patch":{"email":false}}"#;
        assert_eq!(
            command(line),
            PreferenceCommand::SetItemOverride {
                key: ItemKey::new("goals", "Goal progress"),
                patch: ChannelPatch::email(false),
            }
        );

        let line = r#"{"command":"set_global_policy","change":{"channel":"in-product","value":"never"}}"#;
        assert_eq!(
            command(line),
            PreferenceCommand::SetGlobalPolicy {
                change: PolicyChange::InProduct(InProductPolicy::Never)
            }
        );
        assert!(parse_line(r#"{"command":"launch"}"#).is_err());
    }

    #[test]
    fn test_apply_dispatches_to_store() {
        let mut store = PreferenceStore::builtin();
        let result = command("policy email required-only").apply(&mut store);
        assert!(result.is_applied());

        let result = command(r#"item goals "Goal progress" --email on"#).apply(&mut store);
        assert!(result.is_rejected());

        let result = command("area travel").apply(&mut store);
        assert!(result.is_applied());
        assert_eq!(store.area(), ApplicationArea::Travel);
    }
}
