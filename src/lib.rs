//! Notification preference resolution engine
//!
//! Resolves which delivery channels (email, in-product) are active for every
//! notification setting, given the global policies, per-item overrides and
//! per-category toggles, and keeps category and page toggles consistent with
//! the resolved item state.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod commands;
pub mod config;
pub mod constants;
pub mod preferences;
pub mod render;
pub mod types;
pub mod view;

pub use catalog::{Catalog, CategoryDef, ItemDef};
pub use preferences::{Mutation, PreferenceState, PreferenceStore, Rejection, resolve_channels};
pub use types::{
    ApplicationArea, Channel, ChannelPatch, ChannelSet, EmailPolicy, GlobalPolicy, InProductPolicy,
    ItemKey, Override, PolicyChange,
};
