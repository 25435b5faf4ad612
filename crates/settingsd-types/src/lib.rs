//! Shared value types for settingsd.
//!
//! This crate holds the vocabulary every other settingsd crate and every
//! document source speaks: hierarchical [`Key`](key::Key)s, vector
//! [`VersionStamp`](version_stamp::VersionStamp)s, typed
//! [`SettingValue`](value::SettingValue)s, the
//! [`SettingsDocument`](document::SettingsDocument) interface, and the
//! reserved trust-configuration key layout.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod document;
pub mod error;
pub mod key;
pub mod keys;
pub mod prelude;
pub mod types;
pub mod value;
pub mod version_stamp;

pub use document::{MemorySettingsDocument, SettingsDocument};
pub use error::{ClResult, Error};
pub use key::Key;
pub use types::SourceId;
pub use value::{SettingStatus, SettingValue};
pub use version_stamp::VersionStamp;

// vim: ts=4
