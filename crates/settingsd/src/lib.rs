//! settingsd merges settings documents from multiple sources into one
//! consistent view.
//!
//! # Features
//!
//! - Hierarchical keys with subtree deletion
//! - Trust graph stored in the settings themselves (`sources/*`)
//!     - per-source status: active, withdrawn, invalid
//!     - per-subtree access rules, most specific rule wins
//!     - revocation cascades through every source a revoked source vouched for
//! - Vector-clock version stamps
//!     - replayed or reordered documents are refused
//!     - concurrent conflicting writes are detected, not silently merged
//! - Exact change notifications, one per accepted document
//!
//! ```no_run
//! use settingsd::SettingsdBuilder;
//!
//! let settings = SettingsdBuilder::from_env()?.init_logging(true).build()?;
//! let value = settings.get_value(&settingsd::Key::new("network/proxy"));
//! # Ok::<(), settingsd::Error>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod logging;
pub mod prelude;

pub use settingsd_types::error;
pub use settingsd_types::key;
pub use settingsd_types::keys;
pub use settingsd_types::version_stamp;

pub use settingsd_core::config;
pub use settingsd_core::manager;
pub use settingsd_core::observer;
pub use settingsd_core::source;
pub use settingsd_core::trust;

pub use builder::SettingsdBuilder;
pub use logging::init_logging;
pub use settingsd_core::{
	DocumentQueues, InsertionStatus, ObserverId, SettingsDocumentManager, SettingsObserver,
	SettingsService, SettingsdConfig, SharedSettings,
};
pub use settingsd_types::{
	ClResult, Error, Key, MemorySettingsDocument, SettingStatus, SettingValue, SettingsDocument,
	SourceId, VersionStamp,
};

// vim: ts=4
