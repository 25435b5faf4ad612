//! Settings document merge engine.
//!
//! [`SettingsDocumentManager`] merges documents from multiple sources into one
//! settings map. Which source may write which keys is itself part of the
//! settings, under the reserved `sources/*` namespace, and starts from a trusted
//! bootstrap document. Revoking a source removes the values it wrote, and the
//! removal follows the chain of sources it had vouched for.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod manager;
pub mod observer;
pub mod prelude;
pub mod service;
pub mod settings_map;
pub mod shared;
pub mod source;
pub mod trust;

pub use config::{BootstrapSource, SettingsdConfig};
pub use manager::{InsertionStatus, ManagerOptions, SettingsDocumentManager};
pub use observer::{ObserverId, SettingsObserver};
pub use service::SettingsService;
pub use settings_map::{SettingEntry, SettingsMap, Writer};
pub use shared::SharedSettings;
pub use source::{
	DocumentQueues, DummySourceDelegate, QueuedSourceDelegate, Source, SourceDelegate,
	SourceDelegateFactory, dummy_delegate_factory,
};

// vim: ts=4
