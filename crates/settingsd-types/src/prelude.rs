pub use crate::error::{ClResult, Error};
pub use crate::key::Key;
pub use crate::types::SourceId;
pub use crate::value::{SettingStatus, SettingValue};
pub use crate::version_stamp::VersionStamp;

// vim: ts=4
