pub use settingsd_types::error::{ClResult, Error};
pub use settingsd_types::{Key, SettingStatus, SettingValue, SourceId, VersionStamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
