//! Setting values and trust status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ClResult, Error};

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)] // No type tag - type inferred from the JSON shape
pub enum SettingValue {
	Bool(bool), // Must be before Int to avoid bool -> int coercion
	Int(i64),
	String(String),
	Json(serde_json::Value),
}

impl SettingValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			SettingValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			SettingValue::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			SettingValue::Bool(b) => Some(*b),
			_ => None,
		}
	}
}

impl From<&str> for SettingValue {
	fn from(s: &str) -> Self {
		SettingValue::String(s.to_string())
	}
}

impl From<String> for SettingValue {
	fn from(s: String) -> Self {
		SettingValue::String(s)
	}
}

impl From<i64> for SettingValue {
	fn from(i: i64) -> Self {
		SettingValue::Int(i)
	}
}

impl From<i32> for SettingValue {
	fn from(i: i32) -> Self {
		SettingValue::Int(i64::from(i))
	}
}

impl From<bool> for SettingValue {
	fn from(b: bool) -> Self {
		SettingValue::Bool(b)
	}
}

impl From<SettingStatus> for SettingValue {
	fn from(status: SettingStatus) -> Self {
		SettingValue::String(status.as_str().to_string())
	}
}

/// Trust status of a source, or of a source's access to a key subtree
///
/// Variants are ordered by restrictiveness, so `max` combines a source
/// status with an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SettingStatus {
	/// Writes are permitted
	#[serde(rename = "active")]
	Active,
	/// No further writes, existing values are kept
	#[serde(rename = "withdrawn")]
	Withdrawn,
	/// No further writes, existing values are removed
	#[serde(rename = "invalid")]
	Invalid,
}

impl SettingStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			SettingStatus::Active => "active",
			SettingStatus::Withdrawn => "withdrawn",
			SettingStatus::Invalid => "invalid",
		}
	}

	/// Interpret a stored setting value; anything but a known status string is `None`
	pub fn from_value(value: &SettingValue) -> Option<Self> {
		value.as_str().and_then(|s| s.parse().ok())
	}

	/// The more restrictive of two statuses
	pub fn combine(self, other: SettingStatus) -> SettingStatus {
		self.max(other)
	}
}

impl fmt::Display for SettingStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SettingStatus {
	type Err = Error;

	fn from_str(s: &str) -> ClResult<Self> {
		match s {
			"active" => Ok(SettingStatus::Active),
			"withdrawn" => Ok(SettingStatus::Withdrawn),
			"invalid" => Ok(SettingStatus::Invalid),
			_ => Err(Error::Parse(format!("Unknown setting status '{}'", s))),
		}
	}
}


// vim: ts=4
