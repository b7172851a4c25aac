//! Persisted per-unit settings.
//!
//! The storage encoding belongs to the app; these only fix field names and
//! types. Every struct defaults field-by-field so partial files still load.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealerSettings {
	pub heal_enabled: bool,
	pub heal_threshold: u8,
	pub heal_hotkey: String,

	pub critical_enabled: bool,
	pub critical_threshold: u8,
	pub critical_hotkey: String,

	pub mana_enabled: bool,
	pub mana_threshold: u8,
	pub mana_hotkey: String,

	pub critical_is_potion: bool,
}

impl Default for HealerSettings {
	fn default() -> Self {
		Self {
			heal_enabled: true,
			heal_threshold: 75,
			heal_hotkey: "F1".to_string(),
			critical_enabled: true,
			critical_threshold: 50,
			critical_hotkey: "F2".to_string(),
			mana_enabled: true,
			mana_threshold: 60,
			mana_hotkey: "F4".to_string(),
			critical_is_potion: false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaterSettings {
	pub enabled: bool,
	pub food_type: String,
	pub hotkey: String,
}

impl Default for EaterSettings {
	fn default() -> Self {
		Self {
			enabled: false,
			food_type: crate::eater::DEFAULT_FOOD.to_string(),
			hotkey: "]".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasteSettings {
	pub enabled: bool,
	pub hotkey: String,
}

impl Default for HasteSettings {
	fn default() -> Self {
		Self {
			enabled: false,
			hotkey: "x".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinnerSettings {
	pub enabled: bool,
	pub hotkey: String,
}

impl Default for SkinnerSettings {
	fn default() -> Self {
		Self {
			enabled: false,
			hotkey: "[".to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
	pub healer: HealerSettings,
	pub eater: EaterSettings,
	pub haste: HasteSettings,
	pub skinner: SkinnerSettings,
}
