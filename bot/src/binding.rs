/// Association of a logical action to a hotkey and an enabled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBinding {
	pub enabled: bool,
	pub hotkey: String,
}

impl ActionBinding {
	pub fn new(hotkey: impl Into<String>) -> Self {
		Self {
			enabled: false,
			hotkey: hotkey.into(),
		}
	}
}

/// A guarded action that fires when a resource drops below a percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdConfig {
	pub binding: ActionBinding,
	threshold_percent: u8,
}

impl ThresholdConfig {
	pub const MIN: u8 = 1;
	pub const MAX: u8 = 99;

	pub fn new(threshold_percent: u8, hotkey: impl Into<String>) -> Self {
		Self {
			binding: ActionBinding::new(hotkey),
			threshold_percent: threshold_percent.clamp(Self::MIN, Self::MAX),
		}
	}

	pub fn threshold(&self) -> u8 {
		self.threshold_percent
	}

	/// Values outside `1..=99` are ignored and the previous threshold stays.
	pub fn set_threshold(&mut self, value: i32) {
		if (Self::MIN as i32..=Self::MAX as i32).contains(&value) {
			self.threshold_percent = value as u8;
		}
	}

	/// Strict comparison: a reading exactly at the threshold does not trigger.
	pub fn is_breached(&self, percent: f64) -> bool {
		self.binding.enabled && percent < self.threshold_percent as f64
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn out_of_range_thresholds_are_ignored() {
		let mut cfg = ThresholdConfig::new(75, "F1");
		cfg.set_threshold(0);
		assert_eq!(cfg.threshold(), 75);
		cfg.set_threshold(100);
		assert_eq!(cfg.threshold(), 75);
		cfg.set_threshold(-5);
		assert_eq!(cfg.threshold(), 75);
		cfg.set_threshold(1);
		assert_eq!(cfg.threshold(), 1);
		cfg.set_threshold(99);
		assert_eq!(cfg.threshold(), 99);
	}

	#[test]
	fn disabled_slot_never_breaches() {
		let mut cfg = ThresholdConfig::new(50, "F2");
		assert!(!cfg.is_breached(10.0));
		cfg.binding.enabled = true;
		assert!(cfg.is_breached(49.9));
		assert!(!cfg.is_breached(50.0));
	}
}
