//! HP/mana threshold healer.
//!
//! Three guarded slots share one global cooldown: normal heal, critical heal
//! and mana restore. At most one of them fires per cooldown interval.

use std::time::{Duration, Instant};

use crate::{CooldownGate, SharedSink, ThresholdConfig};

/// Shared cooldown between any two heal-family actions.
pub const GLOBAL_COOLDOWN: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealKind {
	Normal,
	Critical,
}

impl HealKind {
	pub fn as_str(self) -> &'static str {
		match self {
			HealKind::Normal => "normal",
			HealKind::Critical => "critical",
		}
	}
}

impl std::fmt::Display for HealKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

pub struct ThresholdHealer {
	sink: SharedSink,

	max_hp: Option<u32>,
	max_mana: Option<u32>,

	pub heal: ThresholdConfig,
	pub critical_heal: ThresholdConfig,
	pub mana_restore: ThresholdConfig,

	/// Critical heal is a potion sharing the mana potion's cooldown.
	pub critical_is_potion: bool,

	cooldown: CooldownGate,
}

impl ThresholdHealer {
	pub fn new(sink: SharedSink) -> Self {
		Self {
			sink,
			max_hp: None,
			max_mana: None,
			heal: ThresholdConfig::new(75, "F1"),
			critical_heal: ThresholdConfig::new(50, "F2"),
			mana_restore: ThresholdConfig::new(60, "F4"),
			critical_is_potion: false,
			cooldown: CooldownGate::new(GLOBAL_COOLDOWN),
		}
	}

	// Capacity

	pub fn max_hp(&self) -> Option<u32> {
		self.max_hp
	}

	pub fn max_mana(&self) -> Option<u32> {
		self.max_mana
	}

	pub fn set_max_hp(&mut self, value: u32) {
		if value > 0 {
			self.max_hp = Some(value);
		}
	}

	pub fn set_max_mana(&mut self, value: u32) {
		if value > 0 {
			self.max_mana = Some(value);
		}
	}

	/// Forget both capacities so the next readings re-detect them.
	pub fn reset_capacity(&mut self) {
		self.max_hp = None;
		self.max_mana = None;
	}

	pub fn auto_detect_max_hp(&mut self, current: Option<u32>) {
		if auto_detect(&mut self.max_hp, current) {
			tracing::info!(max_hp = ?self.max_hp, "max HP auto-detected");
		}
	}

	pub fn auto_detect_max_mana(&mut self, current: Option<u32>) {
		if auto_detect(&mut self.max_mana, current) {
			tracing::info!(max_mana = ?self.max_mana, "max mana auto-detected");
		}
	}

	/// `current / max * 100`, or `100.0` when either side is unknown.
	///
	/// Unknown health counts as safe so nothing fires before detection.
	pub fn percent_of(current: Option<u32>, max: Option<u32>) -> f64 {
		match (current, max) {
			(Some(current), Some(max)) if current > 0 && max > 0 => current as f64 / max as f64 * 100.0,
			_ => 100.0,
		}
	}

	pub fn hp_percent(&self, current: Option<u32>) -> f64 {
		Self::percent_of(current, self.max_hp)
	}

	pub fn mana_percent(&self, current: Option<u32>) -> f64 {
		Self::percent_of(current, self.max_mana)
	}

	// Cooldown

	pub fn is_on_cooldown(&self, now: Instant) -> bool {
		!self.cooldown.is_ready(now)
	}

	pub fn cooldown_remaining(&self, now: Instant) -> Duration {
		self.cooldown.remaining(now)
	}

	/// Make every slot eligible again regardless of the last fire.
	pub fn clear_cooldown(&mut self) {
		self.cooldown.clear();
	}

	// Decisions

	/// Fire critical or normal heal if HP is below the matching threshold.
	///
	/// Critical is checked first and pre-empts normal.
	pub fn check_and_heal(&mut self, now: Instant, current_hp: Option<u32>) -> Option<HealKind> {
		self.auto_detect_max_hp(current_hp);

		if self.max_hp.is_none() || !self.cooldown.is_ready(now) {
			return None;
		}

		let percent = self.hp_percent(current_hp);

		if self.critical_heal.is_breached(percent) {
			self.fire(now, HealKind::Critical, percent);
			return Some(HealKind::Critical);
		}

		if self.heal.is_breached(percent) {
			self.fire(now, HealKind::Normal, percent);
			return Some(HealKind::Normal);
		}

		None
	}

	/// Fire mana restore if mana is below its threshold.
	///
	/// Competes for the same cooldown as the heals; it has no priority of its own.
	pub fn check_and_restore_mana(&mut self, now: Instant, current_mana: Option<u32>) -> bool {
		self.auto_detect_max_mana(current_mana);

		if self.max_mana.is_none() || !self.cooldown.is_ready(now) {
			return false;
		}

		let percent = self.mana_percent(current_mana);
		if !self.mana_restore.is_breached(percent) {
			return false;
		}

		let hotkey = self.mana_restore.binding.hotkey.clone();
		self.press(now, &hotkey);
		tracing::info!(%hotkey, threshold = self.mana_restore.threshold(), percent, "mana restore");
		true
	}

	/// Potion mode: critical heal and mana restore race for one cooldown.
	///
	/// A triggered critical heal always wins and mana is not evaluated in the
	/// same call, so a mana potion never replaces a life-saving heal.
	pub fn check_critical_and_mana_with_priority(
		&mut self,
		now: Instant,
		current_hp: Option<u32>,
		current_mana: Option<u32>,
	) -> (Option<HealKind>, bool) {
		self.auto_detect_max_hp(current_hp);
		self.auto_detect_max_mana(current_mana);

		if !self.cooldown.is_ready(now) {
			return (None, false);
		}

		let percent = self.hp_percent(current_hp);
		if self.critical_heal.is_breached(percent) {
			self.fire(now, HealKind::Critical, percent);
			return (Some(HealKind::Critical), false);
		}

		(None, self.check_and_restore_mana(now, current_mana))
	}

	fn fire(&mut self, now: Instant, kind: HealKind, percent: f64) {
		let slot = match kind {
			HealKind::Normal => &self.heal,
			HealKind::Critical => &self.critical_heal,
		};
		let hotkey = slot.binding.hotkey.clone();
		let threshold = slot.threshold();

		self.press(now, &hotkey);
		tracing::info!(%kind, %hotkey, threshold, percent, "heal");
	}

	/// Press and stamp. The stamp happens whether or not the press landed.
	fn press(&mut self, now: Instant, hotkey: &str) {
		self.sink.press(hotkey);
		self.cooldown.stamp(now);
	}

	// Settings

	pub fn toggle_heal(&mut self, enabled: bool) {
		self.heal.binding.enabled = enabled;
	}

	pub fn toggle_critical_heal(&mut self, enabled: bool) {
		self.critical_heal.binding.enabled = enabled;
	}

	pub fn toggle_mana(&mut self, enabled: bool) {
		self.mana_restore.binding.enabled = enabled;
	}

	pub fn set_heal_threshold(&mut self, value: i32) {
		self.heal.set_threshold(value);
	}

	pub fn set_critical_threshold(&mut self, value: i32) {
		self.critical_heal.set_threshold(value);
	}

	pub fn set_mana_threshold(&mut self, value: i32) {
		self.mana_restore.set_threshold(value);
	}

	pub fn set_heal_hotkey(&mut self, hotkey: impl Into<String>) {
		self.heal.binding.hotkey = hotkey.into();
	}

	pub fn set_critical_hotkey(&mut self, hotkey: impl Into<String>) {
		self.critical_heal.binding.hotkey = hotkey.into();
	}

	pub fn set_mana_hotkey(&mut self, hotkey: impl Into<String>) {
		self.mana_restore.binding.hotkey = hotkey.into();
	}

	pub fn set_critical_is_potion(&mut self, enabled: bool) {
		self.critical_is_potion = enabled;
	}
}

/// First non-zero reading sets the capacity; later readings never change it.
fn auto_detect(max: &mut Option<u32>, current: Option<u32>) -> bool {
	match (*max, current) {
		(None, Some(value)) if value > 0 => {
			*max = Some(value);
			true
		}
		_ => false,
	}
}

#[cfg(test)]
#[path = "healer_tests.rs"]
mod tests;
