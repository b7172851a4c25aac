//! Composition root for the decision units.
//!
//! One orchestrator owns one of each unit. The poll thread calls [`BotOrchestrator::tick`]
//! (or [`BotOrchestrator::poll`]) once per frame and publishes the returned
//! [`StatusSnapshot`]; the UI never reaches into live unit state. Settings
//! arrive as [`Command`]s.
//!
//! Heal-family evaluation order within a tick:
//! - default mode: critical, normal, mana
//! - potion mode: critical, mana, normal
//!
//! The shared cooldown means at most one of them fires per tick.

use std::{
	sync::Arc,
	time::{Duration, Instant},
};

use crate::{
	BotError, BotSettings, EventSkinner, HealKind, IntervalCaster, IntervalEater, PerceptionSource,
	SharedSink, StatusReading, ThresholdHealer, click::ClickSource,
};

/// Wait applied by the poll loop after a failed perception read.
pub const ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// A configuration change from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
	HealEnabled(bool),
	HealThreshold(i32),
	HealHotkey(String),
	CriticalEnabled(bool),
	CriticalThreshold(i32),
	CriticalHotkey(String),
	ManaEnabled(bool),
	ManaThreshold(i32),
	ManaHotkey(String),
	CriticalIsPotion(bool),

	EaterEnabled(bool),
	FoodType(String),
	EaterHotkey(String),

	HasteEnabled(bool),
	HasteHotkey(String),

	SkinnerEnabled(bool),
	SkinnerHotkey(String),

	MaxHp(u32),
	MaxMana(u32),
	ResetCapacity,
	ClearCooldown,

	Apply(BotSettings),
}

/// Read-only view of the bot after one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
	pub hp: Option<u32>,
	pub mana: Option<u32>,
	pub max_hp: Option<u32>,
	pub max_mana: Option<u32>,
	pub hp_percent: f64,
	pub mana_percent: f64,

	/// What fired during this tick.
	pub heal: Option<HealKind>,
	pub mana_restored: bool,
	pub ate: bool,
	pub hasted: bool,

	pub heal_cooldown: Duration,
	/// `None` while the unit is disabled.
	pub next_eat_in: Option<Duration>,
	pub next_haste_in: Option<Duration>,
	pub skinner_listening: bool,

	/// Transient status line (perception failures etc.).
	pub message: Option<String>,
	/// The read failed; the loop should back off before the next poll.
	pub failed: bool,
}

pub struct BotOrchestrator {
	healer: ThresholdHealer,
	eater: IntervalEater,
	haste: IntervalCaster,
	skinner: EventSkinner,
	last_reading: StatusReading,
}

impl BotOrchestrator {
	pub fn new(sink: SharedSink, clicks: Arc<dyn ClickSource>) -> Result<Self, BotError> {
		Ok(Self {
			healer: ThresholdHealer::new(sink.clone()),
			eater: IntervalEater::new(sink.clone()),
			haste: IntervalCaster::new(sink.clone()),
			skinner: EventSkinner::new(sink, clicks)?,
			last_reading: StatusReading::default(),
		})
	}

	pub fn from_settings(
		settings: &BotSettings,
		sink: SharedSink,
		clicks: Arc<dyn ClickSource>,
		now: Instant,
	) -> Result<Self, BotError> {
		let mut bot = Self::new(sink, clicks)?;
		bot.apply_settings(settings, now);
		Ok(bot)
	}

	pub fn healer(&self) -> &ThresholdHealer {
		&self.healer
	}

	pub fn eater(&self) -> &IntervalEater {
		&self.eater
	}

	pub fn haste(&self) -> &IntervalCaster {
		&self.haste
	}

	pub fn skinner(&self) -> &EventSkinner {
		&self.skinner
	}

	/// Start the event-driven units (skinner listener).
	pub fn start_listeners(&mut self) -> Result<(), BotError> {
		self.skinner.start()
	}

	pub fn stop_listeners(&mut self) {
		self.skinner.stop();
	}

	/// Drop detected capacities, e.g. after the target window changed.
	pub fn reset_capacity(&mut self) {
		self.healer.reset_capacity();
		self.last_reading = StatusReading::default();
	}

	/// Apply a whole settings block.
	///
	/// Toggles only fire when the enabled state actually changes, so reloading
	/// unchanged settings does not reset running timers.
	pub fn apply_settings(&mut self, settings: &BotSettings, now: Instant) {
		let h = &settings.healer;
		self.healer.toggle_heal(h.heal_enabled);
		self.healer.set_heal_threshold(h.heal_threshold as i32);
		self.healer.set_heal_hotkey(h.heal_hotkey.clone());
		self.healer.toggle_critical_heal(h.critical_enabled);
		self.healer.set_critical_threshold(h.critical_threshold as i32);
		self.healer.set_critical_hotkey(h.critical_hotkey.clone());
		self.healer.toggle_mana(h.mana_enabled);
		self.healer.set_mana_threshold(h.mana_threshold as i32);
		self.healer.set_mana_hotkey(h.mana_hotkey.clone());
		self.healer.set_critical_is_potion(h.critical_is_potion);

		let e = &settings.eater;
		self.eater.set_hotkey(e.hotkey.clone());
		if self.eater.food().key != e.food_type {
			if let Err(err) = self.eater.set_food_type(&e.food_type) {
				tracing::warn!(error = %err, "ignoring food type from settings");
			}
		}
		if self.eater.is_enabled() != e.enabled {
			self.eater.toggle(e.enabled);
		}

		self.haste.set_hotkey(settings.haste.hotkey.clone());
		if self.haste.is_enabled() != settings.haste.enabled {
			self.haste.toggle(settings.haste.enabled, now);
		}

		self.skinner.set_hotkey(settings.skinner.hotkey.clone());
		if self.skinner.is_enabled() != settings.skinner.enabled {
			self.skinner.toggle(settings.skinner.enabled);
		}
	}

	pub fn apply(&mut self, command: Command, now: Instant) {
		tracing::debug!(?command, "apply");
		match command {
			Command::HealEnabled(v) => self.healer.toggle_heal(v),
			Command::HealThreshold(v) => self.healer.set_heal_threshold(v),
			Command::HealHotkey(v) => self.healer.set_heal_hotkey(v),
			Command::CriticalEnabled(v) => self.healer.toggle_critical_heal(v),
			Command::CriticalThreshold(v) => self.healer.set_critical_threshold(v),
			Command::CriticalHotkey(v) => self.healer.set_critical_hotkey(v),
			Command::ManaEnabled(v) => self.healer.toggle_mana(v),
			Command::ManaThreshold(v) => self.healer.set_mana_threshold(v),
			Command::ManaHotkey(v) => self.healer.set_mana_hotkey(v),
			Command::CriticalIsPotion(v) => self.healer.set_critical_is_potion(v),

			Command::EaterEnabled(v) => self.eater.toggle(v),
			Command::FoodType(key) => {
				if let Err(err) = self.eater.set_food_type(&key) {
					tracing::warn!(error = %err, "food type not changed");
				}
			}
			Command::EaterHotkey(v) => self.eater.set_hotkey(v),

			Command::HasteEnabled(v) => self.haste.toggle(v, now),
			Command::HasteHotkey(v) => self.haste.set_hotkey(v),

			Command::SkinnerEnabled(v) => self.skinner.toggle(v),
			Command::SkinnerHotkey(v) => self.skinner.set_hotkey(v),

			Command::MaxHp(v) => self.healer.set_max_hp(v),
			Command::MaxMana(v) => self.healer.set_max_mana(v),
			Command::ResetCapacity => self.reset_capacity(),
			Command::ClearCooldown => self.healer.clear_cooldown(),

			Command::Apply(settings) => self.apply_settings(&settings, now),
		}
	}

	/// Feed one reading through every polled unit.
	pub fn tick(&mut self, now: Instant, reading: StatusReading) -> StatusSnapshot {
		self.last_reading = reading;

		if let Some(max) = reading.hp_max
			&& self.healer.max_hp().is_none()
		{
			self.healer.set_max_hp(max);
		}
		if let Some(max) = reading.mana_max
			&& self.healer.max_mana().is_none()
		{
			self.healer.set_max_mana(max);
		}

		let hp = reading.hp_current;
		let mana = reading.mana_current;

		let (heal, mana_restored) = if self.healer.critical_is_potion {
			let (critical, restored) = self.healer.check_critical_and_mana_with_priority(now, hp, mana);
			let heal = critical.or_else(|| self.healer.check_and_heal(now, hp));
			(heal, restored)
		} else {
			let heal = self.healer.check_and_heal(now, hp);
			let restored = self.healer.check_and_restore_mana(now, mana);
			(heal, restored)
		};

		let ate = self.eater.check_and_eat(now);
		let hasted = self.haste.check_and_cast(now);

		StatusSnapshot {
			heal,
			mana_restored,
			ate,
			hasted,
			..self.snapshot(now)
		}
	}

	/// Read from `source` and tick.
	///
	/// A failed read never escapes: the snapshot carries the message and
	/// `failed = true`, and unit state is left untouched.
	pub fn poll(&mut self, now: Instant, source: &mut dyn PerceptionSource) -> StatusSnapshot {
		match source.read_status() {
			Ok(reading) => self.tick(now, reading),
			Err(err) => {
				tracing::warn!(error = %err, "perception failed");
				StatusSnapshot {
					message: Some(err.to_string()),
					failed: true,
					..self.snapshot(now)
				}
			}
		}
	}

	/// Snapshot of current state without evaluating anything.
	pub fn snapshot(&self, now: Instant) -> StatusSnapshot {
		let reading = self.last_reading;
		StatusSnapshot {
			hp: reading.hp_current,
			mana: reading.mana_current,
			max_hp: self.healer.max_hp(),
			max_mana: self.healer.max_mana(),
			hp_percent: self.healer.hp_percent(reading.hp_current),
			mana_percent: self.healer.mana_percent(reading.mana_current),
			heal_cooldown: self.healer.cooldown_remaining(now),
			next_eat_in: self.eater.is_enabled().then(|| self.eater.next_fire_in(now)),
			next_haste_in: self.haste.is_enabled().then(|| self.haste.next_fire_in(now)),
			skinner_listening: self.skinner.is_running(),
			..Default::default()
		}
	}
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
