//! Periodic food consumption.
//!
//! Eats two items per cycle, then waits out both items plus a random margin.

use std::time::{Duration, Instant};

use crate::{ActionBinding, BotError, Deadline, SharedSink, timer::jitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
	pub key: &'static str,
	pub name: &'static str,
	/// How long one item lasts.
	pub duration: Duration,
}

pub const FOODS: &[Food] = &[
	Food {
		key: "fire_mushroom",
		name: "Fire Mushroom",
		duration: Duration::from_secs(432),
	},
	Food {
		key: "brown_mushroom",
		name: "Brown Mushroom",
		duration: Duration::from_secs(264),
	},
];

pub const DEFAULT_FOOD: &str = "fire_mushroom";

const ITEMS_PER_MEAL: u32 = 2;
const PRESS_GAP_SECS: std::ops::RangeInclusive<f64> = 0.2..=0.4;
const MEAL_JITTER_SECS: std::ops::RangeInclusive<f64> = 1.0..=6.0;

pub fn find_food(key: &str) -> Option<&'static Food> {
	FOODS.iter().find(|food| food.key == key)
}

pub struct IntervalEater {
	sink: SharedSink,
	pub binding: ActionBinding,
	food: &'static Food,
	deadline: Deadline,
}

impl IntervalEater {
	pub fn new(sink: SharedSink) -> Self {
		Self {
			sink,
			binding: ActionBinding::new("]"),
			food: &FOODS[0],
			deadline: Deadline::default(),
		}
	}

	pub fn food(&self) -> &'static Food {
		self.food
	}

	pub fn is_enabled(&self) -> bool {
		self.binding.enabled
	}

	/// Switch food and eat on the next check instead of waiting out the old timer.
	pub fn set_food_type(&mut self, key: &str) -> Result<(), BotError> {
		let food = find_food(key).ok_or_else(|| BotError::UnknownFood(key.to_string()))?;
		self.food = food;
		self.deadline.make_due();
		tracing::info!(food = food.name, duration_s = food.duration.as_secs(), "food type set");
		Ok(())
	}

	pub fn set_hotkey(&mut self, hotkey: impl Into<String>) {
		self.binding.hotkey = hotkey.into();
	}

	/// Enabling makes the eater due immediately; disabling only flips the flag.
	pub fn toggle(&mut self, enabled: bool) {
		self.binding.enabled = enabled;
		if enabled {
			self.deadline.make_due();
		}
		tracing::info!(enabled, "auto eater toggled");
	}

	pub fn next_fire_at(&self) -> Option<Instant> {
		self.deadline.next_fire_at()
	}

	pub fn next_fire_in(&self, now: Instant) -> Duration {
		self.deadline.time_left(now)
	}

	/// Eat if enabled and due. Blocks for the short pause between the two presses.
	pub fn check_and_eat(&mut self, now: Instant) -> bool {
		if !self.binding.enabled || !self.deadline.is_due(now) {
			return false;
		}

		self.sink.press(&self.binding.hotkey);
		self.sink.pause(jitter(PRESS_GAP_SECS));
		self.sink.press(&self.binding.hotkey);

		let delay = self.food.duration * ITEMS_PER_MEAL + jitter(MEAL_JITTER_SECS);
		self.deadline.schedule(now + delay);

		tracing::info!(
			food = self.food.name,
			items = ITEMS_PER_MEAL,
			next_in_s = delay.as_secs(),
			"ate"
		);
		true
	}
}
