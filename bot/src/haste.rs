//! Periodic buff recast.

use std::{
	ops::RangeInclusive,
	time::{Duration, Instant},
};

use crate::{ActionBinding, Deadline, SharedSink, timer::jitter};

const RECAST_SECS: RangeInclusive<f64> = 31.0..=33.0;

/// Casts one hotkey on a jittered interval.
///
/// Enabling never casts right away: the buff is most likely still active, so
/// the first cast waits a full interval.
pub struct IntervalCaster {
	sink: SharedSink,
	pub binding: ActionBinding,
	deadline: Deadline,
}

impl IntervalCaster {
	pub fn new(sink: SharedSink) -> Self {
		Self {
			sink,
			binding: ActionBinding::new("x"),
			deadline: Deadline::default(),
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.binding.enabled
	}

	pub fn set_hotkey(&mut self, hotkey: impl Into<String>) {
		self.binding.hotkey = hotkey.into();
	}

	pub fn toggle(&mut self, enabled: bool, now: Instant) {
		self.binding.enabled = enabled;
		if enabled {
			let delay = jitter(RECAST_SECS);
			self.deadline.schedule(now + delay);
			tracing::info!(hotkey = %self.binding.hotkey, first_in_s = delay.as_secs_f32(), "auto haste enabled");
		} else {
			tracing::info!("auto haste disabled");
		}
	}

	pub fn next_fire_at(&self) -> Option<Instant> {
		self.deadline.next_fire_at()
	}

	pub fn next_fire_in(&self, now: Instant) -> Duration {
		self.deadline.time_left(now)
	}

	pub fn check_and_cast(&mut self, now: Instant) -> bool {
		if !self.binding.enabled || !self.deadline.is_due(now) {
			return false;
		}

		self.sink.press(&self.binding.hotkey);
		let delay = jitter(RECAST_SECS);
		self.deadline.schedule(now + delay);
		tracing::info!(next_in_s = delay.as_secs_f32(), "cast haste");
		true
	}
}
