use std::time::{Duration, Instant};

/// Fixed-width cooldown measured from the last fire.
///
/// A gate that never fired is ready. Callers stamp the gate themselves after
/// dispatching an action.
#[derive(Debug, Clone)]
pub struct CooldownGate {
	interval: Duration,
	last_fired_at: Option<Instant>,
}

impl CooldownGate {
	pub fn new(interval: Duration) -> Self {
		Self {
			interval,
			last_fired_at: None,
		}
	}

	/// `true` iff at least `interval` has elapsed since `last_fired_at`.
	pub fn is_ready_at(now: Instant, last_fired_at: Instant, interval: Duration) -> bool {
		now.saturating_duration_since(last_fired_at) >= interval
	}

	/// `max(0, interval - (now - last_fired_at))`.
	pub fn remaining_at(now: Instant, last_fired_at: Instant, interval: Duration) -> Duration {
		interval.saturating_sub(now.saturating_duration_since(last_fired_at))
	}

	pub fn is_ready(&self, now: Instant) -> bool {
		match self.last_fired_at {
			Some(last) => Self::is_ready_at(now, last, self.interval),
			None => true,
		}
	}

	pub fn remaining(&self, now: Instant) -> Duration {
		match self.last_fired_at {
			Some(last) => Self::remaining_at(now, last, self.interval),
			None => Duration::ZERO,
		}
	}

	pub fn stamp(&mut self, now: Instant) {
		self.last_fired_at = Some(now);
	}

	/// Force the gate eligible.
	pub fn clear(&mut self) {
		self.last_fired_at = None;
	}
}
