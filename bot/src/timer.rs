use std::{
	ops::RangeInclusive,
	time::{Duration, Instant},
};

use rand::Rng;

/// Forward-scheduled single deadline.
///
/// Unlike [`crate::CooldownGate`] this is recomputed after every fire (and on
/// enable) instead of measured from the last fire. `None` means "already due".
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
	next_fire_at: Option<Instant>,
}

impl Deadline {
	pub fn next_fire_at(&self) -> Option<Instant> {
		self.next_fire_at
	}

	pub fn is_due(&self, now: Instant) -> bool {
		self.next_fire_at.is_none_or(|at| now >= at)
	}

	pub fn time_left(&self, now: Instant) -> Duration {
		self.next_fire_at
			.map_or(Duration::ZERO, |at| at.saturating_duration_since(now))
	}

	pub fn schedule(&mut self, at: Instant) {
		self.next_fire_at = Some(at);
	}

	/// Make the deadline due immediately.
	pub fn make_due(&mut self) {
		self.next_fire_at = None;
	}
}

/// Uniformly random duration in `secs`.
pub(crate) fn jitter(secs: RangeInclusive<f64>) -> Duration {
	Duration::from_secs_f64(rand::thread_rng().gen_range(secs))
}
