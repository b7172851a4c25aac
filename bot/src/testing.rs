//! Test doubles for the sink and click seams.
//!
//! Compiled for this crate's tests and, behind the `testing` feature, for
//! the app's tests.

use std::{
	sync::{Arc, Mutex, mpsc::Sender},
	time::{Duration, Instant},
};

use crate::{
	ActionSink, BotError, PerceptionSource, StatusReading,
	click::{ClickEvent, ClickSource, MouseButton, Subscription},
};

/// Records presses and pauses without touching the keyboard or sleeping.
#[derive(Debug, Default)]
pub struct RecordingSink {
	presses: Mutex<Vec<String>>,
	pauses: Mutex<Vec<Duration>>,
}

impl RecordingSink {
	pub fn shared() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn presses(&self) -> Vec<String> {
		self.presses.lock().expect("presses lock poisoned").clone()
	}

	pub fn pauses(&self) -> Vec<Duration> {
		self.pauses.lock().expect("pauses lock poisoned").clone()
	}

	pub fn press_count(&self) -> usize {
		self.presses.lock().expect("presses lock poisoned").len()
	}

	pub fn clear(&self) {
		self.presses.lock().expect("presses lock poisoned").clear();
		self.pauses.lock().expect("pauses lock poisoned").clear();
	}

	/// Block until at least `count` presses were recorded or `timeout` passed.
	pub fn wait_for_presses(&self, count: usize, timeout: Duration) -> bool {
		let deadline = Instant::now() + timeout;
		while Instant::now() < deadline {
			if self.press_count() >= count {
				return true;
			}
			std::thread::sleep(Duration::from_millis(5));
		}
		self.press_count() >= count
	}
}

impl ActionSink for RecordingSink {
	fn press(&self, hotkey: &str) {
		self.presses
			.lock()
			.expect("presses lock poisoned")
			.push(hotkey.to_string());
	}

	fn pause(&self, duration: Duration) {
		self.pauses.lock().expect("pauses lock poisoned").push(duration);
	}
}

type Slot = Arc<Mutex<Option<Sender<ClickEvent>>>>;

/// Click source driven by the caller.
#[derive(Debug, Default, Clone)]
pub struct ChannelClickSource {
	slot: Slot,
	subscribe_count: Arc<Mutex<usize>>,
}

impl ChannelClickSource {
	/// Deliver an event to the current subscriber. Returns `false` if nobody listens.
	pub fn emit(&self, event: ClickEvent) -> bool {
		match &*self.slot.lock().expect("click slot poisoned") {
			Some(tx) => tx.send(event).is_ok(),
			None => false,
		}
	}

	pub fn right_click(&self) -> bool {
		self.emit(ClickEvent {
			button: MouseButton::Right,
			pressed: true,
		}) && self.emit(ClickEvent {
			button: MouseButton::Right,
			pressed: false,
		})
	}

	pub fn is_subscribed(&self) -> bool {
		self.slot.lock().expect("click slot poisoned").is_some()
	}

	pub fn subscribe_count(&self) -> usize {
		*self.subscribe_count.lock().expect("subscribe count poisoned")
	}
}

impl ClickSource for ChannelClickSource {
	fn subscribe(&self, tx: Sender<ClickEvent>) -> Result<Box<dyn Subscription>, BotError> {
		*self.slot.lock().expect("click slot poisoned") = Some(tx);
		*self.subscribe_count.lock().expect("subscribe count poisoned") += 1;
		Ok(Box::new(ChannelSubscription {
			slot: self.slot.clone(),
		}))
	}
}

struct ChannelSubscription {
	slot: Slot,
}

impl Subscription for ChannelSubscription {
	fn unsubscribe(self: Box<Self>) {
		self.slot.lock().expect("click slot poisoned").take();
	}
}

/// Replays a fixed list of readings, then repeats the last one.
#[derive(Debug, Default)]
pub struct ScriptedPerception {
	readings: Vec<Result<StatusReading, String>>,
	next: usize,
}

impl ScriptedPerception {
	pub fn new(readings: Vec<Result<StatusReading, String>>) -> Self {
		Self { readings, next: 0 }
	}
}

impl PerceptionSource for ScriptedPerception {
	fn read_status(&mut self) -> Result<StatusReading, BotError> {
		let index = self.next.min(self.readings.len().saturating_sub(1));
		self.next += 1;
		match self.readings.get(index) {
			Some(Ok(reading)) => Ok(*reading),
			Some(Err(err)) => Err(BotError::Perception(err.clone())),
			None => Ok(StatusReading::default()),
		}
	}
}
