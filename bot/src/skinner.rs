//! Click-triggered skinning.
//!
//! Not polled: a listener thread reacts to right-button presses and queues a
//! delayed key press on a small worker pool so the listener never blocks.

use std::{
	ops::RangeInclusive,
	sync::{Arc, Mutex, mpsc},
	thread::JoinHandle,
};

use crate::{
	BotError, SharedSink,
	click::{ClickEvent, ClickSource, Subscription},
	pool::TaskPool,
	timer::jitter,
};

const DELAY_SECS: RangeInclusive<f64> = 0.2..=0.4;
const WORKERS: usize = 4;
const QUEUE: usize = 16;

#[derive(Debug, Clone)]
struct Gate {
	enabled: bool,
	hotkey: String,
}

struct Listener {
	subscription: Box<dyn Subscription>,
	thread: JoinHandle<()>,
}

pub struct EventSkinner {
	sink: SharedSink,
	source: Arc<dyn ClickSource>,
	gate: Arc<Mutex<Gate>>,
	pool: Arc<TaskPool>,
	listener: Option<Listener>,
}

impl EventSkinner {
	pub fn new(sink: SharedSink, source: Arc<dyn ClickSource>) -> Result<Self, BotError> {
		Ok(Self {
			sink,
			source,
			gate: Arc::new(Mutex::new(Gate {
				enabled: false,
				hotkey: "[".to_string(),
			})),
			pool: Arc::new(TaskPool::new("skinner", WORKERS, QUEUE)?),
			listener: None,
		})
	}

	pub fn is_running(&self) -> bool {
		self.listener.is_some()
	}

	pub fn is_enabled(&self) -> bool {
		self.gate.lock().expect("skinner gate poisoned").enabled
	}

	/// Flip the gate. The listener keeps running either way.
	pub fn toggle(&mut self, enabled: bool) {
		let mut gate = self.gate.lock().expect("skinner gate poisoned");
		gate.enabled = enabled;
		tracing::info!(enabled, hotkey = %gate.hotkey, "auto skinner toggled");
	}

	pub fn set_hotkey(&mut self, hotkey: impl Into<String>) {
		self.gate.lock().expect("skinner gate poisoned").hotkey = hotkey.into();
	}

	/// Attach to the click source. No-op if already listening.
	pub fn start(&mut self) -> Result<(), BotError> {
		if self.listener.is_some() {
			return Ok(());
		}

		let (tx, rx) = mpsc::channel::<ClickEvent>();
		let subscription = self.source.subscribe(tx)?;

		let sink = self.sink.clone();
		let gate = self.gate.clone();
		let pool = self.pool.clone();
		let spawned = std::thread::Builder::new()
			.name("skinner-listener".to_string())
			.spawn(move || {
				// Ends once the source drops its sender.
				for event in rx {
					on_click(event, &gate, &pool, &sink);
				}
			});

		let thread = match spawned {
			Ok(thread) => thread,
			Err(err) => {
				subscription.unsubscribe();
				return Err(err.into());
			}
		};

		self.listener = Some(Listener { subscription, thread });
		tracing::info!("skinner listener started");
		Ok(())
	}

	/// Detach from the click source. Already queued skins still complete.
	pub fn stop(&mut self) {
		let Some(listener) = self.listener.take() else { return };
		listener.subscription.unsubscribe();
		if listener.thread.join().is_err() {
			tracing::warn!("skinner listener panicked");
		}
		tracing::info!("skinner listener stopped");
	}
}

impl Drop for EventSkinner {
	fn drop(&mut self) {
		self.stop();
	}
}

fn on_click(event: ClickEvent, gate: &Mutex<Gate>, pool: &TaskPool, sink: &SharedSink) {
	if !event.is_right_press() {
		return;
	}

	let hotkey = {
		let gate = gate.lock().expect("skinner gate poisoned");
		if !gate.enabled {
			return;
		}
		gate.hotkey.clone()
	};

	let sink = sink.clone();
	pool.spawn(move || {
		let delay = jitter(DELAY_SECS);
		sink.pause(delay);
		sink.press(&hotkey);
		tracing::info!(delay_ms = delay.as_millis() as u64, "skinned");
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::click::MouseButton;
	use crate::testing::{ChannelClickSource, RecordingSink};
	use std::time::Duration;

	fn skinner() -> (EventSkinner, ChannelClickSource, Arc<RecordingSink>) {
		let sink = RecordingSink::shared();
		let source = ChannelClickSource::default();
		let skinner = EventSkinner::new(sink.clone(), Arc::new(source.clone())).unwrap();
		(skinner, source, sink)
	}

	#[test]
	fn start_and_stop_are_idempotent() {
		let (mut skinner, source, _) = skinner();
		skinner.start().unwrap();
		skinner.start().unwrap();
		assert!(skinner.is_running());
		assert_eq!(source.subscribe_count(), 1);

		skinner.stop();
		skinner.stop();
		assert!(!skinner.is_running());
		assert!(!source.is_subscribed());
	}

	#[test]
	fn right_press_skins_after_delay() {
		let (mut skinner, source, sink) = skinner();
		skinner.toggle(true);
		skinner.start().unwrap();

		assert!(source.right_click());
		assert!(sink.wait_for_presses(1, Duration::from_secs(5)));
		assert_eq!(sink.presses(), vec!["["]);

		let pauses = sink.pauses();
		assert_eq!(pauses.len(), 1);
		assert!((0.2..=0.4).contains(&pauses[0].as_secs_f64()));
	}

	#[test]
	fn ignores_other_buttons_and_releases() {
		let (mut skinner, source, sink) = skinner();
		skinner.toggle(true);
		skinner.start().unwrap();

		source.emit(ClickEvent { button: MouseButton::Left, pressed: true });
		source.emit(ClickEvent { button: MouseButton::Right, pressed: false });
		source.emit(ClickEvent { button: MouseButton::Middle, pressed: true });
		skinner.stop();

		assert!(sink.presses().is_empty());
	}

	#[test]
	fn disabled_gate_does_not_press() {
		let (mut skinner, source, sink) = skinner();
		skinner.start().unwrap();
		skinner.toggle(false);

		assert!(source.right_click());
		// Joining the listener guarantees the click was handled.
		skinner.stop();
		assert!(sink.presses().is_empty());
	}

	#[test]
	fn toggle_does_not_resubscribe() {
		let (mut skinner, source, sink) = skinner();
		skinner.start().unwrap();
		skinner.toggle(false);
		skinner.toggle(true);
		skinner.set_hotkey("k");
		assert!(skinner.is_running());
		assert_eq!(source.subscribe_count(), 1);

		assert!(source.right_click());
		assert!(sink.wait_for_presses(1, Duration::from_secs(5)));
		assert_eq!(sink.presses(), vec!["k"]);
	}

	#[test]
	fn click_burst_is_handled() {
		let (mut skinner, source, sink) = skinner();
		skinner.toggle(true);
		skinner.start().unwrap();

		for _ in 0..3 {
			source.right_click();
		}
		assert!(sink.wait_for_presses(3, Duration::from_secs(5)));
	}
}
