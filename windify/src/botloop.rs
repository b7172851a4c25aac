//! Background poll thread driving the bot.
//!
//! The thread owns the [`BotOrchestrator`]. The UI talks to it only through
//! [`BotLoop`] (commands in) and [`LoopEvent`]s (snapshots out), so unit state
//! is never shared across threads.

use std::{
	sync::{
		Arc, Condvar, Mutex,
		mpsc::{self, Receiver, Sender},
	},
	thread::JoinHandle,
	time::{Duration, Instant},
};

use bot::{BotOrchestrator, BotSettings, Command, PerceptionSource, SharedSink, StatusSnapshot, click::ClickSource};

/// Wait before looking for a missing window again.
pub const WINDOW_WAIT: Duration = Duration::from_millis(500);

/// The screen side of the loop: locate the window, then read from it.
pub trait Screen: PerceptionSource + Send {
	/// Find the target window. `Some(true)` when it appeared, moved or was
	/// resized since the last call; `None` when it is gone.
	fn locate(&mut self) -> Option<bool>;
}

#[derive(Debug, Clone)]
pub enum LoopEvent {
	Started,
	Stopped,
	WindowMissing,
	/// Listener start failed; polling continues without the skinner.
	ListenerError(String),
	Snapshot(StatusSnapshot),
}

enum Message {
	Bot(Command),
	PollDelay(Duration),
}

#[derive(Debug)]
struct State {
	next_poll: Instant,
	running: bool,
	wake: bool,
	shutdown: bool,
}

type Schedule = Arc<(Mutex<State>, Condvar)>;

pub struct BotLoop {
	schedule: Schedule,
	tx: Sender<Message>,
	thread: Option<JoinHandle<()>>,
}

impl BotLoop {
	pub fn spawn(
		settings: &BotSettings,
		poll_delay: Duration,
		sink: SharedSink,
		clicks: Arc<dyn ClickSource>,
		screen: Box<dyn Screen>,
		events: Sender<LoopEvent>,
	) -> anyhow::Result<Self> {
		let bot = BotOrchestrator::from_settings(settings, sink, clicks, Instant::now())?;
		let schedule: Schedule = Arc::new((
			Mutex::new(State {
				next_poll: Instant::now(),
				running: false,
				wake: false,
				shutdown: false,
			}),
			Condvar::new(),
		));
		let (tx, rx) = mpsc::channel();

		let worker = Worker {
			bot,
			screen,
			rx,
			events,
			poll_delay,
			schedule: schedule.clone(),
		};
		let thread = std::thread::Builder::new()
			.name("bot-loop".to_string())
			.spawn(move || worker.run())?;

		Ok(Self {
			schedule,
			tx,
			thread: Some(thread),
		})
	}

	pub fn start(&self) {
		self.update(|state| {
			state.running = true;
			state.wake = true;
			state.next_poll = Instant::now();
		});
	}

	pub fn stop(&self) {
		self.update(|state| {
			state.running = false;
			state.wake = true;
		});
	}

	pub fn is_running(&self) -> bool {
		let (lock, _) = &*self.schedule;
		lock.lock().expect("schedule lock poisoned").running
	}

	pub fn send(&self, command: Command) {
		self.post(Message::Bot(command));
	}

	pub fn set_poll_delay(&self, delay: Duration) {
		self.post(Message::PollDelay(delay));
	}

	fn post(&self, message: Message) {
		if self.tx.send(message).is_err() {
			tracing::warn!("bot loop is gone; message dropped");
			return;
		}
		self.update(|state| state.wake = true);
	}

	fn update(&self, f: impl FnOnce(&mut State)) {
		let (lock, cv) = &*self.schedule;
		let mut state = lock.lock().expect("schedule lock poisoned");
		f(&mut state);
		cv.notify_all();
	}
}

impl Drop for BotLoop {
	fn drop(&mut self) {
		self.update(|state| state.shutdown = true);
		if let Some(thread) = self.thread.take()
			&& thread.join().is_err()
		{
			tracing::warn!("bot loop panicked");
		}
	}
}

struct Worker {
	bot: BotOrchestrator,
	screen: Box<dyn Screen>,
	rx: Receiver<Message>,
	events: Sender<LoopEvent>,
	poll_delay: Duration,
	schedule: Schedule,
}

impl Worker {
	fn run(mut self) {
		let mut active = false;
		loop {
			// 1) Wait until it's time to poll, or until someone wakes us.
			let Some(running) = self.wait() else { break };

			// 2) Commands first so this poll already sees them.
			while let Ok(message) = self.rx.try_recv() {
				match message {
					Message::Bot(command) => self.bot.apply(command, Instant::now()),
					Message::PollDelay(delay) => self.poll_delay = delay,
				}
			}

			if running != active {
				active = running;
				if running {
					self.on_start();
				} else {
					self.bot.stop_listeners();
					self.emit(LoopEvent::Stopped);
					tracing::info!("bot stopped");
				}
			}
			if !running || !self.is_due() {
				continue;
			}

			// 3) Poll without holding the schedule lock.
			let wait = self.poll_once();

			// 4) Schedule the next poll.
			let (lock, _) = &*self.schedule;
			lock.lock().expect("schedule lock poisoned").next_poll = Instant::now() + wait;
		}

		self.bot.stop_listeners();
		tracing::debug!("bot loop exited");
	}

	/// Block until a poll is due or a wake-up arrives. `None` on shutdown.
	fn wait(&self) -> Option<bool> {
		let (lock, cv) = &*self.schedule;
		let mut state = lock.lock().expect("schedule lock poisoned");
		loop {
			if state.shutdown {
				return None;
			}
			if state.wake {
				state.wake = false;
				return Some(state.running);
			}
			let now = Instant::now();
			if state.running && state.next_poll <= now {
				return Some(true);
			}

			state = if state.running {
				let dur = state.next_poll.saturating_duration_since(now);
				cv.wait_timeout(state, dur).expect("schedule lock poisoned during wait").0
			} else {
				cv.wait(state).expect("schedule lock poisoned during wait")
			};
		}
	}

	fn is_due(&self) -> bool {
		let (lock, _) = &*self.schedule;
		lock.lock().expect("schedule lock poisoned").next_poll <= Instant::now()
	}

	fn on_start(&mut self) {
		tracing::info!("bot started");
		self.emit(LoopEvent::Started);
		if let Err(err) = self.bot.start_listeners() {
			tracing::warn!(error = %err, "click listener unavailable");
			self.emit(LoopEvent::ListenerError(err.to_string()));
		}
	}

	/// One perception + decision round. Returns the wait before the next one.
	fn poll_once(&mut self) -> Duration {
		match self.screen.locate() {
			None => {
				self.emit(LoopEvent::WindowMissing);
				return WINDOW_WAIT;
			}
			Some(true) => {
				tracing::info!("target window changed; relearning capacities");
				self.bot.reset_capacity();
			}
			Some(false) => {}
		}

		let snapshot = self.bot.poll(Instant::now(), self.screen.as_mut());
		let wait = if snapshot.failed {
			bot::orchestrator::ERROR_BACKOFF
		} else {
			self.poll_delay
		};
		self.emit(LoopEvent::Snapshot(snapshot));
		wait
	}

	fn emit(&self, event: LoopEvent) {
		// The UI may already be gone during shutdown.
		let _ = self.events.send(event);
	}
}

/// Live screen: xcap capture plus OCR.
pub struct ScreenPerception {
	ie: Arc<ie::Ie>,
	reader: ie::StatusReader,
	tracker: crate::capture::WindowTracker,
	app_name: Option<String>,
}

impl ScreenPerception {
	pub fn new(ie: Arc<ie::Ie>) -> Self {
		Self {
			ie,
			reader: ie::StatusReader::new(),
			tracker: crate::capture::WindowTracker::new(),
			app_name: None,
		}
	}
}

impl Screen for ScreenPerception {
	fn locate(&mut self) -> Option<bool> {
		let app_name = crate::config_read().app_name.clone();
		let bounds = crate::capture::find_window(&app_name)
			.as_ref()
			.and_then(crate::capture::WindowBounds::of);
		let changed = self.tracker.update(bounds);
		if changed {
			self.reader.reset();
		}
		self.app_name = bounds.map(|_| app_name);
		bounds.map(|_| changed)
	}
}

impl PerceptionSource for ScreenPerception {
	fn read_status(&mut self) -> Result<bot::StatusReading, bot::BotError> {
		let window = self
			.app_name
			.as_deref()
			.and_then(crate::capture::find_window)
			.ok_or_else(|| bot::BotError::Perception("window not found".into()))?;
		if !self.ie.ocr_available() {
			return Err(bot::BotError::Perception(
				self.ie.ocr_init_error().unwrap_or("OCR unavailable").to_string(),
			));
		}

		let (regions, max_height) = {
			let config = crate::config_read();
			(config.regions.clone(), config.max_capture_height)
		};
		if !regions.is_hp_configured() && !regions.is_mana_configured() {
			return Err(bot::BotError::Perception("no HP/mana region configured".into()));
		}

		let frame = crate::capture::capture_window(&window, max_height).map_err(perception_error)?;
		let reading = self
			.reader
			.read(&self.ie, frame.image.as_image(), &frame.scale_regions(&regions));

		Ok(bot::StatusReading {
			hp_current: reading.hp.map(|v| v.current),
			hp_max: reading.hp.and_then(|v| v.max),
			mana_current: reading.mana.map(|v| v.current),
			mana_max: reading.mana.and_then(|v| v.max),
		})
	}
}

/// Keep the whole context chain when handing an app error to the bot.
fn perception_error(err: anyhow::Error) -> bot::BotError {
	bot::BotError::Perception(format!("{err:#}"))
}
