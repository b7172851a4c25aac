use std::{sync::Arc, time::Duration};

/// Where key presses go.
///
/// Presses are fire-and-forget: the sink owns its own failure policy and the
/// caller never learns whether a press landed.
pub trait ActionSink: Send + Sync {
	fn press(&self, hotkey: &str);

	/// Deliberate pacing between presses.
	fn pause(&self, duration: Duration) {
		std::thread::sleep(duration);
	}
}

pub type SharedSink = Arc<dyn ActionSink>;
