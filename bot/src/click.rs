//! Pointer click events feeding the skinner.

use std::sync::mpsc::Sender;

use crate::BotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
	Left,
	Right,
	Middle,
	Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
	pub button: MouseButton,
	/// `true` on press, `false` on release.
	pub pressed: bool,
}

impl ClickEvent {
	pub fn is_right_press(&self) -> bool {
		self.pressed && self.button == MouseButton::Right
	}
}

/// An OS-level click event source.
///
/// `subscribe` starts delivering events into `tx` until the returned
/// subscription is dropped or explicitly unsubscribed. Once detached the source
/// must drop `tx` so the receiving side sees the channel close.
pub trait ClickSource: Send + Sync {
	fn subscribe(&self, tx: Sender<ClickEvent>) -> Result<Box<dyn Subscription>, BotError>;
}

pub trait Subscription: Send {
	fn unsubscribe(self: Box<Self>);
}
