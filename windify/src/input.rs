//! OS input: synthetic key presses out, mouse clicks in.
//!
//! Windows uses `SendInput` and a low-level mouse hook, macOS drives System
//! Events through `osascript`. Anywhere else presses are only logged and the
//! click source reports itself unavailable.

use std::sync::Arc;

use bot::{ActionSink, BotError, SharedSink, click::ClickSource};

/// A hotkey string resolved to something the OS layer can type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
	/// F1 to F12.
	Function(u8),
	Char(char),
}

impl Key {
	pub fn parse(hotkey: &str) -> Option<Self> {
		let hotkey = hotkey.trim();
		let mut chars = hotkey.chars();
		if let (Some(ch), None) = (chars.next(), chars.next()) {
			return Some(Self::Char(ch));
		}

		let upper = hotkey.to_ascii_uppercase();
		let n = upper.strip_prefix('F')?.parse::<u8>().ok()?;
		(1..=12).contains(&n).then_some(Self::Function(n))
	}
}

/// The key sink for this platform.
pub fn key_sink() -> SharedSink {
	Arc::new(platform::KeySink)
}

/// The click source for this platform.
pub fn click_source() -> Arc<dyn ClickSource> {
	Arc::new(platform::MouseHook)
}

fn press_parsed(hotkey: &str, press: impl FnOnce(Key)) {
	match Key::parse(hotkey) {
		Some(key) => press(key),
		None => tracing::warn!(%hotkey, "unsupported hotkey"),
	}
}

#[cfg(windows)]
mod platform {
	use std::sync::{Mutex, mpsc::Sender};
	use std::thread::JoinHandle;

	use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
	use windows::Win32::System::Threading::GetCurrentThreadId;
	use windows::Win32::UI::Input::KeyboardAndMouse::{
		INPUT, INPUT_0, INPUT_KEYBOARD, KEYBD_EVENT_FLAGS, KEYBDINPUT, KEYEVENTF_KEYUP, SendInput, VIRTUAL_KEY,
		VK_F1, VkKeyScanW,
	};
	use windows::Win32::UI::WindowsAndMessaging::{
		CallNextHookEx, GetMessageW, MSG, PostThreadMessageW, SetWindowsHookExW, UnhookWindowsHookEx, WH_MOUSE_LL,
		WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP,
	};

	use super::*;
	use bot::click::{ClickEvent, MouseButton, Subscription};

	pub struct KeySink;

	impl ActionSink for KeySink {
		fn press(&self, hotkey: &str) {
			press_parsed(hotkey, |key| {
				let vk = match key {
					Key::Function(n) => VIRTUAL_KEY(VK_F1.0 + (n as u16 - 1)),
					Key::Char(ch) => {
						let mut buf = [0u16; 2];
						let scan = unsafe { VkKeyScanW(ch.encode_utf16(&mut buf)[0]) };
						if scan == -1 {
							tracing::warn!(%hotkey, "no virtual key for character");
							return;
						}
						VIRTUAL_KEY((scan as u16) & 0xff)
					}
				};

				let input = |flags: KEYBD_EVENT_FLAGS| INPUT {
					r#type: INPUT_KEYBOARD,
					Anonymous: INPUT_0 {
						ki: KEYBDINPUT {
							wVk: vk,
							wScan: 0,
							dwFlags: flags,
							time: 0,
							dwExtraInfo: 0,
						},
					},
				};
				let inputs = [input(KEYBD_EVENT_FLAGS(0)), input(KEYEVENTF_KEYUP)];
				let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
				if sent as usize != inputs.len() {
					tracing::warn!(%hotkey, sent, "SendInput dropped events");
				}
			});
		}
	}

	/// Events from the hook procedure go here while a subscription is live.
	static HOOK_TX: Mutex<Option<Sender<ClickEvent>>> = Mutex::new(None);

	pub struct MouseHook;

	impl ClickSource for MouseHook {
		fn subscribe(&self, tx: Sender<ClickEvent>) -> Result<Box<dyn Subscription>, BotError> {
			{
				let mut slot = HOOK_TX.lock().expect("hook sender poisoned");
				if slot.is_some() {
					return Err(BotError::ClickSourceUnavailable("mouse hook already installed".into()));
				}
				*slot = Some(tx);
			}

			let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<u32, String>>();
			let spawned = std::thread::Builder::new()
				.name("mouse-hook".to_string())
				.spawn(move || hook_thread(ready_tx));
			let thread = match spawned {
				Ok(thread) => thread,
				Err(err) => {
					HOOK_TX.lock().expect("hook sender poisoned").take();
					return Err(err.into());
				}
			};

			match ready_rx.recv() {
				Ok(Ok(thread_id)) => Ok(Box::new(HookSubscription { thread_id, thread })),
				Ok(Err(err)) => {
					HOOK_TX.lock().expect("hook sender poisoned").take();
					let _ = thread.join();
					Err(BotError::ClickSourceUnavailable(err))
				}
				Err(_) => {
					HOOK_TX.lock().expect("hook sender poisoned").take();
					Err(BotError::ClickSourceUnavailable("mouse hook thread exited".into()))
				}
			}
		}
	}

	struct HookSubscription {
		thread_id: u32,
		thread: JoinHandle<()>,
	}

	impl Subscription for HookSubscription {
		fn unsubscribe(self: Box<Self>) {
			unsafe {
				if let Err(err) = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) {
					tracing::warn!(error = %err, "could not stop mouse hook thread");
				}
			}
			if self.thread.join().is_err() {
				tracing::warn!("mouse hook thread panicked");
			}
			// Dropping the sender closes the listener's channel.
			HOOK_TX.lock().expect("hook sender poisoned").take();
		}
	}

	fn hook_thread(ready: std::sync::mpsc::Sender<Result<u32, String>>) {
		let hook = match unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_proc), None, 0) } {
			Ok(hook) => hook,
			Err(err) => {
				let _ = ready.send(Err(err.to_string()));
				return;
			}
		};
		let _ = ready.send(Ok(unsafe { GetCurrentThreadId() }));
		tracing::debug!("mouse hook installed");

		let mut msg = MSG::default();
		// Low-level hooks only run while this thread pumps messages.
		while unsafe { GetMessageW(&mut msg, None, 0, 0) }.as_bool() {}

		if let Err(err) = unsafe { UnhookWindowsHookEx(hook) } {
			tracing::warn!(error = %err, "UnhookWindowsHookEx failed");
		}
		tracing::debug!("mouse hook removed");
	}

	unsafe extern "system" fn mouse_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
		if code >= 0 {
			let event = match wparam.0 as u32 {
				WM_LBUTTONDOWN => Some((MouseButton::Left, true)),
				WM_LBUTTONUP => Some((MouseButton::Left, false)),
				WM_RBUTTONDOWN => Some((MouseButton::Right, true)),
				WM_RBUTTONUP => Some((MouseButton::Right, false)),
				WM_MBUTTONDOWN => Some((MouseButton::Middle, true)),
				WM_MBUTTONUP => Some((MouseButton::Middle, false)),
				_ => None,
			};
			if let Some((button, pressed)) = event
				&& let Ok(slot) = HOOK_TX.try_lock()
				&& let Some(tx) = slot.as_ref()
			{
				let _ = tx.send(ClickEvent { button, pressed });
			}
		}
		unsafe { CallNextHookEx(None, code, wparam, lparam) }
	}
}

#[cfg(target_os = "macos")]
mod platform {
	use std::process::Command;
	use std::sync::mpsc::Sender;

	use super::*;
	use bot::click::{ClickEvent, Subscription};

	pub struct KeySink;

	impl ActionSink for KeySink {
		fn press(&self, hotkey: &str) {
			press_parsed(hotkey, |key| {
				let action = match key {
					Key::Function(n) => format!("key code {}", function_key_code(n)),
					Key::Char('"') => "keystroke quote".to_string(),
					Key::Char('\\') => "keystroke \"\\\\\"".to_string(),
					Key::Char(ch) => format!("keystroke \"{ch}\""),
				};
				let script = format!("tell application \"System Events\" to {action}");
				match Command::new("osascript").arg("-e").arg(&script).output() {
					Ok(out) if !out.status.success() => {
						tracing::warn!(%hotkey, stderr = %String::from_utf8_lossy(&out.stderr).trim(), "osascript failed");
					}
					Ok(_) => {}
					Err(err) => tracing::warn!(%hotkey, error = %err, "osascript not runnable"),
				}
			});
		}
	}

	fn function_key_code(n: u8) -> u16 {
		const CODES: [u16; 12] = [122, 120, 99, 118, 96, 97, 98, 100, 101, 109, 103, 111];
		CODES[(n as usize - 1).min(11)]
	}

	pub struct MouseHook;

	impl ClickSource for MouseHook {
		fn subscribe(&self, _tx: Sender<ClickEvent>) -> Result<Box<dyn Subscription>, BotError> {
			Err(BotError::ClickSourceUnavailable(
				"global mouse events need an event tap, which this build does not install".into(),
			))
		}
	}
}

#[cfg(not(any(windows, target_os = "macos")))]
mod platform {
	use std::sync::mpsc::Sender;

	use super::*;
	use bot::click::{ClickEvent, Subscription};

	/// Dry run: logs what would be pressed.
	pub struct KeySink;

	impl ActionSink for KeySink {
		fn press(&self, hotkey: &str) {
			press_parsed(hotkey, |key| tracing::info!(?key, "key press (dry run)"));
		}
	}

	pub struct MouseHook;

	impl ClickSource for MouseHook {
		fn subscribe(&self, _tx: Sender<ClickEvent>) -> Result<Box<dyn Subscription>, BotError> {
			Err(BotError::ClickSourceUnavailable("no global mouse hook on this platform".into()))
		}
	}
}
