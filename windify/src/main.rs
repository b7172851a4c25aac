//! Windify: a screen-reading helper bot with an always-on-top egui overlay.
//!
//! The window hosts the controls; a background thread captures the game
//! window, reads HP/mana and drives the bot.

use std::sync::{LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod assets;
mod botloop;
mod capture;
mod config;
mod i18n;
mod input;
mod ui;
mod watcher;

static CONFIG: LazyLock<RwLock<config::Config>> = LazyLock::new(|| RwLock::new(config::Config::load_or_default()));

/// Mutable access to the global config. Do not hold across a capture.
pub fn config() -> RwLockWriteGuard<'static, config::Config> {
	CONFIG.write().expect("config lock poisoned")
}

pub fn config_read() -> RwLockReadGuard<'static, config::Config> {
	CONFIG.read().expect("config lock poisoned")
}

fn main() -> eframe::Result {
	// Structured logging. Use `RUST_LOG=info` etc.
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	let locale = config_read().locale.clone();
	i18n::init(locale.as_deref());

	let options = eframe::NativeOptions {
		viewport: egui::ViewportBuilder::default()
			.with_title("Windify")
			.with_inner_size([360.0, 560.0])
			.with_always_on_top(),
		..Default::default()
	};

	eframe::run_native("Windify", options, Box::new(|cc| Ok(Box::new(ui::Windify::new(cc)))))
}
