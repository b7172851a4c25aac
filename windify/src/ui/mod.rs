use std::sync::{Arc, mpsc::Receiver};
use std::time::Duration;

use bot::{Command, StatusSnapshot};

mod ext;
pub use ext::UiExt;

mod region;
mod settings;

use crate::botloop::{BotLoop, LoopEvent, ScreenPerception};
use crate::watcher::ConfigWatcher;

/// UI refresh while the bot runs.
const REPAINT: Duration = Duration::from_millis(100);

pub struct Windify {
	ie: Arc<ie::Ie>,
	bot_loop: Option<BotLoop>,
	events: Receiver<LoopEvent>,
	watcher: Option<ConfigWatcher>,
	regions: region::RegionTool,

	snapshot: StatusSnapshot,
	status: String,
	tab: Tab,
}

impl Windify {
	pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
		let ie = Arc::new(match crate::assets::resolve_ocr_assets() {
			Ok(assets) => ie::Ie::new(assets.detection, assets.recognition, assets.charset),
			Err(err) => {
				tracing::warn!(error = %format!("{err:#}"), "OCR assets missing");
				ie::Ie::without_ocr(format!("{err:#}"))
			}
		});

		let (settings, poll_delay) = {
			let config = crate::config_read();
			(config.bot.clone(), config.poll_delay())
		};

		let (tx, events) = std::sync::mpsc::channel();
		let (bot_loop, status) = match BotLoop::spawn(
			&settings,
			poll_delay,
			crate::input::key_sink(),
			crate::input::click_source(),
			Box::new(ScreenPerception::new(ie.clone())),
			tx,
		) {
			Ok(bot_loop) => (Some(bot_loop), crate::tr!("status-stopped")),
			Err(err) => {
				tracing::error!(error = %format!("{err:#}"), "bot loop failed to start");
				(None, format!("{err:#}"))
			}
		};

		let watcher = crate::config::Config::path()
			.ok()
			.and_then(|path| match ConfigWatcher::new(&path) {
				Ok(watcher) => Some(watcher),
				Err(err) => {
					tracing::warn!(error = %err, "config file will not be watched");
					None
				}
			});

		Self {
			ie,
			bot_loop,
			events,
			watcher,
			regions: region::RegionTool::default(),
			snapshot: StatusSnapshot::default(),
			status,
			tab: Tab::Bot,
		}
	}

	fn send(&self, commands: Vec<Command>) {
		if let Some(bot_loop) = &self.bot_loop {
			for command in commands {
				bot_loop.send(command);
			}
		}
	}

	fn drain_events(&mut self) {
		while let Ok(event) = self.events.try_recv() {
			match event {
				LoopEvent::Started => self.status = crate::tr!("status-running"),
				LoopEvent::Stopped => self.status = crate::tr!("status-stopped"),
				LoopEvent::WindowMissing => self.status = crate::tr!("status-window-missing"),
				LoopEvent::ListenerError(err) => self.status = format!("{}: {err}", crate::tr!("skinner")),
				LoopEvent::Snapshot(snapshot) => {
					self.status = snapshot.message.clone().unwrap_or_else(|| crate::tr!("status-running"));
					self.snapshot = snapshot;
				}
			}
		}
	}

	/// Reload the config after an external edit and push it into the bot.
	fn reload_config(&mut self) {
		let fresh = match crate::config::Config::try_load() {
			Ok(fresh) => fresh,
			Err(err) => {
				tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable config edit");
				return;
			}
		};

		let mut config = crate::config();
		if *config == fresh {
			return;
		}
		let commands = settings::bot_commands(&config.bot, &fresh.bot);
		let poll_delay = fresh.poll_delay();
		*config = fresh;
		drop(config);

		tracing::info!(commands = commands.len(), "config reloaded from disk");
		self.send(commands);
		if let Some(bot_loop) = &self.bot_loop {
			bot_loop.set_poll_delay(poll_delay);
		}
	}

	fn apply(&self, changes: settings::Changes) {
		if changes.save {
			let config = crate::config_read();
			if let Err(err) = config.save() {
				tracing::warn!(error = %format!("{err:#}"), "config not saved");
			}
			if let Some(bot_loop) = &self.bot_loop {
				bot_loop.set_poll_delay(config.poll_delay());
			}
		}
		self.send(changes.commands);
	}

	/// Store a region picked on a capture.
	fn set_region(&self, bar: region::Bar, picked: ie::Region) {
		let mut config = crate::config();
		*bar.slot(&mut config.regions) = Some(picked);
		if let Err(err) = config.save() {
			tracing::warn!(error = %format!("{err:#}"), "config not saved");
		}
		drop(config);
		tracing::info!(?bar, ?picked, "region picked");
		self.send(vec![Command::ResetCapacity]);
	}

	fn ui_status(&self, ui: &mut egui::Ui) {
		if !self.ie.ocr_available() {
			ui.group(|ui| {
				ui.label(egui::RichText::new(crate::tr!("ocr-missing")).strong());
				if let Some(err) = self.ie.ocr_init_error() {
					ui.add_space(4.0);
					ui.small(err);
				}
			});
			ui.add_space(6.0);
		}

		let snap = &self.snapshot;
		ui.label(format!("{}: {}", crate::tr!("hp"), value_text(snap.hp, snap.max_hp, snap.hp_percent)));
		ui.label(format!("{}: {}", crate::tr!("mana"), value_text(snap.mana, snap.max_mana, snap.mana_percent)));

		ui.horizontal(|ui| {
			ui.label(format!("{}: {:.1}s", crate::tr!("heal-cooldown"), snap.heal_cooldown.as_secs_f32()));
			if ui.small_button(crate::tr!("clear")).clicked() {
				self.send(vec![Command::ClearCooldown]);
			}
		});
		if let Some(left) = snap.next_eat_in {
			ui.label(format!("{}: {}", crate::tr!("next-eat"), clock(left)));
		}
		if let Some(left) = snap.next_haste_in {
			ui.label(format!("{}: {}", crate::tr!("next-haste"), clock(left)));
		}
		if snap.skinner_listening {
			ui.label(crate::tr!("skinner-listening"));
		}

		ui.horizontal(|ui| {
			if ui.button(crate::tr!("reset-capacity")).clicked() {
				self.send(vec![Command::ResetCapacity]);
			}
		});

		ui.spacer();
		let running = self.bot_loop.as_ref().is_some_and(BotLoop::is_running);
		ui.horizontal(|ui| {
			let label = if running { crate::tr!("stop") } else { crate::tr!("start") };
			let can_start = running || crate::config_read().regions.is_hp_configured();
			if ui.add_enabled(can_start, egui::Button::new(label)).clicked()
				&& let Some(bot_loop) = &self.bot_loop
			{
				if running {
					bot_loop.stop();
				} else {
					bot_loop.start();
				}
			}
			ui.label(&self.status);
		});
	}
}

impl eframe::App for Windify {
	fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
		if self.watcher.as_ref().is_some_and(ConfigWatcher::changed) {
			self.reload_config();
		}
		self.drain_events();

		egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
			ui.horizontal(|ui| {
				ui.selectable_value(&mut self.tab, Tab::Bot, crate::tr!("tab-bot"));
				ui.selectable_value(&mut self.tab, Tab::Settings, crate::tr!("tab-settings"));
			});
		});

		egui::CentralPanel::default().show(ctx, |ui| {
			egui::ScrollArea::vertical().show(ui, |ui| match self.tab {
				Tab::Bot => {
					self.ui_status(ui);
					ui.spacer();
					let changes = settings::bot_ui(ui);
					self.apply(changes);
				}
				Tab::Settings => {
					let mut changes = settings::app_ui(ui, &self.regions);
					let action = changes.region_action.take();
					self.apply(changes);
					if let Some(action) = action {
						self.regions.run(ui.ctx(), &self.ie, action);
					}
				}
			});
		});

		if let Some((bar, picked)) = self.regions.show_picker(ctx) {
			self.set_region(bar, picked);
		}

		ctx.request_repaint_after(REPAINT);
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tab {
	Bot,
	Settings,
}

fn value_text(current: Option<u32>, max: Option<u32>, percent: f64) -> String {
	match (current, max) {
		(Some(current), Some(max)) => format!("{current}/{max} ({percent:.0}%)"),
		(Some(current), None) => current.to_string(),
		_ => "?".to_string(),
	}
}

fn clock(d: Duration) -> String {
	let secs = d.as_secs();
	format!("{}:{:02}", secs / 60, secs % 60)
}
