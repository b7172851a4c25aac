use bot::{
	Command,
	eater::FOODS,
	settings::{BotSettings, HealerSettings},
};

use crate::ui::{
	ext::UiExt,
	region::{Action, Bar, RegionTool},
};

/// What the settings panel changed this frame.
#[derive(Debug, Default)]
pub struct Changes {
	/// Persist the config.
	pub save: bool,
	/// Commands for the running bot.
	pub commands: Vec<Command>,
	/// Region button pressed this frame.
	pub region_action: Option<Action>,
}

/// Per-unit controls. Edits go to the global config and come back as commands.
pub fn bot_ui(ui: &mut egui::Ui) -> Changes {
	let mut config = crate::config();
	let before = config.bot.clone();
	let bot = &mut config.bot;

	healer_ui(ui, &mut bot.healer);
	ui.spacer();

	ui.horizontal(|ui| {
		ui.checkbox(&mut bot.eater.enabled, crate::tr!("eater"));
		ui.hotkey_edit("eater", &mut bot.eater.hotkey);
	});
	let selected = FOODS
		.iter()
		.find(|f| f.key == bot.eater.food_type)
		.map_or_else(|| bot.eater.food_type.clone(), |f| f.name.to_string());
	egui::ComboBox::from_id_salt("food_type")
		.selected_text(selected)
		.show_ui(ui, |ui| {
			for food in FOODS {
				ui.selectable_value(&mut bot.eater.food_type, food.key.to_string(), food.name);
			}
		});

	ui.horizontal(|ui| {
		ui.checkbox(&mut bot.haste.enabled, crate::tr!("haste"));
		ui.hotkey_edit("haste", &mut bot.haste.hotkey);
	});
	ui.horizontal(|ui| {
		ui.checkbox(&mut bot.skinner.enabled, crate::tr!("skinner"));
		ui.hotkey_edit("skinner", &mut bot.skinner.hotkey);
	});

	let commands = bot_commands(&before, bot);
	Changes {
		save: !commands.is_empty(),
		commands,
		region_action: None,
	}
}

fn healer_ui(ui: &mut egui::Ui, healer: &mut HealerSettings) {
	let row = |ui: &mut egui::Ui, enabled: &mut bool, label: String, threshold: &mut u8, hotkey: &mut String| {
		ui.horizontal(|ui| {
			ui.checkbox(enabled, label.as_str());
			ui.add(
				egui::DragValue::new(threshold)
					.range(bot::ThresholdConfig::MIN..=bot::ThresholdConfig::MAX)
					.suffix("%"),
			);
			ui.hotkey_edit(&label, hotkey);
		});
	};

	row(ui, &mut healer.heal_enabled, crate::tr!("heal"), &mut healer.heal_threshold, &mut healer.heal_hotkey);
	row(
		ui,
		&mut healer.critical_enabled,
		crate::tr!("critical-heal"),
		&mut healer.critical_threshold,
		&mut healer.critical_hotkey,
	);
	row(ui, &mut healer.mana_enabled, crate::tr!("mana-restore"), &mut healer.mana_threshold, &mut healer.mana_hotkey);
	ui.checkbox(&mut healer.critical_is_potion, crate::tr!("critical-is-potion"));
}

/// App-level settings: target window, pacing, regions, config file.
pub fn app_ui(ui: &mut egui::Ui, tool: &RegionTool) -> Changes {
	let mut config = crate::config();
	let before = config.clone();

	ui.combo_cached(&mut config.app_name, &crate::tr!("target-window"), crate::capture::list_app_names);
	ui.num_edit_range(
		&mut config.refresh_rate,
		&crate::tr!("refresh-rate"),
		crate::config::MIN_REFRESH_RATE..=crate::config::MAX_REFRESH_RATE,
	);

	ui.spacer();
	ui.label(crate::tr!("regions"));
	let mut changes = Changes::default();
	for (bar, label) in [(Bar::Hp, crate::tr!("hp")), (Bar::Mana, crate::tr!("mana"))] {
		if let Some(action) = region_ui(ui, &label, bar.slot(&mut config.regions), bar) {
			changes.region_action = Some(action);
		}
		if let Some(check) = tool.check(bar) {
			ui.small(check);
		}
	}
	ui.horizontal(|ui| {
		if ui.button(crate::tr!("reset-regions")).clicked() {
			config.reset_regions();
			changes.commands.push(Command::ResetCapacity);
		}
		if ui.button(crate::tr!("reset-config")).clicked() {
			if let Err(err) = config.reset() {
				tracing::warn!(error = %format!("{err:#}"), "config reset failed");
			}
			changes.commands.push(Command::Apply(config.bot.clone()));
			changes.commands.push(Command::ResetCapacity);
		}
	});

	changes.save = *config != before;
	changes
}

fn region_ui(ui: &mut egui::Ui, label: &str, region: &mut Option<ie::Region>, bar: Bar) -> Option<Action> {
	let mut action = None;
	ui.horizontal(|ui| {
		let mut enabled = region.is_some();
		if ui.checkbox(&mut enabled, label).changed() {
			*region = enabled.then(|| ie::Region::new(0, 0, 80, 20));
		}
		if let Some(r) = region {
			for (value, name) in [(&mut r.x, "x"), (&mut r.y, "y"), (&mut r.width, "w"), (&mut r.height, "h")] {
				ui.add(egui::DragValue::new(value).prefix(format!("{name} ")));
			}
			if ui.small_button(crate::tr!("test-region")).clicked() {
				action = Some(Action::Test(bar));
			}
		}
		if ui.small_button(crate::tr!("pick-region")).clicked() {
			action = Some(Action::Pick(bar));
		}
	});
	action
}

/// Commands that move a bot configured with `old` to `new`.
pub fn bot_commands(old: &BotSettings, new: &BotSettings) -> Vec<Command> {
	let mut out = Vec::new();
	let mut push_if = |changed: bool, cmd: Command| {
		if changed {
			out.push(cmd);
		}
	};

	let (o, n) = (&old.healer, &new.healer);
	push_if(o.heal_enabled != n.heal_enabled, Command::HealEnabled(n.heal_enabled));
	push_if(o.heal_threshold != n.heal_threshold, Command::HealThreshold(n.heal_threshold as i32));
	push_if(o.heal_hotkey != n.heal_hotkey, Command::HealHotkey(n.heal_hotkey.clone()));
	push_if(o.critical_enabled != n.critical_enabled, Command::CriticalEnabled(n.critical_enabled));
	push_if(
		o.critical_threshold != n.critical_threshold,
		Command::CriticalThreshold(n.critical_threshold as i32),
	);
	push_if(o.critical_hotkey != n.critical_hotkey, Command::CriticalHotkey(n.critical_hotkey.clone()));
	push_if(o.mana_enabled != n.mana_enabled, Command::ManaEnabled(n.mana_enabled));
	push_if(o.mana_threshold != n.mana_threshold, Command::ManaThreshold(n.mana_threshold as i32));
	push_if(o.mana_hotkey != n.mana_hotkey, Command::ManaHotkey(n.mana_hotkey.clone()));
	push_if(o.critical_is_potion != n.critical_is_potion, Command::CriticalIsPotion(n.critical_is_potion));

	let (o, n) = (&old.eater, &new.eater);
	push_if(o.food_type != n.food_type, Command::FoodType(n.food_type.clone()));
	push_if(o.hotkey != n.hotkey, Command::EaterHotkey(n.hotkey.clone()));
	push_if(o.enabled != n.enabled, Command::EaterEnabled(n.enabled));

	push_if(old.haste.hotkey != new.haste.hotkey, Command::HasteHotkey(new.haste.hotkey.clone()));
	push_if(old.haste.enabled != new.haste.enabled, Command::HasteEnabled(new.haste.enabled));

	push_if(old.skinner.hotkey != new.skinner.hotkey, Command::SkinnerHotkey(new.skinner.hotkey.clone()));
	push_if(old.skinner.enabled != new.skinner.enabled, Command::SkinnerEnabled(new.skinner.enabled));

	out
}
