//! Tests for BotOrchestrator
//!
//! Verifies the per-tick evaluation order, command handling and error
//! isolation of the poll path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{BotOrchestrator, Command};
use crate::settings::{BotSettings, HealerSettings};
use crate::testing::{ChannelClickSource, RecordingSink, ScriptedPerception};
use crate::{HealKind, StatusReading};

fn orchestrator(settings: &BotSettings) -> (BotOrchestrator, Arc<RecordingSink>, ChannelClickSource) {
	let sink = RecordingSink::shared();
	let clicks = ChannelClickSource::default();
	let bot = BotOrchestrator::from_settings(settings, sink.clone(), Arc::new(clicks.clone()), Instant::now())
		.unwrap();
	(bot, sink, clicks)
}

fn healer_only() -> BotSettings {
	BotSettings {
		healer: HealerSettings {
			heal_threshold: 75,
			critical_threshold: 50,
			mana_threshold: 40,
			..Default::default()
		},
		..Default::default()
	}
}

fn reading(hp: u32, mana: u32) -> StatusReading {
	StatusReading::new(Some(hp), Some(mana))
}

#[test]
fn test_first_reading_only_detects_capacity() {
	let (mut bot, sink, _) = orchestrator(&healer_only());
	let now = Instant::now();

	// A critical drop on the very first reading is treated as 100%.
	let snap = bot.tick(now, reading(100, 50));
	assert_eq!(snap.heal, None);
	assert!(!snap.mana_restored);
	assert_eq!(snap.max_hp, Some(100));
	assert_eq!(snap.max_mana, Some(50));
	assert_eq!(snap.hp_percent, 100.0);
	assert!(sink.presses().is_empty());
}

#[test]
fn test_default_mode_heal_before_mana() {
	let (mut bot, sink, _) = orchestrator(&healer_only());
	let now = Instant::now();
	bot.tick(now, reading(1000, 1000));

	let snap = bot.tick(now, reading(700, 100));
	assert_eq!(snap.heal, Some(HealKind::Normal));
	assert!(!snap.mana_restored);
	assert_eq!(sink.presses(), vec!["F1"]);
	assert!(snap.heal_cooldown > Duration::ZERO);

	let later = now + Duration::from_secs(1);
	let snap = bot.tick(later, reading(900, 100));
	assert_eq!(snap.heal, None);
	assert!(snap.mana_restored);
	assert_eq!(sink.presses(), vec!["F1", "F4"]);
}

#[test]
fn test_potion_mode_mana_before_normal() {
	let mut settings = healer_only();
	settings.healer.critical_is_potion = true;
	let (mut bot, sink, _) = orchestrator(&settings);
	let now = Instant::now();
	bot.tick(now, reading(1000, 1000));

	// HP 70% (normal due), mana 20% (restore due): mana wins in potion mode.
	let snap = bot.tick(now, reading(700, 200));
	assert_eq!(snap.heal, None);
	assert!(snap.mana_restored);
	assert_eq!(sink.presses(), vec!["F4"]);

	// Critical beats mana.
	let snap = bot.tick(now + Duration::from_secs(1), reading(350, 200));
	assert_eq!(snap.heal, Some(HealKind::Critical));
	assert!(!snap.mana_restored);

	// Only normal heal due.
	let snap = bot.tick(now + Duration::from_secs(2), reading(700, 900));
	assert_eq!(snap.heal, Some(HealKind::Normal));
	assert_eq!(sink.presses(), vec!["F4", "F2", "F1"]);
}

#[test]
fn test_reading_max_seeds_capacity() {
	let (mut bot, sink, _) = orchestrator(&healer_only());
	let snap = bot.tick(
		Instant::now(),
		StatusReading {
			hp_current: Some(400),
			hp_max: Some(1000),
			mana_current: None,
			mana_max: None,
		},
	);
	assert_eq!(snap.max_hp, Some(1000));
	assert_eq!(snap.heal, Some(HealKind::Critical));
	assert_eq!(sink.presses(), vec!["F2"]);
}

#[test]
fn test_commands_take_effect_next_tick() {
	let (mut bot, sink, _) = orchestrator(&healer_only());
	let now = Instant::now();
	bot.tick(now, reading(1000, 1000));

	bot.apply(Command::HealEnabled(false), now);
	bot.apply(Command::CriticalEnabled(false), now);
	assert_eq!(bot.tick(now, reading(100, 1000)).heal, None);

	bot.apply(Command::CriticalEnabled(true), now);
	bot.apply(Command::CriticalHotkey("F9".into()), now);
	bot.apply(Command::CriticalThreshold(0), now);
	assert_eq!(bot.healer().critical_heal.threshold(), 50);
	assert_eq!(bot.tick(now, reading(100, 1000)).heal, Some(HealKind::Critical));
	assert_eq!(sink.presses(), vec!["F9"]);
}

#[test]
fn test_disabled_units_never_press() {
	let mut settings = healer_only();
	settings.healer.heal_enabled = false;
	settings.healer.critical_enabled = false;
	settings.healer.mana_enabled = false;
	let (mut bot, sink, _) = orchestrator(&settings);
	let t0 = Instant::now();

	for step in 0..50u64 {
		let now = t0 + Duration::from_secs(step * 30);
		bot.tick(now, reading(1 + step as u32 * 10, 1));
	}
	assert!(sink.presses().is_empty());
}

#[test]
fn test_eater_and_haste_run_on_tick() {
	let mut settings = healer_only();
	settings.healer.heal_enabled = false;
	settings.healer.critical_enabled = false;
	settings.healer.mana_enabled = false;
	settings.eater.enabled = true;
	settings.haste.enabled = true;
	let t0 = Instant::now();
	let sink = RecordingSink::shared();
	let mut bot =
		BotOrchestrator::from_settings(&settings, sink.clone(), Arc::new(ChannelClickSource::default()), t0).unwrap();

	let snap = bot.tick(t0, reading(1000, 1000));
	assert!(snap.ate);
	assert!(!snap.hasted);
	assert_eq!(sink.presses(), vec!["]", "]"]);
	let next_haste = snap.next_haste_in.unwrap().as_secs_f64();
	assert!((31.0..=33.0).contains(&next_haste), "{next_haste}");

	let snap = bot.tick(t0 + Duration::from_secs(34), reading(1000, 1000));
	assert!(!snap.ate);
	assert!(snap.hasted);
	assert_eq!(sink.presses(), vec!["]", "]", "x"]);
}

#[test]
fn test_reapplying_settings_keeps_timers() {
	let mut settings = healer_only();
	settings.haste.enabled = true;
	let t0 = Instant::now();
	let (mut bot, _, _) = orchestrator(&settings);
	let before = bot.haste().next_fire_at();

	bot.apply(Command::Apply(settings.clone()), t0 + Duration::from_secs(10));
	assert_eq!(bot.haste().next_fire_at(), before);
}

#[test]
fn test_unknown_food_command_is_ignored() {
	let (mut bot, _, _) = orchestrator(&healer_only());
	bot.apply(Command::FoodType("bread".into()), Instant::now());
	assert_eq!(bot.eater().food().key, "fire_mushroom");
	bot.apply(Command::FoodType("brown_mushroom".into()), Instant::now());
	assert_eq!(bot.eater().food().key, "brown_mushroom");
}

#[test]
fn test_poll_failure_is_reported_not_raised() {
	let (mut bot, sink, _) = orchestrator(&healer_only());
	let mut source = ScriptedPerception::new(vec![
		Ok(reading(1000, 1000)),
		Err("window lost".into()),
		Ok(reading(700, 1000)),
	]);
	let now = Instant::now();

	let snap = bot.poll(now, &mut source);
	assert!(!snap.failed);

	let snap = bot.poll(now, &mut source);
	assert!(snap.failed);
	assert_eq!(snap.hp, Some(1000));
	assert!(snap.message.as_deref().unwrap().contains("window lost"));

	let snap = bot.poll(now, &mut source);
	assert_eq!(snap.heal, Some(HealKind::Normal));
	assert_eq!(sink.presses(), vec!["F1"]);
}

#[test]
fn test_reset_capacity_command() {
	let (mut bot, _, _) = orchestrator(&healer_only());
	let now = Instant::now();
	bot.tick(now, reading(1000, 500));
	bot.apply(Command::ResetCapacity, now);
	let snap = bot.snapshot(now);
	assert_eq!(snap.max_hp, None);
	assert_eq!(snap.max_mana, None);

	let snap = bot.tick(now, reading(800, 300));
	assert_eq!(snap.max_hp, Some(800));
	assert_eq!(snap.max_mana, Some(300));
}

#[test]
fn test_listeners_follow_start_stop() {
	let mut settings = healer_only();
	settings.skinner.enabled = true;
	let (mut bot, sink, clicks) = orchestrator(&settings);

	bot.start_listeners().unwrap();
	assert!(bot.snapshot(Instant::now()).skinner_listening);
	assert!(clicks.right_click());
	assert!(sink.wait_for_presses(1, Duration::from_secs(5)));

	bot.stop_listeners();
	assert!(!clicks.is_subscribed());
	assert!(!bot.snapshot(Instant::now()).skinner_listening);
}
