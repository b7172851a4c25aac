//! Tests for ThresholdHealer
//!
//! Covers threshold strictness, critical priority, the shared cooldown and
//! capacity detection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{GLOBAL_COOLDOWN, HealKind, ThresholdHealer};
use crate::testing::RecordingSink;

fn healer() -> (ThresholdHealer, Arc<RecordingSink>) {
	let sink = RecordingSink::shared();
	let mut healer = ThresholdHealer::new(sink.clone());
	healer.set_max_hp(1000);
	healer.set_heal_threshold(75);
	healer.set_critical_threshold(50);
	healer.toggle_heal(true);
	healer.toggle_critical_heal(true);
	(healer, sink)
}

fn potion_healer() -> (ThresholdHealer, Arc<RecordingSink>) {
	let sink = RecordingSink::shared();
	let mut healer = ThresholdHealer::new(sink.clone());
	healer.set_max_hp(1000);
	healer.set_max_mana(1000);
	healer.toggle_critical_heal(true);
	healer.set_critical_threshold(50);
	healer.set_critical_hotkey("F2");
	healer.toggle_mana(true);
	healer.set_mana_threshold(40);
	healer.set_mana_hotkey("F4");
	healer.set_critical_is_potion(true);
	(healer, sink)
}

// Heal

#[test]
fn test_normal_then_cooldown_then_critical() {
	let (mut healer, sink) = healer();
	let now = Instant::now();

	assert_eq!(healer.check_and_heal(now, Some(700)), Some(HealKind::Normal));
	assert_eq!(healer.check_and_heal(now, Some(700)), None);
	assert_eq!(sink.presses(), vec!["F1"]);

	healer.clear_cooldown();
	assert_eq!(healer.check_and_heal(now, Some(400)), Some(HealKind::Critical));
	assert_eq!(sink.presses(), vec!["F1", "F2"]);
}

#[test]
fn test_exact_threshold_does_not_trigger() {
	let (mut healer, sink) = healer();
	let now = Instant::now();

	assert_eq!(healer.check_and_heal(now, Some(750)), None);
	healer.toggle_heal(false);
	assert_eq!(healer.check_and_heal(now, Some(500)), None);
	assert!(sink.presses().is_empty());
}

#[test]
fn test_critical_preempts_normal() {
	let (mut healer, sink) = healer();
	assert_eq!(healer.check_and_heal(Instant::now(), Some(100)), Some(HealKind::Critical));
	assert_eq!(sink.presses(), vec!["F2"]);
}

#[test]
fn test_normal_fires_when_critical_disabled() {
	let (mut healer, sink) = healer();
	healer.toggle_critical_heal(false);
	assert_eq!(healer.check_and_heal(Instant::now(), Some(100)), Some(HealKind::Normal));
	assert_eq!(sink.presses(), vec!["F1"]);
}

#[test]
fn test_below_threshold_fires_bound_hotkey_once() {
	for hp in [1u32, 250, 499, 500, 600, 749] {
		let (mut healer, sink) = healer();
		healer.set_heal_hotkey("F7");
		healer.set_critical_hotkey("F8");
		let expected = if hp < 500 { HealKind::Critical } else { HealKind::Normal };
		let hotkey = if hp < 500 { "F8" } else { "F7" };

		assert_eq!(healer.check_and_heal(Instant::now(), Some(hp)), Some(expected), "hp={hp}");
		assert_eq!(sink.presses(), vec![hotkey], "hp={hp}");
	}
}

#[test]
fn test_cooldown_expires_after_interval() {
	let (mut healer, sink) = healer();
	let t0 = Instant::now();

	assert!(healer.check_and_heal(t0, Some(700)).is_some());
	assert!(healer.is_on_cooldown(t0 + Duration::from_millis(999)));
	assert_eq!(healer.check_and_heal(t0 + Duration::from_millis(999), Some(100)), None);
	assert_eq!(healer.cooldown_remaining(t0 + Duration::from_millis(400)), Duration::from_millis(600));

	assert!(!healer.is_on_cooldown(t0 + GLOBAL_COOLDOWN));
	assert_eq!(healer.check_and_heal(t0 + GLOBAL_COOLDOWN, Some(100)), Some(HealKind::Critical));
	assert_eq!(sink.press_count(), 2);
}

#[test]
fn test_disabled_never_presses() {
	let (mut healer, sink) = healer();
	healer.toggle_heal(false);
	healer.toggle_critical_heal(false);
	healer.toggle_mana(false);
	healer.set_max_mana(1000);

	let now = Instant::now();
	for value in [1u32, 100, 499, 700, 999] {
		healer.clear_cooldown();
		assert_eq!(healer.check_and_heal(now, Some(value)), None);
		assert!(!healer.check_and_restore_mana(now, Some(value)));
		assert_eq!(healer.check_critical_and_mana_with_priority(now, Some(value), Some(value)), (None, false));
	}
	assert!(sink.presses().is_empty());
}

#[test]
fn test_threshold_setters_reject_out_of_range() {
	let (mut healer, _) = healer();
	healer.set_heal_threshold(0);
	healer.set_heal_threshold(100);
	healer.set_critical_threshold(0);
	healer.set_critical_threshold(100);
	healer.set_mana_threshold(0);
	healer.set_mana_threshold(100);

	assert_eq!(healer.heal.threshold(), 75);
	assert_eq!(healer.critical_heal.threshold(), 50);
	assert_eq!(healer.mana_restore.threshold(), 60);
}

// Capacity

#[test]
fn test_auto_detect_uses_first_reading_only() {
	let sink = RecordingSink::shared();
	let mut healer = ThresholdHealer::new(sink.clone());
	healer.toggle_heal(true);
	let now = Instant::now();

	assert_eq!(healer.check_and_heal(now, None), None);
	assert_eq!(healer.max_hp(), None);
	assert_eq!(healer.check_and_heal(now, Some(0)), None);
	assert_eq!(healer.max_hp(), None);

	// The first reading becomes max, so it is 100% and nothing fires.
	assert_eq!(healer.check_and_heal(now, Some(800)), None);
	assert_eq!(healer.max_hp(), Some(800));

	// A later, higher reading does not raise (or lower) the capacity.
	healer.check_and_heal(now, Some(1200));
	assert_eq!(healer.max_hp(), Some(800));

	assert_eq!(healer.check_and_heal(now, Some(500)), Some(HealKind::Normal));
	assert_eq!(sink.presses(), vec!["F1"]);
}

#[test]
fn test_reset_capacity_redetects() {
	let (mut healer, _) = healer();
	healer.set_max_mana(300);
	healer.reset_capacity();
	assert_eq!(healer.max_hp(), None);
	assert_eq!(healer.max_mana(), None);

	healer.auto_detect_max_hp(Some(420));
	healer.auto_detect_max_mana(Some(90));
	assert_eq!(healer.max_hp(), Some(420));
	assert_eq!(healer.max_mana(), Some(90));
}

#[test]
fn test_percent_of_unknown_is_safe() {
	assert_eq!(ThresholdHealer::percent_of(None, Some(100)), 100.0);
	assert_eq!(ThresholdHealer::percent_of(Some(0), Some(100)), 100.0);
	assert_eq!(ThresholdHealer::percent_of(Some(40), None), 100.0);
	assert_eq!(ThresholdHealer::percent_of(Some(40), Some(100)), 40.0);
	// OCR noise may report current above max.
	assert_eq!(ThresholdHealer::percent_of(Some(150), Some(100)), 150.0);
}

#[test]
fn test_set_max_ignores_zero() {
	let (mut healer, _) = healer();
	healer.set_max_hp(0);
	assert_eq!(healer.max_hp(), Some(1000));
}

// Mana

#[test]
fn test_mana_below_threshold_restores() {
	let sink = RecordingSink::shared();
	let mut healer = ThresholdHealer::new(sink.clone());
	healer.set_max_mana(1000);
	healer.toggle_mana(true);
	healer.set_mana_threshold(60);
	let now = Instant::now();

	assert!(!healer.check_and_restore_mana(now, Some(700)));
	assert!(!healer.check_and_restore_mana(now, Some(600)));
	assert!(healer.check_and_restore_mana(now, Some(599)));
	assert!(!healer.check_and_restore_mana(now, Some(500)));
	assert_eq!(sink.presses(), vec!["F4"]);
}

#[test]
fn test_mana_respects_cooldown_from_heal() {
	let (mut healer, sink) = healer();
	healer.set_max_mana(1000);
	healer.toggle_mana(true);
	let now = Instant::now();

	assert_eq!(healer.check_and_heal(now, Some(700)), Some(HealKind::Normal));
	assert!(!healer.check_and_restore_mana(now + Duration::from_millis(500), Some(100)));
	assert_eq!(sink.presses(), vec!["F1"]);
}

// Potion mode

#[test]
fn test_potion_critical_beats_mana() {
	let (mut healer, sink) = potion_healer();
	let result = healer.check_critical_and_mana_with_priority(Instant::now(), Some(350), Some(200));
	assert_eq!(result, (Some(HealKind::Critical), false));
	assert_eq!(sink.presses(), vec!["F2"]);
}

#[test]
fn test_potion_mana_when_hp_safe() {
	let (mut healer, sink) = potion_healer();
	let result = healer.check_critical_and_mana_with_priority(Instant::now(), Some(800), Some(200));
	assert_eq!(result, (None, true));
	assert_eq!(sink.presses(), vec!["F4"]);
}

#[test]
fn test_potion_nothing_when_both_safe() {
	let (mut healer, sink) = potion_healer();
	let result = healer.check_critical_and_mana_with_priority(Instant::now(), Some(800), Some(800));
	assert_eq!(result, (None, false));
	assert!(sink.presses().is_empty());
}

#[test]
fn test_potion_cooldown_blocks_mana_after_critical() {
	let (mut healer, sink) = potion_healer();
	let now = Instant::now();

	healer.check_critical_and_mana_with_priority(now, Some(350), Some(800));
	sink.clear();

	let result = healer.check_critical_and_mana_with_priority(now, Some(800), Some(200));
	assert_eq!(result, (None, false));
	assert!(sink.presses().is_empty());
}

#[test]
fn test_potion_disabled_slots() {
	let (mut healer, sink) = potion_healer();
	healer.toggle_critical_heal(false);
	let result = healer.check_critical_and_mana_with_priority(Instant::now(), Some(350), Some(200));
	assert_eq!(result, (None, true));
	assert_eq!(sink.presses(), vec!["F4"]);

	let (mut healer, sink) = potion_healer();
	healer.toggle_mana(false);
	let result = healer.check_critical_and_mana_with_priority(Instant::now(), Some(350), Some(200));
	assert_eq!(result, (Some(HealKind::Critical), false));
	assert_eq!(sink.presses(), vec!["F2"]);
}

#[test]
fn test_potion_boundaries() {
	let (mut healer, _) = potion_healer();
	let now = Instant::now();
	let cases = [
		(501, 401, None, false),
		(500, 400, None, false),
		(499, 401, Some(HealKind::Critical), false),
		(501, 399, None, true),
		(499, 399, Some(HealKind::Critical), false),
		(1, 200, Some(HealKind::Critical), false),
		(800, 1, None, true),
	];

	for (hp, mana, heal, restored) in cases {
		healer.clear_cooldown();
		assert_eq!(
			healer.check_critical_and_mana_with_priority(now, Some(hp), Some(mana)),
			(heal, restored),
			"hp={hp} mana={mana}"
		);
	}
}

#[test]
fn test_potion_critical_never_loses_to_mana() {
	let (mut healer, _) = potion_healer();
	let now = Instant::now();
	for hp in (1..500).step_by(37) {
		for mana in (1..400).step_by(41) {
			healer.clear_cooldown();
			let result = healer.check_critical_and_mana_with_priority(now, Some(hp), Some(mana));
			assert_eq!(result, (Some(HealKind::Critical), false), "hp={hp} mana={mana}");
		}
	}
}

#[test]
fn test_shared_cooldown_allows_one_action_per_interval() {
	let (mut healer, sink) = healer();
	healer.set_max_mana(1000);
	healer.toggle_mana(true);
	let t0 = Instant::now();

	for step in 0..10u64 {
		let now = t0 + Duration::from_millis(step * 90);
		healer.check_and_heal(now, Some(100));
		healer.check_and_restore_mana(now, Some(100));
		healer.check_critical_and_mana_with_priority(now, Some(100), Some(100));
	}
	assert_eq!(sink.press_count(), 1);
}
