//! HP / mana read-out from the game's status bars.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Ie, Image};

static VALUE_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(?<current>\d{2,5})(?:/(?<max>\d{2,5}))?$").expect("value regex"));

/// Screen rectangle relative to the captured window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

impl Region {
	pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
		Self { x, y, width, height }
	}

	pub fn is_configured(&self) -> bool {
		self.width > 0 && self.height > 0
	}

	pub fn crop<'a>(&self, image: Image<'a>) -> Image<'a> {
		image.sub_image(self.x, self.y, self.width, self.height)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Regions {
	pub hp: Option<Region>,
	pub mana: Option<Region>,
}

impl Regions {
	pub fn is_hp_configured(&self) -> bool {
		self.hp.is_some_and(|r| r.is_configured())
	}

	pub fn is_mana_configured(&self) -> bool {
		self.mana.is_some_and(|r| r.is_configured())
	}

	pub fn is_fully_configured(&self) -> bool {
		self.is_hp_configured() && self.is_mana_configured()
	}
}

/// One parsed bar value, `current` or `current/max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Value {
	pub current: u32,
	pub max: Option<u32>,
}

/// Parse OCR output into a [`Value`].
///
/// Common OCR confusions (`O`→`0`, `l`/`I`/`|`→`1`, `S`→`5`) are normalised
/// and whitespace is dropped before matching.
pub fn parse_value(text: &str) -> Option<Value> {
	let cleaned = text
		.chars()
		.filter(|c| !c.is_whitespace())
		.map(|c| match c {
			'O' | 'o' => '0',
			'l' | 'I' | '|' => '1',
			'S' => '5',
			c => c,
		})
		.collect::<String>();

	let caps = VALUE_REGEX.captures(&cleaned)?;
	let current = caps.name("current")?.as_str().parse().ok()?;
	let max = caps.name("max").and_then(|m| m.as_str().parse().ok());
	Some(Value { current, max })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reading {
	pub hp: Option<Value>,
	pub mana: Option<Value>,
}

/// Reads both bars and keeps the last good value of each.
///
/// OCR drops frames now and then (animations, overlapping tooltips); a
/// missing read falls back to the cached value until [`StatusReader::reset`].
#[derive(Debug, Default)]
pub struct StatusReader {
	last_hp: Option<Value>,
	last_mana: Option<Value>,
}

impl StatusReader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Read the configured regions of `image`.
	pub fn read(&mut self, ie: &Ie, image: Image, regions: &Regions) -> Reading {
		let hp = regions.hp.filter(Region::is_configured).and_then(|r| ie.read_value(r.crop(image)));
		let mana = regions.mana.filter(Region::is_configured).and_then(|r| ie.read_value(r.crop(image)));
		self.merge(Reading { hp, mana })
	}

	/// Fill gaps in `fresh` from the cache and update the cache with what was read.
	pub fn merge(&mut self, fresh: Reading) -> Reading {
		if fresh.hp.is_some() {
			self.last_hp = fresh.hp;
		}
		if fresh.mana.is_some() {
			self.last_mana = fresh.mana;
		}

		Reading {
			hp: self.last_hp,
			mana: self.last_mana,
		}
	}

	pub fn reset(&mut self) {
		self.last_hp = None;
		self.last_mana = None;
	}
}
