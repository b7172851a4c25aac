//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const MIN_REFRESH_RATE: u32 = 1;
pub const MAX_REFRESH_RATE: u32 = 60;

/// On-disk configuration for the application.
///
/// Every field defaults on its own, so a file missing whole sections (or
/// written by an older version) still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Target window application name (from `xcap::Window::app_name()`).
	///
	/// If multiple windows share the same app name, the first large enough
	/// match is used.
	pub app_name: String,

	/// Perception reads per second.
	pub refresh_rate: u32,

	/// Optional max capture height (downscales large captures for performance).
	pub max_capture_height: Option<u32>,

	/// HP / mana number regions, relative to the captured window.
	pub regions: ie::Regions,

	pub bot: bot::BotSettings,

	/// Forced UI locale (e.g. "en-US"); system locale when unset.
	pub locale: Option<String>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			app_name: "Tibia".to_string(),
			refresh_rate: 10,
			max_capture_height: None,
			regions: ie::Regions::default(),
			bot: bot::BotSettings::default(),
			locale: None,
		}
	}
}

impl Config {
	/// Path to the config file.
	pub fn path() -> Result<PathBuf> {
		let base = dirs::config_dir().context("config_dir() unavailable")?;
		Ok(base.join("windify.json"))
	}

	/// Load configuration from disk, falling back to defaults on any failure.
	pub fn load_or_default() -> Self {
		match Self::try_load() {
			Ok(cfg) => cfg,
			Err(err) => {
				tracing::warn!(error = %format!("{err:#}"), "failed to load config; using defaults");
				Self::default()
			}
		}
	}

	/// Try to load configuration from disk.
	pub fn try_load() -> Result<Self> {
		let path = Self::path()?;
		if !path.exists() {
			return Ok(Self::default());
		}
		let json = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
		Self::from_json(&json).with_context(|| format!("parse {:?}", path))
	}

	pub fn from_json(json: &str) -> Result<Self> {
		let mut cfg: Self = serde_json::from_str(json)?;
		cfg.refresh_rate = cfg.refresh_rate.clamp(MIN_REFRESH_RATE, MAX_REFRESH_RATE);
		Ok(cfg)
	}

	/// Save configuration to disk.
	pub fn save(&self) -> Result<()> {
		let path = Self::path()?;
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
		}
		let json = serde_json::to_string_pretty(self).context("serialize config")?;
		fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
		tracing::info!(path = %path.display(), "config saved");
		Ok(())
	}

	/// Restore defaults and remove the file from disk.
	pub fn reset(&mut self) -> Result<()> {
		*self = Self::default();
		let path = Self::path()?;
		if path.exists() {
			fs::remove_file(&path).with_context(|| format!("remove {:?}", path))?;
		}
		tracing::info!("config reset to defaults");
		Ok(())
	}

	/// Forget both OCR regions.
	pub fn reset_regions(&mut self) {
		self.regions = ie::Regions::default();
	}

	/// Delay between two perception reads.
	pub fn poll_delay(&self) -> std::time::Duration {
		std::time::Duration::from_secs_f64(1.0 / self.refresh_rate.clamp(MIN_REFRESH_RATE, MAX_REFRESH_RATE) as f64)
	}
}
