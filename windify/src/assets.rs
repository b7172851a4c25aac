use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

#[derive(Debug, Clone)]
pub struct OcrAssets {
	pub detection: PathBuf,
	pub recognition: PathBuf,
	pub charset: PathBuf,
}

impl OcrAssets {
	fn in_dir(dir: &Path) -> Self {
		Self {
			detection: dir.join("detection.mnn"),
			recognition: dir.join("latin_recognition.mnn"),
			charset: dir.join("latin_charset.txt"),
		}
	}

	fn is_complete(&self) -> bool {
		self.detection.is_file() && self.recognition.is_file() && self.charset.is_file()
	}
}

fn normalize_ocr_dir(dir: PathBuf) -> PathBuf {
	// The override may point at the app root (containing `ocr/`) or at `ocr/` itself.
	if dir.join("detection.mnn").is_file() {
		dir
	} else {
		dir.join("ocr")
	}
}

/// Locate the OCR model files at runtime.
///
/// Searched in order: `WINDIFY_ASSETS_DIR`, next to the executable, the
/// working directory, and `<config>/windify`.
pub fn resolve_ocr_assets() -> Result<OcrAssets> {
	let mut candidates: Vec<PathBuf> = Vec::new();
	if let Some(dir) = std::env::var_os("WINDIFY_ASSETS_DIR") {
		candidates.push(PathBuf::from(dir));
	}
	if let Ok(exe) = std::env::current_exe()
		&& let Some(dir) = exe.parent()
	{
		candidates.push(dir.to_path_buf());
	}
	if let Ok(cwd) = std::env::current_dir() {
		candidates.push(cwd);
	}
	if let Some(cfg) = dirs::config_dir() {
		candidates.push(cfg.join("windify"));
	}

	find_in(candidates)
}

fn find_in(candidates: Vec<PathBuf>) -> Result<OcrAssets> {
	let mut tried = Vec::new();
	for base in candidates {
		let ocr_dir = normalize_ocr_dir(base);
		let assets = OcrAssets::in_dir(&ocr_dir);
		if assets.is_complete() {
			return Ok(assets);
		}
		tried.push(ocr_dir);
	}

	bail!(
		"OCR model files not found (ocr/detection.mnn, ocr/latin_recognition.mnn, ocr/latin_charset.txt). Searched in:\n{}\n\nCopy the 'ocr/' folder next to the executable or set WINDIFY_ASSETS_DIR.",
		tried
			.into_iter()
			.map(|p| format!("  - {}", p.display()))
			.collect::<Vec<_>>()
			.join("\n")
	)
}
