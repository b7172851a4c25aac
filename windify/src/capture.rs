use anyhow::{Context, Result};
use xcap::image::EncodableLayout;

/// Windows narrower than this are launchers, splash screens or tool windows.
const MIN_WINDOW_WIDTH: u32 = 200;

/// Allowed edit distance when the app name does not match exactly.
const FUZZY_THRESHOLD: usize = 2;

/// Geometry of the captured application window, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
	pub x: i32,
	pub y: i32,
	pub width: u32,
	pub height: u32,
}

impl WindowBounds {
	pub fn of(window: &xcap::Window) -> Option<Self> {
		Some(Self {
			x: window.x().ok()?,
			y: window.y().ok()?,
			width: window.width().ok()?,
			height: window.height().ok()?,
		})
	}
}

/// Names of every visible window, for the settings picker.
pub fn list_app_names() -> Vec<String> {
	let Ok(windows) = xcap::Window::all() else { return Vec::new() };
	let mut names = windows
		.into_iter()
		.filter_map(|w| w.app_name().ok())
		.filter(|name| !name.is_empty())
		.collect::<Vec<_>>();
	names.sort();
	names.dedup();
	names
}

/// Find the target window by app name.
///
/// Exact matches win; otherwise the closest name within a small edit distance
/// is used so minor renames (version suffixes, casing) still hit.
pub fn find_window(app_name: &str) -> Option<xcap::Window> {
	let windows = xcap::Window::all().ok()?;
	let wanted = app_name.to_lowercase();

	let candidates = windows
		.into_iter()
		.filter(|w| !w.is_minimized().unwrap_or(false))
		.filter(|w| w.width().is_ok_and(|width| width > MIN_WINDOW_WIDTH))
		.filter_map(|w| {
			let name = w.app_name().ok()?.to_lowercase();
			Some((w, name))
		})
		.collect::<Vec<_>>();

	if let Some(index) = candidates.iter().position(|(_, name)| *name == wanted) {
		return candidates.into_iter().nth(index).map(|(w, _)| w);
	}

	candidates
		.into_iter()
		.filter(|(_, name)| matches(name, &wanted, FUZZY_THRESHOLD))
		.min_by_key(|(_, name)| levenshtein::levenshtein(name, &wanted))
		.map(|(w, _)| w)
}

/// A captured frame and the factor it was scaled by (1.0 when untouched).
pub struct Frame {
	pub image: ie::OwnedImage,
	pub scale: f32,
}

impl Frame {
	/// Map a region given in full-resolution window pixels onto this frame.
	pub fn scale_region(&self, region: ie::Region) -> ie::Region {
		if self.scale == 1.0 {
			return region;
		}
		let px = |v: u32| (v as f32 * self.scale).round() as u32;
		ie::Region::new(px(region.x), px(region.y), px(region.width).max(1), px(region.height).max(1))
	}

	pub fn scale_regions(&self, regions: &ie::Regions) -> ie::Regions {
		ie::Regions {
			hp: regions.hp.map(|r| self.scale_region(r)),
			mana: regions.mana.map(|r| self.scale_region(r)),
		}
	}

	/// The part of the frame under `region` (full-resolution window pixels).
	pub fn region_image(&self, region: ie::Region) -> ie::Image<'_> {
		self.scale_region(region).crop(self.image.as_image())
	}
}

/// Capture the window, downscaled to `max_height` when it is taller.
pub fn capture_window(window: &xcap::Window, max_height: Option<u32>) -> Result<Frame> {
	let img = window.capture_image().context("capture window")?;
	let mut image = ie::OwnedImage::from_rgba(img.width() as usize, img.as_bytes());
	let mut scale = 1.0;
	if let Some(max) = max_height
		&& image.height() > max
	{
		scale = max as f32 / image.height() as f32;
		image.resize_h(max);
	}
	Ok(Frame { image, scale })
}

/// One capture of the target window.
pub fn grab(app_name: &str, max_height: Option<u32>) -> Result<Frame> {
	let window = find_window(app_name).with_context(|| format!("window {app_name:?} not found"))?;
	capture_window(&window, max_height)
}

/// Capture once and OCR `region`, for checking a region by hand.
pub fn test_region(ie: &ie::Ie, app_name: &str, max_height: Option<u32>, region: ie::Region) -> Result<Option<ie::Value>> {
	if let Some(err) = ie.ocr_init_error() {
		anyhow::bail!("OCR unavailable: {err}");
	}
	let frame = grab(app_name, max_height)?;
	Ok(ie.read_value(frame.region_image(region)))
}

fn matches(a: &str, b: &str, threshold: usize) -> bool {
	if a == b {
		return true;
	}

	// "tibia client" should match "tibia".
	let mut end = a.len();
	while let Some(index) = a[..end].rfind(' ') {
		end = index;
		if &a[..end] == b {
			return true;
		}
	}

	levenshtein::levenshtein(a, b) <= threshold
}

/// Tracks the target window between polls.
///
/// Any move or resize invalidates region-relative reads and learned
/// capacities, so callers reset them when [`WindowTracker::update`] reports a
/// change.
#[derive(Debug, Default)]
pub struct WindowTracker {
	last: Option<WindowBounds>,
}

impl WindowTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record the latest bounds. Returns `true` when the window appeared, moved
	/// or was resized since the previous call.
	pub fn update(&mut self, bounds: Option<WindowBounds>) -> bool {
		let changed = match (self.last, bounds) {
			(Some(last), Some(now)) => last != now,
			(None, Some(_)) => true,
			_ => false,
		};
		self.last = bounds;
		changed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bounds(x: i32, width: u32) -> WindowBounds {
		WindowBounds { x, y: 0, width, height: 600 }
	}

	#[test]
	fn appearing_window_counts_as_change() {
		let mut tracker = WindowTracker::new();
		assert!(!tracker.update(None));
		assert!(tracker.update(Some(bounds(0, 800))));
		assert!(!tracker.update(Some(bounds(0, 800))));
	}

	#[test]
	fn move_and_resize_are_changes() {
		let mut tracker = WindowTracker::new();
		tracker.update(Some(bounds(0, 800)));
		assert!(tracker.update(Some(bounds(10, 800))));
		assert!(tracker.update(Some(bounds(10, 1024))));
	}

	#[test]
	fn vanishing_window_is_not_a_change() {
		let mut tracker = WindowTracker::new();
		tracker.update(Some(bounds(0, 800)));
		assert!(!tracker.update(None));
		// Coming back at the same spot still counts: the reader cache is stale.
		assert!(tracker.update(Some(bounds(0, 800))));
	}

	#[test]
	fn regions_follow_downscale() {
		let frame = Frame {
			image: ie::OwnedImage::from_rgba(1, &[0; 4]),
			scale: 0.5,
		};
		assert_eq!(frame.scale_region(ie::Region::new(100, 40, 81, 20)), ie::Region::new(50, 20, 41, 10));

		let full = Frame { scale: 1.0, ..frame };
		assert_eq!(full.scale_region(ie::Region::new(1, 2, 3, 4)), ie::Region::new(1, 2, 3, 4));
	}

	#[test]
	fn region_crop_follows_downscale() {
		let frame = Frame {
			image: ie::OwnedImage::from_rgba(200, &vec![0; 200 * 100 * 4]),
			scale: 0.5,
		};
		let crop = frame.region_image(ie::Region::new(100, 40, 80, 20));
		assert_eq!((crop.width(), crop.height()), (40, 10));

		let ie = ie::Ie::without_ocr("no models");
		assert_eq!(ie.read_value(crop), None);
	}

	#[test]
	fn test_read_needs_ocr() {
		let ie = ie::Ie::without_ocr("no models");
		let err = test_region(&ie, "tibia", None, ie::Region::new(0, 0, 80, 20)).unwrap_err();
		assert!(format!("{err:#}").contains("no models"));
	}

	#[test]
	fn fuzzy_name_matching() {
		assert!(matches("tibia", "tibia", 0));
		assert!(matches("tibia client", "tibia", 0));
		assert!(matches("tibia2", "tibia", 2));
		assert!(!matches("firefox", "tibia", 2));
	}
}
