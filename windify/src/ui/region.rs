//! Region checks: test-read a configured bar, or drag a new one out on a capture.

use egui::{Pos2, Rect, Vec2};

use crate::capture;

/// Smallest pickable side, in window pixels.
const MIN_PICK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bar {
	Hp,
	Mana,
}

impl Bar {
	pub fn slot(self, regions: &mut ie::Regions) -> &mut Option<ie::Region> {
		match self {
			Bar::Hp => &mut regions.hp,
			Bar::Mana => &mut regions.mana,
		}
	}
}

/// A region button pressed in the settings tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	Test(Bar),
	Pick(Bar),
}

struct Picker {
	bar: Bar,
	texture: egui::TextureHandle,
	frame_scale: f32,
	drag_from: Option<Pos2>,
	drag_to: Option<Pos2>,
}

#[derive(Default)]
pub struct RegionTool {
	hp_check: Option<String>,
	mana_check: Option<String>,
	picker: Option<Picker>,
}

impl RegionTool {
	/// Result of the last test read for `bar`.
	pub fn check(&self, bar: Bar) -> Option<&str> {
		match bar {
			Bar::Hp => self.hp_check.as_deref(),
			Bar::Mana => self.mana_check.as_deref(),
		}
	}

	fn set_check(&mut self, bar: Bar, text: String) {
		match bar {
			Bar::Hp => self.hp_check = Some(text),
			Bar::Mana => self.mana_check = Some(text),
		}
	}

	pub fn run(&mut self, ctx: &egui::Context, ie: &ie::Ie, action: Action) {
		let (app_name, max_height, mut regions) = {
			let config = crate::config_read();
			(config.app_name.clone(), config.max_capture_height, config.regions.clone())
		};

		match action {
			Action::Test(bar) => {
				let text = match *bar.slot(&mut regions) {
					Some(region) if region.is_configured() => {
						match capture::test_region(ie, &app_name, max_height, region) {
							Ok(value) => value_label(value).unwrap_or_else(|| crate::tr!("not-detected")),
							Err(err) => format!("{err:#}"),
						}
					}
					_ => crate::tr!("region-unset"),
				};
				tracing::info!(?bar, result = %text, "region test read");
				self.set_check(bar, text);
			}
			Action::Pick(bar) => match capture::grab(&app_name, max_height) {
				Ok(frame) => {
					let image = frame.image.as_image();
					let color = egui::ColorImage::from_rgb(
						[image.width() as usize, image.height() as usize],
						&image.get_bytes(),
					);
					self.picker = Some(Picker {
						bar,
						texture: ctx.load_texture("region-picker", color, egui::TextureOptions::LINEAR),
						frame_scale: frame.scale,
						drag_from: None,
						drag_to: None,
					});
				}
				Err(err) => self.set_check(bar, format!("{err:#}")),
			},
		}
	}

	/// Draw the picker while one is open. Returns the region once a drag ends.
	pub fn show_picker(&mut self, ctx: &egui::Context) -> Option<(Bar, ie::Region)> {
		let picker = self.picker.as_mut()?;
		let mut open = true;
		let mut picked = None;

		egui::Window::new(crate::tr!("pick-region-title"))
			.open(&mut open)
			.collapsible(false)
			.show(ctx, |ui| {
				ui.label(crate::tr!("pick-region-hint"));
				let size = picker.texture.size_vec2();
				let shown = (ui.available_width() / size.x).min(1.0);
				let (response, painter) = ui.allocate_painter(size * shown, egui::Sense::drag());
				let rect = response.rect;
				painter.image(
					picker.texture.id(),
					rect,
					Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
					egui::Color32::WHITE,
				);

				if response.drag_started() {
					picker.drag_from = response.interact_pointer_pos();
				}
				if let Some(pos) = response.interact_pointer_pos() {
					picker.drag_to = Some(pos);
				}
				if let (Some(from), Some(to)) = (picker.drag_from, picker.drag_to) {
					painter.rect_stroke(
						Rect::from_two_pos(from, to),
						0.0,
						egui::Stroke::new(2.0, egui::Color32::RED),
						egui::StrokeKind::Outside,
					);
					if response.drag_stopped() {
						picked = picked_region(from - rect.min, to - rect.min, shown, picker.frame_scale);
						picker.drag_from = None;
						picker.drag_to = None;
					}
				}
			});

		let bar = picker.bar;
		if picked.is_some() || !open {
			self.picker = None;
		}
		picked.map(|region| (bar, region))
	}
}

/// Convert a drag on the preview into window pixels.
///
/// `shown` is preview pixels per frame pixel, `frame_scale` frame pixels per
/// window pixel.
fn picked_region(from: Vec2, to: Vec2, shown: f32, frame_scale: f32) -> Option<ie::Region> {
	let factor = shown * frame_scale;
	if factor <= 0.0 {
		return None;
	}
	let px = |v: f32| (v.max(0.0) / factor).round() as u32;
	let (x1, x2) = (px(from.x.min(to.x)), px(from.x.max(to.x)));
	let (y1, y2) = (px(from.y.min(to.y)), px(from.y.max(to.y)));
	let region = ie::Region::new(x1, y1, x2 - x1, y2 - y1);
	(region.width >= MIN_PICK && region.height >= MIN_PICK).then_some(region)
}

fn value_label(value: Option<ie::Value>) -> Option<String> {
	let value = value?;
	Some(match value.max {
		Some(max) => format!("{}/{max}", value.current),
		None => value.current.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn drag_maps_back_to_window_pixels() {
		// Preview at half size of a frame that was itself halved.
		let region = picked_region(Vec2::new(10.0, 5.0), Vec2::new(30.0, 15.0), 0.5, 0.5);
		assert_eq!(region, Some(ie::Region::new(40, 20, 80, 40)));
	}

	#[test]
	fn drag_direction_does_not_matter() {
		let forward = picked_region(Vec2::new(10.0, 5.0), Vec2::new(30.0, 15.0), 1.0, 1.0);
		let backward = picked_region(Vec2::new(30.0, 15.0), Vec2::new(10.0, 5.0), 1.0, 1.0);
		assert_eq!(forward, backward);
	}

	#[test]
	fn tiny_drag_is_ignored() {
		assert_eq!(picked_region(Vec2::new(10.0, 10.0), Vec2::new(11.0, 30.0), 1.0, 1.0), None);
		assert_eq!(picked_region(Vec2::ZERO, Vec2::new(20.0, 20.0), 0.0, 1.0), None);
	}

	#[test]
	fn test_read_labels() {
		assert_eq!(
			value_label(Some(ie::Value { current: 700, max: Some(1000) })).as_deref(),
			Some("700/1000")
		);
		assert_eq!(value_label(Some(ie::Value { current: 85, max: None })).as_deref(), Some("85"));
		assert_eq!(value_label(None), None);
	}
}
