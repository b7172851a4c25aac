use std::ops::RangeInclusive;

pub trait UiExt {
	fn spacer(&mut self);

	/// Labelled drag value clamped to `range`.
	fn num_edit_range<T: egui::emath::Numeric>(&mut self, value: &mut T, label: &str, range: RangeInclusive<T>) -> egui::Response;

	/// Narrow single-line field for a hotkey name. The typed text is written
	/// back to `value` only when the field loses focus and names a real key.
	fn hotkey_edit(&mut self, id_salt: &str, value: &mut String) -> egui::Response;

	/// Combo box over a list computed on demand when opened.
	fn combo_cached(&mut self, value: &mut String, label: &str, options: impl FnOnce() -> Vec<String>) -> bool;
}

impl UiExt for egui::Ui {
	fn spacer(&mut self) {
		self.add_space(6.0);
		self.separator();
		self.add_space(6.0);
	}

	fn num_edit_range<T: egui::emath::Numeric>(&mut self, value: &mut T, label: &str, range: RangeInclusive<T>) -> egui::Response {
		self.horizontal(|ui| {
			let resp = ui.add(egui::DragValue::new(value).range(range));
			ui.label(label);
			resp
		})
		.inner
	}

	fn hotkey_edit(&mut self, id_salt: &str, value: &mut String) -> egui::Response {
		let id = self.make_persistent_id(("hotkey", id_salt));
		let draft_id = id.with("draft");
		let mut draft = self
			.data_mut(|d| d.get_temp::<String>(draft_id))
			.unwrap_or_else(|| value.clone());

		let resp = self.add(
			egui::TextEdit::singleline(&mut draft)
				.id(id)
				.desired_width(36.0)
				.char_limit(3),
		);

		if resp.lost_focus() {
			commit_hotkey(value, &draft);
			self.data_mut(|d| d.remove::<String>(draft_id));
		} else if resp.has_focus() {
			self.data_mut(|d| d.insert_temp(draft_id, draft));
		}
		resp
	}

	fn combo_cached(&mut self, value: &mut String, label: &str, options: impl FnOnce() -> Vec<String>) -> bool {
		let mut changed = false;
		let id = self.make_persistent_id(label);
		egui::ComboBox::from_id_salt(id)
			.selected_text(value.as_str())
			.show_ui(self, |ui| {
				for option in options() {
					changed |= ui.selectable_value(value, option.clone(), option).changed();
				}
			});
		self.label(label);
		changed
	}
}

/// Accept a finished hotkey edit. Blank or unknown key names leave `value`
/// untouched. Returns `true` when `value` changed.
pub(crate) fn commit_hotkey(value: &mut String, draft: &str) -> bool {
	let draft = draft.trim();
	if draft == value || crate::input::Key::parse(draft).is_none() {
		return false;
	}
	*value = draft.to_string();
	true
}
