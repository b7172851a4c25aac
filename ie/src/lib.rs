mod image;
pub use image::*;
mod ocr;
mod status;
pub use status::*;

/// Image extraction entry point.
///
/// OCR is optional: when the models cannot be loaded the error is kept and
/// every read returns `None`, so the overlay can still start and show why.
pub struct Ie {
	ocr: Option<ocr::Ocr>,
	ocr_error: Option<String>,
}

impl Ie {
	pub fn new(
		ocr_detection: impl AsRef<std::path::Path>,
		ocr_recognition: impl AsRef<std::path::Path>,
		ocr_charset: impl AsRef<std::path::Path>,
	) -> Self {
		match ocr::Ocr::try_new(ocr_detection, ocr_recognition, ocr_charset) {
			Ok(ocr) => Self { ocr: Some(ocr), ocr_error: None },
			Err(err) => {
				tracing::warn!(error = %format!("{err:#}"), "OCR disabled");
				Self::without_ocr(format!("{err:#}"))
			}
		}
	}

	pub fn without_ocr(reason: impl Into<String>) -> Self {
		Self {
			ocr: None,
			ocr_error: Some(reason.into()),
		}
	}

	pub fn ocr_available(&self) -> bool {
		self.ocr.is_some()
	}

	pub fn ocr_init_error(&self) -> Option<&str> {
		self.ocr_error.as_deref()
	}

	/// OCR a bar crop and parse it.
	pub fn read_value(&self, image: Image) -> Option<Value> {
		let ocr = self.ocr.as_ref()?;
		let text = image.get_number_text(ocr);
		let value = parse_value(&text);
		if value.is_none() && !text.is_empty() {
			tracing::debug!(%text, "unparsed bar text");
		}
		value
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_models_disable_ocr() {
		let ie = Ie::new("/nonexistent/det.mnn", "/nonexistent/rec.mnn", "/nonexistent/keys.txt");
		assert!(!ie.ocr_available());
		assert!(ie.ocr_init_error().is_some());

		let img = OwnedImage::from_rgba(2, &[0; 16]);
		assert_eq!(ie.read_value(img.as_image()), None);
	}
}
