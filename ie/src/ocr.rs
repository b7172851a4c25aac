//! OCR wrapper.
//!
//! Thin layer over `ocr-rs` (Rust PaddleOCR bindings). Preprocessing happens in
//! `Image::get_number_text(...)` before calling into this module.

use std::path::Path;

use anyhow::Context;

pub struct Ocr {
    engine: ocr_rs::OcrEngine,
}

impl Ocr {
    /// Initialize the OCR engine with the given model paths.
    pub fn try_new(
        detection: impl AsRef<Path>,
        recognition: impl AsRef<Path>,
        charset: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        let thread_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let engine = ocr_rs::OcrEngine::new(
            detection,
            recognition,
            charset,
            Some(ocr_rs::OcrEngineConfig {
                backend: ocr_rs::Backend::CPU,
                thread_count,
                // Small game fonts need the higher precision mode.
                precision_mode: ocr_rs::PrecisionMode::High,
                enable_parallel: thread_count > 1,
                min_result_confidence: 0.5,
                ..Default::default()
            }),
        )
        .context("failed to initialize OCR engine")?;

        tracing::info!(thread_count, "OCR engine ready");
        Ok(Self { engine })
    }

    /// Recognize text from an RGB image view.
    pub fn get_text(&self, image: crate::Image) -> String {
        let image = ocr_rs::preprocess::rgb_to_image(&image.get_bytes(), image.width(), image.height());

        match self.engine.recognize(&image) {
            Ok(results) => results
                .into_iter()
                .map(|v| v.text)
                .collect::<Vec<_>>()
                .join(" "),
            Err(err) => {
                tracing::debug!(error = %err, "recognition failed");
                String::new()
            }
        }
    }
}
