//! Scripted engine shared by the integration tests.
//!
//! Scores a frame by mean brightness and applies the engine-side rules
//! (threshold, allow/deny lists, max_results) so tests can check that the
//! bridge passes options through and leaves results untouched.

#![allow(dead_code)]

use vision_classifier::{
    ClassificationGroup, ClassificationResult, EngineCategory, EngineOptions, EngineStatus,
    FrameView, ImageClassifier,
};

/// Model length the scripted factory treats as a valid model
pub const MODEL_LEN: i64 = 1024;

pub struct BrightnessClassifier {
    max_results: i32,
    score_threshold: Option<f32>,
    allow: Vec<String>,
    deny: Vec<String>,
    with_display_names: bool,
}

impl ImageClassifier for BrightnessClassifier {
    fn classify(&self, frame: &FrameView<'_>) -> Result<ClassificationResult, EngineStatus> {
        if !frame.is_complete() {
            return Err(EngineStatus::invalid_argument(format!(
                "Frame buffer has {} bytes, expected {}",
                frame.data().len(),
                frame.expected_len()
            )));
        }

        let pixels = &frame.data()[..frame.expected_len()];
        let mean = if pixels.is_empty() {
            0.0
        } else {
            pixels.iter().map(|&b| b as f32).sum::<f32>() / (pixels.len() as f32 * 255.0)
        };

        let mut classes = vec![
            EngineCategory::new(0, 1.0 - mean, "dark"),
            EngineCategory::new(1, mean, "bright"),
            EngineCategory::new(2, 0.05, "noise"),
        ];
        if self.with_display_names {
            classes[0] = classes[0].clone().with_display_name("Dunkel");
        }

        classes.sort_by(|a, b| b.score.total_cmp(&a.score));
        classes.retain(|c| self.allow.is_empty() || self.allow.contains(&c.class_name));
        classes.retain(|c| !self.deny.contains(&c.class_name));
        if let Some(threshold) = self.score_threshold {
            classes.retain(|c| c.score >= threshold);
        }
        if self.max_results >= 0 {
            classes.truncate(self.max_results as usize);
        }

        Ok(ClassificationResult {
            classifications: vec![
                ClassificationGroup {
                    head_index: 0,
                    classes,
                },
                ClassificationGroup {
                    head_index: 1,
                    classes: vec![EngineCategory::new(0, 1.0, "frame")],
                },
            ],
        })
    }
}

/// Factory rejecting anything that does not look like a model region.
pub fn brightness_factory(
    options: &EngineOptions,
) -> Result<Box<dyn ImageClassifier>, EngineStatus> {
    let model = options.model_source();
    if model.fd < 0 {
        return Err(EngineStatus::not_found("Invalid file descriptor"));
    }
    if model.length != MODEL_LEN {
        return Err(EngineStatus::invalid_argument(
            "The model is not a valid Flatbuffer buffer",
        ));
    }

    Ok(Box::new(BrightnessClassifier {
        max_results: options.max_results,
        score_threshold: options.score_threshold,
        allow: options.class_name_whitelist.clone(),
        deny: options.class_name_blacklist.clone(),
        with_display_names: options.display_names_locale == "de",
    }))
}
