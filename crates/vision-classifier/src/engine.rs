//! Seam to the native classification engine.
//!
//! The engine (model loading, preprocessing, inference, score calibration,
//! thresholding, allow/deny filtering, top-k) lives outside this crate.
//! Embedders provide it by implementing [`ClassifierFactory`] and
//! [`ImageClassifier`].

use crate::error::EngineStatus;
use crate::frame::FrameView;
use crate::options::EngineOptions;
use crate::types::ClassificationResult;

/// A constructed classifier instance.
///
/// `classify` takes `&self`; engines whose inference is reentrant can be
/// driven from several threads at once. Engines that are not must serialize
/// internally.
pub trait ImageClassifier: Send + Sync {
    /// Classify one frame. The frame must not be retained past this call.
    fn classify(&self, frame: &FrameView<'_>) -> Result<ClassificationResult, EngineStatus>;
}

/// Builds classifier instances from engine options.
pub trait ClassifierFactory: Send + Sync {
    /// Map the model described by `options`, validate it and construct a
    /// classifier. Ownership of the instance moves to the caller.
    fn create_from_options(
        &self,
        options: &EngineOptions,
    ) -> Result<Box<dyn ImageClassifier>, EngineStatus>;
}

impl<F> ClassifierFactory for F
where
    F: Fn(&EngineOptions) -> Result<Box<dyn ImageClassifier>, EngineStatus> + Send + Sync,
{
    fn create_from_options(
        &self,
        options: &EngineOptions,
    ) -> Result<Box<dyn ImageClassifier>, EngineStatus> {
        self(options)
    }
}
