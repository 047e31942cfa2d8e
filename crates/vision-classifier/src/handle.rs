//! Owned classifier handles for Rust hosts.
//!
//! A [`ClassifierHandle`] exists only after a successful initialize and
//! owns exactly one engine instance. `release` consumes the handle, so
//! classifying after release or releasing twice does not compile.

use std::fmt;

use tracing::{debug, warn};

use crate::engine::{ClassifierFactory, ImageClassifier};
use crate::error::{BridgeError, Result};
use crate::frame::FrameView;
use crate::marshal::marshal;
use crate::options::{translate, ClassifierOptions, ModelSource};
use crate::types::Classifications;

/// Translate options and ask the factory for a classifier instance.
pub(crate) fn create_classifier(
    factory: &dyn ClassifierFactory,
    options: ClassifierOptions,
    model: ModelSource,
) -> Result<Box<dyn ImageClassifier>> {
    let engine_options = translate(options, model);
    debug!(
        fd = model.fd,
        length = model.length,
        offset = model.offset,
        max_results = engine_options.max_results,
        score_threshold = ?engine_options.score_threshold,
        "creating image classifier"
    );

    factory.create_from_options(&engine_options).map_err(|status| {
        warn!(code = ?status.code, "classifier initialization failed");
        BridgeError::Initialization(status)
    })
}

/// Run one classification over a borrowed buffer and marshal the result.
pub(crate) fn classify_pixels(
    classifier: &dyn ImageClassifier,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<Classifications>> {
    let frame = FrameView::from_rgb_raw(pixels, width, height);

    match classifier.classify(&frame) {
        Ok(result) => {
            let records = marshal(&result);
            debug!(width, height, heads = records.len(), "classified frame");
            Ok(records)
        }
        Err(status) => {
            warn!(width, height, code = ?status.code, "classification failed");
            Err(BridgeError::Classification(status))
        }
    }
}

/// Sole owner of one engine classifier instance.
pub struct ClassifierHandle {
    classifier: Box<dyn ImageClassifier>,
}

impl ClassifierHandle {
    /// Build a classifier from `options` and the model at `model`.
    ///
    /// On failure no handle exists and the error carries the engine message.
    pub fn initialize(
        factory: &dyn ClassifierFactory,
        options: ClassifierOptions,
        model: ModelSource,
    ) -> Result<Self> {
        let classifier = create_classifier(factory, options, model)?;
        Ok(Self { classifier })
    }

    /// Classify a row-major RGB buffer of `width` x `height` pixels.
    ///
    /// `pixels` is borrowed for this call only. A buffer shorter than the
    /// declared dimensions is reported by the engine, not checked here.
    pub fn classify(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Classifications>> {
        classify_pixels(self.classifier.as_ref(), pixels, width, height)
    }

    /// Destroy the engine instance.
    pub fn release(self) {
        debug!("releasing image classifier");
        drop(self);
    }

    /// Hand the instance over to shared ownership (used by the handle registry).
    pub(crate) fn into_inner(self) -> Box<dyn ImageClassifier> {
        self.classifier
    }
}

impl fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierHandle").finish_non_exhaustive()
    }
}
