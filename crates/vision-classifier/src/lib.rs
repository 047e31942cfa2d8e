//! Image Classifier Bridge
//!
//! Lets a host environment drive a native image-classification engine.
//! The host crosses into native code once to build a classifier and once per
//! frame to classify it; the bridge translates options, wraps the pixels in
//! a borrowed view, calls the engine and reshapes its output.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   translate   ┌───────────────┐  create   ┌─────────────────┐
//! │ Host options │──────────────▶│ EngineOptions │──────────▶│ ImageClassifier │
//! └──────────────┘               └───────────────┘           │   (engine)      │
//! ┌──────────────┐   FrameView   ┌───────────────┐  classify │                 │
//! │ RGB buffer   │──────────────▶│ borrowed view │──────────▶│                 │
//! └──────────────┘               └───────────────┘           └────────┬────────┘
//!                                 ┌───────────────────────┐  marshal  │
//!                                 │ Vec<Classifications>  │◀──────────┘
//!                                 └───────────────────────┘
//! ```
//!
//! The engine is not part of this crate. Embedders implement
//! [`ClassifierFactory`] and [`ImageClassifier`]; the bridge does no
//! filtering, sorting or thresholding of its own.
//!
//! ## Usage from Rust
//!
//! ```rust,ignore
//! use vision_classifier::{ClassifierHandle, ClassifierOptions, ModelSource};
//!
//! let options = ClassifierOptions::new().max_results(3);
//! let handle = ClassifierHandle::initialize(&factory, options, ModelSource::new(fd, len, 0))?;
//! for head in handle.classify(&rgb, width, height)? {
//!     for category in head.categories {
//!         println!("{}: {}", category.label, category.score);
//!     }
//! }
//! handle.release();
//! ```
//!
//! ## Memory Ownership
//!
//! - Rust hosts own a [`ClassifierHandle`]; `release` consumes it
//! - C hosts get an opaque id from `image_classifier_init_with_fd()` and must
//!   call `image_classifier_deinit()` exactly once
//! - Pixel buffers are borrowed for a single classify call and never retained

pub mod engine;
pub mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod frame;
pub mod handle;
pub mod logging;
pub mod marshal;
pub mod options;
pub mod registry;
pub mod types;

// Re-export main types
pub use engine::{ClassifierFactory, ImageClassifier};
pub use error::{BridgeError, EngineStatus, FailureKind, Result, StatusCode};
pub use frame::{Dimension, FrameFormat, FrameView};
pub use handle::ClassifierHandle;
pub use marshal::{marshal, select_label};
pub use options::{translate, ClassifierOptions, EngineOptions, HostOptions, ModelSource};
pub use registry::HandleRegistry;
pub use types::{
    Category, ClassificationGroup, ClassificationResult, Classifications, EngineCategory,
};

// Re-export FFI types for C consumers
#[cfg(feature = "ffi")]
pub use ffi::{
    install_factory, CategoryC, ClassificationsC, ClassifierOptionsC, ClassifyResultC, InitResultC,
};
