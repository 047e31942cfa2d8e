//! Handle registry for hosts that can only hold an integer.
//!
//! Hosts across a C ABI cannot own a Rust value, so the registry owns the
//! classifier and gives the host an opaque id. Ids start at 1, increase
//! monotonically and are never reused; 0 is the invalid-handle sentinel.
//!
//! # Host contract
//!
//! Each id returned by `initialize` must be released exactly once, and
//! release must not race with classify on the same id. Breaking the
//! contract is a host bug. The registry turns it into an
//! [`BridgeError::InvalidHandle`] failure rather than a result; hosts must
//! not rely on that.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::engine::{ClassifierFactory, ImageClassifier};
use crate::error::{BridgeError, Result};
use crate::handle::{classify_pixels, ClassifierHandle};
use crate::options::{ClassifierOptions, ModelSource};
use crate::types::Classifications;

/// Id never issued by a registry
pub const INVALID_HANDLE: u64 = 0;

lazy_static! {
    static ref GLOBAL: HandleRegistry = HandleRegistry::new();
}

/// Process-wide registry backing the C ABI.
pub fn global() -> &'static HandleRegistry {
    &GLOBAL
}

/// Owns live classifier instances keyed by opaque ids.
pub struct HandleRegistry {
    next_id: AtomicU64,
    entries: RwLock<HashMap<u64, Arc<dyn ImageClassifier>>>,
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Build a classifier and register it. No id is issued on failure.
    pub fn initialize(
        &self,
        factory: &dyn ClassifierFactory,
        options: ClassifierOptions,
        model: ModelSource,
    ) -> Result<u64> {
        let handle = ClassifierHandle::initialize(factory, options, model)?;
        let id = self.insert(Arc::from(handle.into_inner()));
        debug!(handle = id, "registered image classifier");
        Ok(id)
    }

    /// Classify with the instance behind `id`.
    ///
    /// The lock is held only for the lookup; the cloned `Arc` keeps the
    /// instance alive until this call returns.
    pub fn classify(
        &self,
        id: u64,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Classifications>> {
        let classifier = self.get(id)?;
        classify_pixels(classifier.as_ref(), pixels, width, height)
    }

    /// Drop the registry's ownership of `id`.
    pub fn release(&self, id: u64) -> Result<()> {
        match self.entries.write().remove(&id) {
            Some(_) => {
                debug!(handle = id, "released image classifier");
                Ok(())
            }
            None => {
                warn!(handle = id, "release of unknown classifier handle");
                Err(BridgeError::InvalidHandle(id))
            }
        }
    }

    /// Register an instance and issue its id.
    pub fn insert(&self, classifier: Arc<dyn ImageClassifier>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.write().insert(id, classifier);
        id
    }

    /// Look up the instance behind `id`.
    pub fn get(&self, id: u64) -> Result<Arc<dyn ImageClassifier>> {
        self.entries.read().get(&id).cloned().ok_or_else(|| {
            warn!(handle = id, "use of unknown classifier handle");
            BridgeError::InvalidHandle(id)
        })
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.read().contains_key(&id)
    }

    /// Number of live (unreleased) instances.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EngineStatus, FailureKind};
    use crate::frame::FrameView;
    use crate::options::EngineOptions;
    use crate::types::{ClassificationGroup, ClassificationResult, EngineCategory};
    use std::thread;

    struct Constant;

    impl ImageClassifier for Constant {
        fn classify(
            &self,
            _frame: &FrameView<'_>,
        ) -> std::result::Result<ClassificationResult, EngineStatus> {
            Ok(ClassificationResult {
                classifications: vec![ClassificationGroup {
                    head_index: 0,
                    classes: vec![EngineCategory::new(1, 0.25, "goldfish")],
                }],
            })
        }
    }

    fn constant_factory(
        options: &EngineOptions,
    ) -> std::result::Result<Box<dyn ImageClassifier>, EngineStatus> {
        if options.model_source().length < 0 {
            return Err(EngineStatus::invalid_argument("negative model length"));
        }
        Ok(Box::new(Constant))
    }

    #[test]
    fn test_ids_are_unique_and_non_zero() {
        let registry = HandleRegistry::new();
        let a = registry.insert(Arc::new(Constant));
        let b = registry.insert(Arc::new(Constant));
        assert_ne!(a, INVALID_HANDLE);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ids_not_reused_after_release() {
        let registry = HandleRegistry::new();
        let a = registry.insert(Arc::new(Constant));
        registry.release(a).unwrap();
        let b = registry.insert(Arc::new(Constant));
        assert_ne!(a, b);
    }

    #[test]
    fn test_lifecycle() {
        let registry = HandleRegistry::new();
        let id = registry
            .initialize(
                &constant_factory,
                ClassifierOptions::default(),
                ModelSource::new(4, 0, 0),
            )
            .unwrap();
        assert!(registry.contains(id));

        let records = registry.classify(id, &[0u8; 12], 2, 2).unwrap();
        assert_eq!(records[0].categories[0].label, "goldfish");

        registry.release(id).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_initialize_registers_nothing() {
        let registry = HandleRegistry::new();
        let err = registry
            .initialize(
                &constant_factory,
                ClassifierOptions::default(),
                ModelSource::new(4, -1, 0),
            )
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::AssertionError);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_use_after_release_never_yields_result() {
        let registry = HandleRegistry::new();
        let id = registry.insert(Arc::new(Constant));
        registry.release(id).unwrap();

        let err = registry.classify(id, &[0u8; 12], 2, 2).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidHandle(h) if h == id));
        assert!(matches!(
            registry.release(id),
            Err(BridgeError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_in_flight_classify_keeps_instance_alive() {
        let registry = HandleRegistry::new();
        let id = registry.insert(Arc::new(Constant));

        let held = registry.get(id).unwrap();
        registry.release(id).unwrap();

        let frame = FrameView::from_rgb_raw(&[0u8; 3], 1, 1);
        assert!(held.classify(&frame).is_ok());
    }

    #[test]
    fn test_concurrent_classify_on_one_handle() {
        let registry = Arc::new(HandleRegistry::new());
        let id = registry.insert(Arc::new(Constant));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    let pixels = vec![0u8; 4 * 4 * 3];
                    for _ in 0..25 {
                        let records = registry.classify(id, &pixels, 4, 4).unwrap();
                        assert_eq!(records.len(), 1);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        registry.release(id).unwrap();
    }
}
