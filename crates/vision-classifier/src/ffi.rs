//! C-compatible FFI interface for the image classifier bridge
//!
//! Hosts (a JNI shim, Go via CGO, Swift) drive classification through three
//! calls: `image_classifier_init_with_fd`, `image_classifier_classify` and
//! `image_classifier_deinit`. The engine itself is supplied on the Rust side
//! with [`install_factory`] before the host makes its first call.
//!
//! # Memory Ownership Rules
//!
//! - Handles are opaque `u64` ids, never addresses; `0` means "no handle"
//! - Each successful init must be matched by exactly one `image_classifier_deinit`
//! - `InitResultC` and `ClassifyResultC` are owned by the caller after return
//!   and must be released with `image_classifier_init_result_free` /
//!   `image_classifier_result_free`
//! - Pixel buffers and option strings are borrowed for the call only
//!
//! # Thread Safety
//!
//! `image_classifier_classify` may run concurrently on one handle when the
//! engine supports it. Deinit must not race with classify on the same handle;
//! the host serializes init, classify and deinit per handle.

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::{debug, error};

use vision_ffi_common::{
    borrow_slice, convert_string_array, cstr_to_opt_string, cstr_to_str, free_boxed_slice,
    free_cstring, vec_into_raw, FfiResult,
};

use crate::engine::ClassifierFactory;
use crate::error::{BridgeError, EngineStatus, Result};
use crate::options::{ClassifierOptions, ModelSource};
use crate::registry::{self, INVALID_HANDLE};
use crate::types::Classifications;

/// `error_kind` value reported on success
pub const ERROR_KIND_NONE: c_int = 0;

lazy_static! {
    static ref FACTORY: RwLock<Option<Arc<dyn ClassifierFactory>>> = RwLock::new(None);
}

/// Install the engine used by `image_classifier_init_*`.
///
/// Replacing the factory does not affect classifiers already initialized.
pub fn install_factory(factory: Arc<dyn ClassifierFactory>) {
    *FACTORY.write() = Some(factory);
}

fn installed_factory() -> Result<Arc<dyn ClassifierFactory>> {
    FACTORY.read().clone().ok_or(BridgeError::EngineUnavailable)
}

/// C-compatible classifier options
///
/// Mirrors the host's options object. `score_threshold` is only read when
/// `is_score_threshold_set` is true.
#[repr(C)]
pub struct ClassifierOptionsC {
    /// Locale for display names (null-terminated, null for default)
    pub display_names_locale: *const c_char,
    /// Maximum categories per head (-1 for all)
    pub max_results: i32,
    pub is_score_threshold_set: bool,
    pub score_threshold: f32,
    /// Class names to keep (array of null-terminated strings)
    pub class_name_allow_list: *const *const c_char,
    pub class_name_allow_list_len: usize,
    /// Class names to drop (array of null-terminated strings)
    pub class_name_deny_list: *const *const c_char,
    pub class_name_deny_list_len: usize,
}

impl ClassifierOptionsC {
    /// Copy the host options into [`ClassifierOptions`].
    ///
    /// # Safety
    /// Every non-null pointer must satisfy the field documentation above.
    pub unsafe fn to_options(&self) -> Result<ClassifierOptions> {
        let mut options = ClassifierOptions::new().max_results(self.max_results);

        if let Some(locale) = unsafe { cstr_to_opt_string(self.display_names_locale) }
            .map_err(|e| BridgeError::InvalidArgument(format!("display names locale: {}", e)))?
        {
            options = options.display_names_locale(locale);
        }

        if self.is_score_threshold_set {
            options = options.score_threshold(self.score_threshold);
        }

        options.class_name_allow_list = unsafe {
            convert_string_array(self.class_name_allow_list, self.class_name_allow_list_len)
        }
        .map_err(|e| BridgeError::InvalidArgument(format!("class name allow list: {}", e)))?;

        options.class_name_deny_list = unsafe {
            convert_string_array(self.class_name_deny_list, self.class_name_deny_list_len)
        }
        .map_err(|e| BridgeError::InvalidArgument(format!("class name deny list: {}", e)))?;

        Ok(options)
    }
}

/// C-compatible category
#[repr(C)]
pub struct CategoryC {
    /// Display name if present, else class name (owned, must be freed)
    pub label: *mut c_char,
    pub score: f32,
}

/// C-compatible classifications for one output head
#[repr(C)]
pub struct ClassificationsC {
    /// Array of categories in engine order
    pub categories: *mut CategoryC,
    pub categories_len: usize,
    pub head_index: i32,
}

/// C-compatible result of `image_classifier_init_*`
#[repr(C)]
pub struct InitResultC {
    /// True if a classifier was created
    pub success: bool,
    /// Failure category (0 on success, see `FailureKind`)
    pub error_kind: c_int,
    /// Error message if success is false (owned, must be freed)
    pub error_msg: *mut c_char,
    /// Classifier handle, 0 on failure
    pub handle: u64,
}

/// C-compatible result of `image_classifier_classify`
#[repr(C)]
pub struct ClassifyResultC {
    /// True if classification succeeded
    pub success: bool,
    /// Failure category (0 on success, see `FailureKind`)
    pub error_kind: c_int,
    /// Error message if success is false (owned, must be freed)
    pub error_msg: *mut c_char,
    /// Array of per-head results (owned, freed with image_classifier_result_free)
    pub classifications: *mut ClassificationsC,
    /// Number of heads in array
    pub classifications_len: usize,
}

impl InitResultC {
    fn success(handle: u64) -> Self {
        Self {
            success: true,
            error_kind: ERROR_KIND_NONE,
            error_msg: ptr::null_mut(),
            handle,
        }
    }

    fn from_result(result: Result<u64>) -> Self {
        match result {
            Ok(handle) => Self::success(handle),
            Err(e) => Self::error(e.kind() as c_int, &e.to_string()),
        }
    }
}

impl FfiResult for InitResultC {
    const ERROR_FALLBACK: &'static str = "Error occurred when initializing classifier";

    fn error_fields(error_kind: c_int, error_msg: *mut c_char) -> Self {
        Self {
            success: false,
            error_kind,
            error_msg,
            handle: INVALID_HANDLE,
        }
    }
}

impl ClassifyResultC {
    /// Labels are converted up front so a label that cannot become a C string
    /// fails the whole call instead of being altered.
    fn success(records: Vec<Classifications>) -> Result<Self> {
        let labelled = records
            .into_iter()
            .map(|record| -> Result<(Vec<(CString, f32)>, i32)> {
                let categories = record
                    .categories
                    .into_iter()
                    .map(|c| {
                        CString::new(c.label)
                            .map(|label| (label, c.score))
                            .map_err(|e| {
                                BridgeError::InvalidArgument(format!(
                                    "category label contains a NUL byte at {}",
                                    e.nul_position()
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok((categories, record.head_index))
            })
            .collect::<Result<Vec<_>>>()?;

        let heads: Vec<ClassificationsC> = labelled
            .into_iter()
            .map(|(categories, head_index)| {
                let categories: Vec<CategoryC> = categories
                    .into_iter()
                    .map(|(label, score)| CategoryC {
                        label: label.into_raw(),
                        score,
                    })
                    .collect();
                let (categories, categories_len) = vec_into_raw(categories);
                ClassificationsC {
                    categories,
                    categories_len,
                    head_index,
                }
            })
            .collect();
        let (classifications, classifications_len) = vec_into_raw(heads);

        Ok(Self {
            success: true,
            error_kind: ERROR_KIND_NONE,
            error_msg: ptr::null_mut(),
            classifications,
            classifications_len,
        })
    }

    fn from_result(result: Result<Vec<Classifications>>) -> Self {
        match result.and_then(Self::success) {
            Ok(converted) => converted,
            Err(e) => Self::error(e.kind() as c_int, &e.to_string()),
        }
    }
}

impl FfiResult for ClassifyResultC {
    const ERROR_FALLBACK: &'static str = "Error occurred when classifying the image";

    fn error_fields(error_kind: c_int, error_msg: *mut c_char) -> Self {
        Self {
            success: false,
            error_kind,
            error_msg,
            classifications: ptr::null_mut(),
            classifications_len: 0,
        }
    }
}

fn initialize(options: Result<ClassifierOptions>, model: ModelSource) -> Result<u64> {
    let options = options?;
    let factory = installed_factory()?;
    catch_engine_panic(BridgeError::Initialization, || {
        registry::global().initialize(factory.as_ref(), options, model)
    })
}

/// Run engine code without letting a panic unwind into the host.
///
/// A panic becomes an engine failure wrapped by `wrap`.
fn catch_engine_panic<T>(
    wrap: fn(EngineStatus) -> BridgeError,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        error!(%reason, "image classifier engine panicked");
        Err(wrap(EngineStatus::internal(format!("engine panicked: {}", reason))))
    })
}

// ============================================================================
// Classifier Lifecycle
// ============================================================================

/// Create a classifier from a model region inside an open file.
///
/// # Arguments
/// - `fd`: Open file descriptor holding the model; stays owned by the caller
/// - `length`: Byte length of the model region
/// - `offset`: Byte offset of the model region
/// - `options`: Classifier options, or NULL for defaults
///
/// # Returns
/// `InitResultC` with a non-zero handle on success. On failure the handle is
/// 0 and `error_msg` carries the engine's message. Caller must call
/// `image_classifier_init_result_free`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn image_classifier_init_with_fd(
    fd: c_int,
    length: i64,
    offset: i64,
    options: *const ClassifierOptionsC,
) -> InitResultC {
    let options = if options.is_null() {
        Ok(ClassifierOptions::default())
    } else {
        unsafe { (*options).to_options() }
    };

    InitResultC::from_result(initialize(options, ModelSource::new(fd, length, offset)))
}

/// Create a classifier with options given as JSON.
///
/// Accepts the host config shape (`displayNamesLocale` or `locale`,
/// `maxResults`, `isScoreThresholdSet`, `scoreThreshold`, `classNameAllowList`,
/// `classNameDenyList`). Absent keys take their defaults; unknown keys fail
/// the call. `scoreThreshold` is ignored unless `isScoreThresholdSet` is true.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn image_classifier_init_with_fd_json(
    fd: c_int,
    length: i64,
    offset: i64,
    options_json: *const c_char,
) -> InitResultC {
    let options = match unsafe { cstr_to_str(options_json) } {
        Ok(json) => ClassifierOptions::from_json(json),
        Err(e) => Err(BridgeError::InvalidArgument(format!("options json: {}", e))),
    };

    InitResultC::from_result(initialize(options, ModelSource::new(fd, length, offset)))
}

/// Destroy the classifier behind `handle`.
///
/// Must be called exactly once per successful init. Unknown or already
/// released handles are logged and ignored.
#[no_mangle]
pub extern "C" fn image_classifier_deinit(handle: u64) {
    // unknown ids are already logged by the registry
    let _ = registry::global().release(handle);
}

/// Free the message held by an `InitResultC`.
#[no_mangle]
pub extern "C" fn image_classifier_init_result_free(result: InitResultC) {
    unsafe { free_cstring(result.error_msg) };
}

// ============================================================================
// Classification
// ============================================================================

/// Classify one RGB frame.
///
/// # Arguments
/// - `handle`: Handle from a successful init
/// - `pixels`: Row-major interleaved RGB bytes, no row padding
/// - `pixels_len`: Length of `pixels` in bytes
/// - `width`, `height`: Frame size in pixels
///
/// # Returns
/// `ClassifyResultC` with one entry per model output head. Caller must call
/// `image_classifier_result_free`.
///
/// # Safety
/// - `pixels` must point to at least `pixels_len` readable bytes
/// - The buffer is only read during this call
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn image_classifier_classify(
    handle: u64,
    pixels: *const u8,
    pixels_len: usize,
    width: u32,
    height: u32,
) -> ClassifyResultC {
    if pixels.is_null() && pixels_len > 0 {
        return ClassifyResultC::from_result(Err(BridgeError::InvalidArgument(
            "null pixel buffer".to_string(),
        )));
    }
    if pixels_len > isize::MAX as usize {
        return ClassifyResultC::from_result(Err(BridgeError::InvalidArgument(
            "pixel buffer length exceeds isize::MAX".to_string(),
        )));
    }

    let buffer = unsafe { borrow_slice(pixels, pixels_len) };
    debug!(handle, width, height, len = buffer.len(), "classify");

    ClassifyResultC::from_result(catch_engine_panic(BridgeError::Classification, || {
        registry::global().classify(handle, buffer, width, height)
    }))
}

/// Free a `ClassifyResultC` and everything it owns.
///
/// # Safety
/// - `result` must come from `image_classifier_classify`
/// - `result` must not be used after this call
#[no_mangle]
pub extern "C" fn image_classifier_result_free(result: ClassifyResultC) {
    unsafe {
        free_cstring(result.error_msg);

        if !result.classifications.is_null() && result.classifications_len > 0 {
            let heads = slice::from_raw_parts(result.classifications, result.classifications_len);

            for head in heads.iter() {
                if !head.categories.is_null() && head.categories_len > 0 {
                    let categories = slice::from_raw_parts(head.categories, head.categories_len);
                    for c in categories.iter() {
                        free_cstring(c.label);
                    }
                    free_boxed_slice(head.categories, head.categories_len);
                }
            }

            free_boxed_slice(result.classifications, result.classifications_len);
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Number of classifiers initialized and not yet released.
#[no_mangle]
pub extern "C" fn image_classifier_live_handles() -> usize {
    registry::global().len()
}

/// Install a tracing subscriber with `default_filter` (NULL for "info").
///
/// Returns false if a subscriber was already installed.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn image_classifier_init_logging(default_filter: *const c_char) -> bool {
    match unsafe { cstr_to_str(default_filter) } {
        Ok(filter) => crate::logging::init_with_filter(filter),
        Err(_) => crate::logging::init(),
    }
}

vision_ffi_common::define_string_free!(image_classifier_string_free);

vision_ffi_common::define_version_fn!(image_classifier_version);
