//! Common C-ABI utilities for the vision task bridges.
//!
//! Hosts (JNI shims, CGO, Swift) talk to the bridges through plain C types.
//! This crate holds the conversions every bridge needs so each one does not
//! re-implement them.
//!
//! # Memory Ownership
//!
//! - Functions returning `*mut c_char` transfer ownership to the caller
//! - Arrays returned through [`vec_into_raw`] are owned by the caller and
//!   released with [`free_boxed_slice`]
//! - Borrowed inputs (`*const c_char`, string arrays) are copied; the caller
//!   keeps ownership
//! - NULL pointers are handled safely (no-op for free functions)

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

/// Convert a Rust string to an owned C string, substituting `fallback` if the
/// input contains an interior NUL byte.
///
/// The returned pointer is owned by the caller and must be released with
/// [`free_cstring`].
///
/// # Example
/// ```
/// use vision_ffi_common::{cstring_new_or_fallback, free_cstring};
///
/// let ptr = cstring_new_or_fallback("tabby", "unknown");
/// unsafe { free_cstring(ptr) };
/// ```
#[inline]
pub fn cstring_new_or_fallback(s: &str, fallback: &'static str) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(_) => CString::new(fallback).unwrap_or_default().into_raw(),
    }
}

/// Release a C string previously handed out by this crate.
///
/// Does nothing if the pointer is null.
///
/// # Safety
/// The pointer must have been allocated by `CString::into_raw()` or be null.
#[inline]
pub unsafe fn free_cstring(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

/// Release a boxed slice previously produced by [`vec_into_raw`].
///
/// Does nothing if the pointer is null or length is zero.
///
/// # Safety
/// The pointer and length must come from `vec_into_raw` and must not have
/// been released already.
#[inline]
pub unsafe fn free_boxed_slice<T>(ptr: *mut T, len: usize) {
    if !ptr.is_null() && len > 0 {
        unsafe {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
        }
    }
}

/// Hand a vector to the caller as a raw pointer and length.
///
/// Empty vectors become `(null, 0)` so hosts can test a single pointer.
#[inline]
pub fn vec_into_raw<T>(vec: Vec<T>) -> (*mut T, usize) {
    let len = vec.len();
    if len == 0 {
        (ptr::null_mut(), 0)
    } else {
        (Box::into_raw(vec.into_boxed_slice()) as *mut T, len)
    }
}

/// Borrow a caller-owned array as a slice.
///
/// A null pointer or zero length yields an empty slice.
///
/// # Safety
/// When non-null, `ptr` must point to `len` initialized values that stay
/// alive and unmodified for `'a`.
#[inline]
pub unsafe fn borrow_slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        unsafe { slice::from_raw_parts(ptr, len) }
    }
}

/// Copy a C string array into owned Rust strings, preserving order.
///
/// # Returns
/// `Ok(Vec<String>)` on success, `Err(String)` naming the offending index.
///
/// # Safety
/// - `arr` must point to `len` C string pointers, or be null (if len is 0)
/// - Each non-null entry must be NUL-terminated
pub unsafe fn convert_string_array(
    arr: *const *const c_char,
    len: usize,
) -> Result<Vec<String>, String> {
    let entries = unsafe { borrow_slice(arr, len) };
    let mut out = Vec::with_capacity(entries.len());

    for (i, &entry) in entries.iter().enumerate() {
        if entry.is_null() {
            return Err(format!("null string at index {}", i));
        }
        let s = unsafe { CStr::from_ptr(entry) }
            .to_str()
            .map_err(|_| format!("invalid UTF-8 at index {}", i))?;
        out.push(s.to_owned());
    }

    Ok(out)
}

/// Borrow a C string as `&str`.
///
/// # Returns
/// `Ok(&str)` on success, `Err(&'static str)` for null or non-UTF-8 input.
///
/// # Safety
/// The pointer must be valid and NUL-terminated, or null.
pub unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Result<&'a str, &'static str> {
    if ptr.is_null() {
        return Err("null pointer");
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| "invalid UTF-8")
}

/// Copy an optional C string. Null maps to `Ok(None)`.
///
/// # Safety
/// The pointer must be valid and NUL-terminated, or null.
pub unsafe fn cstr_to_opt_string(ptr: *const c_char) -> Result<Option<String>, &'static str> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { cstr_to_str(ptr) }.map(|s| Some(s.to_owned()))
}

/// Trait for `#[repr(C)]` result structs that report failures to the host.
///
/// Implementors describe how to build their failure shape; callers then get
/// a uniform `error(kind, msg)` constructor that takes care of the message
/// allocation.
///
/// # Example
/// ```ignore
/// #[repr(C)]
/// pub struct LoadResultC {
///     pub success: bool,
///     pub error_kind: c_int,
///     pub error_msg: *mut c_char,
///     pub handle: u64,
/// }
///
/// impl FfiResult for LoadResultC {
///     const ERROR_FALLBACK: &'static str = "load failed";
///
///     fn error_fields(error_kind: c_int, error_msg: *mut c_char) -> Self {
///         Self { success: false, error_kind, error_msg, handle: 0 }
///     }
/// }
/// ```
pub trait FfiResult: Sized {
    /// Message used when the real one contains interior NUL bytes.
    const ERROR_FALLBACK: &'static str;

    /// Build the failure shape around an already-allocated message.
    fn error_fields(error_kind: c_int, error_msg: *mut c_char) -> Self;

    /// Build a failure result carrying `msg`.
    #[inline]
    fn error(error_kind: c_int, msg: &str) -> Self {
        let error_msg = cstring_new_or_fallback(msg, Self::ERROR_FALLBACK);
        Self::error_fields(error_kind, error_msg)
    }
}

/// Generate a version function that returns a static C string.
///
/// # Example
/// ```ignore
/// vision_ffi_common::define_version_fn!(my_task_version);
/// ```
#[macro_export]
macro_rules! define_version_fn {
    ($fn_name:ident) => {
        #[no_mangle]
        pub extern "C" fn $fn_name() -> *const std::os::raw::c_char {
            concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const std::os::raw::c_char
        }
    };
}

/// Generate a string free function for messages handed to the host.
///
/// # Example
/// ```ignore
/// vision_ffi_common::define_string_free!(my_task_string_free);
/// ```
#[macro_export]
macro_rules! define_string_free {
    ($fn_name:ident) => {
        #[no_mangle]
        #[allow(clippy::not_unsafe_ptr_arg_deref)]
        pub extern "C" fn $fn_name(s: *mut std::os::raw::c_char) {
            unsafe { $crate::free_cstring(s) };
        }
    };
}
