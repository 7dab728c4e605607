//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible fields: `*mut c_char`
//! instead of `String`, a pointer plus length instead of `Vec`. Decoded JSON
//! crosses the boundary as text so C callers can use any JSON library.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use collect_core::{FetchError, Fetcher, HttpRequest};
use serde_json::Value;

/// Opaque handle to a `Fetcher`. C callers receive a pointer to this and
/// pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: Fetcher,
}

/// Copy `s` into a heap C string. Interior NULs are dropped.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A GET request described as C-compatible plain data.
///
/// Built by `collect_build_fetch`. The C caller executes the request and
/// hands the response to `collect_parse_fetch`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = to_c_string(&req.url);
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            // into_boxed_slice so capacity == len when freed.
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(&k),
                    value: to_c_string(&v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            url,
            headers,
            headers_len,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// The FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Http = 1,
    Decode = 2,
    Transport = 3,
    InvalidOrigin = 4,
    Panic = 5,
    NullArg = 6,
}

/// Result envelope for `collect_parse_fetch`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `json` holds
/// the decoded value re-serialized as compact JSON. On failure `json` is null.
#[repr(C)]
pub struct FfiFetchResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub json: *mut c_char,
}

impl FfiFetchResult {
    fn boxed(error_code: FfiErrorCode, message: Option<String>, http_status: u16, json: *mut c_char) -> *mut Self {
        Box::into_raw(Box::new(FfiFetchResult {
            error_code,
            error_message: message.map_or(std::ptr::null_mut(), |m| to_c_string(&m)),
            http_status,
            json,
        }))
    }

    pub(crate) fn ok(value: &Value) -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, None, 0, to_c_string(&value.to_string()))
    }

    pub(crate) fn from_error(err: FetchError) -> *mut Self {
        let (code, status) = match &err {
            FetchError::HttpStatus { status, .. } => (FfiErrorCode::Http, *status),
            FetchError::Decode(_) => (FfiErrorCode::Decode, 0),
            FetchError::Transport(_) => (FfiErrorCode::Transport, 0),
            FetchError::InvalidOrigin(_) => (FfiErrorCode::InvalidOrigin, 0),
        };
        Self::boxed(code, Some(err.to_string()), status, std::ptr::null_mut())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            Some(format!("null argument: {name}")),
            0,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, Some(msg.to_string()), 0, std::ptr::null_mut())
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Receives decoded JSON text on a worker thread. `json` is only valid for
/// the duration of the call.
pub type FfiDataCallback = extern "C" fn(json: *const c_char, user_data: *mut c_void);

/// Callback plus the caller's context pointer, moved to the worker thread.
pub(crate) struct CallbackTarget {
    callback: FfiDataCallback,
    user_data: *mut c_void,
}

// SAFETY: the C caller promises `user_data` may be used from another thread
// until the callback has run.
unsafe impl Send for CallbackTarget {}

impl CallbackTarget {
    pub(crate) fn new(callback: FfiDataCallback, user_data: *mut c_void) -> Self {
        Self { callback, user_data }
    }

    pub(crate) fn deliver(&self, value: &Value) {
        let text = CString::new(value.to_string().replace('\0', "")).unwrap_or_default();
        (self.callback)(text.as_ptr(), self.user_data);
    }
}
