//! C-ABI wrapper around `collect-core`.
//!
//! # Overview
//! Exposes URL building, request/response codec and the callback-style data
//! fetch through `extern "C"` functions.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `collect_build_fetch` / `collect_parse_fetch` let the host do its own
//!   I/O; `collect_fetch_data` does the I/O on a worker thread instead.
//! - The C caller owns all returned pointers and must call the matching
//!   `collect_free_*` function to release them.

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use collect_core::{ClientConfig, DataClient, Fetcher, HttpResponse, Origin};
use tracing::debug;

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8, which
/// callers reject like a missing argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `scheme://hostname:port`.
///
/// `port_override` may be null; when non-null and non-empty it replaces
/// `port` in every URL. Returns null if any other argument is null, or if
/// any argument is not valid UTF-8.
/// The caller must free the returned pointer with `collect_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn collect_client_new(
    scheme: *const c_char,
    hostname: *const c_char,
    port: *const c_char,
    port_override: *const c_char,
) -> *mut FfiClient {
    catch_unwind(AssertUnwindSafe(|| {
        let (Some(scheme), Some(hostname), Some(port)) =
            (unsafe { str_arg(scheme) }, unsafe { str_arg(hostname) }, unsafe { str_arg(port) })
        else {
            return std::ptr::null_mut();
        };
        let mut config = ClientConfig::new(Origin::new(scheme, hostname, port));
        if !port_override.is_null() {
            let Some(over) = (unsafe { str_arg(port_override) }) else {
                return std::ptr::null_mut();
            };
            config = config.with_port_override(over);
        }
        let inner = Fetcher::new(DataClient::new(config));
        Box::into_raw(Box::new(FfiClient { inner }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `collect_client_new`. Safe to call with null.
///
/// Fetches already in flight keep their own reference and complete normally.
#[unsafe(no_mangle)]
pub extern "C" fn collect_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// URL and request building
// ---------------------------------------------------------------------------

/// Build the absolute URL for `path`. Returns null if an argument is null
/// or `path` is not valid UTF-8. Free the result with `collect_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn collect_build_url(client: *const FfiClient, path: *const c_char) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(path) = (unsafe { str_arg(path) }) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        let url = client.inner.build_url(path);
        to_c_string(&url)
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Build a GET request for `path`. Returns null if an argument is null or
/// `path` is not valid UTF-8. Free the result with `collect_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn collect_build_fetch(
    client: *const FfiClient,
    path: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(path) = (unsafe { str_arg(path) }) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        let req = client.inner.client().build_fetch(path);
        FfiHttpRequest::from_core(req)
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        // Lossy: a non-UTF-8 body still reaches the decoder and fails there.
        unsafe { CStr::from_ptr(resp.body) }
            .to_string_lossy()
            .into_owned()
    };
    HttpResponse {
        status: resp.status,
        body,
    }
}

/// Decode a response obtained by executing a `collect_build_fetch` request.
///
/// Free the result with `collect_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn collect_parse_fetch(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFetchResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiFetchResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFetchResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.client().parse_fetch(ffi_response_to_core(resp)) {
            Ok(value) => FfiFetchResult::ok(&value),
            Err(e) => FfiFetchResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiFetchResult::panic("panic in collect_parse_fetch"))
}

// ---------------------------------------------------------------------------
// Fetch with callback
// ---------------------------------------------------------------------------

/// GET `path` on a worker thread and pass the decoded JSON text to
/// `callback`, together with `user_data`.
///
/// `callback` runs at most once, whenever the body decodes as JSON; transport
/// and decode failures are logged and never reported. Returns `false`
/// without starting a request if an argument is null or `path` is not valid
/// UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn collect_fetch_data(
    client: *const FfiClient,
    path: *const c_char,
    callback: Option<FfiDataCallback>,
    user_data: *mut c_void,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(callback) = callback else {
            return false;
        };
        if client.is_null() {
            return false;
        }
        let Some(path) = (unsafe { str_arg(path) }) else {
            return false;
        };
        let client = unsafe { &*client };
        let target = CallbackTarget::new(callback, user_data);
        debug!(path, "scheduling fetch");
        // Detached: completion is signalled only through the callback.
        let _ = client
            .inner
            .fetch_data(path, move |value| target.deliver(&value));
        true
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `collect_build_fetch`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn collect_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers: Box<[FfiHeader]> = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    }));
}

/// Free an `FfiFetchResult` returned by `collect_parse_fetch`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn collect_free_result(result: *mut FfiFetchResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.json.is_null() {
            drop(unsafe { CString::from_raw(result.json) });
        }
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn collect_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { CString::from_raw(s) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
