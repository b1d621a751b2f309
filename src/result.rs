use std::ffi::CStr;
use std::ptr;
use std::slice;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{ChdbError, Result};
use crate::ffi::LocalResultV2;
use crate::traits::QueryEngine;

/// Owned handle over one native result allocation.
///
/// Accessors borrow from native memory, so the buffer can only be read while
/// the result is alive; dropping the result returns the allocation to the
/// engine exactly once.
pub struct LocalResult {
    engine: Arc<dyn QueryEngine>,
    raw: *mut LocalResultV2,
}

// A result may move between threads but must not be shared: disposal racing
// an accessor is a caller bug this layer does not lock against.
unsafe impl Send for LocalResult {}

impl LocalResult {
    /// Classify a raw pointer returned by the query entry point and take
    /// ownership of it.
    ///
    /// A null pointer carries no allocation and maps straight to an error.
    /// A non-null pointer with `error_message` set is still an owned
    /// allocation: the message is copied out and the struct is freed before
    /// the error is raised, so the error path never leaks.
    pub(crate) fn from_native(
        engine: Arc<dyn QueryEngine>,
        raw: *mut LocalResultV2,
    ) -> Result<Self> {
        if raw.is_null() {
            return Err(ChdbError::Native("Query failed with nil result".into()));
        }

        let error_message = unsafe { (*raw).error_message };
        if !error_message.is_null() {
            let message = unsafe { CStr::from_ptr(error_message) }
                .to_string_lossy()
                .into_owned();
            unsafe { engine.free_result(raw) };
            return Err(ChdbError::Native(format!("CHDB error: {message}")));
        }

        trace!(len = unsafe { (*raw).len }, "wrapped native result");
        Ok(Self { engine, raw })
    }

    /// The serialized output buffer, or `None` for an empty result.
    pub fn buf(&self) -> Option<&[u8]> {
        let raw = unsafe { &*self.raw };
        if raw.buf.is_null() || raw.len == 0 {
            return None;
        }
        Some(unsafe { slice::from_raw_parts(raw.buf as *const u8, raw.len) })
    }

    /// The output buffer as bytes, empty when the result carried none.
    pub fn buf_bytes(&self) -> Vec<u8> {
        self.buf().map(<[u8]>::to_vec).unwrap_or_default()
    }

    /// Query wall time in seconds.
    pub fn elapsed(&self) -> f64 {
        unsafe { (*self.raw).elapsed }
    }

    pub fn rows_read(&self) -> u64 {
        unsafe { (*self.raw).rows_read }
    }

    pub fn bytes_read(&self) -> u64 {
        unsafe { (*self.raw).bytes_read }
    }
}

impl Drop for LocalResult {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            debug!("freeing native result");
            unsafe { self.engine.free_result(self.raw) };
            self.raw = ptr::null_mut();
        }
    }
}
