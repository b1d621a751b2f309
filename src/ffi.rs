//! Raw ABI surface of the native chdb library.
//!
//! Nothing here is interpreted beyond what the engine's C header promises:
//! connections are opaque double pointers, results are a fixed-layout struct
//! whose allocations are owned by the engine and returned to it through
//! `free_result_v2`.

use std::os::raw::{c_char, c_int, c_void};

/// Opaque native connection object. Only ever handled behind pointers.
#[repr(C)]
pub struct ChdbConn {
    _private: [u8; 0],
}

/// Connection handle as the engine hands it out: a pointer to a pointer,
/// reflecting the engine's own indirection for connection objects.
pub type ConnHandle = *mut *mut ChdbConn;

/// Result struct returned by `query_conn`. Layout fixed by the engine.
#[repr(C)]
pub struct LocalResultV2 {
    /// Serialized query output in the requested format. May be null.
    pub buf: *mut c_char,
    /// Length of `buf` in bytes.
    pub len: usize,
    /// Engine-internal backing vector. Never dereferenced on this side.
    pub _vec: *mut c_void,
    /// Query wall time in seconds.
    pub elapsed: f64,
    pub rows_read: u64,
    pub bytes_read: u64,
    /// Non-null when the query failed; owned by the result allocation.
    pub error_message: *mut c_char,
}

pub type ConnectFn = unsafe extern "C" fn(c_int, *mut *mut c_char) -> ConnHandle;
pub type CloseConnFn = unsafe extern "C" fn(ConnHandle);
pub type QueryConnFn =
    unsafe extern "C" fn(*mut ChdbConn, *const c_char, *const c_char) -> *mut LocalResultV2;
pub type FreeResultFn = unsafe extern "C" fn(*mut LocalResultV2);

/// Exported symbol names of the four entry points.
pub const SYM_CONNECT: &[u8] = b"connect_chdb\0";
pub const SYM_CLOSE_CONN: &[u8] = b"close_conn\0";
pub const SYM_QUERY_CONN: &[u8] = b"query_conn\0";
pub const SYM_FREE_RESULT: &[u8] = b"free_result_v2\0";
