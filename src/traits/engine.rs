use std::ffi::{CStr, CString};

use crate::ffi::{ChdbConn, ConnHandle, LocalResultV2};

/// Trait over the four entry points of the chdb engine.
/// Engines are responsible for:
/// - Producing and closing native connection handles
/// - Running queries against a live connection
/// - Reclaiming result allocations they handed out
///
/// Implemented by [`NativeEngine`](crate::engines::NativeEngine) for the real
/// shared library and by [`MockEngine`](crate::engines::MockEngine) for tests.
/// Constructed once, then shared by `Arc` into every handle that must call
/// back into the engine to release its resource.
pub trait QueryEngine: Send + Sync {
    /// Call the engine's connect entry point with a native-style argv.
    /// A null return means the engine refused the connection.
    fn connect(&self, args: &[CString]) -> ConnHandle;

    /// Close a connection handle previously returned by [`connect`].
    ///
    /// # Safety
    /// `conn` must be a live handle from this engine, closed at most once.
    unsafe fn close_connection(&self, conn: ConnHandle);

    /// Run a query on the inner connection pointer. May return null.
    ///
    /// # Safety
    /// `conn` must be the dereferenced pointer of a live handle from this
    /// engine.
    unsafe fn query(&self, conn: *mut ChdbConn, sql: &CStr, format: &CStr) -> *mut LocalResultV2;

    /// Return a result allocation to the engine.
    ///
    /// # Safety
    /// `result` must be a non-null result from [`query`], freed at most once.
    unsafe fn free_result(&self, result: *mut LocalResultV2);
}
