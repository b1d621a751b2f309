use std::ffi::CString;
use std::ptr;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ChdbError, Result};
use crate::ffi::ConnHandle;
use crate::result::LocalResult;
use crate::traits::QueryEngine;

/// Owned handle over one native engine connection.
///
/// The wrapped pointer is either a live connection or null once closed; the
/// native close entry point runs exactly once, whether `close` is called
/// explicitly, the connection is dropped, or both.
pub struct Connection {
    engine: Arc<dyn QueryEngine>,
    handle: ConnHandle,
}

// A connection may move between threads. It is not Sync: close mutates the
// handle non-atomically, so sharing requires external serialization.
unsafe impl Send for Connection {}

impl Connection {
    /// Open a connection by passing `args` to the engine as a native-style
    /// argument vector.
    ///
    /// Every element must be free of embedded NUL bytes; offending arguments
    /// are rejected before any native call. A connection is only returned
    /// when the engine handed back a live handle.
    pub fn open<S: AsRef<str>>(engine: Arc<dyn QueryEngine>, args: &[S]) -> Result<Self> {
        let c_args = args
            .iter()
            .map(|arg| to_cstring(arg.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let handle = engine.connect(&c_args);
        if handle.is_null() {
            return Err(ChdbError::Native("Failed to connect to chdb".into()));
        }

        debug!(args = args.len(), "opened chdb connection");
        Ok(Self { engine, handle })
    }

    /// Run `sql` and return the result serialized in `format` (for example
    /// `"CSV"` or `"JSON"`).
    pub fn query(&self, sql: &str, format: &str) -> Result<LocalResult> {
        if self.handle.is_null() {
            return Err(ChdbError::Usage("query called on a closed connection".into()));
        }

        let sql = to_cstring(sql)?;
        let format = to_cstring(format)?;

        // The engine's query entry point takes the inner pointer, one level
        // below the handle it returned from connect.
        let raw = unsafe { self.engine.query(*self.handle, &sql, &format) };
        LocalResult::from_native(Arc::clone(&self.engine), raw)
    }

    /// Close the connection. Idempotent: repeated calls are no-ops.
    pub fn close(&mut self) {
        if !self.handle.is_null() {
            debug!("closing chdb connection");
            unsafe { self.engine.close_connection(self.handle) };
            self.handle = ptr::null_mut();
        }
    }

    /// Whether the connection has been closed.
    pub fn closed(&self) -> bool {
        self.handle.is_null()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

fn to_cstring(value: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| ChdbError::InvalidArgument(format!("string contains a NUL byte: {value:?}")))
}
