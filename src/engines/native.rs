use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{ChdbError, Result};
use crate::ffi::{
    ChdbConn, CloseConnFn, ConnHandle, ConnectFn, FreeResultFn, LocalResultV2, QueryConnFn,
    SYM_CLOSE_CONN, SYM_CONNECT, SYM_FREE_RESULT, SYM_QUERY_CONN,
};
use crate::traits::QueryEngine;

#[cfg(target_os = "macos")]
const LIB_FILENAME: &str = "libchdb.dylib";
#[cfg(target_os = "windows")]
const LIB_FILENAME: &str = "chdb.dll";
#[cfg(all(unix, not(target_os = "macos")))]
const LIB_FILENAME: &str = "libchdb.so";

static GLOBAL: OnceCell<Arc<NativeEngine>> = OnceCell::new();

/// The real chdb engine, backed by the shared library loaded at runtime.
///
/// Holds the four resolved entry points as plain function pointers and keeps
/// the [`Library`] alive for as long as any handle may still call into it.
/// Dropping the last `Arc<NativeEngine>` unloads the library; no further
/// native calls are possible after that point.
pub struct NativeEngine {
    connect: ConnectFn,
    close_conn: CloseConnFn,
    query_conn: QueryConnFn,
    free_result: FreeResultFn,
    path: PathBuf,
    // Dropped last: the function pointers above point into this mapping.
    _lib: Library,
}

impl NativeEngine {
    /// Load the engine from `<base_dir>/lib/chdb/lib/<platform filename>`.
    ///
    /// Either every entry point resolves and a fully usable engine is
    /// returned, or the library is closed again and an error is raised; a
    /// partially initialized engine is never observable.
    pub fn load(base_dir: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = Self::library_path(base_dir.as_ref());
        let lib = open_library(&path).map_err(|e| ChdbError::LibraryLoad {
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded chdb library");

        let mut missing = Vec::new();
        let connect = resolve::<ConnectFn>(&lib, SYM_CONNECT, "connect_chdb", &mut missing);
        let close_conn = resolve::<CloseConnFn>(&lib, SYM_CLOSE_CONN, "close_conn", &mut missing);
        let query_conn = resolve::<QueryConnFn>(&lib, SYM_QUERY_CONN, "query_conn", &mut missing);
        let free_result =
            resolve::<FreeResultFn>(&lib, SYM_FREE_RESULT, "free_result_v2", &mut missing);

        let (Some(connect), Some(close_conn), Some(query_conn), Some(free_result)) =
            (connect, close_conn, query_conn, free_result)
        else {
            // Close the handle before reporting; nothing half-open survives.
            drop(lib);
            return Err(ChdbError::SymbolResolution { missing });
        };

        debug!("resolved chdb entry points");
        Ok(Arc::new(Self {
            connect,
            close_conn,
            query_conn,
            free_result,
            path,
            _lib: lib,
        }))
    }

    /// Load the engine once for the whole process and memoize it.
    ///
    /// Concurrent callers are serialized; every caller observes the same
    /// engine. The memoized engine stays loaded for the rest of the process.
    pub fn initialize(base_dir: impl AsRef<Path>) -> Result<Arc<Self>> {
        GLOBAL.get_or_try_init(|| Self::load(base_dir)).cloned()
    }

    /// The process-wide engine established by [`NativeEngine::initialize`].
    pub fn global() -> Result<Arc<Self>> {
        GLOBAL.get().cloned().ok_or_else(|| {
            ChdbError::Usage(
                "chdb engine is not initialized, call NativeEngine::initialize first".into(),
            )
        })
    }

    /// Filesystem path the library is expected at, relative to the host
    /// package's installation directory.
    pub fn library_path(base_dir: &Path) -> PathBuf {
        base_dir.join("lib").join("chdb").join("lib").join(LIB_FILENAME)
    }

    /// Path the library was actually loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QueryEngine for NativeEngine {
    fn connect(&self, args: &[CString]) -> ConnHandle {
        let mut argv: Vec<*mut c_char> =
            args.iter().map(|a| a.as_ptr() as *mut c_char).collect();
        unsafe { (self.connect)(argv.len() as c_int, argv.as_mut_ptr()) }
    }

    unsafe fn close_connection(&self, conn: ConnHandle) {
        (self.close_conn)(conn);
    }

    unsafe fn query(&self, conn: *mut ChdbConn, sql: &CStr, format: &CStr) -> *mut LocalResultV2 {
        (self.query_conn)(conn, sql.as_ptr(), format.as_ptr())
    }

    unsafe fn free_result(&self, result: *mut LocalResultV2) {
        (self.free_result)(result);
    }
}

/// Open the library for lazy, global symbol binding. The engine requires its
/// exports to be visible to dependent libraries it loads afterwards, so
/// RTLD_GLOBAL is mandatory on unix.
#[cfg(unix)]
fn open_library(path: &Path) -> std::result::Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_LAZY};
    unsafe { UnixLibrary::open(Some(path), RTLD_LAZY | RTLD_GLOBAL).map(Library::from) }
}

#[cfg(not(unix))]
fn open_library(path: &Path) -> std::result::Result<Library, libloading::Error> {
    unsafe { Library::new(path) }
}

/// Resolve one symbol to a plain function pointer, recording a miss instead
/// of failing so the caller can report every missing function at once.
fn resolve<T: Copy>(
    lib: &Library,
    symbol: &[u8],
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<T> {
    match unsafe { lib.get::<T>(symbol) } {
        Ok(sym) => Some(*sym),
        Err(_) => {
            missing.push(name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_path_follows_package_layout() {
        let path = NativeEngine::library_path(Path::new("/opt/pkg"));
        let expected: PathBuf = ["/opt/pkg", "lib", "chdb", "lib", LIB_FILENAME]
            .iter()
            .collect();
        assert_eq!(path, expected);
    }

    #[test]
    fn test_load_reports_attempted_path_on_missing_library() {
        match NativeEngine::load("/nonexistent/chdb-install") {
            Err(ChdbError::LibraryLoad { path, .. }) => {
                assert!(path.starts_with("/nonexistent/chdb-install"));
                assert!(path.ends_with(LIB_FILENAME));
            }
            other => panic!("Expected LibraryLoad error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_global_before_initialize_is_a_usage_error() {
        // The memoized engine can never be set in tests (no library on disk),
        // so global() must keep failing with a usage error.
        match NativeEngine::global() {
            Err(ChdbError::Usage(msg)) => assert!(msg.contains("not initialized")),
            other => panic!("Expected Usage error, got {:?}", other.map(|_| ())),
        }
    }
}
