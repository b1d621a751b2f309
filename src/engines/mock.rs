use std::collections::VecDeque;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::ffi::{ChdbConn, ConnHandle, LocalResultV2};
use crate::traits::QueryEngine;

/// A recorded query execution for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub format: String,
}

/// A canned engine response for one query call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// A successful result carrying a serialized output buffer.
    Data {
        body: Vec<u8>,
        elapsed: f64,
        rows_read: u64,
        bytes_read: u64,
    },
    /// A result allocation whose `error_message` field is set.
    Error(String),
    /// A null result pointer, as the engine returns on hard failure.
    Nil,
}

/// An in-memory engine for testing.
///
/// Implements [`QueryEngine`] over genuinely heap-allocated connection
/// handles and `LocalResultV2` structs, so the ownership contract — every
/// allocation closed or freed exactly once — is observable through the
/// counters below without loading the native library.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use chdb::engines::{MockEngine, MockResponseBuilder};
///
/// let engine = Arc::new(
///     MockEngine::new().with_response(
///         MockResponseBuilder::new().body("1\n").rows_read(1).build(),
///     ),
/// );
/// ```
pub struct MockEngine {
    responses: Mutex<VecDeque<MockResponse>>,
    recorded_queries: Mutex<Vec<RecordedQuery>>,
    connect_args: Mutex<Vec<Vec<String>>>,
    fail_connect: AtomicBool,
    connects: AtomicUsize,
    closes: AtomicUsize,
    frees: AtomicUsize,
    live_connections: AtomicUsize,
    live_results: AtomicUsize,
}

impl MockEngine {
    /// Create a new mock engine with no pre-configured responses.
    /// Queries answered with no queued response produce an empty result.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            recorded_queries: Mutex::new(Vec::new()),
            connect_args: Mutex::new(Vec::new()),
            fail_connect: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            frees: AtomicUsize::new(0),
            live_connections: AtomicUsize::new(0),
            live_results: AtomicUsize::new(0),
        }
    }

    /// Add a response to be returned by the next query.
    /// Responses are returned in FIFO order.
    pub fn with_response(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Add multiple responses to be returned by subsequent queries.
    pub fn with_responses(self, responses: impl IntoIterator<Item = MockResponse>) -> Self {
        let mut queue = self.responses.lock().unwrap();
        for response in responses {
            queue.push_back(response);
        }
        drop(queue);
        self
    }

    /// Make every subsequent connect call return a null handle.
    pub fn with_connect_failure(self) -> Self {
        self.fail_connect.store(true, Ordering::SeqCst);
        self
    }

    /// Argument vectors seen by successful and failed connect calls.
    pub fn recorded_connect_args(&self) -> Vec<Vec<String>> {
        self.connect_args.lock().unwrap().clone()
    }

    /// All queries executed so far, in order.
    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.recorded_queries.lock().unwrap().clone()
    }

    /// The most recent query, if any.
    pub fn last_query(&self) -> Option<RecordedQuery> {
        self.recorded_queries.lock().unwrap().last().cloned()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn free_count(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }

    /// Connections handed out and not yet closed.
    pub fn live_connections(&self) -> usize {
        self.live_connections.load(Ordering::SeqCst)
    }

    /// Result allocations handed out and not yet freed.
    pub fn live_results(&self) -> usize {
        self.live_results.load(Ordering::SeqCst)
    }

    /// Assert that the last query matches the expected SQL and format.
    pub fn assert_last_query(&self, expected_sql: &str, expected_format: &str) {
        let last = self.last_query().expect("No queries were recorded");
        assert_eq!(
            last.sql, expected_sql,
            "SQL mismatch.\nExpected: {}\nActual: {}",
            expected_sql, last.sql
        );
        assert_eq!(
            last.format, expected_format,
            "Format mismatch.\nExpected: {}\nActual: {}",
            expected_format, last.format
        );
    }

    fn alloc_result(&self, response: MockResponse) -> *mut LocalResultV2 {
        let result = match response {
            MockResponse::Nil => return ptr::null_mut(),
            MockResponse::Error(message) => {
                let message = CString::new(message)
                    .unwrap_or_else(|_| CString::new("mock error").unwrap());
                LocalResultV2 {
                    buf: ptr::null_mut(),
                    len: 0,
                    _vec: ptr::null_mut(),
                    elapsed: 0.0,
                    rows_read: 0,
                    bytes_read: 0,
                    error_message: message.into_raw(),
                }
            }
            MockResponse::Data {
                body,
                elapsed,
                rows_read,
                bytes_read,
            } => {
                let len = body.len();
                let buf = if len == 0 {
                    ptr::null_mut()
                } else {
                    Box::into_raw(body.into_boxed_slice()) as *mut u8 as *mut c_char
                };
                LocalResultV2 {
                    buf,
                    len,
                    _vec: ptr::null_mut(),
                    elapsed,
                    rows_read,
                    bytes_read,
                    error_message: ptr::null_mut(),
                }
            }
        };
        self.live_results.fetch_add(1, Ordering::SeqCst);
        Box::into_raw(Box::new(result))
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine for MockEngine {
    fn connect(&self, args: &[CString]) -> ConnHandle {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.connect_args.lock().unwrap().push(
            args.iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
        );

        if self.fail_connect.load(Ordering::SeqCst) {
            return ptr::null_mut();
        }

        self.live_connections.fetch_add(1, Ordering::SeqCst);
        let inner = Box::into_raw(Box::new(0u8)) as *mut ChdbConn;
        Box::into_raw(Box::new(inner))
    }

    unsafe fn close_connection(&self, conn: ConnHandle) {
        let outer = Box::from_raw(conn);
        drop(Box::from_raw(*outer as *mut u8));
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.live_connections.fetch_sub(1, Ordering::SeqCst);
    }

    unsafe fn query(&self, _conn: *mut ChdbConn, sql: &CStr, format: &CStr) -> *mut LocalResultV2 {
        self.recorded_queries.lock().unwrap().push(RecordedQuery {
            sql: sql.to_string_lossy().into_owned(),
            format: format.to_string_lossy().into_owned(),
        });

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockResponse::Data {
                body: Vec::new(),
                elapsed: 0.0,
                rows_read: 0,
                bytes_read: 0,
            });
        self.alloc_result(response)
    }

    unsafe fn free_result(&self, result: *mut LocalResultV2) {
        let result = Box::from_raw(result);
        if !result.buf.is_null() {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                result.buf as *mut u8,
                result.len,
            )));
        }
        if !result.error_message.is_null() {
            drop(CString::from_raw(result.error_message));
        }
        self.frees.fetch_add(1, Ordering::SeqCst);
        self.live_results.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Builder for creating successful mock responses easily.
pub struct MockResponseBuilder {
    body: Vec<u8>,
    elapsed: f64,
    rows_read: u64,
    bytes_read: u64,
}

impl MockResponseBuilder {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            elapsed: 0.0,
            rows_read: 0,
            bytes_read: 0,
        }
    }

    /// Set the serialized output buffer.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn elapsed(mut self, elapsed: f64) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn rows_read(mut self, rows_read: u64) -> Self {
        self.rows_read = rows_read;
        self
    }

    pub fn bytes_read(mut self, bytes_read: u64) -> Self {
        self.bytes_read = bytes_read;
        self
    }

    pub fn build(self) -> MockResponse {
        MockResponse::Data {
            body: self.body,
            elapsed: self.elapsed,
            rows_read: self.rows_read,
            bytes_read: self.bytes_read,
        }
    }
}

impl Default for MockResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
