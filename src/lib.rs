//! chdb - Rust bindings for chdb, the embedded ClickHouse engine
//!
//! The engine ships as a precompiled shared library; this crate implements
//! the boundary to it: loading the library and resolving its entry points at
//! runtime, owning native connection and result allocations so each is
//! released exactly once, and a small session layer with `?`-placeholder
//! binding and CSV row parsing on top.
//!
//! # Example
//! ```ignore
//! use chdb::{Database, NativeEngine, SqlValue};
//!
//! // Load the engine once per process from the package installation dir.
//! NativeEngine::initialize("/opt/chdb")?;
//!
//! let db = Database::open("/tmp/analytics")?;
//! for row in db.execute("SELECT number FROM system.numbers LIMIT ?", &[SqlValue::Int32(3)])? {
//!     println!("{}", row.get("number").unwrap_or(""));
//! }
//! ```
//!
//! Lower level, a [`Connection`] opened with raw engine arguments returns
//! [`LocalResult`] handles whose buffers borrow native memory directly.

pub mod connection;
pub mod constants;
pub mod data_path;
pub mod database;
pub mod engines;
pub mod error;
pub mod ffi;
pub mod result;
pub mod statement;
pub mod traits;
pub mod types;

// Re-export main types for convenient access
pub use connection::Connection;
pub use data_path::DataPath;
pub use database::Database;
pub use engines::NativeEngine;
pub use error::{ChdbError, Result};
pub use result::LocalResult;
pub use statement::Statement;
pub use traits::QueryEngine;
pub use types::{ResultSet, Row, SqlValue};

/// Version of these bindings.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
