use std::sync::Arc;

use crate::connection::Connection;
use crate::constants::open;
use crate::data_path::DataPath;
use crate::engines::NativeEngine;
use crate::error::{ChdbError, Result};
use crate::statement::Statement;
use crate::traits::QueryEngine;
use crate::types::{ResultSet, Row, SqlValue};

/// A database session: one engine connection bound to a data directory.
///
/// `uri` takes the form `path?key=value&...`; see [`DataPath`] for the
/// recognized keys. An empty path or `:memory:` runs out of a temporary
/// directory that is removed when the session closes.
pub struct Database {
    conn: Connection,
    data_path: DataPath,
    readonly: bool,
    closed: bool,
}

impl Database {
    /// Open a session on the process-wide engine established by
    /// [`NativeEngine::initialize`].
    pub fn open(uri: &str) -> Result<Self> {
        let engine: Arc<dyn QueryEngine> = NativeEngine::global()?;
        Self::open_with_engine(engine, uri)
    }

    /// Open a session on an explicit engine.
    pub fn open_with_engine(engine: Arc<dyn QueryEngine>, uri: &str) -> Result<Self> {
        Self::open_with_options(engine, uri, &[])
    }

    /// Open a session with extra options merged over the URI parameters.
    pub fn open_with_options(
        engine: Arc<dyn QueryEngine>,
        uri: &str,
        options: &[(&str, &str)],
    ) -> Result<Self> {
        let data_path = DataPath::new(uri, options)?;
        let readonly = data_path.mode() & open::READONLY != 0;
        let args = data_path.generate_arguments();
        let conn = Connection::open(engine, &args)?;
        Ok(Self {
            conn,
            data_path,
            readonly,
            closed: false,
        })
    }

    /// Prepare a statement for later binding and execution.
    pub fn prepare(&self, sql: impl Into<String>) -> Result<Statement<'_>> {
        if self.closed {
            return Err(ChdbError::Usage("prepare called on a closed database".into()));
        }
        Ok(Statement::new(&self.conn, sql))
    }

    /// Run `sql` with the given bound values and parse the output rows.
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ResultSet> {
        let mut stmt = self.prepare(sql)?;
        stmt.bind_params(params.iter().cloned());
        stmt.execute()
    }

    /// Run `sql` and return the raw result buffer in the requested format.
    pub fn query_with_format(
        &self,
        sql: &str,
        params: &[SqlValue],
        format: &str,
    ) -> Result<Vec<u8>> {
        let mut stmt = self.prepare(sql)?;
        stmt.bind_params(params.iter().cloned());
        stmt.execute_with_format(format)
    }

    /// First row of the result, if any.
    pub fn get_first_row(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>> {
        Ok(self.execute(sql, params)?.next())
    }

    /// First column of the first row, if any.
    pub fn get_first_value(&self, sql: &str, params: &[SqlValue]) -> Result<Option<String>> {
        Ok(self
            .execute(sql, params)?
            .next()
            .and_then(|row| row.into_values().into_iter().next()))
    }

    /// Whether the session was opened in readonly mode.
    pub fn readonly(&self) -> bool {
        self.readonly
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Close the session: closes the connection and removes a temporary
    /// data directory. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.conn.close();
        self.data_path.close();
        self.closed = true;
    }
}
