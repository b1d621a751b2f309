use crate::connection::Connection;
use crate::error::{ChdbError, Result};
use crate::types::{parse_csv, ResultSet, SqlValue};

/// A SQL statement with `?` placeholders bound against a live connection.
///
/// Placeholders are substituted textually with SQL literals before the query
/// reaches the engine; `\?` passes through untouched for queries that need a
/// literal question mark.
pub struct Statement<'conn> {
    conn: &'conn Connection,
    sql: String,
    bind_vars: Vec<SqlValue>,
}

impl<'conn> Statement<'conn> {
    pub(crate) fn new(conn: &'conn Connection, sql: impl Into<String>) -> Self {
        Self {
            conn,
            sql: sql.into(),
            bind_vars: Vec::new(),
        }
    }

    /// Bind a value to the 1-based placeholder `index`.
    /// Unbound positions in between render as `NULL`.
    pub fn bind_param(&mut self, index: usize, value: impl Into<SqlValue>) {
        assert!(index >= 1, "bind_param indexes are 1-based");
        if self.bind_vars.len() < index {
            self.bind_vars.resize(index, SqlValue::Null);
        }
        self.bind_vars[index - 1] = value.into();
    }

    /// Bind values to placeholders in order, starting at position 1.
    pub fn bind_params<I, T>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<SqlValue>,
    {
        for (i, value) in values.into_iter().enumerate() {
            self.bind_param(i + 1, value);
        }
    }

    /// Clear all bound values.
    pub fn reset(&mut self) {
        self.bind_vars.clear();
    }

    /// Run the statement with output format `CSVWithNames` and parse the
    /// result into columns and rows.
    pub fn execute(&mut self) -> Result<ResultSet> {
        let sql = process_sql(&self.sql, &self.bind_vars);
        let result = self.conn.query(&sql, "CSVWithNames")?;
        let text = match result.buf() {
            None => return Ok(ResultSet::new(Vec::new(), Vec::new())),
            Some(bytes) => std::str::from_utf8(bytes).map_err(|e| {
                ChdbError::Native(format!("query output is not valid UTF-8: {e}"))
            })?,
        };
        let (columns, rows) = parse_csv(text);
        Ok(ResultSet::new(columns, rows))
    }

    /// Run the statement with an explicit output format and return the raw
    /// result buffer.
    pub fn execute_with_format(&mut self, format: &str) -> Result<Vec<u8>> {
        let sql = process_sql(&self.sql, &self.bind_vars);
        let result = self.conn.query(&sql, format)?;
        Ok(result.buf_bytes())
    }
}

/// Substitute each unescaped `?` with the literal of the next bound value.
/// Placeholders beyond the bound values stay as `?`; `\?` is kept verbatim.
fn process_sql(sql: &str, bind_vars: &[SqlValue]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut values = bind_vars.iter();
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'?') => {
                chars.next();
                out.push('\\');
                out.push('?');
            }
            '?' => match values.next() {
                Some(value) => out.push_str(&value.to_sql_literal()),
                None => out.push('?'),
            },
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_sql_substitutes_in_order() {
        let sql = process_sql(
            "SELECT * FROM t WHERE id = ? AND name = ?",
            &[SqlValue::Int32(7), SqlValue::from("O'Brien")],
        );
        assert_eq!(sql, "SELECT * FROM t WHERE id = 7 AND name = 'O''Brien'");
    }

    #[test]
    fn test_process_sql_escaped_placeholder_passes_through() {
        let sql = process_sql("SELECT '\\?' , ?", &[SqlValue::Int32(1)]);
        assert_eq!(sql, "SELECT '\\?' , 1");
    }

    #[test]
    fn test_process_sql_exhausted_values_keep_placeholder() {
        let sql = process_sql("SELECT ?, ?", &[SqlValue::Int32(1)]);
        assert_eq!(sql, "SELECT 1, ?");
    }

    #[test]
    fn test_process_sql_null_and_bool() {
        let sql = process_sql(
            "INSERT INTO t VALUES (?, ?, ?)",
            &[SqlValue::Null, SqlValue::Bool(true), SqlValue::Bool(false)],
        );
        assert_eq!(sql, "INSERT INTO t VALUES (NULL, 1, 0)");
    }
}
