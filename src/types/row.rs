use std::sync::Arc;

/// A single row of a parsed result set.
/// Values are strings as serialized by the engine, accessible by position or
/// by column name.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<String>) -> Self {
        Self { columns, values }
    }

    /// Gets a value by column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// Gets a value by position.
    pub fn get_index(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Returns the column names for this row, in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Consumes the row, returning its values in column order.
    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parsed result of a statement execution: a cursor over zero or more rows.
#[derive(Debug)]
pub struct ResultSet {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<String>>,
}

impl ResultSet {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            columns: columns.into(),
            rows: rows.into_iter(),
        }
    }

    /// Returns the names of the columns returned by this result set.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows not yet consumed.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.len() == 0
    }
}

impl Iterator for ResultSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows
            .next()
            .map(|values| Row::new(Arc::clone(&self.columns), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_set() -> ResultSet {
        ResultSet::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec!["1".to_string(), "Alice".to_string()],
                vec!["2".to_string(), "Bob".to_string()],
            ],
        )
    }

    #[test]
    fn test_row_get_by_name_and_index() {
        let mut rs = result_set();
        let row = rs.next().unwrap();
        assert_eq!(row.get("id"), Some("1"));
        assert_eq!(row.get("name"), Some("Alice"));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_index(1), Some("Alice"));
        assert_eq!(row.get_index(2), None);
    }

    #[test]
    fn test_result_set_iteration() {
        let rs = result_set();
        assert_eq!(rs.columns(), ["id", "name"]);
        let names: Vec<String> = rs.map(|r| r.get("name").unwrap().to_string()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
    }

    #[test]
    fn test_empty_result_set() {
        let mut rs = ResultSet::new(Vec::new(), Vec::new());
        assert!(rs.is_empty());
        assert!(rs.next().is_none());
    }
}
