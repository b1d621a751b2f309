mod csv;
mod row;
mod sql_value;

pub(crate) use csv::parse_csv;
pub use row::{ResultSet, Row};
pub use sql_value::SqlValue;
