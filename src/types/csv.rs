//! Minimal CSV reader for engine output in `CSVWithNames` format.
//!
//! Handles quoted fields, doubled quotes, embedded delimiters and newlines,
//! and CRLF line endings. The first record is the header row.

/// Parse serialized output into `(columns, rows)`.
/// Empty input yields no columns and no rows.
pub(crate) fn parse_csv(input: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut records = parse_records(input).into_iter();
    let columns = records.next().unwrap_or_default();
    (columns, records.collect())
}

fn parse_records(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted_field = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() && !quoted_field => {
                in_quotes = true;
                quoted_field = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                quoted_field = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                quoted_field = false;
            }
            _ => field.push(c),
        }
    }

    // Trailing record without a final newline.
    if !field.is_empty() || quoted_field || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
