//! SQL building helpers shared by the list and search queries.

use rusqlite::types::Value;

use crate::models::ListOptions;

/// Turn a user search term into a `LIKE ... ESCAPE '\'` pattern that matches
/// the term literally anywhere in the column.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `col1 LIKE ?n ESCAPE '\' OR col2 LIKE ?n ESCAPE '\' ...`, all bound to
/// the same parameter.
pub(crate) fn like_any(columns: &[&str], param: usize) -> String {
    columns
        .iter()
        .map(|column| format!("{column} LIKE ?{param} ESCAPE '\\'"))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Prefix every column in a comma separated list with `table.`.
pub(crate) fn qualified(columns: &str, table: &str) -> String {
    columns
        .split(',')
        .map(|column| format!("{table}.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Append `LIMIT/OFFSET` when the options ask for a page.
pub(crate) fn paginate(sql: &mut String, params: &mut Vec<Value>, options: ListOptions) {
    if let Some(limit) = options.limit.filter(|limit| *limit > 0) {
        sql.push_str(&format!(
            " LIMIT ?{} OFFSET ?{}",
            params.len() + 1,
            params.len() + 2
        ));
        params.push(Value::Integer(limit));
        params.push(Value::Integer(options.offset.max(0)));
    }
}
