/// Double-quoted identifier, embedded quotes doubled.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// SQL expression that makes PostgreSQL print `column` of the current row as
/// a literal it can read back: `NULL`, or the text form cast to its own type
/// (`'1 day'::interval`, `'\x01ff'::bytea`, `'{a,b}'::text[]`).
pub fn value_literal_expr(column: &str) -> String {
    let column = quote_ident(column);
    format!(
        "CASE WHEN {column} IS NULL THEN 'NULL' \
         ELSE quote_literal({column}::text) || '::' || pg_typeof({column})::text END"
    )
}
