//! Table, class, module and field name conversions.
//!
//! `to_class_name` and `to_table_name` are inverse up to capitalization:
//! converting a class name to a table name and back is a fixed point.

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "super", "Self", "_"];

pub fn strip_prefix<'a>(table: &'a str, prefix: &str) -> &'a str {
    match table.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() => rest,
        _ => table,
    }
}

/// `t_user_info` → `UserInfo`. Segments are capitalized (first letter upper,
/// rest lower) and concatenated; empty segments vanish.
pub fn to_class_name(table: &str, prefix: &str) -> String {
    let class: String = strip_prefix(table, prefix)
        .split('_')
        .map(capitalize)
        .collect::<String>()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    match class.chars().next() {
        None => "Table".to_string(),
        Some(c) if c.is_ascii_digit() => format!("T{}", class),
        Some(_) => class,
    }
}

/// `UserInfo` → `t_user_info`.
pub fn to_table_name(class_name: &str, prefix: &str) -> String {
    format!("{}{}", prefix, to_snake_case(class_name))
}

/// Module holding the entity of `table`: the stripped name in lower snake case.
pub fn module_name(table: &str, prefix: &str) -> String {
    let (ident, _) = to_identifier(&strip_prefix(table, prefix).to_lowercase());
    ident
}

/// Rust field identifier for a column, and whether it differs from the column
/// name (in which case the field needs an explicit `column_name`).
pub fn field_ident(column: &str) -> (String, bool) {
    to_identifier(column)
}

/// Identifier text without a raw prefix: `r#type` → `type`.
pub fn unraw(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

/// `order_id` → `OrderId`, the variant name SeaORM derives for a column field.
pub fn to_pascal_case(ident: &str) -> String {
    unraw(ident).split('_').map(capitalize).collect()
}

/// `UserInfo` → `user_info`, `User2Info` → `user2_info`.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word) || RESERVED.contains(&word)
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_snake_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn to_identifier(name: &str) -> (String, bool) {
    if is_snake_identifier(name) {
        if RESERVED.contains(&name) {
            return (format!("{}_", name), true);
        }
        if KEYWORDS.contains(&name) {
            return (format!("r#{}", name), false);
        }
        return (name.to_string(), false);
    }

    let mut ident: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_keyword(&ident) {
        ident.push('_');
    }
    (ident, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names() {
        assert_eq!(to_class_name("t_user_info", "t_"), "UserInfo");
        assert_eq!(to_class_name("t_orders", "t_"), "Orders");
        assert_eq!(to_class_name("t_ORDER_LINE", "t_"), "OrderLine");
        assert_eq!(to_class_name("t_user__info", "t_"), "UserInfo");
        assert_eq!(to_class_name("audit_log", "t_"), "AuditLog");
        assert_eq!(to_class_name("t_2fa_codes", "t_"), "T2faCodes");
        assert_eq!(to_class_name("t_", "t_"), "T");
    }

    #[test]
    fn test_table_names() {
        assert_eq!(to_table_name("UserInfo", "t_"), "t_user_info");
        assert_eq!(to_table_name("User2Info", "t_"), "t_user2_info");
        assert_eq!(to_table_name("Orders", ""), "orders");
    }

    #[test]
    fn test_class_name_idempotency() {
        let tables = [
            "t_user_info",
            "t_ORDER_LINE",
            "t_user__info",
            "t_2fa_codes",
            "t_a_b_c",
            "t_user2_info",
            "t_mixedCase_name",
            "t_with-dash",
            "plain",
        ];
        for table in tables {
            let class = to_class_name(table, "t_");
            let again = to_class_name(&to_table_name(&class, "t_"), "t_");
            assert_eq!(again, class, "{table}");
        }
    }

    #[test]
    fn test_module_names() {
        assert_eq!(module_name("t_user_info", "t_"), "user_info");
        assert_eq!(module_name("t_UserData", "t_"), "userdata");
        assert_eq!(module_name("t_type", "t_"), "r#type");
        assert_eq!(module_name("t_self", "t_"), "self_");
        assert_eq!(module_name("t_2fa", "t_"), "_2fa");
    }

    #[test]
    fn test_field_idents() {
        assert_eq!(field_ident("email"), ("email".to_string(), false));
        assert_eq!(field_ident("type"), ("r#type".to_string(), false));
        assert_eq!(field_ident("self"), ("self_".to_string(), true));
        assert_eq!(field_ident("OrderID"), ("orderid".to_string(), true));
        assert_eq!(field_ident("unit price"), ("unit_price".to_string(), true));
        assert_eq!(field_ident("1st"), ("_1st".to_string(), true));
    }

    #[test]
    fn test_pascal_and_snake() {
        assert_eq!(to_pascal_case("order_id"), "OrderId");
        assert_eq!(to_pascal_case("r#type"), "Type");
        assert_eq!(to_snake_case("OrderId"), "order_id");
        assert_eq!(unraw("r#match"), "match");
    }
}
