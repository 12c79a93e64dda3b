use std::fmt;

use serde::Serialize;

use super::table::SqlType;

/// Declared type of an entity field, one variant per supported column type.
///
/// The textual form matches SeaORM's `column_type` attribute so generated
/// entities can be read back without a second mapping table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FieldType {
    SmallInteger,
    Integer,
    BigInteger,
    Float,
    Double,
    Decimal(Option<(u32, u32)>),
    String(Option<u32>),
    Char(Option<u32>),
    Text,
    Boolean,
    Date,
    Time,
    DateTime,
    TimestampWithTimeZone,
    Json,
    JsonBinary,
    Uuid,
    Binary,
}

impl FieldType {
    /// Maps a catalog type. `None` for types without a mapping.
    pub fn from_sql(sql_type: &SqlType) -> Option<Self> {
        let mapped = match sql_type.udt_name.as_str() {
            "int2" => Self::SmallInteger,
            "int4" => Self::Integer,
            "int8" => Self::BigInteger,
            "float4" => Self::Float,
            "float8" => Self::Double,
            "numeric" => Self::Decimal(sql_type.precision.zip(sql_type.scale)),
            "money" => Self::Decimal(None),
            "varchar" => Self::String(sql_type.max_length),
            "bpchar" => Self::Char(sql_type.max_length),
            "text" | "citext" | "name" => Self::Text,
            "bool" => Self::Boolean,
            "date" => Self::Date,
            "time" | "timetz" => Self::Time,
            "timestamp" => Self::DateTime,
            "timestamptz" => Self::TimestampWithTimeZone,
            "json" => Self::Json,
            "jsonb" => Self::JsonBinary,
            "uuid" => Self::Uuid,
            "bytea" => Self::Binary,
            _ => return None,
        };
        Some(mapped)
    }

    /// Fallback for field declarations without a `column_type` attribute.
    pub fn from_rust_type(rust_type: &str) -> Option<Self> {
        let mapped = match rust_type {
            "i16" => Self::SmallInteger,
            "i32" => Self::Integer,
            "i64" => Self::BigInteger,
            "f32" => Self::Float,
            "f64" => Self::Double,
            "Decimal" => Self::Decimal(None),
            "String" => Self::String(None),
            "bool" => Self::Boolean,
            "Date" => Self::Date,
            "Time" => Self::Time,
            "DateTime" => Self::DateTime,
            "DateTimeWithTimeZone" => Self::TimestampWithTimeZone,
            "Json" => Self::JsonBinary,
            "Uuid" => Self::Uuid,
            "Vec<u8>" => Self::Binary,
            _ => return None,
        };
        Some(mapped)
    }

    /// Parses the value of a `column_type = "..."` attribute.
    pub fn parse_column_type(value: &str) -> Option<Self> {
        let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        let simple = match compact.as_str() {
            "SmallInteger" => Some(Self::SmallInteger),
            "Integer" => Some(Self::Integer),
            "BigInteger" => Some(Self::BigInteger),
            "Float" => Some(Self::Float),
            "Double" => Some(Self::Double),
            "Decimal(None)" | "Money(None)" => Some(Self::Decimal(None)),
            "String(StringLen::None)" => Some(Self::String(None)),
            "Char(None)" => Some(Self::Char(None)),
            "Text" => Some(Self::Text),
            "Boolean" => Some(Self::Boolean),
            "Date" => Some(Self::Date),
            "Time" => Some(Self::Time),
            "DateTime" | "Timestamp" => Some(Self::DateTime),
            "TimestampWithTimeZone" => Some(Self::TimestampWithTimeZone),
            "Json" => Some(Self::Json),
            "JsonBinary" => Some(Self::JsonBinary),
            "Uuid" => Some(Self::Uuid),
            "VarBinary(StringLen::None)" | "Blob" => Some(Self::Binary),
            _ => None,
        };
        if simple.is_some() {
            return simple;
        }

        if let Some(len) = between(&compact, "String(StringLen::N(", "))") {
            return len.parse().ok().map(|n| Self::String(Some(n)));
        }
        if let Some(len) = between(&compact, "Char(Some(", "))") {
            return len.parse().ok().map(|n| Self::Char(Some(n)));
        }
        if let Some(pair) = between(&compact, "Decimal(Some((", ")))") {
            let (p, s) = pair.split_once(',')?;
            return Some(Self::Decimal(Some((p.parse().ok()?, s.parse().ok()?))));
        }
        None
    }

    /// Text emitted into `#[sea_orm(column_type = "...")]`.
    pub fn column_type(&self) -> String {
        match self {
            Self::Decimal(Some((p, s))) => format!("Decimal(Some(({p}, {s})))"),
            Self::Decimal(None) => "Decimal(None)".to_string(),
            Self::String(Some(len)) => format!("String(StringLen::N({len}))"),
            Self::String(None) => "String(StringLen::None)".to_string(),
            Self::Char(Some(len)) => format!("Char(Some({len}))"),
            Self::Char(None) => "Char(None)".to_string(),
            Self::Binary => "VarBinary(StringLen::None)".to_string(),
            other => format!("{other:?}"),
        }
    }

    pub fn rust_type(&self) -> &'static str {
        match self {
            Self::SmallInteger => "i16",
            Self::Integer => "i32",
            Self::BigInteger => "i64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::Decimal(_) => "Decimal",
            Self::String(_) | Self::Char(_) | Self::Text => "String",
            Self::Boolean => "bool",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::DateTime => "DateTime",
            Self::TimestampWithTimeZone => "DateTimeWithTimeZone",
            Self::Json | Self::JsonBinary => "Json",
            Self::Uuid => "Uuid",
            Self::Binary => "Vec<u8>",
        }
    }

    /// Types that make poor primary keys.
    pub fn is_large(&self) -> bool {
        matches!(self, Self::Text | Self::Json | Self::JsonBinary | Self::Binary)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::SmallInteger | Self::Integer | Self::BigInteger)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_type())
    }
}

fn between<'a>(value: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    value.strip_prefix(prefix)?.strip_suffix(suffix)
}
