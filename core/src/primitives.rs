#![deny(missing_docs)]

//! # Primitive Tables
//!
//! Maps source type names onto the fixed JSON Schema vocabulary.
//!
//! Two tables live here and they are deliberately kept apart:
//! - the *specific* table (`time`, `objectid`, `uuid`, `decimal`) which rejects
//!   anything it does not know, and
//! - the *broad* table used for ordinary identifiers, which defaults unknown
//!   names to `string`.

use crate::error::AppError;
use std::fmt::Display;
use std::str::FromStr;

/// The fixed schema vocabulary a descriptor may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// `array`
    Array,
    /// `boolean`
    Boolean,
    /// `integer`
    Integer,
    /// `null`
    Null,
    /// `number`
    Number,
    /// `object`
    Object,
    /// `string`
    String,
}

impl SchemaKind {
    /// Every member of the vocabulary, in alphabetical order.
    pub const ALL: [SchemaKind; 7] = [
        SchemaKind::Array,
        SchemaKind::Boolean,
        SchemaKind::Integer,
        SchemaKind::Null,
        SchemaKind::Number,
        SchemaKind::Object,
        SchemaKind::String,
    ];

    /// The lowercase schema keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Array => "array",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Integer => "integer",
            SchemaKind::Null => "null",
            SchemaKind::Number => "number",
            SchemaKind::Object => "object",
            SchemaKind::String => "string",
        }
    }
}

impl Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::General(format!("'{}' is not a schema type", s)))
    }
}

/// The narrow table of domain-specific names.
///
/// Case-insensitive. Returns `None` for any name outside the table.
pub fn specific_to_primitive(type_name: &str) -> Option<SchemaKind> {
    match type_name.to_ascii_uppercase().as_str() {
        "TIME" | "OBJECTID" | "UUID" => Some(SchemaKind::String),
        "DECIMAL" => Some(SchemaKind::Number),
        _ => None,
    }
}

/// Normalizes an identifier into the schema vocabulary.
///
/// Case-insensitive. The specific table wins, then the built-in numeric,
/// boolean and string names, then the vocabulary words themselves.
/// Unknown names become `string`.
pub fn to_valid_schema_type(type_name: &str) -> SchemaKind {
    if let Some(kind) = specific_to_primitive(type_name) {
        return kind;
    }

    match type_name.to_ascii_lowercase().as_str() {
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" | "byte" | "rune" | "integer" => SchemaKind::Integer,
        "float32" | "float64" | "number" => SchemaKind::Number,
        "bool" | "boolean" => SchemaKind::Boolean,
        "array" => SchemaKind::Array,
        "object" => SchemaKind::Object,
        "null" => SchemaKind::Null,
        _ => SchemaKind::String,
    }
}
