#![deny(missing_docs)]

//! # OpenAPI Bridge
//!
//! Renders a `SchemaDescriptor` as a utoipa schema fragment (`type`/`items`
//! pairs and `$ref`s into `#/components/schemas`).

use crate::descriptor::SchemaDescriptor;
use crate::primitives::SchemaKind;
use utoipa::openapi::schema::{Array, ObjectBuilder, Schema, Type};
use utoipa::openapi::{Ref, RefOr};

const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Converts a descriptor into an OpenAPI schema.
pub fn to_schema(descriptor: &SchemaDescriptor) -> RefOr<Schema> {
    let element = match descriptor.reference_name() {
        Some(name) => RefOr::Ref(Ref::new(format!("{}{}", COMPONENTS_PREFIX, name))),
        None if descriptor.is_array() => inline_schema(&descriptor.array_type),
        None => inline_schema(&descriptor.schema_type),
    };
    if descriptor.is_array() {
        return RefOr::T(Schema::Array(Array::new(element)));
    }
    element
}

fn inline_schema(type_name: &str) -> RefOr<Schema> {
    // Overrides may name something outside the vocabulary.
    let kind = type_name.parse().unwrap_or(SchemaKind::String);
    RefOr::T(Schema::Object(
        ObjectBuilder::new().schema_type(schema_type(kind)).build(),
    ))
}

fn schema_type(kind: SchemaKind) -> Type {
    match kind {
        SchemaKind::Array => Type::Array,
        SchemaKind::Boolean => Type::Boolean,
        SchemaKind::Integer => Type::Integer,
        SchemaKind::Null => Type::Null,
        SchemaKind::Number => Type::Number,
        SchemaKind::Object => Type::Object,
        SchemaKind::String => Type::String,
    }
}
