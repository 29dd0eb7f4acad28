#![deny(missing_docs)]

//! # Schema Descriptor
//!
//! The output of resolution: a `{schemaType, arrayType, crossModule}` triple
//! ready for schema emission.

use crate::primitives::SchemaKind;
use serde::Serialize;

/// Normalized description of a resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    /// A vocabulary keyword, or the referenced type name when `cross_module` is set.
    pub schema_type: String,
    /// Element type for arrays; otherwise a mirror of `schema_type` or `string`.
    pub array_type: String,
    /// Short name of the module owning a referenced type. Empty for inline types.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cross_module: String,
}

impl SchemaDescriptor {
    /// `{t, t, ""}`
    pub fn uniform(schema_type: impl Into<String>) -> Self {
        let schema_type = schema_type.into();
        Self {
            array_type: schema_type.clone(),
            schema_type,
            cross_module: String::new(),
        }
    }

    /// Shorthand for `uniform(kind.as_str())`.
    pub fn of(kind: SchemaKind) -> Self {
        Self::uniform(kind.as_str())
    }

    /// `{array, element, ""}`
    pub fn array_of(element: impl Into<String>) -> Self {
        Self {
            schema_type: SchemaKind::Array.as_str().to_string(),
            array_type: element.into(),
            cross_module: String::new(),
        }
    }

    /// Whether downstream emission must reference a definition rather than inline.
    pub fn is_reference(&self) -> bool {
        !self.cross_module.is_empty()
    }

    /// Whether this describes an array.
    pub fn is_array(&self) -> bool {
        self.schema_type == SchemaKind::Array.as_str()
    }

    /// The `module.Name` key of the referenced definition, if any.
    pub fn reference_name(&self) -> Option<String> {
        if !self.is_reference() {
            return None;
        }
        let name = if self.is_array() {
            &self.array_type
        } else {
            &self.schema_type
        };
        Some(format!("{}.{}", self.cross_module, name))
    }
}

/// Selects which descriptor shape a qualified-identifier resolution produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The field is the referenced type itself.
    Scalar,
    /// The field is an array of the referenced type.
    ArrayElement,
}

impl Shape {
    /// Builds the descriptor for this shape.
    pub fn build(self, schema_type: &str, cross_module: &str) -> SchemaDescriptor {
        match self {
            Shape::Scalar => SchemaDescriptor {
                schema_type: schema_type.to_string(),
                array_type: SchemaKind::String.as_str().to_string(),
                cross_module: cross_module.to_string(),
            },
            Shape::ArrayElement => SchemaDescriptor {
                schema_type: SchemaKind::Array.as_str().to_string(),
                array_type: schema_type.to_string(),
                cross_module: cross_module.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape_defaults_array_type() {
        let d = Shape::Scalar.build("Widget", "pkg");
        assert_eq!(d.schema_type, "Widget");
        assert_eq!(d.array_type, "string");
        assert_eq!(d.cross_module, "pkg");
        assert_eq!(d.reference_name().as_deref(), Some("pkg.Widget"));
    }

    #[test]
    fn test_array_element_shape() {
        let d = Shape::ArrayElement.build("number", "");
        assert_eq!(d, SchemaDescriptor::array_of("number"));
        assert!(d.is_array());
        assert!(!d.is_reference());
        assert_eq!(d.reference_name(), None);
    }

    #[test]
    fn test_array_reference_name_uses_element() {
        let d = Shape::ArrayElement.build("Part", "models");
        assert_eq!(d.reference_name().as_deref(), Some("models.Part"));
    }

    #[test]
    fn test_serialization_omits_empty_cross_module() {
        let json = serde_json::to_value(SchemaDescriptor::of(SchemaKind::Integer)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"schemaType": "integer", "arrayType": "integer"})
        );

        let json = serde_json::to_value(Shape::Scalar.build("Widget", "pkg")).unwrap();
        assert_eq!(json["crossModule"], "pkg");
    }
}
