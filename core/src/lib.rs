#![deny(missing_docs)]

//! # Propschema Core
//!
//! Resolves type expressions found in source declarations into normalized
//! schema descriptors for API documentation.
//!
//! ```
//! use propschema_core::{classify, TypeExpr, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! registry.register("github.com/acme/models", "Amount", TypeExpr::parse("decimal.Decimal").unwrap());
//!
//! let expr = TypeExpr::parse("[]*models.Amount").unwrap();
//! let descriptor = classify(&expr, &registry).unwrap();
//! assert_eq!(descriptor.schema_type, "array");
//! assert_eq!(descriptor.array_type, "number");
//! ```

/// Shared error types.
pub mod error;

/// Type expressions and their textual front end.
pub mod type_expr;

/// Schema vocabulary and primitive-name tables.
pub mod primitives;

/// Resolution output.
pub mod descriptor;

/// Declarations and custom primitive overrides.
pub mod registry;

/// Classification and cross-module resolution.
pub mod resolver;

/// Definitions for referenced types.
pub mod definitions;

/// OpenAPI rendering of descriptors.
pub mod openapi;

pub use definitions::{
    build_definitions, DefinitionBody, DefinitionBuilder, Definitions, PendingDefinitions,
    SchemaDefinition, SkippedField,
};
pub use descriptor::{SchemaDescriptor, Shape};
pub use error::{AppError, AppResult};
pub use openapi::to_schema;
pub use primitives::{specific_to_primitive, to_valid_schema_type, SchemaKind};
pub use registry::{TypeDecl, TypeRegistry};
pub use resolver::{classify, DefinitionSink, TypeResolver};
pub use type_expr::{FieldDecl, TypeExpr};
