#![deny(missing_docs)]

//! # Type Resolver
//!
//! Reduces a `TypeExpr` to a `SchemaDescriptor`.
//!
//! Pointers are unwrapped, containers are reduced to their element, and
//! qualified identifiers are looked up in the `TypeRegistry`. When a qualified
//! identifier names a structured type, its definition is requested from the
//! `DefinitionSink` exactly once per resolver.

use crate::descriptor::{SchemaDescriptor, Shape};
use crate::error::{AppError, AppResult};
use crate::primitives::{specific_to_primitive, to_valid_schema_type, SchemaKind};
use crate::registry::{TypeDecl, TypeRegistry};
use crate::type_expr::{short_module_name, TypeExpr};
use std::collections::HashSet;

/// Receives requests to build the schema definition of a referenced type.
pub trait DefinitionSink {
    /// Called at most once per `(module, name)` for a given resolver.
    fn parse_definition(&mut self, module: &str, name: &str, decl: &TypeDecl);
}

/// Discards every request.
impl DefinitionSink for () {
    fn parse_definition(&mut self, _module: &str, _name: &str, _decl: &TypeDecl) {}
}

/// Resolution context: the registry, the definition sink and the
/// already-requested set.
pub struct TypeResolver<'r, S = ()> {
    registry: &'r TypeRegistry,
    sink: S,
    requested: HashSet<(String, String)>,
}

impl<'r> TypeResolver<'r, ()> {
    /// A resolver that ignores definition requests.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_sink(registry, ())
    }
}

impl<'r, S: DefinitionSink> TypeResolver<'r, S> {
    /// A resolver forwarding definition requests to `sink`.
    pub fn with_sink(registry: &'r TypeRegistry, sink: S) -> Self {
        Self {
            registry,
            sink,
            requested: HashSet::new(),
        }
    }

    /// The registry being consulted.
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// The definition sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the definition sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the resolver, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Whether the definition of `module.name` has already been requested.
    pub fn is_requested(&self, module: &str, name: &str) -> bool {
        self.requested
            .contains(&(module.to_string(), name.to_string()))
    }

    /// Classifies a type expression.
    ///
    /// Only fails for shapes that have no schema meaning (`func`, `chan`).
    pub fn classify(&mut self, expr: &TypeExpr) -> AppResult<SchemaDescriptor> {
        if let TypeExpr::Ident { name, module_path } = expr {
            if !module_path.is_empty() {
                return Ok(self.resolve_qualified(name, module_path, Shape::Scalar));
            }
        }

        if let Some(primitive) = self.registry.custom_primitive(&expr.to_string()) {
            return Ok(SchemaDescriptor::uniform(primitive));
        }

        match expr {
            TypeExpr::Ident { name, .. } => Ok(SchemaDescriptor::of(to_valid_schema_type(name))),
            TypeExpr::Pointer(inner) => self.classify(inner),
            TypeExpr::Array(element) => match element.as_ref() {
                TypeExpr::Struct(_) => Ok(SchemaDescriptor::array_of(SchemaKind::Object.as_str())),
                _ => Ok(self.classify_element(element)),
            },
            TypeExpr::Map { .. } | TypeExpr::Struct(_) | TypeExpr::Interface => {
                Ok(SchemaDescriptor::of(SchemaKind::Object))
            }
            TypeExpr::Func { .. } | TypeExpr::Chan(_) => {
                Err(AppError::UnsupportedExpressionKind(expr.to_string()))
            }
        }
    }

    /// Resolves the element type of an array into `{array, element}`.
    ///
    /// Never fails: elements other than identifiers and struct literals
    /// degrade to `string`.
    fn classify_element(&mut self, element: &TypeExpr) -> SchemaDescriptor {
        match element {
            TypeExpr::Ident { name, module_path } if !module_path.is_empty() => {
                return self.resolve_qualified(name, module_path, Shape::ArrayElement);
            }
            TypeExpr::Pointer(inner) => return self.classify_element(inner),
            TypeExpr::Struct(_) => return SchemaDescriptor::array_of(SchemaKind::Object.as_str()),
            _ => {}
        }

        if let Some(primitive) = self.registry.custom_primitive(&element.to_string()) {
            return SchemaDescriptor::array_of(primitive);
        }

        let kind = match element {
            TypeExpr::Ident { name, .. } => to_valid_schema_type(name),
            _ => SchemaKind::String,
        };
        SchemaDescriptor::array_of(kind.as_str())
    }

    /// Resolves a qualified identifier against the registry.
    ///
    /// Never fails: unknown references degrade to `string`.
    pub fn resolve_qualified(
        &mut self,
        name: &str,
        module_path: &str,
        shape: Shape,
    ) -> SchemaDescriptor {
        let module = short_module_name(module_path);

        if let Some(kind) = specific_to_primitive(name) {
            return shape.build(kind.as_str(), "");
        }

        if !module.is_empty() {
            let registry = self.registry;
            if let Some(decl) = registry.lookup(module, name) {
                if let TypeExpr::Ident { name: target, .. } = &decl.ty {
                    if let Some(kind) = specific_to_primitive(target) {
                        return shape.build(kind.as_str(), "");
                    }
                }
                self.request_definition(module, name, decl);
                return shape.build(name, module);
            }

            // Overrides keep their scalar shape even inside arrays.
            if let Some(primitive) = registry.custom_primitive(name) {
                return SchemaDescriptor::uniform(primitive);
            }
        }

        tracing::debug!(module, name, "unresolved reference, falling back to string");
        SchemaDescriptor::of(SchemaKind::String)
    }

    fn request_definition(&mut self, module: &str, name: &str, decl: &TypeDecl) {
        if self.requested.insert((module.to_string(), name.to_string())) {
            tracing::debug!(module, name, "requesting definition");
            self.sink.parse_definition(module, name, decl);
        }
    }
}

/// Classifies `expr` without tracking definitions.
pub fn classify(expr: &TypeExpr, registry: &TypeRegistry) -> AppResult<SchemaDescriptor> {
    TypeResolver::new(registry).classify(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, String)>,
    }

    impl DefinitionSink for Recorder {
        fn parse_definition(&mut self, module: &str, name: &str, _decl: &TypeDecl) {
            self.calls.push((module.to_string(), name.to_string()));
        }
    }

    fn parse(src: &str) -> TypeExpr {
        TypeExpr::parse(src).unwrap()
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register("github.com/acme/pkg", "Widget", parse("struct { ID int }"))
            .register("github.com/acme/models", "Decimal", parse("decimal.Decimal"))
            .register("github.com/acme/models", "Stamp", parse("time"))
            .register("github.com/acme/models", "Count", parse("int"))
            .add_custom_primitive("Money", "number")
            .add_custom_primitive("ID", "integer")
            .add_custom_primitive("map[string]string", "string");
        registry
    }

    fn uniform(t: &str) -> SchemaDescriptor {
        SchemaDescriptor::uniform(t)
    }

    #[test]
    fn test_specific_names_any_case() {
        let registry = registry();
        for name in ["TIME", "time", "ObjectId", "uuid", "UUID"] {
            let d = classify(&TypeExpr::ident(name), &registry).unwrap();
            assert_eq!(d.schema_type, "string", "{name}");
        }
        for name in ["DECIMAL", "decimal", "Decimal"] {
            let d = classify(&TypeExpr::ident(name), &registry).unwrap();
            assert_eq!(d.schema_type, "number", "{name}");
        }
    }

    #[test]
    fn test_bare_identifiers() {
        let registry = registry();
        assert_eq!(classify(&parse("int64"), &registry).unwrap(), uniform("integer"));
        assert_eq!(classify(&parse("float64"), &registry).unwrap(), uniform("number"));
        assert_eq!(classify(&parse("bool"), &registry).unwrap(), uniform("boolean"));
        assert_eq!(classify(&parse("Unknown"), &registry).unwrap(), uniform("string"));
    }

    #[test]
    fn test_custom_override_by_text() {
        let registry = registry();
        assert_eq!(classify(&parse("Money"), &registry).unwrap(), uniform("number"));
        assert_eq!(
            classify(&parse("map[string]string"), &registry).unwrap(),
            uniform("string")
        );
    }

    #[test]
    fn test_pointer_is_transparent() {
        let registry = registry();
        for src in ["int", "Money", "[]bool", "map[int]int", "pkg.Widget", "[]models.Decimal"] {
            let plain = classify(&parse(src), &registry).unwrap();
            for depth in 1..=3 {
                let wrapped = format!("{}{}", "*".repeat(depth), src);
                assert_eq!(classify(&parse(&wrapped), &registry).unwrap(), plain, "{wrapped}");
            }
        }
    }

    #[test]
    fn test_array_of_struct_literal_is_object_array() {
        let registry = registry();
        for src in ["[]struct{}", "[]struct { A int; B []string }"] {
            assert_eq!(
                classify(&parse(src), &registry).unwrap(),
                SchemaDescriptor::array_of("object")
            );
        }
    }

    #[test]
    fn test_array_elements() {
        let registry = registry();
        let cases = vec![
            ("[]int", "integer"),
            ("[]*string", "string"),
            ("[]Money", "number"),
            ("[]Unknown", "string"),
            ("[]*struct{}", "object"),
            ("[][]int", "string"),
            ("[]*[]int", "string"),
            ("[]map[string]int", "string"),
            ("[]interface{}", "string"),
            ("[]func()", "string"),
            ("[]chan int", "string"),
        ];
        for (src, element) in cases {
            assert_eq!(
                classify(&parse(src), &registry).unwrap(),
                SchemaDescriptor::array_of(element),
                "{src}"
            );
        }
    }

    #[test]
    fn test_opaque_objects_are_indistinguishable() {
        let registry = registry();
        let object = uniform("object");
        for src in ["map[string]int", "struct { A int }", "interface{}"] {
            assert_eq!(classify(&parse(src), &registry).unwrap(), object, "{src}");
        }
    }

    #[test]
    fn test_unsupported_shapes() {
        let registry = registry();
        match classify(&parse("func(int) error"), &registry).unwrap_err() {
            AppError::UnsupportedExpressionKind(text) => assert_eq!(text, "func(int) error"),
            other => panic!("unexpected error: {other}"),
        }
        match classify(&parse("*chan int"), &registry).unwrap_err() {
            AppError::UnsupportedExpressionKind(text) => assert_eq!(text, "chan int"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_arrays_of_unsupported_elements_never_fail() {
        let registry = registry();
        for src in ["[]func()", "[]func(int) error", "[]chan int", "[]*chan string"] {
            assert_eq!(
                classify(&parse(src), &registry).unwrap(),
                SchemaDescriptor::array_of("string"),
                "{src}"
            );
        }
    }

    #[test]
    fn test_structured_reference_requests_definition_once() {
        let registry = registry();
        let mut resolver = TypeResolver::with_sink(&registry, Recorder::default());
        let expr = parse("github.com/acme/pkg.Widget");

        for _ in 0..3 {
            let d = resolver.classify(&expr).unwrap();
            assert_eq!(d.schema_type, "Widget");
            assert_eq!(d.array_type, "string");
            assert_eq!(d.cross_module, "pkg");
        }
        let d = resolver.classify(&parse("[]*pkg.Widget")).unwrap();
        assert_eq!(d, Shape::ArrayElement.build("Widget", "pkg"));

        assert!(resolver.is_requested("pkg", "Widget"));
        assert_eq!(
            resolver.into_sink().calls,
            vec![("pkg".to_string(), "Widget".to_string())]
        );
    }

    #[test]
    fn test_alias_to_specific_primitive() {
        let registry = registry();
        let mut resolver = TypeResolver::with_sink(&registry, Recorder::default());
        assert_eq!(
            resolver.classify(&parse("models.Stamp")).unwrap(),
            Shape::Scalar.build("string", "")
        );
        assert_eq!(
            resolver.classify(&parse("[]*models.Decimal")).unwrap(),
            SchemaDescriptor::array_of("number")
        );
        assert!(resolver.sink().calls.is_empty());
    }

    #[test]
    fn test_alias_to_builtin_is_still_a_reference() {
        let registry = registry();
        let d = classify(&parse("models.Count"), &registry).unwrap();
        assert_eq!(d, Shape::Scalar.build("Count", "models"));
    }

    #[test]
    fn test_qualified_specific_name_short_circuits() {
        let registry = registry();
        assert_eq!(
            classify(&parse("github.com/google/uuid.UUID"), &registry).unwrap(),
            Shape::Scalar.build("string", "")
        );
        assert_eq!(
            classify(&parse("[]time.Time"), &registry).unwrap(),
            SchemaDescriptor::array_of("string")
        );
    }

    #[test]
    fn test_unregistered_qualified_override_keeps_scalar_shape() {
        let registry = registry();
        assert_eq!(classify(&parse("other.Money"), &registry).unwrap(), uniform("number"));
        assert_eq!(classify(&parse("[]other.ID"), &registry).unwrap(), uniform("integer"));
    }

    #[test]
    fn test_unresolved_qualified_falls_back_to_string() {
        let registry = registry();
        assert_eq!(classify(&parse("other.Thing"), &registry).unwrap(), uniform("string"));
        assert_eq!(classify(&parse("[]other.Thing"), &registry).unwrap(), uniform("string"));
    }
}
