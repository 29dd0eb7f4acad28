#![deny(missing_docs)]

//! # Definition Builder
//!
//! Builds the schema definitions that cross-module references point at.
//!
//! The resolver only *requests* a definition; requests are queued by
//! `PendingDefinitions` and drained here after the root expressions are
//! classified. Building a definition classifies its fields with the same
//! resolver, which may queue further definitions. The resolver's one-shot
//! guard keeps mutually recursive types from looping.

use crate::descriptor::{SchemaDescriptor, Shape};
use crate::error::AppResult;
use crate::registry::{TypeDecl, TypeRegistry};
use crate::resolver::{DefinitionSink, TypeResolver};
use crate::type_expr::{short_module_name, FieldDecl, TypeExpr};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Definitions keyed by `module.Name`, in build order.
pub type Definitions = IndexMap<String, SchemaDefinition>;

/// Queue of declarations whose definitions were requested.
#[derive(Debug, Default)]
pub struct PendingDefinitions {
    queue: VecDeque<TypeDecl>,
}

impl PendingDefinitions {
    /// Takes the oldest request.
    pub fn pop(&mut self) -> Option<TypeDecl> {
        self.queue.pop_front()
    }
}

impl DefinitionSink for PendingDefinitions {
    fn parse_definition(&mut self, _module: &str, _name: &str, decl: &TypeDecl) {
        self.queue.push_back(decl.clone());
    }
}

/// A built schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    /// Short module name.
    pub module: String,
    /// Type name.
    pub name: String,
    /// What the type looks like.
    #[serde(flatten)]
    pub body: DefinitionBody,
}

/// The content of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DefinitionBody {
    /// A struct declaration.
    Object {
        /// Property name to descriptor, in field order.
        properties: IndexMap<String, SchemaDescriptor>,
        /// Fields that could not be described.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        skipped: Vec<SkippedField>,
    },
    /// Any other declaration (`type Ids []string`).
    Alias {
        /// The underlying type.
        target: SchemaDescriptor,
    },
}

/// A struct field left out of its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedField {
    /// Field name as written.
    pub field: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Classifies root expressions and builds every definition they reach.
pub struct DefinitionBuilder<'r> {
    resolver: TypeResolver<'r, PendingDefinitions>,
    definitions: Definitions,
}

impl<'r> DefinitionBuilder<'r> {
    /// Creates a builder over `registry`.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            resolver: TypeResolver::with_sink(registry, PendingDefinitions::default()),
            definitions: Definitions::new(),
        }
    }

    /// Classifies a root expression, queueing the definitions it references.
    pub fn classify(&mut self, expr: &TypeExpr) -> AppResult<SchemaDescriptor> {
        self.resolver.classify(expr)
    }

    /// Requests the definition of a registered declaration directly.
    ///
    /// Returns whether a new definition was queued: `false` when `module.name`
    /// is not registered, was already requested, or aliases a specific primitive
    /// (`type Money decimal.Decimal`), which needs no definition.
    pub fn request(&mut self, module: &str, name: &str) -> bool {
        let short = short_module_name(module);
        if self.resolver.registry().lookup(short, name).is_none()
            || self.resolver.is_requested(short, name)
        {
            return false;
        }
        self.resolver.resolve_qualified(name, module, Shape::Scalar);
        self.resolver.is_requested(short, name)
    }

    /// Builds every queued definition, including the ones they reach.
    pub fn finish(mut self) -> Definitions {
        while let Some(decl) = self.resolver.sink_mut().pop() {
            if let Some(definition) = self.build(&decl) {
                self.definitions
                    .insert(format!("{}.{}", definition.module, definition.name), definition);
            }
        }
        self.definitions
    }

    fn build(&mut self, decl: &TypeDecl) -> Option<SchemaDefinition> {
        let body = match &decl.ty {
            TypeExpr::Struct(fields) => {
                let mut properties = IndexMap::new();
                let mut skipped = Vec::new();
                let mut visiting = HashSet::new();
                visiting.insert((decl.module().to_string(), decl.name.clone()));
                self.collect_fields(
                    &decl.module_path,
                    fields,
                    &mut properties,
                    &mut skipped,
                    &mut visiting,
                );
                DefinitionBody::Object {
                    properties,
                    skipped,
                }
            }
            other => match self.resolver.classify(other) {
                Ok(target) => DefinitionBody::Alias { target },
                Err(e) => {
                    tracing::warn!(module = decl.module(), name = %decl.name, "skipping definition: {}", e);
                    return None;
                }
            },
        };
        Some(SchemaDefinition {
            module: decl.module().to_string(),
            name: decl.name.clone(),
            body,
        })
    }

    fn collect_fields(
        &mut self,
        module_path: &str,
        fields: &[FieldDecl],
        properties: &mut IndexMap<String, SchemaDescriptor>,
        skipped: &mut Vec<SkippedField>,
        visiting: &mut HashSet<(String, String)>,
    ) {
        for field in fields {
            let json_name = field
                .tag_value("json")
                .map(|value| value.split(',').next().unwrap_or_default());
            if json_name == Some("-") {
                continue;
            }

            if field.is_embedded() && json_name.map_or(true, str::is_empty) {
                if let Some(embedded) = self.embedded_struct(module_path, &field.ty) {
                    let key = (embedded.module().to_string(), embedded.name.clone());
                    if visiting.insert(key.clone()) {
                        if let TypeExpr::Struct(inner) = &embedded.ty {
                            self.collect_fields(
                                &embedded.module_path,
                                inner,
                                properties,
                                skipped,
                                visiting,
                            );
                        }
                        visiting.remove(&key);
                    }
                    continue;
                }
            }

            let name = match json_name {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => field_name(field),
            };
            match self.resolver.classify(&field.ty) {
                Ok(descriptor) => {
                    properties.insert(name, descriptor);
                }
                Err(e) => {
                    tracing::warn!(field = %name, "skipping field: {}", e);
                    skipped.push(SkippedField {
                        field: name,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// The struct declaration an embedded field refers to, if registered.
    fn embedded_struct(&self, module_path: &str, ty: &TypeExpr) -> Option<&'r TypeDecl> {
        let TypeExpr::Ident {
            name,
            module_path: own,
        } = ty.strip_pointers()
        else {
            return None;
        };
        let module = if own.is_empty() {
            short_module_name(module_path)
        } else {
            short_module_name(own)
        };
        self.resolver
            .registry()
            .lookup(module, name)
            .filter(|decl| matches!(decl.ty, TypeExpr::Struct(_)))
    }
}

fn field_name(field: &FieldDecl) -> String {
    if !field.is_embedded() {
        return field.name.clone();
    }
    match field.ty.strip_pointers() {
        TypeExpr::Ident { name, .. } => name.clone(),
        other => other.to_string(),
    }
}

/// Classifies every root and builds the definitions they reach.
pub fn build_definitions(
    registry: &TypeRegistry,
    roots: &[TypeExpr],
) -> AppResult<(Vec<SchemaDescriptor>, Definitions)> {
    let mut builder = DefinitionBuilder::new(registry);
    let descriptors = roots
        .iter()
        .map(|root| builder.classify(root))
        .collect::<AppResult<Vec<_>>>()?;
    Ok((descriptors, builder.finish()))
}
