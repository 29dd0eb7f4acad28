#![deny(missing_docs)]

//! # Type Registry
//!
//! Process-wide lookup of declarations by `(short module name, type name)` and
//! of caller-declared custom primitive overrides.
//!
//! A registry is usually loaded from a manifest:
//!
//! ```yaml
//! customPrimitiveTypes:
//!   Money: number
//! modules:
//!   github.com/acme/models:
//!     Widget: "struct { ID int; Parts []*Part }"
//!     Amount: "decimal.Decimal"
//! ```

use crate::error::{AppError, AppResult};
use crate::type_expr::{short_module_name, TypeExpr};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A named declaration owned by some module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Full module path the declaration came from.
    pub module_path: String,
    /// Declared type name.
    pub name: String,
    /// The declared underlying type.
    pub ty: TypeExpr,
}

impl TypeDecl {
    /// Short module name (last path segment).
    pub fn module(&self) -> &str {
        short_module_name(&self.module_path)
    }
}

/// Declarations grouped per module plus the custom primitive overrides.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    modules: IndexMap<String, IndexMap<String, TypeDecl>>,
    custom_primitive_types: IndexMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RegistryManifest {
    #[serde(default)]
    custom_primitive_types: IndexMap<String, String>,
    #[serde(default)]
    modules: IndexMap<String, IndexMap<String, TypeExpr>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration under the short name of `module_path`.
    pub fn register(
        &mut self,
        module_path: impl Into<String>,
        name: impl Into<String>,
        ty: TypeExpr,
    ) -> &mut Self {
        let decl = TypeDecl {
            module_path: module_path.into(),
            name: name.into(),
            ty,
        };
        let module = decl.module().to_string();
        let types = self.modules.entry(module).or_default();
        if let Some(previous) = types.get(&decl.name) {
            if previous.module_path != decl.module_path {
                tracing::warn!(
                    name = %decl.name,
                    previous = %previous.module_path,
                    current = %decl.module_path,
                    "module short names collide, later declaration wins"
                );
            }
        }
        types.insert(decl.name.clone(), decl);
        self
    }

    /// Declares that `name` should resolve to `primitive`.
    pub fn add_custom_primitive(
        &mut self,
        name: impl Into<String>,
        primitive: impl Into<String>,
    ) -> &mut Self {
        self.custom_primitive_types
            .insert(name.into(), primitive.into());
        self
    }

    /// Finds a declaration by short module name and type name.
    pub fn lookup(&self, module: &str, name: &str) -> Option<&TypeDecl> {
        self.modules.get(module).and_then(|types| types.get(name))
    }

    /// Returns the override registered for `name`, if any.
    pub fn custom_primitive(&self, name: &str) -> Option<&str> {
        self.custom_primitive_types.get(name).map(String::as_str)
    }

    /// Iterates all declarations in registration order.
    pub fn declarations(&self) -> impl Iterator<Item = &TypeDecl> {
        self.modules.values().flat_map(|types| types.values())
    }

    /// Number of registered declarations.
    pub fn len(&self) -> usize {
        self.modules.values().map(IndexMap::len).sum()
    }

    /// Whether no declaration has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads a registry manifest from YAML.
    pub fn from_yaml_str(yaml: &str) -> AppResult<Self> {
        let manifest: RegistryManifest = serde_yaml::from_str(yaml)
            .map_err(|e| AppError::Config(format!("Failed to parse registry YAML: {}", e)))?;
        Ok(Self::from_manifest(manifest))
    }

    /// Loads a registry manifest from JSON.
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let manifest: RegistryManifest = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Failed to parse registry JSON: {}", e)))?;
        Ok(Self::from_manifest(manifest))
    }

    /// Loads a manifest file; `.json` is read as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    fn from_manifest(manifest: RegistryManifest) -> Self {
        let mut registry = Self::new();
        for (name, primitive) in manifest.custom_primitive_types {
            registry.add_custom_primitive(name, primitive);
        }
        for (module_path, types) in manifest.modules {
            let local: HashSet<String> = types.keys().cloned().collect();
            let is_local = |name: &str| local.contains(name);
            for (name, ty) in types {
                let ty = ty.qualify_local(&module_path, &is_local);
                registry.register(module_path.clone(), name, ty);
            }
        }
        tracing::debug!(
            declarations = registry.len(),
            overrides = registry.custom_primitive_types.len(),
            "loaded type registry"
        );
        registry
    }
}
