#![deny(missing_docs)]

//! # Classify Command
//!
//! Resolves each expression given on the command line and prints the result
//! as a JSON array.

use propschema_core::error::{AppError, AppResult};
use propschema_core::{to_schema, TypeExpr, TypeRegistry, TypeResolver};
use serde_json::{json, Value};

/// Arguments for the classify command.
#[derive(clap::Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// Type expressions, e.g. `[]*github.com/acme/models.Widget`.
    #[clap(required = true)]
    pub exprs: Vec<String>,

    /// Print OpenAPI schema fragments instead of raw descriptors.
    #[clap(long)]
    pub openapi: bool,
}

/// Executes the classification, returning the rendered JSON.
///
/// # Arguments
///
/// * `args` - Command arguments.
/// * `registry` - Declarations and overrides to resolve against.
pub fn execute(args: &ClassifyArgs, registry: &TypeRegistry) -> AppResult<String> {
    let mut resolver = TypeResolver::new(registry);
    let mut results = Vec::with_capacity(args.exprs.len());

    for src in &args.exprs {
        let expr = TypeExpr::parse(src)?;
        let descriptor = resolver.classify(&expr)?;
        let entry = if args.openapi {
            json!({ "expression": src, "schema": to_schema(&descriptor) })
        } else {
            let mut entry = json!({ "expression": src });
            if let (Value::Object(map), Ok(Value::Object(fields))) =
                (&mut entry, serde_json::to_value(&descriptor))
            {
                map.extend(fields);
            }
            entry
        };
        results.push(entry);
    }

    serde_json::to_string_pretty(&results)
        .map_err(|e| AppError::General(format!("JSON serialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(exprs: &[&str], openapi: bool) -> ClassifyArgs {
        ClassifyArgs {
            exprs: exprs.iter().map(|s| s.to_string()).collect(),
            openapi,
        }
    }

    #[test]
    fn test_classify_descriptors() {
        let mut registry = TypeRegistry::new();
        registry.register(
            "github.com/acme/pkg",
            "Widget",
            TypeExpr::parse("struct { ID int }").unwrap(),
        );

        let out = execute(&args(&["*int", "[]pkg.Widget"], false), &registry).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["expression"], "*int");
        assert_eq!(value[0]["schemaType"], "integer");
        assert_eq!(value[1]["schemaType"], "array");
        assert_eq!(value[1]["arrayType"], "Widget");
        assert_eq!(value[1]["crossModule"], "pkg");
    }

    #[test]
    fn test_classify_openapi() {
        let registry = TypeRegistry::new();
        let out = execute(&args(&["[]float64"], true), &registry).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["schema"]["items"]["type"], "number");
    }

    #[test]
    fn test_classify_unsupported_fails() {
        let registry = TypeRegistry::new();
        let err = execute(&args(&["chan int"], false), &registry).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedExpressionKind(_)));
    }

    #[test]
    fn test_classify_parse_error() {
        let registry = TypeRegistry::new();
        let err = execute(&args(&["map[int"], false), &registry).unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }
}
