#![deny(missing_docs)]

//! # Definitions Command
//!
//! Resolves root expressions and writes the schema definitions they reach.

use propschema_core::error::{AppError, AppResult};
use propschema_core::{build_definitions, TypeExpr, TypeRegistry};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

/// Arguments for the definitions command.
#[derive(clap::Args, Debug, Clone)]
pub struct DefinitionsArgs {
    /// Root type expressions.
    #[clap(required = true)]
    pub exprs: Vec<String>,

    /// Output path. Supports .json and .yaml/.yml extensions.
    /// If not provided, prints JSON to stdout.
    #[clap(long)]
    pub output: Option<PathBuf>,
}

fn render(args: &DefinitionsArgs, registry: &TypeRegistry) -> AppResult<Value> {
    let roots = args
        .exprs
        .iter()
        .map(|src| TypeExpr::parse(src))
        .collect::<AppResult<Vec<_>>>()?;
    let (descriptors, definitions) = build_definitions(registry, &roots)?;

    let roots: Vec<Value> = args
        .exprs
        .iter()
        .zip(&descriptors)
        .map(|(src, descriptor)| json!({ "expression": src, "descriptor": descriptor }))
        .collect();
    Ok(json!({ "roots": roots, "definitions": definitions }))
}

/// Executes the definitions build.
///
/// # Arguments
///
/// * `args` - Command arguments.
/// * `registry` - Declarations and overrides to resolve against.
pub fn execute(args: &DefinitionsArgs, registry: &TypeRegistry) -> AppResult<()> {
    let document = render(args, registry)?;

    let output_str = match args
        .output
        .as_ref()
        .and_then(|path| path.extension())
        .and_then(|e| e.to_str())
    {
        Some("yaml" | "yml") => serde_yaml::to_string(&document)
            .map_err(|e| AppError::General(format!("YAML serialization failed: {}", e)))?,
        _ => serde_json::to_string_pretty(&document)
            .map_err(|e| AppError::General(format!("JSON serialization failed: {}", e)))?,
    };

    if let Some(out_path) = &args.output {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::General(format!("Failed to create output directory: {}", e))
                })?;
            }
        }
        fs::write(out_path, output_str)
            .map_err(|e| AppError::General(format!("Failed to write output file: {}", e)))?;
        tracing::info!(path = %out_path.display(), "definitions written");
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MANIFEST: &str = r#"
modules:
  github.com/acme/models:
    Order: "struct { ID int `json:\"id\"`; Items []*Item }"
    Item: "struct { Name string }"
"#;

    fn args(exprs: &[&str], output: Option<PathBuf>) -> DefinitionsArgs {
        DefinitionsArgs {
            exprs: exprs.iter().map(|s| s.to_string()).collect(),
            output,
        }
    }

    #[test]
    fn test_definitions_to_json_file() {
        let dir = tempdir().unwrap();
        let out_path = dir.path().join("nested").join("defs.json");
        let registry = TypeRegistry::from_yaml_str(MANIFEST).unwrap();

        execute(&args(&["models.Order"], Some(out_path.clone())), &registry).unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
        assert_eq!(value["roots"][0]["descriptor"]["schemaType"], "Order");
        assert_eq!(value["definitions"]["models.Order"]["kind"], "object");
        assert_eq!(
            value["definitions"]["models.Order"]["properties"]["Items"]["arrayType"],
            "Item"
        );
        assert!(value["definitions"]["models.Item"].is_object());
    }

    #[test]
    fn test_definitions_to_yaml_file() {
        let dir = tempdir().unwrap();
        let out_path = dir.path().join("defs.yaml");
        let registry = TypeRegistry::from_yaml_str(MANIFEST).unwrap();

        execute(&args(&["[]models.Item"], Some(out_path.clone())), &registry).unwrap();

        let yaml = fs::read_to_string(&out_path).unwrap();
        assert!(yaml.contains("models.Item:"));
        assert!(yaml.contains("kind: object"));
    }

    #[test]
    fn test_definitions_without_references() {
        let registry = TypeRegistry::new();
        let value = render(&args(&["map[string]int"], None), &registry).unwrap();
        assert_eq!(value["roots"][0]["descriptor"]["schemaType"], "object");
        assert_eq!(value["definitions"], json!({}));
    }
}
