// regc-document - registry document model, loading and schema validation
// The compiler core only consumes the parsed element tree.

pub mod errors;
pub mod node;
pub mod schema;

pub use errors::{DocumentError, DocumentResult};
pub use node::Node;
pub use schema::{find_schema_version, validate, SchemaReport, SchemaVersion};

use serde_json::Value;
use std::path::{Path, PathBuf};

/// A loaded registry document
#[derive(Debug, Clone)]
pub struct RegistryDocument {
    pub path: PathBuf,
    pub version: SchemaVersion,
    pub root: Node,
    raw: Value,
}

impl RegistryDocument {
    /// Registry library name (root `name` attribute)
    pub fn name(&self) -> Option<&str> {
        self.root.get("name")
    }

    /// Validate against the schema for this document's version
    pub fn validate(&self, schema_dirs: &[PathBuf]) -> DocumentResult<SchemaReport> {
        schema::validate(&self.raw, self.version, schema_dirs)
    }
}

/// Read a registry file and determine its schema version.
/// Structure is not checked here; see [`RegistryDocument::validate`].
pub fn read_registry_file(path: &Path) -> DocumentResult<RegistryDocument> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_registry(path, &text)
}

/// Parse registry text that was read from `path`
pub fn parse_registry(path: &Path, text: &str) -> DocumentResult<RegistryDocument> {
    let syntax = |source| DocumentError::Syntax {
        path: path.to_path_buf(),
        source,
    };
    let raw: Value = serde_json::from_str(text).map_err(syntax)?;
    let root: Node = serde_json::from_value(raw.clone()).map_err(syntax)?;
    let version = find_schema_version(&root)?;
    log::debug!("Found registry version, v{}", version);

    Ok(RegistryDocument {
        path: path.to_path_buf(),
        version,
        root,
        raw,
    })
}
