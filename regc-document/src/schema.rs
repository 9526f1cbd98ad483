// Registry schema discovery and validation

use crate::errors::{DocumentError, DocumentResult};
use crate::node::Node;
use jsonschema::Draft;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Schemas shipped with the compiler, used when no schema directory has one
const EMBEDDED_SCHEMAS: &[(SchemaVersion, &str)] = &[(
    SchemaVersion { major: 1, minor: 0 },
    include_str!("../schemas/registry_v1_0.schema.json"),
)];

/// Registry schema version, from the root `version` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub fn parse(text: &str) -> DocumentResult<Self> {
        let malformed = || DocumentError::MalformedVersion(text.to_string());
        let (major, minor) = text.trim().split_once('.').ok_or_else(malformed)?;
        Ok(Self {
            major: major.parse().map_err(|_| malformed())?,
            minor: minor.parse().map_err(|_| malformed())?,
        })
    }

    /// File name of the schema for this version
    pub fn schema_file_name(&self) -> String {
        format!("registry_v{}_{}.schema.json", self.major, self.minor)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Read the schema version from a registry root
pub fn find_schema_version(root: &Node) -> DocumentResult<SchemaVersion> {
    let version = root.get("version").ok_or_else(|| DocumentError::MissingVersion {
        tag: root.tag.clone(),
    })?;
    SchemaVersion::parse(version)
}

/// Look for the schema file of `version` in `schema_dirs`, first match wins
pub fn find_schema_file(version: SchemaVersion, schema_dirs: &[PathBuf]) -> Option<PathBuf> {
    let file_name = version.schema_file_name();
    schema_dirs.iter().find_map(|dir| {
        log::debug!("Looking for registry schema in '{}'", dir.display());
        let candidate = dir.join(&file_name);
        candidate.is_file().then_some(candidate)
    })
}

fn load_schema(version: SchemaVersion, schema_dirs: &[PathBuf]) -> DocumentResult<Value> {
    let compile_error = |message: String| DocumentError::SchemaCompile {
        version: version.to_string(),
        message,
    };

    if let Some(path) = find_schema_file(version, schema_dirs) {
        log::debug!("Using registry schema {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|source| DocumentError::Io {
            path: path.clone(),
            source,
        })?;
        return serde_json::from_str(&text).map_err(|e| compile_error(e.to_string()));
    }

    let (_, text) = EMBEDDED_SCHEMAS
        .iter()
        .find(|(v, _)| *v == version)
        .ok_or_else(|| DocumentError::UnsupportedVersion(version.to_string()))?;
    serde_json::from_str(text).map_err(|e| compile_error(e.to_string()))
}

/// Outcome of validating a registry document against its schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub version: SchemaVersion,
    pub valid: bool,
    pub messages: Vec<String>,
}

/// Validate `document` against the schema for `version`
pub fn validate(
    document: &Value,
    version: SchemaVersion,
    schema_dirs: &[PathBuf],
) -> DocumentResult<SchemaReport> {
    let schema = load_schema(version, schema_dirs)?;
    let validator = jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .map_err(|e| DocumentError::SchemaCompile {
            version: version.to_string(),
            message: e.to_string(),
        })?;

    let mut messages: Vec<String> = validator
        .iter_errors(document)
        .map(|e| format!("{} at '{}'", e, e.instance_path()))
        .collect();
    messages.sort();

    Ok(SchemaReport {
        version,
        valid: messages.is_empty(),
        messages,
    })
}

/// Schema directory next to a registry file, searched by default
pub fn default_schema_dir(registry_file: &Path) -> Option<PathBuf> {
    registry_file.parent().map(Path::to_path_buf)
}
