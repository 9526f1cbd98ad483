// Document loading and validation errors

use regc_diagnostics::{error_codes, Diagnostic, Location};
use std::path::PathBuf;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("cannot read registry file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry file {} is not valid JSON: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("registry root '{tag}' has no version attribute")]
    MissingVersion { tag: String },

    #[error("malformed registry version, '{0}'")]
    MalformedVersion(String),

    #[error("no registry schema found for version {0}")]
    UnsupportedVersion(String),

    #[error("registry schema for version {version} does not compile: {message}")]
    SchemaCompile { version: String, message: String },

    #[error("invalid registry file, {}", .path.display())]
    Invalid {
        path: PathBuf,
        messages: Vec<String>,
    },
}

impl DocumentError {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::Io { .. } => error_codes::DOCUMENT_IO,
            DocumentError::Syntax { .. } => error_codes::DOCUMENT_SYNTAX,
            DocumentError::MissingVersion { .. } | DocumentError::MalformedVersion(_) => {
                error_codes::MISSING_VERSION
            }
            DocumentError::UnsupportedVersion(_) | DocumentError::SchemaCompile { .. } => {
                error_codes::UNSUPPORTED_VERSION
            }
            DocumentError::Invalid { .. } => error_codes::SCHEMA_VIOLATION,
        }
    }

    pub fn to_diagnostic(&self, location: Location) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code(), self.to_string(), location);
        if let DocumentError::Invalid { messages, .. } = self {
            for message in messages {
                diag = diag.with_note(message.clone());
            }
        }
        diag
    }
}
