// Diagnostic system for the registry compiler
// Structured, coded messages with colored terminal output and JSON export

use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Where in the registry a diagnostic points: the registry file, the
/// compilation scope (`<file>` element) and the offending element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl Location {
    pub fn new(file: String, scope: Option<String>, element: Option<String>) -> Self {
        Self {
            file,
            scope,
            element,
        }
    }

    /// Location covering a whole registry file
    pub fn from_path(path: &Path) -> Self {
        Self {
            file: path.display().to_string(),
            scope: None,
            element: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(scope) = &self.scope {
            write!(f, " [{}]", scope)?;
        }
        if let Some(element) = &self.element {
            write!(f, " `{}`", element)?;
        }
        Ok(())
    }
}

/// Severity of a diagnostic. Every registry problem aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
    Error,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorLevel::Error => write!(f, "{}", "error".red().bold()),
        }
    }
}

/// Structured diagnostic message
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub code: String, // e.g., "R0101" for a duplicate local name
    pub message: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(code: &str, message: String, location: Location) -> Self {
        Self {
            level: ErrorLevel::Error,
            code: code.to_string(),
            message,
            location,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render for a terminal
    pub fn format(&self) -> String {
        let mut output = String::new();

        // Header: error[R0101]: message
        output.push_str(&format!(
            "{}[{}]: {}\n",
            self.level,
            self.code,
            self.message.bold()
        ));

        // Location: --> registry.json [physics_types] `u`
        output.push_str(&format!(" {} {}\n", "-->".cyan().bold(), self.location));

        for note in &self.notes {
            output.push_str(&format!(" {} {}\n", "=".cyan().bold(), note.cyan()));
        }

        if let Some(help) = &self.help {
            output.push_str(&format!(" {} {}\n", "help:".green().bold(), help));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Diagnostic collection and reporting engine
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == ErrorLevel::Error)
            .count()
    }

    /// Print all diagnostics to stderr
    pub fn print_all(&self) {
        for diag in &self.diagnostics {
            eprintln!("{}", diag.format());
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let errors = self.error_count();
        if errors > 0 {
            eprintln!(
                "{}: {} error{} emitted",
                "error".red().bold(),
                errors,
                if errors == 1 { "" } else { "s" }
            );
        }
    }

    /// Export diagnostics as JSON for editors and CI
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Report<'a> {
            diagnostics: &'a [Diagnostic],
        }

        serde_json::to_string(&Report {
            diagnostics: &self.diagnostics,
        })
    }
}

/// Registry error codes
pub mod error_codes {
    // Document errors (R0001-R0099)
    pub const DOCUMENT_IO: &str = "R0001";
    pub const DOCUMENT_SYNTAX: &str = "R0002";
    pub const MISSING_VERSION: &str = "R0003";
    pub const UNSUPPORTED_VERSION: &str = "R0004";
    pub const SCHEMA_VIOLATION: &str = "R0005";

    // Scope dictionary errors (R0100-R0199)
    pub const DUPLICATE_LOCAL_NAME: &str = "R0101";
    pub const DUPLICATE_STANDARD_NAME: &str = "R0102";

    // Variable errors (R0200-R0299)
    pub const UNRESOLVED_DIMENSION: &str = "R0201";
    pub const ILLEGAL_DIMENSION_STEP: &str = "R0202";
    pub const UNKNOWN_TYPE: &str = "R0203";
    pub const ILLEGAL_KIND: &str = "R0204";
    pub const UNKNOWN_ATTRIBUTE: &str = "R0205";
    pub const INVALID_ATTRIBUTE_VALUE: &str = "R0206";
    pub const UNKNOWN_CONTENT: &str = "R0207";
    pub const MISSING_INITIAL_VALUE: &str = "R0208";
    pub const UNKNOWN_INDEX: &str = "R0209";
    pub const ELEMENT_DIMENSION_NOT_FOUND: &str = "R0210";

    // Derived type errors (R0300-R0399)
    pub const UNKNOWN_PARENT_TYPE: &str = "R0301";
    pub const CONFLICTING_ATTRIBUTES: &str = "R0302";
    pub const UNKNOWN_MEMBER: &str = "R0303";
    pub const UNKNOWN_ELEMENT: &str = "R0304";
    pub const NO_MEMBER_VARIABLES: &str = "R0305";
    pub const NAME_COLLISION: &str = "R0306";

    // File and registry structure errors (R0400-R0499)
    pub const ILLEGAL_USE: &str = "R0401";
    pub const UNKNOWN_FILE_ELEMENT: &str = "R0402";
    pub const UNKNOWN_SECTION: &str = "R0403";

    // Internal errors (R0900-R0999)
    pub const INTERNAL_UNSUPPORTED: &str = "R0901";
}


/// Fuzzy matching utilities for "did you mean?" suggestions
pub mod fuzzy {
    use strsim::jaro_winkler;

    /// Find similar names using Jaro-Winkler similarity.
    /// Returns up to `max_suggestions` names scoring above `threshold`, best first.
    pub fn find_similar_names<'a, I>(
        target: &str,
        candidates: I,
        threshold: f64,
        max_suggestions: usize,
    ) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let target = target.to_lowercase();
        let mut scored: Vec<(String, f64)> = candidates
            .into_iter()
            .map(|candidate| {
                let similarity = jaro_winkler(&target, &candidate.to_lowercase());
                (candidate.to_string(), similarity)
            })
            .filter(|(_, score)| *score > threshold)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        scored
            .into_iter()
            .take(max_suggestions)
            .map(|(name, _)| name)
            .collect()
    }

}
