// Registry compilation errors

use regc_diagnostics::{error_codes, Diagnostic, Location};

/// Result type for registry compilation
pub type RegistryResult<T> = Result<T, RegistryError>;

fn already_defined(what: &str, name: &Option<String>) -> String {
    name.as_ref()
        .map(|n| format!(", already defined with {}, '{}'", what, n))
        .unwrap_or_default()
}

/// Every way a registry can fail to compile.
///
/// All variants are fatal: the first one raised aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate variable local_name, '{local_name}', with standard_name, '{standard_name}', in {scope}{}",
        already_defined("standard_name", .existing_standard_name))]
    DuplicateLocalName {
        local_name: String,
        standard_name: String,
        scope: String,
        existing_standard_name: Option<String>,
    },

    #[error("duplicate variable standard_name, '{standard_name}' from '{local_name}' in '{scope}'{}",
        already_defined("local_name", .existing_local_name))]
    DuplicateStandardName {
        standard_name: String,
        local_name: String,
        scope: String,
        existing_local_name: Option<String>,
    },

    #[error("Dimension, '{dimension}', not found for '{variable}' in '{scope}'")]
    UnresolvedDimension {
        dimension: String,
        variable: String,
        scope: String,
    },

    #[error("Illegal dimension string, '{dimension}', in '{variable}', step not allowed")]
    IllegalDimensionStep {
        dimension: String,
        variable: String,
        scope: String,
    },

    #[error("'{variable}' has an unknown type, '{type_name}'")]
    UnknownType {
        type_name: String,
        variable: String,
        scope: String,
        did_you_mean: Option<String>,
    },

    #[error("kind attribute illegal for DDT type {type_name} ('{variable}')")]
    IllegalKind {
        type_name: String,
        variable: String,
        scope: String,
    },

    #[error("Bad variable attribute, '{attribute}', for '{element}'")]
    UnknownAttribute {
        attribute: String,
        element: String,
        scope: String,
    },

    #[error("Bad value, '{value}', for attribute '{attribute}' of '{element}'")]
    InvalidAttributeValue {
        attribute: String,
        value: String,
        element: String,
        scope: String,
    },

    #[error("Unknown Variable content, '{tag}', in '{element}'")]
    UnknownContent {
        tag: String,
        element: String,
        scope: String,
    },

    #[error("parameter, '{variable}', does not have an initial value")]
    MissingInitialValue { variable: String, scope: String },

    #[error("Unknown array index, '{index}', in '{parent}'")]
    UnknownIndex {
        index: String,
        parent: String,
        scope: String,
    },

    #[error("Cannot find element dimension, '{index_pos}' in {parent}({})", .dimensions.join(", "))]
    ElementDimensionNotFound {
        index_pos: String,
        parent: String,
        dimensions: Vec<String>,
        scope: String,
    },

    #[error("DDT, '{ddt}', extends type '{parent}', however, this type is not known")]
    UnknownParentType {
        ddt: String,
        parent: String,
        scope: String,
        did_you_mean: Option<String>,
    },

    #[error("DDT, '{ddt}', cannot have both 'extends' and 'bindC' attributes")]
    ConflictingAttributes { ddt: String, scope: String },

    #[error("Variable, '{member}', not found for DDT, '{ddt}', in '{scope}'")]
    UnknownMember {
        member: String,
        ddt: String,
        scope: String,
    },

    #[error("Unknown DDT element type, '{tag}', in '{ddt}'")]
    UnknownElement {
        tag: String,
        ddt: String,
        scope: String,
    },

    #[error("DDT, '{ddt}', has no member variables")]
    NoMemberVariables { ddt: String, scope: String },

    #[error("Trying to add {type_name} to registry, already defined in {defined_in}")]
    NameCollision {
        type_name: String,
        scope: String,
        defined_in: String,
    },

    #[error("Illegal use entry in '{scope}', no {missing}")]
    IllegalUse { missing: String, scope: String },

    #[error("Unknown registry File element, '{tag}', in '{scope}'")]
    UnknownFileElement { tag: String, scope: String },

    #[error("Unknown registry object type, '{tag}'")]
    UnknownSection { tag: String },

    #[error("{message} ('{element}' in '{scope}')")]
    InternalUnsupported {
        message: String,
        element: String,
        scope: String,
    },
}

impl RegistryError {
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::DuplicateLocalName { .. } => error_codes::DUPLICATE_LOCAL_NAME,
            RegistryError::DuplicateStandardName { .. } => error_codes::DUPLICATE_STANDARD_NAME,
            RegistryError::UnresolvedDimension { .. } => error_codes::UNRESOLVED_DIMENSION,
            RegistryError::IllegalDimensionStep { .. } => error_codes::ILLEGAL_DIMENSION_STEP,
            RegistryError::UnknownType { .. } => error_codes::UNKNOWN_TYPE,
            RegistryError::IllegalKind { .. } => error_codes::ILLEGAL_KIND,
            RegistryError::UnknownAttribute { .. } => error_codes::UNKNOWN_ATTRIBUTE,
            RegistryError::InvalidAttributeValue { .. } => error_codes::INVALID_ATTRIBUTE_VALUE,
            RegistryError::UnknownContent { .. } => error_codes::UNKNOWN_CONTENT,
            RegistryError::MissingInitialValue { .. } => error_codes::MISSING_INITIAL_VALUE,
            RegistryError::UnknownIndex { .. } => error_codes::UNKNOWN_INDEX,
            RegistryError::ElementDimensionNotFound { .. } => {
                error_codes::ELEMENT_DIMENSION_NOT_FOUND
            }
            RegistryError::UnknownParentType { .. } => error_codes::UNKNOWN_PARENT_TYPE,
            RegistryError::ConflictingAttributes { .. } => error_codes::CONFLICTING_ATTRIBUTES,
            RegistryError::UnknownMember { .. } => error_codes::UNKNOWN_MEMBER,
            RegistryError::UnknownElement { .. } => error_codes::UNKNOWN_ELEMENT,
            RegistryError::NoMemberVariables { .. } => error_codes::NO_MEMBER_VARIABLES,
            RegistryError::NameCollision { .. } => error_codes::NAME_COLLISION,
            RegistryError::IllegalUse { .. } => error_codes::ILLEGAL_USE,
            RegistryError::UnknownFileElement { .. } => error_codes::UNKNOWN_FILE_ELEMENT,
            RegistryError::UnknownSection { .. } => error_codes::UNKNOWN_SECTION,
            RegistryError::InternalUnsupported { .. } => error_codes::INTERNAL_UNSUPPORTED,
        }
    }

    /// Scope (registry file element) the error was raised in
    pub fn scope(&self) -> Option<&str> {
        match self {
            RegistryError::UnknownSection { .. } => None,
            RegistryError::DuplicateLocalName { scope, .. }
            | RegistryError::DuplicateStandardName { scope, .. }
            | RegistryError::UnresolvedDimension { scope, .. }
            | RegistryError::IllegalDimensionStep { scope, .. }
            | RegistryError::UnknownType { scope, .. }
            | RegistryError::IllegalKind { scope, .. }
            | RegistryError::UnknownAttribute { scope, .. }
            | RegistryError::InvalidAttributeValue { scope, .. }
            | RegistryError::UnknownContent { scope, .. }
            | RegistryError::MissingInitialValue { scope, .. }
            | RegistryError::UnknownIndex { scope, .. }
            | RegistryError::ElementDimensionNotFound { scope, .. }
            | RegistryError::UnknownParentType { scope, .. }
            | RegistryError::ConflictingAttributes { scope, .. }
            | RegistryError::UnknownMember { scope, .. }
            | RegistryError::UnknownElement { scope, .. }
            | RegistryError::NoMemberVariables { scope, .. }
            | RegistryError::NameCollision { scope, .. }
            | RegistryError::IllegalUse { scope, .. }
            | RegistryError::UnknownFileElement { scope, .. }
            | RegistryError::InternalUnsupported { scope, .. } => Some(scope),
        }
    }

    /// Name of the offending registry element
    pub fn element(&self) -> &str {
        match self {
            RegistryError::DuplicateLocalName { local_name, .. } => local_name,
            RegistryError::DuplicateStandardName { standard_name, .. } => standard_name,
            RegistryError::UnresolvedDimension { variable, .. }
            | RegistryError::IllegalDimensionStep { variable, .. }
            | RegistryError::UnknownType { variable, .. }
            | RegistryError::IllegalKind { variable, .. }
            | RegistryError::MissingInitialValue { variable, .. } => variable,
            RegistryError::UnknownAttribute { element, .. }
            | RegistryError::InvalidAttributeValue { element, .. }
            | RegistryError::UnknownContent { element, .. }
            | RegistryError::InternalUnsupported { element, .. } => element,
            RegistryError::UnknownIndex { parent, .. }
            | RegistryError::ElementDimensionNotFound { parent, .. } => parent,
            RegistryError::UnknownParentType { ddt, .. }
            | RegistryError::ConflictingAttributes { ddt, .. }
            | RegistryError::UnknownMember { ddt, .. }
            | RegistryError::UnknownElement { ddt, .. }
            | RegistryError::NoMemberVariables { ddt, .. } => ddt,
            RegistryError::NameCollision { type_name, .. } => type_name,
            RegistryError::IllegalUse { missing, .. } => missing,
            RegistryError::UnknownFileElement { tag, .. }
            | RegistryError::UnknownSection { tag } => tag,
        }
    }

    /// Closest known type name, when one was found
    pub fn did_you_mean(&self) -> Option<&str> {
        match self {
            RegistryError::UnknownType { did_you_mean, .. }
            | RegistryError::UnknownParentType { did_you_mean, .. } => did_you_mean.as_deref(),
            _ => None,
        }
    }

    /// Whether this error marks an unimplemented or impossible state
    /// rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, RegistryError::InternalUnsupported { .. })
    }

    /// Convert to a diagnostic located in `registry_file`
    pub fn to_diagnostic(&self, registry_file: &str) -> Diagnostic {
        let mut location =
            Location::new(registry_file.to_string(), None, None).with_element(self.element());
        if let Some(scope) = self.scope() {
            location = location.with_scope(scope);
        }
        let mut diag = Diagnostic::error(self.code(), self.to_string(), location);
        if let Some(candidate) = self.did_you_mean() {
            diag = diag.with_help(format!("did you mean `{}`?", candidate));
        }
        if self.is_internal() {
            diag = diag.with_note("this is a limitation of the registry compiler".to_string());
        }
        diag
    }
}
