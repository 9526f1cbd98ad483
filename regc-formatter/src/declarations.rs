// Declaration layout
//
// The compiler describes each declaration without any padding. A block of
// declarations is rendered together so that attribute columns and the `::`
// separator line up.

use crate::emitter::Emitter;
use crate::rules::alignment::{column_width, pad_right};

const PROTECTED: &str = "protected";

/// Initializer of a declared entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initializer {
    /// `= value`
    Value(String),
    /// `=> target`, for pointers
    Pointer(String),
}

/// A padding-free description of one entity declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Full type spec, e.g. `real(kind_phys)` or `type(physics_state)`
    pub type_spec: String,
    /// `public` or `private`
    pub access: String,
    /// Storage attribute such as `allocatable`, `pointer`, `target`, `parameter`
    pub allocation: Option<String>,
    pub protected: bool,
    pub name: String,
    /// Declared shape, `(ncol, pver)` or `(:, :)`; empty for scalars
    pub dimensions: String,
    pub initializer: Option<Initializer>,
    /// Comment line emitted above the declaration
    pub comment: Option<String>,
}

impl Declaration {
    pub fn new(type_spec: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_spec: type_spec.into(),
            access: "private".to_string(),
            allocation: None,
            protected: false,
            name: name.into(),
            dimensions: String::new(),
            initializer: None,
            comment: None,
        }
    }
}

/// Declarations rendered as one aligned group
#[derive(Debug, Clone)]
pub struct DeclarationBlock {
    /// Access that needs no explicit attribute in this block
    pub default_access: String,
    /// Whether a `protected` column may appear (not inside derived types)
    pub allow_protected: bool,
    pub declarations: Vec<Declaration>,
}

struct Columns {
    type_spec: usize,
    access: usize,
    allocation: usize,
    protected: bool,
}

impl DeclarationBlock {
    pub fn new(default_access: impl Into<String>, allow_protected: bool) -> Self {
        Self {
            default_access: default_access.into(),
            allow_protected,
            declarations: Vec::new(),
        }
    }

    pub fn push(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn shows_access<'a>(&self, decl: &'a Declaration) -> Option<&'a str> {
        (decl.access != self.default_access).then_some(decl.access.as_str())
    }

    fn columns(&self) -> Columns {
        let decls = &self.declarations;
        Columns {
            type_spec: column_width(decls.iter().map(|d| d.type_spec.as_str())),
            access: column_width(decls.iter().filter_map(|d| self.shows_access(d))),
            allocation: column_width(decls.iter().filter_map(|d| d.allocation.as_deref())),
            protected: self.allow_protected && decls.iter().any(|d| d.protected),
        }
    }

    fn attribute_cell(value: Option<&str>, width: usize) -> String {
        // ", " separator plus the widest value
        let cell = value.map(|v| format!(", {}", v)).unwrap_or_default();
        pad_right(&cell, width + 2)
    }

    /// Render one declaration line using the block's column widths
    fn render_line(&self, decl: &Declaration, columns: &Columns) -> String {
        let mut line = pad_right(&decl.type_spec, columns.type_spec);
        if columns.access > 0 {
            line.push_str(&Self::attribute_cell(self.shows_access(decl), columns.access));
        }
        if columns.allocation > 0 {
            line.push_str(&Self::attribute_cell(
                decl.allocation.as_deref(),
                columns.allocation,
            ));
        }
        if columns.protected {
            let value = decl.protected.then_some(PROTECTED);
            line.push_str(&Self::attribute_cell(value, PROTECTED.len()));
        }
        line.push_str(" :: ");
        line.push_str(&decl.name);
        line.push_str(&decl.dimensions);
        match &decl.initializer {
            Some(Initializer::Value(value)) => {
                line.push_str(" = ");
                line.push_str(value);
            }
            Some(Initializer::Pointer(target)) => {
                line.push_str(" => ");
                line.push_str(target);
            }
            None => {}
        }
        line
    }

    /// Rendered declaration lines, without comments
    pub fn lines(&self) -> Vec<String> {
        let columns = self.columns();
        self.declarations
            .iter()
            .map(|decl| self.render_line(decl, &columns))
            .collect()
    }

    /// Emit every declaration, each preceded by its comment
    pub fn write(&self, emitter: &mut Emitter, depth: usize) {
        for (decl, line) in self.declarations.iter().zip(self.lines()) {
            if let Some(comment) = &decl.comment {
                emitter.write(depth, &format!("! {}", comment));
            }
            emitter.write(depth, &line);
        }
    }
}
