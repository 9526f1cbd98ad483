// Use-statement rules

use crate::emitter::Emitter;
use crate::rules::alignment::{column_width, pad_right};

/// One `use <module>, only: <symbol>` import
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UseStatement {
    pub module: String,
    pub symbol: String,
}

impl UseStatement {
    pub fn new(module: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbol: symbol.into(),
        }
    }
}

/// Sort imports by module then symbol and drop repeats.
/// Comparison ignores case, the first spelling seen is kept.
pub fn sort_imports(imports: &mut Vec<UseStatement>) {
    let key = |u: &UseStatement| (u.module.to_lowercase(), u.symbol.to_lowercase());
    imports.sort_by_key(key);
    imports.dedup_by(|a, b| key(a) == key(b));
}

/// Emit imports with the `only:` column aligned
pub fn write_imports(emitter: &mut Emitter, depth: usize, imports: &[UseStatement]) {
    let width = column_width(imports.iter().map(|u| u.module.as_str()));
    for import in imports {
        let module = pad_right(&format!("{},", import.module), width + 1);
        emitter.write(depth, &format!("use {} only: {}", module, import.symbol));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_imports_dedups() {
        let mut imports = vec![
            UseStatement::new("physics_types", "physics_state"),
            UseStatement::new("ccpp_kinds", "kind_phys"),
            UseStatement::new("CCPP_KINDS", "kind_phys"),
            UseStatement::new("ccpp_kinds", "kind_dyn"),
        ];
        sort_imports(&mut imports);
        assert_eq!(
            imports,
            vec![
                UseStatement::new("ccpp_kinds", "kind_dyn"),
                UseStatement::new("ccpp_kinds", "kind_phys"),
                UseStatement::new("physics_types", "physics_state"),
            ]
        );
    }

    #[test]
    fn test_write_imports_aligns_only() {
        let mut emitter = Emitter::with_indent(3);
        write_imports(
            &mut emitter,
            1,
            &[
                UseStatement::new("ccpp_kinds", "kind_phys"),
                UseStatement::new("physics_types", "physics_state"),
            ],
        );
        assert_eq!(
            emitter.output(),
            "   use ccpp_kinds,    only: kind_phys\n   use physics_types, only: physics_state\n"
        );
    }
}
