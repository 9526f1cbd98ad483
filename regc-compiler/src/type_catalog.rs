// Run-scoped catalog of known type names

use crate::ddt::AggregateType;
use crate::errors::{RegistryError, RegistryResult};
use indexmap::IndexMap;
use regc_diagnostics::fuzzy::find_similar_names;

/// Intrinsic types every catalog starts with
pub const INTRINSIC_TYPES: &[&str] = &["character", "complex", "integer", "logical", "real"];

/// A known type and where it comes from
#[derive(Debug, Clone)]
pub struct TypeEntry {
    name: String,
    scope: Option<String>,
    aggregate: Option<AggregateType>,
}

impl TypeEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope (module) that defines this type, `None` for intrinsics
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn aggregate(&self) -> Option<&AggregateType> {
        self.aggregate.as_ref()
    }

    /// The part of this entry a variable keeps
    pub fn type_ref(&self) -> TypeRef {
        TypeRef {
            name: self.name.clone(),
            module: self.scope.clone(),
            is_aggregate: self.aggregate.is_some(),
        }
    }
}

/// A variable's resolved type. Aggregates are referenced by name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub module: Option<String>,
    pub is_aggregate: bool,
}

/// Catalog of known types, keyed by lower-cased name
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    entries: IndexMap<String, TypeEntry>,
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog {
    pub fn new() -> Self {
        let entries = INTRINSIC_TYPES
            .iter()
            .map(|name| {
                let entry = TypeEntry {
                    name: name.to_string(),
                    scope: None,
                    aggregate: None,
                };
                (name.to_string(), entry)
            })
            .collect();
        Self { entries }
    }

    /// Case-insensitive lookup
    pub fn lookup(&self, name: &str) -> Option<&TypeEntry> {
        self.entries.get(&name.to_lowercase())
    }

    /// Add a type defined in `scope`
    pub fn register(
        &mut self,
        name: &str,
        scope: &str,
        aggregate: Option<AggregateType>,
    ) -> RegistryResult<()> {
        let key = name.to_lowercase();
        if let Some(existing) = self.entries.get(&key) {
            return Err(RegistryError::NameCollision {
                type_name: name.to_string(),
                scope: scope.to_string(),
                defined_in: existing.scope().unwrap_or("intrinsic").to_string(),
            });
        }

        log::debug!("Adding type {} from {} as a known type", name, scope);
        self.entries.insert(
            key,
            TypeEntry {
                name: name.to_string(),
                scope: Some(scope.to_string()),
                aggregate,
            },
        );
        Ok(())
    }

    /// Registered aggregate type named `name`
    pub fn aggregate(&self, name: &str) -> Option<&AggregateType> {
        self.lookup(name).and_then(TypeEntry::aggregate)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(TypeEntry::name)
    }

    /// Closest known type name to `name`, for error messages
    pub fn suggest(&self, name: &str) -> Option<String> {
        find_similar_names(name, self.type_names(), 0.8, 1)
            .into_iter()
            .next()
    }

    /// Closest registered aggregate type name to `name`
    pub fn suggest_aggregate(&self, name: &str) -> Option<String> {
        let aggregates = self
            .entries
            .values()
            .filter(|e| e.aggregate.is_some())
            .map(TypeEntry::name);
        find_similar_names(name, aggregates, 0.8, 1).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsics_seeded() {
        let catalog = TypeCatalog::new();
        for name in INTRINSIC_TYPES {
            let entry = catalog.lookup(name).unwrap();
            assert_eq!(entry.scope(), None);
            assert!(entry.aggregate().is_none());
        }
        assert!(catalog.lookup("REAL").is_some());
        assert!(catalog.lookup("double").is_none());
    }

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = TypeCatalog::new();
        catalog.register("Physics_State", "physics_types", None).unwrap();

        let entry = catalog.lookup("physics_state").unwrap();
        assert_eq!(entry.name(), "Physics_State");
        assert_eq!(entry.scope(), Some("physics_types"));

        let type_ref = entry.type_ref();
        assert_eq!(type_ref.module.as_deref(), Some("physics_types"));
        assert!(!type_ref.is_aggregate);
    }

    #[test]
    fn test_collision_names_prior_scope() {
        let mut catalog = TypeCatalog::new();
        catalog.register("physics_state", "physics_types", None).unwrap();

        let err = catalog
            .register("PHYSICS_STATE", "other_types", None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Trying to add PHYSICS_STATE to registry, already defined in physics_types"
        );

        let err = catalog.register("real", "other_types", None).unwrap_err();
        assert!(err.to_string().ends_with("already defined in intrinsic"));
    }

    #[test]
    fn test_suggest() {
        let catalog = TypeCatalog::new();
        assert_eq!(catalog.suggest("integr").as_deref(), Some("integer"));
        assert_eq!(catalog.suggest("xyzzy"), None);
    }
}
