// Per-scope variable dictionary

use crate::dimensions::named_components;
use crate::errors::{RegistryError, RegistryResult};
use crate::variable::{RegistryVar, Variable};
use indexmap::{IndexMap, IndexSet};

/// Ordered variables of one scope.
///
/// Local and standard names are unique without regard to case. A standard
/// name stays taken after its variable is removed.
#[derive(Debug, Clone)]
pub struct ScopeDictionary {
    name: String,
    kind: String,
    variables: IndexMap<String, Variable>,
    standard_names: IndexSet<String>,
    dimensions: IndexSet<String>,
}

impl ScopeDictionary {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            variables: IndexMap::new(),
            standard_names: IndexSet::new(),
            dimensions: IndexSet::new(),
        }
    }

    /// Scope name, usually the module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope kind, e.g. `module` or `host`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Non-constant dimension names used by added variables, lower-cased,
    /// in first-use order
    pub fn known_dimensions(&self) -> &IndexSet<String> {
        &self.dimensions
    }

    pub fn add(&mut self, variable: Variable) -> RegistryResult<()> {
        let local_key = variable.local_name().to_lowercase();
        let standard_key = variable.standard_name().to_lowercase();

        if let Some(existing) = self.variables.get(&local_key) {
            let existing_standard_name = (existing.standard_name() != variable.standard_name())
                .then(|| existing.standard_name().to_string());
            return Err(RegistryError::DuplicateLocalName {
                local_name: variable.local_name().to_string(),
                standard_name: variable.standard_name().to_string(),
                scope: self.name.clone(),
                existing_standard_name,
            });
        }

        if self.standard_names.contains(&standard_key) {
            let existing_local_name = self
                .variables
                .values()
                .find(|v| v.standard_name().to_lowercase() == standard_key)
                .map(|v| v.local_name().to_string());
            return Err(RegistryError::DuplicateStandardName {
                standard_name: variable.standard_name().to_string(),
                local_name: variable.local_name().to_string(),
                scope: self.name.clone(),
                existing_local_name,
            });
        }

        for token in variable.dimensions() {
            self.dimensions.extend(named_components(token));
        }
        self.standard_names.insert(standard_key);
        self.variables.insert(local_key, variable);
        Ok(())
    }

    pub fn find_by_local_name(&self, local_name: &str) -> Option<&Variable> {
        let found = self.variables.get(&local_name.to_lowercase());
        if found.is_none() {
            log::debug!("Local name, {}, not found in {}", local_name, self.name);
        }
        found
    }

    pub fn find_by_standard_name(&self, standard_name: &str) -> Option<&Variable> {
        let key = standard_name.to_lowercase();
        let found = self
            .variables
            .values()
            .find(|v| v.standard_name().to_lowercase() == key);
        if found.is_none() {
            log::debug!("Standard name, {}, not found in {}", standard_name, self.name);
        }
        found
    }

    /// Detach the variable with `standard_name`. Its standard name remains
    /// reserved in this scope.
    pub fn remove(&mut self, standard_name: &str) -> Option<Variable> {
        let key = standard_name.to_lowercase();
        let local_key = self
            .variables
            .iter()
            .find(|(_, v)| v.standard_name().to_lowercase() == key)
            .map(|(k, _)| k.clone());
        match local_key {
            Some(local_key) => self.variables.shift_remove(&local_key),
            None => {
                log::debug!(
                    "Cannot remove {} from {}, variable not found.",
                    standard_name,
                    self.name
                );
                None
            }
        }
    }

    /// Variables in insertion order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_catalog::TypeCatalog;
    use regc_document::Node;

    fn variable(dict: &ScopeDictionary, local: &str, standard: &str, dims: &str) -> Variable {
        let mut node = Node::new("variable")
            .with_attr("local_name", local)
            .with_attr("standard_name", standard)
            .with_attr("type", "real")
            .with_attr("allocatable", "allocatable");
        if !dims.is_empty() {
            node = node.with_child(Node::new("dimensions").with_text(dims));
        }
        Variable::from_node(&node, &TypeCatalog::new(), dict).unwrap()
    }

    #[test]
    fn test_duplicate_local_name() {
        let mut dict = ScopeDictionary::new("physics_types", "module");
        dict.add(variable(&dict, "u", "east_wind", "")).unwrap();

        let err = dict.add(variable(&dict, "U", "eastward_wind", "")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "duplicate variable local_name, 'U', with standard_name, 'eastward_wind', in physics_types, already defined with standard_name, 'east_wind'"
        );
    }

    #[test]
    fn test_duplicate_standard_name() {
        let mut dict = ScopeDictionary::new("physics_types", "module");
        dict.add(variable(&dict, "u", "east_wind", "")).unwrap();

        let err = dict.add(variable(&dict, "u2", "East_Wind", "")).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateStandardName { ref existing_local_name, .. }
                if existing_local_name.as_deref() == Some("u")
        ));
    }

    #[test]
    fn test_removed_standard_name_stays_reserved() {
        let mut dict = ScopeDictionary::new("physics_types", "module");
        dict.add(variable(&dict, "u", "east_wind", "")).unwrap();

        let removed = dict.remove("EAST_WIND").unwrap();
        assert_eq!(removed.local_name(), "u");
        assert!(dict.find_by_local_name("u").is_none());
        assert!(dict.remove("east_wind").is_none());

        let err = dict.add(variable(&dict, "u", "east_wind", "")).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateStandardName { existing_local_name: None, .. }
        ));

        // The local name itself is free again
        dict.add(variable(&dict, "u", "other_wind", "")).unwrap();
    }

    #[test]
    fn test_known_dimensions() {
        let mut dict = ScopeDictionary::new("physics_types", "module");
        dict.add(variable(
            &dict,
            "u",
            "east_wind",
            "horizontal_dimension vertical_layer_dimension",
        ))
        .unwrap();
        dict.add(variable(
            &dict,
            "ps",
            "surface_air_pressure",
            "ccpp_constant_one:Horizontal_Dimension",
        ))
        .unwrap();
        dict.add(variable(&dict, "c", "scalar", "ccpp_constant_one")).unwrap();

        let dims: Vec<&str> = dict.known_dimensions().iter().map(String::as_str).collect();
        assert_eq!(dims, vec!["horizontal_dimension", "vertical_layer_dimension"]);
    }

    #[test]
    fn test_lookups_preserve_order() {
        let mut dict = ScopeDictionary::new("physics_types", "module");
        dict.add(variable(&dict, "v", "north_wind", "")).unwrap();
        dict.add(variable(&dict, "u", "east_wind", "")).unwrap();

        assert_eq!(dict.find_by_standard_name("NORTH_WIND").map(|v| v.local_name()), Some("v"));
        assert_eq!(dict.find_by_local_name("U").map(|v| v.standard_name()), Some("east_wind"));
        let names: Vec<&str> = dict.variables().map(|v| v.local_name()).collect();
        assert_eq!(names, vec!["v", "u"]);
        assert_eq!(dict.len(), 2);
    }
}
