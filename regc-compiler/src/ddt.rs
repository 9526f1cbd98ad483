// Derived data types (DDTs)

use crate::dictionary::ScopeDictionary;
use crate::errors::{RegistryError, RegistryResult};
use crate::type_catalog::TypeCatalog;
use crate::variable::{Access, Variable};
use regc_document::Node;

/// A named aggregate of registry variables with optional single inheritance
#[derive(Debug, Clone)]
pub struct AggregateType {
    name: String,
    scope: String,
    members: Vec<Variable>,
    parent: Option<String>,
    private: bool,
    bind_c: bool,
}

/// Child elements a DDT may contain
enum DdtChild<'a> {
    Data(&'a Node),
}

impl<'a> DdtChild<'a> {
    fn classify(node: &'a Node, ddt: &str, scope: &str) -> RegistryResult<Self> {
        match node.tag.as_str() {
            "data" => Ok(DdtChild::Data(node)),
            other => Err(RegistryError::UnknownElement {
                tag: other.to_string(),
                ddt: ddt.to_string(),
                scope: scope.to_string(),
            }),
        }
    }
}

fn parse_flag(node: &Node, attribute: &str, ddt: &str, scope: &str) -> RegistryResult<bool> {
    let Some(value) = node.get(attribute) else {
        return Ok(false);
    };
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(RegistryError::InvalidAttributeValue {
            attribute: attribute.to_string(),
            value: value.to_string(),
            element: ddt.to_string(),
            scope: scope.to_string(),
        }),
    }
}

/// Whether a `data` entry applies to `dycore`
fn dycore_allows(node: &Node, dycore: &str) -> bool {
    let allowed: Vec<String> = node
        .get_or("dycore", "")
        .split(',')
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect();
    allowed.is_empty() || allowed.iter().any(|d| *d == dycore.to_lowercase())
}

impl AggregateType {
    /// Build a DDT from a `ddt` node, moving its members out of
    /// `dictionary`
    pub fn from_node(
        node: &Node,
        catalog: &TypeCatalog,
        dictionary: &mut ScopeDictionary,
        dycore: &str,
    ) -> RegistryResult<Self> {
        let scope = dictionary.name().to_string();
        let name = node.get_or("type", "").to_string();

        let parent = match node.get("extends") {
            Some(extends) => {
                let entry = catalog
                    .aggregate(extends)
                    .ok_or_else(|| RegistryError::UnknownParentType {
                        ddt: name.clone(),
                        parent: extends.to_string(),
                        scope: scope.clone(),
                        did_you_mean: catalog.suggest_aggregate(extends),
                    })?;
                Some(entry.name().to_string())
            }
            None => None,
        };

        let bind_c = parse_flag(node, "bindC", &name, &scope)?;
        if parent.is_some() && bind_c {
            return Err(RegistryError::ConflictingAttributes { ddt: name, scope });
        }
        let private = parse_flag(node, "private", &name, &scope)?;

        let mut members = Vec::new();
        for child in &node.children {
            match DdtChild::classify(child, &name, &scope)? {
                DdtChild::Data(data) => {
                    if !dycore_allows(data, dycore) {
                        log::debug!(
                            "Skipping {} in DDT {} for dycore {}",
                            data.text(),
                            name,
                            dycore
                        );
                        continue;
                    }
                    let member_name = data.text().trim();
                    let variable = dictionary.remove(member_name).ok_or_else(|| {
                        RegistryError::UnknownMember {
                            member: member_name.to_string(),
                            ddt: name.clone(),
                            scope: scope.clone(),
                        }
                    })?;
                    members.push(variable);
                }
            }
        }

        Ok(Self {
            name,
            scope,
            members,
            parent,
            private,
            bind_c,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope (module) defining this type
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Variables declared directly in this type
    pub fn members(&self) -> &[Variable] {
        &self.members
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn access(&self) -> Access {
        if self.private {
            Access::Private
        } else {
            Access::Public
        }
    }

    pub fn is_bind_c(&self) -> bool {
        self.bind_c
    }

    /// Own members followed by the flattened parent chain
    pub fn variable_list<'a>(&'a self, catalog: &'a TypeCatalog) -> Vec<&'a Variable> {
        let mut list: Vec<&Variable> = self.members.iter().collect();
        if let Some(parent) = self.parent.as_deref().and_then(|p| catalog.aggregate(p)) {
            list.extend(parent.variable_list(catalog));
        }
        list
    }

    /// Definitions must have at least one member of their own
    pub fn check_members(&self) -> RegistryResult<()> {
        if self.members.is_empty() {
            return Err(RegistryError::NoMemberVariables {
                ddt: self.name.clone(),
                scope: self.scope.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::RegistryVar;

    fn scalar(local: &str, standard: &str) -> Node {
        Node::new("variable")
            .with_attr("local_name", local)
            .with_attr("standard_name", standard)
            .with_attr("type", "real")
    }

    fn populated() -> (TypeCatalog, ScopeDictionary) {
        let catalog = TypeCatalog::new();
        let mut dict = ScopeDictionary::new("physics_types", "module");
        for (local, standard) in [("ps", "surface_air_pressure"), ("phis", "surface_geopotential")] {
            let var = Variable::from_node(&scalar(local, standard), &catalog, &dict).unwrap();
            dict.add(var).unwrap();
        }
        (catalog, dict)
    }

    fn data(standard: &str) -> Node {
        Node::new("data").with_text(standard)
    }

    #[test]
    fn test_members_leave_dictionary() {
        let (catalog, mut dict) = populated();
        let node = Node::new("ddt")
            .with_attr("type", "physics_state")
            .with_child(data("surface_air_pressure"));
        let ddt = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap();

        assert_eq!(ddt.members()[0].local_name(), "ps");
        assert!(dict.find_by_standard_name("surface_air_pressure").is_none());
        assert_eq!(dict.len(), 1);
        assert_eq!(ddt.access(), Access::Public);
    }

    #[test]
    fn test_unknown_parent() {
        let (catalog, mut dict) = populated();
        let node = Node::new("ddt")
            .with_attr("type", "physics_state")
            .with_attr("extends", "foo");
        let err = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap_err();
        assert_eq!(
            err.to_string(),
            "DDT, 'physics_state', extends type 'foo', however, this type is not known"
        );
    }

    #[test]
    fn test_extends_with_bind_c() {
        let (mut catalog, mut dict) = populated();
        let base = Node::new("ddt")
            .with_attr("type", "base_state")
            .with_child(data("surface_geopotential"));
        let base = AggregateType::from_node(&base, &catalog, &mut dict, "se").unwrap();
        catalog.register("base_state", "physics_types", Some(base)).unwrap();

        let node = Node::new("ddt")
            .with_attr("type", "physics_state")
            .with_attr("extends", "base_state")
            .with_attr("bindC", "true");
        let err = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap_err();
        assert!(matches!(err, RegistryError::ConflictingAttributes { .. }));
    }

    #[test]
    fn test_variable_list_includes_parent() {
        let (mut catalog, mut dict) = populated();
        let base = Node::new("ddt")
            .with_attr("type", "base_state")
            .with_child(data("surface_geopotential"));
        let base = AggregateType::from_node(&base, &catalog, &mut dict, "se").unwrap();
        catalog.register("base_state", "physics_types", Some(base)).unwrap();

        let node = Node::new("ddt")
            .with_attr("type", "physics_state")
            .with_attr("extends", "Base_State")
            .with_child(data("surface_air_pressure"));
        let ddt = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap();
        assert_eq!(ddt.parent(), Some("base_state"));

        let names: Vec<&str> = ddt.variable_list(&catalog).iter().map(|v| v.local_name()).collect();
        assert_eq!(names, vec!["ps", "phis"]);
    }

    #[test]
    fn test_dycore_filter() {
        let (catalog, mut dict) = populated();
        let node = Node::new("ddt")
            .with_attr("type", "physics_state")
            .with_child(data("surface_air_pressure").with_attr("dycore", "EUL, FV"))
            .with_child(data("surface_geopotential").with_attr("dycore", "se"));
        let ddt = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap();

        assert_eq!(ddt.members().len(), 1);
        assert_eq!(ddt.members()[0].local_name(), "phis");
        assert!(dict.find_by_standard_name("surface_air_pressure").is_some());
    }

    #[test]
    fn test_unknown_member_and_element() {
        let (catalog, mut dict) = populated();
        let node = Node::new("ddt")
            .with_attr("type", "physics_state")
            .with_child(data("air_temperature"));
        let err = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Variable, 'air_temperature', not found for DDT, 'physics_state', in 'physics_types'"
        );

        let node = Node::new("ddt")
            .with_attr("type", "physics_state")
            .with_child(Node::new("dessert").with_text("ice_cream"));
        let err = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown DDT element type, 'dessert', in 'physics_state'"
        );
    }

    #[test]
    fn test_no_members() {
        let (catalog, mut dict) = populated();
        let node = Node::new("ddt").with_attr("type", "physics_state");
        let ddt = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap();
        let err = ddt.check_members().unwrap_err();
        assert_eq!(err.to_string(), "DDT, 'physics_state', has no member variables");
    }

    #[test]
    fn test_flag_values() {
        let (catalog, mut dict) = populated();
        let node = Node::new("ddt")
            .with_attr("type", "physics_state")
            .with_attr("private", "Yes")
            .with_child(data("surface_air_pressure"));
        let ddt = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap();
        assert_eq!(ddt.access(), Access::Private);
        assert!(!ddt.is_bind_c());

        let node = Node::new("ddt")
            .with_attr("type", "other_state")
            .with_attr("bindC", "maybe");
        let err = AggregateType::from_node(&node, &catalog, &mut dict, "se").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAttributeValue { .. }));
    }
}
