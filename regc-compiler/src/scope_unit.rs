// Registry files: the top-level compilation units

use crate::context::CompileContext;
use crate::ddt::AggregateType;
use crate::dictionary::ScopeDictionary;
use crate::errors::{RegistryError, RegistryResult};
use crate::type_catalog::TypeCatalog;
use crate::variable::{RegistryVar, Variable};
use regc_document::Node;
use regc_formatter::UseStatement;

/// Elements allowed directly inside a `file`
enum FileItem<'a> {
    Variable(&'a Node),
    Ddt(&'a Node),
    Use(&'a Node),
}

impl<'a> FileItem<'a> {
    fn classify(node: &'a Node, scope: &str) -> RegistryResult<Self> {
        match node.tag.as_str() {
            "variable" | "array" => Ok(FileItem::Variable(node)),
            "ddt" => Ok(FileItem::Ddt(node)),
            "use" => Ok(FileItem::Use(node)),
            other => Err(RegistryError::UnknownFileElement {
                tag: other.to_string(),
                scope: scope.to_string(),
            }),
        }
    }
}

fn parse_use(node: &Node, scope: &str) -> RegistryResult<UseStatement> {
    let missing = |what: &str| RegistryError::IllegalUse {
        missing: what.to_string(),
        scope: scope.to_string(),
    };
    let module = node
        .get("module")
        .filter(|m| !m.is_empty())
        .ok_or_else(|| missing("module"))?;
    let reference = node
        .get("reference")
        .filter(|r| !r.is_empty())
        .ok_or_else(|| missing("reference"))?;
    Ok(UseStatement::new(module, reference))
}

/// One registry `file`: its variables, the DDTs it defines and the
/// external symbols it references
#[derive(Debug, Clone)]
pub struct ScopeUnit {
    name: String,
    kind: String,
    dictionary: ScopeDictionary,
    ddts: Vec<String>,
    uses: Vec<UseStatement>,
}

impl ScopeUnit {
    /// Parse a `file` node.
    ///
    /// Variables and arrays are built first, then DDTs in document order.
    /// A variable typed by a DDT of this same file is added right after
    /// that DDT is registered in the context's catalog.
    pub fn from_node(node: &Node, ctx: &mut CompileContext) -> RegistryResult<Self> {
        let name = node.get_or("name", "").to_string();
        let kind = node.get_or("type", "").to_string();
        let mut dictionary = ScopeDictionary::new(name.clone(), kind.clone());
        let mut ddts = Vec::new();
        let mut uses = Vec::new();

        let items = node
            .children
            .iter()
            .map(|child| FileItem::classify(child, &name))
            .collect::<RegistryResult<Vec<_>>>()?;
        let local_types: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                FileItem::Ddt(ddt_node) => Some(ddt_node.get_or("type", "").to_lowercase()),
                _ => None,
            })
            .filter(|type_name| !type_name.is_empty())
            .collect();

        let mut deferred = Vec::new();
        for item in &items {
            match item {
                FileItem::Variable(var_node) => {
                    let type_name = var_node.get_or("type", "").to_lowercase();
                    if local_types.contains(&type_name) {
                        deferred.push(*var_node);
                        continue;
                    }
                    let variable = Variable::from_node(var_node, &ctx.catalog, &dictionary)?;
                    dictionary.add(variable)?;
                }
                FileItem::Use(use_node) => uses.push(parse_use(use_node, &name)?),
                FileItem::Ddt(_) => {}
            }
        }

        for item in &items {
            let FileItem::Ddt(ddt_node) = item else {
                continue;
            };
            let ddt =
                AggregateType::from_node(ddt_node, &ctx.catalog, &mut dictionary, &ctx.dycore)?;
            let type_name = ddt.name().to_string();
            ctx.catalog.register(&type_name, &name, Some(ddt))?;

            let lowered = type_name.to_lowercase();
            for var_node in deferred
                .iter()
                .filter(|v| v.get_or("type", "").to_lowercase() == lowered)
            {
                let variable = Variable::from_node(var_node, &ctx.catalog, &dictionary)?;
                dictionary.add(variable)?;
            }
            ddts.push(type_name);
        }

        Ok(Self {
            name,
            kind,
            dictionary,
            ddts,
            uses,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File type, e.g. `module`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn dictionary(&self) -> &ScopeDictionary {
        &self.dictionary
    }

    /// Names of the DDTs defined here, in document order
    pub fn ddt_names(&self) -> &[String] {
        &self.ddts
    }

    /// Explicit `use` entries
    pub fn uses(&self) -> &[UseStatement] {
        &self.uses
    }

    /// DDTs defined here, looked up in `catalog`
    pub fn aggregates<'a>(
        &'a self,
        catalog: &'a TypeCatalog,
    ) -> RegistryResult<Vec<&'a AggregateType>> {
        self.ddts
            .iter()
            .map(|name| {
                catalog
                    .aggregate(name)
                    .ok_or_else(|| RegistryError::InternalUnsupported {
                        message: "DDT missing from the type catalog".to_string(),
                        element: name.clone(),
                        scope: self.name.clone(),
                    })
            })
            .collect()
    }

    /// Imports needed by the generated module: types of scope variables,
    /// types of DDT members, then explicit references. The module's own
    /// types are skipped.
    pub fn imports(&self, catalog: &TypeCatalog) -> RegistryResult<Vec<UseStatement>> {
        let own = self.name.to_lowercase();
        let mut imports = Vec::new();
        let mut add = |var: &Variable| {
            if let Some(module) = var.module() {
                if module.to_lowercase() != own {
                    imports.push(UseStatement::new(module, var.type_ref().name.clone()));
                }
            }
        };

        self.dictionary.variables().for_each(&mut add);
        for ddt in self.aggregates(catalog)? {
            ddt.variable_list(catalog).into_iter().for_each(&mut add);
        }
        imports.extend(self.uses.iter().cloned());
        Ok(imports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RegistryConfig;

    fn context() -> CompileContext {
        CompileContext::new("se", RegistryConfig::default())
    }

    fn file(children: Vec<Node>) -> Node {
        children.into_iter().fold(
            Node::new("file")
                .with_attr("name", "physics_types")
                .with_attr("type", "module"),
            Node::with_child,
        )
    }

    fn var(local: &str, standard: &str, type_name: &str) -> Node {
        Node::new("variable")
            .with_attr("local_name", local)
            .with_attr("standard_name", standard)
            .with_attr("type", type_name)
    }

    #[test]
    fn test_ddt_registered_and_usable_later() {
        let mut ctx = context();
        let node = file(vec![
            Node::new("use")
                .with_attr("module", "ccpp_kinds")
                .with_attr("reference", "kind_phys"),
            var("ps", "surface_air_pressure", "real"),
            Node::new("ddt")
                .with_attr("type", "physics_state")
                .with_child(Node::new("data").with_text("surface_air_pressure")),
            var("phys_state", "physics_state_instance", "physics_state"),
        ]);
        let unit = ScopeUnit::from_node(&node, &mut ctx).unwrap();

        assert_eq!(unit.ddt_names(), &["physics_state".to_string()]);
        let entry = ctx.catalog.lookup("physics_state").unwrap();
        assert_eq!(entry.scope(), Some("physics_types"));

        let state = unit.dictionary().find_by_local_name("phys_state").unwrap();
        assert!(state.is_ddt());

        // Own types are not imported
        let imports = unit.imports(&ctx.catalog).unwrap();
        assert_eq!(imports, vec![UseStatement::new("ccpp_kinds", "kind_phys")]);
    }

    #[test]
    fn test_variables_built_before_ddts() {
        let mut ctx = context();
        let node = file(vec![
            Node::new("ddt")
                .with_attr("type", "physics_state")
                .with_child(Node::new("data").with_text("surface_air_pressure")),
            var("ps", "surface_air_pressure", "real"),
        ]);
        let unit = ScopeUnit::from_node(&node, &mut ctx).unwrap();

        let ddt = ctx.catalog.aggregate("physics_state").unwrap();
        assert_eq!(ddt.members()[0].local_name(), "ps");
        assert!(unit.dictionary().find_by_local_name("ps").is_none());
    }

    #[test]
    fn test_instance_of_local_ddt_usable_as_member() {
        let mut ctx = context();
        let node = file(vec![
            Node::new("ddt")
                .with_attr("type", "physics_tend")
                .with_child(Node::new("data").with_text("physics_state_instance")),
            var("state", "physics_state_instance", "physics_state"),
            Node::new("ddt")
                .with_attr("type", "physics_state")
                .with_child(Node::new("data").with_text("surface_air_pressure")),
            var("ps", "surface_air_pressure", "real"),
        ]);
        let err = ScopeUnit::from_node(&node, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnknownMember { ref member, .. } if member == "physics_state_instance"
        ));

        let mut ctx = context();
        let node = file(vec![
            Node::new("ddt")
                .with_attr("type", "physics_state")
                .with_child(Node::new("data").with_text("surface_air_pressure")),
            Node::new("ddt")
                .with_attr("type", "physics_tend")
                .with_child(Node::new("data").with_text("physics_state_instance")),
            var("state", "physics_state_instance", "physics_state"),
            var("ps", "surface_air_pressure", "real"),
        ]);
        let unit = ScopeUnit::from_node(&node, &mut ctx).unwrap();
        assert_eq!(unit.ddt_names(), &["physics_state".to_string(), "physics_tend".to_string()]);
        let tend = ctx.catalog.aggregate("physics_tend").unwrap();
        assert!(tend.members()[0].is_ddt());
    }

    #[test]
    fn test_unknown_file_element() {
        let mut ctx = context();
        let node = file(vec![Node::new("constant")]);
        let err = ScopeUnit::from_node(&node, &mut ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown registry File element, 'constant', in 'physics_types'"
        );
    }

    #[test]
    fn test_illegal_use() {
        let mut ctx = context();
        let node = file(vec![Node::new("use").with_attr("module", "ccpp_kinds")]);
        let err = ScopeUnit::from_node(&node, &mut ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Illegal use entry in 'physics_types', no reference"
        );
    }

    #[test]
    fn test_type_name_collision_across_files() {
        let mut ctx = context();
        let ddt = || {
            Node::new("ddt")
                .with_attr("type", "physics_state")
                .with_child(Node::new("data").with_text("surface_air_pressure"))
        };
        let first = file(vec![var("ps", "surface_air_pressure", "real"), ddt()]);
        ScopeUnit::from_node(&first, &mut ctx).unwrap();

        let second = Node::new("file")
            .with_attr("name", "other_types")
            .with_attr("type", "module")
            .with_child(var("ps", "surface_air_pressure", "real"))
            .with_child(ddt());
        let err = ScopeUnit::from_node(&second, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::NameCollision { ref defined_in, .. } if defined_in == "physics_types"
        ));
    }

    #[test]
    fn test_imports_from_other_scope() {
        let mut ctx = context();
        let first = file(vec![
            var("ps", "surface_air_pressure", "real"),
            Node::new("ddt")
                .with_attr("type", "physics_state")
                .with_child(Node::new("data").with_text("surface_air_pressure")),
        ]);
        ScopeUnit::from_node(&first, &mut ctx).unwrap();

        let second = Node::new("file")
            .with_attr("name", "physics_buffer")
            .with_attr("type", "module")
            .with_child(var("state", "physics_state_in", "physics_state"));
        let unit = ScopeUnit::from_node(&second, &mut ctx).unwrap();
        assert_eq!(
            unit.imports(&ctx.catalog).unwrap(),
            vec![UseStatement::new("physics_types", "physics_state")]
        );
    }
}
