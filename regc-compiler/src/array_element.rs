// Documented elements of registry arrays

use crate::dictionary::ScopeDictionary;
use crate::errors::{RegistryError, RegistryResult};
use crate::type_catalog::TypeCatalog;
use crate::variable::{RegistryVar, VarBase, VarDefaults};
use regc_document::Node;

/// Attributes accepted on `element` children
pub const ELEMENT_ATTRIBUTES: &[&str] = &[
    "index_name",
    "index_pos",
    "standard_name",
    "units",
    "type",
    "kind",
    "allocatable",
];

const ELEMENT_CHILDREN: &[&str] = &["long_name", "initial_value", "ic_file_input_names"];

/// A slice of a parent array at a fixed index along one dimension,
/// e.g. the water vapor entry of a constituents array
#[derive(Debug, Clone)]
pub struct ArrayElement {
    base: VarBase,
    parent_name: String,
    local_index_string: String,
}

impl RegistryVar for ArrayElement {
    fn base(&self) -> &VarBase {
        &self.base
    }

    fn target_expression(&self) -> String {
        format!("{}({})", self.parent_name, self.local_index_string)
    }
}

impl ArrayElement {
    /// Build an element of `parent` from an `element` node
    pub fn from_node(
        node: &Node,
        parent: &VarBase,
        catalog: &TypeCatalog,
        dictionary: &ScopeDictionary,
    ) -> RegistryResult<Self> {
        let scope = dictionary.name();
        let parent_name = parent.local_name.clone();

        if let Some(attribute) = node
            .attribute_names()
            .find(|a| !ELEMENT_ATTRIBUTES.contains(a))
        {
            return Err(RegistryError::UnknownAttribute {
                attribute: attribute.to_string(),
                element: parent_name,
                scope: scope.to_string(),
            });
        }
        if let Some(child) = node
            .children
            .iter()
            .find(|c| !ELEMENT_CHILDREN.contains(&c.tag.as_str()))
        {
            return Err(RegistryError::UnknownContent {
                tag: child.tag.clone(),
                element: parent_name,
                scope: scope.to_string(),
            });
        }

        let index_name = node.get("index_name").unwrap_or_default().to_string();
        let index_var = dictionary.find_by_standard_name(&index_name).ok_or_else(|| {
            RegistryError::UnknownIndex {
                index: index_name.clone(),
                parent: parent_name.clone(),
                scope: scope.to_string(),
            }
        })?;

        let position = node.get("index_pos").unwrap_or_default();
        let mut found = false;
        let mut dimensions = Vec::new();
        let mut index = Vec::new();
        let mut local_index = Vec::new();
        for dim in &parent.dimensions {
            if dim == position {
                found = true;
                index.push(index_name.clone());
                local_index.push(index_var.local_name().to_string());
            } else {
                index.push(":".to_string());
                local_index.push(":".to_string());
                dimensions.push(dim.clone());
            }
        }
        if !found {
            return Err(RegistryError::ElementDimensionNotFound {
                index_pos: position.to_string(),
                parent: parent_name,
                dimensions: parent.dimensions.clone(),
                scope: scope.to_string(),
            });
        }

        let local_name = format!("{}({})", parent_name, index.join(","));
        let defaults = VarDefaults {
            type_name: Some(parent.type_ref.name.clone()),
            units: parent.units.clone(),
            kind: parent.kind.clone(),
            allocation: parent.allocation,
        };
        let base = VarBase::from_node(node, local_name, dimensions, defaults, catalog, scope)?;

        Ok(Self {
            base,
            parent_name,
            local_index_string: local_index.join(","),
        })
    }
}
