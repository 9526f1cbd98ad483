// Registry variables
//
// `VarBase` holds what variables and array elements share; `RegistryVar`
// exposes it to code that handles either.

use crate::array_element::ArrayElement;
use crate::dictionary::ScopeDictionary;
use crate::dimensions::{check_token, components, constant_dimension, dimension_string, parse_dimensions};
use crate::errors::{RegistryError, RegistryResult};
use crate::type_catalog::{TypeCatalog, TypeRef};
use regc_document::Node;
use std::fmt;

/// Default initializer of pointer variables
pub const NULL_POINTER: &str = "NULL()";

/// Attributes accepted on `variable` and `array` elements
pub const VARIABLE_ATTRIBUTES: &[&str] = &[
    "access",
    "allocatable",
    "dycore",
    "extends",
    "kind",
    "local_name",
    "name",
    "standard_name",
    "type",
    "units",
    "version",
];

/// Storage class of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationMode {
    #[default]
    None,
    Target,
    Parameter,
    Allocatable,
    Pointer,
}

impl AllocationMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" | "" => Some(AllocationMode::None),
            "target" => Some(AllocationMode::Target),
            "parameter" => Some(AllocationMode::Parameter),
            "allocatable" => Some(AllocationMode::Allocatable),
            "pointer" => Some(AllocationMode::Pointer),
            _ => None,
        }
    }

    /// Declaration attribute, `None` for plain variables
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            AllocationMode::None => None,
            AllocationMode::Target => Some("target"),
            AllocationMode::Parameter => Some("parameter"),
            AllocationMode::Allocatable => Some("allocatable"),
            AllocationMode::Pointer => Some("pointer"),
        }
    }

    /// Shape is known at declaration time
    pub fn has_fixed_shape(&self) -> bool {
        matches!(
            self,
            AllocationMode::None | AllocationMode::Parameter | AllocationMode::Target
        )
    }

    /// Intrinsic that tests whether storage already exists
    pub fn status_check(&self) -> Option<&'static str> {
        match self {
            AllocationMode::Pointer => Some("associated"),
            AllocationMode::Allocatable => Some("allocated"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defaults a variable inherits when its element does not say otherwise
#[derive(Debug, Clone, Default)]
pub struct VarDefaults {
    pub type_name: Option<String>,
    pub units: String,
    pub kind: String,
    pub allocation: AllocationMode,
}

/// Data common to variables and array elements
#[derive(Debug, Clone)]
pub struct VarBase {
    pub local_name: String,
    pub standard_name: String,
    pub type_ref: TypeRef,
    pub kind: String,
    pub units: String,
    pub dimensions: Vec<String>,
    pub allocation: AllocationMode,
    pub long_name: Option<String>,
    pub initial_value: Option<String>,
    pub ic_names: Option<Vec<String>>,
}

impl VarBase {
    /// Read the shared properties of `node`.
    /// Unrecognized children are left to the caller.
    pub fn from_node(
        node: &Node,
        local_name: String,
        dimensions: Vec<String>,
        defaults: VarDefaults,
        catalog: &TypeCatalog,
        scope: &str,
    ) -> RegistryResult<Self> {
        let type_name = node
            .get("type")
            .map(str::to_string)
            .or(defaults.type_name)
            .unwrap_or_default();
        let entry = catalog
            .lookup(&type_name)
            .ok_or_else(|| RegistryError::UnknownType {
                type_name: type_name.clone(),
                variable: local_name.clone(),
                scope: scope.to_string(),
                did_you_mean: catalog.suggest(&type_name),
            })?;
        let type_ref = entry.type_ref();

        let kind = node.get("kind").map(str::to_string).unwrap_or(defaults.kind);
        if type_ref.is_aggregate && !kind.is_empty() {
            return Err(RegistryError::IllegalKind {
                type_name: type_ref.name,
                variable: local_name,
                scope: scope.to_string(),
            });
        }

        let allocation = match node.get("allocatable") {
            Some(value) => parse_allocation(value, &local_name, scope)?,
            None => defaults.allocation,
        };

        let mut base = VarBase {
            standard_name: node.get("standard_name").unwrap_or_default().to_string(),
            units: node.get("units").map(str::to_string).unwrap_or(defaults.units),
            local_name,
            type_ref,
            kind,
            dimensions,
            allocation,
            long_name: None,
            initial_value: None,
            ic_names: None,
        };

        for child in &node.children {
            match child.tag.as_str() {
                "long_name" => base.long_name = non_empty(child.text()),
                "initial_value" => base.initial_value = non_empty(child.text()),
                "ic_file_input_names" => {
                    let names: Vec<String> =
                        child.text().split_whitespace().map(str::to_string).collect();
                    base.ic_names = (!names.is_empty()).then_some(names);
                }
                _ => {}
            }
        }

        if base.initial_value.is_none() && base.allocation == AllocationMode::Pointer {
            base.initial_value = Some(NULL_POINTER.to_string());
        }
        Ok(base)
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_allocation(value: &str, element: &str, scope: &str) -> RegistryResult<AllocationMode> {
    AllocationMode::parse(value).ok_or_else(|| RegistryError::InvalidAttributeValue {
        attribute: "allocatable".to_string(),
        value: value.to_string(),
        element: element.to_string(),
        scope: scope.to_string(),
    })
}

/// Behavior shared by variables and array elements
pub trait RegistryVar {
    fn base(&self) -> &VarBase;

    /// Name used on the left side of generated assignments
    fn target_expression(&self) -> String;

    fn local_name(&self) -> &str {
        &self.base().local_name
    }

    fn standard_name(&self) -> &str {
        &self.base().standard_name
    }

    fn units(&self) -> &str {
        &self.base().units
    }

    fn kind(&self) -> &str {
        &self.base().kind
    }

    fn type_ref(&self) -> &TypeRef {
        &self.base().type_ref
    }

    fn dimensions(&self) -> &[String] {
        &self.base().dimensions
    }

    fn allocation(&self) -> AllocationMode {
        self.base().allocation
    }

    fn long_name(&self) -> Option<&str> {
        self.base().long_name.as_deref()
    }

    fn initial_value(&self) -> Option<&str> {
        self.base().initial_value.as_deref()
    }

    fn ic_names(&self) -> Option<&[String]> {
        self.base().ic_names.as_deref()
    }

    /// `(a, b)` over the metadata dimension tokens
    fn dimension_string(&self) -> String {
        dimension_string(self.dimensions())
    }

    fn is_ddt(&self) -> bool {
        self.base().type_ref.is_aggregate
    }

    /// Module defining this variable's type, `None` for intrinsics
    fn module(&self) -> Option<&str> {
        self.base().type_ref.module.as_deref()
    }

    /// Initial value set explicitly in the registry
    fn declares_initial_value(&self) -> bool {
        match self.initial_value() {
            Some(value) => !(self.allocation() == AllocationMode::Pointer && value == NULL_POINTER),
            None => false,
        }
    }

    /// Value assigned when the allocation routine initializes this variable
    fn runtime_initial_value(&self) -> Option<String> {
        if self.declares_initial_value() {
            return self.initial_value().map(str::to_string);
        }
        match self.type_ref().name.to_lowercase().as_str() {
            "real" => Some("nan".to_string()),
            "integer" => Some("HUGE(1)".to_string()),
            "character" => Some("\"\"".to_string()),
            _ => None,
        }
    }
}

/// A registry variable declared at scope level
#[derive(Debug, Clone)]
pub struct Variable {
    base: VarBase,
    access: Access,
    protected: bool,
    declared_dimensions: String,
    elements: Vec<ArrayElement>,
}

impl RegistryVar for Variable {
    fn base(&self) -> &VarBase {
        &self.base
    }

    fn target_expression(&self) -> String {
        self.base.local_name.clone()
    }
}

impl Variable {
    /// Build a variable from a `variable` or `array` element.
    /// Dimensions of fixed-shape variables resolve against `dictionary`.
    pub fn from_node(
        node: &Node,
        catalog: &TypeCatalog,
        dictionary: &ScopeDictionary,
    ) -> RegistryResult<Self> {
        let scope = dictionary.name();
        let local_name = node.get("local_name").unwrap_or_default().to_string();

        if let Some(attribute) = node
            .attribute_names()
            .find(|a| !VARIABLE_ATTRIBUTES.contains(a))
        {
            return Err(RegistryError::UnknownAttribute {
                attribute: attribute.to_string(),
                element: local_name,
                scope: scope.to_string(),
            });
        }

        let (access, protected) = match node.get_or("access", "public") {
            "public" => (Access::Public, false),
            "private" => (Access::Private, false),
            "protected" => (Access::Public, true),
            other => {
                return Err(RegistryError::InvalidAttributeValue {
                    attribute: "access".to_string(),
                    value: other.to_string(),
                    element: local_name,
                    scope: scope.to_string(),
                })
            }
        };
        let allocation = parse_allocation(node.get_or("allocatable", "none"), &local_name, scope)?;

        let mut dimensions = Vec::new();
        let mut declared_dimensions = String::new();
        for child in &node.children {
            match VarChild::classify(&child.tag) {
                Some(VarChild::Dimensions) => {
                    dimensions = parse_dimensions(child.text());
                    let declared = dimensions
                        .iter()
                        .map(|token| {
                            declared_extent(token, allocation, &local_name, dictionary)
                        })
                        .collect::<RegistryResult<Vec<_>>>()?;
                    if !declared.is_empty() {
                        declared_dimensions = dimension_string(&declared);
                    }
                }
                Some(_) => {}
                None => {
                    return Err(RegistryError::UnknownContent {
                        tag: child.tag.clone(),
                        element: local_name,
                        scope: scope.to_string(),
                    })
                }
            }
        }

        let defaults = VarDefaults {
            allocation,
            ..VarDefaults::default()
        };
        let base = VarBase::from_node(node, local_name, dimensions, defaults, catalog, scope)?;

        // Elements need the parent's resolved type and dimensions
        let elements = node
            .children
            .iter()
            .filter(|child| VarChild::classify(&child.tag) == Some(VarChild::Element))
            .map(|child| ArrayElement::from_node(child, &base, catalog, dictionary))
            .collect::<RegistryResult<Vec<_>>>()?;

        if base.allocation == AllocationMode::Parameter && base.initial_value.is_none() {
            return Err(RegistryError::MissingInitialValue {
                variable: base.local_name,
                scope: scope.to_string(),
            });
        }

        log::debug!(
            "Found registry Variable, {} ({})",
            base.local_name,
            base.standard_name
        );
        Ok(Self {
            base,
            access,
            protected,
            declared_dimensions,
            elements,
        })
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Declared as `access="protected"`
    pub fn protected(&self) -> bool {
        self.protected
    }

    /// Shape used in the declaration: resolved local names for fixed-shape
    /// variables, `:` per dimension otherwise; empty for scalars
    pub fn declared_dimensions(&self) -> &str {
        &self.declared_dimensions
    }

    pub fn elements(&self) -> &[ArrayElement] {
        &self.elements
    }

    /// Full type spec for declarations
    pub fn type_string(&self) -> String {
        let type_ref = &self.base.type_ref;
        if type_ref.module.is_some() {
            format!("type({})", type_ref.name)
        } else if !self.base.kind.is_empty() {
            format!("{}({})", type_ref.name, self.base.kind)
        } else {
            type_ref.name.clone()
        }
    }
}

/// Child elements a variable may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarChild {
    Dimensions,
    LongName,
    InitialValue,
    Element,
    IcFileInputNames,
}

impl VarChild {
    fn classify(tag: &str) -> Option<Self> {
        match tag {
            "dimensions" => Some(VarChild::Dimensions),
            "long_name" => Some(VarChild::LongName),
            "initial_value" => Some(VarChild::InitialValue),
            "element" => Some(VarChild::Element),
            "ic_file_input_names" => Some(VarChild::IcFileInputNames),
            _ => None,
        }
    }
}

/// Declaration extent of one dimension token
fn declared_extent(
    token: &str,
    allocation: AllocationMode,
    variable: &str,
    dictionary: &ScopeDictionary,
) -> RegistryResult<String> {
    check_token(token, variable, dictionary.name())?;
    if !allocation.has_fixed_shape() {
        return Ok(":".to_string());
    }

    let resolved = components(token)
        .into_iter()
        .map(|component| {
            if let Some(value) = constant_dimension(component) {
                return Ok(value.to_string());
            }
            dictionary
                .find_by_standard_name(component)
                .map(|var| var.local_name().to_string())
                .ok_or_else(|| RegistryError::UnresolvedDimension {
                    dimension: component.to_string(),
                    variable: variable.to_string(),
                    scope: dictionary.name().to_string(),
                })
        })
        .collect::<RegistryResult<Vec<_>>>()?;
    Ok(resolved.join(":"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddt::AggregateType;

    fn dictionary_with_ncol() -> (TypeCatalog, ScopeDictionary) {
        let catalog = TypeCatalog::new();
        let mut dict = ScopeDictionary::new("physics_types", "module");
        let ncol = Node::new("variable")
            .with_attr("local_name", "ncol")
            .with_attr("standard_name", "horizontal_dimension")
            .with_attr("type", "integer");
        dict.add(Variable::from_node(&ncol, &catalog, &dict).unwrap())
            .unwrap();
        (catalog, dict)
    }

    fn wind(dims: &str) -> Node {
        Node::new("variable")
            .with_attr("local_name", "u")
            .with_attr("standard_name", "east_wind")
            .with_attr("type", "real")
            .with_attr("kind", "kind_phys")
            .with_attr("units", "m s-1")
            .with_child(Node::new("dimensions").with_text(dims))
    }

    #[test]
    fn test_step_in_dimension() {
        let (catalog, dict) = dictionary_with_ncol();
        let err = Variable::from_node(&wind("A:B:C"), &catalog, &dict).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::IllegalDimensionStep { ref dimension, ref variable, .. }
                if dimension == "A:B:C" && variable == "u"
        ));
    }

    #[test]
    fn test_fixed_shape_resolves_local_names() {
        let (catalog, dict) = dictionary_with_ncol();
        let var = Variable::from_node(
            &wind("ccpp_constant_one:horizontal_dimension"),
            &catalog,
            &dict,
        )
        .unwrap();
        assert_eq!(var.declared_dimensions(), "(1:ncol)");
        assert_eq!(var.type_string(), "real(kind_phys)");
        assert_eq!(var.dimension_string(), "(ccpp_constant_one:horizontal_dimension)");
    }

    #[test]
    fn test_unresolved_dimension() {
        let (catalog, dict) = dictionary_with_ncol();
        let node = wind("horizontal_dimension vertical_dimension").with_attr("allocatable", "target");
        let err = Variable::from_node(&node, &catalog, &dict).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnresolvedDimension { ref dimension, .. } if dimension == "vertical_dimension"
        ));
    }

    #[test]
    fn test_deferred_shape() {
        let (catalog, dict) = dictionary_with_ncol();
        let node = wind("horizontal_dimension vertical_dimension").with_attr("allocatable", "allocatable");
        let var = Variable::from_node(&node, &catalog, &dict).unwrap();
        assert_eq!(var.declared_dimensions(), "(:, :)");
        assert_eq!(var.runtime_initial_value().as_deref(), Some("nan"));
    }

    #[test]
    fn test_unknown_attribute() {
        let (catalog, dict) = dictionary_with_ncol();
        let node = wind("horizontal_dimension").with_attr("kkind", "kind_phys");
        let err = Variable::from_node(&node, &catalog, &dict).unwrap_err();
        assert_eq!(err.to_string(), "Bad variable attribute, 'kkind', for 'u'");
    }

    #[test]
    fn test_unknown_content() {
        let (catalog, dict) = dictionary_with_ncol();
        let node = wind("horizontal_dimension").with_child(Node::new("dims"));
        let err = Variable::from_node(&node, &catalog, &dict).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownContent { ref tag, .. } if tag == "dims"));
    }

    #[test]
    fn test_unknown_type_suggests() {
        let (catalog, dict) = dictionary_with_ncol();
        let node = Node::new("variable")
            .with_attr("local_name", "n")
            .with_attr("standard_name", "n")
            .with_attr("type", "integr");
        let err = Variable::from_node(&node, &catalog, &dict).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnknownType { ref did_you_mean, .. } if did_you_mean.as_deref() == Some("integer")
        ));
    }

    #[test]
    fn test_kind_illegal_on_ddt() {
        let (mut catalog, mut dict) = dictionary_with_ncol();
        let ps = Node::new("variable")
            .with_attr("local_name", "ps")
            .with_attr("standard_name", "surface_air_pressure")
            .with_attr("type", "real");
        dict.add(Variable::from_node(&ps, &catalog, &dict).unwrap())
            .unwrap();
        let ddt_node = Node::new("ddt")
            .with_attr("type", "physics_state")
            .with_child(Node::new("data").with_text("surface_air_pressure"));
        let ddt = AggregateType::from_node(&ddt_node, &catalog, &mut dict, "se").unwrap();
        catalog
            .register("physics_state", "physics_types", Some(ddt))
            .unwrap();

        let node = Node::new("variable")
            .with_attr("local_name", "phys_state")
            .with_attr("standard_name", "physics_state_instance")
            .with_attr("type", "physics_state")
            .with_attr("kind", "kind_phys");
        let err = Variable::from_node(&node, &catalog, &dict).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::IllegalKind { ref type_name, ref variable, .. }
                if type_name == "physics_state" && variable == "phys_state"
        ));
        assert_eq!(
            err.to_string(),
            "kind attribute illegal for DDT type physics_state ('phys_state')"
        );
    }

    #[test]
    fn test_parameter_requires_initial_value() {
        let (catalog, dict) = dictionary_with_ncol();
        let node = Node::new("variable")
            .with_attr("local_name", "pcnst")
            .with_attr("standard_name", "number_of_constituents")
            .with_attr("type", "integer")
            .with_attr("allocatable", "parameter");
        let err = Variable::from_node(&node, &catalog, &dict).unwrap_err();
        assert!(matches!(err, RegistryError::MissingInitialValue { .. }));

        let node = node.with_child(Node::new("initial_value").with_text("3"));
        let var = Variable::from_node(&node, &catalog, &dict).unwrap();
        assert_eq!(var.initial_value(), Some("3"));
    }

    #[test]
    fn test_protected_access() {
        let (catalog, dict) = dictionary_with_ncol();
        let node = wind("horizontal_dimension").with_attr("access", "protected");
        let var = Variable::from_node(&node, &catalog, &dict).unwrap();
        assert_eq!(var.access(), Access::Public);
        assert!(var.protected());

        let node = wind("horizontal_dimension").with_attr("access", "secret");
        let err = Variable::from_node(&node, &catalog, &dict).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAttributeValue { .. }));
    }

    #[test]
    fn test_pointer_defaults_to_null() {
        let (catalog, dict) = dictionary_with_ncol();
        let node = Node::new("variable")
            .with_attr("local_name", "flag")
            .with_attr("standard_name", "some_flag")
            .with_attr("type", "logical")
            .with_attr("allocatable", "pointer");
        let var = Variable::from_node(&node, &catalog, &dict).unwrap();
        assert_eq!(var.initial_value(), Some(NULL_POINTER));
        assert!(!var.declares_initial_value());
        assert_eq!(var.runtime_initial_value(), None);
    }

    #[test]
    fn test_ic_names_and_long_name() {
        let (catalog, dict) = dictionary_with_ncol();
        let node = wind("horizontal_dimension")
            .with_child(Node::new("long_name").with_text("Zonal wind"))
            .with_child(Node::new("ic_file_input_names").with_text("u  U\n state_u"));
        let var = Variable::from_node(&node, &catalog, &dict).unwrap();
        assert_eq!(var.long_name(), Some("Zonal wind"));
        assert_eq!(
            var.ic_names().unwrap(),
            &["u".to_string(), "U".to_string(), "state_u".to_string()]
        );
    }
}
