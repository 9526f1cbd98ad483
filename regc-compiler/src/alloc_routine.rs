// Allocation routine synthesis
//
// The routine is built as a list of steps over the scope's variables and
// rendered separately by `codegen`.

use crate::context::DimensionOrder;
use crate::dimensions::allocation_extent;
use crate::errors::{RegistryError, RegistryResult};
use crate::scope_unit::ScopeUnit;
use crate::type_catalog::TypeCatalog;
use crate::variable::{AllocationMode, RegistryVar, Variable};

/// Local flag: initialize allocated storage
pub const INIT_FLAG: &str = "set_init_val";
/// Local flag: replace existing storage instead of failing
pub const REALLOC_FLAG: &str = "reallocate";

/// One action of the allocation routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocStep {
    /// Guarded `allocate` of a pointer or allocatable variable
    Allocate {
        target: String,
        /// `associated` or `allocated`
        status_check: &'static str,
        nullify: bool,
        /// Extent list including parentheses, empty for scalars
        extents: String,
    },
    /// Assignment done when the initialize flag is set
    Initialize { target: String, value: String },
}

/// The `allocate_<scope>_fields` routine of one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocateRoutine {
    pub name: String,
    /// Dimension arguments, ranked
    pub dimensions: Vec<String>,
    pub steps: Vec<AllocStep>,
}

/// Name of the allocation routine of `scope`
pub fn routine_name(scope: &str) -> String {
    format!("allocate_{}_fields", scope)
}

impl AllocateRoutine {
    pub fn build(
        unit: &ScopeUnit,
        catalog: &TypeCatalog,
        order: &mut DimensionOrder,
    ) -> RegistryResult<Self> {
        let dimensions = order.sort(unit.dictionary().known_dimensions());
        let mut steps = Vec::new();
        for variable in unit.dictionary().variables() {
            collect_steps(variable, "", catalog, unit.name(), &mut steps)?;
        }
        Ok(Self {
            name: routine_name(unit.name()),
            dimensions,
            steps,
        })
    }

    /// Full argument list: dimensions then the two optional flags
    pub fn arguments(&self) -> Vec<String> {
        let mut args = self.dimensions.clone();
        args.push(format!("{}_in", INIT_FLAG));
        args.push(format!("{}_in", REALLOC_FLAG));
        args
    }
}

fn collect_steps(
    variable: &Variable,
    prefix: &str,
    catalog: &TypeCatalog,
    scope: &str,
    steps: &mut Vec<AllocStep>,
) -> RegistryResult<()> {
    if variable.is_ddt() {
        if !variable.dimensions().is_empty() {
            return Err(RegistryError::InternalUnsupported {
                message: "Arrays of DDT objects not implemented".to_string(),
                element: variable.local_name().to_string(),
                scope: scope.to_string(),
            });
        }
        let type_name = &variable.type_ref().name;
        let ddt = catalog
            .aggregate(type_name)
            .ok_or_else(|| RegistryError::InternalUnsupported {
                message: format!("DDT {} missing from the type catalog", type_name),
                element: variable.local_name().to_string(),
                scope: scope.to_string(),
            })?;
        let member_prefix = format!("{}{}%", prefix, variable.local_name());
        for member in ddt.variable_list(catalog) {
            collect_steps(member, &member_prefix, catalog, scope, steps)?;
        }
        return Ok(());
    }

    let target = format!("{}{}", prefix, variable.local_name());
    if let Some(status_check) = variable.allocation().status_check() {
        let extents = if variable.dimensions().is_empty() {
            String::new()
        } else {
            let parts: Vec<String> = variable
                .dimensions()
                .iter()
                .map(|token| allocation_extent(token))
                .collect();
            format!("({})", parts.join(", "))
        };
        steps.push(AllocStep::Allocate {
            target,
            status_check,
            nullify: variable.allocation() == AllocationMode::Pointer,
            extents,
        });
    }

    if variable.allocation() != AllocationMode::Parameter {
        if let Some(value) = variable.runtime_initial_value() {
            steps.push(AllocStep::Initialize {
                target: format!("{}{}", prefix, variable.target_expression()),
                value,
            });
        }
        for element in variable.elements() {
            if !element.declares_initial_value() {
                continue;
            }
            if let Some(value) = element.runtime_initial_value() {
                steps.push(AllocStep::Initialize {
                    target: format!("{}{}", prefix, element.target_expression()),
                    value,
                });
            }
        }
    }
    Ok(())
}
