// Metadata sidecar (`<scope>.meta`)

use crate::errors::RegistryResult;
use crate::scope_unit::ScopeUnit;
use crate::type_catalog::TypeCatalog;
use crate::variable::{Access, AllocationMode, RegistryVar, Variable};
use regc_formatter::Emitter;

fn write_table_header(out: &mut Emitter, name: &str, kind: &str) {
    out.write(0, "[ccpp-arg-table]");
    out.write(0, &format!("  name = {}", name));
    out.write(0, &format!("  type = {}", kind));
}

fn write_properties(out: &mut Emitter, var: &dyn RegistryVar) {
    out.write(0, &format!("[ {} ]", var.local_name()));
    out.write(0, &format!("  standard_name = {}", var.standard_name()));
    if let Some(long_name) = var.long_name() {
        out.write(0, &format!("  long_name = {}", long_name));
    }
    out.write(0, &format!("  units = {}", var.units()));
    let type_name = &var.type_ref().name;
    if var.is_ddt() {
        out.write(0, &format!("  ddt_type = {}", type_name));
    } else if !var.kind().is_empty() {
        out.write(0, &format!("  type = {} | kind = {}", type_name, var.kind()));
    } else {
        out.write(0, &format!("  type = {}", type_name));
    }
    out.write(0, &format!("  dimensions = {}", var.dimension_string()));
}

/// Metadata of one variable and its elements; private variables are
/// not described
fn write_variable(out: &mut Emitter, var: &Variable) {
    if var.access() == Access::Private {
        return;
    }
    write_properties(out, var);
    if var.allocation() == AllocationMode::Parameter || var.protected() {
        out.write(0, "  protected = True");
    }
    for element in var.elements() {
        write_properties(out, element);
    }
}

/// Render the metadata file of `unit`: one table per DDT, then one for
/// the scope's own variables
pub fn write_metadata(unit: &ScopeUnit, catalog: &TypeCatalog) -> RegistryResult<String> {
    let mut out = Emitter::with_indent(0);
    for ddt in unit.aggregates(catalog)? {
        write_table_header(&mut out, ddt.name(), "ddt");
        for member in ddt.members() {
            write_variable(&mut out, member);
        }
    }

    let dictionary = unit.dictionary();
    write_table_header(&mut out, dictionary.name(), dictionary.kind());
    for var in dictionary.variables() {
        write_variable(&mut out, var);
    }
    Ok(out.output())
}
