// Fortran source module generation (`<scope>.F90`)

use crate::alloc_routine::{AllocStep, AllocateRoutine, INIT_FLAG, REALLOC_FLAG};
use crate::context::CompileContext;
use crate::ddt::AggregateType;
use crate::errors::RegistryResult;
use crate::ic_names::NameTables;
use crate::scope_unit::ScopeUnit;
use crate::variable::{AllocationMode, RegistryVar, Variable};
use regc_formatter::rules::{sort_imports, write_imports};
use regc_formatter::{Config, Declaration, DeclarationBlock, Emitter, Initializer, UseStatement};
use std::collections::HashSet;

/// Default access inside generated modules
const MODULE_ACCESS: &str = "private";

/// Readable form of a standard name: `air_temperature` -> `Air temperature`
pub fn convert_to_long_name(standard_name: &str) -> String {
    let mut chars = standard_name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('_', " "),
        None => String::new(),
    }
}

fn write_table_header(out: &mut Emitter, name: &str) {
    out.write(0, &format!("!> \\section arg_table_{}  Argument Table", name));
    out.write(0, &format!("!! \\htmlinclude {}.html", name));
}

/// Padding-free declaration of `var`
fn declaration(var: &Variable) -> Declaration {
    let mut decl = Declaration::new(var.type_string(), var.local_name());
    decl.access = var.access().as_str().to_string();
    decl.allocation = var.allocation().keyword().map(str::to_string);
    decl.protected = var.protected();
    decl.dimensions = var.declared_dimensions().to_string();
    decl.initializer = var.initial_value().and_then(|value| match var.allocation() {
        AllocationMode::Pointer => Some(Initializer::Pointer(value.to_string())),
        AllocationMode::Allocatable => None,
        _ => Some(Initializer::Value(value.to_string())),
    });
    let long_name = var
        .long_name()
        .map(str::to_string)
        .unwrap_or_else(|| convert_to_long_name(var.standard_name()));
    decl.comment = Some(format!("{}: {}", var.local_name(), long_name));
    decl
}

fn write_ddt_definition(
    out: &mut Emitter,
    ddt: &AggregateType,
    config: &Config,
) -> RegistryResult<()> {
    ddt.check_members()?;

    let access = ddt.access().as_str();
    let attributes = if let Some(parent) = ddt.parent() {
        format!(", extends({})", parent)
    } else if ddt.is_bind_c() {
        ", bind(C)".to_string()
    } else if access != MODULE_ACCESS {
        format!(", {}", access)
    } else {
        String::new()
    };

    write_table_header(out, ddt.name());
    out.write(1, &format!("type{} :: {}", attributes, ddt.name()));
    let mut block = DeclarationBlock::new(access, false);
    for member in ddt.members() {
        block.push(declaration(member));
    }
    block.write(out, 2);
    out.write(1, &format!("end type {}", ddt.name()));
    if config.separate_blocks {
        out.blank();
    }
    Ok(())
}

fn write_name_tables(out: &mut Emitter, tables: &NameTables) {
    out.write(1, "! Number of variables which can be read from the initial conditions (IC) file:");
    out.write(1, &format!("integer, public, parameter :: ic_var_num = {}", tables.len()));
    out.blank();
    out.write(1, "! Max length of registered variable standard names:");
    out.write(
        1,
        &format!("integer, public, parameter :: std_name_len = {}", tables.std_name_len),
    );
    out.blank();
    out.write(1, "! Max length of IC file variable names:");
    out.write(
        1,
        &format!("integer, public, parameter :: ic_name_len = {}", tables.ic_name_len),
    );
    out.blank();

    out.write(
        1,
        &format!(
            "character(len={}), public :: input_var_stdnames(ic_var_num) = (/ &",
            tables.std_name_len
        ),
    );
    write_continued(out, &tables.standard_name_cells(), " /)");
    out.blank();

    out.write(
        1,
        &format!(
            "character(len={}), public :: input_var_names({}, ic_var_num) = reshape((/ &",
            tables.ic_name_len, tables.max_aliases
        ),
    );
    let last = format!(" /), (/{}, ic_var_num/))", tables.max_aliases);
    write_continued(out, &tables.alias_rows(), &last);
    out.blank();
}

/// Emit continuation rows of an array constructor
fn write_continued(out: &mut Emitter, rows: &[String], last_suffix: &str) {
    for (index, row) in rows.iter().enumerate() {
        let suffix = if index + 1 == rows.len() { last_suffix } else { ", &" };
        out.write(2, &format!("{}{}", row, suffix));
    }
}

fn write_alloc_step(out: &mut Emitter, step: &AllocStep) {
    match step {
        AllocStep::Allocate {
            target,
            status_check,
            nullify,
            extents,
        } => {
            out.write(2, &format!("if ({}({})) then", status_check, target));
            out.write(3, &format!("if ({}) then", REALLOC_FLAG));
            out.write(4, &format!("deallocate({})", target));
            if *nullify {
                out.write(4, &format!("nullify({})", target));
            }
            out.write(3, "else");
            out.write(
                4,
                &format!(
                    "call endrun(subname//\": {} is already {}, cannot allocate\")",
                    target, status_check
                ),
            );
            out.write(3, "end if");
            out.write(2, "end if");
            out.write(2, &format!("allocate({}{})", target, extents));
        }
        AllocStep::Initialize { target, value } => {
            out.write(2, &format!("if ({}) then", INIT_FLAG));
            out.write(3, &format!("{} = {}", target, value));
            out.write(2, "end if");
        }
    }
}

fn write_optional_flag(out: &mut Emitter, flag: &str, default: &str) {
    out.write(2, &format!("if (present({}_in)) then", flag));
    out.write(3, &format!("{} = {}_in", flag, flag));
    out.write(2, "else");
    out.write(3, &format!("{} = {}", flag, default));
    out.write(2, "end if");
}

/// Render the allocation routine
pub fn write_allocate_routine(out: &mut Emitter, routine: &AllocateRoutine) {
    out.write(
        1,
        &format!("subroutine {}({})", routine.name, routine.arguments().join(", ")),
    );
    out.write(2, "use shr_infnan_mod,   only: nan => shr_infnan_nan, assignment(=)");
    out.write(2, "use cam_abortutils,   only: endrun");

    out.write(2, "!! Dummy arguments");
    for dim in &routine.dimensions {
        out.write(2, &format!("integer,           intent(in) :: {}", dim));
    }
    for flag in [INIT_FLAG, REALLOC_FLAG] {
        out.write(2, &format!("logical, optional, intent(in) :: {}_in", flag));
    }
    out.blank();

    out.write(2, "!! Local variables");
    out.write(2, &format!("logical                     :: {}", INIT_FLAG));
    out.write(2, &format!("logical                     :: {}", REALLOC_FLAG));
    out.write(
        2,
        &format!("character(len=*), parameter :: subname = \"{}\"", routine.name),
    );
    out.blank();

    out.write(2, "! Set optional argument values");
    write_optional_flag(out, INIT_FLAG, ".true.");
    write_optional_flag(out, REALLOC_FLAG, ".false.");
    out.blank();

    for step in &routine.steps {
        write_alloc_step(out, step);
    }
    out.write(1, &format!("end subroutine {}", routine.name));
}

fn prepare_imports(mut imports: Vec<UseStatement>, config: &Config) -> Vec<UseStatement> {
    if config.sort_imports {
        sort_imports(&mut imports);
    } else {
        let mut seen = HashSet::new();
        imports.retain(|u| seen.insert((u.module.to_lowercase(), u.symbol.to_lowercase())));
    }
    imports
}

/// Render the source module of `unit`
pub fn write_source(
    unit: &ScopeUnit,
    ctx: &mut CompileContext,
    config: &Config,
) -> RegistryResult<String> {
    let routine = AllocateRoutine::build(unit, &ctx.catalog, &mut ctx.dimension_order)?;
    let catalog = &ctx.catalog;
    let mut out = Emitter::new(config);

    out.write(0, &format!("module {}", unit.name()));
    out.blank();
    let imports = prepare_imports(unit.imports(catalog)?, config);
    write_imports(&mut out, 1, &imports);
    out.blank();
    out.write(0, "implicit none");
    out.write(0, "private");
    out.blank();

    for ddt in unit.aggregates(catalog)? {
        write_ddt_definition(&mut out, ddt, config)?;
    }

    if let Some(tables) = NameTables::build(unit, catalog)? {
        write_name_tables(&mut out, &tables);
    }

    let dictionary = unit.dictionary();
    write_table_header(&mut out, dictionary.name());
    let mut block = DeclarationBlock::new(MODULE_ACCESS, true);
    for var in dictionary.variables() {
        block.push(declaration(var));
    }
    block.write(&mut out, 1);

    out.blank();
    out.write(0, "!! public interfaces");
    out.write(1, &format!("public :: {}", routine.name));
    out.blank();
    out.write(0, "CONTAINS");
    out.blank();
    write_allocate_routine(&mut out, &routine);
    out.blank();
    out.write(0, &format!("end module {}", unit.name()));
    Ok(out.output())
}
