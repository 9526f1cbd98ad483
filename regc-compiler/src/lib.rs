// regc-compiler - registry schema compiler
// Registry document -> validated variable/type model -> metadata and Fortran source

pub mod alloc_routine;
pub mod array_element;
pub mod codegen;
pub mod context;
pub mod ddt;
pub mod dictionary;
pub mod dimensions;
pub mod driver;
pub mod errors;
pub mod ic_names;
pub mod metadata;
pub mod scope_unit;
pub mod type_catalog;
pub mod variable;

pub use alloc_routine::{AllocStep, AllocateRoutine};
pub use array_element::ArrayElement;
pub use context::{CompileContext, DimensionOrder, RegistryConfig};
pub use ddt::AggregateType;
pub use dictionary::ScopeDictionary;
pub use driver::{gen_registry, write_registry_files, CompilationDriver, GenOptions, GeneratedFile};
pub use errors::{RegistryError, RegistryResult};
pub use ic_names::NameTables;
pub use scope_unit::ScopeUnit;
pub use type_catalog::{TypeCatalog, TypeEntry, TypeRef};
pub use variable::{Access, AllocationMode, RegistryVar, Variable};
