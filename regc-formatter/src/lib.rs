// regc-formatter - layout of generated Fortran source
// Indent-aware line emission plus column alignment of declaration batches

pub mod config;
pub mod declarations;
pub mod emitter;
pub mod rules;

pub use config::Config;
pub use declarations::{Declaration, DeclarationBlock, Initializer};
pub use emitter::Emitter;
pub use rules::UseStatement;
