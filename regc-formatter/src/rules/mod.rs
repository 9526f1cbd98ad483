// Layout rules

pub mod alignment;
pub mod imports;
pub mod indentation;

pub use alignment::*;
pub use imports::*;
pub use indentation::*;
