mod symbol_table;
mod ty;
mod type_checker;

pub use symbol_table::*;
pub use ty::*;
pub use type_checker::*;
