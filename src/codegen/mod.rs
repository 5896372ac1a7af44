mod generator;
mod printer;
mod tac;

pub use generator::*;
pub use printer::*;
pub use tac::*;
