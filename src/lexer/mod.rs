mod lexer;
mod state;
mod token;

pub use lexer::*;
pub use state::*;
pub use token::*;
