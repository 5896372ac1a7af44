use std::fmt;

use crate::lexer::BasicType;

/// Resolved type of an expression: a basic type plus the number of array
/// dimensions still left on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ty {
    pub basic: BasicType,
    pub depth: usize,
}

impl Ty {
    pub const INT: Ty = Ty::scalar(BasicType::Int);
    pub const FLOAT: Ty = Ty::scalar(BasicType::Float);
    pub const CHAR: Ty = Ty::scalar(BasicType::Char);
    pub const BOOL: Ty = Ty::scalar(BasicType::Bool);

    pub const fn scalar(basic: BasicType) -> Self {
        Self { basic, depth: 0 }
    }

    pub fn is_array(&self) -> bool {
        self.depth > 0
    }

    pub fn is_numeric(&self) -> bool {
        !self.is_array() && self.basic.is_numeric()
    }

    pub fn is(&self, basic: BasicType) -> bool {
        !self.is_array() && self.basic == basic
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.basic, "[]".repeat(self.depth))
    }
}
