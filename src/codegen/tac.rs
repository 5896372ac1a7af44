use std::fmt;

use crate::parser::{Expr, Temp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// One flat three-address instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Assign { target: Expr, value: Expr },
    Label(Label),
    Goto(Label),
    IfTrue(Expr, Label),
    IfFalse(Expr, Label),
}

impl Statement {
    /// The label this statement may transfer control to.
    pub fn jump_target(&self) -> Option<Label> {
        match self {
            Statement::Goto(label) | Statement::IfTrue(_, label) | Statement::IfFalse(_, label) => {
                Some(*label)
            }
            Statement::Assign { .. } | Statement::Label(_) => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assign { target, value } => write!(f, "{} = {}", target, value),
            Statement::Label(label) => write!(f, "{}:", label),
            Statement::Goto(label) => write!(f, "goto {}", label),
            Statement::IfTrue(cond, label) => write!(f, "if {} goto {}", cond, label),
            Statement::IfFalse(cond, label) => write!(f, "iffalse {} goto {}", cond, label),
        }
    }
}

/// Counters for fresh temporaries and labels, shared by a whole compilation
/// run.
#[derive(Debug, Default)]
pub struct NameContext {
    temps: u32,
    labels: u32,
}

impl NameContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_temp(&mut self) -> Temp {
        self.temps += 1;
        Temp(self.temps)
    }

    pub fn new_label(&mut self) -> Label {
        self.labels += 1;
        Label(self.labels)
    }
}
