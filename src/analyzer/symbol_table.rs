use std::collections::HashMap;

use crate::parser::{Identifier, TypeNode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub ty: TypeNode,
    pub id: Identifier,
}

#[derive(Clone, Debug, PartialEq)]
struct Scope {
    symbols: HashMap<String, Symbol>,
    parent: Option<ScopeId>,
}

/// Every block scope of a program. Scopes are never removed: a block's scope
/// is closed when parsing leaves the block, but later passes re-enter it
/// through `Block::scope`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope {
            symbols: HashMap::new(),
            parent,
        });
        ScopeId(self.scopes.len() - 1)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope.0).and_then(|s| s.parent)
    }

    /// Adds `symbol` to `scope`. Returns false if the name is already
    /// declared in that same scope.
    pub fn declare(&mut self, scope: ScopeId, symbol: Symbol) -> bool {
        let Some(s) = self.scopes.get_mut(scope.0) else {
            return false;
        };
        if s.symbols.contains_key(&symbol.id.name) {
            return false;
        }
        s.symbols.insert(symbol.id.name.clone(), symbol);
        true
    }

    /// True if `name` is declared directly in `scope`, ignoring enclosing ones.
    pub fn declared_in(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes
            .get(scope.0)
            .is_some_and(|s| s.symbols.contains_key(name))
    }

    /// Walks outward from `scope` and returns the first declaration of `name`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scopes.get(id.0)?;
            if let Some(symbol) = s.symbols.get(name) {
                return Some(symbol);
            }
            current = s.parent;
        }
        None
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::BasicType;

    fn symbol(name: &str, basic: BasicType) -> Symbol {
        Symbol {
            ty: TypeNode {
                basic,
                dims: vec![],
            },
            id: Identifier {
                name: name.to_string(),
                line: 1,
            },
        }
    }

    #[test]
    fn lookup_walks_outward_and_stops_at_first_match() {
        let mut table = SymbolTable::new();
        let outer = table.push_scope(None);
        let inner = table.push_scope(Some(outer));

        assert!(table.declare(outer, symbol("x", BasicType::Int)));
        assert!(table.declare(outer, symbol("y", BasicType::Int)));
        assert!(table.declare(inner, symbol("x", BasicType::Float)));

        assert_eq!(table.lookup(inner, "x").unwrap().ty.basic, BasicType::Float);
        assert_eq!(table.lookup(inner, "y").unwrap().ty.basic, BasicType::Int);
        assert_eq!(table.lookup(outer, "x").unwrap().ty.basic, BasicType::Int);
        assert!(table.lookup(outer, "z").is_none());
        assert_eq!(table.parent(inner), Some(outer));
    }

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        let scope = table.push_scope(None);
        assert!(table.declare(scope, symbol("x", BasicType::Int)));
        assert!(table.declared_in(scope, "x"));
        assert!(!table.declare(scope, symbol("x", BasicType::Char)));

        let inner = table.push_scope(Some(scope));
        assert!(!table.declared_in(inner, "x"));
    }
}
