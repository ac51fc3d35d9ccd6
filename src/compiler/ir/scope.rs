//! Lexical scope tracking for locals

use super::instruction::IrReg;
use serde::{Deserialize, Serialize};

/// A named local bound to its virtual register
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Local {
    /// Source name
    pub name: String,
    /// Register holding the variable
    pub reg: IrReg,
}

/// Stack of locals with markers delimiting nested scopes
///
/// Each marker counts the locals declared since its `begin_scope`, so
/// `end_scope` pops exactly those and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeStack {
    locals: Vec<Local>,
    markers: Vec<usize>,
}

impl ScopeStack {
    /// Create an empty scope stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a nested scope
    pub fn begin_scope(&mut self) {
        self.markers.push(0);
    }

    /// Close the innermost scope, dropping its locals
    ///
    /// Returns how many locals went out of scope.
    pub fn end_scope(&mut self) -> usize {
        let count = self.markers.pop().unwrap_or(0);
        let keep = self.locals.len().saturating_sub(count);
        self.locals.truncate(keep);
        count
    }

    /// Bind `name` to `reg` in the innermost scope
    pub fn declare(&mut self, name: impl Into<String>, reg: IrReg) {
        self.locals.push(Local {
            name: name.into(),
            reg,
        });
        if let Some(count) = self.markers.last_mut() {
            *count += 1;
        }
    }

    /// Resolve a name, most recent declaration first
    pub fn lookup(&self, name: &str) -> Option<IrReg> {
        self.locals
            .iter()
            .rev()
            .find(|local| local.name == name)
            .map(|local| local.reg)
    }

    /// True when `name` is already declared in the innermost scope
    pub fn declared_in_current_scope(&self, name: &str) -> bool {
        let count = self.markers.last().copied().unwrap_or(self.locals.len());
        self.locals
            .iter()
            .rev()
            .take(count)
            .any(|local| local.name == name)
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.markers.len()
    }

    /// Locals currently visible, outermost first
    pub fn locals(&self) -> &[Local] {
        &self.locals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_and_restore() {
        let mut scopes = ScopeStack::new();
        scopes.begin_scope();
        scopes.declare("x", IrReg(0));

        scopes.begin_scope();
        scopes.declare("x", IrReg(2));
        scopes.declare("y", IrReg(3));
        assert_eq!(scopes.lookup("x"), Some(IrReg(2)));
        assert_eq!(scopes.depth(), 2);

        assert_eq!(scopes.end_scope(), 2);
        assert_eq!(scopes.lookup("x"), Some(IrReg(0)));
        assert_eq!(scopes.lookup("y"), None);

        scopes.end_scope();
        assert!(scopes.locals().is_empty());
    }

    #[test]
    fn test_declared_in_current_scope() {
        let mut scopes = ScopeStack::new();
        scopes.begin_scope();
        scopes.declare("x", IrReg(0));
        scopes.begin_scope();
        assert!(!scopes.declared_in_current_scope("x"));
        scopes.declare("x", IrReg(1));
        assert!(scopes.declared_in_current_scope("x"));
    }

    #[test]
    fn test_end_scope_without_begin() {
        let mut scopes = ScopeStack::new();
        scopes.declare("x", IrReg(0));
        assert_eq!(scopes.end_scope(), 0);
        assert_eq!(scopes.lookup("x"), Some(IrReg(0)));
    }
}
