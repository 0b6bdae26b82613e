//! The symbol table: scopes arranged in a tree, addressed by arena index.
//!
//! Scopes link to their parent and (for instance scopes) their owning
//! component scope, but never by pointer: every scope lives in a single
//! arena (`SymbolTable::scopes`) and refers to others by [`ScopeId`], which
//! is `Copy` and carries no lifetime.

use crate::types::Type;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolCategory {
    Variable,
    Parameter,
    Struct,
    Field,
    Component,
    Property,
    Method,
    InstanceId,
    Enum,
    EnumConstant,
    /// A built-in function: `len`, `print`, or one of the draw calls.
    Function,
    BuiltInType,
}

impl SymbolCategory {
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolCategory::Variable => "variable",
            SymbolCategory::Parameter => "parameter",
            SymbolCategory::Struct => "struct",
            SymbolCategory::Field => "field",
            SymbolCategory::Component => "component",
            SymbolCategory::Property => "property",
            SymbolCategory::Method => "method",
            SymbolCategory::InstanceId => "instance",
            SymbolCategory::Enum => "enum",
            SymbolCategory::EnumConstant => "enum constant",
            SymbolCategory::Function => "function",
            SymbolCategory::BuiltInType => "type",
        }
    }
}

/// A named entity visible in some scope.
///
/// The original splits `MethodSymbol` and `FunctionSymbol` into subclasses
/// of a `Symbol` base; here both collapse into `owner`/`param_types`, which
/// are simply unused (`None`/empty) for symbol categories that don't need
/// them.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub category: SymbolCategory,
    pub ty: Option<Type>,
    /// For `Method`: the component it belongs to. Unused otherwise.
    pub owner: Option<String>,
    /// For `Method`/`Function`: parameter types, in declaration order.
    pub param_types: Vec<Type>,
    /// Declaration-order index: local slot, field index, or instance index
    /// depending on category.
    pub index: Option<u32>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, category: SymbolCategory) -> Self {
        Self {
            name: name.into(),
            category,
            ty: None,
            owner: None,
            param_types: Vec::new(),
            index: None,
        }
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_params(mut self, params: Vec<Type>) -> Self {
        self.param_types = params;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeCategory {
    Global,
    Struct,
    Component,
    Instance,
    Method,
    Local,
}

/// An index into a [`SymbolTable`]'s scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScopeId(pub usize);

#[derive(Debug)]
pub struct Scope {
    pub category: ScopeCategory,
    pub parent: Option<ScopeId>,
    /// Fallback lookup channel, set only on instance scopes: once parent
    /// scopes are exhausted, resolution continues here so a binding
    /// expression can name the component's own properties and methods.
    /// Must never point at another instance scope, which would let two
    /// instance scopes form a resolution cycle.
    pub component_scope: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

impl Scope {
    fn new(category: ScopeCategory, parent: Option<ScopeId>) -> Self {
        Self {
            category,
            parent,
            component_scope: None,
            symbols: HashMap::new(),
        }
    }
}

/// Arena of scopes forming the symbol table for one compile unit.
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn create_scope(&mut self, category: ScopeCategory, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(category, parent));
        id
    }

    pub fn set_component_scope(&mut self, instance_scope: ScopeId, component_scope: ScopeId) {
        self.scopes[instance_scope.0].component_scope = Some(component_scope);
    }

    pub fn category(&self, scope: ScopeId) -> ScopeCategory {
        self.scopes[scope.0].category
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0].parent
    }

    /// Defines `symbol` in `scope`'s own table. Does not check parents:
    /// shadowing an outer symbol is legal, redefining one in the same scope
    /// is the caller's responsibility to reject.
    pub fn define(&mut self, scope: ScopeId, symbol: Symbol) {
        self.scopes[scope.0].symbols.insert(symbol.name.clone(), symbol);
    }

    /// True if `name` is already defined directly in `scope` (not a parent).
    pub fn defined_locally(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope.0].symbols.contains_key(name)
    }

    /// Walks `scope`'s parent chain, then falls back to the component-scope
    /// side link (present only on instance scopes) once parents run out.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        if let Some(sym) = self.resolve_parent_chain(scope, name) {
            return Some(sym);
        }
        let side = self.scopes[scope.0].component_scope?;
        self.resolve_parent_chain(side, name)
    }

    fn resolve_parent_chain(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0];
            if let Some(sym) = s.symbols.get(name) {
                return Some(sym);
            }
            current = s.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_walks_parent_chain() {
        let mut table = SymbolTable::new();
        let global = table.create_scope(ScopeCategory::Global, None);
        let child = table.create_scope(ScopeCategory::Local, Some(global));
        table.define(global, Symbol::new("x", SymbolCategory::Variable).with_type(Type::Int));
        assert!(table.resolve(child, "x").is_some());
        assert!(table.resolve(child, "y").is_none());
    }

    #[test]
    fn local_definition_shadows_parent() {
        let mut table = SymbolTable::new();
        let global = table.create_scope(ScopeCategory::Global, None);
        let child = table.create_scope(ScopeCategory::Local, Some(global));
        table.define(global, Symbol::new("x", SymbolCategory::Variable).with_type(Type::Int));
        table.define(child, Symbol::new("x", SymbolCategory::Variable).with_type(Type::Float));
        assert_eq!(table.resolve(child, "x").unwrap().ty, Some(Type::Float));
    }

    #[test]
    fn component_scope_side_link_is_fallback_only() {
        let mut table = SymbolTable::new();
        let global = table.create_scope(ScopeCategory::Global, None);
        let component = table.create_scope(ScopeCategory::Component, Some(global));
        table.define(
            component,
            Symbol::new("width", SymbolCategory::Property).with_type(Type::Int),
        );
        let instance = table.create_scope(ScopeCategory::Instance, Some(global));
        table.set_component_scope(instance, component);
        assert!(table.resolve(instance, "width").is_some());
        table.define(
            instance,
            Symbol::new("width", SymbolCategory::Property).with_type(Type::Float),
        );
        assert_eq!(table.resolve(instance, "width").unwrap().ty, Some(Type::Float));
    }

    #[test]
    fn defined_locally_ignores_parent() {
        let mut table = SymbolTable::new();
        let global = table.create_scope(ScopeCategory::Global, None);
        let child = table.create_scope(ScopeCategory::Local, Some(global));
        table.define(global, Symbol::new("x", SymbolCategory::Variable));
        assert!(!table.defined_locally(child, "x"));
        assert!(table.defined_locally(global, "x"));
    }
}
