//! The abstract syntax tree.
//!
//! Nodes are owned trees: a document arena owns its declarations, which own
//! their statements and expressions. Cross-references that are not
//! ownership edges — a binding's resolved property, an instance's resolved
//! component definition, a method's owning component — are represented as
//! `Option<String>` names or `Option<usize>` indices filled in by the
//! semantic pass rather than pointers, so the tree has a single owner and no
//! cycles.

use crate::types::Type;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A half-open byte range plus 1-based line/column of its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// A span covering both `self` and `other`, for nodes built by folding
    /// together a run of tokens (e.g. a left-associative binary chain).
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
}

/// An expression node.
///
/// `ty` starts `None` and is filled in by the semantic pass; nothing before
/// that pass reads it, so leaving it unpopulated during parsing is not an
/// invariant violation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExprKind {
    IntLit(i32),
    FloatLit(f32),
    StringLit(String),
    /// `{ e1, e2, ... }`, valid only at initializer positions.
    InitList(Vec<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        list: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        base: Box<Expr>,
        name: String,
    },
    /// A bare identifier reference, resolved during the semantic pass.
    Ref(String),
    /// `<lvalue> = <expr>`. The target must resolve to a `Local`, `Field`,
    /// or `ListElement` lvalue category during code generation.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StmtKind {
    Compound(Vec<Stmt>),
    Decl(VarDecl),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    Expr(Expr),
}

/// A local variable declaration, inside a method body or (as `VarDecl`'s
/// initializer-carrying sibling) a struct field / component property.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
    pub init: Option<Expr>,
    /// Filled in by the semantic pass: the local slot this variable occupies
    /// within its enclosing frame.
    pub local_index: Option<u32>,
    pub span: Span,
}

/// A struct or component property field: `<type> <name>;` with no initializer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    pub field_index: Option<u32>,
    pub span: Span,
}

/// A component property: `<type> <name>: <init>;`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyDecl {
    pub name: String,
    pub ty: Type,
    pub init: Expr,
    /// Name of the owning component, set at parse time.
    pub owner: String,
    pub field_index: Option<u32>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParamDecl {
    pub name: String,
    pub ty: Type,
    pub local_index: Option<u32>,
    pub span: Span,
}

/// A method (owned by a component) or free function.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MethodDecl {
    pub name: String,
    pub return_ty: Type,
    pub params: Vec<ParamDecl>,
    pub body: Stmt,
    /// `Some(component name)` for a component method; `None` for a bare function.
    pub owner: Option<String>,
    /// `args + locals`, filled in by the semantic pass.
    pub local_count: Option<u32>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumConstantDecl {
    pub name: String,
    pub value: Option<i32>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumDecl {
    pub name: String,
    pub constants: Vec<EnumConstantDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// A dependency edge `dst <- src` discovered while type-checking a
/// component's property initializer: `dst`'s initializer reads `src`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyEdge {
    pub dst: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentDef {
    pub name: String,
    pub properties: Vec<PropertyDecl>,
    pub methods: Vec<MethodDecl>,
    pub enums: Vec<EnumDecl>,
    /// Property-to-property edges found in this component's own
    /// initializers, promoted to every instance of the component during
    /// phase 3 of the semantic pass.
    pub property_edges: Vec<PropertyEdge>,
    pub span: Span,
}

impl ComponentDef {
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }
}

/// A binding inside a component instance: `<prop>: <expr>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binding {
    pub property: String,
    pub value: Expr,
    pub field_index: Option<u32>,
    pub span: Span,
}

/// A node in the component instance tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentInstance {
    pub component_name: String,
    /// `id: <Identifier>` if present; otherwise synthesized as `#<index>`
    /// once `instance_index` is known.
    pub explicit_id: Option<String>,
    pub bindings: Vec<Binding>,
    pub children: Vec<ComponentInstance>,
    /// Filled in by the semantic pass's pre-order walk.
    pub instance_index: Option<u32>,
    pub instance_tree_size: Option<u32>,
    pub span: Span,
}

impl ComponentInstance {
    /// The instance id used as a dependency-graph and symbol-table key:
    /// the explicit `id:` binding if present, otherwise `#<instanceIndex>`.
    pub fn instance_id(&self) -> String {
        match (&self.explicit_id, self.instance_index) {
            (Some(id), _) => id.clone(),
            (None, Some(idx)) => format!("#{idx}"),
            (None, None) => String::new(),
        }
    }
}

/// One of the three top-level document kinds a compile unit may contain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Document {
    Struct(StructDecl),
    Component(ComponentDef),
    Instance(ComponentInstance),
}

/// A parsed compile unit: every document found in one source file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompileUnit {
    pub documents: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_id_prefers_explicit_over_synthetic() {
        let mut inst = ComponentInstance {
            component_name: "Rect".into(),
            explicit_id: None,
            bindings: vec![],
            children: vec![],
            instance_index: Some(3),
            instance_tree_size: None,
            span: Span::default(),
        };
        assert_eq!(inst.instance_id(), "#3");
        inst.explicit_id = Some("a".into());
        assert_eq!(inst.instance_id(), "a");
    }

    #[test]
    fn span_to_spans_both_endpoints() {
        let a = Span::new(0, 3, 1, 1);
        let b = Span::new(10, 14, 2, 1);
        let joined = a.to(b);
        assert_eq!(joined.start, 0);
        assert_eq!(joined.end, 14);
        assert_eq!(joined.line, 1);
    }
}
