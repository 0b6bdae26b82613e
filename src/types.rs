//! The static type model.
//!
//! A [`Type`] is a tagged value rather than a class hierarchy: equality is
//! structural, and the only subtyping relation is the `Void` wildcard used
//! by built-in calls (`print`, `len`, the draw functions) to accept any
//! argument type.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A static type.
///
/// `List` and `Custom` carry payloads, so equality must recurse rather than
/// compare discriminants alone — `#[derive(PartialEq)]` does this for free
/// because the payload is part of the enum.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    Int,
    Float,
    String,
    Void,
    List(Box<Type>),
    /// A struct or component name, resolved to a concrete symbol during the
    /// semantic pass. Two `Custom` types are equal iff their names match;
    /// the semantic pass is responsible for ensuring at most one symbol in
    /// scope owns a given name.
    Custom(String),
}

impl Type {
    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }

    /// Whether a value of type `src` may be assigned where `dst` is expected.
    ///
    /// Equal types are always compatible. `Void` is additionally accepted
    /// anywhere, modeling the wildcard parameter type of built-in calls.
    /// List compatibility recurses on the element type, so a `list<void>`
    /// source is compatible with a `list<int>` destination but a
    /// `list<int>` source is not compatible with a `list<float>`
    /// destination.
    pub fn assign_compatible(dst: &Type, src: &Type) -> bool {
        if dst == src {
            return true;
        }
        if *src == Type::Void {
            return true;
        }
        match (dst, src) {
            (Type::List(d), Type::List(s)) => Type::assign_compatible(d, s),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::List(elem) => write!(f, "list<{elem}>"),
            Type::Custom(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_types_are_compatible() {
        assert!(Type::assign_compatible(&Type::Int, &Type::Int));
        assert!(Type::assign_compatible(
            &Type::Custom("Rect".into()),
            &Type::Custom("Rect".into())
        ));
    }

    #[test]
    fn void_is_a_universal_source() {
        assert!(Type::assign_compatible(&Type::Int, &Type::Void));
        assert!(Type::assign_compatible(&Type::list(Type::String), &Type::Void));
    }

    #[test]
    fn mismatched_scalars_are_incompatible() {
        assert!(!Type::assign_compatible(&Type::Int, &Type::Float));
        assert!(!Type::assign_compatible(
            &Type::Custom("Rect".into()),
            &Type::Custom("Circle".into())
        ));
    }

    #[test]
    fn list_compatibility_recurses_on_element_type() {
        assert!(Type::assign_compatible(
            &Type::list(Type::Int),
            &Type::list(Type::Void)
        ));
        assert!(!Type::assign_compatible(
            &Type::list(Type::Int),
            &Type::list(Type::Float)
        ));
    }

    #[test]
    fn display_matches_source_syntax() {
        assert_eq!(Type::list(Type::Int).to_string(), "list<int>");
        assert_eq!(Type::Custom("Rectangle".into()).to_string(), "Rectangle");
    }
}
