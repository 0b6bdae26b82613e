//! The SVG shape types baked into every compile unit rather than parsed
//! from source.
//!
//! Field order here is the single source of truth shared by the symbol
//! pass (which registers each shape as an ordinary [`ComponentDef`
//! crate::ast::ComponentDef]), the code emitter (which recognizes an
//! instance of one of these names and lowers its `draw` step straight to
//! the matching opcode instead of a method call), and the drawing back end
//! (which reads fields back out by the same indices to build an SVG
//! element).

use crate::ast::ExprKind;
use crate::types::Type;

pub struct ShapeField {
    pub name: &'static str,
    pub ty: Type,
}

pub struct ShapeDef {
    pub name: &'static str,
    pub draw_opcode: &'static str,
    pub fields: Vec<ShapeField>,
}

fn f(name: &'static str, ty: Type) -> ShapeField {
    ShapeField { name, ty }
}

/// The seven shapes named in the shape-fields table: one scene container
/// plus six drawables.
pub fn shapes() -> Vec<ShapeDef> {
    let point = Type::list(Type::Int);
    vec![
        ShapeDef {
            name: "Scene",
            draw_opcode: "defineScene",
            fields: vec![
                f("leftMargin", Type::Int),
                f("topMargin", Type::Int),
                f("rightMargin", Type::Int),
                f("bottomMargin", Type::Int),
                f("width", Type::Int),
                f("height", Type::Int),
            ],
        },
        ShapeDef {
            name: "Rectangle",
            draw_opcode: "drawRect",
            fields: vec![
                f("x", Type::Int),
                f("y", Type::Int),
                f("width", Type::Int),
                f("height", Type::Int),
                f("fill_color", Type::String),
                f("stroke_color", Type::String),
                f("stroke_dasharray", Type::String),
                f("stroke_width", Type::Int),
            ],
        },
        ShapeDef {
            name: "Text",
            draw_opcode: "drawText",
            fields: vec![f("x", Type::Int), f("y", Type::Int), f("size", Type::Int), f("text", Type::String)],
        },
        ShapeDef {
            name: "Ellipse",
            draw_opcode: "drawEllipse",
            fields: vec![
                f("x", Type::Int),
                f("y", Type::Int),
                f("x_radius", Type::Int),
                f("y_radius", Type::Int),
                f("fill_color", Type::String),
                f("stroke_color", Type::String),
                f("stroke_dasharray", Type::String),
                f("stroke_width", Type::Int),
            ],
        },
        ShapeDef {
            name: "Polygon",
            draw_opcode: "drawPolygon",
            fields: vec![
                f("x", Type::Int),
                f("y", Type::Int),
                f("points", Type::list(point.clone())),
                f("fill_color", Type::String),
                f("fill_rule", Type::String),
                f("stroke_color", Type::String),
                f("stroke_dasharray", Type::String),
                f("stroke_width", Type::Int),
            ],
        },
        ShapeDef {
            name: "Line",
            draw_opcode: "drawLine",
            fields: vec![
                f("x", Type::Int),
                f("y", Type::Int),
                f("dx1", Type::Int),
                f("dy1", Type::Int),
                f("dx2", Type::Int),
                f("dy2", Type::Int),
                f("stroke_color", Type::String),
                f("stroke_dasharray", Type::String),
                f("stroke_width", Type::Int),
            ],
        },
        ShapeDef {
            name: "Polyline",
            draw_opcode: "drawPolyline",
            fields: vec![
                f("x", Type::Int),
                f("y", Type::Int),
                f("points", Type::list(point)),
                f("stroke_color", Type::String),
                f("stroke_dasharray", Type::String),
                f("stroke_width", Type::Int),
            ],
        },
    ]
}

pub fn find(name: &str) -> Option<ShapeDef> {
    shapes().into_iter().find(|s| s.name == name)
}

/// The VM only ever sees the opcode it's executing, not the component name
/// that produced it; this is how a draw opcode finds its field table back.
pub fn find_by_opcode(opcode: &str) -> Option<ShapeDef> {
    shapes().into_iter().find(|s| s.draw_opcode == opcode)
}

pub fn is_builtin_shape(name: &str) -> bool {
    shapes().iter().any(|s| s.name == name)
}

/// The zero value written into a shape property that an instance leaves
/// unbound.
pub fn default_literal(ty: &Type) -> ExprKind {
    match ty {
        Type::Int => ExprKind::IntLit(0),
        Type::Float => ExprKind::FloatLit(0.0),
        Type::String => ExprKind::StringLit(String::new()),
        Type::List(_) => ExprKind::InitList(Vec::new()),
        Type::Void | Type::Custom(_) => ExprKind::IntLit(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shape_is_found_by_name() {
        for s in shapes() {
            assert!(is_builtin_shape(s.name));
        }
        assert!(!is_builtin_shape("NotAShape"));
    }

    #[test]
    fn find_by_opcode_inverts_the_draw_opcode_column() {
        assert_eq!(find_by_opcode("drawEllipse").unwrap().name, "Ellipse");
        assert!(find_by_opcode("iadd").is_none());
    }

    #[test]
    fn rect_field_order_matches_the_shape_fields_contract() {
        let rect = find("Rectangle").unwrap();
        let names: Vec<&str> = rect.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["x", "y", "width", "height", "fill_color", "stroke_color", "stroke_dasharray", "stroke_width"]);
    }
}
