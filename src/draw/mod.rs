//! The drawing back end: scene setup, an origin stack, and the ordered list
//! of rendered shapes that becomes the final SVG document.
//!
//! The VM talks to this through [`DrawBackend`] rather than building SVG
//! text itself, keeping the choice of output format out of the
//! instruction-dispatch loop.

pub mod shapes;

use shapes::{Ellipse, Line, Polygon, Polyline, Rect, Text};

pub trait DrawBackend {
    fn define_scene(&mut self, left_margin: i32, top_margin: i32, right_margin: i32, bottom_margin: i32, width: i32, height: i32);
    fn push_origin(&mut self, dx: i32, dy: i32);
    fn pop_origin(&mut self);
    fn draw_rect(&mut self, r: Rect);
    fn draw_text(&mut self, t: Text);
    fn draw_ellipse(&mut self, e: Ellipse);
    fn draw_polygon(&mut self, p: Polygon);
    fn draw_line(&mut self, l: Line);
    fn draw_polyline(&mut self, p: Polyline);
    fn generate(&self) -> String;
}

/// Resolves every shape's coordinates against the origin stack the instant
/// it's drawn, then serializes everything once at the end. This is a
/// deliberate divergence from a lazy "record then resolve at generate()"
/// design: `pushOrigin`/`popOrigin` are ordinary opcodes a draw method can
/// call in any order relative to its children's draws, so the offset in
/// effect has to be captured at the moment of the call, not reconstructed
/// afterward from a transcript.
pub struct SvgBackend {
    origin_stack: Vec<(i32, i32)>,
    elements: Vec<String>,
}

impl SvgBackend {
    pub fn new() -> Self {
        Self { origin_stack: Vec::new(), elements: Vec::new() }
    }

    fn offset(&self) -> (i32, i32) {
        self.origin_stack.iter().fold((0, 0), |(ax, ay), (x, y)| (ax + x, ay + y))
    }
}

impl Default for SvgBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawBackend for SvgBackend {
    fn define_scene(&mut self, left_margin: i32, top_margin: i32, _right_margin: i32, _bottom_margin: i32, _width: i32, _height: i32) {
        self.origin_stack.push((left_margin, top_margin));
    }

    fn push_origin(&mut self, dx: i32, dy: i32) {
        self.origin_stack.push((dx, dy));
    }

    fn pop_origin(&mut self) {
        self.origin_stack.pop();
    }

    fn draw_rect(&mut self, mut r: Rect) {
        let (dx, dy) = self.offset();
        r.x += dx;
        r.y += dy;
        self.elements.push(r.to_svg());
    }

    fn draw_text(&mut self, mut t: Text) {
        let (dx, dy) = self.offset();
        t.x += dx;
        t.y += dy;
        self.elements.push(t.to_svg());
    }

    fn draw_ellipse(&mut self, mut e: Ellipse) {
        let (dx, dy) = self.offset();
        e.x += dx;
        e.y += dy;
        self.elements.push(e.to_svg());
    }

    fn draw_polygon(&mut self, mut p: Polygon) {
        let (dx, dy) = self.offset();
        p.x += dx;
        p.y += dy;
        self.elements.push(p.to_svg());
    }

    fn draw_line(&mut self, mut l: Line) {
        let (dx, dy) = self.offset();
        l.x += dx;
        l.y += dy;
        self.elements.push(l.to_svg());
    }

    fn draw_polyline(&mut self, mut p: Polyline) {
        let (dx, dy) = self.offset();
        p.x += dx;
        p.y += dy;
        self.elements.push(p.to_svg());
    }

    fn generate(&self) -> String {
        let mut out = String::from("<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n");
        for el in &self.elements {
            out.push_str("    ");
            out.push_str(el);
            out.push('\n');
        }
        out.push_str("</svg>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_margin_becomes_the_initial_origin() {
        let mut back = SvgBackend::new();
        back.define_scene(10, 20, 10, 20, 800, 600);
        back.draw_rect(Rect {
            x: 0,
            y: 0,
            width: 5,
            height: 5,
            fill_color: "red".into(),
            stroke_color: "none".into(),
            stroke_dasharray: "none".into(),
            stroke_width: 0,
        });
        assert!(back.generate().contains(r#"x="10" y="20""#));
    }

    #[test]
    fn nested_push_origin_accumulates_and_pop_restores() {
        let mut back = SvgBackend::new();
        back.push_origin(100, 0);
        back.push_origin(0, 50);
        back.draw_text(Text { x: 0, y: 0, size: 12, text: "a".into() });
        back.pop_origin();
        back.draw_text(Text { x: 0, y: 0, size: 12, text: "b".into() });
        assert!(back.elements[0].contains(r#"x="100" y="50""#));
        assert!(back.elements[1].contains(r#"x="100" y="0""#));
    }
}
