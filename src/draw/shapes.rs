//! SVG element rendering for the six drawable shapes.
//!
//! Field order and the `style="..."` attribute layout are confirmed
//! against `original_source/svgpainter.cpp` for `rect`/`text` and
//! extrapolated in the same style for the rest: coordinates arrive already
//! translated by the origin stack, so these functions do no positioning
//! math of their own.

pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_dasharray: String,
    pub stroke_width: i32,
}

impl Rect {
    pub fn to_svg(&self) -> String {
        format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" style="fill:{}; stroke-width:{}; stroke:{}; stroke-dasharray:{}"/>"#,
            self.x, self.y, self.width, self.height, self.fill_color, self.stroke_width, self.stroke_color, self.stroke_dasharray
        )
    }
}

pub struct Text {
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub text: String,
}

impl Text {
    pub fn to_svg(&self) -> String {
        format!(r#"<text x="{}" y="{}" font-size="{}">{}</text>"#, self.x, self.y, self.size, self.text)
    }
}

pub struct Ellipse {
    pub x: i32,
    pub y: i32,
    pub x_radius: i32,
    pub y_radius: i32,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_dasharray: String,
    pub stroke_width: i32,
}

impl Ellipse {
    pub fn to_svg(&self) -> String {
        format!(
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" style="fill:{}; stroke-width:{}; stroke:{}; stroke-dasharray:{}"/>"#,
            self.x, self.y, self.x_radius, self.y_radius, self.fill_color, self.stroke_width, self.stroke_color, self.stroke_dasharray
        )
    }
}

pub struct Polygon {
    pub x: i32,
    pub y: i32,
    pub points: Vec<(i32, i32)>,
    pub fill_color: String,
    pub fill_rule: String,
    pub stroke_color: String,
    pub stroke_dasharray: String,
    pub stroke_width: i32,
}

impl Polygon {
    pub fn to_svg(&self) -> String {
        let points = points_attr(self.x, self.y, &self.points);
        format!(
            r#"<polygon points="{}" style="fill:{}; fill-rule:{}; stroke-width:{}; stroke:{}; stroke-dasharray:{}"/>"#,
            points, self.fill_color, self.fill_rule, self.stroke_width, self.stroke_color, self.stroke_dasharray
        )
    }
}

pub struct Line {
    pub x: i32,
    pub y: i32,
    pub dx2: i32,
    pub dy2: i32,
    pub stroke_color: String,
    pub stroke_dasharray: String,
    pub stroke_width: i32,
}

impl Line {
    pub fn to_svg(&self) -> String {
        format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" style="stroke-width:{}; stroke:{}; stroke-dasharray:{}"/>"#,
            self.x,
            self.y,
            self.x + self.dx2,
            self.y + self.dy2,
            self.stroke_width,
            self.stroke_color,
            self.stroke_dasharray
        )
    }
}

pub struct Polyline {
    pub x: i32,
    pub y: i32,
    pub points: Vec<(i32, i32)>,
    pub stroke_color: String,
    pub stroke_dasharray: String,
    pub stroke_width: i32,
}

impl Polyline {
    pub fn to_svg(&self) -> String {
        let points = points_attr(self.x, self.y, &self.points);
        format!(
            r#"<polyline points="{}" style="stroke-width:{}; stroke:{}; stroke-dasharray:{}"/>"#,
            points, self.stroke_width, self.stroke_color, self.stroke_dasharray
        )
    }
}

fn points_attr(x: i32, y: i32, points: &[(i32, i32)]) -> String {
    points.iter().map(|(px, py)| format!("{},{}", x + px, y + py)).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_renders_with_fields_in_declared_order() {
        let r = Rect {
            x: 1,
            y: 2,
            width: 10,
            height: 20,
            fill_color: "red".into(),
            stroke_color: "black".into(),
            stroke_dasharray: "none".into(),
            stroke_width: 1,
        };
        assert_eq!(
            r.to_svg(),
            r#"<rect x="1" y="2" width="10" height="20" style="fill:red; stroke-width:1; stroke:black; stroke-dasharray:none"/>"#
        );
    }

    #[test]
    fn line_offsets_only_the_second_endpoint() {
        let l = Line { x: 5, y: 5, dx2: 10, dy2: 0, stroke_color: "black".into(), stroke_dasharray: "none".into(), stroke_width: 1 };
        assert_eq!(l.to_svg(), r#"<line x1="5" y1="5" x2="15" y2="5" style="stroke-width:1; stroke:black; stroke-dasharray:none"/>"#);
    }

    #[test]
    fn polygon_points_are_translated_by_the_anchor() {
        let p = Polygon {
            x: 100,
            y: 100,
            points: vec![(0, 0), (10, 0), (5, 10)],
            fill_color: "blue".into(),
            fill_rule: "nonzero".into(),
            stroke_color: "black".into(),
            stroke_dasharray: "none".into(),
            stroke_width: 1,
        };
        assert!(p.to_svg().contains(r#"points="100,100 110,100 105,110""#));
    }
}
