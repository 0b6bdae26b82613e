//! End-to-end scenarios exercising the full pipeline: source text in,
//! either an SVG document or a specific compile failure out.

use pretty_assertions::assert_eq;
use svgscene::{compile, run, CompileError};

#[test]
fn hello_rectangle() {
    let svg = run(r#"Rectangle { x: 0 y: 0 width: 10 height: 10 fill_color: "red" }"#).unwrap();
    let expected = "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n    \
         <rect x=\"0\" y=\"0\" width=\"10\" height=\"10\" style=\"fill:red; stroke-width:0; stroke:; stroke-dasharray:\"/>\n\
         </svg>";
    assert_eq!(svg, expected);
}

#[test]
fn text_with_an_explicit_size() {
    let svg = run(r#"Text { x: 5 y: 20 size: 12 text: "hi" }"#).unwrap();
    assert!(svg.contains(r#"<text x="5" y="20" font-size="12">hi</text>"#));
}

#[test]
fn arithmetic_property_resolves_at_runtime() {
    let svg = run(r#"def C { int w: 3 + 4 * 2; } C { id: root w: 1 }"#).unwrap();
    // w isn't drawn directly; exercise the same expression through a
    // Rectangle width so the resolved value shows up in the SVG.
    let svg2 = run(r#"Rectangle { x: 0 y: 0 width: 3 + 4 * 2 height: 1 fill_color: "red" }"#).unwrap();
    assert!(svg2.contains(r#"width="11""#));
    assert!(svg.starts_with("<svg"));
}

#[test]
fn binding_across_instances() {
    let svg = run(
        r#"def Group { }
        Group {
            id: root
            Rectangle { id: a x: 0 y: 0 width: 10 height: 1 fill_color: "red" }
            Rectangle { x: 0 y: 0 width: a.width + 5 height: 1 fill_color: "red" }
        }"#,
    )
    .unwrap();
    assert!(svg.contains(r#"width="15""#));
}

#[test]
fn list_and_string_len() {
    let svg = run(
        r#"def Reporter {
            def draw() {
                list<int> xs: {1, 2, 3};
                print(len(xs));
                print(len("abcd"));
            }
        }
        Reporter { id: r }"#,
    )
    .unwrap();
    assert!(svg.starts_with("<svg"));
}

#[test]
fn self_referential_property_is_a_cycle_error() {
    let err = compile("def C { int p: q + 1; int q: p + 1; } C { id: root }").unwrap_err();
    assert!(matches!(err, CompileError::Semantic(_)));
    let message = err.to_string();
    assert!(message.contains("'p'") || message.contains("'q'"));
}

#[test]
fn binding_to_an_unknown_instance_is_rejected() {
    let err = compile(
        r#"def Group { }
        Group {
            id: root
            Rectangle { x: missing.width y: 0 width: 1 height: 1 fill_color: "red" }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::Semantic(_)));
}

#[test]
fn empty_instance_body_produces_a_bare_svg_document() {
    let svg = run("def Empty { } Empty { id: root }").unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(!svg.contains("<rect"));
    assert!(!svg.contains("<text"));
}

#[test]
fn division_by_zero_aborts_at_runtime() {
    let err = run(
        r#"def Group { }
        Group {
            id: root
            Rectangle { x: 0 y: 0 width: 1 / 0 height: 1 fill_color: "red" }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::Vm(_)));
}
