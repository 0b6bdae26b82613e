//! Turns a [`CompileError`] plus the [`SourceMap`] it came from into a
//! human-readable report: the message, the `path:line:col` location, and
//! the offending source line with an ASCII caret under it.
//!
//! Color is available only when this crate is built with the `cli`
//! feature (it's the only consumer that pulls in `colored`), and even then
//! only when standard error is a terminal.

use crate::error::CompileError;
use crate::source_map::SourceMap;

pub fn report(err: &CompileError, source: &SourceMap) -> String {
    let mut out = format!("error: {err}\n");
    if let Some(span) = err.span() {
        out.push_str(&format!("  --> {}:{}:{}\n", source.path(), span.line, span.column));
        out.push_str(&format!("   | {}\n", source.line(span.line)));
        let caret_col = (span.column.saturating_sub(1)) as usize;
        out.push_str(&format!("   | {}^\n", " ".repeat(caret_col)));
    }
    colorize(out)
}

#[cfg(feature = "cli")]
fn colorize(text: String) -> String {
    use colored::Colorize;
    use std::io::IsTerminal;
    if std::io::stderr().is_terminal() {
        text.red().to_string()
    } else {
        text
    }
}

#[cfg(not(feature = "cli"))]
fn colorize(text: String) -> String {
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, CompileError};

    #[test]
    fn reports_a_line_and_caret_for_an_unresolved_name() {
        let src = r#"Rectangle { x: undefined y: 0 width: 1 height: 1 fill_color: "red" }"#;
        let source = SourceMap::new("a.svgs", src);
        let err = compile(src).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(_)));
        let text = report(&err, &source);
        assert!(text.contains("a.svgs:"));
        assert!(text.contains('^'));
    }
}
