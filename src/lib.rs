//! # svgscene
//!
//! A compiler and bytecode virtual machine for a small declarative
//! language: documents declare reusable **components** with typed
//! properties and methods, instantiate them into a tree, and the tree
//! executes to produce an SVG document.
//!
//! ```text
//! source text -> lexer -> parser -> semantic analysis -> code emitter
//!             -> assembler -> bytecode VM -> SVG
//! ```
//!
//! ## Modules
//!
//! - [`lexer`] / [`parser`]: turn source text into an [`ast::CompileUnit`].
//! - [`sema`]: name resolution, type checking, property-dependency
//!   ordering, instance-tree validation.
//! - [`codegen`]: lowers a type-checked unit to assembly text, then to a
//!   [`codegen::assembler::Program`].
//! - [`vm`]: the bytecode interpreter.
//! - [`draw`]: the SVG-producing back end the VM's draw opcodes talk to.
//! - [`builtin`]: the seven shape types baked into every compile unit.
//! - [`error`] / [`report`]: diagnostics.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ast;
pub mod builtin;
pub mod codegen;
pub mod diagnostics;
pub mod draw;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod sema;
pub mod source_map;
pub mod symbol;
pub mod types;
pub mod vm;

pub use diagnostics::DiagnosticOptions;
pub use error::CompileError;
pub use parser::Parser;
pub use source_map::SourceMap;

use codegen::assembler::{self, Program};
use codegen::emit;
use draw::SvgBackend;
use vm::Vm;

/// Runs the full front end — lex, parse, analyze, emit, assemble — and
/// hands back a [`Program`] ready to execute. Stops at the first stage
/// that fails.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    compile_with_diagnostics(source, &DiagnosticOptions::default())
}

/// Same as [`compile`], but writes trace lines to standard error for every
/// stage `diag` enables. Each stage still runs exactly once; the tracing
/// only reads back data the stage already produced.
pub fn compile_with_diagnostics(source: &str, diag: &DiagnosticOptions) -> Result<Program, CompileError> {
    if diag.trace_parser {
        eprintln!("[parser] parsing {} bytes", source.len());
    }
    let mut unit = Parser::new(source)?.parse_compile_unit()?;
    if diag.trace_parser {
        eprintln!("[parser] {} top-level document(s)", unit.documents.len());
    }

    let analysis = sema::analyze(&mut unit)?;
    if diag.trace_symbols {
        eprintln!(
            "[sema] {} component(s), {} struct type(s)",
            analysis.components.len(),
            analysis.struct_fields.len()
        );
    }
    if diag.trace_scopes {
        eprintln!(
            "[sema] {} component scope(s), {} method scope(s), {} instance scope(s)",
            analysis.component_scopes.len(),
            analysis.method_scopes.len(),
            analysis.instance_scopes.len()
        );
    }
    if diag.trace_bindings {
        eprintln!("[sema] member init order ({} edge(s)):", analysis.member_init_order.len());
        for member in &analysis.member_init_order {
            eprintln!("  {}[{}]", member.instance_id, member.field_index);
        }
    }

    let lines = emit::emit(&analysis, &unit);
    if diag.trace_assembly {
        for (i, line) in lines.iter().enumerate() {
            eprintln!("{i:5}  {line}");
        }
    }
    Ok(assembler::assemble(&lines))
}

/// Compiles `source` and runs it to completion, returning the SVG document
/// its instance tree draws.
pub fn run(source: &str) -> Result<String, CompileError> {
    run_with_diagnostics(source, &DiagnosticOptions::default())
}

/// Same as [`run`], but traces the compile stages per `diag` before
/// executing the resulting program.
pub fn run_with_diagnostics(source: &str, diag: &DiagnosticOptions) -> Result<String, CompileError> {
    let program = compile_with_diagnostics(source, diag)?;
    let mut backend = SvgBackend::new();
    let mut vm = Vm::new(&program, &mut backend);
    Ok(vm.run()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_runs_a_minimal_document() {
        let svg = run(r#"Rectangle { x: 0 y: 0 width: 1 height: 1 fill_color: "red" }"#).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn a_semantic_error_short_circuits_before_codegen() {
        let err = compile("Rectangle { x: nope y: 0 width: 1 height: 1 fill_color: \"red\" }").unwrap_err();
        assert!(matches!(err, CompileError::Semantic(_)));
    }

    #[test]
    fn tracing_every_stage_does_not_change_the_result() {
        let diag = DiagnosticOptions {
            trace_symbols: true,
            trace_bindings: true,
            trace_scopes: true,
            trace_parser: true,
            trace_assembly: true,
        };
        let src = r#"Rectangle { x: 0 y: 0 width: 1 height: 1 fill_color: "red" }"#;
        assert_eq!(run(src).unwrap(), run_with_diagnostics(src, &diag).unwrap());
    }
}
