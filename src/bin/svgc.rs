//! svgc - Compile a scene document to SVG
//!
//! # Usage
//!
//! ```bash
//! # Compile a file and print the resulting SVG to stdout
//! svgc scene.svgs
//!
//! # Compile several files, writing each document's SVG in turn
//! svgc a.svgs b.svgs
//!
//! # Trace the member-init dependency order sema computed
//! svgc --trace-bindings scene.svgs
//!
//! # See the emitted assembly before it's packed into bytecode
//! svgc --dump-assembly scene.svgs
//! ```

use clap::Parser as ClapParser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use svgscene::codegen::assembler;
use svgscene::codegen::emit;
use svgscene::{report, DiagnosticOptions, Parser, SourceMap};

/// Compile a scene document to SVG
#[derive(ClapParser, Debug)]
#[command(name = "svgc")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene documents to compile, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Trace symbol table inserts during the symbol pass
    #[arg(long)]
    trace_symbols: bool,

    /// Trace property/binding dependency edges and the resulting init order
    #[arg(long)]
    trace_bindings: bool,

    /// Trace scope creation for components, methods, and instances
    #[arg(long)]
    trace_scopes: bool,

    /// Trace the parser's struct-vs-component speculative lookahead
    #[arg(long)]
    trace_parser: bool,

    /// Print every emitted assembly line
    #[arg(long)]
    trace_assembly: bool,

    /// Print the parsed AST instead of compiling it
    #[arg(long)]
    dump_ast: bool,

    /// Print the assembly text instead of running it
    #[arg(long)]
    dump_assembly: bool,

    /// Print the disassembled bytecode instead of running it
    #[arg(long)]
    dump_bytecode: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let diag = DiagnosticOptions {
        trace_symbols: args.trace_symbols,
        trace_bindings: args.trace_bindings,
        trace_scopes: args.trace_scopes,
        trace_parser: args.trace_parser,
        trace_assembly: args.trace_assembly,
    };

    for path in &args.files {
        if let Err(code) = compile_one(path, &args, &diag) {
            return code;
        }
    }
    ExitCode::SUCCESS
}

fn compile_one(path: &PathBuf, args: &Args, diag: &DiagnosticOptions) -> Result<(), ExitCode> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("{} {}: {}", "error:".red(), path.display(), e);
        ExitCode::FAILURE
    })?;
    let source = SourceMap::new(path.display().to_string(), text.clone());

    if args.dump_ast {
        let unit = Parser::new(&text)
            .and_then(|mut p| p.parse_compile_unit())
            .map_err(|e| report_err(&e.into(), &source))?;
        println!("{unit:#?}");
        return Ok(());
    }

    let program = svgscene::compile_with_diagnostics(&text, diag).map_err(|e| report_err(&e, &source))?;

    if args.dump_assembly {
        let mut unit = Parser::new(&text).map_err(|e| report_err(&e.into(), &source))?.parse_compile_unit().map_err(|e| report_err(&e.into(), &source))?;
        let analysis = svgscene::sema::analyze(&mut unit).map_err(|e| report_err(&e.into(), &source))?;
        for line in emit::emit(&analysis, &unit) {
            println!("{line}");
        }
        return Ok(());
    }

    if args.dump_bytecode {
        for (i, func) in program.functions.iter().enumerate() {
            println!("function {i} \"{}\" entry={} args={} locals={}", func.name, func.entry, func.args, func.locals);
        }
        println!("{} byte(s) of code, entry at {}", program.code.len(), program.entry);
        return Ok(());
    }

    let svg = run_program(&program).map_err(|e| report_err(&e.into(), &source))?;
    println!("{svg}");
    Ok(())
}

fn run_program(program: &assembler::Program) -> Result<String, svgscene::error::VmError> {
    let mut backend = svgscene::draw::SvgBackend::new();
    let mut vm = svgscene::vm::Vm::new(program, &mut backend);
    vm.run()
}

fn report_err(err: &svgscene::CompileError, source: &SourceMap) -> ExitCode {
    eprint!("{}", report::report(err, source));
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_require_at_least_one_file() {
        let result = Args::try_parse_from(["svgc"]);
        assert!(result.is_err());
    }

    #[test]
    fn args_accept_a_single_file_and_trace_flags() {
        let args = Args::try_parse_from(["svgc", "--trace-bindings", "scene.svgs"]).unwrap();
        assert_eq!(args.files, vec![PathBuf::from("scene.svgs")]);
        assert!(args.trace_bindings);
        assert!(!args.trace_assembly);
    }
}
