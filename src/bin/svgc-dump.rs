//! svgc-dump - Print an intermediate representation of a scene document
//!
//! Unlike `svgc`, which compiles and runs a document to produce SVG, this
//! tool exists purely to inspect what the earlier pipeline stages produced.
//!
//! # Usage
//!
//! ```bash
//! svgc-dump --stage ast scene.svgs
//! svgc-dump --stage assembly scene.svgs
//! svgc-dump --stage bytecode scene.svgs
//! ```

use clap::{Parser as ClapParser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use svgscene::codegen::{assembler, emit};
use svgscene::{report, Parser, SourceMap};

#[derive(ClapParser, Debug)]
#[command(name = "svgc-dump")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which intermediate representation to print
    #[arg(short, long, value_enum, default_value = "ast")]
    stage: Stage,

    /// Scene document to inspect
    #[arg(required = true)]
    file: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Stage {
    Ast,
    Assembly,
    Bytecode,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let text = match std::fs::read_to_string(&args.file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{} {}: {}", "error:".red(), args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let source = SourceMap::new(args.file.display().to_string(), text.clone());

    let mut unit = match Parser::new(&text).and_then(|mut p| p.parse_compile_unit()) {
        Ok(unit) => unit,
        Err(e) => {
            eprint!("{}", report::report(&e.into(), &source));
            return ExitCode::FAILURE;
        }
    };

    if args.stage == Stage::Ast {
        println!("{unit:#?}");
        return ExitCode::SUCCESS;
    }

    let analysis = match svgscene::sema::analyze(&mut unit) {
        Ok(a) => a,
        Err(e) => {
            eprint!("{}", report::report(&e.into(), &source));
            return ExitCode::FAILURE;
        }
    };
    let lines = emit::emit(&analysis, &unit);

    if args.stage == Stage::Assembly {
        for line in &lines {
            println!("{line}");
        }
        return ExitCode::SUCCESS;
    }

    let program: assembler::Program = assembler::assemble(&lines);
    for (i, func) in program.functions.iter().enumerate() {
        println!(
            "{} function {i} \"{}\" entry={} args={} locals={}",
            "fn".bold(),
            func.name,
            func.entry,
            func.args,
            func.locals
        );
    }
    for (i, instr) in assembler::disassemble(&program).iter().enumerate() {
        println!("  {i:5}  {instr}");
    }
    println!("{} constant(s), {} byte(s) of code, entry {}", program.constants.len(), program.code.len(), program.entry);
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_defaults_to_ast() {
        let args = Args::try_parse_from(["svgc-dump", "scene.svgs"]).unwrap();
        assert_eq!(args.stage, Stage::Ast);
    }

    #[test]
    fn stage_accepts_bytecode() {
        let args = Args::try_parse_from(["svgc-dump", "--stage", "bytecode", "scene.svgs"]).unwrap();
        assert_eq!(args.stage, Stage::Bytecode);
    }
}
