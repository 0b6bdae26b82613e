//! Boundary conditions and round-trip properties that don't fit naturally
//! as a single concrete scenario.

use svgscene::codegen::assembler;
use svgscene::codegen::emit;
use svgscene::sema;
use svgscene::Parser;

fn assembled(src: &str) -> assembler::Program {
    let mut unit = Parser::new(src).unwrap().parse_compile_unit().unwrap();
    let analysis = sema::analyze(&mut unit).unwrap();
    assembler::assemble(&emit::emit(&analysis, &unit))
}

#[test]
fn disassembling_an_assembled_program_recovers_the_mnemonic_order() {
    let program = assembled(r#"Rectangle { x: 0 y: 0 width: 3 + 4 * 2 height: 1 fill_color: "red" }"#);
    let disassembled = assembler::disassemble(&program);
    let mnemonics: Vec<&str> = disassembled.iter().map(|l| l.split_whitespace().next().unwrap()).collect();
    assert!(mnemonics.contains(&"imul"));
    assert!(mnemonics.contains(&"iadd"));
    assert!(mnemonics.contains(&"drawRect"));
    assert_eq!(mnemonics.last(), Some(&"halt"));
}

#[test]
fn every_branch_operand_lands_inside_the_code_stream() {
    let program = assembled("def C { int w: 0; def run() { int i: 0; while (i < 3) { i = i + 1; } } } C { id: root w: 1 }");
    let mnemonics = assembler::disassemble(&program);
    for (line, pc) in mnemonics.iter().zip(branch_addresses(&program)) {
        if line.starts_with("br") {
            let target: usize = line.split_whitespace().nth(1).unwrap().parse().unwrap();
            assert!(target <= program.code.len(), "branch at {pc} targets {target}, past the code stream");
        }
    }
}

fn branch_addresses(program: &assembler::Program) -> Vec<usize> {
    // Mirrors disassemble()'s own walk so each mnemonic lines up with the
    // byte offset it started at.
    use svgscene::codegen::opcode::Opcode;
    let mut out = Vec::new();
    let mut pc = 0usize;
    while pc < program.code.len() {
        let op = Opcode::from_byte(program.code[pc]).unwrap();
        out.push(pc);
        pc += if op.has_operand() { 5 } else { 1 };
    }
    out
}

#[test]
fn empty_instance_body_compiles_to_a_bare_svg_wrapper() {
    let svg = svgscene::run("def Empty { } Empty { id: root }").unwrap();
    assert_eq!(svg.trim().lines().next().unwrap().trim(), r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1">"#);
}

#[test]
fn call_targets_always_index_a_defined_function() {
    let program = assembled(
        r#"def Greeter {
            def greet() { print(1); }
            def draw() { greet(); }
        }
        Greeter { id: g }"#,
    );
    let mut saw_a_call = false;
    for line in assembler::disassemble(&program) {
        if let Some(operand) = line.strip_prefix("call ") {
            saw_a_call = true;
            let index: u32 = operand.parse().unwrap();
            assert!((index as usize) < program.functions.len());
            let callee = program.function(index);
            assert!(callee.entry < program.code.len() as u32);
        }
    }
    assert!(saw_a_call, "greet() is called through another method, so a call opcode must appear");
}
