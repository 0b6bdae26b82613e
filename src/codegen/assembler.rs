//! Two-pass assembler: assembly text → bytecode.
//!
//! Pass one walks the text purely to compute byte addresses for every
//! label and function (so a forward reference resolves correctly); pass
//! two re-walks it to emit bytes, resolving every label/function reference
//! and interning float/string operands into the constants pool.

use super::opcode::Opcode;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Float(f32),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDesc {
    pub name: String,
    pub entry: u32,
    pub args: u32,
    pub locals: u32,
    pub index: u32,
}

/// An assembled program: everything the VM needs to run, with no further
/// reference to source text or names.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub constants: Vec<ConstValue>,
    pub functions: Vec<FunctionDesc>,
    pub code: Vec<u8>,
    pub entry: u32,
}

impl Program {
    pub fn function(&self, index: u32) -> &FunctionDesc {
        &self.functions[index as usize]
    }
}

/// Walks `program.code` back into a mnemonic sequence, one entry per
/// instruction with its raw operand appended (labels and function names are
/// not recovered; that information lives only in the source assembly text).
/// Used by `svgc-dump` and by the assemble/disassemble round-trip test.
pub fn disassemble(program: &Program) -> Vec<String> {
    let mut out = Vec::new();
    let mut pc = 0usize;
    while pc < program.code.len() {
        let op = Opcode::from_byte(program.code[pc]).unwrap_or_else(|| crate::bug!("byte {} at offset {pc} is not a valid opcode", program.code[pc]));
        pc += 1;
        if op.has_operand() {
            let operand = i32::from_le_bytes(program.code[pc..pc + 4].try_into().unwrap());
            out.push(format!("{} {operand}", op.mnemonic()));
            pc += 4;
        } else {
            out.push(op.mnemonic().to_string());
        }
    }
    out
}

pub fn assemble(lines: &[String]) -> Program {
    let (labels, functions) = first_pass(lines);
    let func_index: HashMap<&str, u32> = functions.iter().map(|f| (f.name.as_str(), f.index)).collect();
    let entry = func_index.get("main").copied().map(|i| functions[i as usize].entry).unwrap_or(0);

    let mut constants = Vec::new();
    let mut float_cache: HashMap<u32, u32> = HashMap::new();
    let mut string_cache: HashMap<String, u32> = HashMap::new();
    let mut code = Vec::new();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(".def") || line.ends_with(':') {
            continue;
        }
        let (mnemonic, rest) = split_instruction(line);
        let op = Opcode::from_mnemonic(mnemonic).unwrap_or_else(|| crate::bug!("unknown mnemonic '{mnemonic}' reached the assembler"));
        code.push(op.to_byte());
        if op.has_operand() {
            let operand = resolve_operand(op, rest, &labels, &func_index, &mut constants, &mut float_cache, &mut string_cache);
            code.extend_from_slice(&operand.to_le_bytes());
        }
    }

    Program { constants, functions, code, entry }
}

fn first_pass(lines: &[String]) -> (HashMap<String, u32>, Vec<FunctionDesc>) {
    let mut addr = 0u32;
    let mut labels = HashMap::new();
    let mut functions = Vec::new();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(".def ") {
            let mut parts = rest.split_whitespace();
            let name = parts.next().expect("'.def' line always names a function").to_string();
            let args: u32 = parts.next().expect("'.def' line always carries an arg count").parse().expect("arg count is numeric");
            let locals: u32 = parts.next().expect("'.def' line always carries a locals count").parse().expect("locals count is numeric");
            functions.push(FunctionDesc {
                name,
                entry: addr,
                args,
                locals,
                index: functions.len() as u32,
            });
            continue;
        }
        if let Some(label) = line.strip_suffix(':') {
            labels.insert(label.to_string(), addr);
            continue;
        }
        let (mnemonic, _) = split_instruction(line);
        let op = Opcode::from_mnemonic(mnemonic).unwrap_or_else(|| crate::bug!("unknown mnemonic '{mnemonic}' reached the assembler"));
        addr += op.encoded_len() as u32;
    }

    (labels, functions)
}

fn split_instruction(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((m, rest)) => (m, rest.trim()),
        None => (line, ""),
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_operand(
    op: Opcode,
    rest: &str,
    labels: &HashMap<String, u32>,
    func_index: &HashMap<&str, u32>,
    constants: &mut Vec<ConstValue>,
    float_cache: &mut HashMap<u32, u32>,
    string_cache: &mut HashMap<String, u32>,
) -> i32 {
    match op {
        Opcode::Iconst | Opcode::Struct | Opcode::Gload | Opcode::Gstore | Opcode::Lload | Opcode::Lstore | Opcode::Fload | Opcode::Fstore => {
            rest.parse().unwrap_or_else(|_| crate::bug!("'{rest}' is not a valid integer operand"))
        }
        Opcode::Fconst => intern_float(rest.parse().unwrap_or_else(|_| crate::bug!("'{rest}' is not a valid float operand")), constants, float_cache) as i32,
        Opcode::Sconst => intern_string(unescape(rest), constants, string_cache) as i32,
        Opcode::Br | Opcode::Brt | Opcode::Brf => *labels.get(rest).unwrap_or_else(|| crate::bug!("undefined label '{rest}'")) as i32,
        Opcode::Call => *func_index.get(rest).unwrap_or_else(|| crate::bug!("undefined function '{rest}'")) as i32,
        other => crate::bug!("opcode {other:?} was classified as one-operand but has no operand-resolution rule"),
    }
}

fn intern_float(v: f32, constants: &mut Vec<ConstValue>, cache: &mut HashMap<u32, u32>) -> u32 {
    let bits = v.to_bits();
    *cache.entry(bits).or_insert_with(|| {
        let idx = constants.len() as u32;
        constants.push(ConstValue::Float(v));
        idx
    })
}

fn intern_string(v: String, constants: &mut Vec<ConstValue>, cache: &mut HashMap<String, u32>) -> u32 {
    if let Some(&idx) = cache.get(&v) {
        return idx;
    }
    let idx = constants.len() as u32;
    cache.insert(v.clone(), idx);
    constants.push(ConstValue::Str(v));
    idx
}

/// Strips the surrounding quotes and resolves the handful of escapes the
/// lexer ever writes back out (`sconst {:?}` in the emitter is the only
/// producer of this text).
fn unescape(literal: &str) -> String {
    let inner = literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(literal);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_function_layout_assigns_sequential_addresses() {
        let lines: Vec<String> = vec![".def main 0 0".into(), "iconst 1".into(), "pop".into(), "halt".into()];
        let program = assemble(&lines);
        assert_eq!(program.functions[0].entry, 0);
        assert_eq!(program.entry, 0);
        // iconst(5 bytes) + pop(1) + halt(1) = 7
        assert_eq!(program.code.len(), 7);
    }

    #[test]
    fn forward_label_reference_resolves_to_the_correct_address() {
        let lines: Vec<String> = vec![
            ".def main 0 0".into(),
            "iconst 0".into(),
            "brf .Lend".into(),
            "iconst 1".into(),
            "pop".into(),
            ".Lend:".into(),
            "halt".into(),
        ];
        let program = assemble(&lines);
        // iconst(5) + brf(5) + iconst(5) + pop(1) = 16, where .Lend lands.
        let operand = i32::from_le_bytes(program.code[6..10].try_into().unwrap());
        assert_eq!(operand, 16);
    }

    #[test]
    fn string_constants_are_deduplicated_by_value() {
        let lines: Vec<String> = vec![".def main 0 0".into(), "sconst \"hi\"".into(), "pop".into(), "sconst \"hi\"".into(), "pop".into(), "halt".into()];
        let program = assemble(&lines);
        assert_eq!(program.constants.len(), 1);
        assert_eq!(program.constants[0], ConstValue::Str("hi".to_string()));
    }

    #[test]
    fn disassemble_recovers_the_mnemonic_sequence() {
        let lines: Vec<String> = vec![".def main 0 0".into(), "iconst 1".into(), "iconst 2".into(), "iadd".into(), "pop".into(), "halt".into()];
        let program = assemble(&lines);
        let disassembled = disassemble(&program);
        let mnemonics: Vec<&str> = disassembled.iter().map(|l| l.split_whitespace().next().unwrap()).collect();
        assert_eq!(mnemonics, vec!["iconst", "iconst", "iadd", "pop", "halt"]);
    }

    #[test]
    fn call_operand_is_a_function_index_not_an_address() {
        let lines: Vec<String> = vec![
            ".def helper 0 0".into(),
            "halt".into(),
            ".def main 0 0".into(),
            "call helper".into(),
            "halt".into(),
        ];
        let program = assemble(&lines);
        let call_operand_addr = program.functions[1].entry as usize + 1;
        let operand = i32::from_le_bytes(program.code[call_operand_addr..call_operand_addr + 4].try_into().unwrap());
        assert_eq!(operand, 0);
    }
}
