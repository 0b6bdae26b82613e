//! AST → assembly text.
//!
//! Emits one line of assembly per instruction, plus `.def <name> <args>
//! <locals>` lines starting a function and `.L<n>:` label lines. The
//! [`assembler`](super::assembler) module is the only reader of this text;
//! nothing downstream of it parses source positions or names again.

use crate::ast::*;
use crate::builtin;
use crate::sema::AnalysisResult;
use crate::symbol::{ScopeId, SymbolCategory};
use crate::types::Type;
use std::collections::HashMap;

/// Builtin function names a method body can actually call, spelled
/// identically to their opcode mnemonics so the call lowers to that bare
/// mnemonic rather than a generic `call`. The shape draw opcodes
/// (`drawRect`, `defineScene`, ...) are not in this list: nothing in this
/// language's grammar invokes them directly, since a shape's fields are
/// only ever assembled by the instance tree, never by a source-level call
/// expression — they reach codegen only through the automatic draw walk.
fn builtin_mnemonic(name: &str) -> bool {
    matches!(name, "len" | "print" | "pushOrigin" | "popOrigin")
}

struct Labels {
    next: u32,
}

impl Labels {
    fn new() -> Self {
        Self { next: 0 }
    }

    fn fresh(&mut self) -> String {
        let n = self.next;
        self.next += 1;
        format!(".L{n}")
    }
}

/// Name resolution context shared by method bodies and instance
/// bindings/defaults: `scope` is resolved exactly the way the symbol pass
/// resolved it (parent chain, then component-scope fallback), and
/// `self_slot` is the `main` local holding the struct a bare self-property
/// reference reads from.
struct Ctx<'a> {
    analysis: &'a AnalysisResult,
    instance_slots: &'a HashMap<String, u32>,
    scope: ScopeId,
    self_slot: u32,
    loops: Vec<(String, String)>,
}

pub fn emit(analysis: &AnalysisResult, unit: &CompileUnit) -> Vec<String> {
    let mut lines = Vec::new();
    let mut labels = Labels::new();

    let root = unit
        .documents
        .iter()
        .find_map(|d| if let Document::Instance(i) = d { Some(i) } else { None })
        .expect("exactly one instance document, checked by analyze()");

    let mut instances = Vec::new();
    collect_instances(root, &mut instances);
    let instance_count = instances.len() as u32;
    let instance_slots: HashMap<String, u32> = instances
        .iter()
        .map(|i| (i.instance_id(), i.instance_index.expect("instance index assigned by the symbol pass")))
        .collect();

    for doc in &unit.documents {
        if let Document::Component(c) = doc {
            for m in &c.methods {
                emit_method(analysis, &instance_slots, c, m, &mut labels, &mut lines);
            }
        }
    }

    lines.push(format!(".def main 0 {instance_count}"));

    for inst in &instances {
        let component = &analysis.components[&inst.component_name];
        let slot = inst.instance_index.expect("instance index assigned by the symbol pass");
        lines.push(format!("struct {}", component.properties.len()));
        lines.push(format!("lstore {slot}"));
    }

    for mi in &analysis.member_init_order {
        let inst = instances
            .iter()
            .find(|i| i.instance_id() == mi.instance_id)
            .expect("member-init order only names instances in this tree");
        let slot = inst.instance_index.unwrap();
        let value_expr = field_expr(analysis, inst, mi.field_index);
        let instance_scope = analysis.instance_scopes[&mi.instance_id];
        let mut ctx = Ctx {
            analysis,
            instance_slots: &instance_slots,
            scope: instance_scope,
            self_slot: slot,
            loops: Vec::new(),
        };
        lines.push(format!("lload {slot}"));
        emit_expr(&mut ctx, value_expr, &mut labels, &mut lines);
        lines.push(format!("fstore {}", mi.field_index));
    }

    for inst in &instances {
        let slot = inst.instance_index.unwrap();
        let component = &analysis.components[&inst.component_name];
        if component.methods.iter().any(|m| m.name == "draw") {
            lines.push(format!("lload {slot}"));
            lines.push(format!("call {}", qualified(&inst.component_name, "draw")));
        } else if let Some(shape) = builtin::find(&inst.component_name) {
            lines.push(format!("lload {slot}"));
            lines.push(shape.draw_opcode.to_string());
        }
    }

    lines.push("halt".to_string());
    lines
}

fn qualified(component: &str, method: &str) -> String {
    format!("{component}.{method}")
}

fn collect_instances<'a>(inst: &'a ComponentInstance, out: &mut Vec<&'a ComponentInstance>) {
    out.push(inst);
    for child in &inst.children {
        collect_instances(child, out);
    }
}

fn field_expr<'a>(analysis: &'a AnalysisResult, inst: &'a ComponentInstance, field_index: u32) -> &'a Expr {
    inst.bindings
        .iter()
        .find(|b| b.field_index == Some(field_index))
        .map(|b| &b.value)
        .unwrap_or_else(|| &analysis.components[&inst.component_name].properties[field_index as usize].init)
}

fn emit_method(
    analysis: &AnalysisResult,
    instance_slots: &HashMap<String, u32>,
    c: &ComponentDef,
    m: &MethodDecl,
    labels: &mut Labels,
    lines: &mut Vec<String>,
) {
    let scope = analysis.method_scopes[&(c.name.clone(), m.name.clone())];
    let args = 1 + m.params.len() as u32;
    let total = m.local_count.unwrap_or(args);
    let locals = total.saturating_sub(args);
    lines.push(format!(".def {} {} {}", qualified(&c.name, &m.name), args, locals));
    let mut ctx = Ctx {
        analysis,
        instance_slots,
        scope,
        self_slot: 0,
        loops: Vec::new(),
    };
    emit_stmt(&mut ctx, &m.body, labels, lines);
    if lines.last().map(|l| l.as_str()) != Some("ret") {
        lines.push("ret".to_string());
    }
}

fn emit_stmt(ctx: &mut Ctx, stmt: &Stmt, labels: &mut Labels, lines: &mut Vec<String>) {
    match &stmt.kind {
        StmtKind::Compound(stmts) => {
            for s in stmts {
                emit_stmt(ctx, s, labels, lines);
            }
        }
        StmtKind::Decl(var) => {
            if let Some(init) = &var.init {
                emit_expr(ctx, init, labels, lines);
            } else {
                emit_default(&var.ty, lines);
            }
            lines.push(format!("lstore {}", var.local_index.expect("local index assigned by the symbol pass")));
        }
        StmtKind::If { cond, then_branch, else_branch } => {
            emit_expr(ctx, cond, labels, lines);
            let lfalse = labels.fresh();
            lines.push(format!("brf {lfalse}"));
            emit_stmt(ctx, then_branch, labels, lines);
            match else_branch {
                Some(else_stmt) => {
                    let lend = labels.fresh();
                    lines.push(format!("br {lend}"));
                    lines.push(format!("{lfalse}:"));
                    emit_stmt(ctx, else_stmt, labels, lines);
                    lines.push(format!("{lend}:"));
                }
                None => lines.push(format!("{lfalse}:")),
            }
        }
        StmtKind::While { cond, body } => {
            let lcond = labels.fresh();
            let lend = labels.fresh();
            lines.push(format!("{lcond}:"));
            emit_expr(ctx, cond, labels, lines);
            lines.push(format!("brf {lend}"));
            ctx.loops.push((lcond.clone(), lend.clone()));
            emit_stmt(ctx, body, labels, lines);
            ctx.loops.pop();
            lines.push(format!("br {lcond}"));
            lines.push(format!("{lend}:"));
        }
        StmtKind::Break => {
            let (_, end) = ctx.loops.last().expect("break only reaches codegen inside a loop");
            lines.push(format!("br {end}"));
        }
        StmtKind::Continue => {
            let (cond, _) = ctx.loops.last().expect("continue only reaches codegen inside a loop");
            lines.push(format!("br {cond}"));
        }
        StmtKind::Return(expr) => {
            if let Some(e) = expr {
                emit_expr(ctx, e, labels, lines);
            }
            lines.push("ret".to_string());
        }
        StmtKind::Expr(e) => {
            emit_expr(ctx, e, labels, lines);
            if !matches!(e.ty, Some(Type::Void) | None) {
                lines.push("pop".to_string());
            }
        }
    }
}

fn emit_default(ty: &Type, lines: &mut Vec<String>) {
    match ty {
        Type::Int => lines.push("iconst 0".to_string()),
        Type::Float => lines.push("fconst 0".to_string()),
        Type::String => lines.push("sconst \"\"".to_string()),
        Type::List(_) => lines.push("vector".to_string()),
        Type::Custom(_) => lines.push("iconst 0".to_string()),
        Type::Void => lines.push("iconst 0".to_string()),
    }
}

fn emit_expr(ctx: &mut Ctx, expr: &Expr, labels: &mut Labels, lines: &mut Vec<String>) {
    match &expr.kind {
        ExprKind::IntLit(v) => lines.push(format!("iconst {v}")),
        ExprKind::FloatLit(v) => lines.push(format!("fconst {v}")),
        ExprKind::StringLit(s) => lines.push(format!("sconst {:?}", s)),
        ExprKind::InitList(elems) => {
            lines.push("vector".to_string());
            for e in elems {
                emit_expr(ctx, e, labels, lines);
                lines.push("vappend".to_string());
            }
        }
        ExprKind::Binary { op, lhs, rhs } => {
            emit_expr(ctx, lhs, labels, lines);
            emit_expr(ctx, rhs, labels, lines);
            lines.push(binary_mnemonic(*op, lhs.ty.as_ref().unwrap_or(&Type::Int)).to_string());
        }
        ExprKind::Unary { op, operand } => {
            emit_expr(ctx, operand, labels, lines);
            if let Some(m) = unary_mnemonic(*op, operand.ty.as_ref().unwrap_or(&Type::Int)) {
                lines.push(m.to_string());
            }
        }
        ExprKind::Call { callee, args } => {
            let name = match &callee.kind {
                ExprKind::Ref(n) => n.clone(),
                _ => crate::bug!("call callee is always a bare name by the time it reaches codegen"),
            };
            if builtin_mnemonic(&name) {
                for a in args {
                    emit_expr(ctx, a, labels, lines);
                }
                lines.push(name);
            } else {
                // A bare-name call to another method always targets the
                // current self: the grammar has no syntax for calling a
                // method on some other instance. The callee's frame still
                // reserves its first local for self, so it has to be pushed
                // ahead of the written-out arguments.
                let sym = ctx.analysis.table.resolve(ctx.scope, &name).expect("resolved during the symbol pass");
                let owner = sym.owner.clone().expect("a user-called method always carries its owning component");
                lines.push(format!("lload {}", ctx.self_slot));
                for a in args {
                    emit_expr(ctx, a, labels, lines);
                }
                lines.push(format!("call {}", qualified(&owner, &name)));
            }
        }
        ExprKind::Index { list, index } => {
            emit_expr(ctx, list, labels, lines);
            emit_expr(ctx, index, labels, lines);
            lines.push("vload".to_string());
        }
        ExprKind::Member { base, name } => {
            emit_expr(ctx, base, labels, lines);
            let idx = member_field_index(ctx, base, name);
            lines.push(format!("fload {idx}"));
        }
        ExprKind::Ref(name) => emit_ref(ctx, name, lines),
        ExprKind::Assign { target, value } => {
            emit_assign(ctx, target, value, labels, lines);
            // Every store opcode (`lstore`/`fstore`/`vstore`) fully consumes its
            // operands and leaves nothing behind, but an assignment is itself an
            // expression with a value (its target's new value) — re-read the
            // target to put that value back on the stack. Statement-position
            // assignments immediately `pop` it again; chained ones consume it.
            emit_expr(ctx, target, labels, lines);
        }
    }
}

fn member_field_index(ctx: &Ctx, base: &Expr, name: &str) -> u32 {
    let owner = match &base.ty {
        Some(Type::Custom(owner)) => owner,
        _ => crate::bug!("member base always has a resolved custom type by codegen"),
    };
    ctx.analysis
        .component_fields
        .get(owner)
        .or_else(|| ctx.analysis.struct_fields.get(owner))
        .and_then(|fields| fields.iter().find(|f| f.name == name))
        .map(|f| f.index)
        .unwrap_or_else(|| crate::bug!("member field resolved during the symbol pass"))
}

fn emit_ref(ctx: &Ctx, name: &str, lines: &mut Vec<String>) {
    let sym = ctx.analysis.table.resolve(ctx.scope, name).expect("resolved during the symbol pass").clone();
    match sym.category {
        SymbolCategory::Parameter | SymbolCategory::Variable if sym.owner.is_none() => {
            lines.push(format!("lload {}", sym.index.expect("local slot assigned by the symbol pass")));
        }
        SymbolCategory::Variable => {
            // The `parent` pseudo-variable: owner holds the concrete parent instance id.
            let parent_id = sym.owner.expect("parent binding always carries its target instance id");
            lines.push(format!("lload {}", instance_slot(ctx, &parent_id)));
        }
        SymbolCategory::InstanceId => {
            lines.push(format!("lload {}", instance_slot(ctx, name)));
        }
        SymbolCategory::Property => {
            lines.push(format!("lload {}", ctx.self_slot));
            lines.push(format!("fload {}", sym.index.expect("property index assigned by the symbol pass")));
        }
        SymbolCategory::EnumConstant => {
            lines.push(format!("iconst {}", sym.index.expect("enum constant value assigned by the symbol pass")));
        }
        other => crate::bug!("'{name}' resolved to an unexpected {other:?} in codegen"),
    }
}

fn instance_slot(ctx: &Ctx, id: &str) -> u32 {
    *ctx.instance_slots.get(id).unwrap_or_else(|| crate::bug!("instance id '{id}' has no recorded slot"))
}

fn emit_assign(ctx: &mut Ctx, target: &Expr, value: &Expr, labels: &mut Labels, lines: &mut Vec<String>) {
    match &target.kind {
        ExprKind::Ref(name) => {
            let sym = ctx.analysis.table.resolve(ctx.scope, name).expect("resolved during the symbol pass").clone();
            match sym.category {
                SymbolCategory::Parameter | SymbolCategory::Variable => {
                    emit_expr(ctx, value, labels, lines);
                    lines.push(format!("lstore {}", sym.index.expect("local slot assigned by the symbol pass")));
                }
                SymbolCategory::Property => {
                    lines.push(format!("lload {}", ctx.self_slot));
                    emit_expr(ctx, value, labels, lines);
                    lines.push(format!("fstore {}", sym.index.expect("property index assigned by the symbol pass")));
                }
                other => crate::bug!("'{name}' is not a valid assignment target ({other:?})"),
            }
        }
        ExprKind::Member { base, name } => {
            emit_expr(ctx, base, labels, lines);
            let idx = member_field_index(ctx, base, name);
            emit_expr(ctx, value, labels, lines);
            lines.push(format!("fstore {idx}"));
        }
        ExprKind::Index { list, index } => {
            emit_expr(ctx, list, labels, lines);
            emit_expr(ctx, index, labels, lines);
            emit_expr(ctx, value, labels, lines);
            lines.push("vstore".to_string());
        }
        _ => crate::bug!("invalid lvalue reached codegen; the symbol pass should have rejected it"),
    }
}

fn binary_mnemonic(op: BinaryOp, operand_ty: &Type) -> &'static str {
    use BinaryOp::*;
    match (op, operand_ty) {
        (And, _) => "iand",
        (Or, _) => "ior",
        (Rem, _) => "irem",
        (Add, Type::String) => "sadd",
        (Eq, Type::String) => "seq",
        (Ne, Type::String) => "sne",
        (Add, Type::Float) => "fadd",
        (Sub, Type::Float) => "fsub",
        (Mul, Type::Float) => "fmul",
        (Div, Type::Float) => "fdiv",
        (Eq, Type::Float) => "feq",
        (Ne, Type::Float) => "fne",
        (Lt, Type::Float) => "flt",
        (Gt, Type::Float) => "fgt",
        (Le, Type::Float) => "fle",
        (Ge, Type::Float) => "fge",
        (Add, _) => "iadd",
        (Sub, _) => "isub",
        (Mul, _) => "imul",
        (Div, _) => "idiv",
        (Eq, _) => "ieq",
        (Ne, _) => "ine",
        (Lt, _) => "ilt",
        (Gt, _) => "igt",
        (Le, _) => "ile",
        (Ge, _) => "ige",
    }
}

fn unary_mnemonic(op: UnaryOp, operand_ty: &Type) -> Option<&'static str> {
    match (op, operand_ty) {
        (UnaryOp::Plus, _) => None,
        (UnaryOp::Neg, Type::Float) => Some("fneg"),
        (UnaryOp::Neg, _) => Some("ineg"),
        (UnaryOp::Not, _) => Some("inot"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::sema;

    fn compile_lines(src: &str) -> Vec<String> {
        let mut unit = Parser::new(src).unwrap().parse_compile_unit().unwrap();
        let analysis = sema::analyze(&mut unit).expect("should analyze");
        emit(&analysis, &unit)
    }

    #[test]
    fn hello_rectangle_emits_struct_alloc_and_draw_opcode() {
        let lines = compile_lines(r#"Rectangle { x: 0 y: 0 width: 10 height: 10 fill_color: "red" }"#);
        assert!(lines.iter().any(|l| l == ".def main 0 1"));
        assert!(lines.iter().any(|l| l == "drawRect"));
        assert!(lines.iter().any(|l| l == "halt"));
    }

    #[test]
    fn arithmetic_property_emits_integer_opcodes() {
        let lines = compile_lines("def C { int w: 3 + 4 * 2; } C { w: 1 }");
        assert!(lines.iter().any(|l| l == "imul"));
        assert!(lines.iter().any(|l| l == "iadd"));
    }

    #[test]
    fn while_loop_emits_matching_label_pair() {
        let lines = compile_lines(
            "def C { int w: 0; def run() { int i: 0; while (i < 3) { i = i + 1; } } } C { w: 1 }",
        );
        assert!(lines.iter().any(|l| l == "brf .L1" || l.starts_with("brf")));
        assert!(lines.iter().any(|l| l.starts_with("br .L0") || l.starts_with("br")));
    }
}
