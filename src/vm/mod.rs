//! Bytecode interpreter.
//!
//! A straightforward fetch-decode-execute loop over [`Program`]'s flat byte
//! array, with a locals arena shared by every frame (see
//! [`object::ObjectRef`] for why) and an operand stack of [`ObjectRef`]s.

pub mod frame;
pub mod object;

use crate::codegen::assembler::{ConstValue, Program};
use crate::codegen::opcode::Opcode;
use crate::draw::shapes::{Ellipse, Line, Polygon, Polyline, Rect, Text};
use crate::draw::DrawBackend;
use crate::error::VmError;
use frame::Frame;
use object::{Object, ObjectRef};

pub struct Vm<'a> {
    program: &'a Program,
    draw: &'a mut dyn DrawBackend,
    arena: Vec<Object>,
    frames: Vec<Frame>,
    stack: Vec<ObjectRef>,
    ip: u32,
}

impl<'a> Vm<'a> {
    pub fn new(program: &'a Program, draw: &'a mut dyn DrawBackend) -> Self {
        Self { program, draw, arena: Vec::new(), frames: Vec::new(), stack: Vec::new(), ip: 0 }
    }

    /// Runs `main` to completion (`halt`) and hands back the SVG the draw
    /// back end accumulated along the way.
    pub fn run(&mut self) -> Result<String, VmError> {
        let main = self.program.functions.iter().find(|f| f.name == "main").ok_or_else(|| VmError::Internal("no 'main' function in program".into()))?;
        self.push_frame(main.index, main.entry, main.args, main.locals, Vec::new());
        loop {
            let op = self.fetch_op();
            if self.step(op)? {
                break;
            }
        }
        Ok(self.draw.generate())
    }

    fn fetch_op(&mut self) -> Opcode {
        let byte = self.program.code[self.ip as usize];
        self.ip += 1;
        Opcode::from_byte(byte).unwrap_or_else(|| crate::bug!("invalid opcode byte {byte} at {}", self.ip - 1))
    }

    fn fetch_operand(&mut self) -> i32 {
        let bytes: [u8; 4] = self.program.code[self.ip as usize..self.ip as usize + 4].try_into().expect("operand is always 4 bytes");
        self.ip += 4;
        i32::from_le_bytes(bytes)
    }

    fn push_frame(&mut self, function_index: u32, entry: u32, args: u32, locals: u32, mut arg_values: Vec<Object>) {
        let size = (args + locals) as usize;
        let base = self.arena.len();
        arg_values.resize(size, Object::Int(0));
        self.arena.extend(arg_values);
        self.frames.push(Frame { function_index, return_addr: self.ip, base, size });
        self.ip = entry;
    }

    fn current_frame(&self) -> &Frame {
        self.frames.last().expect("dispatch never runs without an active frame")
    }

    fn slot(&self, local: u32) -> usize {
        self.current_frame().base + local as usize
    }

    fn push_owned(&mut self, v: Object) {
        self.stack.push(ObjectRef::Owned(v));
    }

    fn pop(&mut self) -> ObjectRef {
        self.stack.pop().expect("operand stack underflow means the emitter produced unbalanced code")
    }

    /// Reads a value off the stack by value, cloning out of the arena if it
    /// was a borrow.
    fn pop_value(&mut self) -> Object {
        match self.pop() {
            ObjectRef::Owned(v) => v,
            ObjectRef::Borrowed(slot) => self.arena[slot].clone(),
        }
    }

    fn pop_int(&mut self) -> i32 {
        self.pop_value().as_int()
    }

    fn pop_float(&mut self) -> f32 {
        self.pop_value().as_float()
    }

    fn pop_str(&mut self) -> String {
        match self.pop_value() {
            Object::Str(s) => s,
            other => crate::bug!("expected a Str operand, found {other:?}"),
        }
    }

    /// Requires the popped operand to be a live borrow; `fstore`/`vstore`
    /// both rely on this, since a store into an owned temporary would be
    /// discarded the instant it's popped.
    fn pop_borrowed_slot(&mut self) -> usize {
        match self.pop() {
            ObjectRef::Borrowed(slot) => slot,
            ObjectRef::Owned(v) => crate::bug!("store opcode requires a borrowed operand, found a temporary {v:?}"),
        }
    }

    fn step(&mut self, op: Opcode) -> Result<bool, VmError> {
        match op {
            Opcode::Iconst => {
                let v = self.fetch_operand();
                self.push_owned(Object::Int(v));
            }
            Opcode::Fconst => {
                let idx = self.fetch_operand() as usize;
                let v = match &self.program.constants[idx] {
                    ConstValue::Float(f) => *f,
                    other => crate::bug!("fconst operand pointed at a non-float constant {other:?}"),
                };
                self.push_owned(Object::Float(v));
            }
            Opcode::Sconst => {
                let idx = self.fetch_operand() as usize;
                let v = match &self.program.constants[idx] {
                    ConstValue::Str(s) => s.clone(),
                    other => crate::bug!("sconst operand pointed at a non-string constant {other:?}"),
                };
                self.push_owned(Object::Str(v));
            }
            Opcode::Struct => {
                let n = self.fetch_operand() as usize;
                self.push_owned(Object::Struct(vec![Object::Int(0); n]));
            }
            Opcode::Pop => {
                self.pop();
            }
            Opcode::Lload => {
                let i = self.fetch_operand() as u32;
                self.stack.push(ObjectRef::Borrowed(self.slot(i)));
            }
            Opcode::Lstore => {
                let i = self.fetch_operand() as u32;
                let v = self.pop_value();
                let slot = self.slot(i);
                self.arena[slot] = v;
            }
            Opcode::Fload => {
                let i = self.fetch_operand() as usize;
                let v = match self.pop() {
                    ObjectRef::Owned(o) => o.as_struct()[i].clone(),
                    ObjectRef::Borrowed(slot) => self.arena[slot].as_struct()[i].clone(),
                };
                self.push_owned(v);
            }
            Opcode::Fstore => {
                let value = self.pop_value();
                let i = self.fetch_operand_placeholder();
                let slot = self.pop_borrowed_slot();
                self.arena[slot].as_struct_mut()[i] = value;
            }
            Opcode::Gload | Opcode::Gstore => {
                crate::bug!("global lvalues are reserved but never emitted by this implementation")
            }
            Opcode::Vector => self.push_owned(Object::List(Vec::new())),
            Opcode::Vappend => {
                let value = self.pop_value();
                match self.pop() {
                    ObjectRef::Owned(mut list) => {
                        list.as_list_mut().push(value);
                        self.push_owned(list);
                    }
                    ObjectRef::Borrowed(slot) => {
                        self.arena[slot].as_list_mut().push(value);
                        self.stack.push(ObjectRef::Borrowed(slot));
                    }
                }
            }
            Opcode::Vload => {
                let index = self.pop_int() as usize;
                let v = self.pop_value();
                self.push_owned(v.as_list()[index].clone());
            }
            Opcode::Vstore => {
                let value = self.pop_value();
                let index = self.pop_int() as usize;
                let slot = self.pop_borrowed_slot();
                self.arena[slot].as_list_mut()[index] = value;
            }
            Opcode::Iadd => self.binary_int(|a, b| a + b),
            Opcode::Isub => self.binary_int(|a, b| a - b),
            Opcode::Imul => self.binary_int(|a, b| a * b),
            Opcode::Idiv => return self.checked_int_div(|a, b| a / b).map(|()| false),
            Opcode::Irem => return self.checked_int_div(|a, b| a % b).map(|()| false),
            Opcode::Ieq => return Ok(self.equality(true)),
            Opcode::Ine => return Ok(self.equality(false)),
            Opcode::Ilt => self.compare_int(|a, b| a < b),
            Opcode::Igt => self.compare_int(|a, b| a > b),
            Opcode::Ile => self.compare_int(|a, b| a <= b),
            Opcode::Ige => self.compare_int(|a, b| a >= b),
            Opcode::Ineg => {
                let v = self.pop_int();
                self.push_owned(Object::Int(-v));
            }
            Opcode::Iand => self.binary_int(|a, b| ((a != 0) && (b != 0)) as i32),
            Opcode::Ior => self.binary_int(|a, b| ((a != 0) || (b != 0)) as i32),
            Opcode::Inot => {
                let v = self.pop_int();
                self.push_owned(Object::Int((v == 0) as i32));
            }
            Opcode::Fadd => self.binary_float(|a, b| a + b),
            Opcode::Fsub => self.binary_float(|a, b| a - b),
            Opcode::Fmul => self.binary_float(|a, b| a * b),
            Opcode::Fdiv => self.binary_float(|a, b| a / b),
            Opcode::Feq => self.compare_float(|a, b| a == b),
            Opcode::Fne => self.compare_float(|a, b| a != b),
            Opcode::Flt => self.compare_float(|a, b| a < b),
            Opcode::Fgt => self.compare_float(|a, b| a > b),
            Opcode::Fle => self.compare_float(|a, b| a <= b),
            Opcode::Fge => self.compare_float(|a, b| a >= b),
            Opcode::Fneg => {
                let v = self.pop_float();
                self.push_owned(Object::Float(-v));
            }
            Opcode::Sadd => {
                let b = self.pop_str();
                let a = self.pop_str();
                self.push_owned(Object::Str(a + &b));
            }
            Opcode::Seq => self.compare_str(|a, b| a == b),
            Opcode::Sne => self.compare_str(|a, b| a != b),
            Opcode::Len => {
                let v = self.pop_value();
                self.push_owned(Object::Int(v.len_value()));
            }
            Opcode::Print => {
                let v = self.pop_value();
                println!("{}", display(&v));
            }
            Opcode::Br => {
                let target = self.fetch_operand();
                self.ip = target as u32;
            }
            Opcode::Brt => {
                let target = self.fetch_operand();
                if self.pop_int() != 0 {
                    self.ip = target as u32;
                }
            }
            Opcode::Brf => {
                let target = self.fetch_operand();
                if self.pop_int() == 0 {
                    self.ip = target as u32;
                }
            }
            Opcode::Call => {
                let func_index = self.fetch_operand() as u32;
                let func = self.program.function(func_index);
                let mut args = Vec::with_capacity(func.args as usize);
                for _ in 0..func.args {
                    args.push(self.pop_value());
                }
                args.reverse();
                self.push_frame(func.index, func.entry, func.args, func.locals, args);
            }
            Opcode::Ret => {
                let frame = self.frames.pop().expect("ret always runs inside a frame");
                self.arena.truncate(frame.base);
                self.ip = frame.return_addr;
                if self.frames.is_empty() {
                    return Ok(true);
                }
            }
            Opcode::Halt => return Ok(true),
            Opcode::DefineScene => {
                let fields = self.pop_scene_fields();
                self.draw.define_scene(fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]);
            }
            Opcode::PushOrigin => {
                let dy = self.pop_int();
                let dx = self.pop_int();
                self.draw.push_origin(dx, dy);
            }
            Opcode::PopOrigin => self.draw.pop_origin(),
            Opcode::DrawRect => {
                let f = self.pop_struct_fields(8);
                self.draw.draw_rect(Rect {
                    x: f[0].as_int(),
                    y: f[1].as_int(),
                    width: f[2].as_int(),
                    height: f[3].as_int(),
                    fill_color: f[4].as_str().to_string(),
                    stroke_color: f[5].as_str().to_string(),
                    stroke_dasharray: f[6].as_str().to_string(),
                    stroke_width: f[7].as_int(),
                });
            }
            Opcode::DrawText => {
                let f = self.pop_struct_fields(4);
                self.draw.draw_text(Text { x: f[0].as_int(), y: f[1].as_int(), size: f[2].as_int(), text: f[3].as_str().to_string() });
            }
            Opcode::DrawEllipse => {
                let f = self.pop_struct_fields(8);
                self.draw.draw_ellipse(Ellipse {
                    x: f[0].as_int(),
                    y: f[1].as_int(),
                    x_radius: f[2].as_int(),
                    y_radius: f[3].as_int(),
                    fill_color: f[4].as_str().to_string(),
                    stroke_color: f[5].as_str().to_string(),
                    stroke_dasharray: f[6].as_str().to_string(),
                    stroke_width: f[7].as_int(),
                });
            }
            Opcode::DrawPolygon => {
                let f = self.pop_struct_fields(8);
                self.draw.draw_polygon(Polygon {
                    x: f[0].as_int(),
                    y: f[1].as_int(),
                    points: points_of(&f[2]),
                    fill_color: f[3].as_str().to_string(),
                    fill_rule: f[4].as_str().to_string(),
                    stroke_color: f[5].as_str().to_string(),
                    stroke_dasharray: f[6].as_str().to_string(),
                    stroke_width: f[7].as_int(),
                });
            }
            Opcode::DrawLine => {
                let f = self.pop_struct_fields(9);
                self.draw.draw_line(Line {
                    x: f[0].as_int(),
                    y: f[1].as_int(),
                    dx2: f[4].as_int(),
                    dy2: f[5].as_int(),
                    stroke_color: f[6].as_str().to_string(),
                    stroke_dasharray: f[7].as_str().to_string(),
                    stroke_width: f[8].as_int(),
                });
            }
            Opcode::DrawPolyline => {
                let f = self.pop_struct_fields(6);
                self.draw.draw_polyline(Polyline {
                    x: f[0].as_int(),
                    y: f[1].as_int(),
                    points: points_of(&f[2]),
                    stroke_color: f[3].as_str().to_string(),
                    stroke_dasharray: f[4].as_str().to_string(),
                    stroke_width: f[5].as_int(),
                });
            }
        }
        Ok(false)
    }

    // `fstore`'s field index is a literal operand that must be fetched
    // after its value but before its struct borrow is popped, matching the
    // byte layout `fstore <i>` — this helper exists purely so that
    // ordering reads clearly above.
    fn fetch_operand_placeholder(&mut self) -> usize {
        self.fetch_operand() as usize
    }

    fn pop_scene_fields(&mut self) -> [i32; 6] {
        let fields = self.pop_value();
        let s = fields.as_struct();
        std::array::from_fn(|i| s[i].as_int())
    }

    fn pop_struct_fields(&mut self, n: usize) -> Vec<Object> {
        let v = self.pop_value();
        let fields = v.as_struct();
        assert_eq!(fields.len(), n, "shape struct field count mismatch");
        fields.to_vec()
    }

    fn binary_int(&mut self, f: impl Fn(i32, i32) -> i32) {
        let b = self.pop_int();
        let a = self.pop_int();
        self.push_owned(Object::Int(f(a, b)));
    }

    fn binary_float(&mut self, f: impl Fn(f32, f32) -> f32) {
        let b = self.pop_float();
        let a = self.pop_float();
        self.push_owned(Object::Float(f(a, b)));
    }

    fn compare_int(&mut self, f: impl Fn(i32, i32) -> bool) {
        let b = self.pop_int();
        let a = self.pop_int();
        self.push_owned(Object::Int(f(a, b) as i32));
    }

    fn compare_float(&mut self, f: impl Fn(f32, f32) -> bool) {
        let b = self.pop_float();
        let a = self.pop_float();
        self.push_owned(Object::Int(f(a, b) as i32));
    }

    fn compare_str(&mut self, f: impl Fn(&str, &str) -> bool) {
        let b = self.pop_str();
        let a = self.pop_str();
        self.push_owned(Object::Int(f(&a, &b) as i32));
    }

    /// `ieq`/`ine` are emitted for every equality comparison regardless of
    /// operand type — structs and lists compare elementwise by the
    /// language's rules, so dispatch has to look at what actually landed on
    /// the stack rather than trust the "integer" in the mnemonic.
    fn equality(&mut self, want_eq: bool) -> bool {
        let b = self.pop_value();
        let a = self.pop_value();
        let eq = a.value_eq(&b);
        self.push_owned(Object::Int((eq == want_eq) as i32));
        false
    }

    fn checked_int_div(&mut self, f: impl Fn(i32, i32) -> i32) -> Result<(), VmError> {
        let b = self.pop_int();
        let a = self.pop_int();
        if b == 0 {
            return Err(VmError::DivisionByZero { ip: self.ip as usize });
        }
        self.push_owned(Object::Int(f(a, b)));
        Ok(())
    }
}

fn points_of(list: &Object) -> Vec<(i32, i32)> {
    list.as_list().iter().map(|p| { let pair = p.as_list(); (pair[0].as_int(), pair[1].as_int()) }).collect()
}

fn display(v: &Object) -> String {
    match v {
        Object::Int(i) => i.to_string(),
        Object::Float(f) => f.to_string(),
        Object::Str(s) => s.clone(),
        Object::Struct(fields) => format!("{{{}}}", fields.iter().map(display).collect::<Vec<_>>().join(", ")),
        Object::List(items) => format!("[{}]", items.iter().map(display).collect::<Vec<_>>().join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{assembler, emit};
    use crate::draw::SvgBackend;
    use crate::parser::Parser;
    use crate::sema;

    fn run_source(src: &str) -> String {
        let mut unit = Parser::new(src).unwrap().parse_compile_unit().unwrap();
        let analysis = sema::analyze(&mut unit).expect("should analyze");
        let lines = emit::emit(&analysis, &unit);
        let program = assembler::assemble(&lines);
        let mut backend = SvgBackend::new();
        let mut vm = Vm::new(&program, &mut backend);
        vm.run().expect("should run")
    }

    #[test]
    fn hello_rectangle_produces_a_rect_element() {
        let svg = run_source(r#"Rectangle { x: 10 y: 10 width: 50 height: 30 fill_color: "red" }"#);
        assert!(svg.contains("<rect"));
        assert!(svg.contains(r#"x="10""#));
        assert!(svg.contains("fill:red"));
    }

    #[test]
    fn arithmetic_binding_evaluates_at_init_time() {
        let svg = run_source(r#"Text { x: 3 + 4 * 2 y: 0 size: 12 text: "hi" }"#);
        assert!(svg.contains(r#"x="11""#));
    }

    #[test]
    fn cross_instance_binding_reads_a_sibling_property() {
        let svg = run_source(
            r#"def Group { }
            Group {
                id: root
                Rectangle { id: a x: 0 y: 0 width: 20 height: 10 fill_color: "blue" }
                Rectangle { x: a.width + 5 y: 0 width: 5 height: 5 fill_color: "blue" }
            }"#,
        );
        assert!(svg.contains(r#"x="25""#));
    }
}
