//! The semantic pass: symbol definition, reference resolution, type
//! checking, index assignment, and dependency ordering.
//!
//! Runs in the three phases described by the data model: (1) structs and
//! component definitions, (2) the instance tree, (3) topological ordering
//! of the combined property/binding dependency graph. Phase boundaries are
//! hard — phase 2 assumes every component's properties and methods already
//! carry their final indices and edges from phase 1.

pub mod dependency;

use crate::ast::*;
use crate::error::SemanticError;
use crate::symbol::{ScopeCategory, ScopeId, Symbol, SymbolCategory, SymbolTable};
use crate::types::Type;
use dependency::SortResult;
use std::collections::HashMap;

/// One entry in the ordered member-init list: assign `field_index` of
/// `instance_id` next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInit {
    pub instance_id: String,
    pub field_index: u32,
}

/// Everything the code emitter needs from the semantic pass: the symbol
/// table plus the scope/field maps the emitter re-resolves names against,
/// so name resolution in codegen stays in lockstep with what type checking
/// already accepted.
pub struct AnalysisResult {
    pub table: SymbolTable,
    pub global_scope: ScopeId,
    pub main_scope: ScopeId,
    pub component_scopes: HashMap<String, ScopeId>,
    pub method_scopes: HashMap<(String, String), ScopeId>,
    pub instance_scopes: HashMap<String, ScopeId>,
    pub component_fields: HashMap<String, Vec<FieldInfo>>,
    pub struct_fields: HashMap<String, Vec<FieldInfo>>,
    pub components: HashMap<String, ComponentDef>,
    pub member_init_order: Vec<MemberInit>,
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub ty: Type,
    pub index: u32,
}

pub fn analyze(unit: &mut CompileUnit) -> Result<AnalysisResult, SemanticError> {
    let instance_count = unit.documents.iter().filter(|d| matches!(d, Document::Instance(_))).count();
    if instance_count != 1 {
        return Err(SemanticError::WrongInstanceDocumentCount { found: instance_count });
    }

    let mut az = Analyzer::new();
    az.phase1_definitions(unit)?;
    let mut edges = Vec::new();
    az.phase2_instances(unit, &mut edges)?;
    let member_init_order = az.phase3_order(unit, &edges)?;

    Ok(AnalysisResult {
        table: az.table,
        global_scope: az.global,
        main_scope: az.main_scope,
        component_scopes: az.component_scopes,
        method_scopes: az.method_scopes,
        instance_scopes: az.instance_scopes,
        component_fields: az.component_fields,
        struct_fields: az.struct_fields,
        components: az.components,
        member_init_order,
    })
}

struct Analyzer {
    table: SymbolTable,
    global: ScopeId,
    main_scope: ScopeId,
    component_scopes: HashMap<String, ScopeId>,
    /// Property name/type/index per component, available from the moment
    /// each property symbol is defined — independent of whether that
    /// component's own initializers have been type-checked yet, so a
    /// method body in component A can read a field of component B
    /// regardless of declaration order.
    component_fields: HashMap<String, Vec<FieldInfo>>,
    struct_fields: HashMap<String, Vec<FieldInfo>>,
    /// Snapshot of every component, taken once phase 1 finishes assigning
    /// field indices and property edges. Phases 2 and 3 read components by
    /// name only, never mutate them, so a snapshot stands in for the
    /// original's scope-held back-pointers to the component definition.
    components: HashMap<String, ComponentDef>,
    /// Retained so the code emitter can re-resolve names against the same
    /// scopes type checking used, rather than re-deriving resolution order.
    method_scopes: HashMap<(String, String), ScopeId>,
    instance_scopes: HashMap<String, ScopeId>,
}

impl Analyzer {
    fn new() -> Self {
        let mut table = SymbolTable::new();
        let global = table.create_scope(ScopeCategory::Global, None);
        register_builtins(&mut table, global);
        let mut az = Self {
            table,
            global,
            main_scope: ScopeId(0),
            component_scopes: HashMap::new(),
            component_fields: HashMap::new(),
            struct_fields: HashMap::new(),
            components: HashMap::new(),
            method_scopes: HashMap::new(),
            instance_scopes: HashMap::new(),
        };
        az.register_builtin_shapes();
        az
    }

    /// Registers the seven shape types as ordinary components so the
    /// instance-tree phase resolves `Rectangle { ... }` exactly like a
    /// user-defined component; only the code emitter treats them
    /// specially (lowering their `draw` step to a dedicated opcode).
    fn register_builtin_shapes(&mut self) {
        for shape in crate::builtin::shapes() {
            self.table
                .define(self.global, Symbol::new(shape.name, SymbolCategory::Component).with_type(Type::Custom(shape.name.to_string())));
            let scope = self.table.create_scope(ScopeCategory::Component, Some(self.global));
            let mut properties = Vec::with_capacity(shape.fields.len());
            let mut fields = Vec::with_capacity(shape.fields.len());
            for (i, field) in shape.fields.iter().enumerate() {
                self.table.define(
                    scope,
                    Symbol::new(field.name, SymbolCategory::Property).with_type(field.ty.clone()).with_index(i as u32),
                );
                fields.push(FieldInfo {
                    name: field.name.to_string(),
                    ty: field.ty.clone(),
                    index: i as u32,
                });
                properties.push(PropertyDecl {
                    name: field.name.to_string(),
                    ty: field.ty.clone(),
                    init: Expr::new(crate::builtin::default_literal(&field.ty), Span::default()),
                    owner: shape.name.to_string(),
                    field_index: Some(i as u32),
                    span: Span::default(),
                });
            }
            self.component_fields.insert(shape.name.to_string(), fields);
            self.component_scopes.insert(shape.name.to_string(), scope);
            self.components.insert(
                shape.name.to_string(),
                ComponentDef {
                    name: shape.name.to_string(),
                    properties,
                    methods: Vec::new(),
                    enums: Vec::new(),
                    property_edges: Vec::new(),
                    span: Span::default(),
                },
            );
        }
    }

    // ---- phase 1: structs and component definitions ----

    fn phase1_definitions(&mut self, unit: &mut CompileUnit) -> Result<(), SemanticError> {
        for doc in unit.documents.iter() {
            match doc {
                Document::Struct(s) => {
                    self.table
                        .define(self.global, Symbol::new(s.name.clone(), SymbolCategory::Struct).with_type(Type::Custom(s.name.clone())));
                }
                Document::Component(c) => {
                    self.table
                        .define(self.global, Symbol::new(c.name.clone(), SymbolCategory::Component).with_type(Type::Custom(c.name.clone())));
                }
                Document::Instance(_) => {}
            }
        }

        for doc in unit.documents.iter_mut() {
            if let Document::Struct(s) = doc {
                let scope = self.table.create_scope(ScopeCategory::Struct, Some(self.global));
                let mut fields = Vec::new();
                for (i, f) in s.fields.iter_mut().enumerate() {
                    f.field_index = Some(i as u32);
                    self.table
                        .define(scope, Symbol::new(f.name.clone(), SymbolCategory::Field).with_type(f.ty.clone()).with_index(i as u32));
                    fields.push(FieldInfo {
                        name: f.name.clone(),
                        ty: f.ty.clone(),
                        index: i as u32,
                    });
                }
                self.struct_fields.insert(s.name.clone(), fields);
            }
        }

        for doc in unit.documents.iter_mut() {
            if let Document::Component(c) = doc {
                let scope = self.table.create_scope(ScopeCategory::Component, Some(self.global));
                for en in c.enums.iter_mut() {
                    for (i, constant) in en.constants.iter_mut().enumerate() {
                        constant.value = Some(i as i32);
                        self.table.define(
                            scope,
                            Symbol::new(constant.name.clone(), SymbolCategory::EnumConstant)
                                .with_type(Type::Int)
                                .with_index(i as u32),
                        );
                    }
                    self.table
                        .define(scope, Symbol::new(en.name.clone(), SymbolCategory::Enum).with_type(Type::Custom(en.name.clone())));
                }
                let mut fields = Vec::new();
                for (i, p) in c.properties.iter_mut().enumerate() {
                    p.field_index = Some(i as u32);
                    p.owner = c.name.clone();
                    self.table.define(
                        scope,
                        Symbol::new(p.name.clone(), SymbolCategory::Property).with_type(p.ty.clone()).with_index(i as u32),
                    );
                    fields.push(FieldInfo {
                        name: p.name.clone(),
                        ty: p.ty.clone(),
                        index: i as u32,
                    });
                }
                self.component_fields.insert(c.name.clone(), fields);
                for m in c.methods.iter_mut() {
                    m.owner = Some(c.name.clone());
                    let param_types: Vec<Type> = m.params.iter().map(|p| p.ty.clone()).collect();
                    self.table.define(
                        scope,
                        Symbol::new(m.name.clone(), SymbolCategory::Method)
                            .with_type(Type::Void)
                            .with_owner(c.name.clone())
                            .with_params(param_types),
                    );
                }
                self.component_scopes.insert(c.name.clone(), scope);
            }
        }

        for doc in unit.documents.iter_mut() {
            if let Document::Component(c) = doc {
                let scope = self.component_scopes[&c.name];
                let mut edges = Vec::new();
                let property_names: std::collections::HashSet<String> =
                    c.properties.iter().map(|p| p.name.clone()).collect();
                for p in c.properties.iter_mut() {
                    let found = self.infer_type(&mut p.init, scope)?;
                    if !Type::assign_compatible(&p.ty, &found) {
                        return Err(SemanticError::TypeMismatch {
                            expected: p.ty.clone(),
                            found,
                            span: p.span,
                        });
                    }
                    let mut raw = Vec::new();
                    collect_property_edges(&p.init, &p.name, &mut raw);
                    for edge in raw {
                        if property_names.contains(&edge.src) {
                            edges.push(edge);
                        }
                    }
                }
                c.property_edges = edges;
            }
        }

        for doc in unit.documents.iter_mut() {
            if let Document::Component(c) = doc {
                let comp_scope = self.component_scopes[&c.name];
                for m in c.methods.iter_mut() {
                    let method_scope = self.table.create_scope(ScopeCategory::Method, Some(comp_scope));
                    let mut counter = 0u32;
                    self.table.define(
                        method_scope,
                        Symbol::new("self", SymbolCategory::Parameter).with_type(Type::Custom(c.name.clone())).with_index(counter),
                    );
                    counter += 1;
                    for param in m.params.iter_mut() {
                        param.local_index = Some(counter);
                        self.table.define(
                            method_scope,
                            Symbol::new(param.name.clone(), SymbolCategory::Parameter).with_type(param.ty.clone()).with_index(counter),
                        );
                        counter += 1;
                    }
                    self.analyze_stmt(&mut m.body, method_scope, &mut counter, 0)?;
                    m.local_count = Some(counter);
                    m.return_ty = infer_return_type(&m.body);
                    self.method_scopes.insert((c.name.clone(), m.name.clone()), method_scope);

                    let param_types: Vec<Type> = m.params.iter().map(|p| p.ty.clone()).collect();
                    self.table.define(
                        comp_scope,
                        Symbol::new(m.name.clone(), SymbolCategory::Method)
                            .with_type(m.return_ty.clone())
                            .with_owner(c.name.clone())
                            .with_params(param_types),
                    );
                }
            }
        }

        for doc in unit.documents.iter() {
            if let Document::Component(c) = doc {
                self.components.insert(c.name.clone(), c.clone());
            }
        }

        Ok(())
    }

    fn analyze_stmt(&mut self, stmt: &mut Stmt, scope: ScopeId, counter: &mut u32, loop_depth: u32) -> Result<(), SemanticError> {
        match &mut stmt.kind {
            StmtKind::Compound(stmts) => {
                for s in stmts.iter_mut() {
                    self.analyze_stmt(s, scope, counter, loop_depth)?;
                }
            }
            StmtKind::Decl(var) => {
                if let Some(init) = &mut var.init {
                    let found = self.infer_type(init, scope)?;
                    if !Type::assign_compatible(&var.ty, &found) {
                        return Err(SemanticError::TypeMismatch {
                            expected: var.ty.clone(),
                            found,
                            span: var.span,
                        });
                    }
                }
                var.local_index = Some(*counter);
                self.table
                    .define(scope, Symbol::new(var.name.clone(), SymbolCategory::Variable).with_type(var.ty.clone()).with_index(*counter));
                *counter += 1;
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let t = self.infer_type(cond, scope)?;
                if t != Type::Int {
                    return Err(SemanticError::TypeMismatch {
                        expected: Type::Int,
                        found: t,
                        span: cond.span,
                    });
                }
                self.analyze_stmt(then_branch, scope, counter, loop_depth)?;
                if let Some(e) = else_branch {
                    self.analyze_stmt(e, scope, counter, loop_depth)?;
                }
            }
            StmtKind::While { cond, body } => {
                let t = self.infer_type(cond, scope)?;
                if t != Type::Int {
                    return Err(SemanticError::TypeMismatch {
                        expected: Type::Int,
                        found: t,
                        span: cond.span,
                    });
                }
                self.analyze_stmt(body, scope, counter, loop_depth + 1)?;
            }
            StmtKind::Break => {
                if loop_depth == 0 {
                    return Err(SemanticError::MisplacedLoopControl { keyword: "break", span: stmt.span });
                }
            }
            StmtKind::Continue => {
                if loop_depth == 0 {
                    return Err(SemanticError::MisplacedLoopControl { keyword: "continue", span: stmt.span });
                }
            }
            StmtKind::Return(expr) => {
                if let Some(e) = expr {
                    self.infer_type(e, scope)?;
                }
            }
            StmtKind::Expr(e) => {
                self.infer_type(e, scope)?;
            }
        }
        Ok(())
    }

    fn infer_type(&mut self, expr: &mut Expr, scope: ScopeId) -> Result<Type, SemanticError> {
        let span = expr.span;
        let ty = match &mut expr.kind {
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::FloatLit(_) => Type::Float,
            ExprKind::StringLit(_) => Type::String,
            ExprKind::InitList(elems) => {
                let mut elem_ty = Type::Void;
                for (i, e) in elems.iter_mut().enumerate() {
                    let t = self.infer_type(e, scope)?;
                    if i == 0 {
                        elem_ty = t;
                    }
                }
                Type::list(elem_ty)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lt = self.infer_type(lhs, scope)?;
                let rt = self.infer_type(rhs, scope)?;
                binary_result_type(*op, &lt, &rt, span)?
            }
            ExprKind::Unary { op, operand } => {
                let t = self.infer_type(operand, scope)?;
                unary_result_type(*op, &t, span)?
            }
            ExprKind::Call { callee, args } => {
                let name = match &callee.kind {
                    ExprKind::Ref(n) => n.clone(),
                    _ => {
                        return Err(SemanticError::WrongSymbolCategory {
                            name: "<expr>".to_string(),
                            expected: "function",
                            found: "expression",
                            span,
                        })
                    }
                };
                let symbol = self
                    .table
                    .resolve(scope, &name)
                    .cloned()
                    .ok_or_else(|| SemanticError::UnresolvedName { name: name.clone(), span })?;
                if !matches!(symbol.category, SymbolCategory::Function | SymbolCategory::Method) {
                    return Err(SemanticError::WrongSymbolCategory {
                        name,
                        expected: "function",
                        found: symbol.category.describe(),
                        span,
                    });
                }
                if symbol.param_types.len() != args.len() {
                    return Err(SemanticError::ArityMismatch {
                        name,
                        expected: symbol.param_types.len(),
                        found: args.len(),
                        span,
                    });
                }
                let mut arg_types = Vec::with_capacity(args.len());
                for a in args.iter_mut() {
                    arg_types.push(self.infer_type(a, scope)?);
                }
                for (param, arg) in symbol.param_types.iter().zip(arg_types.iter()) {
                    if *param != Type::Void && !Type::assign_compatible(param, arg) {
                        return Err(SemanticError::TypeMismatch {
                            expected: param.clone(),
                            found: arg.clone(),
                            span,
                        });
                    }
                }
                symbol.ty.clone().unwrap_or(Type::Void)
            }
            ExprKind::Index { list, index } => {
                let lt = self.infer_type(list, scope)?;
                let it = self.infer_type(index, scope)?;
                if it != Type::Int {
                    return Err(SemanticError::TypeMismatch {
                        expected: Type::Int,
                        found: it,
                        span,
                    });
                }
                match lt {
                    Type::List(elem) => *elem,
                    other => {
                        return Err(SemanticError::WrongSymbolCategory {
                            name: "<index>".to_string(),
                            expected: "list",
                            found: type_kind_label(&other),
                            span,
                        })
                    }
                }
            }
            ExprKind::Member { base, name } => {
                let base_ty = self.infer_type(base, scope)?;
                match base_ty {
                    Type::Custom(owner) => self
                        .component_fields
                        .get(&owner)
                        .or_else(|| self.struct_fields.get(&owner))
                        .and_then(|fields| fields.iter().find(|f| &f.name == name))
                        .map(|f| f.ty.clone())
                        .ok_or_else(|| SemanticError::UnresolvedName { name: name.clone(), span })?,
                    other => {
                        return Err(SemanticError::WrongSymbolCategory {
                            name: name.clone(),
                            expected: "struct or component",
                            found: type_kind_label(&other),
                            span,
                        })
                    }
                }
            }
            ExprKind::Ref(name) => {
                let symbol = self.table.resolve(scope, name).ok_or_else(|| SemanticError::UnresolvedName { name: name.clone(), span })?;
                symbol.ty.clone().unwrap_or(Type::Void)
            }
            ExprKind::Assign { target, value } => {
                if !is_lvalue(target) {
                    return Err(SemanticError::InvalidLvalue { span });
                }
                let tt = self.infer_type(target, scope)?;
                let vt = self.infer_type(value, scope)?;
                if !Type::assign_compatible(&tt, &vt) {
                    return Err(SemanticError::TypeMismatch {
                        expected: tt,
                        found: vt,
                        span,
                    });
                }
                tt
            }
        };
        expr.ty = Some(ty.clone());
        Ok(ty)
    }

    // ---- phase 2: instance tree ----

    fn phase2_instances(&mut self, unit: &mut CompileUnit, edges: &mut Vec<(String, String)>) -> Result<(), SemanticError> {
        self.main_scope = self.table.create_scope(ScopeCategory::Method, Some(self.global));
        let mut counter = 0u32;
        for doc in unit.documents.iter_mut() {
            if let Document::Instance(root) = doc {
                self.walk_instance(root, None, None, &mut counter, edges)?;
            }
        }
        Ok(())
    }

    fn walk_instance(
        &mut self,
        inst: &mut ComponentInstance,
        parent_id: Option<String>,
        parent_component: Option<String>,
        counter: &mut u32,
        edges: &mut Vec<(String, String)>,
    ) -> Result<u32, SemanticError> {
        let component = self
            .components
            .get(&inst.component_name)
            .cloned()
            .ok_or_else(|| SemanticError::UnresolvedName {
                name: inst.component_name.clone(),
                span: inst.span,
            })?;

        let index = *counter;
        *counter += 1;
        inst.instance_index = Some(index);
        let id = inst.explicit_id.clone().unwrap_or_else(|| format!("#{index}"));

        if self.table.defined_locally(self.main_scope, &id) {
            return Err(SemanticError::DuplicateInstanceId { id, span: inst.span });
        }
        self.table
            .define(self.main_scope, Symbol::new(id.clone(), SymbolCategory::InstanceId).with_type(Type::Custom(inst.component_name.clone())));

        let instance_scope = self.table.create_scope(ScopeCategory::Instance, Some(self.main_scope));
        let comp_scope = self.component_scopes[&inst.component_name];
        self.table.set_component_scope(instance_scope, comp_scope);
        self.instance_scopes.insert(id.clone(), instance_scope);

        if let (Some(pid), Some(pcomp)) = (&parent_id, &parent_component) {
            self.table.define(
                instance_scope,
                Symbol::new("parent", SymbolCategory::Variable).with_type(Type::Custom(pcomp.clone())).with_owner(pid.clone()),
            );
        }

        for binding in inst.bindings.iter_mut() {
            let field_idx = component
                .property_index(&binding.property)
                .ok_or_else(|| SemanticError::UnresolvedName {
                    name: binding.property.clone(),
                    span: binding.span,
                })? as u32;
            binding.field_index = Some(field_idx);
            let current = format!("{id}[{field_idx}]");
            let expected_ty = component.properties[field_idx as usize].ty.clone();
            let found_ty = self.infer_type(&mut binding.value, instance_scope)?;
            if !Type::assign_compatible(&expected_ty, &found_ty) {
                return Err(SemanticError::TypeMismatch {
                    expected: expected_ty,
                    found: found_ty,
                    span: binding.span,
                });
            }
            self.collect_binding_edges(&binding.value, instance_scope, &current, &id, edges);
        }

        let mut size = 1;
        for child in inst.children.iter_mut() {
            size += self.walk_instance(child, Some(id.clone()), Some(inst.component_name.clone()), counter, edges)?;
        }
        inst.instance_tree_size = Some(size);
        Ok(size)
    }

    fn collect_binding_edges(&self, expr: &Expr, scope: ScopeId, current_binding_id: &str, self_instance_id: &str, edges: &mut Vec<(String, String)>) {
        match &expr.kind {
            ExprKind::Ref(name) => {
                if let Some(sym) = self.table.resolve(scope, name) {
                    if sym.category == SymbolCategory::Property {
                        if let Some(idx) = sym.index {
                            edges.push((current_binding_id.to_string(), format!("{self_instance_id}[{idx}]")));
                        }
                    }
                }
            }
            ExprKind::Member { base, name } => {
                if let ExprKind::Ref(base_name) = &base.kind {
                    if let Some(sym) = self.table.resolve(scope, base_name) {
                        let target_id = match sym.category {
                            SymbolCategory::InstanceId => Some(base_name.clone()),
                            SymbolCategory::Variable => sym.owner.clone(),
                            _ => None,
                        };
                        if let (Some(target_id), Some(Type::Custom(comp_name))) = (target_id, sym.ty.clone()) {
                            if let Some(fields) = self.component_fields.get(&comp_name) {
                                if let Some(f) = fields.iter().find(|f| f.name == *name) {
                                    edges.push((current_binding_id.to_string(), format!("{target_id}[{}]", f.index)));
                                }
                            }
                        }
                    }
                }
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.collect_binding_edges(lhs, scope, current_binding_id, self_instance_id, edges);
                self.collect_binding_edges(rhs, scope, current_binding_id, self_instance_id, edges);
            }
            ExprKind::Unary { operand, .. } => self.collect_binding_edges(operand, scope, current_binding_id, self_instance_id, edges),
            ExprKind::Call { args, .. } => {
                for a in args {
                    self.collect_binding_edges(a, scope, current_binding_id, self_instance_id, edges);
                }
            }
            ExprKind::Index { list, index } => {
                self.collect_binding_edges(list, scope, current_binding_id, self_instance_id, edges);
                self.collect_binding_edges(index, scope, current_binding_id, self_instance_id, edges);
            }
            ExprKind::InitList(elems) => {
                for e in elems {
                    self.collect_binding_edges(e, scope, current_binding_id, self_instance_id, edges);
                }
            }
            ExprKind::Assign { target, value } => {
                self.collect_binding_edges(target, scope, current_binding_id, self_instance_id, edges);
                self.collect_binding_edges(value, scope, current_binding_id, self_instance_id, edges);
            }
            ExprKind::IntLit(_) | ExprKind::FloatLit(_) | ExprKind::StringLit(_) => {}
        }
    }

    // ---- phase 3: member-init ordering ----

    fn phase3_order(&self, unit: &CompileUnit, extra_edges: &[(String, String)]) -> Result<Vec<MemberInit>, SemanticError> {
        let root = unit
            .documents
            .iter()
            .find_map(|d| if let Document::Instance(i) = d { Some(i) } else { None })
            .expect("exactly one instance document, checked in analyze()");

        let mut nodes = Vec::new();
        let mut edges = extra_edges.to_vec();
        self.collect_nodes_and_component_edges(root, &mut nodes, &mut edges);

        match dependency::topological_sort(&nodes, &edges) {
            SortResult::Success(order) => Ok(order.iter().map(|key| parse_binding_id(key)).collect()),
            SortResult::LoopDetected { witness } => Err(SemanticError::DependencyCycle { witness }),
            SortResult::EmptyGraph => Ok(Vec::new()),
        }
    }

    fn collect_nodes_and_component_edges(&self, inst: &ComponentInstance, nodes: &mut Vec<String>, edges: &mut Vec<(String, String)>) {
        let component = &self.components[&inst.component_name];
        let id = inst.instance_id();
        for idx in 0..component.properties.len() {
            nodes.push(format!("{id}[{idx}]"));
        }
        for pe in &component.property_edges {
            // A component-level default edge only applies when the instance
            // never overrides the destination property: an instance binding
            // replaces the default expression entirely, so the default's
            // dependency never gets evaluated for this instance.
            if inst.bindings.iter().any(|b| b.property == pe.dst) {
                continue;
            }
            let dst_idx = component.property_index(&pe.dst).expect("edge target collected from this component's own properties");
            let src_idx = component.property_index(&pe.src).expect("edge source collected from this component's own properties");
            edges.push((format!("{id}[{dst_idx}]"), format!("{id}[{src_idx}]")));
        }
        for child in &inst.children {
            self.collect_nodes_and_component_edges(child, nodes, edges);
        }
    }
}

fn register_builtins(table: &mut SymbolTable, global: ScopeId) {
    // Only names a method body can actually call appear here. The seven
    // shape draw opcodes are never invoked through `ExprKind::Call` — a
    // shape's fields come from the instance tree, not a call expression —
    // so they have no business being resolvable names in this scope.
    let builtins: &[(&str, &[Type], Type)] = &[
        ("len", &[Type::Void], Type::Int),
        ("print", &[Type::Void], Type::Void),
        ("pushOrigin", &[Type::Void, Type::Void], Type::Void),
        ("popOrigin", &[], Type::Void),
    ];
    for (name, params, ret) in builtins {
        table.define(
            global,
            Symbol::new(*name, SymbolCategory::Function).with_type(ret.clone()).with_params(params.to_vec()),
        );
    }
}

fn is_lvalue(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Ref(_) | ExprKind::Member { .. } | ExprKind::Index { .. })
}

fn type_kind_label(t: &Type) -> &'static str {
    match t {
        Type::Int => "int",
        Type::Float => "float",
        Type::String => "string",
        Type::Void => "void",
        Type::List(_) => "list",
        Type::Custom(_) => "custom",
    }
}

fn binary_result_type(op: BinaryOp, lt: &Type, rt: &Type, span: Span) -> Result<Type, SemanticError> {
    use BinaryOp::*;
    let mismatch = || SemanticError::TypeMismatch {
        expected: lt.clone(),
        found: rt.clone(),
        span,
    };
    match op {
        And | Or => {
            if *lt == Type::Int && *rt == Type::Int {
                Ok(Type::Int)
            } else {
                Err(mismatch())
            }
        }
        Lt | Gt | Le | Ge => {
            if lt == rt && lt.is_numeric() {
                Ok(Type::Int)
            } else {
                Err(mismatch())
            }
        }
        Eq | Ne => {
            if lt == rt {
                Ok(Type::Int)
            } else {
                Err(mismatch())
            }
        }
        Add => {
            if lt == rt && (lt.is_numeric() || *lt == Type::String) {
                Ok(lt.clone())
            } else {
                Err(mismatch())
            }
        }
        Sub | Mul | Div => {
            if lt == rt && lt.is_numeric() {
                Ok(lt.clone())
            } else {
                Err(mismatch())
            }
        }
        Rem => {
            if *lt == Type::Int && *rt == Type::Int {
                Ok(Type::Int)
            } else {
                Err(mismatch())
            }
        }
    }
}

fn unary_result_type(op: UnaryOp, t: &Type, span: Span) -> Result<Type, SemanticError> {
    match op {
        UnaryOp::Plus | UnaryOp::Neg => {
            if t.is_numeric() {
                Ok(t.clone())
            } else {
                Err(SemanticError::TypeMismatch {
                    expected: Type::Int,
                    found: t.clone(),
                    span,
                })
            }
        }
        UnaryOp::Not => {
            if *t == Type::Int {
                Ok(Type::Int)
            } else {
                Err(SemanticError::TypeMismatch {
                    expected: Type::Int,
                    found: t.clone(),
                    span,
                })
            }
        }
    }
}

fn collect_property_edges(expr: &Expr, dst: &str, edges: &mut Vec<PropertyEdge>) {
    match &expr.kind {
        ExprKind::Ref(name) => edges.push(PropertyEdge {
            dst: dst.to_string(),
            src: name.clone(),
        }),
        ExprKind::Binary { lhs, rhs, .. } => {
            collect_property_edges(lhs, dst, edges);
            collect_property_edges(rhs, dst, edges);
        }
        ExprKind::Unary { operand, .. } => collect_property_edges(operand, dst, edges),
        ExprKind::Call { args, .. } => {
            for a in args {
                collect_property_edges(a, dst, edges);
            }
        }
        ExprKind::Index { list, index } => {
            collect_property_edges(list, dst, edges);
            collect_property_edges(index, dst, edges);
        }
        ExprKind::Member { base, .. } => collect_property_edges(base, dst, edges),
        ExprKind::InitList(elems) => {
            for e in elems {
                collect_property_edges(e, dst, edges);
            }
        }
        ExprKind::Assign { target, value } => {
            collect_property_edges(target, dst, edges);
            collect_property_edges(value, dst, edges);
        }
        ExprKind::IntLit(_) | ExprKind::FloatLit(_) | ExprKind::StringLit(_) => {}
    }
}

fn infer_return_type(stmt: &Stmt) -> Type {
    match &stmt.kind {
        StmtKind::Return(Some(e)) => e.ty.clone().unwrap_or(Type::Void),
        StmtKind::Compound(stmts) => {
            for s in stmts {
                let t = infer_return_type(s);
                if t != Type::Void {
                    return t;
                }
            }
            Type::Void
        }
        StmtKind::If { then_branch, else_branch, .. } => {
            let t = infer_return_type(then_branch);
            if t != Type::Void {
                return t;
            }
            else_branch.as_ref().map(|e| infer_return_type(e)).unwrap_or(Type::Void)
        }
        StmtKind::While { body, .. } => infer_return_type(body),
        _ => Type::Void,
    }
}

fn parse_binding_id(key: &str) -> MemberInit {
    let open = key.find('[').expect("binding id always has the form id[index]");
    let close = key.find(']').expect("binding id always has the form id[index]");
    MemberInit {
        instance_id: key[..open].to_string(),
        field_index: key[open + 1..close].parse().expect("index portion of a binding id is always numeric"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn analyze_src(src: &str) -> Result<AnalysisResult, SemanticError> {
        let mut unit = Parser::new(src).unwrap().parse_compile_unit().unwrap();
        analyze(&mut unit)
    }

    #[test]
    fn single_instance_gets_full_member_init_order() {
        let analysis = analyze_src("def C { int width: 10; int height: 20; } C { width: 1 height: 2 }").expect("should analyze");
        assert_eq!(analysis.member_init_order.len(), 2);
        assert!(analysis.member_init_order.iter().all(|m| m.instance_id == "#0"));
    }

    #[test]
    fn arithmetic_property_resolves_without_edges() {
        let result = analyze_src("def C { int w: 3 + 4 * 2; } C { w: 1 }");
        assert!(result.is_ok());
    }

    #[test]
    fn cross_instance_binding_orders_producer_before_consumer() {
        let result = analyze_src("def C { int width: 0; } C { A { id: a width: 10 } B { id: b width: a.width + 5 } }");
        let analysis = result.expect("should analyze");
        let a_pos = analysis
            .member_init_order
            .iter()
            .position(|m| m.instance_id == "a" && m.field_index == 0)
            .unwrap();
        let b_pos = analysis
            .member_init_order
            .iter()
            .position(|m| m.instance_id == "b" && m.field_index == 0)
            .unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn self_dependency_cycle_is_rejected() {
        let result = analyze_src("def C { int p: q + 1; int q: p + 1; } C { id: root }");
        assert!(matches!(result, Err(SemanticError::DependencyCycle { .. })));
    }

    #[test]
    fn binding_one_side_of_a_would_be_cycle_breaks_it() {
        let result = analyze_src("def C { int p: q + 1; int q: p + 1; } C { p: 5 }");
        assert!(result.is_ok());
    }

    #[test]
    fn duplicate_instance_id_is_rejected() {
        let result = analyze_src("def C { int w: 0; } Scene { A { id: x w: 1 } A { id: x w: 2 } }");
        assert!(matches!(result, Err(SemanticError::DuplicateInstanceId { .. })));
    }

    #[test]
    fn binding_to_unknown_instance_is_unresolved_name() {
        let result = analyze_src("def C { int w: 0; } C { id: a w: missing.w }");
        assert!(matches!(result, Err(SemanticError::UnresolvedName { .. })));
    }

    #[test]
    fn wrong_instance_document_count_is_rejected() {
        let mut unit = Parser::new("def C { int w: 0; } C { w: 1 } C { w: 2 }").unwrap().parse_compile_unit().unwrap();
        assert!(matches!(analyze(&mut unit), Err(SemanticError::WrongInstanceDocumentCount { found: 2 })));
    }
}
