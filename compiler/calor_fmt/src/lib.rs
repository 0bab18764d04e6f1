//! Reverse emitter: AST back to canonical Calor text.
//!
//! Mirrors the parser's grammar in reverse. Every node re-emits its exact
//! canonical tag sequence with the node's original ID verbatim; arrow vs.
//! block form is reproduced from what the parser recorded, which is what
//! guarantees `parse ∘ emit ∘ parse = parse`. Only synthesized nodes (built
//! without source text) receive fresh IDs, from a counter scoped to this
//! call.

use calor_ir::{
    escape_literal, Body, ClassDecl, Constructor, ContractClause, ContractKind, Decl, Delegate,
    EnumDecl, EnumExtension, EnumVariant, Event, Expr, Field, Function, IdAllocator,
    InterfaceDecl, MatchCase, MatchExpr, Module, NodeId, Property, RecordDecl, Stmt, Tag,
    UnionDecl,
};

/// Serialize a module as canonical Calor text.
pub fn emit_calor(module: &Module) -> String {
    let mut emitter = CalorEmitter::new();
    emitter.emit_module(module, 0);
    emitter.finish()
}

/// Spaces per indent level in canonical output.
const INDENT_WIDTH: usize = 2;

struct CalorEmitter {
    out: String,
    /// Fresh IDs for synthesized scaffolding only; user IDs pass through.
    ids: IdAllocator,
}

impl CalorEmitter {
    fn new() -> Self {
        CalorEmitter {
            out: String::with_capacity(1024),
            ids: IdAllocator::new(),
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth * INDENT_WIDTH {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn finish(mut self) -> String {
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out
    }

    /// The node's ID text: verbatim for user IDs, freshly minted for
    /// synthesized nodes.
    fn id(&mut self, id: &NodeId) -> String {
        match id.as_user() {
            Some(id) => id.to_string(),
            None => self.ids.fresh(),
        }
    }

    fn open(tag: Tag, args: &str) -> String {
        format!("{tag}{{{args}}}")
    }

    fn close(tag: Tag, id: &str) -> String {
        format!("\u{00a7}/{}{{{id}}}", tag.name())
    }

    fn emit_module(&mut self, module: &Module, depth: usize) {
        let id = self.id(&module.id);
        self.line(depth, &Self::open(Tag::M, &format!("{id}:{}", module.name)));
        for (index, decl) in module.decls.iter().enumerate() {
            if index > 0 {
                self.out.push('\n');
            }
            self.emit_decl(decl, depth + 1);
        }
        self.line(depth, &Self::close(Tag::M, &id));
    }

    fn emit_decl(&mut self, decl: &Decl, depth: usize) {
        match decl {
            Decl::Module(m) => self.emit_module(m, depth),
            Decl::Function(f) => self.emit_function(f, depth),
            Decl::Class(c) => self.emit_class(c, depth),
            Decl::Interface(i) => self.emit_interface(i, depth),
            Decl::Enum(e) => self.emit_enum(e, depth),
            Decl::EnumExtension(ex) => self.emit_enum_extension(ex, depth),
            Decl::Record(r) => self.emit_record(r, depth),
            Decl::Union(u) => self.emit_union(u, depth),
            Decl::Field(f) => self.emit_field(f, depth),
            Decl::Property(p) => self.emit_property(p, depth),
            Decl::Constructor(ct) => self.emit_constructor(ct, depth),
            Decl::Delegate(d) => self.emit_delegate(d, depth),
            Decl::Event(ev) => self.emit_event(ev, depth),
        }
    }

    fn emit_function(&mut self, f: &Function, depth: usize) {
        let id = self.id(&f.id);
        let mut args = format!("{id}:{}:{}:{}", f.name, f.vis.shorthand(), f.ret);
        if f.is_async {
            args.push_str(":async");
        }
        if f.is_static {
            args.push_str(":static");
        }
        self.line(depth, &Self::open(Tag::F, &args));

        for param in &f.params {
            let param_id = self.id(&param.id);
            self.line(
                depth + 1,
                &Self::open(Tag::Pa, &format!("{param_id}:{}:{}", param.name, param.ty)),
            );
        }
        for clause in &f.contracts {
            self.emit_contract(clause, depth + 1);
        }
        if let Some(effects) = &f.effects {
            let effects_id = self.id(&effects.id);
            self.line(
                depth + 1,
                &Self::open(
                    Tag::Eff,
                    &format!("{effects_id}:{}", effects.effects.join(",")),
                ),
            );
        }
        for stmt in &f.body {
            self.emit_stmt(stmt, depth + 1);
        }
        self.line(depth, &Self::close(Tag::F, &id));
    }

    fn emit_contract(&mut self, clause: &ContractClause, depth: usize) {
        let tag = match clause.kind {
            ContractKind::Requires => Tag::Req,
            ContractKind::Ensures => Tag::Ens,
            ContractKind::Invariant => Tag::Inv,
        };
        let id = self.id(&clause.id);
        let mut args = format!("{id}:{}", clause.condition.pretty());
        if let Some(message) = &clause.message {
            args.push_str(&format!(":\"{}\"", escape_literal(message)));
        }
        self.line(depth, &Self::open(tag, &args));
    }

    fn emit_class(&mut self, class: &ClassDecl, depth: usize) {
        let id = self.id(&class.id);
        let mut args = format!("{id}:{}:{}", class.name, class.vis.shorthand());
        if class.base.is_some() || !class.interfaces.is_empty() {
            let mut heritage = Vec::new();
            if let Some(base) = &class.base {
                heritage.push(base.clone());
            }
            heritage.extend(class.interfaces.iter().cloned());
            args.push_str(&format!(":{}", heritage.join(",")));
        }
        self.line(depth, &Self::open(Tag::C, &args));
        for member in &class.members {
            self.emit_decl(member, depth + 1);
        }
        self.line(depth, &Self::close(Tag::C, &id));
    }

    fn emit_interface(&mut self, iface: &InterfaceDecl, depth: usize) {
        let id = self.id(&iface.id);
        self.line(
            depth,
            &Self::open(
                Tag::I,
                &format!("{id}:{}:{}", iface.name, iface.vis.shorthand()),
            ),
        );
        for member in &iface.members {
            self.emit_function(member, depth + 1);
        }
        self.line(depth, &Self::close(Tag::I, &id));
    }

    fn emit_enum(&mut self, e: &EnumDecl, depth: usize) {
        let id = self.id(&e.id);
        self.line(
            depth,
            &Self::open(Tag::E, &format!("{id}:{}:{}", e.name, e.vis.shorthand())),
        );
        for variant in &e.variants {
            self.emit_enum_variant(variant, depth + 1);
        }
        self.line(depth, &Self::close(Tag::E, &id));
    }

    fn emit_enum_extension(&mut self, ex: &EnumExtension, depth: usize) {
        let id = self.id(&ex.id);
        self.line(depth, &Self::open(Tag::Ex, &format!("{id}:{}", ex.enum_name)));
        for variant in &ex.variants {
            self.emit_enum_variant(variant, depth + 1);
        }
        self.line(depth, &Self::close(Tag::Ex, &id));
    }

    fn emit_enum_variant(&mut self, variant: &EnumVariant, depth: usize) {
        let id = self.id(&variant.id);
        let args = match variant.value {
            Some(value) => format!("{id}:{}:{value}", variant.name),
            None => format!("{id}:{}", variant.name),
        };
        self.line(depth, &Self::open(Tag::Ec, &args));
    }

    fn emit_record(&mut self, record: &RecordDecl, depth: usize) {
        let id = self.id(&record.id);
        self.line(
            depth,
            &Self::open(
                Tag::R,
                &format!("{id}:{}:{}", record.name, record.vis.shorthand()),
            ),
        );
        for component in &record.components {
            self.emit_field(component, depth + 1);
        }
        self.line(depth, &Self::close(Tag::R, &id));
    }

    fn emit_union(&mut self, union: &UnionDecl, depth: usize) {
        let id = self.id(&union.id);
        self.line(
            depth,
            &Self::open(
                Tag::U,
                &format!("{id}:{}:{}", union.name, union.vis.shorthand()),
            ),
        );
        for case in &union.cases {
            let case_id = self.id(&case.id);
            let mut args = format!("{case_id}:{}", case.name);
            for ty in &case.payload {
                args.push_str(&format!(":{ty}"));
            }
            self.line(depth + 1, &Self::open(Tag::Uc, &args));
        }
        self.line(depth, &Self::close(Tag::U, &id));
    }

    fn emit_field(&mut self, field: &Field, depth: usize) {
        let id = self.id(&field.id);
        let mut args = format!(
            "{id}:{}:{}:{}",
            field.name,
            field.vis.shorthand(),
            field.ty
        );
        if let Some(init) = &field.init {
            args.push_str(&format!(":{}", init.pretty()));
        }
        self.line(depth, &Self::open(Tag::Fl, &args));
    }

    fn emit_property(&mut self, property: &Property, depth: usize) {
        let id = self.id(&property.id);
        let mut args = format!(
            "{id}:{}:{}:{}",
            property.name,
            property.vis.shorthand(),
            property.ty
        );
        if property.has_get {
            args.push_str(":get");
        }
        if property.has_set {
            args.push_str(":set");
        }
        self.line(depth, &Self::open(Tag::Pr, &args));
    }

    fn emit_constructor(&mut self, ct: &Constructor, depth: usize) {
        let id = self.id(&ct.id);
        self.line(
            depth,
            &Self::open(Tag::Ct, &format!("{id}:{}", ct.vis.shorthand())),
        );
        for param in &ct.params {
            let param_id = self.id(&param.id);
            self.line(
                depth + 1,
                &Self::open(Tag::Pa, &format!("{param_id}:{}:{}", param.name, param.ty)),
            );
        }
        for stmt in &ct.body {
            self.emit_stmt(stmt, depth + 1);
        }
        self.line(depth, &Self::close(Tag::Ct, &id));
    }

    fn emit_delegate(&mut self, delegate: &Delegate, depth: usize) {
        let id = self.id(&delegate.id);
        self.line(
            depth,
            &Self::open(
                Tag::D,
                &format!(
                    "{id}:{}:{}:{}",
                    delegate.name,
                    delegate.vis.shorthand(),
                    delegate.ret
                ),
            ),
        );
        for param in &delegate.params {
            let param_id = self.id(&param.id);
            self.line(
                depth + 1,
                &Self::open(Tag::Pa, &format!("{param_id}:{}:{}", param.name, param.ty)),
            );
        }
        self.line(depth, &Self::close(Tag::D, &id));
    }

    fn emit_event(&mut self, event: &Event, depth: usize) {
        let id = self.id(&event.id);
        self.line(
            depth,
            &Self::open(
                Tag::Ev,
                &format!(
                    "{id}:{}:{}:{}",
                    event.name,
                    event.vis.shorthand(),
                    event.delegate
                ),
            ),
        );
    }

    fn emit_stmt(&mut self, stmt: &Stmt, depth: usize) {
        match stmt {
            Stmt::Bind(bind) => {
                let id = self.id(&bind.id);
                // A match value has no inline statement-context form; it
                // serializes as an `§MX` block inside the bind.
                if let Expr::Match(m) = &bind.value {
                    self.line(
                        depth,
                        &Self::open(Tag::B, &format!("{id}:{}:{}", bind.name, bind.ty)),
                    );
                    self.emit_match_expr(m, depth + 1);
                    self.line(depth, &Self::close(Tag::B, &id));
                } else {
                    self.line(
                        depth,
                        &Self::open(
                            Tag::B,
                            &format!("{id}:{}:{}:{}", bind.name, bind.ty, bind.value.pretty()),
                        ),
                    );
                }
            }
            Stmt::Assign(assign) => {
                let id = self.id(&assign.id);
                if let Expr::Match(m) = &assign.value {
                    self.line(depth, &Self::open(Tag::A, &format!("{id}:{}", assign.target)));
                    self.emit_match_expr(m, depth + 1);
                    self.line(depth, &Self::close(Tag::A, &id));
                } else {
                    self.line(
                        depth,
                        &Self::open(
                            Tag::A,
                            &format!("{id}:{}:{}", assign.target, assign.value.pretty()),
                        ),
                    );
                }
            }
            Stmt::Return(ret) => {
                let id = self.id(&ret.id);
                match &ret.value {
                    None => self.line(depth, &Self::open(Tag::Ret, &id)),
                    Some(Expr::Match(m)) => {
                        self.line(depth, &Self::open(Tag::Ret, &id));
                        self.emit_match_expr(m, depth + 1);
                        self.line(depth, &Self::close(Tag::Ret, &id));
                    }
                    Some(value) => {
                        self.line(
                            depth,
                            &Self::open(Tag::Ret, &format!("{id}:{}", value.pretty())),
                        );
                    }
                }
            }
            Stmt::If(if_stmt) => {
                let id = self.id(&if_stmt.id);
                let head = Self::open(Tag::If, &format!("{id}:{}", if_stmt.cond.pretty()));
                match (&if_stmt.then_body, &if_stmt.else_body) {
                    (Body::Arrow(expr), None) => {
                        self.line(depth, &format!("{head}\u{2192}{}", expr.pretty()));
                    }
                    (Body::Arrow(expr), Some(else_body)) => {
                        self.line(depth, &format!("{head}\u{2192}{}", expr.pretty()));
                        self.emit_else(else_body, &id, depth);
                        self.line(depth, &Self::close(Tag::If, &id));
                    }
                    (Body::Block(stmts), else_body) => {
                        self.line(depth, &head);
                        for stmt in stmts {
                            self.emit_stmt(stmt, depth + 1);
                        }
                        if let Some(else_body) = else_body {
                            self.emit_else(else_body, &id, depth);
                        }
                        self.line(depth, &Self::close(Tag::If, &id));
                    }
                }
            }
            Stmt::While(while_stmt) => {
                let id = self.id(&while_stmt.id);
                let head = Self::open(Tag::Wh, &format!("{id}:{}", while_stmt.cond.pretty()));
                self.emit_loop(&head, &while_stmt.body, Tag::Wh, &id, depth);
            }
            Stmt::DoWhile(do_stmt) => {
                let id = self.id(&do_stmt.id);
                let head = Self::open(Tag::Dw, &format!("{id}:{}", do_stmt.cond.pretty()));
                self.emit_loop(&head, &do_stmt.body, Tag::Dw, &id, depth);
            }
            Stmt::For(for_stmt) => {
                let id = self.id(&for_stmt.id);
                let mut args = format!(
                    "{id}:{}:{}:{}",
                    for_stmt.var,
                    for_stmt.from.pretty(),
                    for_stmt.to.pretty()
                );
                if let Some(step) = &for_stmt.step {
                    args.push_str(&format!(":{}", step.pretty()));
                }
                let head = Self::open(Tag::For, &args);
                self.emit_loop(&head, &for_stmt.body, Tag::For, &id, depth);
            }
            Stmt::Foreach(foreach) => {
                let id = self.id(&foreach.id);
                let head = Self::open(
                    Tag::Fe,
                    &format!("{id}:{}:{}", foreach.var, foreach.seq.pretty()),
                );
                self.emit_loop(&head, &foreach.body, Tag::Fe, &id, depth);
            }
            Stmt::Try(try_stmt) => {
                let id = self.id(&try_stmt.id);
                self.line(depth, &Self::open(Tag::Try, &id));
                for stmt in &try_stmt.body {
                    self.emit_stmt(stmt, depth + 1);
                }
                if let Some(catch) = &try_stmt.catch {
                    self.line(
                        depth,
                        &Self::open(Tag::Catch, &format!("{id}:{}:{}", catch.var, catch.ty)),
                    );
                    for stmt in &catch.body {
                        self.emit_stmt(stmt, depth + 1);
                    }
                }
                if let Some(finally) = &try_stmt.finally {
                    self.line(depth, &Self::open(Tag::Fin, &id));
                    for stmt in finally {
                        self.emit_stmt(stmt, depth + 1);
                    }
                }
                self.line(depth, &Self::close(Tag::Try, &id));
            }
            Stmt::Throw(throw) => {
                let id = self.id(&throw.id);
                self.line(
                    depth,
                    &Self::open(Tag::Th, &format!("{id}:{}", throw.value.pretty())),
                );
            }
            Stmt::Break(brk) => {
                let id = self.id(&brk.id);
                self.line(depth, &Self::open(Tag::Brk, &id));
            }
            Stmt::Continue(cont) => {
                let id = self.id(&cont.id);
                self.line(depth, &Self::open(Tag::Cont, &id));
            }
            Stmt::Print(print) => {
                let id = self.id(&print.id);
                self.line(
                    depth,
                    &Self::open(Tag::Prn, &format!("{id}:{}", print.value.pretty())),
                );
            }
            Stmt::CollectionOp(op_stmt) => {
                let id = self.id(&op_stmt.id);
                let mut args = format!("{id}:{}:{}", op_stmt.op.name(), op_stmt.target);
                for arg in &op_stmt.args {
                    args.push_str(&format!(":{}", arg.pretty()));
                }
                self.line(depth, &Self::open(Tag::Co, &args));
            }
            Stmt::Match(match_stmt) => {
                let id = self.id(&match_stmt.id);
                self.line(
                    depth,
                    &Self::open(Tag::Ma, &format!("{id}:{}", match_stmt.scrutinee.pretty())),
                );
                for case in &match_stmt.cases {
                    self.emit_case(case, depth + 1);
                }
                self.line(depth, &Self::close(Tag::Ma, &id));
            }
        }
    }

    fn emit_loop(&mut self, head: &str, body: &Body, tag: Tag, id: &str, depth: usize) {
        match body {
            Body::Arrow(expr) => {
                self.line(depth, &format!("{head}\u{2192}{}", expr.pretty()));
            }
            Body::Block(stmts) => {
                self.line(depth, head);
                for stmt in stmts {
                    self.emit_stmt(stmt, depth + 1);
                }
                self.line(depth, &Self::close(tag, id));
            }
        }
    }

    fn emit_else(&mut self, else_body: &Body, id: &str, depth: usize) {
        let head = Self::open(Tag::El, id);
        match else_body {
            Body::Arrow(expr) => {
                self.line(depth, &format!("{head}\u{2192}{}", expr.pretty()));
            }
            Body::Block(stmts) => {
                self.line(depth, &head);
                for stmt in stmts {
                    self.emit_stmt(stmt, depth + 1);
                }
            }
        }
    }

    /// The `§MX` marker distinguishes a match in expression position, so
    /// reparsing resolves the same expression node.
    fn emit_match_expr(&mut self, m: &MatchExpr, depth: usize) {
        let id = self.id(&m.id);
        self.line(
            depth,
            &Self::open(Tag::Mx, &format!("{id}:{}", m.scrutinee.pretty())),
        );
        for case in &m.cases {
            self.emit_case(case, depth + 1);
        }
        self.line(depth, &Self::close(Tag::Mx, &id));
    }

    fn emit_case(&mut self, case: &MatchCase, depth: usize) {
        let id = self.id(&case.id);
        let mut args = format!("{id}:{}", case.pattern.pretty());
        if let Some(guard) = &case.guard {
            args.push_str(&format!(":{}", guard.pretty()));
        }
        let head = Self::open(Tag::Cs, &args);
        match &case.body {
            Body::Arrow(expr) => {
                self.line(depth, &format!("{head}\u{2192}{}", expr.pretty()));
            }
            Body::Block(stmts) => {
                self.line(depth, &head);
                for stmt in stmts {
                    self.emit_stmt(stmt, depth + 1);
                }
                self.line(depth, &Self::close(Tag::Cs, &id));
            }
        }
    }
}

#[cfg(test)]
mod tests;
