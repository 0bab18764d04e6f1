//! Declaration emission.

use calor_diagnostic::{Diagnostic, ErrorCode};
use calor_ir::{
    ClassDecl, Constructor, Decl, Delegate, EnumDecl, EnumExtension, Event, Field, Function,
    InterfaceDecl, Module, Param, Property, RecordDecl, UnionDecl,
};

use crate::types::{ident, return_type, value_type, visibility};
use crate::stmt::FnCtx;
use crate::expr::ExprCtx;
use crate::CSharpEmitter;

impl CSharpEmitter {
    /// `module` → `namespace`; module-level functions are gathered into a
    /// static `Functions` class since the host has no free functions.
    pub(crate) fn emit_module(&mut self, module: &Module, depth: usize) {
        self.out.line(depth, &format!("namespace {}", ident(&module.name)));
        self.out.line(depth, "{");

        let mut first = true;
        for decl in &module.decls {
            if matches!(decl, Decl::Function(_)) {
                continue;
            }
            if !first {
                self.out.blank();
            }
            first = false;
            self.emit_decl(decl, depth + 1, None);
        }

        let functions: Vec<&Function> = module
            .decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Function(f) => Some(f),
                _ => None,
            })
            .collect();
        if !functions.is_empty() {
            if !first {
                self.out.blank();
            }
            self.out.line(depth + 1, "public static class Functions");
            self.out.line(depth + 1, "{");
            for (index, function) in functions.iter().enumerate() {
                if index > 0 {
                    self.out.blank();
                }
                self.emit_function(function, depth + 2, true);
            }
            self.out.line(depth + 1, "}");
        }

        self.out.line(depth, "}");
    }

    fn emit_decl(&mut self, decl: &Decl, depth: usize, container: Option<&str>) {
        match decl {
            Decl::Module(nested) => self.emit_module(nested, depth),
            Decl::Function(f) => self.emit_function(f, depth, false),
            Decl::Class(c) => self.emit_class(c, depth),
            Decl::Interface(i) => self.emit_interface(i, depth),
            Decl::Enum(e) => self.emit_enum(e, depth),
            Decl::EnumExtension(ex) => self.emit_enum_extension(ex, depth),
            Decl::Record(r) => self.emit_record(r, depth),
            Decl::Union(u) => self.emit_union(u, depth),
            Decl::Field(f) => self.emit_field(f, depth),
            Decl::Property(p) => self.emit_property(p, depth),
            Decl::Constructor(ct) => self.emit_constructor(ct, depth, container),
            Decl::Delegate(d) => self.emit_delegate(d, depth),
            Decl::Event(ev) => self.emit_event(ev, depth),
        }
    }

    /// Method signature and body, with contract lowering.
    pub(crate) fn emit_function(&mut self, f: &Function, depth: usize, force_static: bool) {
        let is_static = force_static || f.is_static;
        let signature = format!(
            "{} {}{}{} {}({})",
            visibility(f.vis),
            if is_static { "static " } else { "" },
            if f.is_async { "async " } else { "" },
            return_type(&f.ret, f.is_async),
            ident(&f.name),
            params_list(&f.params),
        );
        self.out.line(depth, &signature);
        self.out.line(depth, "{");
        self.emit_function_body(f, depth + 1);
        self.out.line(depth, "}");
    }

    fn emit_interface_member(&mut self, f: &Function, depth: usize) {
        self.out.line(
            depth,
            &format!(
                "{} {}({});",
                return_type(&f.ret, f.is_async),
                ident(&f.name),
                params_list(&f.params)
            ),
        );
    }

    fn emit_class(&mut self, class: &ClassDecl, depth: usize) {
        let mut heritage = Vec::new();
        if let Some(base) = &class.base {
            heritage.push(ident(base));
        }
        heritage.extend(class.interfaces.iter().map(|i| ident(i)));
        let heritage = if heritage.is_empty() {
            String::new()
        } else {
            format!(" : {}", heritage.join(", "))
        };

        self.out.line(
            depth,
            &format!("{} class {}{heritage}", visibility(class.vis), ident(&class.name)),
        );
        self.out.line(depth, "{");
        for (index, member) in class.members.iter().enumerate() {
            if index > 0 {
                self.out.blank();
            }
            self.emit_decl(member, depth + 1, Some(&class.name));
        }
        self.out.line(depth, "}");
    }

    fn emit_interface(&mut self, iface: &InterfaceDecl, depth: usize) {
        self.out.line(
            depth,
            &format!("{} interface {}", visibility(iface.vis), ident(&iface.name)),
        );
        self.out.line(depth, "{");
        for member in &iface.members {
            self.emit_interface_member(member, depth + 1);
        }
        self.out.line(depth, "}");
    }

    /// Enum with explicit backing values where given.
    fn emit_enum(&mut self, e: &EnumDecl, depth: usize) {
        self.out.line(
            depth,
            &format!("{} enum {}", visibility(e.vis), ident(&e.name)),
        );
        self.out.line(depth, "{");
        for variant in &e.variants {
            match variant.value {
                Some(value) => self
                    .out
                    .line(depth + 1, &format!("{} = {value},", ident(&variant.name))),
                None => self.out.line(depth + 1, &format!("{},", ident(&variant.name))),
            }
        }
        self.out.line(depth, "}");
    }

    /// The host has no open enums; an extension becomes a constants class.
    /// Extension variants therefore need explicit backing values.
    fn emit_enum_extension(&mut self, ex: &EnumExtension, depth: usize) {
        self.out.line(
            depth,
            &format!("public static class {}Extensions", ident(&ex.enum_name)),
        );
        self.out.line(depth, "{");
        for variant in &ex.variants {
            match variant.value {
                Some(value) => self.out.line(
                    depth + 1,
                    &format!(
                        "public const {} {} = ({})({value});",
                        ident(&ex.enum_name),
                        ident(&variant.name),
                        ident(&ex.enum_name)
                    ),
                ),
                None => {
                    self.report(
                        Diagnostic::error(ErrorCode::UnsupportedConstruct)
                            .with_message(format!(
                                "enum extension variant `{}` needs an explicit backing value",
                                variant.name
                            ))
                            .with_label(variant.span, "add `:value` to this variant"),
                    );
                }
            }
        }
        self.out.line(depth, "}");
    }

    /// Positional record.
    fn emit_record(&mut self, record: &RecordDecl, depth: usize) {
        let components = record
            .components
            .iter()
            .map(|c| format!("{} {}", value_type(&c.ty), ident(&c.name)))
            .collect::<Vec<_>>()
            .join(", ");
        self.out.line(
            depth,
            &format!(
                "{} record {}({components});",
                visibility(record.vis),
                ident(&record.name)
            ),
        );
    }

    /// A union lowers to an abstract record with one sealed nested record
    /// per case.
    fn emit_union(&mut self, union: &UnionDecl, depth: usize) {
        let union_name = ident(&union.name);
        self.out.line(
            depth,
            &format!("{} abstract record {union_name}", visibility(union.vis)),
        );
        self.out.line(depth, "{");
        for case in &union.cases {
            let payload = case
                .payload
                .iter()
                .enumerate()
                .map(|(index, ty)| format!("{} v{index}", value_type(ty)))
                .collect::<Vec<_>>()
                .join(", ");
            self.out.line(
                depth + 1,
                &format!(
                    "public sealed record {}({payload}) : {union_name};",
                    ident(&case.name)
                ),
            );
        }
        self.out.line(depth, "}");
    }

    fn emit_field(&mut self, field: &Field, depth: usize) {
        let init = match &field.init {
            Some(init) => format!(" = {}", self.emit_expr(init, ExprCtx::default())),
            None => String::new(),
        };
        self.out.line(
            depth,
            &format!(
                "{} {} {}{init};",
                visibility(field.vis),
                value_type(&field.ty),
                ident(&field.name)
            ),
        );
    }

    fn emit_property(&mut self, property: &Property, depth: usize) {
        let accessors = match (property.has_get, property.has_set) {
            (true, false) => "{ get; }",
            (false, true) => "{ set; }",
            _ => "{ get; set; }",
        };
        self.out.line(
            depth,
            &format!(
                "{} {} {} {accessors}",
                visibility(property.vis),
                value_type(&property.ty),
                ident(&property.name)
            ),
        );
    }

    fn emit_constructor(&mut self, ct: &Constructor, depth: usize, container: Option<&str>) {
        let class_name = container.unwrap_or("Anonymous");
        self.out.line(
            depth,
            &format!(
                "{} {}({})",
                visibility(ct.vis),
                ident(class_name),
                params_list(&ct.params)
            ),
        );
        self.out.line(depth, "{");
        let ctx = FnCtx { ensures: &[] };
        for stmt in &ct.body {
            self.emit_stmt(stmt, depth + 1, &ctx);
        }
        self.out.line(depth, "}");
    }

    fn emit_delegate(&mut self, delegate: &Delegate, depth: usize) {
        self.out.line(
            depth,
            &format!(
                "{} delegate {} {}({});",
                visibility(delegate.vis),
                return_type(&delegate.ret, false),
                ident(&delegate.name),
                params_list(&delegate.params)
            ),
        );
    }

    fn emit_event(&mut self, event: &Event, depth: usize) {
        self.out.line(
            depth,
            &format!(
                "{} event {} {};",
                visibility(event.vis),
                ident(&event.delegate),
                ident(&event.name)
            ),
        );
    }
}

pub(crate) fn params_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", value_type(&p.ty), ident(&p.name)))
        .collect::<Vec<_>>()
        .join(", ")
}
