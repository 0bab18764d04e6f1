//! Declaration parsing.

use tracing::trace;

use calor_diagnostic::{Diagnostic, ErrorCode};
use calor_ir::{
    ClassDecl, Constructor, ContractClause, ContractKind, Decl, Delegate, EffectSet, EnumDecl,
    EnumExtension, EnumVariant, Event, Field, Function, InterfaceDecl, Module, OpKind, Param,
    Property, RecordDecl, Tag, TokenKind, UnionCase, UnionDecl, Visibility,
};

use crate::recovery::{synchronize, DECL_START};
use crate::{PResult, Parser, Recovered};

impl Parser<'_> {
    /// `§M{id:name}` declarations `§/M{id}`
    pub(crate) fn parse_module_decl(&mut self) -> PResult<Module> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a module name")?;
        self.close_args(delim)?;
        trace!(module = %name, "parsing module");

        let mut decls = Vec::new();
        while !self.check_tag_close(Tag::M) && !self.is_at_end() {
            match self.current_kind() {
                TokenKind::TagUnknown(_) => self.skip_unknown_tag(),
                _ => match self.parse_module_member() {
                    Ok(decl) => decls.push(decl),
                    Err(Recovered) => synchronize(&mut self.cursor, DECL_START),
                },
            }
        }
        let _ = self.parse_closing(Tag::M, &id);

        let span = open_span.merge(self.previous_span());
        Ok(Module {
            id: Self::node_id(id),
            name,
            decls,
            span,
        })
    }

    /// A declaration allowed directly inside a module.
    fn parse_module_member(&mut self) -> PResult<Decl> {
        let tag = match self.current_kind() {
            TokenKind::TagOpen(tag) => *tag,
            _ => return Err(self.unexpected("a declaration tag")),
        };
        match tag {
            Tag::M => self.parse_module_decl().map(Decl::Module),
            Tag::F => self.parse_function().map(Decl::Function),
            Tag::C => self.parse_class().map(Decl::Class),
            Tag::I => self.parse_interface().map(Decl::Interface),
            Tag::E => self.parse_enum().map(Decl::Enum),
            Tag::Ex => self.parse_enum_extension().map(Decl::EnumExtension),
            Tag::R => self.parse_record().map(Decl::Record),
            Tag::U => self.parse_union().map(Decl::Union),
            Tag::D => self.parse_delegate().map(Decl::Delegate),
            _ => Err(self.unexpected("a module-level declaration tag")),
        }
    }

    /// A declaration allowed inside a class body.
    fn parse_class_member(&mut self) -> PResult<Decl> {
        let tag = match self.current_kind() {
            TokenKind::TagOpen(tag) => *tag,
            _ => return Err(self.unexpected("a class member tag")),
        };
        match tag {
            Tag::Fl => self.parse_field().map(Decl::Field),
            Tag::Pr => self.parse_property().map(Decl::Property),
            Tag::Ct => self.parse_constructor().map(Decl::Constructor),
            Tag::F => self.parse_function().map(Decl::Function),
            Tag::Ev => self.parse_event().map(Decl::Event),
            _ => Err(self.unexpected("a class member tag")),
        }
    }

    /// `§F{id:name:vis:ret[:async][:static]}` params/contracts/effects,
    /// statements, `§/F{id}`
    pub(crate) fn parse_function(&mut self) -> PResult<Function> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a function name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.expect_colon()?;
        let ret = self.parse_type()?;

        let mut is_async = false;
        let mut is_static = false;
        while self.eat(&TokenKind::Colon) {
            let (flag, flag_span) = self.expect_ident("`async` or `static`")?;
            match flag.as_str() {
                "async" => is_async = true,
                "static" => is_static = true,
                _ => {
                    self.report(
                        Diagnostic::error(ErrorCode::UnexpectedToken)
                            .with_message(format!("unknown function flag `{flag}`"))
                            .with_label(flag_span, "expected `async` or `static`"),
                    );
                }
            }
        }
        self.close_args(delim)?;
        trace!(function = %name, "parsing function");

        let (params, contracts, effects) = self.parse_function_head();
        let body = self.parse_stmts_until(&[]);
        let _ = self.parse_closing(Tag::F, &id);

        let span = open_span.merge(self.previous_span());
        Ok(Function {
            id: Self::node_id(id),
            name,
            vis,
            ret,
            is_async,
            is_static,
            params,
            contracts,
            effects,
            body,
            span,
        })
    }

    /// Parameter, contract, and effect tags before the first statement.
    fn parse_function_head(
        &mut self,
    ) -> (Vec<Param>, Vec<ContractClause>, Option<EffectSet>) {
        let mut params = Vec::new();
        let mut contracts = Vec::new();
        let mut effects = None;
        loop {
            let tag = match self.current_kind() {
                TokenKind::TagOpen(tag) => *tag,
                _ => break,
            };
            let result = match tag {
                Tag::Pa => self.parse_param().map(|p| params.push(p)),
                Tag::Req => self
                    .parse_contract(ContractKind::Requires)
                    .map(|c| contracts.push(c)),
                Tag::Ens => self
                    .parse_contract(ContractKind::Ensures)
                    .map(|c| contracts.push(c)),
                Tag::Inv => self
                    .parse_contract(ContractKind::Invariant)
                    .map(|c| contracts.push(c)),
                Tag::Eff => self.parse_effects().map(|e| effects = Some(e)),
                _ => break,
            };
            if result.is_err() {
                synchronize(&mut self.cursor, DECL_START.union(crate::STMT_START));
            }
        }
        (params, contracts, effects)
    }

    /// `§PA{id:name:type}`
    fn parse_param(&mut self) -> PResult<Param> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a parameter name")?;
        self.expect_colon()?;
        let ty = self.parse_type()?;
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(Param {
            id: Self::node_id(id),
            name,
            ty,
            span,
        })
    }

    /// `§REQ{id:(cond)[:"message"]}` (likewise `§ENS`, `§INV`)
    fn parse_contract(&mut self, kind: ContractKind) -> PResult<ContractClause> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let condition = self.parse_expr()?;
        let message = if self.eat(&TokenKind::Colon) {
            match self.current_kind() {
                TokenKind::Str(text) => {
                    let text = text.clone();
                    self.advance();
                    Some(text)
                }
                _ => return Err(self.unexpected("a string message")),
            }
        } else {
            None
        };
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(ContractClause {
            id: Self::node_id(id),
            kind,
            condition,
            message,
            span,
        })
    }

    /// `§EFF{id:eff,eff,...}`
    fn parse_effects(&mut self) -> PResult<EffectSet> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let mut effects = Vec::new();
        let (first, _) = self.expect_ident("an effect name")?;
        effects.push(first);
        while self.eat(&TokenKind::Comma) {
            let (next, _) = self.expect_ident("an effect name")?;
            effects.push(next);
        }
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(EffectSet {
            id: Self::node_id(id),
            effects,
            span,
        })
    }

    /// `§C{id:name:vis[:base[,iface...]]}` members `§/C{id}`
    fn parse_class(&mut self) -> PResult<ClassDecl> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a class name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;

        let mut base = None;
        let mut interfaces = Vec::new();
        if self.eat(&TokenKind::Colon) {
            let (first, _) = self.expect_ident("a base type")?;
            base = Some(first);
            while self.eat(&TokenKind::Comma) {
                let (iface, _) = self.expect_ident("an interface name")?;
                interfaces.push(iface);
            }
        }
        self.close_args(delim)?;

        let mut members = Vec::new();
        while !self.check_tag_close(Tag::C) && !self.is_at_end() {
            match self.current_kind() {
                TokenKind::TagUnknown(_) => self.skip_unknown_tag(),
                _ => match self.parse_class_member() {
                    Ok(member) => members.push(member),
                    Err(Recovered) => synchronize(&mut self.cursor, DECL_START),
                },
            }
        }
        let _ = self.parse_closing(Tag::C, &id);

        let span = open_span.merge(self.previous_span());
        Ok(ClassDecl {
            id: Self::node_id(id),
            name,
            vis,
            base,
            interfaces,
            members,
            span,
        })
    }

    /// `§I{id:name:vis}` signatures `§/I{id}`
    fn parse_interface(&mut self) -> PResult<InterfaceDecl> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("an interface name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.close_args(delim)?;

        let mut members = Vec::new();
        while !self.check_tag_close(Tag::I) && !self.is_at_end() {
            match self.current_kind() {
                TokenKind::TagUnknown(_) => self.skip_unknown_tag(),
                TokenKind::TagOpen(Tag::F) => match self.parse_function() {
                    Ok(function) => {
                        if !function.body.is_empty() {
                            self.report(
                                Diagnostic::error(ErrorCode::UnexpectedToken)
                                    .with_message(format!(
                                        "interface method `{}` must not have a body",
                                        function.name
                                    ))
                                    .with_label(function.span, "remove the body"),
                            );
                        }
                        members.push(function);
                    }
                    Err(Recovered) => synchronize(&mut self.cursor, DECL_START),
                },
                _ => {
                    let _ = self.unexpected("a `\u{00a7}F` method signature");
                    synchronize(&mut self.cursor, DECL_START);
                }
            }
        }
        let _ = self.parse_closing(Tag::I, &id);

        let span = open_span.merge(self.previous_span());
        Ok(InterfaceDecl {
            id: Self::node_id(id),
            name,
            vis,
            members,
            span,
        })
    }

    /// `§E{id:name:vis}` variants `§/E{id}`
    fn parse_enum(&mut self) -> PResult<EnumDecl> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("an enum name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.close_args(delim)?;

        let variants = self.parse_enum_variants(Tag::E);
        let _ = self.parse_closing(Tag::E, &id);

        let span = open_span.merge(self.previous_span());
        Ok(EnumDecl {
            id: Self::node_id(id),
            name,
            vis,
            variants,
            span,
        })
    }

    /// `§EX{id:enum-name}` variants `§/EX{id}`
    fn parse_enum_extension(&mut self) -> PResult<EnumExtension> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (enum_name, _) = self.expect_ident("the extended enum's name")?;
        self.close_args(delim)?;

        let variants = self.parse_enum_variants(Tag::Ex);
        let _ = self.parse_closing(Tag::Ex, &id);

        let span = open_span.merge(self.previous_span());
        Ok(EnumExtension {
            id: Self::node_id(id),
            enum_name,
            variants,
            span,
        })
    }

    fn parse_enum_variants(&mut self, enclosing: Tag) -> Vec<EnumVariant> {
        let mut variants = Vec::new();
        while !self.check_tag_close(enclosing) && !self.is_at_end() {
            match self.current_kind() {
                TokenKind::TagUnknown(_) => self.skip_unknown_tag(),
                TokenKind::TagOpen(Tag::Ec) => match self.parse_enum_variant() {
                    Ok(variant) => variants.push(variant),
                    Err(Recovered) => synchronize(&mut self.cursor, DECL_START),
                },
                _ => {
                    let _ = self.unexpected("a `\u{00a7}EC` variant tag");
                    synchronize(&mut self.cursor, DECL_START);
                }
            }
        }
        variants
    }

    /// `§EC{id:name[:value]}`
    fn parse_enum_variant(&mut self) -> PResult<EnumVariant> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a variant name")?;
        let value = if self.eat(&TokenKind::Colon) {
            Some(self.parse_enum_value()?)
        } else {
            None
        };
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(EnumVariant {
            id: Self::node_id(id),
            name,
            value,
            span,
        })
    }

    /// An optionally negated integer backing value.
    fn parse_enum_value(&mut self) -> PResult<i64> {
        let negative = self.eat(&TokenKind::Op(OpKind::Minus));
        match self.current_kind() {
            TokenKind::Int(value) => {
                let value = *value;
                self.advance();
                let value = i64::try_from(value).unwrap_or(0);
                Ok(if negative { -value } else { value })
            }
            _ => Err(self.unexpected("an integer backing value")),
        }
    }

    /// `§R{id:name:vis}` components `§/R{id}`
    fn parse_record(&mut self) -> PResult<RecordDecl> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a record name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.close_args(delim)?;

        let mut components = Vec::new();
        while !self.check_tag_close(Tag::R) && !self.is_at_end() {
            match self.current_kind() {
                TokenKind::TagUnknown(_) => self.skip_unknown_tag(),
                TokenKind::TagOpen(Tag::Fl) => match self.parse_field() {
                    Ok(field) => components.push(field),
                    Err(Recovered) => synchronize(&mut self.cursor, DECL_START),
                },
                _ => {
                    let _ = self.unexpected("a `\u{00a7}FL` component tag");
                    synchronize(&mut self.cursor, DECL_START);
                }
            }
        }
        let _ = self.parse_closing(Tag::R, &id);

        let span = open_span.merge(self.previous_span());
        Ok(RecordDecl {
            id: Self::node_id(id),
            name,
            vis,
            components,
            span,
        })
    }

    /// `§U{id:name:vis}` cases `§/U{id}`
    fn parse_union(&mut self) -> PResult<UnionDecl> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a union name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.close_args(delim)?;

        let mut cases = Vec::new();
        while !self.check_tag_close(Tag::U) && !self.is_at_end() {
            match self.current_kind() {
                TokenKind::TagUnknown(_) => self.skip_unknown_tag(),
                TokenKind::TagOpen(Tag::Uc) => match self.parse_union_case() {
                    Ok(case) => cases.push(case),
                    Err(Recovered) => synchronize(&mut self.cursor, DECL_START),
                },
                _ => {
                    let _ = self.unexpected("a `\u{00a7}UC` case tag");
                    synchronize(&mut self.cursor, DECL_START);
                }
            }
        }
        let _ = self.parse_closing(Tag::U, &id);

        let span = open_span.merge(self.previous_span());
        Ok(UnionDecl {
            id: Self::node_id(id),
            name,
            vis,
            cases,
            span,
        })
    }

    /// `§UC{id:name[:type...]}`
    fn parse_union_case(&mut self) -> PResult<UnionCase> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a case name")?;
        let mut payload = Vec::new();
        while self.eat(&TokenKind::Colon) {
            payload.push(self.parse_type()?);
        }
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(UnionCase {
            id: Self::node_id(id),
            name,
            payload,
            span,
        })
    }

    /// `§FL{id:name:vis:type[:(init)]}`
    fn parse_field(&mut self) -> PResult<Field> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a field name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.expect_colon()?;
        let ty = self.parse_type()?;
        let init = if self.eat(&TokenKind::Colon) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(Field {
            id: Self::node_id(id),
            name,
            vis,
            ty,
            init,
            span,
        })
    }

    /// `§PR{id:name:vis:type[:get][:set]}`
    fn parse_property(&mut self) -> PResult<Property> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a property name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.expect_colon()?;
        let ty = self.parse_type()?;

        let mut has_get = false;
        let mut has_set = false;
        while self.eat(&TokenKind::Colon) {
            let (accessor, accessor_span) = self.expect_ident("`get` or `set`")?;
            match accessor.as_str() {
                "get" => has_get = true,
                "set" => has_set = true,
                _ => {
                    self.report(
                        Diagnostic::error(ErrorCode::UnexpectedToken)
                            .with_message(format!("unknown accessor `{accessor}`"))
                            .with_label(accessor_span, "expected `get` or `set`"),
                    );
                }
            }
        }
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(Property {
            id: Self::node_id(id),
            name,
            vis,
            ty,
            has_get,
            has_set,
            span,
        })
    }

    /// `§CT{id:vis}` params, statements, `§/CT{id}`
    fn parse_constructor(&mut self) -> PResult<Constructor> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.close_args(delim)?;

        let mut params = Vec::new();
        while self.check_tag_open(Tag::Pa) {
            match self.parse_param() {
                Ok(param) => params.push(param),
                Err(Recovered) => synchronize(&mut self.cursor, DECL_START.union(crate::STMT_START)),
            }
        }
        let body = self.parse_stmts_until(&[]);
        let _ = self.parse_closing(Tag::Ct, &id);

        let span = open_span.merge(self.previous_span());
        Ok(Constructor {
            id: Self::node_id(id),
            vis,
            params,
            body,
            span,
        })
    }

    /// `§D{id:name:vis:ret}` params `§/D{id}`
    fn parse_delegate(&mut self) -> PResult<Delegate> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a delegate name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.expect_colon()?;
        let ret = self.parse_type()?;
        self.close_args(delim)?;

        let mut params = Vec::new();
        while self.check_tag_open(Tag::Pa) {
            match self.parse_param() {
                Ok(param) => params.push(param),
                Err(Recovered) => synchronize(&mut self.cursor, DECL_START),
            }
        }
        let _ = self.parse_closing(Tag::D, &id);

        let span = open_span.merge(self.previous_span());
        Ok(Delegate {
            id: Self::node_id(id),
            name,
            vis,
            ret,
            params,
            span,
        })
    }

    /// `§EV{id:name:vis:delegate}`
    fn parse_event(&mut self) -> PResult<Event> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, id_span) = self.parse_id()?;
        self.register_decl_id(&id, id_span);
        self.expect_colon()?;
        let (name, _) = self.expect_ident("an event name")?;
        self.expect_colon()?;
        let vis = self.parse_visibility()?;
        self.expect_colon()?;
        let (delegate, _) = self.expect_ident("a delegate type")?;
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(Event {
            id: Self::node_id(id),
            name,
            vis,
            delegate,
            span,
        })
    }

    /// Visibility shorthand: `pub`, `pri`, `pro`, `int`.
    fn parse_visibility(&mut self) -> PResult<Visibility> {
        let (text, span) = self.expect_ident("a visibility shorthand")?;
        match Visibility::from_shorthand(&text) {
            Some(vis) => Ok(vis),
            None => {
                self.report(
                    Diagnostic::error(ErrorCode::UnexpectedToken)
                        .with_message(format!("unknown visibility `{text}`"))
                        .with_label(span, "expected `pub`, `pri`, `pro`, or `int`"),
                );
                Ok(Visibility::Public)
            }
        }
    }
}
