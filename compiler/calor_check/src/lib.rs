//! Semantic and contract checker for Calor.
//!
//! Bottom-up type assignment per expression, scope resolution through the
//! nearest-enclosing chain (shadow-not-mutate), contract clause scoping, and
//! the declared language-semantics invariants the emitter relies on:
//! boolean contexts must type to boolean, loop bounds must be numeric,
//! narrowing requires an explicit cast, option/result values require an
//! explicit unwrap.
//!
//! A failing declaration never stops its siblings: every declaration is
//! checked in the same pass and all diagnostics accumulate.

mod expr;
mod prover;
mod relate;
mod scope;
mod stmt;

pub use prover::{ContractProver, NullProver, Proposition, ProverVerdict};
pub use relate::{compatible, unify, widens_to, Compat};
pub use scope::ScopeChain;

use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::trace;

use calor_diagnostic::suggest::suggest_similar;
use calor_diagnostic::{Diagnostic, ErrorCode, Suggestion};
use calor_ir::{
    ClassDecl, Constructor, ContractClause, ContractKind, Decl, EffectSet, Field, Function,
    Module, Span, TypeRef,
};

/// The advisory effect vocabulary. Effect declarations are metadata only;
/// nothing is cross-checked against the call graph.
pub const EFFECT_VOCABULARY: &[&str] = &["io", "net", "fs", "time", "rand", "mut", "throws"];

/// Result of checking a module.
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    /// One proposition per contract clause, for the external prover.
    pub propositions: Vec<Proposition>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Check a parsed module.
pub fn check(module: &Module) -> CheckResult {
    let mut checker = Checker::new();
    checker.collect_signatures(module);
    checker.check_module(module);
    CheckResult {
        diagnostics: checker.diagnostics,
        propositions: checker.propositions,
    }
}

/// Run every proposition through a prover, one deadline per clause.
pub fn prove_contracts(
    propositions: &[Proposition],
    prover: &dyn ContractProver,
    deadline: Duration,
) -> Vec<(Proposition, ProverVerdict)> {
    propositions
        .iter()
        .map(|p| (p.clone(), prover.prove(p, deadline)))
        .collect()
}

/// A callable signature.
#[derive(Clone, Debug)]
pub(crate) struct FuncSig {
    pub(crate) params: Vec<TypeRef>,
    pub(crate) ret: TypeRef,
    pub(crate) is_async: bool,
}

/// Which contract clause is being typed, if any. Controls the `result`
/// binding and the `contract_scope_violation` diagnostic.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum ContractCtx {
    None,
    Requires,
    Ensures,
}

pub(crate) struct Checker {
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) functions: FxHashMap<String, FuncSig>,
    pub(crate) type_names: Vec<String>,
    pub(crate) propositions: Vec<Proposition>,
    pub(crate) contract_ctx: ContractCtx,
}

impl Checker {
    fn new() -> Self {
        Checker {
            diagnostics: Vec::new(),
            functions: FxHashMap::default(),
            type_names: Vec::new(),
            propositions: Vec::new(),
            contract_ctx: ContractCtx::None,
        }
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// First pass: collect callable signatures and type names so forward
    /// references resolve.
    fn collect_signatures(&mut self, module: &Module) {
        for decl in &module.decls {
            match decl {
                Decl::Module(nested) => self.collect_signatures(nested),
                Decl::Function(f) => self.collect_function_sig(f),
                Decl::Class(c) => {
                    self.type_names.push(c.name.clone());
                    for member in &c.members {
                        if let Decl::Function(f) = member {
                            self.collect_function_sig(f);
                        }
                    }
                }
                Decl::Interface(i) => self.type_names.push(i.name.clone()),
                Decl::Enum(e) => self.type_names.push(e.name.clone()),
                Decl::EnumExtension(_) => {}
                Decl::Record(r) => self.type_names.push(r.name.clone()),
                Decl::Union(u) => self.type_names.push(u.name.clone()),
                Decl::Delegate(d) => self.type_names.push(d.name.clone()),
                Decl::Field(_) | Decl::Property(_) | Decl::Constructor(_) | Decl::Event(_) => {}
            }
        }
    }

    fn collect_function_sig(&mut self, f: &Function) {
        let sig = FuncSig {
            params: f.params.iter().map(|p| p.ty.clone()).collect(),
            ret: f.ret.clone(),
            is_async: f.is_async,
        };
        if self.functions.insert(f.name.clone(), sig).is_some() {
            self.report(
                Diagnostic::error(ErrorCode::Redeclaration)
                    .with_message(format!("function `{}` is declared twice", f.name))
                    .with_label(f.span, "second declaration"),
            );
        }
    }

    /// Check every declaration; one failure never hides a sibling.
    fn check_module(&mut self, module: &Module) {
        trace!(module = %module.name, "checking module");
        for decl in &module.decls {
            match decl {
                Decl::Module(nested) => self.check_module(nested),
                Decl::Function(f) => self.check_function(f, None),
                Decl::Class(c) => self.check_class(c),
                Decl::Interface(i) => {
                    for signature in &i.members {
                        self.check_effects(signature.effects.as_ref());
                    }
                }
                Decl::EnumExtension(ex) => {
                    if !self.type_names.iter().any(|n| n == &ex.enum_name) {
                        let suggestion = self.nearest_type(&ex.enum_name);
                        let mut diagnostic = Diagnostic::error(ErrorCode::UndefinedReference)
                            .with_message(format!(
                                "cannot extend unknown enum `{}`",
                                ex.enum_name
                            ))
                            .with_label(ex.span, "no such enum");
                        if let Some(candidate) = suggestion {
                            diagnostic =
                                diagnostic.with_suggestion(Suggestion::did_you_mean(candidate));
                        }
                        self.report(diagnostic);
                    }
                }
                Decl::Record(r) => {
                    for component in &r.components {
                        self.check_field_init(component, None);
                    }
                }
                Decl::Enum(_) | Decl::Union(_) | Decl::Delegate(_) => {}
                Decl::Field(f) => self.check_field_init(f, None),
                Decl::Property(_) | Decl::Constructor(_) | Decl::Event(_) => {}
            }
        }
    }

    fn check_class(&mut self, class: &ClassDecl) {
        // Class members are visible to every method body.
        let mut members = ScopeChain::new();
        for member in &class.members {
            let (name, ty, span) = match member {
                Decl::Field(f) => (&f.name, f.ty.clone(), f.span),
                Decl::Property(p) => (&p.name, p.ty.clone(), p.span),
                _ => continue,
            };
            if let Err(prior) = members.declare(name, ty, span) {
                self.report(
                    Diagnostic::error(ErrorCode::Redeclaration)
                        .with_message(format!("member `{name}` is declared twice"))
                        .with_label(span, "second declaration")
                        .with_secondary_label(prior, "first declared here"),
                );
            }
        }

        for member in &class.members {
            match member {
                Decl::Field(f) => self.check_field_init(f, Some(&members)),
                Decl::Function(f) => self.check_function(f, Some(&members)),
                Decl::Constructor(ct) => self.check_constructor(ct, &members),
                _ => {}
            }
        }
    }

    fn check_field_init(&mut self, field: &Field, members: Option<&ScopeChain>) {
        let Some(init) = &field.init else { return };
        let mut scope = match members {
            Some(members) => self.seed_scope(members),
            None => ScopeChain::new(),
        };
        let actual = self.type_of(init, &mut scope);
        self.require_compatible(&actual, &field.ty, init.span(), "field initializer");
    }

    fn check_constructor(&mut self, ct: &Constructor, members: &ScopeChain) {
        let mut scope = self.seed_scope(members);
        for param in &ct.params {
            if let Err(prior) = scope.declare(&param.name, param.ty.clone(), param.span) {
                self.report(
                    Diagnostic::error(ErrorCode::Redeclaration)
                        .with_message(format!("parameter `{}` is declared twice", param.name))
                        .with_label(param.span, "second declaration")
                        .with_secondary_label(prior, "first declared here"),
                );
            }
        }
        let ret = TypeRef::Unit;
        self.check_stmts(&ct.body, &mut scope, &ret);
    }

    /// Check one function: contracts against the parameter scope, effects
    /// against the vocabulary, the body against the declared return type.
    fn check_function(&mut self, f: &Function, members: Option<&ScopeChain>) {
        trace!(function = %f.name, "checking function");
        let mut scope = match members {
            Some(members) => self.seed_scope(members),
            None => ScopeChain::new(),
        };
        for param in &f.params {
            if let Err(prior) = scope.declare(&param.name, param.ty.clone(), param.span) {
                self.report(
                    Diagnostic::error(ErrorCode::Redeclaration)
                        .with_message(format!("parameter `{}` is declared twice", param.name))
                        .with_label(param.span, "second declaration")
                        .with_secondary_label(prior, "first declared here"),
                );
            }
        }

        for clause in &f.contracts {
            self.check_contract(clause, &f.name, &f.ret, &mut scope);
        }
        self.check_effects(f.effects.as_ref());

        scope.push();
        self.check_stmts(&f.body, &mut scope, &f.ret);
        scope.pop();
    }

    /// A requires clause typechecks against the parameter scope only; an
    /// ensures clause additionally sees an implicit `result` binding of the
    /// declared return type. No precondition may reference `result`.
    fn check_contract(
        &mut self,
        clause: &ContractClause,
        function: &str,
        ret: &TypeRef,
        scope: &mut ScopeChain,
    ) {
        let condition_ty = match clause.kind {
            ContractKind::Ensures => {
                scope.push();
                // Declaring `result` cannot collide: it is not a legal
                // parameter position name once declared here first.
                let _ = scope.declare("result", ret.clone(), clause.span);
                self.contract_ctx = ContractCtx::Ensures;
                let ty = self.type_of(&clause.condition, scope);
                self.contract_ctx = ContractCtx::None;
                scope.pop();
                ty
            }
            ContractKind::Requires | ContractKind::Invariant => {
                self.contract_ctx = ContractCtx::Requires;
                let ty = self.type_of(&clause.condition, scope);
                self.contract_ctx = ContractCtx::None;
                ty
            }
        };
        self.require_boolean(&condition_ty, clause.condition.span(), "contract condition");

        self.propositions.push(Proposition {
            clause_id: clause.id.clone(),
            function: function.to_string(),
            kind: clause.kind,
            condition: clause.condition.pretty(),
        });
    }

    fn check_effects(&mut self, effects: Option<&EffectSet>) {
        let Some(effects) = effects else { return };
        for effect in &effects.effects {
            if !EFFECT_VOCABULARY.contains(&effect.as_str()) {
                let mut diagnostic = Diagnostic::warning(ErrorCode::UnknownEffect)
                    .with_message(format!("unknown effect `{effect}`"))
                    .with_label(effects.span, "not in the effect vocabulary")
                    .with_note("effect tags are advisory metadata");
                if let Some(candidate) =
                    suggest_similar(effect, EFFECT_VOCABULARY.iter().copied())
                {
                    diagnostic = diagnostic.with_suggestion(Suggestion::did_you_mean(candidate));
                }
                self.report(diagnostic);
            }
        }
    }

    /// Copy class-member bindings into a fresh root frame.
    fn seed_scope(&self, members: &ScopeChain) -> ScopeChain {
        let mut scope = ScopeChain::new();
        for name in members.visible_names() {
            if let Some(ty) = members.lookup(name) {
                let _ = scope.declare(name, ty.clone(), Span::DUMMY);
            }
        }
        scope.push();
        scope
    }

    /// Report a `type_mismatch` (or narrowing / implicit-unwrap refinement)
    /// when `actual` does not fit `expected`.
    pub(crate) fn require_compatible(
        &mut self,
        actual: &TypeRef,
        expected: &TypeRef,
        span: Span,
        context: &str,
    ) {
        match compatible(actual, expected) {
            Compat::Ok => {}
            Compat::Narrowing => {
                self.report(
                    Diagnostic::error(ErrorCode::TypeMismatch)
                        .with_message(format!(
                            "narrowing conversion from `{actual}` to `{expected}` requires an explicit cast"
                        ))
                        .with_label(span, format!("this {context} is `{actual}`"))
                        .with_suggestion(Suggestion::text(format!(
                            "wrap the value in `(cast {expected} ...)`"
                        ))),
                );
            }
            Compat::ImplicitUnwrap => {
                self.report(
                    Diagnostic::error(ErrorCode::ImplicitUnwrap)
                        .with_message(format!(
                            "`{actual}` must be explicitly unwrapped to use it as `{expected}`"
                        ))
                        .with_label(span, "wrap in `(unwrap ...)` or match on it"),
                );
            }
            Compat::Mismatch => {
                self.report(
                    Diagnostic::error(ErrorCode::TypeMismatch)
                        .with_message(format!("expected `{expected}`, found `{actual}`"))
                        .with_label(span, format!("this {context} is `{actual}`")),
                );
            }
        }
    }

    /// Boolean-context check.
    pub(crate) fn require_boolean(&mut self, actual: &TypeRef, span: Span, context: &str) {
        if !matches!(actual, TypeRef::Bool | TypeRef::Obj) {
            self.report(
                Diagnostic::error(ErrorCode::TypeMismatch)
                    .with_message(format!("{context} must be boolean, found `{actual}`"))
                    .with_label(span, "expected `bool`"),
            );
        }
    }

    pub(crate) fn nearest_type(&self, name: &str) -> Option<&str> {
        suggest_similar(name, self.type_names.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests;
