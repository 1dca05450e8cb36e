//! Orchestration: drives every rule in `spec.md` §4.3 over a parsed
//! [`Module`] and returns the accumulated diagnostics. No type inference —
//! every rule here is structural or name-based.

use tol_base::Diagnostic;
use tol_syntax::ast::{ConstructorDecl, FallbackDecl, FunctionDecl, Module};

use crate::exprs::ExprChecker;
use crate::flow;
use crate::names;
use crate::selectors;
use crate::symbols::ContractSymbols;

/// Checks a parsed module and returns every diagnostic found. An empty
/// result means the module is ready for lowering (`spec.md` §4.3 "Output").
#[tracing::instrument(skip(module), fields(contract = %module.contract.name))]
pub fn check(module: &Module, file: &str) -> Vec<Diagnostic> {
    let contract = &module.contract;
    let mut out = Vec::new();

    names::check_reserved(&contract.name, contract.name_span, &contract.name, file, &mut out);
    names::check_name_uniqueness(contract, file, &mut out);
    selectors::check_selector_overrides(contract, file, &mut out);

    let symbols = ContractSymbols::build(contract);
    let expr_checker = ExprChecker { contract_name: &contract.name, symbols: &symbols, has_events: !contract.events.is_empty(), file };

    for func in &contract.functions {
        check_function(func, &expr_checker, file, &mut out);
    }

    if let Some(ctor) = &contract.constructor {
        check_constructor(ctor, &expr_checker, file, &mut out);
    }

    if let Some(fallback) = &contract.fallback {
        check_fallback(fallback, &expr_checker, file, &mut out);
    }

    for diag in &out {
        tol_base::trace_diagnostic(diag);
    }
    out
}

fn check_function(func: &FunctionDecl, expr_checker: &ExprChecker<'_>, file: &str, out: &mut Vec<Diagnostic>) {
    names::check_modifiers(&func.modifiers, false, file, out);
    let is_void = func.returns.is_empty();
    let terminates = flow::check_body(&func.body, is_void, file, out);
    if !is_void && !terminates {
        out.push(Diagnostic::new(
            crate::codes::UNREACHABLE_OR_MISSING_RETURN,
            format!("function '{}' does not return on every path", func.name),
            file,
            func.span,
        ));
    }
    names::check_local_scopes(&func.params, &func.returns, &func.body, file, out);
    for stmt in &func.body {
        expr_checker.check_statement(stmt, out);
    }
}

fn check_constructor(ctor: &ConstructorDecl, expr_checker: &ExprChecker<'_>, file: &str, out: &mut Vec<Diagnostic>) {
    names::check_modifiers(&ctor.modifiers, true, file, out);
    names::check_duplicate_params(&ctor.params, file, out);
    flow::check_body(&ctor.body, true, file, out);
    names::check_local_scopes(&ctor.params, &[], &ctor.body, file, out);
    for stmt in &ctor.body {
        expr_checker.check_statement(stmt, out);
    }
}

fn check_fallback(fallback: &FallbackDecl, expr_checker: &ExprChecker<'_>, file: &str, out: &mut Vec<Diagnostic>) {
    names::check_modifiers(&fallback.modifiers, false, file, out);
    flow::check_body(&fallback.body, true, file, out);
    names::check_local_scopes(&[], &[], &fallback.body, file, out);
    for stmt in &fallback.body {
        expr_checker.check_statement(stmt, out);
    }
}
