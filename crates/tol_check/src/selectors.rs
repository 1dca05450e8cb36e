//! Selector override policy (`spec.md` §4.3 "Selector policy",
//! `TOL2010`/`TOL2011`/`TOL2027`). The built-in `selector(...)` expression
//! and `.selector` member forms live in [`crate::exprs`]; this module
//! covers the `@selector("0x...")` function attribute.

use std::collections::HashMap;

use tol_base::Diagnostic;
use tol_syntax::ast::{ContractDecl, FunctionDecl};

use crate::codes;
use crate::symbols::ContractSymbols;

fn is_selector_hex(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(rest) => rest.len() == 8 && rest.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()),
        None => false,
    }
}

pub fn canonical_signature(func: &FunctionDecl) -> String {
    let param_types = func.params.iter().map(|p| p.type_text.as_str()).collect::<Vec<_>>();
    tol_hash::canonical_signature(&func.name, &param_types)
}

/// Validates `@selector` overrides: well-formed hex (`TOL2010`), restricted
/// to `public`/`external` functions (`TOL2027`), and no duplicate
/// effective selector across public/external functions (`TOL2011`).
pub fn check_selector_overrides(contract: &ContractDecl, file: &str, out: &mut Vec<Diagnostic>) {
    let mut effective: HashMap<String, &FunctionDecl> = HashMap::new();

    for func in &contract.functions {
        if let Some(sel) = &func.selector_override {
            let span = func.selector_span.unwrap_or(func.name_span);
            if !is_selector_hex(sel) {
                out.push(Diagnostic::new(
                    codes::SELECTOR_OVERRIDE_MALFORMED,
                    format!("'{sel}' is not a well-formed 4-byte selector ('0x' + 8 lowercase hex digits)"),
                    file,
                    span,
                ));
            }
            if !ContractSymbols::is_public_or_external(func) {
                out.push(Diagnostic::new(
                    codes::SELECTOR_OVERRIDE_VISIBILITY,
                    "'@selector' override is only valid on a public or external function".to_string(),
                    file,
                    span,
                ));
            }
        }

        if !ContractSymbols::is_public_or_external(func) {
            continue;
        }
        let effective_selector = func.selector_override.clone().unwrap_or_else(|| tol_hash::selector_from_signature(&canonical_signature(func)));
        if let Some(first) = effective.get(&effective_selector) {
            out.push(Diagnostic::new(
                codes::DUPLICATE_SELECTOR,
                format!("selector '{effective_selector}' collides with function '{}'", first.name),
                file,
                func.selector_span.unwrap_or(func.name_span),
            ));
        } else {
            effective.insert(effective_selector, func);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tol_base::{Pos, Span};
    use tol_syntax::ast::Modifier;

    fn span() -> Span {
        Span::point(Pos::start())
    }

    fn func(name: &str, selector_override: Option<&str>, public: bool) -> FunctionDecl {
        FunctionDecl {
            name: name.to_string(),
            name_span: span(),
            selector_override: selector_override.map(str::to_string),
            selector_span: selector_override.map(|_| span()),
            params: Vec::new(),
            returns: Vec::new(),
            modifiers: if public { vec![Modifier { name: "public".to_string(), span: span() }] } else { Vec::new() },
            body: Vec::new(),
            span: span(),
        }
    }

    fn contract(functions: Vec<FunctionDecl>) -> ContractDecl {
        ContractDecl {
            name: "Demo".to_string(),
            name_span: span(),
            storage: None,
            events: Vec::new(),
            functions,
            constructor: None,
            fallback: None,
            skipped_decls: Vec::new(),
        }
    }

    #[test]
    fn malformed_override_is_rejected() {
        let c = contract(vec![func("ping", Some("0x1234"), true)]);
        let mut out = Vec::new();
        check_selector_overrides(&c, "demo.tol", &mut out);
        assert!(out.iter().any(|d| d.code == codes::SELECTOR_OVERRIDE_MALFORMED));
    }

    #[test]
    fn override_on_internal_function_is_rejected() {
        let c = contract(vec![func("ping", Some("0x12345678"), false)]);
        let mut out = Vec::new();
        check_selector_overrides(&c, "demo.tol", &mut out);
        assert!(out.iter().any(|d| d.code == codes::SELECTOR_OVERRIDE_VISIBILITY));
    }

    #[test]
    fn duplicate_effective_selectors_are_rejected() {
        let c = contract(vec![func("a", Some("0x12345678"), true), func("b", Some("0x12345678"), true)]);
        let mut out = Vec::new();
        check_selector_overrides(&c, "demo.tol", &mut out);
        assert!(out.iter().any(|d| d.code == codes::DUPLICATE_SELECTOR));
    }

    #[test]
    fn well_formed_public_override_is_accepted() {
        let c = contract(vec![func("ping", Some("0x12345678"), true)]);
        let mut out = Vec::new();
        check_selector_overrides(&c, "demo.tol", &mut out);
        assert!(out.is_empty());
    }
}
