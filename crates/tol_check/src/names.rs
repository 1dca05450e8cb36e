//! Name uniqueness, reserved-name policy, and modifier validation
//! (`spec.md` §4.3 "Name uniqueness", "Reserved names", "Modifiers").

use std::collections::{HashMap, HashSet};

use tol_base::{Diagnostic, Span};
use tol_syntax::ast::{ContractDecl, FieldDecl, FunctionDecl, Modifier, Param, Statement};

use crate::codes;

const VISIBILITY_MODIFIERS: &[&str] = &["public", "external", "internal", "private"];
const MUTABILITY_MODIFIERS: &[&str] = &["view", "pure", "payable"];
const RESERVED_PREFIX: &str = "__tol_";

fn is_reserved_identifier(name: &str, contract_name: &str) -> bool {
    name == "selector" || name == "this" || name == contract_name || name.starts_with(RESERVED_PREFIX)
}

pub fn check_reserved(name: &str, span: Span, contract_name: &str, file: &str, out: &mut Vec<Diagnostic>) {
    if is_reserved_identifier(name, contract_name) {
        out.push(Diagnostic::new(
            codes::RESERVED_NAME,
            format!("'{name}' is a reserved name and may not be used here"),
            file,
            span,
        ));
    }
}

/// Checks slot/event/function uniqueness within each namespace, plus the
/// cross-namespace collision rule (`TOL2026`).
pub fn check_name_uniqueness(contract: &ContractDecl, file: &str, out: &mut Vec<Diagnostic>) {
    let mut all_names: HashMap<&str, Span> = HashMap::new();

    if let Some(storage) = &contract.storage {
        let mut seen: HashMap<&str, Span> = HashMap::new();
        for slot in &storage.slots {
            if let Some(_first) = seen.get(slot.name.as_str()) {
                out.push(Diagnostic::new(
                    codes::DUPLICATE_STORAGE_SLOT,
                    format!("storage slot '{}' is declared more than once", slot.name),
                    file,
                    slot.span,
                ));
            } else {
                seen.insert(slot.name.as_str(), slot.span);
                record_cross_class(&mut all_names, &slot.name, slot.span, file, out);
            }
            check_reserved(&slot.name, slot.span, &contract.name, file, out);
        }
    }

    let mut seen_events: HashMap<&str, Span> = HashMap::new();
    for event in &contract.events {
        if seen_events.contains_key(event.name.as_str()) {
            out.push(Diagnostic::new(
                codes::DUPLICATE_EVENT,
                format!("event '{}' is declared more than once", event.name),
                file,
                event.span,
            ));
        } else {
            seen_events.insert(event.name.as_str(), event.span);
            record_cross_class(&mut all_names, &event.name, event.span, file, out);
        }
        check_reserved(&event.name, event.span, &contract.name, file, out);
        check_duplicate_fields(&event.params, file, out);
    }

    let mut seen_functions: HashMap<&str, Span> = HashMap::new();
    for func in &contract.functions {
        if seen_functions.contains_key(func.name.as_str()) {
            out.push(Diagnostic::new(
                codes::DUPLICATE_FUNCTION,
                format!("function '{}' is declared more than once", func.name),
                file,
                func.name_span,
            ));
        } else {
            seen_functions.insert(func.name.as_str(), func.name_span);
            record_cross_class(&mut all_names, &func.name, func.name_span, file, out);
        }
        check_reserved(&func.name, func.name_span, &contract.name, file, out);
        check_duplicate_params(&func.params, file, out);
        check_duplicate_params(&func.returns, file, out);
        check_param_return_collision(func, file, out);
    }
}

fn record_cross_class<'a>(
    all_names: &mut HashMap<&'a str, Span>,
    name: &'a str,
    span: Span,
    file: &str,
    out: &mut Vec<Diagnostic>,
) {
    if all_names.contains_key(name) {
        out.push(Diagnostic::new(
            codes::CROSS_CLASS_COLLISION,
            format!("'{name}' collides with a declaration of a different kind in the same contract"),
            file,
            span,
        ));
    } else {
        all_names.insert(name, span);
    }
}

pub(crate) fn check_duplicate_params(params: &[Param], file: &str, out: &mut Vec<Diagnostic>) {
    let mut seen: HashSet<&str> = HashSet::new();
    for p in params {
        if !seen.insert(p.name.as_str()) {
            out.push(Diagnostic::new(
                codes::DUPLICATE_PARAM,
                format!("duplicate parameter name '{}'", p.name),
                file,
                p.span,
            ));
        }
    }
}

pub(crate) fn check_duplicate_fields(fields: &[FieldDecl], file: &str, out: &mut Vec<Diagnostic>) {
    let mut seen: HashSet<&str> = HashSet::new();
    for f in fields {
        if !seen.insert(f.name.as_str()) {
            out.push(Diagnostic::new(
                codes::DUPLICATE_PARAM,
                format!("duplicate parameter name '{}'", f.name),
                file,
                f.span,
            ));
        }
    }
}

fn check_param_return_collision(func: &FunctionDecl, file: &str, out: &mut Vec<Diagnostic>) {
    let param_names: HashSet<&str> = func.params.iter().map(|p| p.name.as_str()).collect();
    let mut seen_returns: HashSet<&str> = HashSet::new();
    for r in &func.returns {
        if param_names.contains(r.name.as_str()) || !seen_returns.insert(r.name.as_str()) {
            out.push(Diagnostic::new(
                codes::DUPLICATE_RETURN_NAME,
                format!("return name '{}' collides with a parameter or another return name", r.name),
                file,
                r.span,
            ));
        }
    }
}

/// Validates a modifier list against the recognized visibility/mutability
/// sets: at most one from each set, no unknown modifier, no duplicates.
/// `allow_mutability` is false for constructors, which accept only
/// visibility modifiers plus `payable`.
pub fn check_modifiers(modifiers: &[Modifier], constructor_like: bool, file: &str, out: &mut Vec<Diagnostic>) {
    let mut visibility_seen: Option<&str> = None;
    let mut mutability_seen: Option<&str> = None;
    let mut seen_names: HashSet<&str> = HashSet::new();

    for m in modifiers {
        let name = m.name.as_str();
        if !seen_names.insert(name) {
            let code = if VISIBILITY_MODIFIERS.contains(&name) { codes::VISIBILITY_MODIFIER } else { codes::MUTABILITY_MODIFIER };
            out.push(Diagnostic::new(code, format!("duplicate modifier '{name}'"), file, m.span));
            continue;
        }

        if VISIBILITY_MODIFIERS.contains(&name) {
            if let Some(first) = visibility_seen {
                out.push(Diagnostic::new(
                    codes::VISIBILITY_MODIFIER,
                    format!("conflicting visibility modifiers '{first}' and '{name}'"),
                    file,
                    m.span,
                ));
            } else {
                visibility_seen = Some(name);
            }
        } else if MUTABILITY_MODIFIERS.contains(&name) {
            if constructor_like && name != "payable" {
                out.push(Diagnostic::new(
                    codes::MUTABILITY_MODIFIER,
                    format!("constructor does not accept mutability modifier '{name}'"),
                    file,
                    m.span,
                ));
                continue;
            }
            if let Some(first) = mutability_seen {
                out.push(Diagnostic::new(
                    codes::MUTABILITY_MODIFIER,
                    format!("conflicting mutability modifiers '{first}' and '{name}'"),
                    file,
                    m.span,
                ));
            } else {
                mutability_seen = Some(name);
            }
        } else {
            out.push(Diagnostic::new(codes::VISIBILITY_MODIFIER, format!("unknown modifier '{name}'"), file, m.span));
        }
    }
}

/// Checks `let` duplication within a single block, and `let`-vs-parameter
/// or `let`-vs-return-name collisions at any nesting depth (`TOL2028`).
/// Shadowing an outer block's own `let` from a nested block is permitted;
/// only same-block duplicates and parameter/return collisions are flagged.
pub fn check_local_scopes(params: &[Param], returns: &[Param], body: &[Statement], file: &str, out: &mut Vec<Diagnostic>) {
    let mut reserved: HashSet<&str> = params.iter().map(|p| p.name.as_str()).collect();
    reserved.extend(returns.iter().map(|r| r.name.as_str()));
    walk_block(body, &reserved, file, out);
}

fn walk_block<'a>(stmts: &'a [Statement], reserved: &HashSet<&'a str>, file: &str, out: &mut Vec<Diagnostic>) {
    let mut local: HashSet<&str> = HashSet::new();
    for stmt in stmts {
        match stmt {
            Statement::Let { name, name_span, .. } => {
                let inserted = local.insert(name.as_str());
                if reserved.contains(name.as_str()) || !inserted {
                    out.push(Diagnostic::new(codes::DUPLICATE_LOCAL, format!("duplicate local '{name}' in this scope"), file, *name_span));
                }
            }
            Statement::If { then_branch, else_branch, .. } => {
                walk_block(then_branch, reserved, file, out);
                if let Some(else_stmts) = else_branch {
                    walk_block(else_stmts, reserved, file, out);
                }
            }
            Statement::While { body, .. } => walk_block(body, reserved, file, out),
            Statement::For { init, body, .. } => {
                let mut for_reserved = reserved.clone();
                if let Some(init_stmt) = init {
                    if let Statement::Let { name, name_span, .. } = &**init_stmt {
                        if for_reserved.contains(name.as_str()) {
                            out.push(Diagnostic::new(codes::DUPLICATE_LOCAL, format!("duplicate local '{name}' in this scope"), file, *name_span));
                        }
                        for_reserved.insert(name.as_str());
                    }
                }
                walk_block(body, &for_reserved, file, out);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tol_base::Pos;

    fn span() -> Span {
        Span::point(Pos::start())
    }

    #[test]
    fn reserved_name_flags_selector_and_this_and_self_reference() {
        assert!(is_reserved_identifier("selector", "Demo"));
        assert!(is_reserved_identifier("this", "Demo"));
        assert!(is_reserved_identifier("Demo", "Demo"));
        assert!(is_reserved_identifier("__tol_internal", "Demo"));
        assert!(!is_reserved_identifier("balance", "Demo"));
    }

    #[test]
    fn duplicate_visibility_modifiers_are_rejected() {
        let mods = vec![
            Modifier { name: "public".into(), span: span() },
            Modifier { name: "external".into(), span: span() },
        ];
        let mut out = Vec::new();
        check_modifiers(&mods, false, "demo.tol", &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, codes::VISIBILITY_MODIFIER);
    }

    #[test]
    fn constructor_rejects_mutability_other_than_payable() {
        let mods = vec![Modifier { name: "view".into(), span: span() }];
        let mut out = Vec::new();
        check_modifiers(&mods, true, "demo.tol", &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn constructor_accepts_payable() {
        let mods = vec![Modifier { name: "payable".into(), span: span() }];
        let mut out = Vec::new();
        check_modifiers(&mods, true, "demo.tol", &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_modifier_is_rejected() {
        let mods = vec![Modifier { name: "static".into(), span: span() }];
        let mut out = Vec::new();
        check_modifiers(&mods, false, "demo.tol", &mut out);
        assert_eq!(out.len(), 1);
    }
}
