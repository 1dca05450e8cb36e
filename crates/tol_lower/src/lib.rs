//! # tol_lower
//!
//! Lowers a checked [`tol_syntax::ast::Module`] into a [`LoweredProgram`]
//! (`spec.md` §4.4): declaration order is preserved exactly — storage
//! slots and functions are never reordered — and every ABI-visible
//! function's selector is resolved once here, rather than recomputed at
//! every later stage.
//!
//! Lowering assumes the module already passed `tol_check::check` with no
//! error diagnostics (`spec.md` §7: "lowering does not run if the checker
//! produced any error"); it does not re-validate names, modifiers, or
//! control flow.

use tol_syntax::ast::{Module, Statement};

mod program;

pub use program::{
    LoweredConstructor, LoweredEvent, LoweredEventParam, LoweredFallback, LoweredFunction, LoweredParam, LoweredProgram, LoweredSlot,
};

/// Lowers a validated module. Infallible: every condition that could make
/// lowering fail is already a checker diagnostic (`spec.md` §4.3 "Output:
/// ... Any error diagnostic halts the pipeline before lowering").
#[tracing::instrument(skip(module), fields(contract = %module.contract.name))]
pub fn lower(module: &Module) -> LoweredProgram {
    let contract = &module.contract;

    let storage = contract
        .storage
        .iter()
        .flat_map(|s| &s.slots)
        .map(|slot| LoweredSlot {
            name: slot.name.clone(),
            type_text: slot.type_text.clone(),
            canonical_hash: tol_hash::slot_canonical_hash(&contract.name, &slot.name),
        })
        .collect();

    let events = contract
        .events
        .iter()
        .map(|event| LoweredEvent {
            name: event.name.clone(),
            params: event
                .params
                .iter()
                .map(|p| LoweredEventParam { name: p.name.clone(), type_text: p.type_text.clone(), indexed: p.indexed })
                .collect(),
        })
        .collect();

    let functions = contract
        .functions
        .iter()
        .map(|f| LoweredFunction {
            name: f.name.clone(),
            params: lower_params(&f.params),
            returns: lower_params(&f.returns),
            modifiers: f.modifiers.iter().map(|m| m.name.clone()).collect(),
            selector: resolve_selector(f),
            body: f.body.clone(),
        })
        .collect();

    let constructor = contract.constructor.as_ref().map(|c| LoweredConstructor {
        params: lower_params(&c.params),
        modifiers: c.modifiers.iter().map(|m| m.name.clone()).collect(),
        body: c.body.clone(),
    });

    let fallback = contract
        .fallback
        .as_ref()
        .map(|f| LoweredFallback { modifiers: f.modifiers.iter().map(|m| m.name.clone()).collect(), body: f.body.clone() });

    LoweredProgram { contract_name: contract.name.clone(), storage, events, functions, constructor, fallback }
}

fn lower_params(params: &[tol_syntax::ast::Param]) -> Vec<LoweredParam> {
    params.iter().map(|p| LoweredParam { name: p.name.clone(), type_text: p.type_text.clone() }).collect()
}

/// `@selector` override if present; else `keccak256(signature)[0:4]`
/// (`spec.md` §4.6). Internal/private functions have no ABI selector.
fn resolve_selector(f: &tol_syntax::ast::FunctionDecl) -> Option<String> {
    let is_public_or_external = f.modifiers.iter().any(|m| m.name == "public" || m.name == "external");
    if !is_public_or_external {
        return None;
    }
    Some(f.selector_override.clone().unwrap_or_else(|| {
        let param_types = f.params.iter().map(|p| p.type_text.as_str()).collect::<Vec<_>>();
        tol_hash::selector_from_signature(&tol_hash::canonical_signature(&f.name, &param_types))
    }))
}

/// Count of statements across a body, used by the codegen stage to
/// pre-size its opcode buffer; exposed here since lowering is the only
/// stage that walks every body exactly once up front.
pub fn statement_count(body: &[Statement]) -> usize {
    body.iter()
        .map(|s| match s {
            Statement::If { then_branch, else_branch, .. } => {
                1 + statement_count(then_branch) + else_branch.as_ref().map(|e| statement_count(e)).unwrap_or(0)
            }
            Statement::While { body, .. } => 1 + statement_count(body),
            Statement::For { init, post, body, .. } => {
                1 + init.is_some() as usize + post.is_some() as usize + statement_count(body)
            }
            _ => 1,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tol_syntax::parser::parse;

    #[test]
    fn preserves_storage_and_function_declaration_order() {
        let src = "tol 0.2\ncontract Demo { storage { slot b: u256; slot a: address; } fn second() public { return; } fn first() public { return; } }";
        let (module, diags) = parse(src, "demo.tol");
        assert!(diags.is_empty());
        let lowered = lower(&module);
        assert_eq!(lowered.storage.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(lowered.functions.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["second", "first"]);
    }

    #[test]
    fn resolves_derived_selector_for_public_function_without_override() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let (module, _) = parse(src, "demo.tol");
        let lowered = lower(&module);
        assert_eq!(lowered.functions[0].selector.as_deref(), Some(tol_hash::selector_from_signature("ping()").as_str()));
    }

    #[test]
    fn resolves_override_selector_verbatim() {
        let src = r#"tol 0.2
contract Demo { @selector("0xdeadbeef") fn ping() public { return; } }"#;
        let (module, _) = parse(src, "demo.tol");
        let lowered = lower(&module);
        assert_eq!(lowered.functions[0].selector.as_deref(), Some("0xdeadbeef"));
    }

    #[test]
    fn internal_function_has_no_selector() {
        let src = "tol 0.2\ncontract Demo { fn helper() internal { return; } }";
        let (module, _) = parse(src, "demo.tol");
        let lowered = lower(&module);
        assert_eq!(lowered.functions[0].selector, None);
    }

    #[test]
    fn slot_canonical_hash_matches_contract_and_slot_name() {
        let src = "tol 0.2\ncontract Demo { storage { slot total: u256; } }";
        let (module, _) = parse(src, "demo.tol");
        let lowered = lower(&module);
        assert_eq!(lowered.storage[0].canonical_hash, tol_hash::slot_canonical_hash("Demo", "total"));
    }
}
