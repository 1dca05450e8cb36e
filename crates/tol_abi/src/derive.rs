//! Derives ABI and storage documents from a lowered program
//! (`spec.md` §4.6).

use tol_lower::LoweredProgram;

use crate::model::{AbiDocument, AbiEvent, AbiEventParam, AbiFunction, StorageDocument, StorageSlotDoc};

fn visibility_of(modifiers: &[String]) -> &'static str {
    if modifiers.iter().any(|m| m == "public") {
        "public"
    } else {
        "external"
    }
}

/// Builds the ABI document: public/external functions in declaration
/// order, then every event in declaration order. Internal and private
/// functions carry no selector (`tol_lower::lower`'s `resolve_selector`)
/// and are excluded here.
#[tracing::instrument(skip(program), fields(contract = %program.contract_name))]
pub fn derive_abi(program: &LoweredProgram) -> AbiDocument {
    let functions = program
        .functions
        .iter()
        .filter_map(|f| {
            let selector = f.selector.clone()?;
            Some(AbiFunction {
                name: f.name.clone(),
                visibility: visibility_of(&f.modifiers).to_string(),
                selector,
                params: f.params.iter().map(|p| p.type_text.clone()).collect(),
            })
        })
        .collect();

    let events = program
        .events
        .iter()
        .map(|e| AbiEvent {
            name: e.name.clone(),
            params: e
                .params
                .iter()
                .map(|p| AbiEventParam { name: p.name.clone(), type_text: p.type_text.clone(), indexed: p.indexed })
                .collect(),
        })
        .collect();

    AbiDocument { functions, events }
}

/// Builds the storage-layout document from the lowered program's storage
/// slots, in declaration order. `canonical_hash` is already resolved by
/// `tol_lower::lower`, so this is a direct projection.
#[tracing::instrument(skip(program), fields(contract = %program.contract_name))]
pub fn derive_storage(program: &LoweredProgram) -> StorageDocument {
    StorageDocument {
        slots: program
            .storage
            .iter()
            .map(|s| StorageSlotDoc { name: s.name.clone(), type_text: s.type_text.clone(), canonical_hash: tol_hash::to_hex(&s.canonical_hash) })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tol_syntax::parser::parse;

    fn lowered(src: &str) -> LoweredProgram {
        let (module, diags) = parse(src, "demo.tol");
        assert!(diags.is_empty(), "{diags:?}");
        tol_lower::lower(&module)
    }

    #[test]
    fn abi_includes_only_public_and_external_functions_in_order() {
        let program = lowered(
            "tol 0.2\ncontract Demo { fn a() public { return; } fn b() internal { return; } fn c() external { return; } }",
        );
        let abi = derive_abi(&program);
        assert_eq!(abi.functions.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(abi.functions[0].visibility, "public");
        assert_eq!(abi.functions[1].visibility, "external");
    }

    #[test]
    fn abi_function_params_are_type_texts_in_declaration_order() {
        let program = lowered("tol 0.2\ncontract Demo { fn transfer(to: address, amount: u256) public { return; } }");
        let abi = derive_abi(&program);
        assert_eq!(abi.functions[0].params, vec!["address".to_string(), "u256".to_string()]);
    }

    #[test]
    fn selector_matches_override_when_present() {
        let program = lowered(r#"tol 0.2
contract Demo { @selector("0xdeadbeef") fn ping() public { return; } }"#);
        let abi = derive_abi(&program);
        assert_eq!(abi.functions[0].selector, "0xdeadbeef");
    }

    #[test]
    fn selector_is_derived_from_signature_when_no_override() {
        let program = lowered("tol 0.2\ncontract Demo { fn ping() public { return; } }");
        let abi = derive_abi(&program);
        assert_eq!(abi.functions[0].selector, tol_hash::selector_from_signature("ping()"));
    }

    #[test]
    fn events_preserve_declaration_order_and_param_shape() {
        let program = lowered(
            "tol 0.2\ncontract Demo { event Transfer(@to: address, amount: u256); event Mint(amount: u256); }",
        );
        let abi = derive_abi(&program);
        assert_eq!(abi.events.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(), vec!["Transfer", "Mint"]);
        assert_eq!(abi.events[0].params[0], AbiEventParam { name: "to".into(), type_text: "address".into(), indexed: true });
    }

    #[test]
    fn storage_document_preserves_declaration_order_and_canonical_hash() {
        let program = lowered("tol 0.2\ncontract Demo { storage { slot b: u256; slot a: address; } }");
        let storage = derive_storage(&program);
        assert_eq!(storage.slots.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(storage.slots[0].canonical_hash, tol_hash::to_hex(&tol_hash::slot_canonical_hash("Demo", "b")));
    }

    #[test]
    fn empty_storage_yields_empty_slots() {
        let program = lowered("tol 0.2\ncontract Demo { fn ping() public { return; } }");
        assert!(derive_storage(&program).slots.is_empty());
    }
}
