//! Flattened, declaration-order-preserving symbol tables for a contract,
//! used by every later check to resolve names without re-walking the AST.

use std::collections::HashMap;

use tol_syntax::ast::{ContractDecl, EventDecl, FunctionDecl, StorageSlot};

pub struct ContractSymbols<'a> {
    pub functions: HashMap<&'a str, &'a FunctionDecl>,
    pub events: HashMap<&'a str, &'a EventDecl>,
    pub slots: HashMap<&'a str, &'a StorageSlot>,
}

impl<'a> ContractSymbols<'a> {
    pub fn build(contract: &'a ContractDecl) -> Self {
        let mut functions = HashMap::new();
        for f in &contract.functions {
            functions.entry(f.name.as_str()).or_insert(f);
        }
        let mut events = HashMap::new();
        for e in &contract.events {
            events.entry(e.name.as_str()).or_insert(e);
        }
        let mut slots = HashMap::new();
        if let Some(storage) = &contract.storage {
            for s in &storage.slots {
                slots.entry(s.name.as_str()).or_insert(s);
            }
        }
        Self { functions, events, slots }
    }

    pub fn is_public_or_external(func: &FunctionDecl) -> bool {
        func.modifiers.iter().any(|m| m.name == "public" || m.name == "external")
    }
}

/// The structural shape of a storage slot's declared type, used by the
/// storage-access rules (`spec.md` §4.3 "Storage access").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotShape {
    Scalar,
    Array,
    Mapping,
}

pub fn classify_slot_type(type_text: &str) -> SlotShape {
    let trimmed = type_text.trim();
    if trimmed.starts_with("mapping(") || trimmed.starts_with("mapping (") {
        SlotShape::Mapping
    } else if trimmed.ends_with("[]") {
        SlotShape::Array
    } else {
        SlotShape::Scalar
    }
}

/// Counts how many `mapping(K => V)` levels must be indexed through before
/// reaching a non-mapping value type, by splitting the textual type at the
/// top-level `=>`.
///
/// Depth 1 for `mapping(address => u256)`; depth 2 for
/// `mapping(address => mapping(address => u256))`; 0 for anything that
/// does not start with `mapping(`.
pub fn mapping_depth(type_text: &str) -> usize {
    let trimmed = type_text.trim();
    let Some(inner) = strip_mapping_wrapper(trimmed) else {
        return 0;
    };
    let Some(value_part) = split_top_level_arrow(inner) else {
        return 0;
    };
    1 + mapping_depth(value_part.trim())
}

fn strip_mapping_wrapper(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("mapping(").or_else(|| text.strip_prefix("mapping ("))?;
    rest.strip_suffix(')')
}

/// Splits `K => V` at the top-level `=>`, returning `V`. Handles nested
/// parens in `K` (e.g. tuple keys are out of scope for this language
/// subset, but nested `mapping(...)` keys are not).
fn split_top_level_arrow(text: &str) -> Option<&str> {
    let mut depth = 0i32;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b'=' if depth == 0 && bytes.get(i + 1) == Some(&b'>') => {
                return Some(&text[i + 2..]);
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_scalar_array_and_mapping() {
        assert_eq!(classify_slot_type("u256"), SlotShape::Scalar);
        assert_eq!(classify_slot_type("address[]"), SlotShape::Array);
        assert_eq!(classify_slot_type("mapping(address=>u256)"), SlotShape::Mapping);
    }

    #[test]
    fn mapping_depth_counts_nesting() {
        assert_eq!(mapping_depth("u256"), 0);
        assert_eq!(mapping_depth("mapping(address=>u256)"), 1);
        assert_eq!(mapping_depth("mapping(address=>mapping(address=>u256))"), 2);
    }
}
