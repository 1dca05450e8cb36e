//! Canonical JSON encoding (`spec.md` §4.6, §9: "fix field order at the
//! emitter", "no extraneous whitespace in the canonical form") and
//! decode-side validation of externally supplied ABI/storage JSON.
//!
//! The encoders below are hand-written string builders, not
//! `serde::Serialize` output — key order and the absence of whitespace
//! must hold regardless of any `derive(Serialize)` field order or
//! `serde_json` formatting default.

use crate::error::AbiError;
use crate::model::{AbiDocument, AbiEvent, AbiEventParam, AbiFunction, StorageDocument, StorageSlotDoc};

fn escape_into(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn push_str_array(out: &mut String, items: &[String]) {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape_into(out, item);
    }
    out.push(']');
}

fn push_function(out: &mut String, f: &AbiFunction) {
    out.push('{');
    out.push_str("\"name\":");
    escape_into(out, &f.name);
    out.push_str(",\"visibility\":");
    escape_into(out, &f.visibility);
    out.push_str(",\"selector\":");
    escape_into(out, &f.selector);
    out.push_str(",\"params\":");
    push_str_array(out, &f.params);
    out.push('}');
}

fn push_event_param(out: &mut String, p: &AbiEventParam) {
    out.push('{');
    out.push_str("\"name\":");
    escape_into(out, &p.name);
    out.push_str(",\"type\":");
    escape_into(out, &p.type_text);
    out.push_str(",\"indexed\":");
    out.push_str(if p.indexed { "true" } else { "false" });
    out.push('}');
}

fn push_event(out: &mut String, e: &AbiEvent) {
    out.push('{');
    out.push_str("\"name\":");
    escape_into(out, &e.name);
    out.push_str(",\"params\":[");
    for (i, p) in e.params.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_event_param(out, p);
    }
    out.push_str("]}");
}

/// Emits `{"functions":[…],"events":[…]}` with stable field order and no
/// extraneous whitespace.
pub fn encode_abi_json(doc: &AbiDocument) -> String {
    let mut out = String::new();
    out.push_str("{\"functions\":[");
    for (i, f) in doc.functions.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_function(&mut out, f);
    }
    out.push_str("],\"events\":[");
    for (i, e) in doc.events.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_event(&mut out, e);
    }
    out.push_str("]}");
    out
}

fn push_storage_slot(out: &mut String, s: &StorageSlotDoc) {
    out.push('{');
    out.push_str("\"name\":");
    escape_into(out, &s.name);
    out.push_str(",\"type\":");
    escape_into(out, &s.type_text);
    out.push_str(",\"canonical_hash\":");
    escape_into(out, &s.canonical_hash);
    out.push('}');
}

/// Emits `{"slots":[…]}` with stable field order and no extraneous
/// whitespace.
pub fn encode_storage_json(doc: &StorageDocument) -> String {
    let mut out = String::new();
    out.push_str("{\"slots\":[");
    for (i, s) in doc.slots.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_storage_slot(&mut out, s);
    }
    out.push_str("]}");
    out
}

/// Decode-side validation for ABI JSON embedded in a TOC artifact
/// (`spec.md` §7: "invalid embedded JSON" is an integrity failure).
pub fn validate_abi_json(text: &str) -> Result<AbiDocument, AbiError> {
    serde_json::from_str(text).map_err(AbiError::MalformedAbi)
}

/// Decode-side validation for storage JSON embedded in a TOC artifact.
pub fn validate_storage_json(text: &str) -> Result<StorageDocument, AbiError> {
    serde_json::from_str(text).map_err(AbiError::MalformedStorage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abi_json_has_no_extraneous_whitespace() {
        let doc = AbiDocument {
            functions: vec![AbiFunction {
                name: "ping".into(),
                visibility: "public".into(),
                selector: "0xdeadbeef".into(),
                params: vec!["u256".into()],
            }],
            events: vec![],
        };
        let text = encode_abi_json(&doc);
        assert!(!text.contains(' ') && !text.contains('\n'));
        assert_eq!(
            text,
            r#"{"functions":[{"name":"ping","visibility":"public","selector":"0xdeadbeef","params":["u256"]}],"events":[]}"#
        );
    }

    #[test]
    fn storage_json_field_order_is_name_type_hash() {
        let doc = StorageDocument {
            slots: vec![StorageSlotDoc { name: "total".into(), type_text: "u256".into(), canonical_hash: "0xabc".into() }],
        };
        let text = encode_storage_json(&doc);
        assert_eq!(text, r#"{"slots":[{"name":"total","type":"u256","canonical_hash":"0xabc"}]}"#);
    }

    #[test]
    fn encoded_abi_json_round_trips_through_validation() {
        let doc = AbiDocument {
            functions: vec![AbiFunction {
                name: "transfer".into(),
                visibility: "external".into(),
                selector: "0x11223344".into(),
                params: vec!["address".into(), "u256".into()],
            }],
            events: vec![AbiEvent {
                name: "Transfer".into(),
                params: vec![AbiEventParam { name: "to".into(), type_text: "address".into(), indexed: true }],
            }],
        };
        let text = encode_abi_json(&doc);
        let decoded = validate_abi_json(&text).expect("valid");
        assert_eq!(decoded, doc);
    }

    #[test]
    fn encoded_storage_json_round_trips_through_validation() {
        let doc = StorageDocument {
            slots: vec![StorageSlotDoc { name: "owner".into(), type_text: "address".into(), canonical_hash: "0xdead".into() }],
        };
        let decoded = validate_storage_json(&encode_storage_json(&doc)).expect("valid");
        assert_eq!(decoded, doc);
    }

    #[test]
    fn malformed_abi_json_is_rejected() {
        assert!(validate_abi_json("not json").is_err());
        assert!(validate_abi_json(r#"{"functions":[]}"#).is_err());
    }

    #[test]
    fn malformed_storage_json_is_rejected() {
        assert!(validate_storage_json("{}").is_err());
    }

    #[test]
    fn string_escaping_handles_quotes_and_control_characters() {
        let doc = AbiDocument {
            functions: vec![AbiFunction {
                name: "weird\"name\n".into(),
                visibility: "public".into(),
                selector: "0x0".into(),
                params: vec![],
            }],
            events: vec![],
        };
        let text = encode_abi_json(&doc);
        let decoded = validate_abi_json(&text).expect("valid");
        assert_eq!(decoded.functions[0].name, "weird\"name\n");
    }
}
