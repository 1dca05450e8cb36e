//! The ABI and storage documents (`spec.md` §4.6). These derive `serde`
//! only for the decode-side validation path (`validate_abi_json`,
//! `validate_storage_json` in [`crate::json`]) — the canonical *encoders*
//! never go through `Serialize`, per `spec.md` §9 "Deterministic JSON must
//! fix field order at the emitter."

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    pub visibility: String,
    pub selector: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEventParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEvent {
    pub name: String,
    pub params: Vec<AbiEventParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiDocument {
    pub functions: Vec<AbiFunction>,
    pub events: Vec<AbiEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSlotDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
    pub canonical_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDocument {
    pub slots: Vec<StorageSlotDoc>,
}
