//! # tol_abi
//!
//! Derives the ABI and storage-layout documents from a
//! [`tol_lower::LoweredProgram`] (`spec.md` §4.6) and encodes them as
//! canonical JSON with a fixed field order, or validates externally
//! supplied JSON of the same shape on decode.
//!
//! Derivation runs independently of codegen: a storage-bearing contract
//! is rejected by today's codegen backend, but its ABI and storage
//! documents are still derived so that callers can inspect the intended
//! layout alongside the codegen error (`spec.md` §4.4).

mod derive;
mod error;
mod json;
mod model;

pub use derive::{derive_abi, derive_storage};
pub use error::AbiError;
pub use json::{encode_abi_json, encode_storage_json, validate_abi_json, validate_storage_json};
pub use model::{AbiDocument, AbiEvent, AbiEventParam, AbiFunction, StorageDocument, StorageSlotDoc};
