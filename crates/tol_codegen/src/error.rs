//! Codegen and bytecode-decode failures (`spec.md` §4.5, `TOL3xxx`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    /// `TOL3001`: a prototype produced more local slots, constants, or
    /// jump targets than the fixed-width encoding can address.
    #[error("prototype '{prototype}' exceeds the bytecode format's fixed-width limits: {detail}")]
    LimitExceeded { prototype: String, detail: String },

    /// `TOL3002`: a lowered construct has no compiled form in this backend.
    /// The one reachable trigger today is `spec.md` §4.4's storage
    /// restriction (any storage slot forces rejection — this backend
    /// compiles storage-less programs only); every other site that raises
    /// it (a nested-assignment expression, an unresolved call target) is
    /// otherwise foreclosed by `tol_check` running first, and is kept live
    /// so a future surface extension fails loudly here instead of silently
    /// miscompiling.
    #[error("'{0}' has no compiled form in this backend")]
    UnsupportedFeature(String),

    #[error("truncated bytecode: expected {expected} more byte(s) at offset {offset}")]
    Truncated { offset: usize, expected: usize },

    #[error("bad magic bytes at offset 0")]
    BadMagic,

    #[error("unsupported bytecode format version {0}")]
    UnsupportedVersion(u16),

    #[error("unrecognized opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode { offset: usize, opcode: u8 },

    #[error("jump target {target} out of bounds (code length {code_len}) in prototype '{prototype}'")]
    JumpOutOfBounds { prototype: String, target: u32, code_len: usize },

    #[error("call target index {target} out of bounds ({prototype_count} prototype(s)) in prototype '{prototype}'")]
    CallOutOfBounds { prototype: String, target: u32, prototype_count: usize },

    #[error("constant index {index} out of bounds ({pool_len} constant(s)) in prototype '{prototype}'")]
    ConstOutOfBounds { prototype: String, index: u16, pool_len: usize },

    #[error("local index {index} out of bounds ({local_count} local(s)) in prototype '{prototype}'")]
    LocalOutOfBounds { prototype: String, index: u16, local_count: u16 },

    #[error("storage slot index {index} out of bounds ({storage_count} slot(s))")]
    StorageOutOfBounds { index: u16, storage_count: u16 },

    #[error("invalid utf-8 in {0}")]
    InvalidUtf8(&'static str),
}
