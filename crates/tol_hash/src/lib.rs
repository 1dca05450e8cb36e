//! # tol_hash
//!
//! The single keccak-256 primitive used throughout the TOL toolchain for
//! source-hash, bytecode-hash, storage-slot canonical hash, selector
//! derivation, and TOR package hash (`spec.md` §9 "Keccak").
//!
//! Every call site gets the same 32-byte output, lowercase-hex-with-`0x`-
//! prefix string contract, so no caller hand-rolls hex formatting.

use sha3::{Digest, Keccak256};

/// A raw 32-byte keccak-256 digest.
pub type Hash32 = [u8; 32];

/// Hashes `data` with keccak-256, returning the raw 32-byte digest.
pub fn keccak256(data: &[u8]) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Hashes `data` and renders the digest as `0x` + 64 lowercase hex digits.
pub fn keccak256_hex(data: &[u8]) -> String {
    to_hex(&keccak256(data))
}

/// Renders a 32-byte digest as `0x` + 64 lowercase hex digits.
pub fn to_hex(hash: &Hash32) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parses a `0x`-prefixed, lowercase, 64-hex-digit string back into a
/// digest. Returns `None` on any malformed input (wrong length, missing
/// prefix, non-hex or uppercase characters).
pub fn from_hex(s: &str) -> Option<Hash32> {
    let stripped = s.strip_prefix("0x")?;
    if stripped.len() != 64 || !stripped.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
        return None;
    }
    let bytes = hex::decode(stripped).ok()?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Some(out)
}

/// Derives the canonical storage-slot hash: `keccak256("tol.slot." + contract + "." + slot)`.
pub fn slot_canonical_hash(contract_name: &str, slot_name: &str) -> Hash32 {
    let preimage = format!("tol.slot.{contract_name}.{slot_name}");
    keccak256(preimage.as_bytes())
}

/// Derives a 4-byte ABI selector from a canonical signature
/// (`name(type1,type2,...)`), as `0x` + 8 lowercase hex digits.
pub fn selector_from_signature(signature: &str) -> String {
    let digest = keccak256(signature.as_bytes());
    format!("0x{}", hex::encode(&digest[0..4]))
}

/// Builds a canonical signature string `name(type1,type2,...)` with no
/// whitespace, the single textual form shared by selector derivation and
/// ABI JSON emission (`spec.md` GLOSSARY "Canonical signature").
pub fn canonical_signature(name: &str, param_types: &[&str]) -> String {
    format!("{name}({})", param_types.join(","))
}
