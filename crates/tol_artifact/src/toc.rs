//! The TOC binary artifact (`spec.md` §4.7): compiled bytecode plus its
//! ABI/storage sidecars and integrity hashes, in one self-describing
//! blob.

use tol_hash::Hash32;

use crate::error::ArtifactError;
use crate::framing::Reader;

const MAGIC: &[u8; 4] = b"TOC\0";
const VERSION: u16 = 1;
const KIND: &str = "TOC";

/// A decoded (or about-to-be-encoded) TOC artifact. Every field here is
/// already owned, plain data — no lazy parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocArtifact {
    pub compiler: String,
    pub contract_name: String,
    pub bytecode: Vec<u8>,
    pub abi_json: String,
    pub storage_json: String,
    pub source_hash: Hash32,
    pub bytecode_hash: Hash32,
}

impl TocArtifact {
    /// Builds a TOC from its parts, deriving `bytecode_hash` from
    /// `bytecode` itself so the two can never drift apart at construction
    /// time (`spec.md` §8 "Hash laws").
    pub fn new(compiler: impl Into<String>, contract_name: impl Into<String>, bytecode: Vec<u8>, abi_json: String, storage_json: String, source_hash: Hash32) -> Self {
        let bytecode_hash = tol_hash::keccak256(&bytecode);
        Self { compiler: compiler.into(), contract_name: contract_name.into(), bytecode, abi_json, storage_json, source_hash, bytecode_hash }
    }
}

/// Encodes a TOC artifact to its deterministic byte form (`spec.md` §4.7).
pub fn encode_toc(toc: &TocArtifact) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&VERSION.to_be_bytes());
    crate::framing::write_string(&mut buf, &toc.compiler);
    crate::framing::write_string(&mut buf, &toc.contract_name);
    crate::framing::write_lenbytes(&mut buf, &toc.bytecode);
    crate::framing::write_lenbytes(&mut buf, toc.abi_json.as_bytes());
    crate::framing::write_lenbytes(&mut buf, toc.storage_json.as_bytes());
    buf.extend_from_slice(&toc.source_hash);
    buf.extend_from_slice(&toc.bytecode_hash);
    buf
}

/// Decodes and fully validates a TOC artifact (`spec.md` §4.7): magic,
/// version, non-empty contract name, non-empty bytecode, `bytecode_hash`
/// equal to `keccak256(bytecode)`, structurally valid embedded ABI and
/// storage JSON, and embedded bytecode that passes prototype decoding.
#[tracing::instrument(skip(bytes))]
pub fn decode_toc(bytes: &[u8]) -> Result<TocArtifact, ArtifactError> {
    let mut r = Reader::new(bytes, KIND);
    if r.take(4)? != MAGIC {
        return Err(ArtifactError::BadMagic { kind: KIND });
    }
    let version = r.u16()?;
    if version != VERSION {
        return Err(ArtifactError::UnsupportedVersion { kind: KIND, found: version, expected: VERSION });
    }
    let compiler = r.string("TOC compiler field")?;
    let contract_name = r.string("TOC contract name")?;
    if contract_name.is_empty() {
        return Err(ArtifactError::EmptyContractName);
    }
    let bytecode = r.lenbytes()?;
    if bytecode.is_empty() {
        return Err(ArtifactError::EmptyBytecode);
    }
    let abi_bytes = r.lenbytes()?;
    let abi_json = String::from_utf8(abi_bytes).map_err(|_| ArtifactError::InvalidUtf8("TOC ABI JSON"))?;
    let storage_bytes = r.lenbytes()?;
    let storage_json = String::from_utf8(storage_bytes).map_err(|_| ArtifactError::InvalidUtf8("TOC storage JSON"))?;
    let source_hash: Hash32 = r.take(32)?.try_into().expect("exactly 32 bytes");
    let bytecode_hash: Hash32 = r.take(32)?.try_into().expect("exactly 32 bytes");

    let actual_bytecode_hash = tol_hash::keccak256(&bytecode);
    if actual_bytecode_hash != bytecode_hash {
        return Err(ArtifactError::BytecodeHashMismatch {
            claimed: tol_hash::to_hex(&bytecode_hash),
            actual: tol_hash::to_hex(&actual_bytecode_hash),
        });
    }

    tol_abi::validate_abi_json(&abi_json).map_err(ArtifactError::InvalidAbiJson)?;
    tol_abi::validate_storage_json(&storage_json).map_err(ArtifactError::InvalidStorageJson)?;
    tol_codegen::decode_module(&bytecode)?;

    Ok(TocArtifact { compiler, contract_name, bytecode, abi_json, storage_json, source_hash, bytecode_hash })
}

/// Verifies a TOC against the original source bytes (`spec.md` §6): in
/// addition to the structural checks in [`decode_toc`], confirms
/// `source_hash == keccak256(source_bytes)`. Returns a distinct error
/// kind on mismatch so a CLI can map it to its own exit code.
pub fn verify_toc_source(toc: &TocArtifact, source_bytes: &[u8]) -> Result<(), ArtifactError> {
    let actual = tol_hash::keccak256(source_bytes);
    if actual != toc.source_hash {
        return Err(ArtifactError::SourceHashMismatch { claimed: tol_hash::to_hex(&toc.source_hash), actual: tol_hash::to_hex(&actual) });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TocArtifact {
        TocArtifact::new(
            "tolc 0.1.0",
            "Demo",
            vec![1, 2, 3, 4],
            r#"{"functions":[],"events":[]}"#.to_string(),
            r#"{"slots":[]}"#.to_string(),
            tol_hash::keccak256(b"tol 0.2\ncontract Demo {}"),
        )
    }

    #[test]
    fn round_trips_through_encode_decode() {
        // `decode_toc` calls `tol_codegen::decode_module` on the embedded
        // bytecode, so this needs a real, well-formed module.
        let module_bytes = real_bytecode();
        let toc = TocArtifact::new("tolc 0.1.0", "Demo", module_bytes, r#"{"functions":[],"events":[]}"#.into(), r#"{"slots":[]}"#.into(), [7u8; 32]);
        let bytes = encode_toc(&toc);
        let decoded = decode_toc(&bytes).expect("well-formed");
        assert_eq!(decoded, toc);
    }

    fn real_bytecode() -> Vec<u8> {
        let (module, diags) = tol_syntax::parser::parse("tol 0.2\ncontract Demo { fn ping() public { return; } }", "demo.tol");
        assert!(diags.is_empty());
        let lowered = tol_lower::lower(&module);
        tol_codegen::compile(&lowered).expect("compiles")
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode_toc(&sample());
        bytes[0] = 0;
        assert!(matches!(decode_toc(&bytes), Err(ArtifactError::BadMagic { .. })));
    }

    #[test]
    fn rejects_empty_contract_name() {
        let mut toc = sample();
        toc.contract_name.clear();
        let bytes = encode_toc(&toc);
        assert!(matches!(decode_toc(&bytes), Err(ArtifactError::EmptyContractName)));
    }

    #[test]
    fn rejects_tampered_bytecode_hash() {
        let module_bytes = real_bytecode();
        let mut toc = TocArtifact::new("tolc 0.1.0", "Demo", module_bytes, r#"{"functions":[],"events":[]}"#.into(), r#"{"slots":[]}"#.into(), [7u8; 32]);
        toc.bytecode.push(0xff);
        let bytes = encode_toc(&toc);
        assert!(matches!(decode_toc(&bytes), Err(ArtifactError::BytecodeHashMismatch { .. })));
    }

    #[test]
    fn rejects_malformed_embedded_abi_json() {
        let module_bytes = real_bytecode();
        let toc = TocArtifact::new("tolc 0.1.0", "Demo", module_bytes, "not json".into(), r#"{"slots":[]}"#.into(), [7u8; 32]);
        let bytes = encode_toc(&toc);
        assert!(matches!(decode_toc(&bytes), Err(ArtifactError::InvalidAbiJson(_))));
    }

    #[test]
    fn source_hash_mismatch_is_a_distinct_error_kind() {
        let toc = sample();
        let result = verify_toc_source(&toc, b"different source");
        assert!(matches!(result, Err(ArtifactError::SourceHashMismatch { .. })));
    }

    #[test]
    fn source_hash_match_verifies_ok() {
        let toc = sample();
        assert!(verify_toc_source(&toc, b"tol 0.2\ncontract Demo {}").is_ok());
    }

    #[test]
    fn encoding_is_deterministic() {
        let toc = sample();
        assert_eq!(encode_toc(&toc), encode_toc(&toc));
    }
}
