use thiserror::Error;

/// Integrity failures (`spec.md` §7, kind 2): "always fatal, surfaced as
/// a typed error kind so CLIs can map them to distinct exit codes."
/// Hash-mismatch in TOC source verification is called out as its own
/// kind so a CLI can give it a dedicated exit code (`spec.md` §6).
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("bad magic bytes for {kind} artifact")]
    BadMagic { kind: &'static str },

    #[error("unsupported {kind} format version {found} (expected {expected})")]
    UnsupportedVersion { kind: &'static str, found: u16, expected: u16 },

    #[error("truncated {kind} artifact at offset {offset}, expected {expected} more byte(s)")]
    Truncated { kind: &'static str, offset: usize, expected: usize },

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("empty contract name in TOC artifact")]
    EmptyContractName,

    #[error("empty bytecode in TOC artifact")]
    EmptyBytecode,

    #[error("bytecode_hash mismatch: artifact claims {claimed}, actual keccak256 is {actual}")]
    BytecodeHashMismatch { claimed: String, actual: String },

    #[error("source_hash mismatch: artifact claims {claimed}, provided source hashes to {actual}")]
    SourceHashMismatch { claimed: String, actual: String },

    #[error("embedded bytecode failed prototype decoding: {0}")]
    InvalidBytecode(#[from] tol_codegen::CodegenError),

    #[error("embedded ABI JSON is structurally invalid: {0}")]
    InvalidAbiJson(#[source] tol_abi::AbiError),

    #[error("embedded storage JSON is structurally invalid: {0}")]
    InvalidStorageJson(#[source] tol_abi::AbiError),

    #[error("malformed manifest JSON in TOR artifact: {0}")]
    MalformedManifest(#[source] serde_json::Error),

    #[error("duplicate file path '{0}' in TOR artifact")]
    DuplicateTorPath(String),

    #[error("TOR file paths must be sorted lexicographically; '{0}' appears after '{1}'")]
    UnsortedTorPaths(String, String),

    #[error("malformed TOI text at line {line}: {detail}")]
    MalformedToi { line: usize, detail: String },

    #[error("cannot detect artifact kind from extension or content")]
    UndetectedKind,
}
