use thiserror::Error;
use tol_base::Diagnostic;

/// The unified error taxonomy (`spec.md` §7): input errors from parsing
/// or checking carry their accumulated diagnostics; everything past
/// lowering composes the per-crate typed error it came from.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{} parse error(s) in {file}", .diagnostics.len())]
    ParseFailed { file: String, diagnostics: Vec<Diagnostic> },

    #[error("{} semantic error(s) in {file}", .diagnostics.len())]
    CheckFailed { file: String, diagnostics: Vec<Diagnostic> },

    /// `spec.md` §4.4: the codegen backend rejected the lowered program.
    /// The ABI and storage JSON are still attached so a caller can
    /// inspect the intended layout alongside the rejection.
    #[error("codegen rejected '{contract_name}': {source}")]
    CodegenRejected {
        contract_name: String,
        #[source]
        source: tol_codegen::CodegenError,
        abi_json: String,
        storage_json: String,
    },

    #[error(transparent)]
    Artifact(#[from] tol_artifact::ArtifactError),

    #[error("pack() input has no 'manifest.json' entry")]
    MissingManifest,

    #[error("malformed manifest JSON: {0}")]
    MalformedManifest(#[source] serde_json::Error),
}
