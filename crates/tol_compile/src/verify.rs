//! The `verify` entry point (`spec.md` §6): `ok` or a typed error, with a
//! CLI-facing exit code baked in so callers don't re-derive the mapping.

use tol_artifact::DetectedKind;

use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Ok,
    Failed(String),
    SourceHashMismatch { claimed: String, actual: String },
}

impl VerifyOutcome {
    /// `spec.md` §6: "the CLI convention uses code 2 for hash mismatch;
    /// other failures use 1."
    pub fn cli_exit_code(&self) -> i32 {
        match self {
            VerifyOutcome::Ok => 0,
            VerifyOutcome::SourceHashMismatch { .. } => 2,
            VerifyOutcome::Failed(_) => 1,
        }
    }
}

/// Decodes `bytes` as `kind`, fully validating it; if `source_bytes` is
/// given for a TOC, additionally checks `source_hash == keccak256(source_bytes)`.
#[tracing::instrument(skip(bytes, source_bytes))]
pub fn verify(kind: DetectedKind, bytes: &[u8], source_bytes: Option<&[u8]>) -> VerifyOutcome {
    let result = (|| -> Result<(), CompileError> {
        match kind {
            DetectedKind::Toc => {
                let toc = tol_artifact::decode_toc(bytes)?;
                if let Some(source) = source_bytes {
                    if let Err(err) = tol_artifact::verify_toc_source(&toc, source) {
                        return Err(CompileError::Artifact(err));
                    }
                }
                Ok(())
            }
            DetectedKind::Toi => {
                let text = std::str::from_utf8(bytes).map_err(|_| CompileError::Artifact(tol_artifact::ArtifactError::InvalidUtf8("TOI text")))?;
                tol_artifact::decode_toi(text)?;
                Ok(())
            }
            DetectedKind::Tor => {
                tol_artifact::decode_tor(bytes)?;
                Ok(())
            }
        }
    })();

    match result {
        Ok(()) => VerifyOutcome::Ok,
        Err(CompileError::Artifact(tol_artifact::ArtifactError::SourceHashMismatch { claimed, actual })) => {
            VerifyOutcome::SourceHashMismatch { claimed, actual }
        }
        Err(other) => VerifyOutcome::Failed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::options::{CompileOptions, EmitKind};

    #[test]
    fn verifies_a_well_formed_toc() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let output = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
        assert_eq!(verify(DetectedKind::Toc, &output.bytes, None), VerifyOutcome::Ok);
        assert_eq!(verify(DetectedKind::Toc, &output.bytes, None).cli_exit_code(), 0);
    }

    #[test]
    fn source_hash_mismatch_gets_exit_code_two() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let output = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
        let outcome = verify(DetectedKind::Toc, &output.bytes, Some(b"different source"));
        assert!(matches!(outcome, VerifyOutcome::SourceHashMismatch { .. }));
        assert_eq!(outcome.cli_exit_code(), 2);
    }

    #[test]
    fn other_failures_get_exit_code_one() {
        let outcome = verify(DetectedKind::Toc, b"garbage", None);
        assert!(matches!(outcome, VerifyOutcome::Failed(_)));
        assert_eq!(outcome.cli_exit_code(), 1);
    }

    #[test]
    fn matching_source_hash_verifies_ok() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let output = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
        assert_eq!(verify(DetectedKind::Toc, &output.bytes, Some(src.as_bytes())), VerifyOutcome::Ok);
    }
}
