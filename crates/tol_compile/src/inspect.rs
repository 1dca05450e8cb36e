//! The `inspect` entry point (`spec.md` §6): a structured summary of an
//! already-decoded artifact, shaped per kind.

use tol_artifact::{DetectedKind, ToiSummary};

use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectSummary {
    Toc { compiler: String, contract_name: String, bytecode_len: usize, source_hash: String, bytecode_hash: String },
    Toi(ToiSummary),
    Tor { manifest_json: String, file_count: usize, package_hash: String },
}

/// Decodes `bytes` as `kind` and returns its structured summary.
#[tracing::instrument(skip(bytes))]
pub fn inspect(kind: DetectedKind, bytes: &[u8]) -> Result<InspectSummary, CompileError> {
    match kind {
        DetectedKind::Toc => {
            let toc = tol_artifact::decode_toc(bytes)?;
            Ok(InspectSummary::Toc {
                compiler: toc.compiler,
                contract_name: toc.contract_name,
                bytecode_len: toc.bytecode.len(),
                source_hash: tol_hash::to_hex(&toc.source_hash),
                bytecode_hash: tol_hash::to_hex(&toc.bytecode_hash),
            })
        }
        DetectedKind::Toi => {
            let text = std::str::from_utf8(bytes).map_err(|_| CompileError::Artifact(tol_artifact::ArtifactError::InvalidUtf8("TOI text")))?;
            let toi = tol_artifact::decode_toi(text)?;
            Ok(InspectSummary::Toi(toi.summary()))
        }
        DetectedKind::Tor => {
            let tor = tol_artifact::decode_tor(bytes)?;
            Ok(InspectSummary::Tor {
                manifest_json: tor.manifest_json.clone(),
                file_count: tor.files.len(),
                package_hash: tol_hash::to_hex(&tor.package_hash()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::options::{CompileOptions, EmitKind};

    #[test]
    fn inspects_a_toc_artifact() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let output = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
        let summary = inspect(DetectedKind::Toc, &output.bytes).unwrap();
        match summary {
            InspectSummary::Toc { contract_name, .. } => assert_eq!(contract_name, "Demo"),
            other => panic!("expected Toc summary, got {other:?}"),
        }
    }

    #[test]
    fn inspects_a_toi_artifact() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let output = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toi)).unwrap();
        let summary = inspect(DetectedKind::Toi, &output.bytes).unwrap();
        assert_eq!(summary, InspectSummary::Toi(ToiSummary { version: 1, interface_name: "Demo".to_string(), function_count: 1, event_count: 0 }));
    }

    #[test]
    fn inspects_a_tor_artifact() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let output = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Tor)).unwrap();
        let summary = inspect(DetectedKind::Tor, &output.bytes).unwrap();
        match summary {
            InspectSummary::Tor { file_count, .. } => assert_eq!(file_count, 1),
            other => panic!("expected Tor summary, got {other:?}"),
        }
    }
}
