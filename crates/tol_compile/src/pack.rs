//! The `pack` entry point (`spec.md` §6): bundles an already-read
//! directory tree into a TOR. The core has no filesystem access
//! (`spec.md` §5), so the caller (CLI, package walker) reads the
//! directory and hands over its `(path, bytes)` pairs; `manifest.json`
//! is mandatory among them and is lifted into the TOR's dedicated
//! manifest field rather than duplicated in the file list.

use tol_artifact::{encode_tor, TorArtifact};

use crate::error::CompileError;

const MANIFEST_PATH: &str = "manifest.json";

/// Packages `files` (directory-relative paths, already read into memory)
/// into a TOR bundle.
#[tracing::instrument(skip(files))]
pub fn pack(files: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>, CompileError> {
    let mut manifest_json = None;
    let mut rest = Vec::with_capacity(files.len());
    for (path, body) in files {
        let normalized = path.replace('\\', "/");
        if normalized == MANIFEST_PATH {
            let text = String::from_utf8(body).map_err(|_| CompileError::Artifact(tol_artifact::ArtifactError::InvalidUtf8("manifest.json")))?;
            let _: serde_json::Value = serde_json::from_str(&text).map_err(CompileError::MalformedManifest)?;
            manifest_json = Some(text);
        } else {
            rest.push((normalized, body));
        }
    }

    let manifest_json = manifest_json.ok_or(CompileError::MissingManifest)?;
    let tor = TorArtifact::new(manifest_json, rest).map_err(CompileError::Artifact)?;
    Ok(encode_tor(&tor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_a_manifest_and_files_into_a_tor() {
        let files = vec![
            (MANIFEST_PATH.to_string(), br#"{"package_name":"demo"}"#.to_vec()),
            ("src/main.tol".to_string(), b"contract Demo {}".to_vec()),
        ];
        let bytes = pack(files).expect("packs");
        let tor = tol_artifact::decode_tor(&bytes).expect("well-formed");
        assert_eq!(tor.manifest_json, r#"{"package_name":"demo"}"#);
        assert_eq!(tor.files.len(), 1);
        assert_eq!(tor.files[0].0, "src/main.tol");
    }

    #[test]
    fn missing_manifest_is_rejected() {
        let files = vec![("src/main.tol".to_string(), b"contract Demo {}".to_vec())];
        assert!(matches!(pack(files), Err(CompileError::MissingManifest)));
    }

    #[test]
    fn malformed_manifest_json_is_rejected() {
        let files = vec![(MANIFEST_PATH.to_string(), b"not json".to_vec())];
        assert!(matches!(pack(files), Err(CompileError::MalformedManifest(_))));
    }
}
