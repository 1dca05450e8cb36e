//! The TOR binary bundle (`spec.md` §4.7): a manifest plus an arbitrary
//! tree of files, packaged for distribution.

use crate::error::ArtifactError;
use crate::framing::{write_lenbytes, write_string, Reader};

const MAGIC: &[u8; 4] = b"TOR\0";
const VERSION: u16 = 1;
const KIND: &str = "TOR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorArtifact {
    pub manifest_json: String,
    /// Directory-relative, forward-slash file paths mapped to their raw
    /// bytes. Encoding sorts these lexicographically by path; decoding
    /// preserves whatever order was found in the stream (already sorted,
    /// by construction of a well-formed TOR).
    pub files: Vec<(String, Vec<u8>)>,
}

impl TorArtifact {
    /// Builds a TOR from an unordered file list, normalizing paths to
    /// forward slashes and sorting them (`spec.md` §4.7). Rejects
    /// duplicate paths after normalization.
    pub fn new(manifest_json: String, files: Vec<(String, Vec<u8>)>) -> Result<Self, ArtifactError> {
        let mut files: Vec<(String, Vec<u8>)> = files.into_iter().map(|(path, body)| (path.replace('\\', "/"), body)).collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));
        for pair in files.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(ArtifactError::DuplicateTorPath(pair[0].0.clone()));
            }
        }
        Ok(Self { manifest_json, files })
    }

    /// The keccak256 of the fully encoded byte stream (`spec.md` §4.7
    /// "the whole byte stream's keccak256 is exposed as the package
    /// hash").
    pub fn package_hash(&self) -> tol_hash::Hash32 {
        tol_hash::keccak256(&encode_tor(self))
    }
}

/// Encodes a TOR artifact to its deterministic byte form.
pub fn encode_tor(tor: &TorArtifact) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&VERSION.to_be_bytes());
    write_lenbytes(&mut buf, tor.manifest_json.as_bytes());
    buf.extend_from_slice(&(tor.files.len() as u32).to_be_bytes());
    for (path, body) in &tor.files {
        write_string(&mut buf, path);
        write_lenbytes(&mut buf, body);
    }
    buf
}

/// Decodes and validates a TOR artifact: magic, version, a structurally
/// valid `manifest.json` blob, sorted and duplicate-free file paths
/// (`spec.md` §4.7).
#[tracing::instrument(skip(bytes))]
pub fn decode_tor(bytes: &[u8]) -> Result<TorArtifact, ArtifactError> {
    let mut r = Reader::new(bytes, KIND);
    if r.take(4)? != MAGIC {
        return Err(ArtifactError::BadMagic { kind: KIND });
    }
    let version = r.u16()?;
    if version != VERSION {
        return Err(ArtifactError::UnsupportedVersion { kind: KIND, found: version, expected: VERSION });
    }
    let manifest_bytes = r.lenbytes()?;
    let manifest_json = String::from_utf8(manifest_bytes).map_err(|_| ArtifactError::InvalidUtf8("TOR manifest JSON"))?;
    let _: serde_json::Value = serde_json::from_str(&manifest_json).map_err(ArtifactError::MalformedManifest)?;

    let file_count = r.u32()? as usize;
    let mut files = Vec::with_capacity(file_count);
    let mut previous: Option<String> = None;
    for _ in 0..file_count {
        let path = r.string("TOR file path")?;
        let body = r.lenbytes()?;
        if let Some(prev) = &previous {
            if path == *prev {
                return Err(ArtifactError::DuplicateTorPath(path));
            }
            if path < *prev {
                return Err(ArtifactError::UnsortedTorPaths(path, prev.clone()));
            }
        }
        previous = Some(path.clone());
        files.push((path, body));
    }

    Ok(TorArtifact { manifest_json, files })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_files_lexicographically_on_construction() {
        let tor = TorArtifact::new(
            r#"{"name":"demo"}"#.to_string(),
            vec![("b/two.txt".into(), vec![2]), ("a/one.txt".into(), vec![1])],
        )
        .unwrap();
        assert_eq!(tor.files.iter().map(|(p, _)| p.as_str()).collect::<Vec<_>>(), vec!["a/one.txt", "b/two.txt"]);
    }

    #[test]
    fn normalizes_backslashes_to_forward_slashes() {
        let tor = TorArtifact::new(r#"{}"#.to_string(), vec![("a\\b\\c.txt".into(), vec![])]).unwrap();
        assert_eq!(tor.files[0].0, "a/b/c.txt");
    }

    #[test]
    fn rejects_duplicate_paths() {
        let result = TorArtifact::new(r#"{}"#.to_string(), vec![("a.txt".into(), vec![1]), ("a.txt".into(), vec![2])]);
        assert!(matches!(result, Err(ArtifactError::DuplicateTorPath(_))));
    }

    #[test]
    fn round_trips_through_encode_decode() {
        let tor = TorArtifact::new(r#"{"name":"demo"}"#.to_string(), vec![("src/main.tol".into(), b"contract Demo {}".to_vec())]).unwrap();
        let bytes = encode_tor(&tor);
        let decoded = decode_tor(&bytes).expect("well-formed");
        assert_eq!(decoded, tor);
    }

    #[test]
    fn rejects_malformed_manifest_json() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&VERSION.to_be_bytes());
        write_lenbytes(&mut buf, b"not json");
        buf.extend_from_slice(&0u32.to_be_bytes());
        assert!(matches!(decode_tor(&buf), Err(ArtifactError::MalformedManifest(_))));
    }

    #[test]
    fn package_hash_changes_when_a_file_changes() {
        let a = TorArtifact::new(r#"{}"#.to_string(), vec![("f.txt".into(), vec![1])]).unwrap();
        let b = TorArtifact::new(r#"{}"#.to_string(), vec![("f.txt".into(), vec![2])]).unwrap();
        assert_ne!(a.package_hash(), b.package_hash());
    }

    #[test]
    fn empty_file_list_round_trips() {
        let tor = TorArtifact::new(r#"{}"#.to_string(), vec![]).unwrap();
        let bytes = encode_tor(&tor);
        assert_eq!(decode_tor(&bytes).unwrap(), tor);
    }
}
