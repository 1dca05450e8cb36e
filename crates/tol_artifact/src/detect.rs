//! Polymorphic kind detection for `verify`/`inspect` (`spec.md` §4.7):
//! "by extension first; fallback by magic for binary kinds; fallback by
//! attempting TOI text validation."

use crate::error::ArtifactError;
use crate::toi::decode_toi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedKind {
    Toc,
    Toi,
    Tor,
}

/// Detects an artifact's kind from its file extension (if known) and
/// falls back to content sniffing otherwise.
pub fn detect_kind(file_name: Option<&str>, bytes: &[u8]) -> Result<DetectedKind, ArtifactError> {
    if let Some(name) = file_name {
        if let Some(ext) = name.rsplit('.').next() {
            match ext.to_ascii_lowercase().as_str() {
                "toc" => return Ok(DetectedKind::Toc),
                "toi" => return Ok(DetectedKind::Toi),
                "tor" => return Ok(DetectedKind::Tor),
                _ => {}
            }
        }
    }

    if bytes.len() >= 4 {
        match &bytes[0..4] {
            b"TOC\0" => return Ok(DetectedKind::Toc),
            b"TOR\0" => return Ok(DetectedKind::Tor),
            _ => {}
        }
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        if decode_toi(text).is_ok() {
            return Ok(DetectedKind::Toi);
        }
    }

    Err(ArtifactError::UndetectedKind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::{encode_toc, TocArtifact};
    use crate::toi::{encode_toi, ToiArtifact};
    use crate::tor::{encode_tor, TorArtifact};

    #[test]
    fn extension_takes_priority_over_content() {
        let tor = TorArtifact::new("{}".to_string(), vec![]).unwrap();
        let bytes = encode_tor(&tor);
        assert_eq!(detect_kind(Some("bundle.tor"), &bytes).unwrap(), DetectedKind::Tor);
    }

    #[test]
    fn detects_toc_by_magic_without_extension() {
        let toc = TocArtifact::new("tolc", "Demo", vec![1, 2, 3], "{}".into(), "{}".into(), [0u8; 32]);
        let bytes = encode_toc(&toc);
        assert_eq!(detect_kind(None, &bytes).unwrap(), DetectedKind::Toc);
    }

    #[test]
    fn detects_tor_by_magic_without_extension() {
        let tor = TorArtifact::new("{}".to_string(), vec![]).unwrap();
        let bytes = encode_tor(&tor);
        assert_eq!(detect_kind(None, &bytes).unwrap(), DetectedKind::Tor);
    }

    #[test]
    fn falls_back_to_toi_text_validation() {
        let toi = ToiArtifact { interface_name: "Demo".to_string(), functions: vec![], events: vec![] };
        let text = encode_toi(&toi);
        assert_eq!(detect_kind(None, text.as_bytes()).unwrap(), DetectedKind::Toi);
    }

    #[test]
    fn unrecognizable_bytes_are_undetected() {
        assert!(matches!(detect_kind(None, b"garbage"), Err(ArtifactError::UndetectedKind)));
    }
}
