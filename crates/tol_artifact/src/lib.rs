//! # tol_artifact
//!
//! Encodes and decodes the three on-disk artifact kinds of `spec.md`
//! §4.7 — **TOC** (compiled bytecode plus ABI/storage sidecars), **TOI**
//! (a text interface descriptor), and **TOR** (a packaged bundle) — and
//! detects which kind a blob of bytes is.
//!
//! Every decoder here fully validates its artifact (magic, version,
//! hash laws, embedded JSON and bytecode well-formedness) before
//! returning it; a successfully decoded value is one a caller can trust
//! without re-checking.

mod detect;
mod error;
mod framing;
mod toc;
mod toi;
mod tor;

pub use detect::{detect_kind, DetectedKind};
pub use error::ArtifactError;
pub use toc::{decode_toc, encode_toc, verify_toc_source, TocArtifact};
pub use toi::{decode_toi, encode_toi, ToiArtifact, ToiEvent, ToiFunction, ToiSummary};
pub use tor::{decode_tor, encode_tor, TorArtifact};
