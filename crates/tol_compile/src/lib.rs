//! # tol_compile
//!
//! The façade crate external collaborators depend on: `compile`,
//! `inspect`, `verify`, and `pack` (`spec.md` §6), wired over the
//! lower-level `tol_syntax` → `tol_check` → `tol_lower` → `tol_codegen`
//! / `tol_abi` → `tol_artifact` pipeline.
//!
//! ```
//! use tol_compile::{compile, CompileOptions, EmitKind};
//!
//! let src = "tol 0.2\ncontract Demo { fn ping() public -> (r: u256) { return 1; } }";
//! let output = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
//! assert!(!output.bytes.is_empty());
//! ```

mod compile;
mod error;
mod inspect;
mod manifest;
mod options;
mod pack;
mod verify;

pub use compile::{compile, CompileOutput};
pub use error::CompileError;
pub use inspect::{inspect, InspectSummary};
pub use manifest::{encode_manifest_json, Manifest};
pub use options::{CompileOptions, EmitKind, TocOptions, TorOptions};
pub use pack::pack;
pub use verify::{verify, VerifyOutcome};

pub use tol_artifact::{detect_kind, DetectedKind};
