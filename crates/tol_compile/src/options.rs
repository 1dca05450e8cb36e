//! Compile-time configuration (`spec.md` §6). Plain data: constructed by
//! a caller (a CLI, a VM REPL, a package walker — all out of scope here)
//! and passed by value into [`crate::compile`].

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitKind {
    Toc,
    Toi,
    Tor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorOptions {
    pub package_name: Option<String>,
    pub package_version: String,
    pub interface_name: Option<String>,
    pub include_source: bool,
}

impl Default for TorOptions {
    fn default() -> Self {
        Self { package_name: None, package_version: "0.0.0".to_string(), interface_name: None, include_source: false }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TocOptions {
    /// When set, [`crate::CompileOutput::abi_sidecar`] carries the
    /// canonical ABI JSON alongside the TOC bytes.
    pub abi_sidecar: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub emit: EmitKind,
    pub output_path: Option<PathBuf>,
    pub tor: TorOptions,
    pub toc: TocOptions,
}

impl CompileOptions {
    pub fn new(emit: EmitKind) -> Self {
        Self { emit, output_path: None, tor: TorOptions::default(), toc: TocOptions::default() }
    }
}
