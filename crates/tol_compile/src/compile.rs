//! The `compile` entry point (`spec.md` §6): source bytes in, one of
//! TOC/TOI/TOR bytes out.

use tol_artifact::{encode_toc, encode_toi, encode_tor, ToiArtifact, ToiEvent, ToiFunction, TocArtifact, TorArtifact};
use tol_lower::LoweredProgram;

use crate::error::CompileError;
use crate::manifest::{encode_manifest_json, Manifest};
use crate::options::{CompileOptions, EmitKind};

const COMPILER_NAME: &str = concat!("tolc ", env!("CARGO_PKG_VERSION"));

/// The result of a [`compile`] call: the emitted artifact's bytes, plus
/// an optional ABI sidecar (`spec.md` §6 TOC option `abi_sidecar`,
/// "emits ABI JSON alongside").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub bytes: Vec<u8>,
    pub abi_sidecar: Option<String>,
}

/// Runs the full pipeline — parse, check, lower, then derive and encode
/// the requested artifact kind — over `source_bytes` (`spec.md` §6).
#[tracing::instrument(skip(source_bytes, options), fields(file = %filename))]
pub fn compile(source_bytes: &[u8], filename: &str, options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let source_text = String::from_utf8_lossy(source_bytes);
    let (module, parse_diags) = tol_syntax::parser::parse(&source_text, filename);
    if !parse_diags.is_empty() {
        for d in &parse_diags {
            tol_base::trace_diagnostic(d);
        }
        return Err(CompileError::ParseFailed { file: filename.to_string(), diagnostics: parse_diags });
    }

    let check_diags = tol_check::check(&module, filename);
    if !check_diags.is_empty() {
        for d in &check_diags {
            tol_base::trace_diagnostic(d);
        }
        return Err(CompileError::CheckFailed { file: filename.to_string(), diagnostics: check_diags });
    }

    let program = tol_lower::lower(&module);
    let source_hash = tol_hash::keccak256(source_bytes);

    match options.emit {
        EmitKind::Toc => compile_toc(&program, source_hash, options),
        EmitKind::Toi => compile_toi(&program),
        EmitKind::Tor => compile_tor(&program, source_bytes, options),
    }
}

fn compile_toc(program: &LoweredProgram, source_hash: tol_hash::Hash32, options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let abi_json = tol_abi::encode_abi_json(&tol_abi::derive_abi(program));
    let storage_json = tol_abi::encode_storage_json(&tol_abi::derive_storage(program));

    let bytecode = tol_codegen::compile(program).map_err(|source| CompileError::CodegenRejected {
        contract_name: program.contract_name.clone(),
        source,
        abi_json: abi_json.clone(),
        storage_json: storage_json.clone(),
    })?;

    let toc = TocArtifact::new(COMPILER_NAME, program.contract_name.clone(), bytecode, abi_json.clone(), storage_json, source_hash);
    let bytes = encode_toc(&toc);
    let abi_sidecar = options.toc.abi_sidecar.then_some(abi_json);
    Ok(CompileOutput { bytes, abi_sidecar })
}

fn visibility_of(modifiers: &[String]) -> &'static str {
    if modifiers.iter().any(|m| m == "public") {
        "public"
    } else {
        "external"
    }
}

fn mutability_of(modifiers: &[String]) -> &'static str {
    for m in ["pure", "view", "payable"] {
        if modifiers.iter().any(|x| x == m) {
            return m;
        }
    }
    "mutable"
}

fn compile_toi(program: &LoweredProgram) -> Result<CompileOutput, CompileError> {
    let functions = program
        .functions
        .iter()
        .filter(|f| f.is_public_or_external())
        .map(|f| ToiFunction {
            name: f.name.clone(),
            param_types: f.params.iter().map(|p| p.type_text.clone()).collect(),
            return_types: f.returns.iter().map(|p| p.type_text.clone()).collect(),
            visibility: visibility_of(&f.modifiers).to_string(),
            mutability: mutability_of(&f.modifiers).to_string(),
        })
        .collect();

    let events = program
        .events
        .iter()
        .map(|e| ToiEvent { name: e.name.clone(), params: e.params.iter().map(|p| p.type_text.clone()).collect() })
        .collect();

    let toi = ToiArtifact { interface_name: program.contract_name.clone(), functions, events };
    Ok(CompileOutput { bytes: encode_toi(&toi).into_bytes(), abi_sidecar: None })
}

fn compile_tor(program: &LoweredProgram, source_bytes: &[u8], options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let manifest = Manifest::from_options(&program.contract_name, &options.tor);
    let manifest_json = encode_manifest_json(&manifest);

    let mut files = Vec::new();
    let toc_output = compile_toc(program, tol_hash::keccak256(source_bytes), options)?;
    files.push((format!("{}.toc", program.contract_name), toc_output.bytes));
    if options.tor.include_source {
        files.push(("source.tol".to_string(), source_bytes.to_vec()));
    }

    let tor = TorArtifact::new(manifest_json, files).map_err(CompileError::Artifact)?;
    Ok(CompileOutput { bytes: encode_tor(&tor), abi_sidecar: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TocOptions;

    fn options(emit: EmitKind) -> CompileOptions {
        CompileOptions::new(emit)
    }

    #[test]
    fn compiles_a_storage_less_contract_to_toc() {
        let src = "tol 0.2\ncontract Demo { fn ping() public -> (r: u256) { return 1; } }";
        let output = compile(src.as_bytes(), "demo.tol", &options(EmitKind::Toc)).expect("compiles");
        let toc = tol_artifact::decode_toc(&output.bytes).expect("well-formed TOC");
        assert_eq!(toc.contract_name, "Demo");
    }

    #[test]
    fn abi_sidecar_is_emitted_only_when_requested() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let mut opts = options(EmitKind::Toc);
        opts.toc = TocOptions { abi_sidecar: true };
        let output = compile(src.as_bytes(), "demo.tol", &opts).expect("compiles");
        assert!(output.abi_sidecar.is_some());

        let output_default = compile(src.as_bytes(), "demo.tol", &options(EmitKind::Toc)).expect("compiles");
        assert!(output_default.abi_sidecar.is_none());
    }

    #[test]
    fn storage_bearing_contract_is_rejected_but_layout_is_attached() {
        let src = "tol 0.2\ncontract Demo { storage { slot total: u256; } fn ping() public -> (r: u256) { return total; } }";
        let err = compile(src.as_bytes(), "demo.tol", &options(EmitKind::Toc)).unwrap_err();
        match err {
            CompileError::CodegenRejected { abi_json, storage_json, .. } => {
                assert!(storage_json.contains("total"));
                assert!(abi_json.contains("ping"));
            }
            other => panic!("expected CodegenRejected, got {other:?}"),
        }
    }

    #[test]
    fn parse_errors_are_collected_not_raised_as_a_single_exception() {
        let src = "not a tol file";
        let err = compile(src.as_bytes(), "demo.tol", &options(EmitKind::Toc)).unwrap_err();
        assert!(matches!(err, CompileError::ParseFailed { .. }));
    }

    #[test]
    fn check_errors_surface_as_check_failed() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } fn ping() public { return; } }";
        let err = compile(src.as_bytes(), "demo.tol", &options(EmitKind::Toc)).unwrap_err();
        assert!(matches!(err, CompileError::CheckFailed { .. }));
    }

    #[test]
    fn compiles_to_toi_including_only_public_and_external_functions() {
        let src = "tol 0.2\ncontract Demo { fn a() public { return; } fn b() internal { return; } }";
        let output = compile(src.as_bytes(), "demo.tol", &options(EmitKind::Toi)).expect("compiles");
        let text = String::from_utf8(output.bytes).unwrap();
        let toi = tol_artifact::decode_toi(&text).expect("well-formed");
        assert_eq!(toi.functions.len(), 1);
        assert_eq!(toi.functions[0].name, "a");
    }

    #[test]
    fn compiles_to_tor_bundling_the_toc() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let output = compile(src.as_bytes(), "demo.tol", &options(EmitKind::Tor)).expect("compiles");
        let tor = tol_artifact::decode_tor(&output.bytes).expect("well-formed TOR");
        assert_eq!(tor.files.len(), 1);
        assert_eq!(tor.files[0].0, "Demo.toc");
    }

    #[test]
    fn tor_includes_source_file_when_requested() {
        let src = "tol 0.2\ncontract Demo { fn ping() public { return; } }";
        let mut opts = options(EmitKind::Tor);
        opts.tor.include_source = true;
        let output = compile(src.as_bytes(), "demo.tol", &opts).expect("compiles");
        let tor = tol_artifact::decode_tor(&output.bytes).expect("well-formed TOR");
        assert_eq!(tor.files.len(), 2);
    }

    #[test]
    fn compilation_is_deterministic() {
        let src = "tol 0.2\ncontract Demo { fn ping() public -> (r: u256) { return 1; } }";
        let a = compile(src.as_bytes(), "demo.tol", &options(EmitKind::Toc)).unwrap();
        let b = compile(src.as_bytes(), "demo.tol", &options(EmitKind::Toc)).unwrap();
        assert_eq!(a.bytes, b.bytes);
    }
}
