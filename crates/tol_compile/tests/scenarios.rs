//! Integration tests encoding the testable properties a complete
//! implementation of this pipeline must satisfy end to end.

use tol_compile::{compile, detect_kind, inspect, pack, verify, CompileOptions, DetectedKind, EmitKind, InspectSummary, VerifyOutcome};

const PING_SRC: &str = "tol 0.2\ncontract Demo { fn ping() public -> (r: u256) { return 1; } }";

#[test]
fn determinism_two_compiles_of_the_same_source_are_byte_identical() {
    for emit in [EmitKind::Toc, EmitKind::Toi, EmitKind::Tor] {
        let options = CompileOptions::new(emit);
        let a = compile(PING_SRC.as_bytes(), "demo.tol", &options).unwrap();
        let b = compile(PING_SRC.as_bytes(), "demo.tol", &options).unwrap();
        assert_eq!(a.bytes, b.bytes, "emit={emit:?} was not deterministic");
    }
}

#[test]
fn round_trip_toc_decode_then_reencode_is_byte_identical() {
    let output = compile(PING_SRC.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
    let decoded = tol_artifact::decode_toc(&output.bytes).unwrap();
    assert_eq!(tol_artifact::encode_toc(&decoded), output.bytes);
}

#[test]
fn round_trip_toi_decode_then_reencode_is_byte_identical() {
    let output = compile(PING_SRC.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toi)).unwrap();
    let text = String::from_utf8(output.bytes.clone()).unwrap();
    let decoded = tol_artifact::decode_toi(&text).unwrap();
    assert_eq!(tol_artifact::encode_toi(&decoded).into_bytes(), output.bytes);
}

#[test]
fn round_trip_tor_decode_then_reencode_is_byte_identical() {
    let output = compile(PING_SRC.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Tor)).unwrap();
    let decoded = tol_artifact::decode_tor(&output.bytes).unwrap();
    assert_eq!(tol_artifact::encode_tor(&decoded), output.bytes);
}

#[test]
fn hash_law_source_hash_and_bytecode_hash_match_their_preimages() {
    let output = compile(PING_SRC.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
    let toc = tol_artifact::decode_toc(&output.bytes).unwrap();
    assert_eq!(toc.source_hash, tol_hash::keccak256(PING_SRC.as_bytes()));
    assert_eq!(toc.bytecode_hash, tol_hash::keccak256(&toc.bytecode));
}

#[test]
fn hash_law_mutating_bytecode_without_recomputing_hash_fails_decode() {
    let output = compile(PING_SRC.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
    let mut toc = tol_artifact::decode_toc(&output.bytes).unwrap();
    toc.bytecode.push(0);
    let tampered = tol_artifact::encode_toc(&toc);
    assert!(tol_artifact::decode_toc(&tampered).is_err());
}

#[test]
fn selector_law_derived_selector_matches_signature_hash() {
    let output = compile(PING_SRC.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
    let toc = tol_artifact::decode_toc(&output.bytes).unwrap();
    let abi = tol_abi::validate_abi_json(&toc.abi_json).unwrap();
    assert_eq!(abi.functions[0].selector, tol_hash::selector_from_signature("ping()"));
}

#[test]
fn selector_law_override_is_used_verbatim() {
    let src = r#"tol 0.2
contract Demo { @selector("0xdeadbeef") fn ping() public { return; } }"#;
    let output = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
    let toc = tol_artifact::decode_toc(&output.bytes).unwrap();
    let abi = tol_abi::validate_abi_json(&toc.abi_json).unwrap();
    assert_eq!(abi.functions[0].selector, "0xdeadbeef");
}

#[test]
fn uniqueness_law_colliding_selector_overrides_are_rejected() {
    let src = r#"tol 0.2
contract Demo {
    @selector("0xdeadbeef") fn a() public { return; }
    @selector("0xdeadbeef") fn b() public { return; }
}"#;
    let err = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap_err();
    assert!(matches!(err, tol_compile::CompileError::CheckFailed { .. }));
}

#[test]
fn termination_law_non_void_function_without_a_return_on_every_path_is_rejected() {
    let src = "tol 0.2\ncontract Demo { fn f(x: u256) public -> (r: u256) { if x > 0 { return 1; } } }";
    let err = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap_err();
    assert!(matches!(err, tol_compile::CompileError::CheckFailed { .. }));
}

#[test]
fn termination_law_non_void_function_terminating_on_every_path_compiles() {
    let src = "tol 0.2\ncontract Demo { fn f(x: u256) public -> (r: u256) { if x > 0 { return 1; } else { return 0; } } }";
    assert!(compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).is_ok());
}

#[test]
fn scenario_compile_inspect_verify_round_trip_for_every_emit_kind() {
    for (emit, kind) in [(EmitKind::Toc, DetectedKind::Toc), (EmitKind::Toi, DetectedKind::Toi), (EmitKind::Tor, DetectedKind::Tor)] {
        let output = compile(PING_SRC.as_bytes(), "demo.tol", &CompileOptions::new(emit)).unwrap();
        assert_eq!(detect_kind(None, &output.bytes).unwrap(), kind);
        assert!(inspect(kind, &output.bytes).is_ok());
        assert_eq!(verify(kind, &output.bytes, None), VerifyOutcome::Ok);
    }
}

#[test]
fn scenario_toc_verify_against_tampered_source_reports_hash_mismatch_with_exit_code_two() {
    let output = compile(PING_SRC.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap();
    let outcome = verify(DetectedKind::Toc, &output.bytes, Some(b"tol 0.2\ncontract Other {}"));
    assert!(matches!(outcome, VerifyOutcome::SourceHashMismatch { .. }));
    assert_eq!(outcome.cli_exit_code(), 2);
}

#[test]
fn scenario_storage_bearing_contract_still_derives_abi_and_storage_layout_before_failing() {
    let src = "tol 0.2\ncontract Demo { storage { slot total: u256; } fn read() public -> (r: u256) { return total; } }";
    let err = compile(src.as_bytes(), "demo.tol", &CompileOptions::new(EmitKind::Toc)).unwrap_err();
    match err {
        tol_compile::CompileError::CodegenRejected { storage_json, abi_json, .. } => {
            assert!(storage_json.contains("\"total\""));
            assert!(abi_json.contains("\"read\""));
        }
        other => panic!("expected CodegenRejected, got {other:?}"),
    }
}

#[test]
fn scenario_pack_a_directory_snapshot_into_a_verifiable_tor() {
    let files = vec![
        ("manifest.json".to_string(), br#"{"package_name":"demo","package_version":"1.0.0"}"#.to_vec()),
        ("contracts/demo.tol".to_string(), PING_SRC.as_bytes().to_vec()),
    ];
    let bytes = pack(files).expect("packs");
    assert_eq!(verify(DetectedKind::Tor, &bytes, None), VerifyOutcome::Ok);
    let summary = inspect(DetectedKind::Tor, &bytes).unwrap();
    match summary {
        InspectSummary::Tor { file_count, .. } => assert_eq!(file_count, 1),
        other => panic!("expected Tor summary, got {other:?}"),
    }
}

#[test]
fn scenario_malformed_artifact_is_a_failed_verify_with_exit_code_one() {
    let outcome = verify(DetectedKind::Toc, b"not a toc at all", None);
    assert!(matches!(outcome, VerifyOutcome::Failed(_)));
    assert_eq!(outcome.cli_exit_code(), 1);
}
