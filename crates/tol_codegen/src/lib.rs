//! # tol_codegen
//!
//! Compiles a [`tol_lower::LoweredProgram`] into the deterministic
//! function-prototype bytecode of `spec.md` §4.5: one prototype per
//! contract member (the contract's own selector-dispatch table, then each
//! function, then the constructor, then the fallback, all in declaration
//! order), a constants table per prototype sorted by first appearance, and
//! two-pass jump patching for every branch and loop.
//!
//! Codegen assumes its input already passed [`tol_check::check`] — every
//! shape rule has already been validated — so a construct this backend
//! cannot compile is reported as [`CodegenError::UnsupportedFeature`]
//! rather than silently miscompiled; see that variant's doc comment for
//! why it is currently unreachable in practice.

mod constants;
mod emitter;
mod error;
mod opcode;
mod prototype;

pub use constants::ConstValue;
pub use error::CodegenError;
pub use opcode::Op;
pub use prototype::{decode_module, encode_module, BytecodeModule, Prototype};

use tol_lower::LoweredProgram;

/// Compiles and encodes a lowered program in one step.
pub fn compile(program: &LoweredProgram) -> Result<Vec<u8>, CodegenError> {
    let module = prototype::compile(program)?;
    Ok(encode_module(&module))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tol_syntax::parser::parse;

    fn lowered(src: &str) -> LoweredProgram {
        let (module, diags) = parse(src, "demo.tol");
        assert!(diags.is_empty(), "{diags:?}");
        tol_lower::lower(&module)
    }

    #[test]
    fn compiles_and_decodes_a_simple_contract() {
        let program = lowered("tol 0.2\ncontract Demo { fn ping() public -> (r: u256) { return 1; } }");
        let bytes = compile(&program).expect("compiles");
        let decoded = decode_module(&bytes).expect("decodes");
        assert_eq!(decoded.contract_name, "Demo");
        assert_eq!(decoded.storage_count, 0);
        // dispatch prototype + one function prototype
        assert_eq!(decoded.prototypes.len(), 2);
    }

    #[test]
    fn storage_backed_program_is_rejected() {
        let program = lowered(
            "tol 0.2\ncontract Demo { storage { slot total: u256; } fn ping() public -> (r: u256) { return total; } }",
        );
        assert!(matches!(compile(&program), Err(CodegenError::UnsupportedFeature(_))));
    }

    #[test]
    fn encoding_is_deterministic() {
        let program = lowered("tol 0.2\ncontract Demo { fn ping() public { return; } }");
        assert_eq!(compile(&program).unwrap(), compile(&program).unwrap());
    }

    #[test]
    fn dispatch_prototype_carries_one_entry_per_public_function() {
        let program = lowered(
            "tol 0.2\ncontract Demo { fn a() public { return; } fn b() external { return; } fn c() internal { return; } }",
        );
        let bytes = compile(&program).unwrap();
        let decoded = decode_module(&bytes).unwrap();
        let dispatch = &decoded.prototypes[0];
        let dispatch_entries = dispatch.code.iter().filter(|&&b| b == Op::SelectorDispatch as u8).count();
        assert_eq!(dispatch_entries, 2);
        // dispatch + a + b + c
        assert_eq!(decoded.prototypes.len(), 4);
    }

    #[test]
    fn if_else_and_loops_round_trip_through_decode() {
        let program = lowered(
            r#"tol 0.2
contract Demo {
    fn classify(x: u256) public -> (r: u256) {
        let total: u256 = 0;
        if x > 10 {
            total = 1;
        } else {
            total = 2;
        }
        for (let i: u256 = 0; i < x; i = i + 1) {
            if i == 5 {
                break;
            }
            total = total + i;
        }
        while total < x {
            total = total + 1;
        }
        return total;
    }
}"#,
        );
        let bytes = compile(&program).expect("compiles");
        decode_module(&bytes).expect("well-formed bytecode with valid jump targets");
    }

    #[test]
    fn selector_builtin_and_member_resolve_at_compile_time() {
        let program = lowered(
            r#"tol 0.2
contract Demo {
    fn ping() public -> (r: u256) {
        let a: u256 = selector("ping()");
        let b: u256 = this.ping.selector;
        return a;
    }
}"#,
        );
        compile(&program).expect("compiles");
    }

    #[test]
    fn constructor_and_fallback_get_their_own_prototypes() {
        let program = lowered(
            r#"tol 0.2
contract Demo {
    constructor(owner: address) { return; }
    fallback() { return; }
}"#,
        );
        let bytes = compile(&program).unwrap();
        let decoded = decode_module(&bytes).unwrap();
        assert_eq!(decoded.prototypes.len(), 3);
        assert_eq!(decoded.prototypes[1].name, "constructor");
        assert_eq!(decoded.prototypes[2].name, "fallback");
    }

    #[test]
    fn decode_rejects_truncated_bytes() {
        let program = lowered("tol 0.2\ncontract Demo { fn ping() public { return; } }");
        let mut bytes = compile(&program).unwrap();
        bytes.truncate(bytes.len() - 3);
        assert!(decode_module(&bytes).is_err());
    }

    #[test]
    fn decode_rejects_bad_magic() {
        let mut bytes = vec![0u8; 16];
        bytes[0] = 0xff;
        assert!(matches!(decode_module(&bytes), Err(CodegenError::BadMagic)));
    }

    #[test]
    fn decode_rejects_unknown_opcode() {
        let program = lowered("tol 0.2\ncontract Demo { fn ping() public { return; } }");
        let mut bytes = compile(&program).unwrap();
        // Corrupt the last byte of the dispatch prototype's code (a
        // terminator opcode) into an unrecognized opcode byte.
        let last = bytes.len() - 1;
        bytes[last] = 0xee;
        assert!(decode_module(&bytes).is_err());
    }
}
