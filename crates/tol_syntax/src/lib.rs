//! # tol_syntax
//!
//! Lexer, token kinds, AST, and recursive-descent parser for the TOL
//! surface language (`spec.md` §4.1–§4.2, §6).
//!
//! ```
//! use tol_syntax::parser::parse;
//!
//! let (module, diagnostics) = parse("tol 0.2\ncontract Demo { fn ping() public { return; } }", "demo.tol");
//! assert!(diagnostics.is_empty());
//! assert_eq!(module.contract.name, "Demo");
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Module;
pub use parser::parse;
