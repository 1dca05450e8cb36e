//! # tol_check
//!
//! The semantic checker (`spec.md` §4.3): name uniqueness, reserved names,
//! modifier validation, selector policy, control-flow termination, and
//! expression/statement shape rules. No type inference — every rule here
//! is structural or name-based, operating directly on the parsed
//! [`tol_syntax::ast::Module`]; there is no separate typed-module
//! representation since validation never changes the tree's shape.
//!
//! ```
//! use tol_syntax::parser::parse;
//!
//! let (module, parse_diags) = parse("tol 0.2\ncontract Demo { fn ping() public { return; } }", "demo.tol");
//! assert!(parse_diags.is_empty());
//! let diags = tol_check::check(&module, "demo.tol");
//! assert!(diags.is_empty());
//! ```

pub mod codes;
mod checker;
mod exprs;
mod flow;
mod names;
mod selectors;
mod symbols;

pub use checker::check;
