//! # tol_base
//!
//! Pure structural atoms shared across the TOL compiler pipeline.
//!
//! This crate provides the foundational types every later stage builds on:
//!
//! - [`Span`]/[`Pos`] — source location tracking
//! - [`Diagnostic`]/[`DiagnosticCode`] — the namespaced error vocabulary
//!
//! # Design Principles
//!
//! This crate knows nothing about TOL's grammar or bytecode format. It
//! provides only generic infrastructure that `tol_syntax`, `tol_check`,
//! and friends build on top of.

pub mod diagnostic;
pub mod span;

pub use diagnostic::{trace_diagnostic, Diagnostic, DiagnosticCode};
pub use span::{Pos, Span};
