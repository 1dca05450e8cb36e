//! The `TOL2xxx` diagnostic code catalogue (`spec.md` §4.3, §6).
//!
//! Codes are stable: a code's meaning does not change across versions,
//! only its message text may be refined. Several codes are intentionally
//! reused across more than one structural check where `spec.md` groups
//! them under a single parenthetical (e.g. `TOL2021` covers require/assert
//! shape, member-call emit rejection, and bare `selector(...)` statements
//! — three distinct "payload shape" violations `spec.md` names together).

use tol_base::DiagnosticCode;

pub const DUPLICATE_STORAGE_SLOT: DiagnosticCode = DiagnosticCode("TOL2001");
pub const DUPLICATE_EVENT: DiagnosticCode = DiagnosticCode("TOL2002");
pub const DUPLICATE_FUNCTION: DiagnosticCode = DiagnosticCode("TOL2003");
pub const UNASSIGNABLE_TARGET: DiagnosticCode = DiagnosticCode("TOL2008");
pub const SELECTOR_OVERRIDE_MALFORMED: DiagnosticCode = DiagnosticCode("TOL2010");
pub const DUPLICATE_SELECTOR: DiagnosticCode = DiagnosticCode("TOL2011");
pub const SELECTOR_BUILTIN_INVALID: DiagnosticCode = DiagnosticCode("TOL2012");
pub const SELECTOR_MEMBER_UNRESOLVED: DiagnosticCode = DiagnosticCode("TOL2013");
pub const VISIBILITY_MODIFIER: DiagnosticCode = DiagnosticCode("TOL2014");
pub const MUTABILITY_MODIFIER: DiagnosticCode = DiagnosticCode("TOL2015");
pub const DUPLICATE_PARAM: DiagnosticCode = DiagnosticCode("TOL2016");
pub const RETURN_VALUE_SHAPE: DiagnosticCode = DiagnosticCode("TOL2017");
pub const STORAGE_ACCESS: DiagnosticCode = DiagnosticCode("TOL2018");
pub const CALL_ARITY: DiagnosticCode = DiagnosticCode("TOL2019");
pub const ASSIGN_POSITION: DiagnosticCode = DiagnosticCode("TOL2020");
pub const PAYLOAD_SHAPE: DiagnosticCode = DiagnosticCode("TOL2021");
pub const REVERT_SHAPE: DiagnosticCode = DiagnosticCode("TOL2022");
pub const SELF_CALL_VISIBILITY: DiagnosticCode = DiagnosticCode("TOL2023");
pub const LOOP_CONTROL_OUTSIDE_LOOP: DiagnosticCode = DiagnosticCode("TOL2024");
pub const EMIT_UNDECLARED_EVENT: DiagnosticCode = DiagnosticCode("TOL2025");
pub const CROSS_CLASS_COLLISION: DiagnosticCode = DiagnosticCode("TOL2026");
pub const SELECTOR_OVERRIDE_VISIBILITY: DiagnosticCode = DiagnosticCode("TOL2027");
pub const DUPLICATE_LOCAL: DiagnosticCode = DiagnosticCode("TOL2028");
pub const DUPLICATE_RETURN_NAME: DiagnosticCode = DiagnosticCode("TOL2029");
pub const UNREACHABLE_OR_MISSING_RETURN: DiagnosticCode = DiagnosticCode("TOL2030");
pub const CALL_TARGET_UNDEFINED: DiagnosticCode = DiagnosticCode("TOL2031");
pub const MEMBER_TARGET_UNRESOLVED: DiagnosticCode = DiagnosticCode("TOL2032");
pub const RESERVED_NAME: DiagnosticCode = DiagnosticCode("TOL2033");
