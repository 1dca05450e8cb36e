//! Control-flow termination, break/continue legality, and return-value
//! shape (`spec.md` §4.3 "Control-flow").

use tol_base::Diagnostic;
use tol_syntax::ast::Statement;

use crate::codes;

/// Walks a function-like body and reports:
/// - `break`/`continue` outside a loop (`TOL2024`),
/// - a statement unreachable after a terminator (`TOL2030`),
/// - `return` value-shape mismatches against `is_void` (`TOL2017`).
///
/// Returns whether the body terminates on every reachable path, used by
/// the caller to enforce "non-void functions must return on every path"
/// (`TOL2030`).
pub fn check_body(body: &[Statement], is_void: bool, file: &str, out: &mut Vec<Diagnostic>) -> bool {
    check_block(body, is_void, 0, file, out)
}

fn check_block(stmts: &[Statement], is_void: bool, loop_depth: u32, file: &str, out: &mut Vec<Diagnostic>) -> bool {
    let mut terminated_at: Option<usize> = None;

    for (i, stmt) in stmts.iter().enumerate() {
        if let Some(at) = terminated_at {
            if at < i {
                out.push(Diagnostic::new(
                    codes::UNREACHABLE_OR_MISSING_RETURN,
                    "statement is unreachable after a terminating statement".to_string(),
                    file,
                    stmt.span(),
                ));
            }
            continue;
        }

        let terminates = check_statement(stmt, is_void, loop_depth, file, out);
        if terminates {
            terminated_at = Some(i);
        }
    }

    terminated_at.is_some()
}

/// Returns whether `stmt` itself is a terminating statement (return,
/// revert, or a fully-terminating if/else), per the §4.3 definition.
fn check_statement(stmt: &Statement, is_void: bool, loop_depth: u32, file: &str, out: &mut Vec<Diagnostic>) -> bool {
    match stmt {
        Statement::Return { expr, span } => {
            match (is_void, expr) {
                (true, Some(_)) => out.push(Diagnostic::new(
                    codes::RETURN_VALUE_SHAPE,
                    "void function/constructor/fallback may not return a value".to_string(),
                    file,
                    *span,
                )),
                (false, None) => out.push(Diagnostic::new(
                    codes::RETURN_VALUE_SHAPE,
                    "non-void function must return a value".to_string(),
                    file,
                    *span,
                )),
                _ => {}
            }
            true
        }
        Statement::Revert { .. } => true,
        Statement::Break { span } => {
            if loop_depth == 0 {
                out.push(Diagnostic::new(
                    codes::LOOP_CONTROL_OUTSIDE_LOOP,
                    "'break' outside a loop".to_string(),
                    file,
                    *span,
                ));
            }
            false
        }
        Statement::Continue { span } => {
            if loop_depth == 0 {
                out.push(Diagnostic::new(
                    codes::LOOP_CONTROL_OUTSIDE_LOOP,
                    "'continue' outside a loop".to_string(),
                    file,
                    *span,
                ));
            }
            false
        }
        Statement::If { then_branch, else_branch, .. } => {
            let then_terminates = check_block(then_branch, is_void, loop_depth, file, out);
            match else_branch {
                Some(else_stmts) => {
                    let else_terminates = check_block(else_stmts, is_void, loop_depth, file, out);
                    then_terminates && else_terminates
                }
                None => {
                    false
                }
            }
        }
        Statement::While { body, .. } => {
            check_block(body, is_void, loop_depth + 1, file, out);
            false
        }
        Statement::For { body, .. } => {
            check_block(body, is_void, loop_depth + 1, file, out);
            false
        }
        Statement::Let { .. } | Statement::Set { .. } | Statement::Require { .. } | Statement::Assert { .. } | Statement::Emit { .. } | Statement::Expr { .. } => {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tol_base::{Pos, Span};
    use tol_syntax::ast::Expr;

    fn span() -> Span {
        Span::point(Pos::start())
    }

    fn ret(expr: Option<Expr>) -> Statement {
        Statement::Return { expr, span: span() }
    }

    fn number() -> Expr {
        Expr::Number { text: "1".to_string(), span: span() }
    }

    #[test]
    fn non_void_body_without_return_does_not_terminate() {
        let body = vec![Statement::Break { span: span() }];
        let mut out = Vec::new();
        let terminates = check_body(&body, false, "demo.tol", &mut out);
        assert!(!terminates);
    }

    #[test]
    fn non_void_body_returning_value_terminates() {
        let body = vec![ret(Some(number()))];
        let mut out = Vec::new();
        let terminates = check_body(&body, false, "demo.tol", &mut out);
        assert!(terminates);
        assert!(out.is_empty());
    }

    #[test]
    fn void_return_with_value_is_rejected() {
        let body = vec![ret(Some(number()))];
        let mut out = Vec::new();
        check_body(&body, true, "demo.tol", &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, codes::RETURN_VALUE_SHAPE);
    }

    #[test]
    fn statement_after_return_is_unreachable() {
        let body = vec![ret(None), Statement::Break { span: span() }];
        let mut out = Vec::new();
        check_body(&body, true, "demo.tol", &mut out);
        assert!(out.iter().any(|d| d.code == codes::UNREACHABLE_OR_MISSING_RETURN));
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        let body = vec![Statement::Break { span: span() }];
        let mut out = Vec::new();
        check_body(&body, true, "demo.tol", &mut out);
        assert!(out.iter().any(|d| d.code == codes::LOOP_CONTROL_OUTSIDE_LOOP));
    }

    #[test]
    fn break_inside_while_is_legal() {
        let body = vec![Statement::While { cond: number(), body: vec![Statement::Break { span: span() }], span: span() }];
        let mut out = Vec::new();
        check_body(&body, true, "demo.tol", &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn if_else_both_terminating_terminates_the_block() {
        let body = vec![Statement::If {
            cond: number(),
            then_branch: vec![ret(None)],
            else_branch: Some(vec![ret(None)]),
            span: span(),
        }];
        let mut out = Vec::new();
        let terminates = check_body(&body, true, "demo.tol", &mut out);
        assert!(terminates);
    }

    #[test]
    fn if_without_else_does_not_terminate() {
        let body = vec![Statement::If { cond: number(), then_branch: vec![ret(None)], else_branch: None, span: span() }];
        let mut out = Vec::new();
        let terminates = check_body(&body, true, "demo.tol", &mut out);
        assert!(!terminates);
    }
}
