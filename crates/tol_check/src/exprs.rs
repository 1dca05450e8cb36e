//! Expression-level rules: assignment targets, storage access, calls and
//! events, selector expressions, require/assert/revert/emit payload shape,
//! and bare expression-statement shape (`spec.md` §4.3).

use tol_base::{Diagnostic, Span};
use tol_syntax::ast::{Expr, Statement};

use crate::codes;
use crate::symbols::{classify_slot_type, mapping_depth, ContractSymbols, SlotShape};

enum StorageOp<'e> {
    Index(&'e Expr),
    Member(&'e str, Span),
}

/// Walks `object`/`index` chains down to a root identifier, returning the
/// root name and the sequence of member/index operations applied to it
/// (innermost first). Returns `None` for any chain that does not bottom
/// out directly at an identifier (e.g. `(a + b).member`), since such
/// chains cannot be storage or selector references.
fn collect_chain(expr: &Expr) -> Option<(&str, Vec<StorageOp<'_>>)> {
    match expr {
        Expr::Ident { name, .. } => Some((name.as_str(), Vec::new())),
        Expr::Index { object, index, .. } => {
            let (root, mut ops) = collect_chain(object)?;
            ops.push(StorageOp::Index(index));
            Some((root, ops))
        }
        Expr::Member { object, name, span, .. } => {
            let (root, mut ops) = collect_chain(object)?;
            ops.push(StorageOp::Member(name.as_str(), *span));
            Some((root, ops))
        }
        _ => None,
    }
}

pub struct ExprChecker<'a> {
    pub contract_name: &'a str,
    pub symbols: &'a ContractSymbols<'a>,
    pub has_events: bool,
    pub file: &'a str,
}

impl<'a> ExprChecker<'a> {
    /// Entry point for a statement appearing in a function/constructor/
    /// fallback body. Dispatches payload-shape rules per statement kind.
    pub fn check_statement(&self, stmt: &Statement, out: &mut Vec<Diagnostic>) {
        match stmt {
            Statement::Let { expr, .. } => {
                if let Some(e) = expr {
                    self.check_expr(e, out);
                }
            }
            Statement::Set { target, expr, .. } => {
                self.check_assignable_target(target, out);
                self.check_expr(expr, out);
            }
            Statement::Require { expr, .. } | Statement::Assert { expr, .. } => {
                self.check_expr(expr, out);
            }
            Statement::Revert { expr, span } => {
                if let Some(e) = expr {
                    if !matches!(e, Expr::String { .. }) {
                        out.push(Diagnostic::new(
                            codes::REVERT_SHAPE,
                            "revert payload must be a single string literal".to_string(),
                            self.file,
                            *span,
                        ));
                    }
                }
            }
            Statement::Emit { expr, span } => self.check_emit(expr, *span, out),
            Statement::If { cond, then_branch, else_branch, .. } => {
                self.check_expr(cond, out);
                for s in then_branch {
                    self.check_statement(s, out);
                }
                if let Some(else_stmts) = else_branch {
                    for s in else_stmts {
                        self.check_statement(s, out);
                    }
                }
            }
            Statement::While { cond, body, .. } => {
                self.check_expr(cond, out);
                for s in body {
                    self.check_statement(s, out);
                }
            }
            Statement::For { init, cond, post, body, .. } => {
                if let Some(init) = init {
                    self.check_statement(init, out);
                }
                if let Some(c) = cond {
                    self.check_expr(c, out);
                }
                if let Some(post) = post {
                    self.check_statement(post, out);
                }
                for s in body {
                    self.check_statement(s, out);
                }
            }
            Statement::Expr { expr, span } => self.check_top_level_expr_statement(expr, *span, out),
            Statement::Return { expr, .. } => {
                if let Some(e) = expr {
                    self.check_expr(e, out);
                }
            }
            Statement::Break { .. } | Statement::Continue { .. } => {}
        }
    }

    /// A bare expression statement (and the `init`/`post` clauses of a
    /// `for`, which the parser represents the same way) must be a call or
    /// an assignment with a valid lvalue target (`TOL2020`/`TOL2021`).
    fn check_top_level_expr_statement(&self, expr: &Expr, span: Span, out: &mut Vec<Diagnostic>) {
        match expr {
            Expr::Call { callee, .. } if is_selector_builtin(callee) => {
                out.push(Diagnostic::new(
                    codes::PAYLOAD_SHAPE,
                    "'selector(...)' has no side effect and may not appear as a statement".to_string(),
                    self.file,
                    span,
                ));
            }
            Expr::Call { .. } => self.check_expr(expr, out),
            Expr::Assign { target, value, .. } => {
                self.check_assignable_target(target, out);
                self.check_expr(value, out);
            }
            _ => {
                out.push(Diagnostic::new(
                    codes::PAYLOAD_SHAPE,
                    "a bare expression statement must be a call or an assignment".to_string(),
                    self.file,
                    span,
                ));
            }
        }
    }

    fn check_assignable_target(&self, target: &Expr, out: &mut Vec<Diagnostic>) {
        match target {
            Expr::Ident { .. } => {}
            Expr::Member { name, span, .. } if name == "length" => {
                out.push(Diagnostic::new(
                    codes::UNASSIGNABLE_TARGET,
                    "'.length' of a storage array is read-only".to_string(),
                    self.file,
                    *span,
                ));
            }
            Expr::Member { .. } | Expr::Index { .. } => {
                self.check_expr(target, out);
            }
            _ => {
                out.push(Diagnostic::new(
                    codes::UNASSIGNABLE_TARGET,
                    "assignment target must be a name, storage reference, or member/index chain".to_string(),
                    self.file,
                    target.span(),
                ));
            }
        }
    }

    fn check_emit(&self, expr: &Expr, span: Span, out: &mut Vec<Diagnostic>) {
        match expr {
            Expr::Call { callee, args, .. } => match &**callee {
                Expr::Ident { name, .. } => {
                    if self.has_events {
                        match self.symbols.events.get(name.as_str()) {
                            Some(event) if event.params.len() != args.len() => {
                                out.push(Diagnostic::new(
                                    codes::CALL_ARITY,
                                    format!(
                                        "event '{name}' expects {} argument(s), found {}",
                                        event.params.len(),
                                        args.len()
                                    ),
                                    self.file,
                                    span,
                                ));
                            }
                            Some(_) => {}
                            None => {
                                out.push(Diagnostic::new(
                                    codes::EMIT_UNDECLARED_EVENT,
                                    format!("'{name}' is not a declared event"),
                                    self.file,
                                    span,
                                ));
                            }
                        }
                    }
                    for a in args {
                        self.check_expr(a, out);
                    }
                }
                Expr::Member { .. } => {
                    out.push(Diagnostic::new(
                        codes::PAYLOAD_SHAPE,
                        "emit payload may not be a member-call expression".to_string(),
                        self.file,
                        span,
                    ));
                }
                _ => {
                    out.push(Diagnostic::new(codes::PAYLOAD_SHAPE, "emit payload must be a direct call expression".to_string(), self.file, span));
                }
            },
            _ => {
                out.push(Diagnostic::new(codes::PAYLOAD_SHAPE, "emit payload must be a direct call expression".to_string(), self.file, span));
            }
        }
    }

    fn check_selector_builtin(&self, args: &[Expr], span: Span, out: &mut Vec<Diagnostic>) {
        if args.len() != 1 {
            out.push(Diagnostic::new(
                codes::SELECTOR_BUILTIN_INVALID,
                "'selector(...)' takes exactly one string-literal argument".to_string(),
                self.file,
                span,
            ));
            return;
        }
        match args[0].string_literal_content() {
            Some(content) if looks_like_canonical_signature(&content) => {}
            _ => out.push(Diagnostic::new(
                codes::SELECTOR_BUILTIN_INVALID,
                "'selector(...)' argument must be a string literal containing a canonical signature".to_string(),
                self.file,
                span,
            )),
        }
    }

    fn check_selector_member(&self, root: &str, fname_ops: &[StorageOp<'_>], span: Span, out: &mut Vec<Diagnostic>) {
        if root != "this" && root != self.contract_name {
            out.push(Diagnostic::new(codes::SELECTOR_MEMBER_UNRESOLVED, "'.selector' must be taken on 'this.f' or 'Contract.f'".to_string(), self.file, span));
            return;
        }
        let [StorageOp::Member(fname, _)] = fname_ops else {
            out.push(Diagnostic::new(codes::SELECTOR_MEMBER_UNRESOLVED, "'.selector' must be taken on a single function reference".to_string(), self.file, span));
            return;
        };
        match self.symbols.functions.get(fname) {
            Some(f) if ContractSymbols::is_public_or_external(f) => {}
            Some(_) => out.push(Diagnostic::new(
                codes::SELECTOR_MEMBER_UNRESOLVED,
                format!("'{fname}' is not public or external"),
                self.file,
                span,
            )),
            None => out.push(Diagnostic::new(codes::SELECTOR_MEMBER_UNRESOLVED, format!("'{fname}' is not a declared function"), self.file, span)),
        }
    }

    fn check_storage_ops(&self, slot_type_text: &str, ops: &[StorageOp<'_>], span: Span, out: &mut Vec<Diagnostic>) {
        match classify_slot_type(slot_type_text) {
            SlotShape::Scalar => {
                if !ops.is_empty() {
                    out.push(Diagnostic::new(codes::STORAGE_ACCESS, "scalar storage slots may not be indexed or accessed via member".to_string(), self.file, span));
                }
            }
            SlotShape::Array => match ops {
                [StorageOp::Index(_)] => {}
                [StorageOp::Member(name, _)] if *name == "length" => {}
                _ => out.push(Diagnostic::new(codes::STORAGE_ACCESS, "array storage slots support only '[i]' or '.length'".to_string(), self.file, span)),
            },
            SlotShape::Mapping => {
                let depth = mapping_depth(slot_type_text);
                let has_member = ops.iter().any(|op| matches!(op, StorageOp::Member(..)));
                if has_member || ops.len() != depth {
                    out.push(Diagnostic::new(
                        codes::STORAGE_ACCESS,
                        "mapping storage slot must be indexed down to its scalar value type, in a single expression".to_string(),
                        self.file,
                        span,
                    ));
                }
            }
        }
    }

    /// General recursive expression validation. Rejects a nested `assign`
    /// expression (`TOL2020`), resolves storage chains and `.selector`
    /// member references, and validates call targets/arity.
    pub fn check_expr(&self, expr: &Expr, out: &mut Vec<Diagnostic>) {
        match expr {
            Expr::Ident { .. } | Expr::Number { .. } | Expr::String { .. } => {}
            Expr::Paren { inner, .. } => self.check_expr(inner, out),
            Expr::Unary { expr, .. } => self.check_expr(expr, out),
            Expr::Binary { left, right, .. } => {
                self.check_expr(left, out);
                self.check_expr(right, out);
            }
            Expr::Assign { span, target, value, .. } => {
                out.push(Diagnostic::new(codes::ASSIGN_POSITION, "nested assignment is only permitted as a statement or 'for' clause".to_string(), self.file, *span));
                self.check_expr(target, out);
                self.check_expr(value, out);
            }
            Expr::Call { callee, args, span } => self.check_call(callee, args, *span, out),
            Expr::Member { .. } | Expr::Index { .. } => self.check_member_or_index(expr, out),
        }
    }

    fn check_call(&self, callee: &Expr, args: &[Expr], span: Span, out: &mut Vec<Diagnostic>) {
        match callee {
            Expr::Ident { name, .. } if name == "selector" => self.check_selector_builtin(args, span, out),
            Expr::Ident { name, .. } => {
                out.push(Diagnostic::new(codes::CALL_TARGET_UNDEFINED, format!("'{name}' does not resolve to a callable target"), self.file, span));
                for a in args {
                    self.check_expr(a, out);
                }
            }
            Expr::Member { object, name, span: mspan, .. } if name == "push" => {
                self.check_push_call(object, args, *mspan, out);
            }
            Expr::Member { object, name, span: mspan, .. } => {
                if let Expr::Ident { name: obj_name, .. } = &**object {
                    if obj_name == "this" || obj_name == self.contract_name {
                        self.check_self_dispatch(name, args, *mspan, out);
                        return;
                    }
                }
                out.push(Diagnostic::new(codes::MEMBER_TARGET_UNRESOLVED, "call target does not resolve to a declared function".to_string(), self.file, *mspan));
                self.check_expr(object, out);
                for a in args {
                    self.check_expr(a, out);
                }
            }
            _ => {
                self.check_expr(callee, out);
                for a in args {
                    self.check_expr(a, out);
                }
            }
        }
    }

    fn check_self_dispatch(&self, fname: &str, args: &[Expr], span: Span, out: &mut Vec<Diagnostic>) {
        match self.symbols.functions.get(fname) {
            Some(f) => {
                if !ContractSymbols::is_public_or_external(f) {
                    out.push(Diagnostic::new(codes::SELF_CALL_VISIBILITY, format!("'{fname}' is internal/private and cannot be dispatched through self-member call"), self.file, span));
                }
                if f.params.len() != args.len() {
                    out.push(Diagnostic::new(codes::CALL_ARITY, format!("'{fname}' expects {} argument(s), found {}", f.params.len(), args.len()), self.file, span));
                }
            }
            None => out.push(Diagnostic::new(codes::CALL_TARGET_UNDEFINED, format!("'{fname}' is not a declared function"), self.file, span)),
        }
        for a in args {
            self.check_expr(a, out);
        }
    }

    fn check_push_call(&self, object: &Expr, args: &[Expr], span: Span, out: &mut Vec<Diagnostic>) {
        if let Some((root, ops)) = collect_chain(object) {
            if ops.is_empty() {
                if let Some(slot) = self.symbols.slots.get(root) {
                    if classify_slot_type(&slot.type_text) == SlotShape::Array {
                        if args.len() != 1 {
                            out.push(Diagnostic::new(codes::CALL_ARITY, "'.push' expects exactly one argument".to_string(), self.file, span));
                        }
                        for a in args {
                            self.check_expr(a, out);
                        }
                        return;
                    }
                }
            }
        }
        out.push(Diagnostic::new(codes::STORAGE_ACCESS, "'.push' is only valid on an array storage slot".to_string(), self.file, span));
        for a in args {
            self.check_expr(a, out);
        }
    }

    fn check_member_or_index(&self, expr: &Expr, out: &mut Vec<Diagnostic>) {
        if let Some((root, ops)) = collect_chain(expr) {
            if let Some(slot) = self.symbols.slots.get(root) {
                self.check_storage_ops(&slot.type_text, &ops, expr.span(), out);
                for op in &ops {
                    if let StorageOp::Index(idx) = op {
                        self.check_expr(idx, out);
                    }
                }
                return;
            }
            if let Some((last, rest)) = ops.split_last() {
                if let StorageOp::Member(name, mspan) = last {
                    if *name == "selector" {
                        self.check_selector_member(root, rest, *mspan, out);
                        return;
                    }
                }
            }
        }
        match expr {
            Expr::Index { object, index, .. } => {
                self.check_expr(object, out);
                self.check_expr(index, out);
            }
            Expr::Member { object, .. } => self.check_expr(object, out),
            _ => unreachable!("check_member_or_index only called on Member/Index"),
        }
    }
}

fn is_selector_builtin(callee: &Expr) -> bool {
    matches!(callee, Expr::Ident { name, .. } if name == "selector")
}

/// A light structural check for `name(type1,type2,...)`: identifier start,
/// balanced trailing parens, no embedded whitespace. The deriver is the
/// authority on what a "type" looks like (`spec.md` §6 "surface-level
/// checks only"), so this only rejects shapes that could not possibly be
/// canonical signatures.
fn looks_like_canonical_signature(s: &str) -> bool {
    let Some(open) = s.find('(') else { return false };
    if !s.ends_with(')') {
        return false;
    }
    let name = &s[..open];
    if name.is_empty() || !name.chars().next().unwrap().is_ascii_alphabetic() && !name.starts_with('_') {
        return false;
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    !s.contains(' ') && !s.contains('\t')
}
