//! Walks a checked, lowered function/constructor/fallback body and emits
//! its bytecode into one [`crate::prototype::Prototype`].
//!
//! This assumes the body already passed `tol_check::check`: every shape
//! rule (assignment targets, storage-chain depth, call arity, selector
//! references) has already been validated, so the emitter's job is purely
//! mechanical translation, not re-validation. The one place a checked
//! program could still reach a construct this backend has no opcode for
//! is reported as [`crate::error::CodegenError::UnsupportedFeature`]
//! rather than silently miscompiled.

use std::collections::HashMap;

use tol_syntax::ast::{BinaryOp, Expr, Statement, UnaryOp};

use crate::constants::ConstPool;
use crate::error::CodegenError;
use crate::opcode::Op;

enum ChainOp<'e> {
    Index(&'e Expr),
    Member(&'e str),
}

/// Walks `object`/`index` chains down to a root identifier. Mirrors the
/// checker's own chain walker; duplicated here rather than shared because
/// this one never produces diagnostics and only needs the final shape.
fn collect_chain(expr: &Expr) -> Option<(&str, Vec<ChainOp<'_>>)> {
    match expr {
        Expr::Ident { name, .. } => Some((name.as_str(), Vec::new())),
        Expr::Index { object, index, .. } => {
            let (root, mut ops) = collect_chain(object)?;
            ops.push(ChainOp::Index(index));
            Some((root, ops))
        }
        Expr::Member { object, name, .. } => {
            let (root, mut ops) = collect_chain(object)?;
            ops.push(ChainOp::Member(name.as_str()));
            Some((root, ops))
        }
        _ => None,
    }
}

enum ContinueTarget {
    Known(u32),
    Patches(Vec<usize>),
}

struct LoopCtx {
    break_patches: Vec<usize>,
    continue_target: ContinueTarget,
}

pub struct Emitter<'p> {
    pub prototype_name: &'p str,
    storage_index: &'p HashMap<&'p str, u16>,
    function_index: &'p HashMap<&'p str, u32>,
    function_selectors: &'p HashMap<&'p str, String>,
    function_is_void: &'p HashMap<&'p str, bool>,
    event_index: &'p HashMap<&'p str, u16>,
    contract_name: &'p str,
    scopes: Vec<Vec<(String, u16)>>,
    next_local: u16,
    code: Vec<u8>,
    consts: ConstPool,
    loop_stack: Vec<LoopCtx>,
}

/// Rough bytes-per-statement used to pre-size the opcode buffer; an
/// underestimate only costs a reallocation, never correctness.
const BYTES_PER_STATEMENT_ESTIMATE: usize = 4;

impl<'p> Emitter<'p> {
    pub fn new(
        prototype_name: &'p str,
        param_names: &[String],
        storage_index: &'p HashMap<&'p str, u16>,
        function_index: &'p HashMap<&'p str, u32>,
        function_selectors: &'p HashMap<&'p str, String>,
        function_is_void: &'p HashMap<&'p str, bool>,
        event_index: &'p HashMap<&'p str, u16>,
        contract_name: &'p str,
        body: &[Statement],
    ) -> Self {
        let params = param_names.iter().enumerate().map(|(i, n)| (n.clone(), i as u16)).collect::<Vec<_>>();
        let next_local = params.len() as u16;
        Self {
            prototype_name,
            storage_index,
            function_index,
            function_selectors,
            function_is_void,
            event_index,
            contract_name,
            scopes: vec![params],
            next_local,
            code: Vec::with_capacity(tol_lower::statement_count(body) * BYTES_PER_STATEMENT_ESTIMATE),
            consts: ConstPool::new(),
            loop_stack: Vec::new(),
        }
    }

    pub fn finish(self) -> (Vec<u8>, ConstPool, u16) {
        (self.code, self.consts, self.next_local)
    }

    /// Appends a trailing `ReturnVoid`. Harmless dead code after a body
    /// whose every reachable path already returns (the checker guarantees
    /// this for non-void functions); the real terminator for a body that
    /// falls off the end without an explicit `return` (legal for `void`
    /// functions, constructors, and fallbacks).
    pub fn terminate_void(&mut self) {
        self.emit_op(Op::ReturnVoid);
    }

    fn err_unsupported(&self, what: &str) -> CodegenError {
        CodegenError::UnsupportedFeature(format!("{what} in '{}'", self.prototype_name))
    }

    fn emit_u8(&mut self, b: u8) {
        self.code.push(b);
    }

    fn emit_u16(&mut self, v: u16) {
        self.code.extend_from_slice(&v.to_be_bytes());
    }

    fn emit_u32(&mut self, v: u32) {
        self.code.extend_from_slice(&v.to_be_bytes());
    }

    fn emit_op(&mut self, op: Op) {
        self.emit_u8(op as u8);
    }

    fn here(&self) -> u32 {
        self.code.len() as u32
    }

    fn emit_jump(&mut self, op: Op) -> usize {
        self.emit_op(op);
        let pos = self.code.len();
        self.emit_u32(0);
        pos
    }

    fn patch_jump(&mut self, pos: usize, target: u32) {
        self.code[pos..pos + 4].copy_from_slice(&target.to_be_bytes());
    }

    fn push_scope(&mut self, seed: Vec<(String, u16)>) {
        self.scopes.push(seed);
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn resolve_local(&self, name: &str) -> Option<u16> {
        self.scopes.iter().rev().find_map(|frame| frame.iter().rev().find(|(n, _)| n == name).map(|(_, i)| *i))
    }

    fn declare_local(&mut self, name: &str) -> u16 {
        let idx = self.next_local;
        self.next_local += 1;
        self.scopes.last_mut().expect("at least one scope active").push((name.to_string(), idx));
        idx
    }

    fn storage_slot(&self, name: &str) -> Option<u16> {
        self.storage_index.get(name).copied()
    }

    pub fn compile_block(&mut self, stmts: &[Statement]) -> Result<(), CodegenError> {
        self.push_scope(Vec::new());
        for s in stmts {
            self.compile_statement(s)?;
        }
        self.pop_scope();
        Ok(())
    }

    fn compile_statement(&mut self, stmt: &Statement) -> Result<(), CodegenError> {
        match stmt {
            Statement::Let { name, expr, .. } => {
                match expr {
                    Some(e) => self.compile_expr(e)?,
                    None => {
                        let idx = self.consts.intern_number("0");
                        self.emit_op(Op::PushConst);
                        self.emit_u16(idx);
                    }
                }
                let idx = self.declare_local(name);
                self.emit_op(Op::StoreLocal);
                self.emit_u16(idx);
                Ok(())
            }
            Statement::Set { target, expr, .. } => {
                self.compile_expr(expr)?;
                self.compile_store(target)
            }
            Statement::Return { expr, .. } => match expr {
                Some(e) => {
                    self.compile_expr(e)?;
                    self.emit_op(Op::Return);
                    Ok(())
                }
                None => {
                    self.emit_op(Op::ReturnVoid);
                    Ok(())
                }
            },
            Statement::Break { .. } => {
                let pos = self.emit_jump(Op::Jump);
                if self.loop_stack.is_empty() {
                    return Err(self.err_unsupported("'break' outside a loop"));
                }
                let ctx = self.loop_stack.last_mut().unwrap();
                ctx.break_patches.push(pos);
                Ok(())
            }
            Statement::Continue { .. } => {
                let target = match self.loop_stack.last() {
                    Some(LoopCtx { continue_target: ContinueTarget::Known(t), .. }) => Some(*t),
                    Some(LoopCtx { continue_target: ContinueTarget::Patches(_), .. }) => None,
                    None => return Err(self.err_unsupported("'continue' outside a loop")),
                };
                match target {
                    Some(t) => {
                        self.emit_op(Op::Jump);
                        self.emit_u32(t);
                    }
                    None => {
                        let pos = self.emit_jump(Op::Jump);
                        if let Some(LoopCtx { continue_target: ContinueTarget::Patches(patches), .. }) = self.loop_stack.last_mut() {
                            patches.push(pos);
                        }
                    }
                }
                Ok(())
            }
            Statement::Require { expr, text, .. } => {
                self.compile_expr(expr)?;
                let msg = self.consts.intern_str(text);
                self.emit_op(Op::Require);
                self.emit_u16(msg);
                Ok(())
            }
            Statement::Assert { expr, text, .. } => {
                self.compile_expr(expr)?;
                let msg = self.consts.intern_str(text);
                self.emit_op(Op::Assert);
                self.emit_u16(msg);
                Ok(())
            }
            Statement::Revert { expr, .. } => {
                let msg = match expr.as_ref().and_then(|e| e.string_literal_content()) {
                    Some(text) => self.consts.intern_str(&text),
                    None => u16::MAX,
                };
                self.emit_op(Op::Revert);
                self.emit_u16(msg);
                Ok(())
            }
            Statement::Emit { expr, .. } => self.compile_emit(expr),
            Statement::If { cond, then_branch, else_branch, .. } => {
                self.compile_expr(cond)?;
                let to_else = self.emit_jump(Op::JumpIfFalse);
                self.compile_block(then_branch)?;
                match else_branch {
                    Some(else_stmts) => {
                        let to_end = self.emit_jump(Op::Jump);
                        let here = self.here();
                        self.patch_jump(to_else, here);
                        self.compile_block(else_stmts)?;
                        let here = self.here();
                        self.patch_jump(to_end, here);
                    }
                    None => {
                        let here = self.here();
                        self.patch_jump(to_else, here);
                    }
                }
                Ok(())
            }
            Statement::While { cond, body, .. } => {
                let loop_start = self.here();
                self.compile_expr(cond)?;
                let exit = self.emit_jump(Op::JumpIfFalse);
                self.loop_stack.push(LoopCtx { break_patches: Vec::new(), continue_target: ContinueTarget::Known(loop_start) });
                self.compile_block(body)?;
                self.emit_op(Op::Jump);
                self.emit_u32(loop_start);
                let ctx = self.loop_stack.pop().expect("pushed above");
                let here = self.here();
                self.patch_jump(exit, here);
                for p in ctx.break_patches {
                    self.patch_jump(p, here);
                }
                Ok(())
            }
            Statement::For { init, cond, post, body, .. } => {
                self.push_scope(Vec::new());
                if let Some(init) = init {
                    self.compile_statement(init)?;
                }
                let loop_start = self.here();
                let exit = match cond {
                    Some(c) => {
                        self.compile_expr(c)?;
                        Some(self.emit_jump(Op::JumpIfFalse))
                    }
                    None => None,
                };
                self.loop_stack.push(LoopCtx { break_patches: Vec::new(), continue_target: ContinueTarget::Patches(Vec::new()) });
                self.compile_block(body)?;
                let post_start = self.here();
                let ctx = self.loop_stack.pop().expect("pushed above");
                if let ContinueTarget::Patches(patches) = ctx.continue_target {
                    for p in patches {
                        self.patch_jump(p, post_start);
                    }
                }
                if let Some(post) = post {
                    self.compile_statement(post)?;
                }
                self.emit_op(Op::Jump);
                self.emit_u32(loop_start);
                let here = self.here();
                if let Some(exit) = exit {
                    self.patch_jump(exit, here);
                }
                for p in ctx.break_patches {
                    self.patch_jump(p, here);
                }
                self.pop_scope();
                Ok(())
            }
            Statement::Expr { expr, .. } => self.compile_top_level_expr(expr),
        }
    }

    fn compile_top_level_expr(&mut self, expr: &Expr) -> Result<(), CodegenError> {
        match expr {
            Expr::Assign { target, value, .. } => {
                self.compile_expr(value)?;
                self.compile_store(target)
            }
            _ => {
                let pushes_value = !self.call_is_void(expr);
                self.compile_expr(expr)?;
                if pushes_value {
                    self.emit_op(Op::Pop);
                }
                Ok(())
            }
        }
    }

    /// Whether a bare expression statement leaves nothing to discard: a
    /// `.push` call, or a self-dispatch call to a `void` function.
    fn call_is_void(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Call { callee, .. } if is_push_call(callee) => true,
            Expr::Call { callee, .. } => match &**callee {
                Expr::Member { object, name, .. } => match &**object {
                    Expr::Ident { name: obj_name, .. } if obj_name == "this" || obj_name == self.contract_name => {
                        self.function_is_void.get(name.as_str()).copied().unwrap_or(false)
                    }
                    _ => false,
                },
                _ => false,
            },
            _ => false,
        }
    }

    fn compile_store(&mut self, target: &Expr) -> Result<(), CodegenError> {
        if let Expr::Ident { name, .. } = target {
            if let Some(idx) = self.resolve_local(name) {
                self.emit_op(Op::StoreLocal);
                self.emit_u16(idx);
                return Ok(());
            }
            if let Some(idx) = self.storage_slot(name) {
                self.emit_op(Op::StorageStoreScalar);
                self.emit_u16(idx);
                return Ok(());
            }
            return Err(self.err_unsupported(&format!("assignment to unresolved name '{name}'")));
        }
        let Some((root, ops)) = collect_chain(target) else {
            return Err(self.err_unsupported("assignment to a non-chain target"));
        };
        let Some(slot_idx) = self.storage_slot(root) else {
            return Err(self.err_unsupported(&format!("assignment through unresolved root '{root}'")));
        };
        let mut depth = 0u8;
        for op in &ops {
            if let ChainOp::Index(idx_expr) = op {
                self.compile_expr(idx_expr)?;
                depth += 1;
            }
        }
        self.emit_op(Op::StorageStoreIndexed);
        self.emit_u16(slot_idx);
        self.emit_u8(depth);
        Ok(())
    }

    fn compile_emit(&mut self, expr: &Expr) -> Result<(), CodegenError> {
        let Expr::Call { callee, args, .. } = expr else {
            return Err(self.err_unsupported("emit payload that is not a call"));
        };
        let Expr::Ident { name, .. } = &**callee else {
            return Err(self.err_unsupported("emit target that is not a direct event name"));
        };
        let event_idx = *self.event_index.get(name.as_str()).ok_or_else(|| self.err_unsupported(&format!("emit of undeclared event '{name}'")))?;
        for a in args {
            self.compile_expr(a)?;
        }
        self.emit_op(Op::Emit);
        self.emit_u16(event_idx);
        self.emit_u8(args.len() as u8);
        Ok(())
    }

    /// Compiles any expression used in value position; always leaves
    /// exactly one value on the stack.
    fn compile_expr(&mut self, expr: &Expr) -> Result<(), CodegenError> {
        match expr {
            Expr::Ident { name, .. } => {
                if let Some(idx) = self.resolve_local(name) {
                    self.emit_op(Op::PushLocal);
                    self.emit_u16(idx);
                    return Ok(());
                }
                if let Some(idx) = self.storage_slot(name) {
                    self.emit_op(Op::StorageLoadScalar);
                    self.emit_u16(idx);
                    return Ok(());
                }
                Err(self.err_unsupported(&format!("read of unresolved name '{name}'")))
            }
            Expr::Number { text, .. } => {
                let idx = self.consts.intern_number(text);
                self.emit_op(Op::PushConst);
                self.emit_u16(idx);
                Ok(())
            }
            Expr::String { .. } => {
                let text = expr.string_literal_content().unwrap_or_default();
                let idx = self.consts.intern_str(&text);
                self.emit_op(Op::PushConst);
                self.emit_u16(idx);
                Ok(())
            }
            Expr::Paren { inner, .. } => self.compile_expr(inner),
            Expr::Unary { op, expr, .. } => {
                self.compile_expr(expr)?;
                self.emit_op(match op {
                    UnaryOp::Plus => Op::Plus,
                    UnaryOp::Neg => Op::Neg,
                    UnaryOp::Not => Op::Not,
                    UnaryOp::BitNot => Op::BitNot,
                });
                Ok(())
            }
            Expr::Binary { op, left, right, .. } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.emit_op(match op {
                    BinaryOp::Or => Op::Or,
                    BinaryOp::And => Op::And,
                    BinaryOp::BitOr => Op::BitOr,
                    BinaryOp::BitXor => Op::BitXor,
                    BinaryOp::BitAnd => Op::BitAnd,
                    BinaryOp::Eq => Op::Eq,
                    BinaryOp::NotEq => Op::NotEq,
                    BinaryOp::Lt => Op::Lt,
                    BinaryOp::LtEq => Op::LtEq,
                    BinaryOp::Gt => Op::Gt,
                    BinaryOp::GtEq => Op::GtEq,
                    BinaryOp::Shl => Op::Shl,
                    BinaryOp::Shr => Op::Shr,
                    BinaryOp::Add => Op::Add,
                    BinaryOp::Sub => Op::Sub,
                    BinaryOp::Mul => Op::Mul,
                    BinaryOp::Div => Op::Div,
                    BinaryOp::Rem => Op::Rem,
                });
                Ok(())
            }
            Expr::Assign { .. } => Err(self.err_unsupported("nested assignment expression")),
            Expr::Call { callee, args, .. } => self.compile_call(callee, args),
            Expr::Member { .. } | Expr::Index { .. } => self.compile_member_or_index(expr),
        }
    }

    fn compile_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<(), CodegenError> {
        if let Expr::Ident { name, .. } = callee {
            if name == "selector" {
                let sig = args[0].string_literal_content().unwrap_or_default();
                let hex = tol_hash::selector_from_signature(&sig);
                let idx = self.consts.intern_number(&hex);
                self.emit_op(Op::PushConst);
                self.emit_u16(idx);
                return Ok(());
            }
            return Err(self.err_unsupported(&format!("call to unresolved name '{name}'")));
        }
        if let Expr::Member { object, name, .. } = callee {
            if name == "push" {
                return self.compile_push(object, args);
            }
            if let Expr::Ident { name: obj_name, .. } = &**object {
                if obj_name == "this" || obj_name == self.contract_name {
                    return self.compile_self_dispatch(name, args);
                }
            }
        }
        Err(self.err_unsupported("call target that does not resolve to a declared function"))
    }

    fn compile_self_dispatch(&mut self, fname: &str, args: &[Expr]) -> Result<(), CodegenError> {
        let target = *self.function_index.get(fname).ok_or_else(|| self.err_unsupported(&format!("call to undeclared function '{fname}'")))?;
        for a in args {
            self.compile_expr(a)?;
        }
        self.emit_op(Op::Call);
        self.emit_u32(target);
        self.emit_u16(args.len() as u16);
        Ok(())
    }

    fn compile_push(&mut self, object: &Expr, args: &[Expr]) -> Result<(), CodegenError> {
        let Some((root, ops)) = collect_chain(object) else {
            return Err(self.err_unsupported("'.push' on a non-chain target"));
        };
        if !ops.is_empty() {
            return Err(self.err_unsupported("'.push' on a nested chain"));
        }
        let slot_idx = self.storage_slot(root).ok_or_else(|| self.err_unsupported("'.push' on a non-storage target"))?;
        self.compile_expr(&args[0])?;
        self.emit_op(Op::StorageArrayPush);
        self.emit_u16(slot_idx);
        Ok(())
    }

    fn compile_member_or_index(&mut self, expr: &Expr) -> Result<(), CodegenError> {
        let Some((root, ops)) = collect_chain(expr) else {
            return Err(self.err_unsupported("member/index chain with a non-identifier root"));
        };
        if let Some(slot_idx) = self.storage_slot(root) {
            if let [ChainOp::Member("length")] = ops.as_slice() {
                self.emit_op(Op::StorageArrayLength);
                self.emit_u16(slot_idx);
                return Ok(());
            }
            let mut depth = 0u8;
            for op in &ops {
                if let ChainOp::Index(idx_expr) = op {
                    self.compile_expr(idx_expr)?;
                    depth += 1;
                }
            }
            self.emit_op(Op::StorageLoadIndexed);
            self.emit_u16(slot_idx);
            self.emit_u8(depth);
            return Ok(());
        }
        if let Some((ChainOp::Member(last), rest)) = ops.split_last() {
            if *last == "selector" && (root == "this" || root == self.contract_name) {
                if let [ChainOp::Member(fname)] = rest {
                    let selector_hex =
                        self.function_selectors.get(*fname).cloned().ok_or_else(|| self.err_unsupported(&format!("'.selector' of undeclared function '{fname}'")))?;
                    let idx = self.consts.intern_number(&selector_hex);
                    self.emit_op(Op::PushConst);
                    self.emit_u16(idx);
                    return Ok(());
                }
            }
        }
        Err(self.err_unsupported("member/index chain with no storage or selector resolution"))
    }
}

fn is_push_call(callee: &Expr) -> bool {
    matches!(callee, Expr::Member { name, .. } if name == "push")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tol_syntax::parser::parse;

    /// Exercises the storage opcodes directly against a function body
    /// pulled out of a parsed (not lowered) module. `prototype::compile`
    /// gates storage-backed programs off entirely today (`spec.md` §4.4),
    /// so this is the only place the reserved storage opcodes actually run.
    #[test]
    fn storage_array_and_mapping_access_emit_their_synthetic_opcodes() {
        let src = r#"tol 0.2
contract Demo {
    storage {
        slot items: u256[];
        slot balances: mapping(address => u256);
    }
    fn touch(who: address, amount: u256) public {
        items.push(amount);
        balances[who] = amount;
        let count: u256 = items.length;
        require(count > 0, "empty");
    }
}"#;
        let (module, diags) = parse(src, "demo.tol");
        assert!(diags.is_empty(), "{diags:?}");
        let storage = &module.contract.storage.as_ref().unwrap().slots;
        let storage_index: HashMap<&str, u16> = storage.iter().enumerate().map(|(i, s)| (s.name.as_str(), i as u16)).collect();
        let function_index: HashMap<&str, u32> = HashMap::new();
        let function_selectors: HashMap<&str, String> = HashMap::new();
        let function_is_void: HashMap<&str, bool> = HashMap::new();
        let event_index: HashMap<&str, u16> = HashMap::new();
        let func = &module.contract.functions[0];
        let param_names: Vec<String> = func.params.iter().map(|p| p.name.clone()).collect();

        let mut emitter =
            Emitter::new("touch", &param_names, &storage_index, &function_index, &function_selectors, &function_is_void, &event_index, "Demo", &func.body);
        emitter.compile_block(&func.body).expect("storage access compiles");
        let (code, _consts, _locals) = emitter.finish();

        assert!(code.contains(&(Op::StorageArrayPush as u8)));
        assert!(code.contains(&(Op::StorageStoreIndexed as u8)));
        assert!(code.contains(&(Op::StorageArrayLength as u8)));
        assert!(code.contains(&(Op::Require as u8)));
    }
}
