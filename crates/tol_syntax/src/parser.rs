//! Recursive-descent parser with single-token lookahead (`spec.md` §4.2).
//!
//! The parser never aborts: every production returns a best-effort node
//! and pushes a [`Diagnostic`] on failure, then synchronizes to a known
//! recovery point (the next statement terminator, member start, or
//! closing brace) before continuing. This keeps the diagnostic stream
//! ordered with source position without exceptions-for-control-flow
//! (`spec.md` §9 "Parser error recovery").

use tol_base::{Diagnostic, DiagnosticCode, Pos, Span};

use crate::ast::*;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

const CODE_UNEXPECTED_TOKEN: DiagnosticCode = DiagnosticCode("TOL1001");
const CODE_DECL_ONLY_FUNCTION: DiagnosticCode = DiagnosticCode("TOL1002");
const CODE_MALFORMED_SELECTOR_ATTR: DiagnosticCode = DiagnosticCode("TOL1003");
const CODE_UNTERMINATED_BLOCK: DiagnosticCode = DiagnosticCode("TOL1004");
const CODE_MULTIPLE_CONTRACTS: DiagnosticCode = DiagnosticCode("TOL1005");
const CODE_MISSING_CONTRACT: DiagnosticCode = DiagnosticCode("TOL1006");

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    file: String,
    diagnostics: Vec<Diagnostic>,
    source: &'a str,
}

/// Parses `source` into a best-effort [`Module`] plus any diagnostics.
/// `file` is used only to label spans in diagnostics.
pub fn parse(source: &str, file: &str) -> (Module, Vec<Diagnostic>) {
    let tokens = Lexer::tokenize(source);
    let mut parser = Parser { tokens, pos: 0, file: file.to_string(), diagnostics: Vec::new(), source };
    let module = parser.parse_module();
    (module, parser.diagnostics)
}

impl<'a> Parser<'a> {
    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn is_at_end(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        let span = self.current().span;
        self.diagnostics.push(Diagnostic::new(code, message, self.file.clone(), span));
    }

    fn error_at(&mut self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(code, message, self.file.clone(), span));
    }

    /// Consumes the current token if it matches `kind`; otherwise emits
    /// `TOL1001` and returns `None` without consuming, so the caller can
    /// decide how to recover.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            let found = self.current().literal.clone();
            self.error(CODE_UNEXPECTED_TOKEN, format!("expected {what}, found '{found}'"));
            None
        }
    }

    fn expect_ident(&mut self, what: &str) -> Option<String> {
        self.expect(TokenKind::Ident, what).map(|t| t.literal)
    }

    /// Skips tokens until a statement boundary: past a `;`, or up to
    /// (not past) a token that starts a new statement, a `}`, or EOF.
    fn synchronize_stmt(&mut self) {
        while !self.is_at_end() {
            match self.kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace
                | TokenKind::Let
                | TokenKind::Set
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Require
                | TokenKind::Assert
                | TokenKind::Revert
                | TokenKind::Emit
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skips tokens until a contract-member boundary: `@`, `fn`,
    /// `constructor`, `fallback`, `storage`, `event`, `error`, `enum`,
    /// `modifier`, `}`, or EOF.
    fn synchronize_member(&mut self) {
        while !self.is_at_end() {
            match self.kind() {
                TokenKind::At
                | TokenKind::Fn
                | TokenKind::Constructor
                | TokenKind::Fallback
                | TokenKind::Storage
                | TokenKind::Event
                | TokenKind::Error
                | TokenKind::Enum
                | TokenKind::Modifier
                | TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skips a brace-matched block starting at the current `{`, counting
    /// nesting depth. Used to discard `interface`/`library`/`error`/
    /// `enum`/`modifier` bodies, which are opaque to this compiler.
    fn skip_brace_block(&mut self) {
        if !self.check(TokenKind::LBrace) {
            return;
        }
        let mut depth = 0i32;
        loop {
            match self.kind() {
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    self.advance();
                    if depth <= 0 {
                        return;
                    }
                }
                TokenKind::Eof => {
                    self.error(CODE_UNTERMINATED_BLOCK, "unterminated block: reached end of file");
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ----------------------------------------------------------------
    // Module
    // ----------------------------------------------------------------

    fn parse_module(&mut self) -> Module {
        let mut version = String::new();
        if self.expect(TokenKind::Tol, "'tol'").is_some() {
            if let Some(num) = self.expect(TokenKind::Number, "version number") {
                version = num.literal;
            }
        }

        let mut skipped_top_decls = Vec::new();
        let mut contract: Option<ContractDecl> = None;

        loop {
            match self.kind() {
                TokenKind::Interface | TokenKind::Library => {
                    skipped_top_decls.push(self.parse_skipped_top_decl());
                }
                TokenKind::Contract => {
                    let decl = self.parse_contract_decl();
                    if contract.is_some() {
                        self.error_at(CODE_MULTIPLE_CONTRACTS, "only one contract is allowed per module", decl.name_span);
                    } else {
                        contract = Some(decl);
                    }
                }
                TokenKind::Eof => break,
                _ => {
                    self.error(CODE_UNEXPECTED_TOKEN, format!("expected a top-level declaration, found '{}'", self.current().literal));
                    self.advance();
                }
            }
        }

        let contract = contract.unwrap_or_else(|| {
            self.error_at(CODE_MISSING_CONTRACT, "module has no contract declaration", Span::point(Pos::start()));
            ContractDecl {
                name: String::new(),
                name_span: Span::point(Pos::start()),
                storage: None,
                events: Vec::new(),
                functions: Vec::new(),
                constructor: None,
                fallback: None,
                skipped_decls: Vec::new(),
            }
        });

        Module { version, skipped_top_decls, contract }
    }

    fn parse_skipped_top_decl(&mut self) -> SkippedTopDecl {
        let kind = if self.matches(TokenKind::Interface) {
            TopDeclKind::Interface
        } else {
            self.advance(); // library
            TopDeclKind::Library
        };
        let name = self.expect_ident("a name").unwrap_or_default();
        self.skip_brace_block();
        SkippedTopDecl { kind, name }
    }

    // ----------------------------------------------------------------
    // Contract
    // ----------------------------------------------------------------

    fn parse_contract_decl(&mut self) -> ContractDecl {
        self.advance(); // 'contract'
        let name_tok = self.expect(TokenKind::Ident, "contract name");
        let (name, name_span) = match name_tok {
            Some(t) => (t.literal, t.span),
            None => (String::new(), self.current().span),
        };

        let mut decl = ContractDecl {
            name,
            name_span,
            storage: None,
            events: Vec::new(),
            functions: Vec::new(),
            constructor: None,
            fallback: None,
            skipped_decls: Vec::new(),
        };

        if self.expect(TokenKind::LBrace, "'{'").is_none() {
            return decl;
        }

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.kind() {
                TokenKind::Storage => {
                    let storage = self.parse_storage_decl();
                    if decl.storage.is_some() {
                        self.error_at(DiagnosticCode("TOL1007"), "at most one storage block is allowed", storage.span);
                    } else {
                        decl.storage = Some(storage);
                    }
                }
                TokenKind::Event => decl.events.push(self.parse_event_decl()),
                TokenKind::At | TokenKind::Fn => decl.functions.push(self.parse_function_decl()),
                TokenKind::Constructor => {
                    let ctor = self.parse_constructor_decl();
                    if decl.constructor.is_some() {
                        self.error_at(DiagnosticCode("TOL1008"), "at most one constructor is allowed", ctor.span);
                    } else {
                        decl.constructor = Some(ctor);
                    }
                }
                TokenKind::Fallback => {
                    let fb = self.parse_fallback_decl();
                    if decl.fallback.is_some() {
                        self.error_at(DiagnosticCode("TOL1009"), "at most one fallback is allowed", fb.span);
                    } else {
                        decl.fallback = Some(fb);
                    }
                }
                TokenKind::Error | TokenKind::Enum | TokenKind::Modifier => {
                    decl.skipped_decls.push(self.parse_skipped_contract_decl());
                }
                _ => {
                    self.error(CODE_UNEXPECTED_TOKEN, format!("expected a contract member, found '{}'", self.current().literal));
                    self.synchronize_member();
                }
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        decl
    }

    fn parse_skipped_contract_decl(&mut self) -> SkippedContractDecl {
        let kind = match self.kind() {
            TokenKind::Error => ContractSkippedKind::Error,
            TokenKind::Enum => ContractSkippedKind::Enum,
            _ => ContractSkippedKind::Modifier,
        };
        self.advance();
        let name = self.expect_ident("a name").unwrap_or_default();
        self.skip_brace_block();
        SkippedContractDecl { kind, name }
    }

    fn parse_storage_decl(&mut self) -> StorageDecl {
        let start = self.current().span;
        self.advance(); // 'storage'
        let mut slots = Vec::new();
        if self.expect(TokenKind::LBrace, "'{'").is_some() {
            while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                if !self.check(TokenKind::Slot) {
                    self.error(CODE_UNEXPECTED_TOKEN, "expected 'slot' inside a storage block");
                    self.synchronize_member_or_slot();
                    continue;
                }
                slots.push(self.parse_storage_slot());
            }
            self.expect(TokenKind::RBrace, "'}'");
        }
        let end = self.tokens[self.pos.saturating_sub(1)].span;
        StorageDecl { slots, span: start.merge(end) }
    }

    fn synchronize_member_or_slot(&mut self) {
        while !self.is_at_end() && !self.check(TokenKind::Slot) && !self.check(TokenKind::RBrace) {
            self.advance();
        }
    }

    fn parse_storage_slot(&mut self) -> StorageSlot {
        let start = self.current().span;
        self.advance(); // 'slot'
        let name = self.expect_ident("slot name").unwrap_or_default();
        self.expect(TokenKind::Colon, "':'");
        let type_text = self.parse_type_text_until(&[TokenKind::Semicolon]);
        let end = self.current().span;
        self.matches(TokenKind::Semicolon);
        StorageSlot { name, type_text, span: start.merge(end) }
    }

    /// Captures the raw token text of a type up to (not including) a
    /// terminator in `terminators`, preserving nested `(` and `[`
    /// (`spec.md` §4.2: "Type-text is captured as the raw token sequence").
    fn parse_type_text_until(&mut self, terminators: &[TokenKind]) -> String {
        let mut parts = Vec::new();
        let mut depth = 0i32;
        loop {
            let k = self.kind();
            if depth == 0 && terminators.contains(&k) {
                break;
            }
            if k == TokenKind::Eof {
                break;
            }
            match k {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth -= 1,
                _ => {}
            }
            parts.push(self.advance().literal);
        }
        parts.join("")
    }

    fn parse_event_decl(&mut self) -> EventDecl {
        let start = self.current().span;
        self.advance(); // 'event'
        let name = self.expect_ident("event name").unwrap_or_default();
        let params = self.parse_field_list();
        let end = self.current().span;
        self.matches(TokenKind::Semicolon);
        EventDecl { name, params, span: start.merge(end) }
    }

    fn parse_field_list(&mut self) -> Vec<FieldDecl> {
        let mut fields = Vec::new();
        if self.expect(TokenKind::LParen, "'('").is_none() {
            return fields;
        }
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            let start = self.current().span;
            let indexed = self.matches(TokenKind::At);
            let name = self.expect_ident("parameter name").unwrap_or_default();
            self.expect(TokenKind::Colon, "':'");
            let type_text = self.parse_type_text_until(&[TokenKind::Comma, TokenKind::RParen]);
            let end = self.tokens[self.pos.saturating_sub(1)].span;
            fields.push(FieldDecl { name, type_text, indexed, span: start.merge(end) });
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'");
        fields
    }

    fn parse_param_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.expect(TokenKind::LParen, "'('").is_none() {
            return params;
        }
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            let start = self.current().span;
            let name = self.expect_ident("parameter name").unwrap_or_default();
            self.expect(TokenKind::Colon, "':'");
            let type_text = self.parse_type_text_until(&[TokenKind::Comma, TokenKind::RParen]);
            let end = self.tokens[self.pos.saturating_sub(1)].span;
            params.push(Param { name, type_text, span: start.merge(end) });
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'");
        params
    }

    fn parse_selector_attribute(&mut self) -> (Option<String>, Option<Span>) {
        let at_span = self.current().span;
        self.advance(); // '@'
        let name = self.expect_ident("'selector'");
        if name.as_deref() != Some("selector") {
            self.error_at(CODE_MALFORMED_SELECTOR_ATTR, "unknown attribute: only '@selector(\"0x...\")' is supported", at_span);
            return (None, Some(at_span));
        }
        if self.expect(TokenKind::LParen, "'('").is_none() {
            return (None, Some(at_span));
        }
        let value = self.expect(TokenKind::String, "a string literal selector value");
        let paren_end = self.expect(TokenKind::RParen, "')'");
        match value {
            Some(tok) => {
                let span = at_span.merge(paren_end.map(|t| t.span).unwrap_or(tok.span));
                (Some(unescape_string_literal(&tok.literal)), Some(span))
            }
            None => {
                self.error_at(CODE_MALFORMED_SELECTOR_ATTR, "'@selector' requires a string literal argument", at_span);
                (None, Some(at_span))
            }
        }
    }

    fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        while self.check(TokenKind::Ident) {
            let tok = self.advance();
            modifiers.push(Modifier { name: tok.literal, span: tok.span });
        }
        modifiers
    }

    fn parse_function_decl(&mut self) -> FunctionDecl {
        let mut start = self.current().span;
        let (selector_override, selector_span) = if self.check(TokenKind::At) {
            self.parse_selector_attribute()
        } else {
            (None, None)
        };
        self.expect(TokenKind::Fn, "'fn'");
        let name_tok = self.expect(TokenKind::Ident, "function name");
        let (name, name_span) = match name_tok {
            Some(t) => (t.literal, t.span),
            None => (String::new(), self.current().span),
        };
        let params = self.parse_param_list();
        let mut returns = Vec::new();
        if self.matches(TokenKind::Arrow) {
            returns = self.parse_param_list();
        }
        let modifiers = self.parse_modifiers();

        if self.check(TokenKind::Semicolon) {
            self.error(CODE_DECL_ONLY_FUNCTION, "declaration-only functions are not supported: a function body is required");
            self.advance();
            let end = self.tokens[self.pos.saturating_sub(1)].span;
            start = start.merge(selector_span.unwrap_or(start));
            return FunctionDecl { name, name_span, selector_override, selector_span, params, returns, modifiers, body: Vec::new(), span: start.merge(end) };
        }

        let body = self.parse_block();
        let end = self.tokens[self.pos.saturating_sub(1)].span;
        start = start.merge(selector_span.unwrap_or(start));
        FunctionDecl { name, name_span, selector_override, selector_span, params, returns, modifiers, body, span: start.merge(end) }
    }

    fn parse_constructor_decl(&mut self) -> ConstructorDecl {
        let start = self.current().span;
        self.advance(); // 'constructor'
        let params = self.parse_param_list();
        let modifiers = self.parse_modifiers();
        let body = self.parse_block();
        let end = self.tokens[self.pos.saturating_sub(1)].span;
        ConstructorDecl { params, modifiers, body, span: start.merge(end) }
    }

    fn parse_fallback_decl(&mut self) -> FallbackDecl {
        let start = self.current().span;
        self.advance(); // 'fallback'
        let modifiers = self.parse_modifiers();
        let body = self.parse_block();
        let end = self.tokens[self.pos.saturating_sub(1)].span;
        FallbackDecl { modifiers, body, span: start.merge(end) }
    }

    // ----------------------------------------------------------------
    // Statements
    // ----------------------------------------------------------------

    fn parse_block(&mut self) -> Vec<Statement> {
        let mut stmts = Vec::new();
        if self.expect(TokenKind::LBrace, "'{'").is_none() {
            return stmts;
        }
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_statement());
        }
        self.expect(TokenKind::RBrace, "'}'");
        stmts
    }

    fn parse_statement(&mut self) -> Statement {
        match self.kind() {
            TokenKind::Let => self.parse_let(),
            TokenKind::Set => self.parse_set(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_break(),
            TokenKind::Continue => self.parse_continue(),
            TokenKind::Require => self.parse_require_or_assert(true),
            TokenKind::Assert => self.parse_require_or_assert(false),
            TokenKind::Revert => self.parse_revert(),
            TokenKind::Emit => self.parse_emit(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            _ => self.parse_expr_statement(),
        }
    }

    fn parse_let(&mut self) -> Statement {
        let start = self.current().span;
        self.advance();
        let name_tok = self.expect(TokenKind::Ident, "a variable name");
        let (name, name_span) = match name_tok {
            Some(t) => (t.literal, t.span),
            None => (String::new(), self.current().span),
        };
        let type_text = if self.matches(TokenKind::Colon) { Some(self.parse_type_text_until(&[TokenKind::Eq, TokenKind::Semicolon])) } else { None };
        let expr = if self.matches(TokenKind::Eq) { Some(self.parse_expr()) } else { None };
        let end = self.current().span;
        if self.expect(TokenKind::Semicolon, "';'").is_none() {
            self.synchronize_stmt();
        }
        Statement::Let { name, name_span, type_text, expr, span: start.merge(end) }
    }

    fn parse_set(&mut self) -> Statement {
        let start = self.current().span;
        self.advance();
        let target = self.parse_expr();
        self.expect(TokenKind::Eq, "'='");
        let expr = self.parse_expr();
        let end = expr.span();
        if self.expect(TokenKind::Semicolon, "';'").is_none() {
            self.synchronize_stmt();
        }
        Statement::Set { target, expr, span: start.merge(end) }
    }

    fn parse_return(&mut self) -> Statement {
        let start = self.current().span;
        self.advance();
        let expr = if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expr()) };
        let end = self.current().span;
        if self.expect(TokenKind::Semicolon, "';'").is_none() {
            self.synchronize_stmt();
        }
        Statement::Return { expr, span: start.merge(end) }
    }

    fn parse_break(&mut self) -> Statement {
        let span = self.current().span;
        self.advance();
        if self.expect(TokenKind::Semicolon, "';'").is_none() {
            self.synchronize_stmt();
        }
        Statement::Break { span }
    }

    fn parse_continue(&mut self) -> Statement {
        let span = self.current().span;
        self.advance();
        if self.expect(TokenKind::Semicolon, "';'").is_none() {
            self.synchronize_stmt();
        }
        Statement::Continue { span }
    }

    fn parse_require_or_assert(&mut self, is_require: bool) -> Statement {
        let start = self.current().span;
        self.advance();
        self.expect(TokenKind::LParen, "'('");
        let expr = self.parse_expr();
        let mut text = String::new();
        if self.matches(TokenKind::Comma) {
            if let Some(tok) = self.expect(TokenKind::String, "a string literal message") {
                text = tok.literal;
            }
        } else {
            self.error(CODE_UNEXPECTED_TOKEN, "expected ',' followed by a string literal message");
        }
        self.expect(TokenKind::RParen, "')'");
        let end = self.current().span;
        if self.expect(TokenKind::Semicolon, "';'").is_none() {
            self.synchronize_stmt();
        }
        if is_require {
            Statement::Require { expr, text, span: start.merge(end) }
        } else {
            Statement::Assert { expr, text, span: start.merge(end) }
        }
    }

    fn parse_revert(&mut self) -> Statement {
        let start = self.current().span;
        self.advance();
        let mut expr = None;
        if self.matches(TokenKind::LParen) {
            if !self.check(TokenKind::RParen) {
                expr = Some(self.parse_expr());
            }
            self.expect(TokenKind::RParen, "')'");
        }
        let end = self.current().span;
        if self.expect(TokenKind::Semicolon, "';'").is_none() {
            self.synchronize_stmt();
        }
        Statement::Revert { expr, span: start.merge(end) }
    }

    fn parse_emit(&mut self) -> Statement {
        let start = self.current().span;
        self.advance();
        let expr = self.parse_expr();
        let end = expr.span();
        if self.expect(TokenKind::Semicolon, "';'").is_none() {
            self.synchronize_stmt();
        }
        Statement::Emit { expr, span: start.merge(end) }
    }

    fn parse_if(&mut self) -> Statement {
        let start = self.current().span;
        self.advance();
        self.expect(TokenKind::LParen, "'('");
        let cond = self.parse_expr();
        self.expect(TokenKind::RParen, "')'");
        let then_branch = self.parse_block();
        let mut end = self.tokens[self.pos.saturating_sub(1)].span;
        let else_branch = if self.matches(TokenKind::Else) {
            if self.check(TokenKind::If) {
                let nested = self.parse_if();
                end = nested.span();
                Some(vec![nested])
            } else {
                let block = self.parse_block();
                end = self.tokens[self.pos.saturating_sub(1)].span;
                Some(block)
            }
        } else {
            None
        };
        Statement::If { cond, then_branch, else_branch, span: start.merge(end) }
    }

    fn parse_while(&mut self) -> Statement {
        let start = self.current().span;
        self.advance();
        self.expect(TokenKind::LParen, "'('");
        let cond = self.parse_expr();
        self.expect(TokenKind::RParen, "')'");
        let body = self.parse_block();
        let end = self.tokens[self.pos.saturating_sub(1)].span;
        Statement::While { cond, body, span: start.merge(end) }
    }

    fn parse_for(&mut self) -> Statement {
        let start = self.current().span;
        self.advance();
        self.expect(TokenKind::LParen, "'('");
        let init = if self.check(TokenKind::Semicolon) {
            self.advance();
            None
        } else {
            let stmt = self.parse_for_clause_stmt();
            self.expect(TokenKind::Semicolon, "';'");
            Some(Box::new(stmt))
        };
        let cond = if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expr()) };
        self.expect(TokenKind::Semicolon, "';'");
        let post = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_for_clause_stmt()))
        };
        self.expect(TokenKind::RParen, "')'");
        let body = self.parse_block();
        let end = self.tokens[self.pos.saturating_sub(1)].span;
        Statement::For { init, cond, post, body, span: start.merge(end) }
    }

    /// A statement appearing in a `for` clause has no trailing `;` of its
    /// own (the `for` grammar supplies the separators) — only `let` and
    /// bare expression/assignment forms make sense here.
    fn parse_for_clause_stmt(&mut self) -> Statement {
        if self.check(TokenKind::Let) {
            let start = self.current().span;
            self.advance();
            let name_tok = self.expect(TokenKind::Ident, "a variable name");
            let (name, name_span) = match name_tok {
                Some(t) => (t.literal, t.span),
                None => (String::new(), self.current().span),
            };
            let type_text = if self.matches(TokenKind::Colon) { Some(self.parse_type_text_until(&[TokenKind::Eq, TokenKind::Semicolon])) } else { None };
            let expr = if self.matches(TokenKind::Eq) { Some(self.parse_expr()) } else { None };
            let end = self.current().span;
            return Statement::Let { name, name_span, type_text, expr, span: start.merge(end) };
        }
        let expr = self.parse_expr();
        let span = expr.span();
        Statement::Expr { expr, span }
    }

    fn parse_expr_statement(&mut self) -> Statement {
        let start = self.current().span;
        let expr = self.parse_expr();
        let end = expr.span();
        if self.expect(TokenKind::Semicolon, "';'").is_none() {
            self.synchronize_stmt();
        }
        Statement::Expr { expr, span: start.merge(end) }
    }

    // ----------------------------------------------------------------
    // Expressions (precedence climbing, spec.md §4.2 table)
    // ----------------------------------------------------------------

    fn parse_expr(&mut self) -> Expr {
        self.parse_binary(2)
    }

    fn binary_op(&self) -> Option<(u8, bool, BinaryOpOrAssign)> {
        // (precedence, right_associative, operator)
        Some(match self.kind() {
            TokenKind::Eq => (2, true, BinaryOpOrAssign::Assign),
            TokenKind::OrOr => (3, false, BinaryOpOrAssign::Bin(BinaryOp::Or)),
            TokenKind::AndAnd => (4, false, BinaryOpOrAssign::Bin(BinaryOp::And)),
            TokenKind::Pipe => (5, false, BinaryOpOrAssign::Bin(BinaryOp::BitOr)),
            TokenKind::Caret => (6, false, BinaryOpOrAssign::Bin(BinaryOp::BitXor)),
            TokenKind::Amp => (7, false, BinaryOpOrAssign::Bin(BinaryOp::BitAnd)),
            TokenKind::EqEq => (8, false, BinaryOpOrAssign::Bin(BinaryOp::Eq)),
            TokenKind::NotEq => (8, false, BinaryOpOrAssign::Bin(BinaryOp::NotEq)),
            TokenKind::Lt => (8, false, BinaryOpOrAssign::Bin(BinaryOp::Lt)),
            TokenKind::LtEq => (8, false, BinaryOpOrAssign::Bin(BinaryOp::LtEq)),
            TokenKind::Gt => (8, false, BinaryOpOrAssign::Bin(BinaryOp::Gt)),
            TokenKind::GtEq => (8, false, BinaryOpOrAssign::Bin(BinaryOp::GtEq)),
            TokenKind::Shl => (9, false, BinaryOpOrAssign::Bin(BinaryOp::Shl)),
            TokenKind::Shr => (9, false, BinaryOpOrAssign::Bin(BinaryOp::Shr)),
            TokenKind::Plus => (10, false, BinaryOpOrAssign::Bin(BinaryOp::Add)),
            TokenKind::Minus => (10, false, BinaryOpOrAssign::Bin(BinaryOp::Sub)),
            TokenKind::Star => (11, false, BinaryOpOrAssign::Bin(BinaryOp::Mul)),
            TokenKind::Slash => (11, false, BinaryOpOrAssign::Bin(BinaryOp::Div)),
            TokenKind::Percent => (11, false, BinaryOpOrAssign::Bin(BinaryOp::Rem)),
            _ => return None,
        })
    }

    fn parse_binary(&mut self, min_prec: u8) -> Expr {
        let mut left = self.parse_unary();
        loop {
            let Some((prec, right_assoc, op)) = self.binary_op() else { break };
            if prec < min_prec {
                break;
            }
            self.advance();
            let next_min = if right_assoc { prec } else { prec + 1 };
            let right = self.parse_binary(next_min);
            let span = left.span().merge(right.span());
            left = match op {
                BinaryOpOrAssign::Assign => Expr::Assign { op: AssignOp::Eq, target: Box::new(left), value: Box::new(right), span },
                BinaryOpOrAssign::Bin(bin_op) => Expr::Binary { op: bin_op, left: Box::new(left), right: Box::new(right), span },
            };
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        let start = self.current().span;
        let op = match self.kind() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.parse_unary();
            let span = start.merge(expr.span());
            return Expr::Unary { op, expr: Box::new(expr), span };
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            match self.kind() {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.check(TokenKind::RParen) && !self.is_at_end() {
                        args.push(self.parse_expr());
                        if !self.matches(TokenKind::Comma) {
                            break;
                        }
                    }
                    let close = self.expect(TokenKind::RParen, "')'");
                    let span = expr.span().merge(close.map(|t| t.span).unwrap_or(expr.span()));
                    expr = Expr::Call { callee: Box::new(expr), args, span };
                }
                TokenKind::Dot => {
                    self.advance();
                    let name_tok = self.expect(TokenKind::Ident, "a member name");
                    let (name, name_span) = match name_tok {
                        Some(t) => (t.literal, t.span),
                        None => (String::new(), self.current().span),
                    };
                    let span = expr.span().merge(name_span);
                    expr = Expr::Member { object: Box::new(expr), name, name_span, span };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr();
                    let close = self.expect(TokenKind::RBracket, "']'");
                    let span = expr.span().merge(close.map(|t| t.span).unwrap_or(index.span()));
                    expr = Expr::Index { object: Box::new(expr), index: Box::new(index), span };
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_primary(&mut self) -> Expr {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Ident => {
                self.advance();
                Expr::Ident { name: tok.literal, span: tok.span }
            }
            TokenKind::Number => {
                self.advance();
                Expr::Number { text: tok.literal, span: tok.span }
            }
            TokenKind::String => {
                self.advance();
                Expr::String { text: tok.literal, span: tok.span }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                let close = self.expect(TokenKind::RParen, "')'");
                let span = tok.span.merge(close.map(|t| t.span).unwrap_or(inner.span()));
                Expr::Paren { inner: Box::new(inner), span }
            }
            _ => {
                self.error(CODE_UNEXPECTED_TOKEN, format!("expected an expression, found '{}'", tok.literal));
                self.advance();
                Expr::Ident { name: String::new(), span: tok.span }
            }
        }
    }
}

enum BinaryOpOrAssign {
    Assign,
    Bin(BinaryOp),
}
