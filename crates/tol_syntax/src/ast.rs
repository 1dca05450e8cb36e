//! The TOL abstract syntax tree (`spec.md` §3).
//!
//! Statement and expression nodes are modeled as tagged enums (sum types)
//! with variant-specific payloads rather than records with optional
//! fields — this removes the need for "does this field apply to this
//! node kind" bookkeeping and makes the checker's case analysis total
//! (`spec.md` §9 "AST as tagged variants").

use tol_base::Span;

/// The parsed module: version header, any skipped `interface`/`library`
/// top-declarations, and the one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub version: String,
    pub skipped_top_decls: Vec<SkippedTopDecl>,
    pub contract: ContractDecl,
}

/// A brace-matched `interface`/`library` block, recorded but not compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopDeclKind {
    Interface,
    Library,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTopDecl {
    pub kind: TopDeclKind,
    pub name: String,
}

/// A brace-matched `error`/`enum`/`modifier` declaration inside a
/// contract body, recorded but not compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractSkippedKind {
    Error,
    Enum,
    Modifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedContractDecl {
    pub kind: ContractSkippedKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDecl {
    pub name: String,
    pub name_span: Span,
    pub storage: Option<StorageDecl>,
    pub events: Vec<EventDecl>,
    pub functions: Vec<FunctionDecl>,
    pub constructor: Option<ConstructorDecl>,
    pub fallback: Option<FallbackDecl>,
    pub skipped_decls: Vec<SkippedContractDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDecl {
    pub slots: Vec<StorageSlot>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSlot {
    pub name: String,
    pub type_text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDecl {
    pub name: String,
    pub params: Vec<FieldDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub type_text: String,
    pub indexed: bool,
    pub span: Span,
}

/// A function parameter or named return value: `name: type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub type_text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub name_span: Span,
    pub selector_override: Option<String>,
    pub selector_span: Option<Span>,
    pub params: Vec<Param>,
    pub returns: Vec<Param>,
    pub modifiers: Vec<Modifier>,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub params: Vec<Param>,
    pub modifiers: Vec<Modifier>,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackDecl {
    pub modifiers: Vec<Modifier>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// A raw modifier token (`public`, `view`, ...), kept as text plus span so
/// the checker — not the parser — decides whether it is recognized,
/// duplicated, or out of place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub name: String,
    pub span: Span,
}

/// A statement node. Each variant carries only the fields its kind uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Let { name: String, name_span: Span, type_text: Option<String>, expr: Option<Expr>, span: Span },
    Set { target: Expr, expr: Expr, span: Span },
    Return { expr: Option<Expr>, span: Span },
    Break { span: Span },
    Continue { span: Span },
    Require { expr: Expr, text: String, span: Span },
    Assert { expr: Expr, text: String, span: Span },
    Revert { expr: Option<Expr>, span: Span },
    Emit { expr: Expr, span: Span },
    If { cond: Expr, then_branch: Vec<Statement>, else_branch: Option<Vec<Statement>>, span: Span },
    While { cond: Expr, body: Vec<Statement>, span: Span },
    For { init: Option<Box<Statement>>, cond: Option<Expr>, post: Option<Box<Statement>>, body: Vec<Statement>, span: Span },
    Expr { expr: Expr, span: Span },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Let { span, .. }
            | Statement::Set { span, .. }
            | Statement::Return { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::Require { span, .. }
            | Statement::Assert { span, .. }
            | Statement::Revert { span, .. }
            | Statement::Emit { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::For { span, .. }
            | Statement::Expr { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// An expression node. `spec.md` §3 lists a single `assign` variant with
/// an `op` field; the current grammar (§4.2 precedence table) admits only
/// plain `=`, so `AssignOp` is a one-variant enum kept open for a future
/// compound-assignment operator rather than collapsed into a bare field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Eq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident { name: String, span: Span },
    Number { text: String, span: Span },
    String { text: String, span: Span },
    Paren { inner: Box<Expr>, span: Span },
    Unary { op: UnaryOp, expr: Box<Expr>, span: Span },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr>, span: Span },
    Assign { op: AssignOp, target: Box<Expr>, value: Box<Expr>, span: Span },
    Call { callee: Box<Expr>, args: Vec<Expr>, span: Span },
    Member { object: Box<Expr>, name: String, name_span: Span, span: Span },
    Index { object: Box<Expr>, index: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident { span, .. }
            | Expr::Number { span, .. }
            | Expr::String { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Call { span, .. }
            | Expr::Member { span, .. }
            | Expr::Index { span, .. } => *span,
        }
    }

    /// The unquoted content of a string literal, unescaping the two
    /// backslash sequences TOL strings support (`\\` and the literal
    /// quote character). Returns `None` if this expression is not a
    /// string literal.
    pub fn string_literal_content(&self) -> Option<String> {
        match self {
            Expr::String { text, .. } => Some(unescape_string_literal(text)),
            _ => None,
        }
    }
}

/// Strips the surrounding quote characters and resolves backslash escapes
/// in a raw string-literal token (quotes included).
pub fn unescape_string_literal(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() < 2 {
        return String::new();
    }
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tol_base::Pos;

    fn dummy_span() -> Span {
        Span::point(Pos::start())
    }

    #[test]
    fn unescape_strips_quotes_and_resolves_escapes() {
        assert_eq!(unescape_string_literal(r#""hi\"there""#), "hi\"there");
        assert_eq!(unescape_string_literal(r#"'it\'s'"#), "it's");
    }

    #[test]
    fn statement_span_dispatches_per_variant() {
        let stmt = Statement::Break { span: dummy_span() };
        assert_eq!(stmt.span(), dummy_span());
    }

    #[test]
    fn string_literal_content_only_matches_string_variant() {
        let s = Expr::String { text: "\"abc\"".to_string(), span: dummy_span() };
        assert_eq!(s.string_literal_content(), Some("abc".to_string()));
        let n = Expr::Number { text: "5".to_string(), span: dummy_span() };
        assert_eq!(n.string_literal_content(), None);
    }
}
