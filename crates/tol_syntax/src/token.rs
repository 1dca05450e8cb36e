//! Token kinds for the TOL lexer and parser (`spec.md` §3).

use tol_base::Span;

/// The kind of a lexical token.
///
/// Keywords are their own variants rather than `Ident` with a text check —
/// the parser matches on kind, not string content, everywhere except
/// `Ident`/`Number`/`String`/`Illegal`, which carry the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Tol,
    Contract,
    Interface,
    Library,
    Storage,
    Slot,
    Event,
    Fn,
    Constructor,
    Fallback,
    Let,
    Set,
    Return,
    Break,
    Continue,
    Require,
    Assert,
    Revert,
    Emit,
    If,
    Else,
    While,
    For,
    Error,
    Enum,
    Modifier,

    // Literals / names
    Ident,
    Number,
    String,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    At,

    // Operators
    Arrow,   // ->
    FatArrow, // =>
    Eq,      // =
    EqEq,    // ==
    NotEq,   // !=
    Lt,      // <
    LtEq,    // <=
    Gt,      // >
    GtEq,    // >=
    Shl,     // <<
    Shr,     // >>
    AndAnd,  // &&
    OrOr,    // ||
    Amp,     // &
    Pipe,    // |
    Caret,   // ^
    Tilde,   // ~
    Bang,    // !
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Eof,
    Illegal,
}

/// A lexed token: kind, the exact source text it spans, and its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self { kind, literal: literal.into(), span }
    }
}

/// Maps identifier text to a keyword `TokenKind`, or `None` if it is a
/// plain identifier.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "tol" => TokenKind::Tol,
        "contract" => TokenKind::Contract,
        "interface" => TokenKind::Interface,
        "library" => TokenKind::Library,
        "storage" => TokenKind::Storage,
        "slot" => TokenKind::Slot,
        "event" => TokenKind::Event,
        "fn" => TokenKind::Fn,
        "constructor" => TokenKind::Constructor,
        "fallback" => TokenKind::Fallback,
        "let" => TokenKind::Let,
        "set" => TokenKind::Set,
        "return" => TokenKind::Return,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "require" => TokenKind::Require,
        "assert" => TokenKind::Assert,
        "revert" => TokenKind::Revert,
        "emit" => TokenKind::Emit,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "error" => TokenKind::Error,
        "enum" => TokenKind::Enum,
        "modifier" => TokenKind::Modifier,
        _ => return None,
    })
}
