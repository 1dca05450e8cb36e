//! Byte-stream lexer for TOL source (`spec.md` §4.1).
//!
//! The lexer is pull-based: [`Lexer::next_token`] returns one token at a
//! time. It never fails — illegal bytes become a single-byte `Illegal`
//! token and the parser is responsible for turning that into a diagnostic.
//! Past end-of-input, `next_token` returns `Eof` forever.

use tol_base::{Pos, Span};

use crate::token::{lookup_keyword, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, bytes: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    fn current_pos(&self) -> Pos {
        Pos::new(self.pos, self.line, self.column)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek() {
                            None => break,
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn read_while<F: Fn(u8) -> bool>(&mut self, pred: F) -> (usize, usize) {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if pred(b) {
                self.advance();
            } else {
                break;
            }
        }
        (start, self.pos)
    }

    fn is_ident_start(b: u8) -> bool {
        b.is_ascii_alphabetic() || b == b'_'
    }

    fn is_ident_continue(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_'
    }

    fn read_string(&mut self, quote: u8) -> (usize, usize) {
        let start = self.pos;
        self.advance(); // opening quote
        loop {
            match self.peek() {
                None => break,
                Some(b'\\') => {
                    self.advance();
                    if self.peek().is_some() {
                        self.advance();
                    }
                }
                Some(b) if b == quote => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
        (start, self.pos)
    }

    /// Returns the next token. Past end-of-input this returns `Eof` every
    /// time; it never panics or signals an error.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let start_pos = self.current_pos();

        let Some(b) = self.peek() else {
            return Token::new(TokenKind::Eof, "", Span::point(start_pos));
        };

        if Self::is_ident_start(b) {
            let (s, e) = self.read_while(Self::is_ident_continue);
            let text = &self.source[s..e];
            let kind = lookup_keyword(text).unwrap_or(TokenKind::Ident);
            return Token::new(kind, text, Span::new(start_pos, self.current_pos()));
        }

        if b.is_ascii_digit() {
            let (s, e) = self.read_while(|c| c.is_ascii_digit() || c == b'.');
            let text = &self.source[s..e];
            return Token::new(TokenKind::Number, text, Span::new(start_pos, self.current_pos()));
        }

        if b == b'"' || b == b'\'' {
            let (s, e) = self.read_string(b);
            let text = &self.source[s..e];
            return Token::new(TokenKind::String, text, Span::new(start_pos, self.current_pos()));
        }

        macro_rules! single {
            ($kind:expr) => {{
                self.advance();
                Token::new($kind, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos()))
            }};
        }

        macro_rules! two_or_one {
            ($second:expr, $two_kind:expr, $one_kind:expr) => {{
                self.advance();
                if self.peek() == Some($second) {
                    self.advance();
                } else {
                    return Token::new(
                        $one_kind,
                        &self.source[start_pos.byte_offset..self.pos],
                        Span::new(start_pos, self.current_pos()),
                    );
                }
                Token::new($two_kind, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos()))
            }};
        }

        match b {
            b'(' => single!(TokenKind::LParen),
            b')' => single!(TokenKind::RParen),
            b'{' => single!(TokenKind::LBrace),
            b'}' => single!(TokenKind::RBrace),
            b'[' => single!(TokenKind::LBracket),
            b']' => single!(TokenKind::RBracket),
            b',' => single!(TokenKind::Comma),
            b';' => single!(TokenKind::Semicolon),
            b':' => single!(TokenKind::Colon),
            b'@' => single!(TokenKind::At),
            b'.' => single!(TokenKind::Dot),
            b'~' => single!(TokenKind::Tilde),
            b'^' => single!(TokenKind::Caret),
            b'+' => single!(TokenKind::Plus),
            b'*' => single!(TokenKind::Star),
            b'/' => single!(TokenKind::Slash),
            b'%' => single!(TokenKind::Percent),
            b'-' => two_or_one!(b'>', TokenKind::Arrow, TokenKind::Minus),
            b'=' => {
                self.advance();
                match self.peek() {
                    Some(b'=') => {
                        self.advance();
                        Token::new(TokenKind::EqEq, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos()))
                    }
                    Some(b'>') => {
                        self.advance();
                        Token::new(TokenKind::FatArrow, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos()))
                    }
                    _ => Token::new(TokenKind::Eq, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos())),
                }
            }
            b'!' => two_or_one!(b'=', TokenKind::NotEq, TokenKind::Bang),
            b'<' => {
                self.advance();
                match self.peek() {
                    Some(b'=') => {
                        self.advance();
                        Token::new(TokenKind::LtEq, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos()))
                    }
                    Some(b'<') => {
                        self.advance();
                        Token::new(TokenKind::Shl, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos()))
                    }
                    _ => Token::new(TokenKind::Lt, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos())),
                }
            }
            b'>' => {
                self.advance();
                match self.peek() {
                    Some(b'=') => {
                        self.advance();
                        Token::new(TokenKind::GtEq, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos()))
                    }
                    Some(b'>') => {
                        self.advance();
                        Token::new(TokenKind::Shr, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos()))
                    }
                    _ => Token::new(TokenKind::Gt, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos())),
                }
            }
            b'&' => two_or_one!(b'&', TokenKind::AndAnd, TokenKind::Amp),
            b'|' => two_or_one!(b'|', TokenKind::OrOr, TokenKind::Pipe),
            _ => {
                self.advance();
                Token::new(TokenKind::Illegal, &self.source[start_pos.byte_offset..self.pos], Span::new(start_pos, self.current_pos()))
            }
        }
    }

    /// Lexes the entire source into a `Vec<Token>`, including a trailing
    /// `Eof`. Convenience for callers (tests, the parser's token buffer)
    /// that want the whole stream up front.
    pub fn tokenize(source: &'a str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        let tokens = kinds("contract Demo { }");
        assert_eq!(
            tokens,
            vec![TokenKind::Contract, TokenKind::Ident, TokenKind::LBrace, TokenKind::RBrace, TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_multi_char_operators_greedily() {
        let tokens = kinds("-> => == != <= >= << >> && ||");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Shl,
                TokenKind::Shr,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn single_char_falls_back_when_second_char_absent() {
        let tokens = kinds("- = ! < >");
        assert_eq!(
            tokens,
            vec![TokenKind::Minus, TokenKind::Eq, TokenKind::Bang, TokenKind::Lt, TokenKind::Gt, TokenKind::Eof]
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        let tokens = kinds("fn // trailing\nping /* inline */ ()");
        assert_eq!(tokens, vec![TokenKind::Fn, TokenKind::Ident, TokenKind::LParen, TokenKind::RParen, TokenKind::Eof]);
    }

    #[test]
    fn lexes_string_literals_with_either_quote_and_escapes() {
        let tokens = Lexer::tokenize(r#" "a\"b" 'c\'d' "#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, r#""a\"b""#);
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].literal, r#"'c\'d'"#);
    }

    #[test]
    fn lexes_permissive_numbers() {
        let tokens = Lexer::tokenize("256 1.0.0");
        assert_eq!(tokens[0].literal, "256");
        assert_eq!(tokens[1].literal, "1.0.0");
    }

    #[test]
    fn illegal_byte_yields_single_illegal_token_not_a_panic() {
        let tokens = kinds("fn $ ping");
        assert_eq!(tokens, vec![TokenKind::Fn, TokenKind::Illegal, TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn eof_repeats_past_end() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = Lexer::tokenize("fn\nping");
        let ping = &tokens[1];
        assert_eq!(ping.span.start.line, 2);
        assert_eq!(ping.span.start.column, 1);
    }
}
