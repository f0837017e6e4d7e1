mod error;

pub use error::{LexError, LexResult};

use std::{iter::Peekable, str::Chars};

use log::trace;
use once_cell::sync::Lazy;

use crate::token::{Position, Token, TokenKind};

/// Symbols recognised by the lexer, longest match first so that `==` is
/// preferred over a bare `=` followed by another `=`.
static SYMBOLS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "==", "!=", "<=", ">=", "=", ",", ".", "+", "-", "*", "/", "(", ")", "{", "}", "<", ">",
        "!",
    ]
});

const INDENT_WIDTH: usize = 4;

/// Converts source text into a token stream, synthesising `Indent`/`Dedent`
/// tokens from leading whitespace (spec §4.1).
///
/// By default the lexer tolerates unknown bytes by skipping them (spec §9's
/// open question); pass `strict: true` to [`Lexer::new`] to fail with a
/// [`LexError`] instead.
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
    current_indent: usize,
    at_line_start: bool,
    strict: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, strict: bool) -> Self {
        Self {
            iter: source.chars().peekable(),
            line: 1,
            col: 1,
            current_indent: 0,
            at_line_start: true,
            strict,
            tokens: Vec::new(),
        }
    }

    pub fn tolerant(source: &'a str) -> Self {
        Self::new(source, false)
    }

    fn peek(&mut self) -> Option<char> {
        self.iter.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.iter.next()?;
        if next == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(next)
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, position: Position) {
        let token = Token::new(kind, text, position);
        trace!("emitting {token:?}");
        self.tokens.push(token);
    }

    /// Consume the tokenizer, producing the full token stream.
    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        loop {
            if self.at_line_start {
                match self.handle_line_start()? {
                    LineStart::Eof => break,
                    LineStart::Content => self.at_line_start = false,
                    LineStart::BlankOrComment => continue,
                }
            }

            let Some(next) = self.peek() else { break };

            match next {
                '\n' => {
                    let position = (self.line, self.col);
                    self.advance();
                    self.push(TokenKind::Newline, "", position);
                    self.at_line_start = true;
                }
                ' ' | '\t' => {
                    self.advance();
                }
                '#' => {
                    self.skip_comment();
                }
                '[' => {
                    let position = (self.line, self.col);
                    self.advance();
                    self.push(TokenKind::LBracket, "[", position);
                }
                ']' => {
                    let position = (self.line, self.col);
                    self.advance();
                    self.push(TokenKind::RBracket, "]", position);
                }
                c if c.is_ascii_digit() => self.lex_number(),
                c if c.is_ascii_alphabetic() || c == '_' => self.lex_identifier(),
                _ => self.lex_symbol()?,
            }
        }

        while self.current_indent > 0 {
            self.current_indent = self.current_indent.saturating_sub(INDENT_WIDTH);
            self.push(TokenKind::Dedent, "", (self.line, self.col));
        }

        Ok(self.tokens)
    }

    /// Measure the leading whitespace of a fresh line and synthesise
    /// Indent/Dedent tokens as needed (spec §4.1). Returns whether the line
    /// turned out to be blank/comment-only (in which case indentation is
    /// left untouched) or real content, or that input is exhausted.
    fn handle_line_start(&mut self) -> LexResult<LineStart> {
        let mut width = 0usize;
        loop {
            match self.peek() {
                Some(' ') => {
                    width += 1;
                    self.advance();
                }
                Some('\t') => {
                    width += INDENT_WIDTH;
                    self.advance();
                }
                _ => break,
            }
        }

        match self.peek() {
            None => {
                self.at_line_start = false;
                Ok(LineStart::Eof)
            }
            Some('\n') => {
                let position = (self.line, self.col);
                self.advance();
                self.push(TokenKind::Newline, "", position);
                Ok(LineStart::BlankOrComment)
            }
            Some('#') => {
                self.skip_comment();
                if self.peek() == Some('\n') {
                    let position = (self.line, self.col);
                    self.advance();
                    self.push(TokenKind::Newline, "", position);
                }
                Ok(LineStart::BlankOrComment)
            }
            Some(_) => {
                self.adjust_indent(width);
                Ok(LineStart::Content)
            }
        }
    }

    fn adjust_indent(&mut self, width: usize) {
        let position = (self.line, self.col);
        if width > self.current_indent {
            self.push(TokenKind::Indent(width), "", position);
            self.current_indent = width;
        } else if width < self.current_indent {
            while self.current_indent > width {
                self.current_indent = self.current_indent.saturating_sub(INDENT_WIDTH);
                self.push(TokenKind::Dedent, "", position);
            }
            self.current_indent = width;
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn lex_identifier(&mut self) {
        let position = (self.line, self.col);
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.push(TokenKind::Identifier, text, position);
    }

    fn lex_number(&mut self) {
        let position = (self.line, self.col);
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') {
            let mut lookahead = self.iter.clone();
            lookahead.next();
            if lookahead.next().is_some_and(|c| c.is_ascii_digit()) {
                text.push('.');
                self.advance();
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }
        self.push(TokenKind::Number, text, position);
    }

    fn lex_symbol(&mut self) -> LexResult<()> {
        let position = (self.line, self.col);
        let mut lookahead = self.iter.clone();
        let first = lookahead.next();
        let second = lookahead.next();

        let two_char: Option<String> = match (first, second) {
            (Some(a), Some(b)) => Some(format!("{a}{b}")),
            _ => None,
        };

        if let Some(op) = two_char.as_deref() {
            if SYMBOLS.contains(&op) {
                self.advance();
                self.advance();
                self.push(TokenKind::Symbol, op, position);
                return Ok(());
            }
        }

        if let Some(c) = first {
            let op = c.to_string();
            if SYMBOLS.contains(&op.as_str()) {
                self.advance();
                self.push(TokenKind::Symbol, op, position);
                return Ok(());
            }
        }

        if self.strict {
            let bad = first.map(|c| c.to_string()).unwrap_or_default();
            self.advance();
            return Err(LexError {
                message: format!("unrecognised byte '{bad}'"),
                position,
            });
        }

        // Tolerant mode (default, spec §9): skip the byte and continue.
        self.advance();
        Ok(())
    }
}

enum LineStart {
    Eof,
    BlankOrComment,
    Content,
}

/// Convenience wrapper matching the evaluator's own fallible style.
pub fn lex(source: &str) -> LexResult<Vec<Token>> {
    Lexer::tolerant(source).lex()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind.clone()).collect()
    }

    #[test]
    fn lexes_identifiers_and_numbers() {
        let tokens = lex("var [x] = int[10]").unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Identifier,
                TokenKind::LBracket,
                TokenKind::Identifier,
                TokenKind::RBracket,
                TokenKind::Symbol,
                TokenKind::Identifier,
                TokenKind::LBracket,
                TokenKind::Number,
                TokenKind::RBracket,
            ]
        );
    }

    #[test]
    fn balances_indent_and_dedent() {
        let source = "while [i < int[3]]\n    print(i)\n    i = i + int[1]\nprint(done)\n";
        let tokens = lex(source).unwrap();
        let indents = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Indent(_)))
            .count();
        let dedents = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Dedent))
            .count();
        assert_eq!(indents, dedents);
    }

    #[test]
    fn comments_and_blank_lines_do_not_affect_indentation() {
        let source = "if [x]\n    # a comment\n\n    print(x)\n";
        let tokens = lex(source).unwrap();
        let indents = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Indent(_)))
            .count();
        assert_eq!(indents, 1);
    }

    #[test]
    fn tolerates_unknown_bytes_by_default() {
        let tokens = lex("var [x] = int[1] \u{0001} print(x)").unwrap();
        assert!(tokens.iter().any(|t| t.text == "print"));
    }

    #[test]
    fn strict_mode_rejects_unknown_bytes() {
        let err = Lexer::new("@", true).lex().unwrap_err();
        assert_eq!(err.position, (1, 1));
    }

    #[test]
    fn multi_char_symbols_take_priority() {
        let tokens = lex("a == b").unwrap();
        let ops: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Symbol)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(ops, vec!["=="]);
    }
}
