// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Tokenizer for continuity text.
//!
//! Whitespace (newlines included) only separates tokens. Identifiers are
//! ASCII alphanumerics starting with a letter and are uppercased for
//! matching; the original spelling is kept for error reporting.

use super::ast::Span;

/// Lexical category of a token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// Keyword, constant, point or variable name (uppercased).
    Ident(String),
    /// Non-negative numeric literal.
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Equals,
    /// A character or numeral that cannot start any token.
    Invalid,
}

/// A token with its source text and position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

/// Splits `source` into tokens. Never fails; unusable input becomes
/// [`TokenKind::Invalid`] so the parser can report it in context.
pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1u32;
    let mut column = 1u32;

    while let Some(&ch) = chars.peek() {
        let span = Span::new(line, column);
        if ch == '\n' {
            chars.next();
            line += 1;
            column = 1;
            continue;
        }
        if ch.is_whitespace() {
            chars.next();
            column += 1;
            continue;
        }

        let mut text = String::new();
        let kind = if ch.is_ascii_alphabetic() {
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_alphanumeric() {
                    break;
                }
                text.push(c);
                chars.next();
            }
            TokenKind::Ident(text.to_ascii_uppercase())
        } else if ch.is_ascii_digit() || ch == '.' {
            while let Some(&c) = chars.peek() {
                if !(c.is_ascii_digit() || c == '.') {
                    break;
                }
                text.push(c);
                chars.next();
            }
            text.parse::<f64>()
                .map_or(TokenKind::Invalid, TokenKind::Number)
        } else {
            text.push(ch);
            chars.next();
            match ch {
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '=' => TokenKind::Equals,
                _ => TokenKind::Invalid,
            }
        };
        column += u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        tokens.push(Token { kind, text, span });
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn identifiers_are_case_insensitive() {
        assert_eq!(
            kinds("ewns np"),
            vec![
                TokenKind::Ident("EWNS".into()),
                TokenKind::Ident("NP".into())
            ]
        );
    }

    #[test]
    fn numbers_and_operators() {
        assert_eq!(
            kinds("10.5-3*(2)"),
            vec![
                TokenKind::Number(10.5),
                TokenKind::Minus,
                TokenKind::Number(3.0),
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Number(2.0),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn malformed_numbers_are_invalid() {
        assert_eq!(kinds("1.2.3"), vec![TokenKind::Invalid]);
        assert_eq!(kinds("#"), vec![TokenKind::Invalid]);
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = tokenize("MT 4 E\n  MTRM W");
        let spans: Vec<(u32, u32)> = tokens.iter().map(|t| (t.span.line, t.span.column)).collect();
        assert_eq!(spans, vec![(1, 1), (1, 4), (1, 6), (2, 3), (2, 8)]);
    }
}
