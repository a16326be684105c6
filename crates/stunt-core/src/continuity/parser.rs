// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Recursive-descent parser producing a [`ProcedureList`].
//!
//! Value precedence, loosest first: `+ -`, then `* /`, then unary `-`.
//! Binary operators are left-associative.

use super::ast::{
    BinaryOp, Constant, Point, Procedure, ProcedureList, Span, Spanned, Value, Var,
    MAX_REF_POINT,
};
use super::error::CompileError;
use super::lexer::{tokenize, Token, TokenKind};

type PResult<T> = Result<T, CompileError>;

const FUNCTIONS: [&str; 7] = ["DIR", "DIRFROM", "DIST", "DISTFROM", "EITHER", "OPP", "STEP"];

pub(crate) fn parse(source: &str) -> PResult<ProcedureList> {
    let mut parser = Parser::new(source);
    let mut items = Vec::new();
    while !parser.at_end() {
        items.push(parser.procedure()?);
    }
    Ok(ProcedureList::new(items))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: Span,
    /// Text of the verb currently being parsed, reported on operand errors.
    verb: Option<String>,
}

impl Parser {
    fn new(source: &str) -> Self {
        let line_count = u32::try_from(source.split('\n').count()).unwrap_or(u32::MAX);
        let last_len = source.rsplit('\n').next().map_or(0, |l| l.chars().count());
        Self {
            tokens: tokenize(source),
            pos: 0,
            end: Span::new(
                line_count.max(1),
                u32::try_from(last_len).unwrap_or(u32::MAX).saturating_add(1),
            ),
            verb: None,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn here(&self) -> Span {
        self.peek().map_or(self.end, |t| t.span)
    }

    /// Builds an error at the current token.
    fn error(&self, message: &str) -> CompileError {
        let offending = self.verb.clone().unwrap_or_else(|| {
            self.peek()
                .map_or_else(|| "end of input".to_owned(), |t| t.text.clone())
        });
        let message = match self.peek() {
            None => format!("{message}, found end of input"),
            Some(t) if t.kind == TokenKind::Invalid => {
                let looks_numeric = t.text.starts_with(|c: char| c.is_ascii_digit() || c == '.');
                if looks_numeric {
                    format!("malformed number '{}'", t.text)
                } else {
                    format!("unexpected character '{}'", t.text)
                }
            }
            Some(t) => format!("{message}, found '{}'", t.text),
        };
        CompileError::new(message, offending, self.here())
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> PResult<()> {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    fn procedure(&mut self) -> PResult<Spanned<Procedure>> {
        self.verb = None;
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("expected a procedure"));
        };
        let TokenKind::Ident(word) = &token.kind else {
            return Err(self.error("expected a procedure"));
        };
        if let Some(var) = Var::from_keyword(word) {
            self.pos += 1;
            self.verb = Some(token.text.clone());
            self.expect(&TokenKind::Equals, "'=' after variable")?;
            let value = self.value()?;
            return Ok(Spanned {
                node: Procedure::Set { var, value },
                span: token.span,
            });
        }
        let node = match word.as_str() {
            "BLAM" => {
                self.enter(&token);
                Procedure::Blam
            }
            "CLOSE" => {
                self.enter(&token);
                let beats = self.value()?;
                let dir = self.value()?;
                Procedure::Close { beats, dir }
            }
            "COUNTERMARCH" => {
                self.enter(&token);
                let ref1 = self.point()?;
                let ref2 = self.point()?;
                let steps = self.value()?;
                let dir1 = self.value()?;
                let dir2 = self.value()?;
                let beats = self.value()?;
                Procedure::Countermarch {
                    ref1,
                    ref2,
                    steps,
                    dir1,
                    dir2,
                    beats,
                }
            }
            "DMCM" | "HSCM" => {
                self.enter(&token);
                let ref1 = self.point()?;
                let ref2 = self.point()?;
                let beats = self.value()?;
                if word == "DMCM" {
                    Procedure::Dmcm { ref1, ref2, beats }
                } else {
                    Procedure::Hscm { ref1, ref2, beats }
                }
            }
            "DMHS" | "EWNS" | "FMTO" | "HSDM" | "MAGIC" | "NSEW" => {
                self.enter(&token);
                let p = self.point()?;
                match word.as_str() {
                    "DMHS" => Procedure::Dmhs(p),
                    "EWNS" => Procedure::Ewns(p),
                    "FMTO" => Procedure::Fmto(p),
                    "HSDM" => Procedure::Hsdm(p),
                    "MAGIC" => Procedure::Magic(p),
                    _ => Procedure::Nsew(p),
                }
            }
            "EVEN" => {
                self.enter(&token);
                let steps = self.value()?;
                let point = self.point()?;
                Procedure::Even { steps, point }
            }
            "FOUNTAIN" => {
                self.enter(&token);
                let dir1 = self.value()?;
                let dir2 = self.value()?;
                let step_sizes = if self.starts_point() {
                    None
                } else {
                    let s1 = self.value()?;
                    let s2 = self.value()?;
                    Some((s1, s2))
                };
                let point = self.point()?;
                Procedure::Fountain {
                    dir1,
                    dir2,
                    step_sizes,
                    point,
                }
            }
            "FM" => {
                self.enter(&token);
                let steps = self.value()?;
                let dir = self.value()?;
                Procedure::Fm { steps, dir }
            }
            "GRID" => {
                self.enter(&token);
                Procedure::Grid(self.value()?)
            }
            "MARCH" => {
                self.enter(&token);
                let step_size = self.value()?;
                let steps = self.value()?;
                let dir = self.value()?;
                let facing = if self.starts_value() {
                    Some(self.value()?)
                } else {
                    None
                };
                Procedure::March {
                    step_size,
                    steps,
                    dir,
                    facing,
                }
            }
            "MT" => {
                self.enter(&token);
                let beats = self.value()?;
                let dir = self.value()?;
                Procedure::Mt { beats, dir }
            }
            "MTRM" => {
                self.enter(&token);
                Procedure::Mtrm(self.value()?)
            }
            "ROTATE" => {
                self.enter(&token);
                let angle = self.value()?;
                let steps = self.value()?;
                let pivot = self.point()?;
                Procedure::Rotate {
                    angle,
                    steps,
                    pivot,
                }
            }
            _ => {
                return Err(CompileError::new(
                    "unknown procedure",
                    token.text.clone(),
                    token.span,
                ));
            }
        };
        self.verb = None;
        Ok(Spanned {
            node,
            span: token.span,
        })
    }

    fn enter(&mut self, verb: &Token) {
        self.pos += 1;
        self.verb = Some(verb.text.clone());
    }

    fn starts_point(&self) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Ident(w)) if Self::point_keyword(w).is_some())
    }

    fn starts_value(&self) -> bool {
        match self.peek_kind() {
            Some(TokenKind::Number(_) | TokenKind::Minus | TokenKind::LParen) => true,
            Some(TokenKind::Ident(w)) => {
                w == "REM"
                    || Constant::from_keyword(w).is_some()
                    || Var::from_keyword(w).is_some()
                    || FUNCTIONS.contains(&w.as_str())
            }
            _ => false,
        }
    }

    /// Classifies a point keyword. `Some(Err(()))` is a reference point whose
    /// number is out of range.
    fn point_keyword(word: &str) -> Option<Result<Point, ()>> {
        match word {
            "P" => Some(Ok(Point::Current)),
            "SP" => Some(Ok(Point::Start)),
            "NP" => Some(Ok(Point::Next)),
            _ => {
                let digits = word.strip_prefix('R')?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                Some(
                    digits
                        .parse::<u8>()
                        .ok()
                        .filter(|n| *n <= MAX_REF_POINT)
                        .map(Point::Ref)
                        .ok_or(()),
                )
            }
        }
    }

    fn point(&mut self) -> PResult<Point> {
        let parsed = match self.peek_kind() {
            Some(TokenKind::Ident(w)) => Self::point_keyword(w),
            _ => None,
        };
        match parsed {
            Some(Ok(point)) => {
                self.pos += 1;
                Ok(point)
            }
            Some(Err(())) => Err(self.error("reference point out of range")),
            None => Err(self.error("expected a point")),
        }
    }

    fn value(&mut self) -> PResult<Value> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Value::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> PResult<Value> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Value::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn factor(&mut self) -> PResult<Value> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("expected a value"));
        };
        match &token.kind {
            TokenKind::Number(v) => {
                self.pos += 1;
                Ok(Value::Number(*v))
            }
            TokenKind::Minus => {
                self.pos += 1;
                Ok(Value::Neg(Box::new(self.factor()?)))
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.value()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(word) => {
                if word == "REM" {
                    self.pos += 1;
                    return Ok(Value::Remaining);
                }
                if let Some(c) = Constant::from_keyword(word) {
                    self.pos += 1;
                    return Ok(Value::Constant(c));
                }
                if let Some(v) = Var::from_keyword(word) {
                    self.pos += 1;
                    return Ok(Value::Var(v));
                }
                if FUNCTIONS.contains(&word.as_str()) {
                    self.pos += 1;
                    return self.function(word);
                }
                Err(self.error("expected a value"))
            }
            _ => Err(self.error("expected a value")),
        }
    }

    fn function(&mut self, name: &str) -> PResult<Value> {
        self.expect(&TokenKind::LParen, "'(' after function name")?;
        let value = match name {
            "DIR" => Value::Dir(self.point()?),
            "DIRFROM" => {
                let a = self.point()?;
                Value::DirFrom(a, self.point()?)
            }
            "DIST" => Value::Dist(self.point()?),
            "DISTFROM" => {
                let a = self.point()?;
                Value::DistFrom(a, self.point()?)
            }
            "EITHER" => {
                let d1 = self.value()?;
                let d2 = self.value()?;
                Value::Either(Box::new(d1), Box::new(d2), self.point()?)
            }
            "OPP" => Value::Opp(Box::new(self.value()?)),
            _ => {
                let beats = self.value()?;
                let block = self.value()?;
                Value::Step(Box::new(beats), Box::new(block), self.point()?)
            }
        };
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(value)
    }
}
