//! Lexer and parser for block instruction text.
//!
//! The text form is line oriented: one operation per line, `#` starts a
//! comment, and `REPEAT n { ... }` nests a sub-block.
//!
//! ```text
//! H 0
//! CX 0 1
//! X_ERROR(0.01) 0 1
//! M 0 1
//! DETECTOR rec[-1] rec[-2]
//! ```

use logos::Logos;

use crate::error::{ParseError, ParseResult};
use crate::instruction::{Instruction, Operation, Target};
use crate::opcode::{OpClass, OpCode};

/// Tokens of block instruction text.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("\n")]
    Newline,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    Int(u64),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("-")]
    Minus,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Newline => write!(f, "newline"),
            Token::Float(v) => write!(f, "{v}"),
            Token::Int(v) => write!(f, "{v}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Minus => write!(f, "-"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
        }
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Tokenize block text.
pub fn tokenize(source: &str) -> ParseResult<Vec<SpannedToken>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push(SpannedToken { token, span }),
            Err(()) => {
                let slice = &source[span.clone()];
                return Err(ParseError::LexerError {
                    position: span.start,
                    message: format!("Invalid token: '{slice}'"),
                });
            }
        }
    }

    Ok(tokens)
}

/// Parse block text into instructions.
pub fn parse_instructions(source: &str) -> ParseResult<Vec<Instruction>> {
    let mut parser = Parser::new(source)?;
    let body = parser.parse_lines(false)?;
    Ok(body)
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(source: &str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            line: 1,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        if token == Token::Newline {
            self.line += 1;
        }
        Some(token)
    }

    fn expect(&mut self, expected: &Token) -> ParseResult<()> {
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {expected}")))?;
        if std::mem::discriminant(&found) != std::mem::discriminant(expected) {
            return Err(self.unexpected(expected.to_string(), &found));
        }
        Ok(())
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: impl Into<String>, found: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            line: self.line,
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Parse lines until end of input, or until `}` when inside a REPEAT.
    fn parse_lines(&mut self, nested: bool) -> ParseResult<Vec<Instruction>> {
        let mut out = Vec::new();
        loop {
            match self.peek() {
                None if nested => {
                    return Err(ParseError::UnexpectedEof("expected }".into()));
                }
                None => return Ok(out),
                Some(Token::Newline) => {
                    self.advance();
                }
                Some(Token::RBrace) if nested => {
                    self.advance();
                    return Ok(out);
                }
                Some(Token::Ident(_)) => out.push(self.parse_line()?),
                Some(other) => {
                    let other = other.clone();
                    return Err(self.unexpected("instruction name", &other));
                }
            }
        }
    }

    fn parse_line(&mut self) -> ParseResult<Instruction> {
        let name = match self.advance() {
            Some(Token::Ident(name)) => name,
            Some(other) => return Err(self.unexpected("instruction name", &other)),
            None => return Err(ParseError::UnexpectedEof("expected instruction".into())),
        };

        if name.eq_ignore_ascii_case("REPEAT") {
            return self.parse_repeat();
        }

        let opcode = OpCode::from_name(&name).ok_or_else(|| ParseError::UnknownInstruction {
            line: self.line,
            name: name.clone(),
        })?;

        let args = if self.consume(&Token::LParen) {
            self.parse_args()?
        } else {
            Vec::new()
        };

        let mut targets = Vec::new();
        loop {
            match self.peek() {
                None | Some(Token::Newline | Token::RBrace) => break,
                _ => targets.push(self.parse_target()?),
            }
        }

        let op = Operation {
            opcode,
            args,
            targets,
        };
        validate(&op)?;
        Ok(Instruction::Op(op))
    }

    fn parse_repeat(&mut self) -> ParseResult<Instruction> {
        let line = self.line;
        let count = match self.advance() {
            Some(Token::Int(n)) => n,
            Some(other) => return Err(self.unexpected("repeat count", &other)),
            None => return Err(ParseError::UnexpectedEof("expected repeat count".into())),
        };
        if count == 0 {
            return Err(ParseError::InvalidRepeatCount { line });
        }
        self.expect(&Token::LBrace)?;
        let body = self.parse_lines(true)?;
        Ok(Instruction::Repeat { count, body })
    }

    fn parse_args(&mut self) -> ParseResult<Vec<f64>> {
        let mut args = Vec::new();
        if self.consume(&Token::RParen) {
            return Ok(args);
        }
        loop {
            let negative = self.consume(&Token::Minus);
            #[allow(clippy::cast_precision_loss)]
            let value = match self.advance() {
                Some(Token::Float(v)) => v,
                Some(Token::Int(v)) => v as f64,
                Some(other) => return Err(self.unexpected("number", &other)),
                None => return Err(ParseError::UnexpectedEof("expected number".into())),
            };
            args.push(if negative { -value } else { value });

            match self.advance() {
                Some(Token::Comma) => {}
                Some(Token::RParen) => return Ok(args),
                Some(other) => return Err(self.unexpected(", or )", &other)),
                None => return Err(ParseError::UnexpectedEof("expected )".into())),
            }
        }
    }

    fn parse_target(&mut self) -> ParseResult<Target> {
        match self.advance() {
            Some(Token::Int(q)) => {
                let q = u32::try_from(q).map_err(|_| ParseError::UnexpectedToken {
                    line: self.line,
                    expected: "qubit index".into(),
                    found: q.to_string(),
                })?;
                Ok(Target::Qubit(q))
            }
            Some(Token::Ident(ref s)) if s == "rec" => {
                self.expect(&Token::LBracket)?;
                self.expect(&Token::Minus)?;
                let offset = match self.advance() {
                    Some(Token::Int(n)) if n > 0 => i64::try_from(n).ok(),
                    _ => None,
                };
                let offset = offset.ok_or_else(|| ParseError::UnexpectedToken {
                    line: self.line,
                    expected: "positive record offset".into(),
                    found: "invalid offset".into(),
                })?;
                self.expect(&Token::RBracket)?;
                Ok(Target::Rec(-offset))
            }
            Some(other) => Err(self.unexpected("target", &other)),
            None => Err(ParseError::UnexpectedEof("expected target".into())),
        }
    }
}

/// Validate already-built instructions the same way parsed text is validated.
pub fn validate_instructions(instructions: &[Instruction]) -> ParseResult<()> {
    for instruction in instructions {
        match instruction {
            Instruction::Op(op) => validate(op)?,
            Instruction::Repeat { count, body } => {
                if *count == 0 {
                    return Err(ParseError::InvalidRepeatCount { line: 0 });
                }
                validate_instructions(body)?;
            }
        }
    }
    Ok(())
}

/// Check argument count, argument range, and target shape of an operation.
pub fn validate(op: &Operation) -> ParseResult<()> {
    let name = op.opcode.name();
    let class = op.opcode.class();

    match class {
        OpClass::Noise => {
            if op.args.len() != 1 {
                return Err(ParseError::WrongArgumentCount {
                    name: name.into(),
                    expected: 1,
                    got: op.args.len(),
                });
            }
            let p = op.args[0];
            if !(0.0..=1.0).contains(&p) {
                return Err(ParseError::InvalidArgument {
                    name: name.into(),
                    value: p,
                });
            }
        }
        OpClass::Annotation => {}
        _ => {
            if !op.args.is_empty() {
                return Err(ParseError::WrongArgumentCount {
                    name: name.into(),
                    expected: 0,
                    got: op.args.len(),
                });
            }
        }
    }

    for target in &op.targets {
        let ok = match target {
            Target::Qubit(_) => !op.opcode.takes_record_targets(),
            Target::Rec(_) => op.opcode.takes_record_targets(),
        };
        if !ok {
            return Err(ParseError::InvalidTarget {
                name: name.into(),
                target: target.to_string(),
            });
        }
    }

    if class == OpClass::TwoQubit {
        if op.targets.len() % 2 != 0 {
            return Err(ParseError::OddTargetCount {
                name: name.into(),
                got: op.targets.len(),
            });
        }
        for pair in op.targets.chunks_exact(2) {
            if pair[0] == pair[1] {
                if let Target::Qubit(qubit) = pair[0] {
                    return Err(ParseError::RepeatedPairTarget {
                        name: name.into(),
                        qubit,
                    });
                }
            }
        }
    }

    Ok(())
}
