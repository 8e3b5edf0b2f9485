//! Restricted arithmetic over numeric literals.
//!
//! The accepted language is numbers, `+ - * / **` and parentheses. There is
//! no notion of a name, call or attribute anywhere in the token set, so an
//! input can only ever evaluate to a number or fail.

use std::fmt;

/// Nesting limit for parentheses and unary operators.
pub const MAX_DEPTH: usize = 200;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character {ch:?} at {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("invalid numeric literal {text:?} at {pos}")]
    InvalidLiteral { text: String, pos: usize },
    #[error("unexpected {found} at {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a real number")]
    NotReal,
    #[error("arithmetic overflow")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, ExprError>;

/// Result of evaluating an expression: integers stay exact until something
/// forces them into floating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i128),
    Float(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(i) => i as f64,
            Value::Float(f) => f,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Value),
    Plus,
    Minus,
    Star,
    Slash,
    StarStar,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(v) => write!(f, "number {}", v),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::StarStar => f.write_str("'**'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

/// Evaluate `src` under the restricted grammar.
///
/// ```
/// use byterange::expr::{evaluate, Value};
///
/// assert_eq!(evaluate("4*(1024**1)+512").unwrap(), Value::Int(4608));
/// assert_eq!(evaluate("3/2").unwrap(), Value::Float(1.5));
/// ```
pub fn evaluate(src: &str) -> Result<Value> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut p = Parser { tokens, pos: 0, depth: 0 };
    let v = p.expr()?;
    match p.tokens.get(p.pos) {
        None => Ok(v),
        Some((tok, pos)) => Err(ExprError::UnexpectedToken {
            found: tok.to_string(),
            pos: *pos,
        }),
    }
}

// ---------- Tokenizer ----------

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let tok = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'/' => Token::Slash,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    i += 1;
                    Token::StarStar
                } else {
                    Token::Star
                }
            }
            b'0'..=b'9' | b'.' => {
                let (value, end) = lex_number(src, i)?;
                out.push((Token::Num(value), start));
                i = end;
                continue;
            }
            _ => {
                // report the full char, not the byte
                let ch = src[i..].chars().next().unwrap_or('\u{fffd}');
                return Err(ExprError::UnexpectedChar { ch, pos: i });
            }
        };
        out.push((tok, start));
        i += 1;
    }
    Ok(out)
}

fn lex_number(src: &str, start: usize) -> Result<(Value, usize)> {
    let bytes = src.as_bytes();

    if bytes[start] == b'0' && matches!(bytes.get(start + 1), Some(b'x' | b'o' | b'b')) {
        let mut end = start + 2;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        let n = parse_prefixed_int(&src[start..end], start)?;
        return Ok((Value::Int(i128::from(n)), end));
    }

    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let int_end = digits_from(start);
    let mut end = int_end;
    let mut is_float = false;

    if bytes.get(end) == Some(&b'.') {
        is_float = true;
        end = digits_from(end + 1);
        // a lone "." is not a number
        if end == start + 1 {
            return Err(ExprError::UnexpectedChar { ch: '.', pos: start });
        }
    }

    if bytes.get(end) == Some(&b'e') {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end == exp {
            return Err(ExprError::InvalidLiteral {
                text: src[start..exp.min(bytes.len())].to_string(),
                pos: start,
            });
        }
        is_float = true;
        end = exp_end;
    }

    let text = &src[start..end];
    let value = if is_float {
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ExprError::InvalidLiteral {
                text: text.to_string(),
                pos: start,
            })?
    } else {
        // "00" is zero, "010" is neither decimal nor octal
        if text.len() > 1 && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
            return Err(ExprError::InvalidLiteral {
                text: text.to_string(),
                pos: start,
            });
        }
        text.parse::<i128>()
            .map(Value::Int)
            .map_err(|_| ExprError::Overflow)?
    };
    Ok((value, end))
}

/// Parse a whole `0x..`, `0o..` or `0b..` literal. One `_` may follow the
/// prefix and single `_` may sit between digits.
pub fn parse_prefixed_int(text: &str, pos: usize) -> Result<u64> {
    let invalid = || ExprError::InvalidLiteral {
        text: text.to_string(),
        pos,
    };

    let radix = match text.get(..2) {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return Err(invalid()),
    };
    let body = &text[2..];
    let digits = body.strip_prefix('_').unwrap_or(body);
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || !digits.chars().all(|c| c == '_' || c.is_digit(radix))
    {
        return Err(invalid());
    }

    let clean: String = digits.chars().filter(|&c| c != '_').collect();
    u64::from_str_radix(&clean, radix).map_err(|_| ExprError::Overflow)
}

// ---------- Recursive descent ----------

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn bump(&mut self) -> Option<(Token, usize)> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Value> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    lhs = add(lhs, self.term()?)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    lhs = sub(lhs, self.term()?)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<Value> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    lhs = mul(lhs, self.unary()?)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    lhs = div(lhs, self.unary()?)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<Value> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.enter()?;
                let v = self.unary()?;
                self.depth -= 1;
                Ok(v)
            }
            Some(Token::Minus) => {
                self.pos += 1;
                self.enter()?;
                let v = neg(self.unary()?)?;
                self.depth -= 1;
                Ok(v)
            }
            _ => self.power(),
        }
    }

    // `**` is right-associative and its exponent may carry a sign: 2**-1
    fn power(&mut self) -> Result<Value> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::StarStar) {
            self.pos += 1;
            self.enter()?;
            let exp = self.unary()?;
            self.depth -= 1;
            return pow(base, exp);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Value> {
        match self.bump() {
            Some((Token::Num(v), _)) => Ok(v),
            Some((Token::LParen, _)) => {
                self.enter()?;
                let v = self.expr()?;
                self.depth -= 1;
                match self.bump() {
                    Some((Token::RParen, _)) => Ok(v),
                    Some((tok, pos)) => Err(ExprError::UnexpectedToken {
                        found: tok.to_string(),
                        pos,
                    }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some((tok, pos)) => Err(ExprError::UnexpectedToken {
                found: tok.to_string(),
                pos,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

// ---------- Arithmetic ----------

fn finite(x: f64) -> Result<Value> {
    if x.is_finite() {
        Ok(Value::Float(x))
    } else {
        Err(ExprError::Overflow)
    }
}

fn add(a: Value, b: Value) -> Result<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.checked_add(y).map(Value::Int).ok_or(ExprError::Overflow),
        _ => Ok(Value::Float(a.as_f64() + b.as_f64())),
    }
}

fn sub(a: Value, b: Value) -> Result<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.checked_sub(y).map(Value::Int).ok_or(ExprError::Overflow),
        _ => Ok(Value::Float(a.as_f64() - b.as_f64())),
    }
}

fn mul(a: Value, b: Value) -> Result<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.checked_mul(y).map(Value::Int).ok_or(ExprError::Overflow),
        _ => Ok(Value::Float(a.as_f64() * b.as_f64())),
    }
}

// true division, always a float
fn div(a: Value, b: Value) -> Result<Value> {
    let d = b.as_f64();
    if d == 0.0 {
        return Err(ExprError::DivisionByZero);
    }
    Ok(Value::Float(a.as_f64() / d))
}

fn neg(a: Value) -> Result<Value> {
    match a {
        Value::Int(x) => x.checked_neg().map(Value::Int).ok_or(ExprError::Overflow),
        Value::Float(x) => Ok(Value::Float(-x)),
    }
}

fn pow(base: Value, exp: Value) -> Result<Value> {
    match (base, exp) {
        (Value::Int(b), Value::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| ExprError::Overflow)?;
            b.checked_pow(e).map(Value::Int).ok_or(ExprError::Overflow)
        }
        _ => {
            let (b, e) = (base.as_f64(), exp.as_f64());
            if b == 0.0 && e < 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            if b < 0.0 && e.fract() != 0.0 {
                return Err(ExprError::NotReal);
            }
            finite(b.powf(e))
        }
    }
}
