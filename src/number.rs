use crate::expr::{self, ExprError, Value};

/// Size suffixes and the power of 1024 each one stands for.
const SUFFIXES: [(char, &str); 4] = [
    ('k', "*(1024**1)"),
    ('m', "*(1024**2)"),
    ('g', "*(1024**3)"),
    ('t', "*(1024**4)"),
];

/// Unit-spelling letters with no numeric meaning ("KiB" -> "k").
const NOISE: [char; 2] = ['b', 'i'];

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NumberError {
    #[error("couldn't parse number [{input}]: {source}")]
    Parse {
        input: String,
        #[source]
        source: ExprError,
    },
    #[error("couldn't decode number: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("number [{input}] is negative")]
    Negative { input: String },
    #[error("number [{input}] is too large")]
    Overflow { input: String },
}

pub type Result<T> = std::result::Result<T, NumberError>;

/// A number as handed over by a caller: already resolved, or still text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal<'a> {
    Int(u64),
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl From<u64> for Literal<'_> {
    fn from(n: u64) -> Self {
        Literal::Int(n)
    }
}

impl<'a> From<&'a str> for Literal<'a> {
    fn from(s: &'a str) -> Self {
        Literal::Text(s)
    }
}

impl<'a> From<&'a String> for Literal<'a> {
    fn from(s: &'a String) -> Self {
        Literal::Text(s.as_str())
    }
}

impl<'a> From<&'a [u8]> for Literal<'a> {
    fn from(b: &'a [u8]) -> Self {
        Literal::Bytes(b)
    }
}

/// Normalize a size/offset literal to a byte count.
///
/// Accepts plain decimals, `0x`/`0o`/`0b` integers, binary size suffixes
/// (`k`, `m`, `g`, `t`, optionally spelled `ki`/`kib`), `_` digit separators
/// and arithmetic over all of these (`4k+512`). Fractional results are
/// truncated toward zero.
///
/// ```
/// use byterange::number::normalize_int;
///
/// assert_eq!(normalize_int("4KiB").unwrap(), 4096);
/// assert_eq!(normalize_int("0x1A").unwrap(), 26);
/// assert_eq!(normalize_int("1.5k").unwrap(), 1536);
/// assert_eq!(normalize_int(7u64).unwrap(), 7);
/// ```
pub fn normalize_int<'a>(input: impl Into<Literal<'a>>) -> Result<u64> {
    let text = match input.into() {
        Literal::Int(n) => return Ok(n),
        Literal::Text(s) => s,
        Literal::Bytes(b) => std::str::from_utf8(b)?,
    };

    let value = evaluate_literal(text)?;
    let n = truncate(value, text)?;
    tracing::trace!(input = text, value = n, "normalized number");
    Ok(n)
}

/// Shorthand for [`normalize_int`] on command-line text.
pub fn parse_byte_count(s: &str) -> Result<u64> {
    normalize_int(s)
}

fn evaluate_literal(orig: &str) -> Result<Value> {
    let parse_err = |source| NumberError::Parse {
        input: orig.to_string(),
        source,
    };

    let number = orig.trim().to_lowercase();

    if matches!(number.chars().nth(1), Some('o' | 'x' | 'b')) {
        // whole string is one literal, no suffixes or arithmetic
        return match expr::parse_prefixed_int(&number, 0) {
            Ok(n) => Ok(Value::Int(i128::from(n))),
            Err(ExprError::Overflow) => Err(NumberError::Overflow {
                input: orig.to_string(),
            }),
            Err(e) => Err(parse_err(e)),
        };
    }

    let mut expanded: String = number.chars().filter(|c| !NOISE.contains(c)).collect();
    for (suffix, factor) in SUFFIXES {
        expanded = expanded.replace(suffix, factor);
    }
    expanded.retain(|c| c != '_');

    expr::evaluate(&expanded).map_err(parse_err)
}

fn truncate(value: Value, orig: &str) -> Result<u64> {
    let negative = || NumberError::Negative {
        input: orig.to_string(),
    };
    let overflow = || NumberError::Overflow {
        input: orig.to_string(),
    };

    match value {
        Value::Int(i) if i < 0 => Err(negative()),
        Value::Int(i) => u64::try_from(i).map_err(|_| overflow()),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(overflow());
            }
            let t = f.trunc();
            if t < 0.0 {
                Err(negative())
            } else if t >= u64::MAX as f64 {
                // u64::MAX as f64 rounds up to 2^64
                Err(overflow())
            } else {
                Ok(t as u64)
            }
        }
    }
}
