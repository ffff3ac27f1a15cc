use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::tokens::match_quoted;

/// Named literal arguments, as written in an `@(key=value, ...)` block.
///
/// A repeated key keeps its last value.
pub type Args = BTreeMap<String, ArgValue>;

/// A literal argument value.
///
/// # Examples
///
/// ```rust
/// use topdown::ast::value::ArgValue;
/// assert_eq!(ArgValue::Int(3).to_string(), "3");
/// assert_eq!(ArgValue::Bool(true).to_string(), "True");
/// assert_eq!(ArgValue::Str("a'b".into()).to_string(), r"'a\'b'");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    #[default]
    None,
}

impl ArgValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Str(_) => "Str",
            ArgValue::Int(_) => "Int",
            ArgValue::Float(_) => "Float",
            ArgValue::Bool(_) => "Bool",
            ArgValue::None => "None",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Prints the value as a literal the grammar language reads back.
impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => write_quoted(f, s),
            ArgValue::Int(n) => write!(f, "{n}"),
            // Overflowing literals decode to infinity; 1e999 reads back as one.
            ArgValue::Float(x) if x.is_infinite() => {
                f.write_str(if x.is_sign_negative() { "-1e999" } else { "1e999" })
            }
            // Debug keeps a decimal point on whole floats ("2.0").
            ArgValue::Float(x) => write!(f, "{x:?}"),
            ArgValue::Bool(true) => f.write_str("True"),
            ArgValue::Bool(false) => f.write_str("False"),
            ArgValue::None => f.write_str("None"),
        }
    }
}

/// Writes `s` as a single-quoted, escaped literal.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\'' => f.write_str("\\'")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

// ============================================================================
// LITERAL DECODING
// ============================================================================

/// Decodes a quoted literal lexeme into its value.
///
/// Raw (`r`-prefixed) literals are taken verbatim. Otherwise the usual
/// backslash escapes are processed; an unknown escape such as `\d` is kept
/// as written, so regular-expression sources survive unchanged.
///
/// Returns `None` if `lexeme` is not a complete quoted literal.
pub fn decode_string(lexeme: &str) -> Option<String> {
    let lit = match_quoted(lexeme).filter(|lit| lit.len == lexeme.len())?;
    let body = lit.body(lexeme);
    if lit.raw {
        return Some(body.to_string());
    }
    Some(unescape(body))
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(escaped),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            '0' => out.push('\0'),
            'x' | 'u' | 'U' => {
                let width = match escaped {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(escaped);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

/// Decodes a numeric literal lexeme.
///
/// Literals without a fraction or exponent that fit an `i64` become `Int`;
/// everything else becomes `Float`.
pub fn decode_number(lexeme: &str) -> Option<ArgValue> {
    let is_integral = !lexeme.contains(['.', 'e', 'E']);
    if is_integral {
        if let Ok(n) = lexeme.parse::<i64>() {
            return Some(ArgValue::Int(n));
        }
    }
    lexeme.parse::<f64>().ok().map(ArgValue::Float)
}
