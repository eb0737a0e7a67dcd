use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::Error;

const GRAMMAR: &str = "=C'chars', =X'hex', C'chars', X'hex' or a decimal integer";
const WORD_MASK: u32 = 0xFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum LiteralKind {
    NumberLiteral,
    StringLiteral,
    ConstantNumber,
    ConstantString,
    JustNumber,
}

// ----------------------------------------------------------------------------
// Literal

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Literal {
    pub expression: String,
    pub kind: LiteralKind,
    pub bytes: Vec<u8>,
    pub address: Option<i32>,
}

/// Literals are the same constant when they encode to the same bytes.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Literal {}

impl Literal {
    pub fn parse(expression: &str) -> Result<Self, Error> {
        let text = expression.trim();
        let invalid = || Error::InvalidLiteral(text.to_string(), GRAMMAR);

        let (pooled, body) = match text.strip_prefix('=') {
            Some(body) => (true, body),
            None => (false, text),
        };

        if !pooled {
            if let Some(value) = parse_decimal(body) {
                return Ok(Literal {
                    expression: text.to_string(),
                    kind: LiteralKind::JustNumber,
                    bytes: hex_bytes(&format!("{:X}", value as u32 & WORD_MASK)).ok_or_else(invalid)?,
                    address: None,
                });
            }
        }

        let mut chars = body.chars();
        let marker = chars.next().map(|c| c.to_ascii_uppercase());
        let quoted = chars
            .as_str()
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?;

        let (kind, bytes) = match (marker, pooled) {
            (Some('C'), true) => (LiteralKind::StringLiteral, ascii_bytes(quoted)),
            (Some('C'), false) => (LiteralKind::ConstantString, ascii_bytes(quoted)),
            (Some('X'), true) => (LiteralKind::NumberLiteral, hex_bytes(quoted)),
            (Some('X'), false) => (LiteralKind::ConstantNumber, hex_bytes(quoted)),
            _ => return Err(invalid()),
        };

        Ok(Literal {
            expression: text.to_string(),
            kind,
            bytes: bytes.ok_or_else(invalid)?,
            address: None,
        })
    }

    /// Whether `text` is written in one of the literal or constant forms.
    /// Anything starting with `=` counts, so malformed literals are
    /// reported as such instead of as unknown symbols.
    pub fn is_literal_form(text: &str) -> bool {
        let text = text.trim();
        if text.starts_with('=') {
            return true;
        }
        let mut chars = text.chars();
        matches!(chars.next(), Some('C' | 'c' | 'X' | 'x'))
            && chars.next() == Some('\'')
            && text.len() > 2
            && text.ends_with('\'')
    }

    pub fn is_pooled(&self) -> bool {
        matches!(
            self.kind,
            LiteralKind::NumberLiteral | LiteralKind::StringLiteral
        )
    }

    /// Integer view of the literal: the number itself, the low 24 bits of a
    /// hex payload, or the first character code of a string.
    pub fn numeric_value(&self) -> i32 {
        match self.kind {
            LiteralKind::JustNumber => parse_decimal(&self.expression).unwrap_or(0),
            LiteralKind::NumberLiteral | LiteralKind::ConstantNumber => {
                (self.bytes.iter().fold(0u32, |acc, b| acc << 8 | *b as u32) & WORD_MASK) as i32
            }
            LiteralKind::StringLiteral | LiteralKind::ConstantString => {
                self.bytes.first().copied().unwrap_or(0) as i32
            }
        }
    }

    pub fn hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

fn parse_decimal(s: &str) -> Option<i32> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn ascii_bytes(s: &str) -> Option<Vec<u8>> {
    s.is_ascii().then(|| s.bytes().collect())
}

/// Pack hex digits two per byte, padding an odd count with a leading zero.
fn hex_bytes(s: &str) -> Option<Vec<u8>> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let padded = if s.len() % 2 == 1 {
        format!("0{}", s)
    } else {
        s.to_string()
    };
    (0..padded.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&padded[i..i + 2], 16).ok())
        .collect()
}

// ----------------------------------------------------------------------------
// Literal Table

/// Literal pool. Keyed by encoded bytes; iteration follows registration order.
#[derive(Debug, Clone)]
pub struct LiteralTable {
    literals: IndexMap<Vec<u8>, Literal>,
    next_address: i32,
}

impl LiteralTable {
    pub fn new() -> Self {
        LiteralTable {
            literals: IndexMap::new(),
            next_address: 1,
        }
    }

    /// Pool the literal, or return the pooled one with the same bytes.
    pub fn register(&mut self, expression: &str) -> Result<Literal, Error> {
        let mut literal = Literal::parse(expression)?;
        if let Some(existing) = self.literals.get(&literal.bytes) {
            return Ok(existing.clone());
        }
        literal.address = Some(self.next_address);
        self.next_address += 1;
        self.literals.insert(literal.bytes.clone(), literal.clone());
        Ok(literal)
    }

    pub fn parse_only(&self, expression: &str) -> Result<Literal, Error> {
        Literal::parse(expression)
    }

    /// Forget every literal pooled after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        if len < self.literals.len() {
            self.literals.truncate(len);
            self.next_address = len as i32 + 1;
        }
    }

    pub fn get(&self, bytes: &[u8]) -> Option<&Literal> {
        self.literals.get(bytes)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.values()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

impl Default for LiteralTable {
    fn default() -> Self {
        LiteralTable::new()
    }
}
