use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Error;

const LABEL_MAX_LENGTH: usize = 21;
const LABEL_SHORT_LENGTH: usize = 6;

// ----------------------------------------------------------------------------
// Symbol

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub label: String,
    pub value: i32,
    pub relocatable: bool,
    pub multiply_defined: bool,
}

impl Symbol {
    pub fn new(label: &str, value: i32, relocatable: bool) -> Result<Self, Error> {
        Ok(Symbol {
            label: normalize_label(label)?,
            value,
            relocatable,
            multiply_defined: false,
        })
    }

    /// Label cut to the significant length used in fixed-width output.
    pub fn short_label(&self) -> &str {
        match self.label.char_indices().nth(LABEL_SHORT_LENGTH) {
            Some((idx, _)) => &self.label[..idx],
            None => &self.label,
        }
    }

    /// Parse a symbol table entry of the form `VALUE LABEL RFLAG`.
    pub fn parse_entry(line: &str) -> Result<Self, Error> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let [value, label, rflag] = words.as_slice() else {
            return Err(Error::InvalidSymbolEntry {
                field: "entry",
                actual: line.trim().to_string(),
                reason: format!("Invalid number of tokens ({})", words.len()),
                expected: "3 tokens [VALUE LABEL RFLAG]".to_string(),
            });
        };
        let value = parse_value(value)?;
        let relocatable = parse_rflag(rflag)?;
        Symbol::new(label, value, relocatable).map_err(|e| match e {
            Error::InvalidLabel {
                label,
                reason,
                expected,
            } => Error::InvalidSymbolEntry {
                field: "label",
                actual: label,
                reason,
                expected,
            },
            other => other,
        })
    }
}

/// Trim, fold to upper case and check the label grammar
/// `^[A-Za-z][A-Za-z0-9_]{0,20}$`.
pub fn normalize_label(label: &str) -> Result<String, Error> {
    let label = label.trim();
    let invalid = |reason: &str, expected: &str| Error::InvalidLabel {
        label: label.to_string(),
        reason: reason.to_string(),
        expected: expected.to_string(),
    };

    let len = label.chars().count();
    if len == 0 || len > LABEL_MAX_LENGTH {
        return Err(invalid(
            "Out of range",
            "1-21 letters, digits and underscores",
        ));
    }
    if !label.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("Invalid first character", "a letter"));
    }
    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("Invalid character", "letters, digits and underscores"));
    }
    Ok(label.to_ascii_uppercase())
}

fn parse_value(s: &str) -> Result<i32, Error> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    let invalid = || Error::InvalidSymbolEntry {
        field: "value",
        actual: s.to_string(),
        reason: "Not a valid integer".to_string(),
        expected: "32 bit integer".to_string(),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    s.parse::<i32>().map_err(|_| invalid())
}

fn parse_rflag(s: &str) -> Result<bool, Error> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        _ => Err(Error::InvalidSymbolEntry {
            field: "rflag",
            actual: s.to_string(),
            reason: "Not a valid boolean value".to_string(),
            expected: "[true/false, t/f, 1/0]".to_string(),
        }),
    }
}

// ----------------------------------------------------------------------------
// Symbol Table

/// Outcome of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Declared {
    Inserted(Symbol),
    /// The label was already present. Holds the stored entry, whose value
    /// is unchanged and which is now flagged as multiply defined.
    Existing(Symbol),
}

impl Declared {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Declared::Inserted(sym) | Declared::Existing(sym) => sym,
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, Declared::Existing(_))
    }
}

/// Labels ordered by their normalized text.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: BTreeMap::new(),
        }
    }

    pub fn declare(&mut self, label: &str, value: i32, relocatable: bool) -> Result<Declared, Error> {
        let symbol = Symbol::new(label, value, relocatable)?;
        Ok(self.insert(symbol))
    }

    /// Parse a `VALUE LABEL RFLAG` entry and declare it.
    pub fn seed(&mut self, line: &str) -> Result<Declared, Error> {
        Ok(self.insert(Symbol::parse_entry(line)?))
    }

    fn insert(&mut self, symbol: Symbol) -> Declared {
        match self.symbols.get_mut(&symbol.label) {
            Some(prev) => {
                prev.multiply_defined = true;
                Declared::Existing(prev.clone())
            }
            None => {
                self.symbols.insert(symbol.label.clone(), symbol.clone());
                Declared::Inserted(symbol)
            }
        }
    }

    /// Overwrite the value of an existing symbol.
    pub fn assign(&mut self, label: &str, value: i32, relocatable: bool) -> Option<&Symbol> {
        let key = normalize_label(label).ok()?;
        let symbol = self.symbols.get_mut(&key)?;
        symbol.value = value;
        symbol.relocatable = relocatable;
        Some(symbol)
    }

    /// Put back an entry as it was before a declaration, or drop the label
    /// when it did not exist.
    pub fn restore(&mut self, label: &str, before: Option<Symbol>) {
        let Ok(key) = normalize_label(label) else {
            return;
        };
        match before {
            Some(symbol) => {
                self.symbols.insert(key, symbol);
            }
            None => {
                self.symbols.remove(&key);
            }
        }
    }

    pub fn lookup(&self, label: &str) -> Option<&Symbol> {
        let key = normalize_label(label).ok()?;
        self.symbols.get(&key)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.lookup(label).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
