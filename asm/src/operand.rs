use arch::reg::Reg;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
    error::Error,
    literal::{Literal, LiteralKind, LiteralTable},
    symbol::{normalize_label, SymbolTable},
};

const IMMEDIATE_TOKEN: char = '#';
const INDIRECT_TOKEN: char = '@';
const INDEXED_SUFFIX: &str = ",X";

/// Addressing mode of an operand column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum OperandKind {
    Simple,
    Immediate,
    Indirect,
    Indexed,
    ArithmeticExpression,
    LiteralNumber,
    LiteralString,
    ConstantNumber,
    ConstantString,
    JustNumber,
    Register,
    NameList,
}

/// Addressing form of expression text, as told apart by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Simple,
    Immediate,
    Indirect,
    Indexed,
    ArithmeticExpression,
    LiteralNumber,
    LiteralString,
    ConstantNumber,
    ConstantString,
    JustNumber,
}

impl From<AddressMode> for OperandKind {
    fn from(mode: AddressMode) -> Self {
        match mode {
            AddressMode::Simple => OperandKind::Simple,
            AddressMode::Immediate => OperandKind::Immediate,
            AddressMode::Indirect => OperandKind::Indirect,
            AddressMode::Indexed => OperandKind::Indexed,
            AddressMode::ArithmeticExpression => OperandKind::ArithmeticExpression,
            AddressMode::LiteralNumber => OperandKind::LiteralNumber,
            AddressMode::LiteralString => OperandKind::LiteralString,
            AddressMode::ConstantNumber => OperandKind::ConstantNumber,
            AddressMode::ConstantString => OperandKind::ConstantString,
            AddressMode::JustNumber => OperandKind::JustNumber,
        }
    }
}

// ----------------------------------------------------------------------------
// Operand

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    pub expression: String,
    pub kind: OperandKind,
    pub value: i32,
    pub relocatable: bool,
    pub bytes: Vec<u8>,
}

impl Operand {
    fn new(expression: &str, kind: OperandKind, value: i32, relocatable: bool) -> Self {
        Operand {
            expression: expression.to_string(),
            kind,
            value,
            relocatable,
            bytes: vec![],
        }
    }

    pub fn byte_size(&self) -> i32 {
        self.bytes.len() as i32
    }

    pub fn is_indexed(&self) -> bool {
        self.kind == OperandKind::Indexed
    }

    pub fn is_indirect(&self) -> bool {
        self.kind == OperandKind::Indirect
    }

    pub fn is_immediate(&self) -> bool {
        self.kind == OperandKind::Immediate
    }
}

/// Classify operand text. The checks run in a fixed order and the first
/// match wins: `,X` suffix, arithmetic operator, `#`, `@`, literal forms,
/// bare integer, then plain symbol.
pub fn classify(expression: &str) -> AddressMode {
    let text = expression.trim();
    if has_index_suffix(text) {
        AddressMode::Indexed
    } else if !operators(text).is_empty() {
        AddressMode::ArithmeticExpression
    } else if text.starts_with(IMMEDIATE_TOKEN) {
        AddressMode::Immediate
    } else if text.starts_with(INDIRECT_TOKEN) {
        AddressMode::Indirect
    } else if Literal::is_literal_form(text) {
        let pooled = text.starts_with('=');
        let number = text
            .trim_start_matches('=')
            .starts_with(['X', 'x']);
        match (pooled, number) {
            (true, true) => AddressMode::LiteralNumber,
            (true, false) => AddressMode::LiteralString,
            (false, true) => AddressMode::ConstantNumber,
            (false, false) => AddressMode::ConstantString,
        }
    } else if is_integer(text) {
        AddressMode::JustNumber
    } else {
        AddressMode::Simple
    }
}

fn has_index_suffix(text: &str) -> bool {
    text.len() >= INDEXED_SUFFIX.len()
        && text.is_char_boundary(text.len() - INDEXED_SUFFIX.len())
        && text[text.len() - INDEXED_SUFFIX.len()..].eq_ignore_ascii_case(INDEXED_SUFFIX)
}

/// Positions of `+`/`-` operators, skipping quoted text, the addressing
/// prefix and a leading sign.
fn operators(text: &str) -> Vec<(usize, char)> {
    let mut ops = vec![];
    let mut quoted = false;
    let mut lead = true;
    for (idx, c) in text.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            IMMEDIATE_TOKEN | INDIRECT_TOKEN if lead => continue,
            '+' | '-' if !quoted && !lead => ops.push((idx, c)),
            _ => {}
        }
        lead = false;
    }
    ops
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

// ----------------------------------------------------------------------------
// Resolver

/// Evaluates operand text against the tables of one assembly run.
/// Literal operands are pooled as a side effect.
pub struct Resolver<'a> {
    symbols: &'a SymbolTable,
    literals: &'a mut LiteralTable,
}

impl<'a> Resolver<'a> {
    pub fn new(symbols: &'a SymbolTable, literals: &'a mut LiteralTable) -> Self {
        Resolver { symbols, literals }
    }

    pub fn resolve(&mut self, expression: &str) -> Result<Operand, Error> {
        let text = expression.trim();
        let mode = classify(text);
        let kind = OperandKind::from(mode);
        match mode {
            AddressMode::Simple => {
                let (value, relocatable) = self.symbol(text)?;
                Ok(Operand::new(text, kind, value, relocatable))
            }
            AddressMode::Immediate => {
                let (value, relocatable) = self.value(&text[IMMEDIATE_TOKEN.len_utf8()..])?;
                Ok(Operand::new(text, kind, value, relocatable))
            }
            AddressMode::Indirect => {
                let (value, relocatable) = self.symbol(&text[INDIRECT_TOKEN.len_utf8()..])?;
                Ok(Operand::new(text, kind, value, relocatable))
            }
            AddressMode::Indexed => {
                let base = &text[..text.len() - INDEXED_SUFFIX.len()];
                if base.trim().is_empty() {
                    return Err(Error::ExpressionSyntax(
                        text.to_string(),
                        "[operand],X",
                    ));
                }
                let (value, relocatable) = self.value(base)?;
                Ok(Operand::new(text, kind, value, relocatable))
            }
            AddressMode::ArithmeticExpression => {
                let (value, relocatable) = self.arithmetic(text)?;
                Ok(Operand::new(text, kind, value, relocatable))
            }
            AddressMode::LiteralNumber | AddressMode::LiteralString => {
                let literal = self.literals.register(text)?;
                let address = literal.address.unwrap_or_default();
                Ok(Operand {
                    bytes: literal.bytes,
                    ..Operand::new(text, kind, address, false)
                })
            }
            AddressMode::ConstantNumber | AddressMode::ConstantString | AddressMode::JustNumber => {
                let literal = self.literals.parse_only(text)?;
                let kind = match literal.kind {
                    LiteralKind::JustNumber => OperandKind::JustNumber,
                    LiteralKind::ConstantNumber => OperandKind::ConstantNumber,
                    _ => OperandKind::ConstantString,
                };
                Ok(Operand {
                    bytes: literal.bytes.clone(),
                    ..Operand::new(text, kind, literal.numeric_value(), false)
                })
            }
        }
    }

    /// Operand of a format 2 instruction: one or two registers, or a
    /// register and a count (`SHIFTL A,4`, `SVC 2`).
    pub fn resolve_registers(&self, expression: &str) -> Result<Operand, Error> {
        let text = expression.trim();
        let parts: Vec<&str> = text.split(',').collect();
        if parts.is_empty() || parts.len() > 2 {
            return Err(Error::ExpressionSyntax(
                text.to_string(),
                "one or two registers separated by a comma",
            ));
        }
        let codes = parts
            .iter()
            .map(|part| register_code(part))
            .collect::<Result<Vec<u8>, Error>>()?;
        let value = codes.iter().fold(0, |acc, code| acc << 4 | *code as i32)
            << (4 * (2 - codes.len()));
        Ok(Operand::new(text, OperandKind::Register, value, false))
    }

    /// Operand of EXTDEF/EXTREF: comma separated names, checked but not
    /// looked up.
    pub fn resolve_names(&self, expression: &str) -> Result<Operand, Error> {
        let text = expression.trim();
        for name in text.split(',') {
            normalize_label(name)?;
        }
        Ok(Operand::new(text, OperandKind::NameList, 0, false))
    }

    /// A single term, or two terms joined by one operator.
    fn value(&self, text: &str) -> Result<(i32, bool), Error> {
        match operators(text).len() {
            0 => self.term(text),
            _ => self.arithmetic(text),
        }
    }

    fn arithmetic(&self, text: &str) -> Result<(i32, bool), Error> {
        let ops = operators(text);
        let [(pos, op)] = ops.as_slice() else {
            return Err(Error::ExpressionSyntax(
                text.to_string(),
                "[operand operator operand]",
            ));
        };
        let (left, right) = (&text[..*pos], &text[pos + 1..]);
        let (lhs, lhs_reloc) = self.term(left)?;
        let (rhs, rhs_reloc) = self.term(right)?;
        let value = match op {
            '+' => lhs.checked_add(rhs),
            _ => lhs.checked_sub(rhs),
        }
        .ok_or_else(|| Error::InvalidNumber(text.to_string()))?;
        Ok((value, lhs_reloc || rhs_reloc))
    }

    /// Symbol-or-integer: purely numeric text is a number, anything else
    /// must name a declared symbol.
    fn term(&self, raw: &str) -> Result<(i32, bool), Error> {
        let text = raw.trim().trim_start_matches([IMMEDIATE_TOKEN, INDIRECT_TOKEN]);
        if text.is_empty() {
            return Err(Error::ExpressionSyntax(
                raw.to_string(),
                "a symbol or an integer",
            ));
        }
        if is_integer(text) {
            let value = text
                .parse::<i32>()
                .map_err(|_| Error::InvalidNumber(text.to_string()))?;
            return Ok((value, false));
        }
        self.symbol(text)
    }

    fn symbol(&self, text: &str) -> Result<(i32, bool), Error> {
        let text = text.trim();
        match self.symbols.lookup(text) {
            Some(sym) => Ok((sym.value, sym.relocatable)),
            None => Err(Error::UndefinedSymbol(text.to_string())),
        }
    }
}

fn register_code(part: &str) -> Result<u8, Error> {
    let part = part.trim();
    if let Ok(reg) = Reg::parse(part) {
        return Ok(reg.code());
    }
    match part.parse::<u8>() {
        Ok(n) if n <= 15 => Ok(n),
        _ => Err(Error::InvalidRegister(part.to_string())),
    }
}
