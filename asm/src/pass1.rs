use arch::{directive::Directive, format::Format, inst::Inst, Catalog};

use crate::{
    error::{Error, Fault},
    literal::LiteralTable,
    operand::{Operand, Resolver},
    symbol::{Declared, Symbol, SymbolTable},
};

pub const MAX_ADDRESS: i32 = 0xFF_FFFF;
const WORD_SIZE: i32 = 3;
const COMMENT_MARKER: char = '.';

/// What to do when a line cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Stop the pass at the first faulty line.
    #[default]
    Abort,
    /// Record the fault and go on, as long as the program counter advance
    /// of the faulty line does not depend on its operand.
    Recover,
}

// ----------------------------------------------------------------------------
// Line

#[derive(Debug, Clone)]
pub struct ResolvedLine {
    /// 1-based source line number
    pub line: usize,
    pub text: String,
    pub address: i32,
    pub length: i32,
    pub inst: Inst,
    pub label: Option<Symbol>,
    /// The label was already declared by an earlier line.
    pub redeclared: bool,
    pub operand: Option<Operand>,
    /// Operand text naming a symbol that was not declared yet. Resolved
    /// again once every line has been read.
    pub deferred: Option<String>,
}

#[derive(Debug)]
pub enum Line {
    /// Blank or comment line.
    Skip,
    Resolved(ResolvedLine),
    /// Faulty line that the pass stepped over.
    Fault(Fault),
}

struct Columns {
    label: Option<String>,
    inst: Inst,
    operand: Option<String>,
}

/// Split on whitespace runs, keeping quoted text such as `C'A B'` in one
/// column.
pub fn split_columns(code: &str) -> Vec<String> {
    let mut words = vec![];
    let mut word = String::new();
    let mut quoted = false;
    for c in code.chars() {
        if c == '\'' {
            quoted = !quoted;
        }
        if c.is_whitespace() && !quoted {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        words.push(word);
    }
    words
}

// ----------------------------------------------------------------------------
// Pass 1

/// Result of pass 1. When the pass halted, the tables hold everything
/// applied before the faulty line.
#[derive(Debug)]
pub struct Pass1 {
    pub symbols: SymbolTable,
    pub literals: LiteralTable,
    pub lines: Vec<Line>,
    pub start: i32,
    pub pc: i32,
    /// Deferred operands whose symbol is never declared.
    pub undefined: Vec<Fault>,
    pub halted: Option<Fault>,
}

impl Pass1 {
    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }

    pub fn program_length(&self) -> i32 {
        self.pc - self.start
    }

    pub fn resolved(&self) -> impl Iterator<Item = &ResolvedLine> {
        self.lines.iter().filter_map(|line| match line {
            Line::Resolved(resolved) => Some(resolved),
            _ => None,
        })
    }

    /// Recovered faults in line order, then undefined symbols, then the
    /// halting fault.
    pub fn faults(&self) -> impl Iterator<Item = &Fault> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Line::Fault(fault) => Some(fault),
                _ => None,
            })
            .chain(self.undefined.iter())
            .chain(self.halted.iter())
    }

    pub fn redeclarations(&self) -> impl Iterator<Item = &ResolvedLine> {
        self.resolved().filter(|line| line.redeclared)
    }
}

/// Walks source lines in order, assigning addresses and filling the
/// symbol and literal tables.
pub struct LineResolver<'a> {
    catalog: &'a Catalog,
    symbols: SymbolTable,
    literals: LiteralTable,
    policy: Policy,
    pc: i32,
    start: Option<i32>,
    lines: Vec<Line>,
}

impl<'a> LineResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        LineResolver {
            catalog,
            symbols: SymbolTable::new(),
            literals: LiteralTable::new(),
            policy: Policy::default(),
            pc: 0,
            start: None,
            lines: vec![],
        }
    }

    /// Start from a pre-populated symbol table.
    pub fn with_symbols(mut self, symbols: SymbolTable) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn pc(&self) -> i32 {
        self.pc
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn run<I, S>(mut self, lines: I) -> Pass1
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (idx, text) in lines.into_iter().enumerate() {
            let outcome = self.step(idx + 1, text.as_ref()).map(|_| ());
            if let Err(fault) = outcome {
                return self.finish(Some(fault));
            }
        }
        self.finish(None)
    }

    /// Resolve one line and record its outcome. An `Err` means the pass
    /// cannot go on.
    pub fn step(&mut self, line: usize, text: &str) -> Result<&Line, Fault> {
        let columns = match self.columns(line, text) {
            Ok(Some(columns)) => columns,
            Ok(None) => return Ok(self.push(Line::Skip)),
            Err(error) => return Err(Fault::new(line, text, error)),
        };
        match self.apply(line, text, &columns) {
            Ok(resolved) => Ok(self.push(Line::Resolved(resolved))),
            Err(error) => match (self.policy, fixed_advance(&columns.inst)) {
                (Policy::Recover, Some(advance)) if self.pc + advance <= MAX_ADDRESS => {
                    self.pc += advance;
                    Ok(self.push(Line::Fault(Fault::new(line, text, error))))
                }
                _ => Err(Fault::new(line, text, error)),
            },
        }
    }

    pub fn finish(mut self, halted: Option<Fault>) -> Pass1 {
        let undefined = self.resolve_deferred();
        Pass1 {
            symbols: self.symbols,
            literals: self.literals,
            lines: self.lines,
            start: self.start.unwrap_or(0),
            pc: self.pc,
            undefined,
            halted,
        }
    }

    /// Resolve operands that named a symbol declared further down.
    fn resolve_deferred(&mut self) -> Vec<Fault> {
        let mut faults = vec![];
        for line in self.lines.iter_mut() {
            let Line::Resolved(resolved) = line else {
                continue;
            };
            let Some(expression) = resolved.deferred.take() else {
                continue;
            };
            match Resolver::new(&self.symbols, &mut self.literals).resolve(&expression) {
                Ok(operand) => resolved.operand = Some(operand),
                Err(error) => {
                    faults.push(Fault::new(resolved.line, &resolved.text, error));
                    resolved.deferred = Some(expression);
                }
            }
        }
        faults
    }

    fn push(&mut self, line: Line) -> &Line {
        self.lines.push(line);
        &self.lines[self.lines.len() - 1]
    }

    /// Split a line into label, instruction and operand columns.
    /// `None` for blank and comment lines.
    fn columns(&self, line: usize, text: &str) -> Result<Option<Columns>, Error> {
        let code = text.trim_start();
        if code.is_empty() || code.starts_with(COMMENT_MARKER) {
            return Ok(None);
        }
        let words = split_columns(code);

        if let Some(inst) = self.catalog.lookup(&words[0]) {
            return Ok(Some(Columns {
                label: None,
                inst,
                operand: words.get(1).cloned(),
            }));
        }
        match words.get(1).and_then(|word| self.catalog.lookup(word)) {
            Some(inst) => Ok(Some(Columns {
                label: Some(words[0].clone()),
                inst,
                operand: words.get(2).cloned(),
            })),
            None => Err(Error::UnknownInstruction {
                line,
                first: words[0].clone(),
                second: words.get(1).cloned(),
            }),
        }
    }

    /// Apply one line to the tables. A failing line leaves them as they were.
    fn apply(&mut self, line: usize, text: &str, columns: &Columns) -> Result<ResolvedLine, Error> {
        let before = columns
            .label
            .as_ref()
            .map(|label| self.symbols.lookup(label).cloned());
        let pooled = self.literals.len();

        let result = self.resolve_line(line, text, columns);
        if result.is_err() {
            if let (Some(label), Some(before)) = (&columns.label, before) {
                self.symbols.restore(label, before);
            }
            self.literals.truncate(pooled);
        }
        result
    }

    fn resolve_line(
        &mut self,
        line: usize,
        text: &str,
        columns: &Columns,
    ) -> Result<ResolvedLine, Error> {
        let address = self.pc;
        let declared = match &columns.label {
            Some(label) => Some(self.symbols.declare(label, address, true)?),
            None => None,
        };
        // Sizes that do not depend on the operand let it wait for later lines.
        let (operand, deferred) = match &columns.operand {
            Some(expression) => match self.operand(&columns.inst, expression) {
                Ok(operand) => (Some(operand), None),
                Err(Error::UndefinedSymbol(_)) if fixed_advance(&columns.inst).is_some() => {
                    (None, Some(expression.clone()))
                }
                Err(error) => return Err(error),
            },
            None => (None, None),
        };
        let next = self.advance(&columns.inst, operand.as_ref(), declared.as_ref())?;

        if columns.inst.directive == Some(Directive::START) && self.start.is_none() {
            self.start = Some(next);
        }
        let length = match columns.inst.directive {
            Some(Directive::START) => 0,
            _ => next - address,
        };
        let label = declared
            .as_ref()
            .and_then(|declared| self.symbols.lookup(&declared.symbol().label).cloned());
        self.pc = next;

        Ok(ResolvedLine {
            line,
            text: text.to_string(),
            address,
            length,
            inst: columns.inst.clone(),
            label,
            redeclared: declared.map_or(false, |declared| declared.is_existing()),
            operand,
            deferred,
        })
    }

    fn operand(&mut self, inst: &Inst, expression: &str) -> Result<Operand, Error> {
        let mut resolver = Resolver::new(&self.symbols, &mut self.literals);
        match (inst.directive, inst.format) {
            (Some(Directive::EXTDEF | Directive::EXTREF), _) => resolver.resolve_names(expression),
            (None, Format::Two) => resolver.resolve_registers(expression),
            _ => resolver.resolve(expression),
        }
    }

    /// Program counter after `inst`.
    fn advance(
        &mut self,
        inst: &Inst,
        operand: Option<&Operand>,
        declared: Option<&Declared>,
    ) -> Result<i32, Error> {
        let pc = self.pc as i64;
        let require = || operand.ok_or_else(|| Error::MissingOperand(inst.mnemonic.clone()));

        let next = match inst.directive {
            Some(Directive::START) => require()?.value as i64,
            Some(Directive::EQU) => {
                let operand = require()?;
                if let Some(Declared::Inserted(symbol)) = declared {
                    self.symbols
                        .assign(&symbol.label, operand.value, operand.relocatable);
                }
                pc
            }
            Some(Directive::BYTE) => pc + require()?.byte_size() as i64,
            Some(Directive::RESB) => pc + reservation(inst, require()?)?,
            Some(Directive::RESW) => pc + reservation(inst, require()?)? * WORD_SIZE as i64,
            _ => pc + fixed_advance(inst).unwrap_or(0) as i64,
        };

        if !(0..=MAX_ADDRESS as i64).contains(&next) {
            return Err(Error::AddressOverflow(next));
        }
        Ok(next as i32)
    }
}

/// Advance of instructions whose size is known without their operand.
fn fixed_advance(inst: &Inst) -> Option<i32> {
    match inst.directive {
        Some(directive) if directive.needs_operand() => None,
        Some(Directive::WORD) => Some(WORD_SIZE.max(inst.byte_weight())),
        _ => Some(inst.byte_weight()),
    }
}

fn reservation(inst: &Inst, operand: &Operand) -> Result<i64, Error> {
    if operand.value < 0 {
        return Err(Error::InvalidReservation {
            mnemonic: inst.mnemonic.clone(),
            count: operand.value,
        });
    }
    Ok(operand.value as i64)
}
