use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{error::Error, pass1::Pass1};

/// Address map of every assembled source, keyed by path.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SymbolMap {
    pub programs: IndexMap<String, ProgramEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub start: i32,
    pub length: i32,
    pub symbols: IndexMap<String, SymbolEntry>,
    pub literals: Vec<LiteralEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub value: i32,
    pub relocatable: bool,
    pub multiply_defined: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LiteralEntry {
    pub expression: String,
    pub hex: String,
    pub length: usize,
    pub address: i32,
}

impl ProgramEntry {
    pub fn generate(pass1: &Pass1) -> Self {
        let symbols = pass1
            .symbols
            .iter()
            .map(|sym| {
                (
                    sym.label.clone(),
                    SymbolEntry {
                        value: sym.value,
                        relocatable: sym.relocatable,
                        multiply_defined: sym.multiply_defined,
                    },
                )
            })
            .collect();
        let literals = pass1
            .literals
            .iter()
            .map(|literal| LiteralEntry {
                expression: literal.expression.clone(),
                hex: literal.hex(),
                length: literal.bytes.len(),
                address: literal.address.unwrap_or_default(),
            })
            .collect();
        ProgramEntry {
            start: pass1.start,
            length: pass1.program_length(),
            symbols,
            literals,
        }
    }
}

impl SymbolMap {
    pub fn new() -> Self {
        SymbolMap::default()
    }

    pub fn add(&mut self, path: &str, pass1: &Pass1) {
        self.programs
            .insert(path.to_string(), ProgramEntry::generate(pass1));
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn write(&self, path: &str) -> Result<(), Error> {
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml).map_err(|e| Error::FileCreate(path.to_string(), e))
    }
}
