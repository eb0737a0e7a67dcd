use bimap::BiMap;
use std::collections::HashMap;
use strum::IntoEnumIterator;

use crate::{directive::Directive, error::Error, format::Format, inst::Inst};

// Standard SIC/XE instruction set: (mnemonic, opcode, format)
const SICXE: [(&str, u8, Format); 59] = [
    ("ADD", 0x18, Format::Three),
    ("ADDF", 0x58, Format::Three),
    ("ADDR", 0x90, Format::Two),
    ("AND", 0x40, Format::Three),
    ("CLEAR", 0xB4, Format::Two),
    ("COMP", 0x28, Format::Three),
    ("COMPF", 0x88, Format::Three),
    ("COMPR", 0xA0, Format::Two),
    ("DIV", 0x24, Format::Three),
    ("DIVF", 0x64, Format::Three),
    ("DIVR", 0x9C, Format::Two),
    ("FIX", 0xC4, Format::One),
    ("FLOAT", 0xC0, Format::One),
    ("HIO", 0xF4, Format::One),
    ("J", 0x3C, Format::Three),
    ("JEQ", 0x30, Format::Three),
    ("JGT", 0x34, Format::Three),
    ("JLT", 0x38, Format::Three),
    ("JSUB", 0x48, Format::Three),
    ("LDA", 0x00, Format::Three),
    ("LDB", 0x68, Format::Three),
    ("LDCH", 0x50, Format::Three),
    ("LDF", 0x70, Format::Three),
    ("LDL", 0x08, Format::Three),
    ("LDS", 0x6C, Format::Three),
    ("LDT", 0x74, Format::Three),
    ("LDX", 0x04, Format::Three),
    ("LPS", 0xD0, Format::Three),
    ("MUL", 0x20, Format::Three),
    ("MULF", 0x60, Format::Three),
    ("MULR", 0x98, Format::Two),
    ("NORM", 0xC8, Format::One),
    ("OR", 0x44, Format::Three),
    ("RD", 0xD8, Format::Three),
    ("RMO", 0xAC, Format::Two),
    ("RSUB", 0x4C, Format::Three),
    ("SHIFTL", 0xA4, Format::Two),
    ("SHIFTR", 0xA8, Format::Two),
    ("SIO", 0xF0, Format::One),
    ("SSK", 0xEC, Format::Three),
    ("STA", 0x0C, Format::Three),
    ("STB", 0x78, Format::Three),
    ("STCH", 0x54, Format::Three),
    ("STF", 0x80, Format::Three),
    ("STI", 0xD4, Format::Three),
    ("STL", 0x14, Format::Three),
    ("STS", 0x7C, Format::Three),
    ("STSW", 0xE8, Format::Three),
    ("STT", 0x84, Format::Three),
    ("STX", 0x10, Format::Three),
    ("SUB", 0x1C, Format::Three),
    ("SUBF", 0x5C, Format::Three),
    ("SUBR", 0x94, Format::Two),
    ("SVC", 0xB0, Format::Two),
    ("TD", 0xE0, Format::Three),
    ("TIO", 0xF8, Format::One),
    ("TIX", 0x2C, Format::Three),
    ("TIXR", 0xB8, Format::Two),
    ("WD", 0xDC, Format::Three),
];

/// Mnemonic registry for one assembly run.
///
/// Keys are upper case. The ten assembler directives are always present;
/// machine instructions come from an opcode table.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: HashMap<String, Inst>,
    opcodes: BiMap<String, u8>,
}

impl Catalog {
    pub fn new() -> Self {
        let entries = Directive::iter()
            .map(|d| (d.to_string(), Inst::directive(d)))
            .collect();
        Catalog {
            entries,
            opcodes: BiMap::new(),
        }
    }

    /// Catalog preloaded with the standard SIC/XE instruction set.
    pub fn sicxe() -> Self {
        let mut catalog = Catalog::new();
        for (mnemonic, opcode, format) in SICXE {
            catalog.entries.insert(
                mnemonic.to_string(),
                Inst::machine(mnemonic, opcode, format),
            );
            catalog.opcodes.insert(mnemonic.to_string(), opcode);
        }
        catalog
    }

    /// Parse an opcode table and register every entry.
    ///
    /// One `MNEMONIC HEXOPCODE FORMAT` triple per line; blank lines are
    /// ignored. Stops at the first bad line.
    pub fn load(text: &str) -> Result<Self, Error> {
        let mut catalog = Catalog::new();
        for (idx, raw) in text.lines().enumerate() {
            let words: Vec<&str> = raw.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }
            let invalid = |reason: &str| Error::InvalidOpcodeEntry {
                line: idx + 1,
                text: raw.trim().to_string(),
                reason: reason.to_string(),
            };
            let [mnemonic, opcode, format] = words.as_slice() else {
                return Err(invalid("Invalid number of columns"));
            };
            let opcode =
                u8::from_str_radix(opcode, 16).map_err(|_| invalid("Opcode is not a hex byte"))?;
            let format = Format::parse(format).ok_or_else(|| invalid("Format must be 1-4"))?;
            catalog.register(mnemonic, opcode, format)?;
        }
        Ok(catalog)
    }

    pub fn register(&mut self, mnemonic: &str, opcode: u8, format: Format) -> Result<(), Error> {
        let key = mnemonic.to_ascii_uppercase();
        if self.entries.contains_key(&key) {
            return Err(Error::DuplicateMnemonic(key));
        }
        if let Some(owner) = self.opcodes.get_by_right(&opcode) {
            return Err(Error::DuplicateOpcode {
                mnemonic: key,
                opcode,
                owner: owner.clone(),
            });
        }
        self.opcodes.insert(key.clone(), opcode);
        self.entries
            .insert(key.clone(), Inst::machine(&key, opcode, format));
        Ok(())
    }

    /// Case-insensitive lookup. A leading `+` requests format 4; directives
    /// accept the prefix but keep their format.
    /// The returned entry is a copy.
    pub fn lookup(&self, mnemonic: &str) -> Option<Inst> {
        let (extended, base) = match mnemonic.trim().strip_prefix('+') {
            Some(base) => (true, base),
            None => (false, mnemonic.trim()),
        };
        if base.is_empty() {
            return None;
        }
        let mut inst = self.entries.get(&base.to_ascii_uppercase())?.clone();
        if extended && !inst.format.is_none() {
            inst.format = Format::Four;
        }
        Some(inst)
    }

    pub fn contains(&self, mnemonic: &str) -> bool {
        self.lookup(mnemonic).is_some()
    }

    pub fn mnemonic_of(&self, opcode: u8) -> Option<&str> {
        self.opcodes.get_by_right(&opcode).map(|s| s.as_str())
    }

    /// Number of machine instructions (directives excluded).
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_are_builtin() {
        let catalog = Catalog::new();
        for name in ["start", "END", "Byte", "WORD", "resb", "RESW", "BASE", "EQU", "EXTDEF", "extref"] {
            let inst = catalog.lookup(name).unwrap();
            assert!(inst.is_directive(), "{name}");
            assert_eq!(inst.format, Format::None);
        }
        assert!(catalog.is_empty());
        assert_eq!(catalog.lookup("LDA"), None);
    }

    #[test]
    fn extended_prefix() {
        let catalog = Catalog::sicxe();
        assert_eq!(catalog.lookup("jsub").unwrap().format, Format::Three);
        let jsub = catalog.lookup("+JSUB").unwrap();
        assert_eq!(jsub.format, Format::Four);
        assert_eq!(jsub.opcode, Some(0x48));
        assert_eq!(jsub.display_mnemonic(), "+JSUB");

        // format 1 and 2 entries are promoted too
        assert_eq!(catalog.lookup("+FIX").unwrap().format, Format::Four);

        let resb = catalog.lookup("+RESB").unwrap();
        assert_eq!(resb.format, Format::None);
        assert_eq!(resb.directive, Some(Directive::RESB));

        assert_eq!(catalog.lookup("+"), None);
        assert_eq!(catalog.lookup(""), None);
    }

    #[test]
    fn lookup_returns_copy() {
        let catalog = Catalog::sicxe();
        let mut lda = catalog.lookup("LDA").unwrap();
        lda.format = Format::One;
        lda.opcode = Some(0xFF);
        assert_eq!(catalog.lookup("LDA").unwrap().format, Format::Three);
        assert_eq!(catalog.lookup("LDA").unwrap().opcode, Some(0x00));
    }

    #[test]
    fn standard_table() {
        let catalog = Catalog::sicxe();
        assert_eq!(catalog.len(), 59);
        assert_eq!(catalog.mnemonic_of(0x4C), Some("RSUB"));
        assert_eq!(catalog.lookup("clear").unwrap().format, Format::Two);
    }

    #[test]
    fn load_table() {
        let text = "lda 00 3\n\n  STL   14  3/4\nCLEAR B4 2\nFIX C4 1\n";
        let catalog = Catalog::load(text).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.lookup("LDA").unwrap().opcode, Some(0x00));
        assert_eq!(catalog.lookup("stl").unwrap().format, Format::Three);
        assert_eq!(catalog.lookup("FIX").unwrap().format, Format::One);
    }

    #[test]
    fn load_errors() {
        match Catalog::load("LDA 00 3\nSTL 14") {
            Err(Error::InvalidOpcodeEntry { line, .. }) => assert_eq!(line, 2),
            other => panic!("{:?}", other),
        }
        assert!(matches!(
            Catalog::load("LDA ZZ 3"),
            Err(Error::InvalidOpcodeEntry { .. })
        ));
        assert!(matches!(
            Catalog::load("LDA 00 5"),
            Err(Error::InvalidOpcodeEntry { .. })
        ));
        assert_eq!(
            Catalog::load("LDA 00 3\nlda 04 3").unwrap_err(),
            Error::DuplicateMnemonic("LDA".to_string())
        );
        assert_eq!(
            Catalog::load("RESW 00 3").unwrap_err(),
            Error::DuplicateMnemonic("RESW".to_string())
        );
        assert!(matches!(
            Catalog::load("LDA 00 3\nLDX 00 3"),
            Err(Error::DuplicateOpcode { opcode: 0x00, .. })
        ));
    }
}
