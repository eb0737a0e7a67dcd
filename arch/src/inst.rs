use crate::{directive::Directive, format::Format};

use serde::{Deserialize, Serialize};

/// One catalog entry: a machine instruction or an assembler directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inst {
    pub mnemonic: String,
    pub opcode: Option<u8>,
    pub format: Format,
    pub directive: Option<Directive>,
}

impl Inst {
    pub fn machine(mnemonic: &str, opcode: u8, format: Format) -> Self {
        Inst {
            mnemonic: mnemonic.to_ascii_uppercase(),
            opcode: Some(opcode),
            format,
            directive: None,
        }
    }

    pub fn directive(directive: Directive) -> Self {
        Inst {
            mnemonic: directive.to_string(),
            opcode: None,
            format: Format::None,
            directive: Some(directive),
        }
    }

    pub fn is_directive(&self) -> bool {
        self.directive.is_some()
    }

    pub fn is_extended(&self) -> bool {
        self.format == Format::Four
    }

    /// Bytes this entry occupies in object code on its own.
    pub fn byte_weight(&self) -> i32 {
        self.format.byte_weight()
    }

    /// Mnemonic as written in a listing, with the `+` prefix for format 4.
    pub fn display_mnemonic(&self) -> String {
        if self.is_extended() {
            format!("+{}", self.mnemonic)
        } else {
            self.mnemonic.clone()
        }
    }
}

#[test]
fn test() {
    let lda = Inst::machine("lda", 0x00, Format::Three);
    assert_eq!(lda.mnemonic, "LDA");
    assert_eq!(lda.byte_weight(), 3);
    assert!(!lda.is_directive());

    let resw = Inst::directive(Directive::RESW);
    assert_eq!(resw.mnemonic, "RESW");
    assert_eq!(resw.opcode, None);
    assert_eq!(resw.byte_weight(), 0);
    assert!(resw.is_directive());
}
