use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Directive {
    START,
    END,
    BYTE,
    WORD,
    RESB,
    RESW,
    BASE,
    EQU,
    EXTDEF,
    EXTREF,
}

impl Directive {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(d) => Ok(d),
            Err(_) => Err(format!("Unknown directive: {s}")),
        }
    }

    /// Directives whose program counter advance is read from the operand.
    pub fn needs_operand(&self) -> bool {
        use Directive::*;
        matches!(self, START | BYTE | RESB | RESW | EQU)
    }
}

#[test]
fn test() {
    use strum::IntoEnumIterator;
    assert_eq!(Directive::iter().count(), 10);
    assert_eq!(Directive::parse("resw"), Ok(Directive::RESW));
    assert_eq!(Directive::parse("Equ"), Ok(Directive::EQU));
    assert!(Directive::parse("hoge").is_err());
    assert_eq!(Directive::EXTREF.to_string(), "EXTREF");
}
