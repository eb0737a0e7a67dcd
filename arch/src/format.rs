use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Encoded length class of an instruction.
/// Assembler directives carry `None` and weigh nothing on their own.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
)]
#[repr(u8)]
pub enum Format {
    #[default]
    #[strum(serialize = "-")]
    None = 0,
    #[strum(serialize = "1")]
    One = 1,
    #[strum(serialize = "2")]
    Two = 2,
    #[strum(serialize = "3")]
    Three = 3,
    #[strum(serialize = "4")]
    Four = 4,
}

impl Format {
    /// Parse the format column of an opcode table.
    /// `3/4` is how SIC/XE tables spell instructions that may be extended.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "3/4" => Some(Format::Three),
            digit => match digit.parse::<u8>().ok().map(Format::try_from) {
                Some(Ok(Format::None)) | Some(Err(_)) | None => None,
                Some(Ok(format)) => Some(format),
            },
        }
    }

    pub fn byte_weight(self) -> i32 {
        u8::from(self) as i32
    }

    pub fn is_none(self) -> bool {
        self == Format::None
    }
}

#[test]
fn test() {
    assert_eq!(Format::parse("1"), Some(Format::One));
    assert_eq!(Format::parse(" 2 "), Some(Format::Two));
    assert_eq!(Format::parse("3/4"), Some(Format::Three));
    assert_eq!(Format::parse("4"), Some(Format::Four));
    assert_eq!(Format::parse("0"), None);
    assert_eq!(Format::parse("5"), None);
    assert_eq!(Format::parse("three"), None);
    assert_eq!(Format::Four.byte_weight(), 4);
    assert_eq!(Format::None.byte_weight(), 0);
}
