use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// SIC/XE register file, numbered as format 2 instructions encode them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
)]
#[repr(u8)]
pub enum Reg {
    A = 0,
    X = 1,
    L = 2,
    B = 3,
    S = 4,
    T = 5,
    F = 6,
    PC = 8,
    SW = 9,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(r) => Ok(r),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    pub fn code(self) -> u8 {
        self.into()
    }
}

#[test]
fn test() {
    assert_eq!(Reg::parse("x"), Ok(Reg::X));
    assert_eq!(Reg::parse("SW"), Ok(Reg::SW));
    assert_eq!(Reg::PC.code(), 8);
    assert_eq!(Reg::try_from(5).ok(), Some(Reg::T));
    assert!(Reg::try_from(7).is_err());
    assert!(Reg::parse("hoge").is_err());
}
