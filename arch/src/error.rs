use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Opcode table line {line}: {reason} (expected `MNEMONIC HEXOPCODE FORMAT`, got `{text}`)")]
    InvalidOpcodeEntry {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("Mnemonic `{0}` is already registered")]
    DuplicateMnemonic(String),

    #[error("Opcode 0x{opcode:02X} of `{mnemonic}` is already used by `{owner}`")]
    DuplicateOpcode {
        mnemonic: String,
        opcode: u8,
        owner: String,
    },
}
