use thiserror::Error;

use crate::msg::Msg;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid label `{label}`: {reason} (expected {expected})")]
    InvalidLabel {
        label: String,
        reason: String,
        expected: String,
    },

    #[error("Invalid symbol {field} `{actual}`: {reason} (expected {expected})")]
    InvalidSymbolEntry {
        field: &'static str,
        actual: String,
        reason: String,
        expected: String,
    },

    #[error("Invalid literal `{0}`: expected {1}")]
    InvalidLiteral(String, &'static str),

    #[error("Undefined symbol: `{0}`")]
    UndefinedSymbol(String),

    #[error("Invalid expression `{0}`: expected {1}")]
    ExpressionSyntax(String, &'static str),

    #[error("Cannot parse `{0}` as a 24-bit number")]
    InvalidNumber(String),

    #[error("Invalid register `{0}`: expected one of A X L B S T F PC SW, or 0-15")]
    InvalidRegister(String),

    #[error("Unknown instruction on line {line}: neither `{first}` nor `{}` is a mnemonic", .second.as_deref().unwrap_or(""))]
    UnknownInstruction {
        line: usize,
        first: String,
        second: Option<String>,
    },

    #[error("More argument required: `{0}` needs an operand")]
    MissingOperand(String),

    #[error("Invalid reservation: `{mnemonic}` cannot reserve {count} units")]
    InvalidReservation { mnemonic: String, count: i32 },

    #[error("Address 0x{0:X} is outside the 24-bit address space")]
    AddressOverflow(i64),

    #[error(transparent)]
    Catalog(#[from] arch::Error),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to serialize map: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// A line-level failure, tied to the source line that produced it.
#[derive(Error, Debug)]
#[error("line {line}: {error}")]
pub struct Fault {
    pub line: usize,
    pub text: String,
    #[source]
    pub error: Error,
}

impl Fault {
    pub fn new(line: usize, text: &str, error: Error) -> Self {
        Fault {
            line,
            text: text.to_string(),
            error,
        }
    }

    /// Print the fault with the file location and the offending line.
    pub fn print_diag(&self, file: &str) {
        Msg::Error(self.error.to_string()).diag(file, self.line, &self.text);
    }
}
