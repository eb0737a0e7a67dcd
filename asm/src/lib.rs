pub mod dump;
pub mod error;
pub mod literal;
pub mod map;
pub mod msg;
pub mod operand;
pub mod pass1;
pub mod symbol;

pub use error::{Error, Fault};
pub use literal::{Literal, LiteralKind, LiteralTable};
pub use operand::{AddressMode, Operand, OperandKind, Resolver};
pub use pass1::{Line, LineResolver, Pass1, Policy, ResolvedLine};
pub use symbol::{Declared, Symbol, SymbolTable};
