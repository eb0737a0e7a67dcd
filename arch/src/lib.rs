pub mod catalog;
pub mod directive;
pub mod error;
pub mod format;
pub mod inst;
pub mod reg;

pub use catalog::Catalog;
pub use error::Error;
