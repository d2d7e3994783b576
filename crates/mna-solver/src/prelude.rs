pub use mna_core::error::Error;

pub type Result<T> = std::result::Result<T, Error>;
