pub mod circuit;
pub mod elements;
pub mod environment;
pub mod error;
pub mod prelude;
pub mod system;
pub mod terminal;

pub use circuit::Circuit;
pub use elements::{Element, ResolvedElement};
pub use environment::Environment;
pub use terminal::Terminal;
