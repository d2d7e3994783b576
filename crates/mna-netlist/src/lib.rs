pub mod error;
pub mod loader;
pub mod prelude;
pub mod union_find;
pub mod value;

pub use loader::{load_netlist, load_netlist_file, NodeId};
pub use prelude::{Error, Result};
