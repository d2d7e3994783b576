mod newton;

pub mod config;
pub mod prelude;
pub mod static_sim;
pub mod transient;
pub mod worker;

pub use config::SolverConfig;
pub use prelude::{Error, Result};
pub use static_sim::StaticSim;
pub use transient::TransientSim;
pub use worker::{Command, Snapshot, TransientWorker};
