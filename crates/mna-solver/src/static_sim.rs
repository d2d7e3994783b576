use mna_core::{Circuit, Terminal};

use crate::config::SolverConfig;
use crate::newton;
use crate::prelude::*;

/// Drives a single Newton-Raphson solve using each component's static (DC
/// operating point) stamp. AC and sweep voltage sources reject the static
/// stamp with `StaticModeRejected`.
pub struct StaticSim<'a, T: Terminal> {
    circuit: &'a mut Circuit<T>,
    config: SolverConfig,
}

impl<'a, T: Terminal> StaticSim<'a, T> {
    pub fn new(circuit: &'a mut Circuit<T>, config: SolverConfig) -> Self {
        StaticSim { circuit, config }
    }

    pub fn simulate(&mut self) -> Result<()> {
        newton::run(self.circuit, &self.config, |c| c.stamp_static())
    }
}
