use faer::Mat;
use faer::prelude::Solve;
use log::{debug, info};

use mna_core::{Circuit, Terminal};

use crate::config::SolverConfig;
use crate::prelude::*;

/// Runs the Newton-Raphson loop to convergence: `stamp` is invoked once per
/// iteration to (re)populate the circuit's working arrays from the current
/// iterate, after which `(J + εI)·Δx = -F` is solved with a dense,
/// partial-pivoting LU and applied to `x`. Partial pivoting never fails
/// outright on a singular matrix; it leaves a structurally zero pivot in
/// `U` instead, which surfaces as a non-finite entry in `Δx` once the
/// back-substitution divides by it. That's the signal this loop checks for.
pub(crate) fn run<T: Terminal>(
    circuit: &mut Circuit<T>,
    config: &SolverConfig,
    mut stamp: impl FnMut(&mut Circuit<T>) -> Result<()>,
) -> Result<()> {
    let n = circuit.unknown_count()?;
    if n == 0 {
        return Ok(());
    }

    for iteration in 0..config.convergence_limit {
        stamp(circuit)?;

        let system = circuit.system()?;
        let mut a = Mat::<f64>::zeros(n, n);
        for row in 0..n {
            for col in 0..n {
                a[(row, col)] = system.jacobian_at(row, col);
            }
            a[(row, row)] += config.regularisation;
        }

        let mut b = Mat::<f64>::zeros(n, 1);
        for (row, entry) in system.f.iter().enumerate() {
            b[(row, 0)] = -entry;
        }

        let lu = a.partial_piv_lu();
        let delta = lu.solve(&b);

        if (0..n).any(|row| !delta[(row, 0)].is_finite()) {
            return Err(Error::SingularSystem);
        }

        let system = circuit.system_mut()?;
        let mut max_update = 0.0_f64;
        for row in 0..n {
            let d = delta[(row, 0)];
            system.x[row] += d;
            max_update = max_update.max(d.abs());
        }

        debug!("Newton iteration {iteration}: max|dx| = {max_update:e}");

        if max_update < config.newton_tolerance {
            info!("converged after {} iteration(s)", iteration + 1);
            return Ok(());
        }
    }

    Err(Error::NonConvergence(config.convergence_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mna_core::elements::{Element, Resistor, VoltageSource};
    use mna_core::{Environment, elements::Waveform};

    fn divider_circuit() -> Circuit<&'static str> {
        let mut circuit = Circuit::new(Environment::default());
        circuit
            .add(Element::VoltageSource(VoltageSource::new(
                "1",
                "in",
                "0",
                Waveform::Dc(10.0),
            )))
            .unwrap();
        circuit
            .add(Element::Resistor(
                Resistor::new("1", "in", "mid", 500.0).unwrap(),
            ))
            .unwrap();
        circuit
            .add(Element::Resistor(
                Resistor::new("2", "mid", "0", 500.0).unwrap(),
            ))
            .unwrap();
        circuit.finalise("0").unwrap();
        circuit
    }

    #[test]
    fn a_linear_resistor_divider_converges_in_one_iteration() {
        let mut circuit = divider_circuit();
        let config = SolverConfig::default();
        run(&mut circuit, &config, |c| c.stamp_static()).unwrap();
        assert!((circuit.voltage(&"mid").unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn exhausting_the_iteration_budget_reports_non_convergence() {
        let mut circuit = divider_circuit();
        let config = SolverConfig {
            convergence_limit: 0,
            ..SolverConfig::default()
        };
        assert!(matches!(
            run(&mut circuit, &config, |c| c.stamp_static()),
            Err(Error::NonConvergence(0))
        ));
    }

    #[test]
    fn a_node_pinned_by_two_conflicting_sources_is_singular_without_regularisation() {
        // V1 and V2 both span the same node pair with different values: the
        // two branch-current rows are identical up to the RHS, so the
        // Jacobian is rank-deficient regardless of either source's value.
        // The MNA equivalent of a voltage source shorted by a
        // zero-resistance wire.
        let mut circuit = Circuit::new(Environment::default());
        circuit
            .add(Element::VoltageSource(VoltageSource::new(
                "1",
                "a",
                "0",
                Waveform::Dc(5.0),
            )))
            .unwrap();
        circuit
            .add(Element::VoltageSource(VoltageSource::new(
                "2",
                "a",
                "0",
                Waveform::Dc(3.0),
            )))
            .unwrap();
        circuit.finalise("0").unwrap();

        let config = SolverConfig {
            regularisation: 0.0,
            ..SolverConfig::default()
        };
        assert!(matches!(
            run(&mut circuit, &config, |c| c.stamp_static()),
            Err(Error::SingularSystem)
        ));
    }
}
