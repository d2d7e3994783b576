/// Tunables for the Newton-Raphson core and the transient driver built on
/// top of it.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Maximum Newton iterations per solve before giving up with
    /// `NonConvergence`.
    pub convergence_limit: usize,

    /// Stopping threshold on the infinity norm of the Newton update `Δx`.
    pub newton_tolerance: f64,

    /// Tikhonov regularisation added to the Jacobian diagonal before each
    /// factorisation, so a momentarily-singular Jacobian (a component's
    /// conductance railing) still admits a solve.
    pub regularisation: f64,

    /// Fixed integration step used by the transient driver, in seconds.
    pub delta_t: f64,

    /// Simulated-time spacing between snapshots the background worker
    /// pushes to its observer.
    pub result_interval: f64,

    /// Sliding-window horizon, in simulated seconds, the observer is
    /// expected to retain.
    pub graph_time_range: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            convergence_limit: 300,
            newton_tolerance: 1e-5,
            regularisation: 1e-12,
            delta_t: 1e-5,
            result_interval: 0.05,
            graph_time_range: 10.0,
        }
    }
}
