use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The Newton-Raphson loop exhausted its iteration budget without
    /// driving the update norm below tolerance.
    #[error("Newton-Raphson did not converge within {0} iterations")]
    NonConvergence(usize),

    /// The regularised Jacobian still produced a singular or near-singular
    /// system at factorisation time.
    #[error("linear system is singular")]
    SingularSystem,

    /// A component with no DC operating point (AC source, sweep source)
    /// was asked for a static stamp.
    #[error("'{0}' has no static stamp and cannot be used in a static analysis")]
    StaticModeRejected(String),

    /// Raised at `finalise`: missing ground, duplicate branch unknown, or a
    /// component referencing a node that was never added.
    #[error("topology error: {0}")]
    TopologyError(String),

    /// Construction-time rejection of a non-physical parameter.
    #[error("invalid parameter: {0}")]
    ParameterError(String),
}
