use crate::prelude::*;
use crate::system::System;

/// A linear two-terminal inductor. Introduces a branch current unknown and
/// integrates with backward-Euler (see design notes: the spec text calls
/// this "trapezoidal" but the coefficients below, and the reference model
/// this was ported from, are backward-Euler). Shorted in static analysis.
#[derive(Debug, Clone)]
pub struct Inductor<T> {
    pub name: String,
    pub plus: T,
    pub minus: T,
    pub inductance: f64,
}

impl<T> Inductor<T> {
    pub fn new(name: impl Into<String>, plus: T, minus: T, inductance: f64) -> Result<Self> {
        if inductance <= 0.0 {
            return Err(Error::ParameterError(format!(
                "inductance must be positive, got {inductance}"
            )));
        }
        Ok(Inductor {
            name: name.into(),
            plus,
            minus,
            inductance,
        })
    }

    pub fn identifier(&self) -> String {
        format!("L{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedInductor {
    pub plus: Option<usize>,
    pub minus: Option<usize>,
    pub branch: usize,
    pub inductance: f64,
}

impl ResolvedInductor {
    /// A zero-valued voltage-defining branch: `v_plus - v_minus = 0`.
    pub fn stamp_static(&self, sys: &mut System) {
        let i_l = Some(self.branch);
        sys.add_f(self.plus, sys.get_x(i_l));
        sys.add_f(self.minus, -sys.get_x(i_l));
        sys.add_j(self.plus, i_l, 1.0);
        sys.add_j(self.minus, i_l, -1.0);

        let v = sys.get_x(self.plus) - sys.get_x(self.minus);
        sys.add_f(i_l, v);
        sys.add_j(i_l, self.plus, 1.0);
        sys.add_j(i_l, self.minus, -1.0);
    }

    pub fn stamp_transient(&self, sys: &mut System, prev_x: &[f64], dt: f64) {
        let i_l = Some(self.branch);
        sys.add_f(self.plus, sys.get_x(i_l));
        sys.add_f(self.minus, -sys.get_x(i_l));
        sys.add_j(self.plus, i_l, 1.0);
        sys.add_j(self.minus, i_l, -1.0);

        let v = sys.get_x(self.plus) - sys.get_x(self.minus);
        let i_l_old = prev_x[self.branch];
        let current_now = sys.get_x(i_l);
        let residual = v - self.inductance * (current_now - i_l_old) / dt;
        sys.add_f(i_l, residual);
        sys.add_j(i_l, self.plus, 1.0);
        sys.add_j(i_l, self.minus, -1.0);
        sys.add_j(i_l, i_l, -self.inductance / dt);
    }
}
