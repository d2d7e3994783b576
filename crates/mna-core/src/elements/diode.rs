use crate::environment::Environment;
use crate::prelude::*;
use crate::system::System;

/// Shockley diode with reverse breakdown. Carries no reactive memory, so
/// the same stamp serves both static and transient analysis.
#[derive(Debug, Clone)]
pub struct Diode<T> {
    pub name: String,
    pub anode: T,
    pub cathode: T,
    pub saturation_current: f64,
    pub ideality_factor: f64,
    pub breakdown_voltage: f64,
}

impl<T> Diode<T> {
    pub fn new(
        name: impl Into<String>,
        anode: T,
        cathode: T,
        saturation_current: f64,
        ideality_factor: f64,
        breakdown_voltage: f64,
    ) -> Result<Self> {
        if saturation_current <= 0.0 {
            return Err(Error::ParameterError(format!(
                "saturation current must be positive, got {saturation_current}"
            )));
        }
        if ideality_factor <= 0.0 {
            return Err(Error::ParameterError(format!(
                "ideality factor must be positive, got {ideality_factor}"
            )));
        }
        if breakdown_voltage <= 0.0 {
            return Err(Error::ParameterError(format!(
                "breakdown voltage must be positive, got {breakdown_voltage}"
            )));
        }
        Ok(Diode {
            name: name.into(),
            anode,
            cathode,
            saturation_current,
            ideality_factor,
            breakdown_voltage,
        })
    }

    pub fn identifier(&self) -> String {
        format!("D{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedDiode {
    pub anode: Option<usize>,
    pub cathode: Option<usize>,
    pub saturation_current: f64,
    pub ideality_factor: f64,
    pub breakdown_voltage: f64,
}

impl ResolvedDiode {
    /// Returns `(current, conductance)` for the current branch voltage,
    /// with conductance floored at `env.g_min`.
    fn characteristic(&self, v: f64, env: &Environment) -> (f64, f64) {
        let n_vt = self.ideality_factor * env.thermal_voltage();
        let i_s = self.saturation_current;

        let (current, conductance) = if v >= -self.breakdown_voltage {
            let exp_term = (v / n_vt).exp();
            (i_s * (exp_term - 1.0), i_s / n_vt * exp_term)
        } else {
            let u = -self.breakdown_voltage - v;
            let exp_term = (u / n_vt).exp();
            (-i_s * exp_term, i_s / n_vt * exp_term)
        };

        (current, conductance.max(env.g_min))
    }

    fn stamp(&self, sys: &mut System, env: &Environment) {
        let v = sys.get_x(self.anode) - sys.get_x(self.cathode);
        let (current, conductance) = self.characteristic(v, env);

        sys.add_f(self.anode, current);
        sys.add_f(self.cathode, -current);
        sys.add_j(self.anode, self.anode, conductance);
        sys.add_j(self.anode, self.cathode, -conductance);
        sys.add_j(self.cathode, self.anode, -conductance);
        sys.add_j(self.cathode, self.cathode, conductance);
    }

    pub fn stamp_static(&self, sys: &mut System, env: &Environment) {
        self.stamp(sys, env);
    }

    pub fn stamp_transient(&self, sys: &mut System, env: &Environment) {
        self.stamp(sys, env);
    }
}
