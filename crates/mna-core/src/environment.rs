/// Process-wide physical constants and the current simulation time.
///
/// Shared read-only by every stamp except that the simulation driver
/// advances `time` between transient steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// Ambient temperature, Kelvin.
    pub temperature: f64,
    /// Boltzmann constant, J/K.
    pub k: f64,
    /// Elementary charge, C.
    pub q: f64,
    /// Minimum conductance floor injected by nonlinear stamps to keep
    /// deeply reverse-biased junctions from vanishing a pivot.
    pub g_min: f64,
    /// Minimum current floor for leakage terms (gate leakage, etc).
    pub i_min: f64,
    /// Seconds elapsed since the environment was created.
    pub time: f64,
}

impl Environment {
    pub fn new(temperature: f64, k: f64, q: f64, g_min: f64, i_min: f64) -> Self {
        Environment {
            temperature,
            k,
            q,
            g_min,
            i_min,
            time: 0.0,
        }
    }

    /// Thermal voltage `kT/q`, derived on demand.
    pub fn thermal_voltage(&self) -> f64 {
        self.k * self.temperature / self.q
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(293.15, 1.380_648_52e-23, 1.602_176_62e-19, 1e-12, 1e-9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thermal_voltage_is_about_25_millivolts() {
        let env = Environment::default();
        assert!((env.thermal_voltage() - 0.02526).abs() < 1e-4);
    }

    #[test]
    fn time_starts_at_zero() {
        assert_eq!(Environment::default().time, 0.0);
    }
}
