use crate::prelude::*;
use crate::system::System;

/// A linear two-terminal resistor.
#[derive(Debug, Clone)]
pub struct Resistor<T> {
    pub name: String,
    pub plus: T,
    pub minus: T,
    pub resistance: f64,
}

impl<T> Resistor<T> {
    pub fn new(name: impl Into<String>, plus: T, minus: T, resistance: f64) -> Result<Self> {
        if resistance <= 0.0 {
            return Err(Error::ParameterError(format!(
                "resistance must be positive, got {resistance}"
            )));
        }
        Ok(Resistor {
            name: name.into(),
            plus,
            minus,
            resistance,
        })
    }

    pub fn identifier(&self) -> String {
        format!("R{}", self.name)
    }

    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedResistor {
    pub plus: Option<usize>,
    pub minus: Option<usize>,
    pub conductance: f64,
}

impl ResolvedResistor {
    pub fn stamp(&self, sys: &mut System) {
        let g = self.conductance;
        let v = sys.get_x(self.plus) - sys.get_x(self.minus);
        sys.add_f(self.plus, g * v);
        sys.add_f(self.minus, -g * v);
        sys.add_j(self.plus, self.plus, g);
        sys.add_j(self.plus, self.minus, -g);
        sys.add_j(self.minus, self.plus, -g);
        sys.add_j(self.minus, self.minus, g);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nonpositive_resistance() {
        assert!(Resistor::new("1", "a", "b", 0.0).is_err());
        assert!(Resistor::new("1", "a", "b", -1.0).is_err());
    }

    #[test]
    fn conductance_is_reciprocal() {
        let r = Resistor::new("1", "a", "b", 250.0).unwrap();
        assert!((r.conductance() - 0.004).abs() < 1e-12);
    }

    #[test]
    fn stamp_is_antisymmetric() {
        let mut sys = System::new(2);
        sys.x[0] = 1.0;
        sys.x[1] = 0.0;
        let resolved = ResolvedResistor {
            plus: Some(0),
            minus: Some(1),
            conductance: 0.5,
        };
        resolved.stamp(&mut sys);
        assert!((sys.f[0] + sys.f[1]).abs() < 1e-12);
        assert_eq!(sys.jacobian_at(0, 0), 0.5);
        assert_eq!(sys.jacobian_at(1, 1), 0.5);
        assert_eq!(sys.jacobian_at(0, 1), -0.5);
    }

    #[test]
    fn ground_side_discards_writes() {
        let mut sys = System::new(1);
        sys.x[0] = 2.0;
        let resolved = ResolvedResistor {
            plus: Some(0),
            minus: None,
            conductance: 1.0,
        };
        resolved.stamp(&mut sys);
        assert_eq!(sys.f[0], 2.0);
        assert_eq!(sys.jacobian_at(0, 0), 1.0);
    }
}
