use crate::prelude::*;
use crate::system::System;
use std::f64::consts::PI;

/// Piecewise-linear PULSE waveform parameters, re-evaluated against the
/// driver's current simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub initial_value: f64,
    pub pulsed_value: f64,
    pub delay: f64,
    pub rise_time: f64,
    pub fall_time: f64,
    pub pulse_width: f64,
    pub period: f64,
}

impl Pulse {
    pub fn value_at(&self, time: f64) -> f64 {
        if time < self.delay {
            return self.initial_value;
        }
        let t = (time - self.delay) % self.period;
        let rise_end = self.rise_time;
        let width_end = rise_end + self.pulse_width;
        let fall_end = width_end + self.fall_time;

        if t < rise_end {
            if self.rise_time == 0.0 {
                self.pulsed_value
            } else {
                self.initial_value
                    + (self.pulsed_value - self.initial_value) * (t / self.rise_time)
            }
        } else if t < width_end {
            self.pulsed_value
        } else if t < fall_end {
            if self.fall_time == 0.0 {
                self.initial_value
            } else {
                self.pulsed_value
                    - (self.pulsed_value - self.initial_value) * ((t - width_end) / self.fall_time)
            }
        } else {
            self.initial_value
        }
    }
}

/// The time-varying law a voltage source follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Dc(f64),
    Ac { amplitude: f64, frequency: f64 },
    Sweep { start: f64, rate: f64 },
    Pulse(Pulse),
}

impl Waveform {
    /// `None` marks a waveform with no well-defined DC operating point.
    fn static_value(&self) -> Option<f64> {
        match self {
            Waveform::Dc(v) => Some(*v),
            Waveform::Pulse(p) => Some(p.value_at(0.0)),
            Waveform::Ac { .. } | Waveform::Sweep { .. } => None,
        }
    }

    fn value_at(&self, time: f64) -> f64 {
        match self {
            Waveform::Dc(v) => *v,
            Waveform::Ac {
                amplitude,
                frequency,
            } => amplitude * (2.0 * PI * frequency * time).sin(),
            Waveform::Sweep { start, rate } => start + rate * time,
            Waveform::Pulse(p) => p.value_at(time),
        }
    }
}

/// An ideal two-terminal voltage source. Introduces a branch current
/// unknown equal to the current flowing from `plus` to `minus` through
/// the source.
#[derive(Debug, Clone)]
pub struct VoltageSource<T> {
    pub name: String,
    pub plus: T,
    pub minus: T,
    pub waveform: Waveform,
}

impl<T> VoltageSource<T> {
    pub fn new(name: impl Into<String>, plus: T, minus: T, waveform: Waveform) -> Self {
        VoltageSource {
            name: name.into(),
            plus,
            minus,
            waveform,
        }
    }

    pub fn identifier(&self) -> String {
        format!("V{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedVoltageSource {
    pub plus: Option<usize>,
    pub minus: Option<usize>,
    pub branch: usize,
    pub waveform: Waveform,
    pub identifier: String,
}

impl ResolvedVoltageSource {
    fn stamp_kcl_and_branch_row(&self, sys: &mut System, voltage: f64) {
        let i = Some(self.branch);
        sys.add_f(self.plus, sys.get_x(i));
        sys.add_f(self.minus, -sys.get_x(i));
        sys.add_j(self.plus, i, 1.0);
        sys.add_j(self.minus, i, -1.0);

        let v = sys.get_x(self.plus) - sys.get_x(self.minus);
        sys.add_f(i, v - voltage);
        sys.add_j(i, self.plus, 1.0);
        sys.add_j(i, self.minus, -1.0);
    }

    pub fn stamp_static(&self, sys: &mut System) -> Result<()> {
        let voltage = self
            .waveform
            .static_value()
            .ok_or_else(|| Error::StaticModeRejected(self.identifier.clone()))?;
        self.stamp_kcl_and_branch_row(sys, voltage);
        Ok(())
    }

    pub fn stamp_transient(&self, sys: &mut System, time: f64) {
        let voltage = self.waveform.value_at(time);
        self.stamp_kcl_and_branch_row(sys, voltage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_has_a_static_value() {
        assert_eq!(Waveform::Dc(5.0).static_value(), Some(5.0));
    }

    #[test]
    fn ac_and_sweep_reject_static_analysis() {
        assert_eq!(
            Waveform::Ac {
                amplitude: 1.0,
                frequency: 60.0
            }
            .static_value(),
            None
        );
        assert_eq!(
            Waveform::Sweep {
                start: 0.0,
                rate: 1.0
            }
            .static_value(),
            None
        );
    }

    #[test]
    fn pulse_rises_then_holds_then_falls() {
        let p = Pulse {
            initial_value: 0.0,
            pulsed_value: 5.0,
            delay: 1.0,
            rise_time: 1.0,
            fall_time: 1.0,
            pulse_width: 2.0,
            period: 10.0,
        };
        assert_eq!(p.value_at(0.0), 0.0);
        assert!((p.value_at(1.5) - 2.5).abs() < 1e-9);
        assert_eq!(p.value_at(2.5), 5.0);
        assert!((p.value_at(4.5) - 2.5).abs() < 1e-9);
        assert_eq!(p.value_at(5.5), 0.0);
    }

    #[test]
    fn static_stamp_rejects_ac_source() {
        let mut sys = System::new(3);
        let resolved = ResolvedVoltageSource {
            plus: Some(0),
            minus: Some(1),
            branch: 2,
            waveform: Waveform::Ac {
                amplitude: 1.0,
                frequency: 60.0,
            },
            identifier: "V1".to_string(),
        };
        let err = resolved.stamp_static(&mut sys).unwrap_err();
        assert!(matches!(err, Error::StaticModeRejected(_)));
    }

    #[test]
    fn static_stamp_enforces_branch_voltage_law() {
        let mut sys = System::new(3);
        let resolved = ResolvedVoltageSource {
            plus: Some(0),
            minus: Some(1),
            branch: 2,
            waveform: Waveform::Dc(5.0),
            identifier: "V1".to_string(),
        };
        resolved.stamp_static(&mut sys).unwrap();
        assert_eq!(sys.f[2], -5.0);
        assert_eq!(sys.jacobian_at(2, 0), 1.0);
        assert_eq!(sys.jacobian_at(2, 1), -1.0);
    }
}
