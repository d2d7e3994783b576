use crate::environment::Environment;
use crate::prelude::*;
use crate::system::System;

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// An n-channel MOSFET (Shichman-Hodges model, no channel-length
/// modulation). Three terminals: gate, drain, source.
#[derive(Debug, Clone)]
pub struct Mosfet<T> {
    pub name: String,
    pub gate: T,
    pub drain: T,
    pub source: T,
    pub threshold_voltage: f64,
    /// `beta = mobility * specific_capacitance / 2 * width / length`
    pub beta: f64,
}

impl<T> Mosfet<T> {
    pub fn new(
        name: impl Into<String>,
        gate: T,
        drain: T,
        source: T,
        threshold_voltage: f64,
        beta: f64,
    ) -> Result<Self> {
        if beta <= 0.0 {
            return Err(Error::ParameterError(format!(
                "beta must be positive, got {beta}"
            )));
        }
        Ok(Mosfet {
            name: name.into(),
            gate,
            drain,
            source,
            threshold_voltage,
            beta,
        })
    }

    pub fn identifier(&self) -> String {
        format!("M{}", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedMosfet {
    pub gate: Option<usize>,
    pub drain: Option<usize>,
    pub source: Option<usize>,
    pub threshold_voltage: f64,
    pub beta: f64,
}

/// `(i_ds, di_dvg, di_dvd, di_dvs)`, drain current flowing drain -> source.
struct Region {
    i_ds: f64,
    di_dvg: f64,
    di_dvd: f64,
    di_dvs: f64,
}

impl ResolvedMosfet {
    fn region(&self, v_gs: f64, v_ds: f64, env: &Environment) -> Region {
        let v_ov = v_gs - self.threshold_voltage;
        if v_gs < self.threshold_voltage {
            let g = env.g_min * sign(v_ds);
            Region {
                i_ds: env.i_min * sign(v_ds),
                di_dvg: 0.0,
                di_dvd: g,
                di_dvs: -g,
            }
        } else if v_ds < v_ov {
            // linear/triode region
            let i_ds = self.beta * (2.0 * v_ov * v_ds - v_ds * v_ds);
            let di_dvgs = 2.0 * self.beta * v_ds;
            let di_dvds = self.beta * (2.0 * v_ov - 2.0 * v_ds);
            Region {
                i_ds,
                di_dvg: di_dvgs,
                di_dvd: di_dvds,
                di_dvs: -di_dvgs - di_dvds,
            }
        } else {
            // saturation region
            let i_ds = self.beta * v_ov * v_ov;
            let g_m = 2.0 * self.beta * v_ov;
            Region {
                i_ds,
                di_dvg: g_m,
                di_dvd: 0.0,
                di_dvs: -g_m,
            }
        }
    }

    fn stamp(&self, sys: &mut System, env: &Environment) {
        let v_g = sys.get_x(self.gate);
        let v_d = sys.get_x(self.drain);
        let v_s = sys.get_x(self.source);
        let v_gs = v_g - v_s;
        let v_ds = v_d - v_s;

        let region = self.region(v_gs, v_ds, env);

        sys.add_f(self.drain, region.i_ds);
        sys.add_f(self.source, -region.i_ds);
        sys.add_j(self.drain, self.gate, region.di_dvg);
        sys.add_j(self.drain, self.drain, region.di_dvd);
        sys.add_j(self.drain, self.source, region.di_dvs);
        sys.add_j(self.source, self.gate, -region.di_dvg);
        sys.add_j(self.source, self.drain, -region.di_dvd);
        sys.add_j(self.source, self.source, -region.di_dvs);

        // Gate leakage floor: a tiny conductance to source plus a fixed
        // leakage current, so the gate row never pivots to zero.
        let leakage = env.i_min * sign(v_gs);
        sys.add_f(self.gate, leakage);
        sys.add_f(self.source, -leakage);
        sys.add_j(self.gate, self.gate, env.g_min);
        sys.add_j(self.gate, self.source, -env.g_min);
        sys.add_j(self.source, self.gate, -env.g_min);
        sys.add_j(self.source, self.source, env.g_min);
    }

    pub fn stamp_static(&self, sys: &mut System, env: &Environment) {
        self.stamp(sys, env);
    }

    pub fn stamp_transient(&self, sys: &mut System, env: &Environment) {
        self.stamp(sys, env);
    }
}
