pub mod capacitor;
pub mod diode;
pub mod inductor;
pub mod mosfet;
pub mod opamp;
pub mod resistor;
pub mod switch;
pub mod vcvs;
pub mod voltage_source;

pub use capacitor::{Capacitor, ResolvedCapacitor};
pub use diode::{Diode, ResolvedDiode};
pub use inductor::{Inductor, ResolvedInductor};
pub use mosfet::{Mosfet, ResolvedMosfet};
pub use opamp::{OpAmp, ResolvedOpAmp};
pub use resistor::{ResolvedResistor, Resistor};
pub use switch::{ResolvedSwitch, Switch};
pub use vcvs::{ResolvedVcvs, Vcvs};
pub use voltage_source::{Pulse, ResolvedVoltageSource, VoltageSource, Waveform};

use crate::terminal::Terminal;

/// The fixed library of components the engine knows how to stamp.
#[derive(Debug, Clone)]
pub enum Element<T: Terminal> {
    Resistor(Resistor<T>),
    Capacitor(Capacitor<T>),
    Inductor(Inductor<T>),
    VoltageSource(VoltageSource<T>),
    Diode(Diode<T>),
    Switch(Switch<T>),
    Mosfet(Mosfet<T>),
    OpAmp(OpAmp<T>),
    Vcvs(Vcvs<T>),
}

impl<T: Terminal> Element<T> {
    pub fn identifier(&self) -> String {
        match self {
            Element::Resistor(e) => e.identifier(),
            Element::Capacitor(e) => e.identifier(),
            Element::Inductor(e) => e.identifier(),
            Element::VoltageSource(e) => e.identifier(),
            Element::Diode(e) => e.identifier(),
            Element::Switch(e) => e.identifier(),
            Element::Mosfet(e) => e.identifier(),
            Element::OpAmp(e) => e.identifier(),
            Element::Vcvs(e) => e.identifier(),
        }
    }

    /// All node terminals this component is attached to, in a stable order.
    pub fn nodes(&self) -> Vec<T> {
        match self {
            Element::Resistor(e) => vec![e.plus.clone(), e.minus.clone()],
            Element::Capacitor(e) => vec![e.plus.clone(), e.minus.clone()],
            Element::Inductor(e) => vec![e.plus.clone(), e.minus.clone()],
            Element::VoltageSource(e) => vec![e.plus.clone(), e.minus.clone()],
            Element::Diode(e) => vec![e.anode.clone(), e.cathode.clone()],
            Element::Switch(e) => vec![e.plus.clone(), e.minus.clone()],
            Element::Mosfet(e) => vec![e.gate.clone(), e.drain.clone(), e.source.clone()],
            Element::OpAmp(e) => vec![
                e.inverting.clone(),
                e.non_inverting.clone(),
                e.output.clone(),
                e.positive_rail.clone(),
                e.negative_rail.clone(),
            ],
            Element::Vcvs(e) => vec![
                e.plus.clone(),
                e.minus.clone(),
                e.control_plus.clone(),
                e.control_minus.clone(),
            ],
        }
    }

    /// True for voltage-defining ("Group 2") elements that require a
    /// synthetic branch-current unknown.
    pub fn is_g2(&self) -> bool {
        matches!(
            self,
            Element::Inductor(_)
                | Element::VoltageSource(_)
                | Element::OpAmp(_)
                | Element::Vcvs(_)
        )
    }
}

/// A component with its terminal labels resolved to matrix indices,
/// cached once at `finalise`.
#[derive(Debug, Clone)]
pub enum ResolvedElement {
    Resistor(ResolvedResistor),
    Capacitor(ResolvedCapacitor),
    Inductor(ResolvedInductor),
    VoltageSource(ResolvedVoltageSource),
    Diode(ResolvedDiode),
    Switch(ResolvedSwitch),
    Mosfet(ResolvedMosfet),
    OpAmp(ResolvedOpAmp),
    Vcvs(ResolvedVcvs),
}
