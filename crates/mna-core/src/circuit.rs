use std::collections::HashMap;

use crate::elements::{Element, ResolvedElement};
use crate::environment::Environment;
use crate::prelude::*;
use crate::system::System;
use crate::terminal::Terminal;

/// A netlist builder and node-index allocator.
///
/// Nodes and branch-current unknowns are assigned indices monotonically as
/// components are added. `finalise` freezes the topology, removes the
/// ground node from the mapping, compacts the remaining indices, and
/// caches a resolved (index-bound) copy of every component.
pub struct Circuit<T: Terminal> {
    environment: Environment,
    elements: Vec<Element<T>>,
    node_index: HashMap<T, usize>,
    /// Parallel to `elements`: the raw (pre-compaction) branch index for
    /// Group-2 elements, `None` otherwise.
    branch_raw: Vec<Option<usize>>,
    next_index: usize,
    finalised: Option<Finalised<T>>,
}

struct Finalised<T: Terminal> {
    n: usize,
    node_index: HashMap<T, usize>,
    resolved: Vec<ResolvedElement>,
    system: System,
}

impl<T: Terminal> Circuit<T> {
    pub fn new(environment: Environment) -> Self {
        Circuit {
            environment,
            elements: Vec::new(),
            node_index: HashMap::new(),
            branch_raw: Vec::new(),
            next_index: 0,
            finalised: None,
        }
    }

    pub fn is_finalised(&self) -> bool {
        self.finalised.is_some()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn elements(&self) -> &[Element<T>] {
        &self.elements
    }

    fn allocate_node(&mut self, label: &T) -> usize {
        if let Some(&idx) = self.node_index.get(label) {
            return idx;
        }
        let idx = self.next_index;
        self.node_index.insert(label.clone(), idx);
        self.next_index += 1;
        idx
    }

    /// Appends a component, assigning fresh indices to any previously
    /// unseen terminal labels and, for voltage-defining elements, a new
    /// branch-current unknown.
    pub fn add(&mut self, element: Element<T>) -> Result<()> {
        if self.finalised.is_some() {
            return Err(Error::TopologyError(
                "cannot add components after finalise".to_string(),
            ));
        }

        for label in element.nodes() {
            self.allocate_node(&label);
        }

        let branch = if element.is_g2() {
            let idx = self.next_index;
            self.next_index += 1;
            Some(idx)
        } else {
            None
        };

        self.branch_raw.push(branch);
        self.elements.push(element);
        Ok(())
    }

    /// Freezes the topology: removes `ground`'s index, compacts the
    /// mapping, allocates the working arrays, and resolves every
    /// component's terminal labels to cached indices.
    pub fn finalise(&mut self, ground: T) -> Result<()> {
        if self.finalised.is_some() {
            return Err(Error::TopologyError("circuit already finalised".to_string()));
        }

        let ground_raw = *self
            .node_index
            .get(&ground)
            .ok_or_else(|| Error::TopologyError("no ground node declared".to_string()))?;

        let compact = |raw: usize| -> Option<usize> {
            use std::cmp::Ordering;
            match raw.cmp(&ground_raw) {
                Ordering::Equal => None,
                Ordering::Greater => Some(raw - 1),
                Ordering::Less => Some(raw),
            }
        };

        let n = self.next_index - 1;

        let node_index: HashMap<T, usize> = self
            .node_index
            .iter()
            .filter_map(|(label, &raw)| compact(raw).map(|idx| (label.clone(), idx)))
            .collect();

        let resolved = self
            .elements
            .iter()
            .zip(self.branch_raw.iter())
            .map(|(element, branch_raw)| {
                resolve_element(element, &self.node_index, &compact, *branch_raw)
            })
            .collect::<Result<Vec<_>>>()?;

        self.finalised = Some(Finalised {
            n,
            node_index,
            resolved,
            system: System::new(n),
        });
        Ok(())
    }

    fn finalised(&self) -> Result<&Finalised<T>> {
        self.finalised
            .as_ref()
            .ok_or_else(|| Error::TopologyError("circuit has not been finalised".to_string()))
    }

    fn finalised_mut(&mut self) -> Result<&mut Finalised<T>> {
        self.finalised
            .as_mut()
            .ok_or_else(|| Error::TopologyError("circuit has not been finalised".to_string()))
    }

    pub fn unknown_count(&self) -> Result<usize> {
        Ok(self.finalised()?.n)
    }

    pub fn system(&self) -> Result<&System> {
        Ok(&self.finalised()?.system)
    }

    pub fn system_mut(&mut self) -> Result<&mut System> {
        Ok(&mut self.finalised_mut()?.system)
    }

    pub fn resolved(&self) -> Result<&[ResolvedElement]> {
        Ok(&self.finalised()?.resolved)
    }

    /// Ground returns 0, matching the silent-sink read of any other
    /// dropped index.
    pub fn voltage(&self, label: &T) -> Result<f64> {
        let finalised = self.finalised()?;
        let idx = finalised.node_index.get(label).copied();
        Ok(finalised.system.get_x(idx))
    }

    /// Branch current through a Group-2 element, looked up by identifier
    /// (e.g. `"V1"`).
    pub fn current(&self, identifier: &str) -> Result<f64> {
        let finalised = self.finalised()?;
        let position = self
            .elements
            .iter()
            .position(|e| e.identifier() == identifier)
            .ok_or_else(|| Error::TopologyError(format!("no such element: {identifier}")))?;
        match &finalised.resolved[position] {
            ResolvedElement::Inductor(r) => Ok(finalised.system.x[r.branch]),
            ResolvedElement::VoltageSource(r) => Ok(finalised.system.x[r.branch]),
            ResolvedElement::OpAmp(r) => Ok(finalised.system.x[r.branch]),
            ResolvedElement::Vcvs(r) => Ok(finalised.system.x[r.branch]),
            _ => Err(Error::TopologyError(format!(
                "'{identifier}' has no branch current"
            ))),
        }
    }

    /// Mutates a switch's open/closed state by identifier (e.g. `"S1"`).
    /// Takes effect from the next stamp pass onward.
    pub fn set_switch(&mut self, identifier: &str, closed: bool) -> Result<()> {
        let position = self
            .elements
            .iter()
            .position(|e| e.identifier() == identifier)
            .ok_or_else(|| Error::TopologyError(format!("no such element: {identifier}")))?;
        let finalised = self.finalised_mut()?;
        match &mut finalised.resolved[position] {
            ResolvedElement::Switch(s) => {
                s.closed = closed;
                Ok(())
            }
            _ => Err(Error::TopologyError(format!(
                "'{identifier}' is not a switch"
            ))),
        }
    }

    /// Zeroes the working arrays and stamps every component's static (DC
    /// operating point) contribution.
    pub fn stamp_static(&mut self) -> Result<()> {
        let env = self.environment.clone();
        let finalised = self
            .finalised
            .as_mut()
            .ok_or_else(|| Error::TopologyError("circuit has not been finalised".to_string()))?;
        finalised.system.clear_system();
        for element in &finalised.resolved {
            match element {
                ResolvedElement::Resistor(r) => r.stamp(&mut finalised.system),
                ResolvedElement::Capacitor(c) => c.stamp_static(&mut finalised.system),
                ResolvedElement::Inductor(l) => l.stamp_static(&mut finalised.system),
                ResolvedElement::VoltageSource(v) => v.stamp_static(&mut finalised.system)?,
                ResolvedElement::Diode(d) => d.stamp_static(&mut finalised.system, &env),
                ResolvedElement::Switch(s) => s.stamp(&mut finalised.system),
                ResolvedElement::Mosfet(m) => m.stamp_static(&mut finalised.system, &env),
                ResolvedElement::OpAmp(o) => o.stamp_static(&mut finalised.system),
                ResolvedElement::Vcvs(e) => e.stamp(&mut finalised.system),
            }
        }
        Ok(())
    }

    /// Zeroes the working arrays and stamps every component's transient
    /// contribution, using `prev_x` (the previous accepted timestep's
    /// unknown vector) for companion-model memory and `dt` as the fixed
    /// integration step.
    pub fn stamp_transient(&mut self, prev_x: &[f64], dt: f64) -> Result<()> {
        let env = self.environment.clone();
        let time = env.time;
        let finalised = self
            .finalised
            .as_mut()
            .ok_or_else(|| Error::TopologyError("circuit has not been finalised".to_string()))?;
        finalised.system.clear_system();
        for element in &finalised.resolved {
            match element {
                ResolvedElement::Resistor(r) => r.stamp(&mut finalised.system),
                ResolvedElement::Capacitor(c) => c.stamp_transient(&mut finalised.system, prev_x, dt),
                ResolvedElement::Inductor(l) => l.stamp_transient(&mut finalised.system, prev_x, dt),
                ResolvedElement::VoltageSource(v) => v.stamp_transient(&mut finalised.system, time),
                ResolvedElement::Diode(d) => d.stamp_transient(&mut finalised.system, &env),
                ResolvedElement::Switch(s) => s.stamp(&mut finalised.system),
                ResolvedElement::Mosfet(m) => m.stamp_transient(&mut finalised.system, &env),
                ResolvedElement::OpAmp(o) => o.stamp_transient(&mut finalised.system, prev_x, dt),
                ResolvedElement::Vcvs(e) => e.stamp(&mut finalised.system),
            }
        }
        Ok(())
    }
}

fn resolve_element<T: Terminal>(
    element: &Element<T>,
    node_index: &HashMap<T, usize>,
    compact: impl Fn(usize) -> Option<usize>,
    branch_raw: Option<usize>,
) -> Result<ResolvedElement> {
    let idx = |label: &T| -> Option<usize> { node_index.get(label).copied().and_then(&compact) };
    let branch = || -> usize {
        branch_raw
            .and_then(&compact)
            .expect("g2 element must resolve to a real branch index")
    };

    Ok(match element {
        Element::Resistor(r) => ResolvedElement::Resistor(crate::elements::ResolvedResistor {
            plus: idx(&r.plus),
            minus: idx(&r.minus),
            conductance: r.conductance(),
        }),
        Element::Capacitor(c) => ResolvedElement::Capacitor(crate::elements::ResolvedCapacitor {
            plus: idx(&c.plus),
            minus: idx(&c.minus),
            capacitance: c.capacitance,
        }),
        Element::Inductor(l) => ResolvedElement::Inductor(crate::elements::ResolvedInductor {
            plus: idx(&l.plus),
            minus: idx(&l.minus),
            branch: branch(),
            inductance: l.inductance,
        }),
        Element::VoltageSource(v) => {
            ResolvedElement::VoltageSource(crate::elements::ResolvedVoltageSource {
                plus: idx(&v.plus),
                minus: idx(&v.minus),
                branch: branch(),
                waveform: v.waveform,
                identifier: v.identifier(),
            })
        }
        Element::Diode(d) => ResolvedElement::Diode(crate::elements::ResolvedDiode {
            anode: idx(&d.anode),
            cathode: idx(&d.cathode),
            saturation_current: d.saturation_current,
            ideality_factor: d.ideality_factor,
            breakdown_voltage: d.breakdown_voltage,
        }),
        Element::Switch(s) => ResolvedElement::Switch(crate::elements::ResolvedSwitch {
            plus: idx(&s.plus),
            minus: idx(&s.minus),
            closed_g: s.closed_g,
            open_g: s.open_g,
            closed: s.closed,
        }),
        Element::Mosfet(m) => ResolvedElement::Mosfet(crate::elements::ResolvedMosfet {
            gate: idx(&m.gate),
            drain: idx(&m.drain),
            source: idx(&m.source),
            threshold_voltage: m.threshold_voltage,
            beta: m.beta,
        }),
        Element::OpAmp(o) => ResolvedElement::OpAmp(crate::elements::ResolvedOpAmp {
            inverting: idx(&o.inverting),
            non_inverting: idx(&o.non_inverting),
            output: idx(&o.output),
            positive_rail: idx(&o.positive_rail),
            negative_rail: idx(&o.negative_rail),
            branch: branch(),
            open_loop_gain: o.open_loop_gain,
            output_resistance: o.output_resistance,
            input_resistance: o.input_resistance,
            offset_voltage: o.offset_voltage,
            saturation_offset: o.saturation_offset,
            slew_rate: o.slew_rate,
        }),
        Element::Vcvs(e) => ResolvedElement::Vcvs(crate::elements::ResolvedVcvs {
            plus: idx(&e.plus),
            minus: idx(&e.minus),
            control_plus: idx(&e.control_plus),
            control_minus: idx(&e.control_minus),
            branch: branch(),
            gain: e.gain,
        }),
    })
}
