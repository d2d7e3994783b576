use std::collections::HashMap;
use std::path::Path;

use nom::{
    IResult, Parser,
    bytes::complete::take_till,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    multi::{separated_list0, separated_list1},
    sequence::{pair, separated_pair},
};

use mna_core::elements::{Element, OpAmp, Pulse, Switch, Vcvs, Waveform};
use mna_core::elements::{Capacitor, Diode, Inductor, Mosfet, Resistor, VoltageSource};
use mna_core::{Circuit, Environment};

use crate::prelude::*;
use crate::union_find::UnionFind;
use crate::value::{alphanumeric_or_underscore1, value_parser};

/// The netlist's own node identifier type: a plain integer, merged through
/// wire equivalences down to a canonical representative by [`UnionFind`].
pub type NodeId = usize;

fn node_id(input: &str) -> IResult<&str, NodeId> {
    map_res(digit1, str::parse).parse(input)
}

/// One `index=neighbor,neighbor,...` entry of a node-adjacency line.
fn adjacency_entry(input: &str) -> IResult<&str, (NodeId, Vec<NodeId>)> {
    separated_pair(
        node_id,
        char('='),
        separated_list0(char(','), node_id),
    )
    .parse(input)
}

/// Parses a node-adjacency line (`i=j,k:i2=j2:...`) into, for every node
/// index in declaration order, the list of its declared neighbors.
fn parse_adjacency_line(line: &str) -> Result<Vec<Vec<NodeId>>> {
    let (_, entries) = all_consuming(separated_list1(char(':'), adjacency_entry))
        .parse(line)
        .map_err(|e| Error::ParseError {
            line: 0,
            message: format!("malformed node-adjacency line: {e}"),
        })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (declared, neighbors))| {
            if declared != i {
                Err(Error::ParseError {
                    line: 0,
                    message: format!(
                        "node-adjacency entries must appear in order; expected {i}, got {declared}"
                    ),
                })
            } else {
                Ok(neighbors)
            }
        })
        .collect()
}

/// One `key=value` entry of a component's parameter field.
fn param_pair(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        alphanumeric_or_underscore1,
        char('='),
        take_till(|c| c == ','),
    )
    .parse(input)
}

fn parse_params(field: &str) -> Result<HashMap<String, String>> {
    if field.is_empty() {
        return Ok(HashMap::new());
    }
    let (_, pairs) = all_consuming(separated_list1(char(','), param_pair))
        .parse(field)
        .map_err(|e| Error::InvalidFormat(format!("malformed parameter list '{field}': {e}")))?;
    Ok(pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

fn parse_node_list(field: &str) -> Result<Vec<NodeId>> {
    all_consuming(separated_list1(char(','), node_id))
        .parse(field)
        .map(|(_, nodes)| nodes)
        .map_err(|_| Error::InvalidNodeName(field.to_string()))
}

struct ComponentLine {
    identifier: String,
    params: HashMap<String, String>,
    nodes: Vec<NodeId>,
}

/// `NAME:key=val,key=val,...:nodeIdx,nodeIdx,...:geometry`. The trailing
/// geometry field is accepted but ignored; the engine has no use for
/// layout information.
fn component_fields(input: &str) -> IResult<&str, (&str, &str, &str)> {
    let (input, identifier) = alphanumeric_or_underscore1(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, params_field) = take_till(|c| c == ':').parse(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, nodes_field) = take_till(|c| c == ':').parse(input)?;
    let (input, _geometry) = opt(pair(char(':'), take_till(|_| false))).parse(input)?;
    Ok((input, (identifier, params_field, nodes_field)))
}

fn parse_component_line(line: &str) -> Result<ComponentLine> {
    let (_, (identifier, params_field, nodes_field)) = all_consuming(component_fields)
        .parse(line)
        .map_err(|e| Error::InvalidFormat(format!("malformed component line '{line}': {e}")))?;

    Ok(ComponentLine {
        identifier: identifier.to_string(),
        params: parse_params(params_field)?,
        nodes: parse_node_list(nodes_field)?,
    })
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str)
}

fn param_value(params: &HashMap<String, String>, key: &str, default: f64) -> Result<f64> {
    match param(params, key) {
        Some(s) => {
            let (_, v) = all_consuming(value_parser)
                .parse(s)
                .map_err(|e| Error::InvalidFloatValue(format!("'{s}': {e}")))?;
            Ok(v)
        }
        None => Ok(default),
    }
}

fn build_element(line: &ComponentLine, canon: &mut impl FnMut(NodeId) -> NodeId) -> Result<Element<NodeId>> {
    let name = line.identifier[1..].to_string();
    let nodes: Vec<NodeId> = line.nodes.iter().map(|&n| canon(n)).collect();
    let kind = line
        .identifier
        .chars()
        .next()
        .ok_or_else(|| Error::InvalidFormat("empty component name".to_string()))?;

    let need = |count: usize| -> Result<()> {
        if nodes.len() != count {
            Err(Error::InvalidFormat(format!(
                "'{}' expects {count} nodes, got {}",
                line.identifier,
                nodes.len()
            )))
        } else {
            Ok(())
        }
    };

    Ok(match kind.to_ascii_uppercase() {
        'R' => {
            need(2)?;
            let resistance = param_value(&line.params, "value", 1000.0)?;
            Element::Resistor(Resistor::new(name, nodes[0], nodes[1], resistance)?)
        }
        'C' => {
            need(2)?;
            let capacitance = param_value(&line.params, "value", 1e-6)?;
            Element::Capacitor(Capacitor::new(name, nodes[0], nodes[1], capacitance)?)
        }
        'L' => {
            need(2)?;
            let inductance = param_value(&line.params, "value", 1e-3)?;
            Element::Inductor(Inductor::new(name, nodes[0], nodes[1], inductance)?)
        }
        'V' => {
            need(2)?;
            let waveform = match param(&line.params, "type").unwrap_or("dc") {
                "ac" => Waveform::Ac {
                    amplitude: param_value(&line.params, "amplitude", 1.0)?,
                    frequency: param_value(&line.params, "frequency", 60.0)?,
                },
                "sweep" => Waveform::Sweep {
                    start: param_value(&line.params, "start", 0.0)?,
                    rate: param_value(&line.params, "rate", 1.0)?,
                },
                "pulse" => Waveform::Pulse(Pulse {
                    initial_value: param_value(&line.params, "initial", 0.0)?,
                    pulsed_value: param_value(&line.params, "pulsed", 1.0)?,
                    delay: param_value(&line.params, "delay", 0.0)?,
                    rise_time: param_value(&line.params, "rise", 0.0)?,
                    fall_time: param_value(&line.params, "fall", 0.0)?,
                    pulse_width: param_value(&line.params, "width", 1.0)?,
                    period: param_value(&line.params, "period", 1.0)?,
                }),
                _ => Waveform::Dc(param_value(&line.params, "value", 0.0)?),
            };
            Element::VoltageSource(VoltageSource::new(name, nodes[0], nodes[1], waveform))
        }
        'D' => {
            need(2)?;
            let saturation_current = param_value(&line.params, "is", 1e-12)?;
            let ideality_factor = param_value(&line.params, "n", 1.0)?;
            let breakdown_voltage = param_value(&line.params, "vbr", 40.0)?;
            Element::Diode(Diode::new(
                name,
                nodes[0],
                nodes[1],
                saturation_current,
                ideality_factor,
                breakdown_voltage,
            )?)
        }
        'S' => {
            need(2)?;
            let closed = param(&line.params, "closed").unwrap_or("true") != "false";
            let closed_g = param_value(&line.params, "closedg", 1e12)?;
            let open_g = param_value(&line.params, "openg", 1e-12)?;
            let mut switch = Switch::new(name, nodes[0], nodes[1]).with_conductances(closed_g, open_g);
            switch.closed = closed;
            Element::Switch(switch)
        }
        'M' => {
            need(3)?;
            let threshold_voltage = param_value(&line.params, "vth", 1.0)?;
            let beta = param_value(&line.params, "beta", 1e-3)?;
            Element::Mosfet(Mosfet::new(
                name,
                nodes[0],
                nodes[1],
                nodes[2],
                threshold_voltage,
                beta,
            )?)
        }
        'U' => {
            need(5)?;
            let mut op = OpAmp::new(name, nodes[0], nodes[1], nodes[2], nodes[3], nodes[4]);
            op.open_loop_gain = param_value(&line.params, "gain", op.open_loop_gain)?;
            op.output_resistance = param_value(&line.params, "rout", op.output_resistance)?;
            op.input_resistance = param_value(&line.params, "rin", op.input_resistance)?;
            op.offset_voltage = param_value(&line.params, "voff", op.offset_voltage)?;
            op.saturation_offset = param_value(&line.params, "satoff", op.saturation_offset)?;
            op.slew_rate = param_value(&line.params, "sr", op.slew_rate)?;
            Element::OpAmp(op)
        }
        'E' => {
            need(4)?;
            let gain = param_value(&line.params, "gain", 1.0)?;
            Element::Vcvs(Vcvs::new(name, nodes[0], nodes[1], nodes[2], nodes[3], gain))
        }
        other => return Err(Error::UnknownElementType(other.to_string())),
    })
}

/// Parses the textual persistence format of a complete circuit: one
/// node-adjacency line followed by one component line per element.
/// Blank lines and lines beginning with `%` or `*` are ignored.
pub fn load_netlist(input: &str) -> Result<Circuit<NodeId>> {
    let mut lines = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('%') && !line.starts_with('*'));

    let adjacency_line = lines.next().ok_or(Error::EmptyNetlist)?;
    let adjacency = parse_adjacency_line(adjacency_line)?;

    let mut union_find = UnionFind::new(adjacency.len());
    for (node, neighbors) in adjacency.iter().enumerate() {
        for &neighbor in neighbors {
            union_find.union(node, neighbor);
        }
    }
    let mut canon = |n: NodeId| union_find.find(n);

    let mut circuit = Circuit::new(Environment::default());
    for (line_no, line) in lines.enumerate() {
        let element = parse_component_line(line)
            .and_then(|parsed| build_element(&parsed, &mut canon))
            .map_err(|e| Error::ParseError {
                line: line_no + 2,
                message: e.to_string(),
            })?;
        circuit.add(element)?;
    }

    let ground = canon(0);
    circuit.finalise(ground)?;
    Ok(circuit)
}

pub fn load_netlist_file(path: impl AsRef<Path>) -> Result<Circuit<NodeId>> {
    let contents = std::fs::read_to_string(path)?;
    load_netlist(&contents)
}
