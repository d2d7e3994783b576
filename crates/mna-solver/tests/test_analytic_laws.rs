use mna_core::elements::{Capacitor, Diode, Element, Resistor, Switch, VoltageSource, Waveform};
use mna_core::{Circuit, Environment};
use mna_solver::{SolverConfig, StaticSim, TransientSim};

fn voltage_divider(r1: f64, r2: f64) -> Circuit<&'static str> {
    let mut circuit = Circuit::new(Environment::default());
    circuit
        .add(Element::VoltageSource(VoltageSource::new(
            "1",
            "in",
            "0",
            Waveform::Dc(1.0),
        )))
        .unwrap();
    circuit
        .add(Element::Resistor(
            Resistor::new("1", "in", "mid", r1).unwrap(),
        ))
        .unwrap();
    circuit
        .add(Element::Resistor(
            Resistor::new("2", "mid", "0", r2).unwrap(),
        ))
        .unwrap();
    circuit.finalise("0").unwrap();
    circuit
}

#[test]
fn equal_resistor_divider_settles_at_half_the_source_voltage() {
    let mut circuit = voltage_divider(500.0, 500.0);
    StaticSim::new(&mut circuit, SolverConfig::default())
        .simulate()
        .unwrap();
    assert!((circuit.voltage(&"mid").unwrap() - 0.5).abs() < 1e-4);
}

#[test]
fn unequal_resistor_divider_settles_at_the_ratio() {
    let mut circuit = voltage_divider(1000.0, 500.0);
    StaticSim::new(&mut circuit, SolverConfig::default())
        .simulate()
        .unwrap();
    assert!((circuit.voltage(&"mid").unwrap() - 1.0 / 3.0).abs() < 1e-4);
}

#[test]
fn diode_forward_bias_matches_the_analytic_operating_point() {
    let mut circuit = Circuit::new(Environment::default());
    circuit
        .add(Element::VoltageSource(VoltageSource::new(
            "1",
            "in",
            "0",
            Waveform::Dc(10.0),
        )))
        .unwrap();
    circuit
        .add(Element::Resistor(
            Resistor::new("1", "in", "anode", 100.0).unwrap(),
        ))
        .unwrap();
    circuit
        .add(Element::Diode(
            Diode::new("1", "anode", "0", 1e-12, 1.0, 40.0).unwrap(),
        ))
        .unwrap();
    circuit.finalise("0").unwrap();

    StaticSim::new(&mut circuit, SolverConfig::default())
        .simulate()
        .unwrap();

    assert!((circuit.voltage(&"anode").unwrap() - 0.638).abs() < 5e-3);
    assert!((circuit.current("V1").unwrap() - (-0.0936)).abs() < 5e-3);
}

#[test]
fn diode_reverse_bias_passes_negligible_current() {
    let mut circuit = Circuit::new(Environment::default());
    circuit
        .add(Element::VoltageSource(VoltageSource::new(
            "1",
            "in",
            "0",
            Waveform::Dc(-10.0),
        )))
        .unwrap();
    circuit
        .add(Element::Resistor(
            Resistor::new("1", "in", "anode", 100.0).unwrap(),
        ))
        .unwrap();
    circuit
        .add(Element::Diode(
            Diode::new("1", "anode", "0", 1e-12, 1.0, 40.0).unwrap(),
        ))
        .unwrap();
    circuit.finalise("0").unwrap();

    StaticSim::new(&mut circuit, SolverConfig::default())
        .simulate()
        .unwrap();

    assert!((circuit.voltage(&"anode").unwrap() - (-10.0)).abs() < 0.1);
    assert!(circuit.current("V1").unwrap().abs() < 1e-6);
}

#[test]
fn diode_reverse_breakdown_clamps_near_the_breakdown_voltage() {
    let mut circuit = Circuit::new(Environment::default());
    circuit
        .add(Element::VoltageSource(VoltageSource::new(
            "1",
            "in",
            "0",
            Waveform::Dc(-50.0),
        )))
        .unwrap();
    circuit
        .add(Element::Resistor(
            Resistor::new("1", "in", "anode", 100.0).unwrap(),
        ))
        .unwrap();
    circuit
        .add(Element::Diode(
            Diode::new("1", "anode", "0", 1e-12, 1.0, 40.0).unwrap(),
        ))
        .unwrap();
    circuit.finalise("0").unwrap();

    StaticSim::new(&mut circuit, SolverConfig::default())
        .simulate()
        .unwrap();

    let drop = circuit.voltage(&"0").unwrap() - circuit.voltage(&"anode").unwrap();
    assert!((drop - 40.638).abs() < 5e-2);
}

#[test]
fn rc_discharge_through_an_opened_switch_decays_exponentially() {
    let r = 1e4;
    let c = 1e-6;
    let dt = 1e-5;

    let mut circuit = Circuit::new(Environment::default());
    circuit
        .add(Element::VoltageSource(VoltageSource::new(
            "1",
            "in",
            "0",
            Waveform::Dc(1.0),
        )))
        .unwrap();
    circuit
        .add(Element::Switch(Switch::new("1", "in", "mid")))
        .unwrap();
    circuit
        .add(Element::Resistor(
            Resistor::new("1", "mid", "0", r).unwrap(),
        ))
        .unwrap();
    circuit
        .add(Element::Capacitor(
            Capacitor::new("1", "mid", "0", c).unwrap(),
        ))
        .unwrap();
    circuit.finalise("0").unwrap();

    let config = SolverConfig {
        delta_t: dt,
        ..SolverConfig::default()
    };
    let mut sim = TransientSim::new(&mut circuit, config).unwrap();
    // Charge for a while, then open the switch and watch it decay.
    for _ in 0..200 {
        sim.step().unwrap();
    }
    let precharged = sim.voltage(&"mid").unwrap();
    sim.set_switch("S1", false).unwrap();
    let discharge_start = sim.time();

    for _ in 0..300 {
        sim.step().unwrap();
        let elapsed = sim.time() - discharge_start;
        let expected = precharged * (-elapsed / (r * c)).exp();
        let actual = sim.voltage(&"mid").unwrap();
        assert!((actual - expected).abs() < 0.02);
    }
}
