use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use mna_core::{Circuit, Terminal};

use crate::config::SolverConfig;
use crate::transient::TransientSim;

/// A command the foreground may send to a running [`TransientWorker`].
pub enum Command<T> {
    /// Replaces the set of labels snapshotted on every emitted tick.
    ChangeWatchSet(Vec<T>),
    /// Flips a switch's open/closed state between steps.
    ToggleSwitch { name: String, closed: bool },
    /// Cooperative cancellation: the worker exits at its next poll.
    Stop,
}

/// One emitted sample: simulated time plus the watched labels' voltages at
/// that instant. The worker is stateless about history — retaining a
/// sliding window of these is the receiver's responsibility.
pub struct Snapshot<T> {
    pub time: f64,
    pub values: HashMap<T, f64>,
}

/// Runs a transient simulation on a dedicated OS thread, polling an inbound
/// command channel and emitting snapshots on an outbound channel once per
/// `result_interval` of simulated time. Mirrors the original prototype's
/// `SimulationWorker` polling loop, adapted from a multiprocessing queue and
/// a Qt timer to native threads and `std::sync::mpsc`.
pub struct TransientWorker<T> {
    commands: Sender<Command<T>>,
    snapshots: Receiver<Snapshot<T>>,
    handle: JoinHandle<()>,
}

impl<T: Terminal + Send + 'static> TransientWorker<T> {
    pub fn spawn(mut circuit: Circuit<T>, config: SolverConfig, initial_watch: Vec<T>) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<Command<T>>();
        let (snapshot_tx, snapshot_rx) = mpsc::channel::<Snapshot<T>>();

        let handle = thread::spawn(move || {
            let mut watch = initial_watch;
            let result_interval = config.result_interval;

            let mut sim = match TransientSim::new(&mut circuit, config) {
                Ok(sim) => sim,
                Err(_) => return,
            };

            let mut next_emit = result_interval;
            loop {
                loop {
                    match command_rx.try_recv() {
                        Ok(Command::Stop) => return,
                        Ok(Command::ChangeWatchSet(labels)) => watch = labels,
                        Ok(Command::ToggleSwitch { name, closed }) => {
                            let _ = sim.set_switch(&name, closed);
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => return,
                    }
                }

                if sim.step().is_err() {
                    return;
                }

                if sim.time() + 1e-12 >= next_emit {
                    let values = watch
                        .iter()
                        .filter_map(|label| sim.voltage(label).ok().map(|v| (label.clone(), v)))
                        .collect();
                    let snapshot = Snapshot {
                        time: sim.time(),
                        values,
                    };
                    if snapshot_tx.send(snapshot).is_err() {
                        return;
                    }
                    next_emit += result_interval;
                }
            }
        });

        TransientWorker {
            commands: command_tx,
            snapshots: snapshot_rx,
            handle,
        }
    }

    pub fn commands(&self) -> Sender<Command<T>> {
        self.commands.clone()
    }

    pub fn snapshots(&self) -> &Receiver<Snapshot<T>> {
        &self.snapshots
    }

    /// Blocks until the worker thread exits, which happens on `Stop`, a
    /// dropped command sender, or an unrecoverable simulation error.
    pub fn join(self) {
        let _ = self.handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mna_core::Environment;
    use mna_core::elements::{Element, Resistor, VoltageSource, Waveform};
    use std::time::Duration;

    fn divider() -> Circuit<&'static str> {
        let mut circuit = Circuit::new(Environment::default());
        circuit
            .add(Element::VoltageSource(VoltageSource::new(
                "1",
                "in",
                "0",
                Waveform::Dc(5.0),
            )))
            .unwrap();
        circuit
            .add(Element::Resistor(
                Resistor::new("1", "in", "mid", 1000.0).unwrap(),
            ))
            .unwrap();
        circuit
            .add(Element::Resistor(
                Resistor::new("2", "mid", "0", 1000.0).unwrap(),
            ))
            .unwrap();
        circuit.finalise("0").unwrap();
        circuit
    }

    #[test]
    fn emits_at_least_one_snapshot_before_being_stopped() {
        let config = SolverConfig {
            delta_t: 1e-4,
            result_interval: 1e-3,
            ..SolverConfig::default()
        };
        let worker = TransientWorker::spawn(divider(), config, vec!["mid"]);

        let snapshot = worker
            .snapshots()
            .recv_timeout(Duration::from_secs(5))
            .expect("expected at least one snapshot");
        assert!((snapshot.values[&"mid"] - 2.5).abs() < 1e-3);

        worker.commands().send(Command::Stop).unwrap();
        worker.join();
    }
}
