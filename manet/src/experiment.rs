//! The experiment controller.
//!
//! An [`Experiment`] is constructed with its whole topology: nodes, mobility,
//! wireless medium, routing and addresses. [Running](Experiment::run) it
//! consumes it: the sinks are bound, the flows installed, the stats reporter
//! started, and the simulation runs until the horizon. The simulation is
//! torn down before `run` returns, whatever the outcome.

use crate::{
    config::ExperimentConfig,
    error::{ConfigurationError, ExperimentError},
    output::Console,
    reporter::{StatsReporter, TickReport},
    stack, topology,
    topology::NodeSet,
    trace,
    tracker::{Counters, Reception, ReceiveTracker},
    traffic::{self, Flow},
};
use manet_core::{
    NodeId, SimTime, network::Network, position::Position, scheduler::Simulator,
    stats::NetworkStats,
};
use std::{io::Write, rc::Rc};

pub struct Experiment {
    config: ExperimentConfig,
    nodes: NodeSet,
    sim: Simulator<Network>,
    console: Console,
    counters: Rc<Counters>,
}

/// What happened during [`Experiment::run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub flows: Vec<Flow>,
    /// every tick of the stats reporter, in order
    pub ticks: Vec<TickReport>,
    /// every datagram counted at the sinks, in order
    pub receptions: Vec<Reception>,
    pub total_packets: u64,
    pub total_bytes: u64,
    pub network: NetworkStats,
    /// the simulated time when the simulation stopped
    pub stopped_at: SimTime,
    /// events still pending when the simulation was torn down
    pub discarded_events: usize,
}

impl Experiment {
    /// The reference experiment with `n_nodes` nodes, printing on the
    /// standard output.
    ///
    /// # Errors
    ///
    /// [`ExperimentError::Configuration`] if `n_nodes` is less than twice
    /// the number of sinks.
    pub fn new(n_nodes: usize) -> Result<Self, ExperimentError> {
        Self::with_config(ExperimentConfig::with_nodes(n_nodes), Console::stdout())
    }

    pub fn with_config(config: ExperimentConfig, console: Console) -> Result<Self, ExperimentError> {
        let mut network = Network::new();
        let nodes = topology::build(&mut network, &config)?;
        stack::configure(&mut network, &config)?;

        let mut sim = Simulator::new(network);
        stack::install_routing(&mut sim, &config);

        log::info!(
            "{n} nodes in a {w}m x {h}m area: {sinks} sinks, {sources} sources, {idle} relays, {routing} routing",
            n = nodes.len(),
            w = config.area_width,
            h = config.area_height,
            sinks = nodes.sinks().len(),
            sources = nodes.sources().len(),
            idle = nodes.idle().len(),
            routing = config.routing,
        );
        for (node, position) in sim.world_mut().positions(SimTime::ZERO) {
            log::debug!("node {node} starts at {position}");
        }

        Ok(Self {
            config,
            nodes,
            sim,
            console,
            counters: Rc::default(),
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn network(&self) -> &Network {
        self.sim.world()
    }

    /// Where the nodes are before the run starts.
    pub fn initial_positions(&mut self) -> Vec<(NodeId, Position)> {
        let now = self.sim.now();
        self.sim.world_mut().positions(now)
    }

    /// Write the animation trace: every node at its initial position, with
    /// its icon size.
    pub fn write_animation_trace<W>(&mut self, writer: W) -> Result<(), ExperimentError>
    where
        W: Write,
    {
        let positions = self.initial_positions();
        trace::write_animation(writer, &positions, self.config.node_size).map_err(ExperimentError::Trace)
    }

    /// Run the experiment to the horizon.
    pub fn run(self) -> Result<RunReport, ExperimentError> {
        let Self {
            config,
            nodes,
            mut sim,
            console,
            counters,
        } = self;

        let tracker = ReceiveTracker::new(Rc::clone(&counters), console.clone());
        for &sink in nodes.sinks() {
            let address = sim
                .world()
                .address_of(sink)
                .ok_or(ConfigurationError::Unaddressed { node: sink })?;
            tracker
                .bind(sim.world_mut(), address, config.port)
                .map_err(ConfigurationError::from)?;
        }

        let flows = traffic::plan(sim.world(), &nodes, &config)?;
        traffic::install(&mut sim, &flows)?;

        if let Some(at) = config.position_report {
            schedule_position_report(&mut sim, at, console.clone())?;
        }

        let reporter = StatsReporter::new(Rc::clone(&counters), console.clone(), config.report_interval);
        reporter.start(&mut sim);

        sim.stop_at(config.horizon);
        sim.run()?;
        console.flush().map_err(ExperimentError::Output)?;

        let network = sim.world().stats();
        let stopped_at = sim.now();
        let discarded_events = sim.pending();
        drop(sim);

        log::info!("network statistics: {network}");
        log::info!("simulation stopped at {stopped_at}s, {discarded_events} pending events discarded");

        Ok(RunReport {
            flows,
            ticks: reporter.ticks(),
            receptions: tracker.receptions(),
            total_packets: counters.packets(),
            total_bytes: counters.bytes(),
            network,
            stopped_at,
            discarded_events,
        })
    }
}

fn schedule_position_report(
    sim: &mut Simulator<Network>,
    at: SimTime,
    console: Console,
) -> Result<(), ExperimentError> {
    sim.schedule_at(at, move |sim| {
        let now = sim.now();
        console.line(format_args!("Displaying nodes position at {now}s"))?;
        for (node, position) in sim.world_mut().positions(now) {
            console.line(format_args!("[{node}] {position}"))?;
        }
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_nodes() {
        let (console, captured) = Console::captured();
        let error = Experiment::with_config(ExperimentConfig::with_nodes(19), console)
            .err()
            .unwrap();

        assert!(matches!(
            error,
            ExperimentError::Configuration(ConfigurationError::TooFewNodes { .. })
        ));
        assert!(captured.lines().is_empty());
    }

    #[test]
    fn routing_refresh_only_before_run() {
        let (console, _) = Console::captured();
        let experiment = Experiment::with_config(ExperimentConfig::default(), console).unwrap();

        // the first routing refresh, nothing else
        assert_eq!(experiment.sim.pending(), 1);
    }

    #[test]
    fn position_report() {
        let (console, captured) = Console::captured();
        let config = ExperimentConfig {
            position_report: Some(SimTime::from_secs(1)),
            horizon: SimTime::from_secs(2),
            ..ExperimentConfig::default()
        };
        Experiment::with_config(config, console).unwrap().run().unwrap();

        let lines = captured.lines();
        assert_eq!(lines[0], "Displaying nodes position at 1s");
        assert_eq!(lines.iter().filter(|line| line.starts_with('[')).count(), 20);
        assert!(lines[1].starts_with("[0] "));
    }

    #[test]
    fn animation_trace() {
        let (console, _) = Console::captured();
        let mut experiment = Experiment::with_config(ExperimentConfig::default(), console).unwrap();

        let mut trace = Vec::new();
        experiment.write_animation_trace(&mut trace).unwrap();
        let trace = String::from_utf8(trace).unwrap();

        assert_eq!(trace.matches("<node ").count(), 20);
        assert_eq!(trace.matches(r#"w="15" h="15""#).count(), 20);
    }
}
